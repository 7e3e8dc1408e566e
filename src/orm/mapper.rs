use async_trait::async_trait;

use super::adapter::SqliteAdapter;
use super::error::MappingError;
use super::value::{Fields, Value};
use crate::error::AppResult;

/// Translates one entity type to and from its column mapping.
///
/// Implementors only write [`DataMapper::to_fields`] and
/// [`DataMapper::from_fields`]; the CRUD operations are provided on top of the
/// adapter. `from_fields` must reject any row the domain model cannot
/// represent instead of coercing it.
#[async_trait]
pub trait DataMapper: Send + Sync {
    type Entity: Send + Sync + 'static;

    /// Physical table backing this entity.
    const TABLE: &'static str;

    fn from_adapter(adapter: SqliteAdapter) -> Self
    where
        Self: Sized;

    fn adapter(&self) -> &SqliteAdapter;

    /// Every persisted column except `id`.
    fn to_fields(&self, entity: &Self::Entity) -> Fields;

    fn from_fields(&self, fields: Fields) -> Result<Self::Entity, MappingError>;

    async fn create(&self, entity: &Self::Entity) -> AppResult<i64> {
        let fields = self.to_fields(entity);
        Ok(self.adapter().insert(&fields).await?)
    }

    async fn read(&self, id: i64) -> AppResult<Option<Self::Entity>> {
        match self.adapter().select_by_id(id).await? {
            Some(fields) => Ok(Some(self.from_fields(fields)?)),
            None => Ok(None),
        }
    }

    async fn get_by_property(&self, column: &str, value: Value) -> AppResult<Vec<Self::Entity>> {
        let rows = self.adapter().select_by_field(column, &value).await?;
        self.map_rows(rows)
    }

    async fn get_like_property(&self, column: &str, value: Value) -> AppResult<Vec<Self::Entity>> {
        let rows = self.adapter().select_like_field(column, &value).await?;
        self.map_rows(rows)
    }

    async fn update(&self, id: i64, entity: &Self::Entity) -> AppResult<bool> {
        let fields = self.to_fields(entity);
        Ok(self.adapter().update(id, &fields).await?)
    }

    async fn delete(&self, id: i64) -> AppResult<bool> {
        Ok(self.adapter().delete(id).await?)
    }

    async fn list(&self) -> AppResult<Vec<Self::Entity>> {
        let rows = self.adapter().select_all().await?;
        self.map_rows(rows)
    }

    fn map_rows(&self, rows: Vec<Fields>) -> AppResult<Vec<Self::Entity>> {
        rows.into_iter().map(|row| self.from_fields(row).map_err(Into::into)).collect()
    }
}
