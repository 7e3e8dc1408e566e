use async_trait::async_trait;
use sqlx::SqlitePool;

use super::adapter::SqliteAdapter;
use super::mapper::DataMapper;
use super::value::Value;
use crate::error::AppResult;

/// Entity-facing CRUD over an opaque key.
///
/// `read` returning `None` is a normal outcome; turning it into a 404 (or a
/// 403 after an access check) is the caller's job.
#[async_trait]
pub trait Repository<K, E>: Send + Sync
where
    K: Send + 'static,
    E: Send + Sync + 'static,
{
    /// Always inserts; never upserts.
    async fn create(&self, entity: &E) -> AppResult<K>;

    async fn read(&self, slug: K) -> AppResult<Option<E>>;

    /// Full replace of the mapped fields, not a patch.
    async fn update(&self, slug: K, entity: &E) -> AppResult<bool>;

    async fn delete(&self, slug: K) -> AppResult<bool>;

    async fn list(&self) -> AppResult<Vec<E>>;
}

/// Repository backed by a [`DataMapper`]; the only implementation the app uses.
pub struct MapperRepository<M> {
    mapper: M,
}

impl<M: DataMapper> MapperRepository<M> {
    pub fn new(mapper: M) -> Self {
        Self { mapper }
    }

    /// Builds adapter, mapper and repository for `M::TABLE` in one go.
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self::new(M::from_adapter(SqliteAdapter::new(pool, M::TABLE)))
    }

    pub fn mapper(&self) -> &M {
        &self.mapper
    }

    /// Exact match on one column. No match yields an empty vec.
    pub async fn get_by_property(&self, column: &str, value: impl Into<Value>) -> AppResult<Vec<M::Entity>> {
        self.mapper.get_by_property(column, value.into()).await
    }

    /// Substring match on one column. No match yields an empty vec.
    pub async fn get_like_property(&self, column: &str, value: impl Into<Value>) -> AppResult<Vec<M::Entity>> {
        self.mapper.get_like_property(column, value.into()).await
    }
}

#[async_trait]
impl<M: DataMapper> Repository<i64, M::Entity> for MapperRepository<M> {
    async fn create(&self, entity: &M::Entity) -> AppResult<i64> {
        self.mapper.create(entity).await
    }

    async fn read(&self, slug: i64) -> AppResult<Option<M::Entity>> {
        self.mapper.read(slug).await
    }

    async fn update(&self, slug: i64, entity: &M::Entity) -> AppResult<bool> {
        self.mapper.update(slug, entity).await
    }

    async fn delete(&self, slug: i64) -> AppResult<bool> {
        self.mapper.delete(slug).await
    }

    async fn list(&self) -> AppResult<Vec<M::Entity>> {
        self.mapper.list().await
    }
}
