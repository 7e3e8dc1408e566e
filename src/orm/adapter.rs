use sqlx::query::Query;
use sqlx::sqlite::{SqliteArguments, SqliteRow};
use sqlx::{Column, Row, Sqlite, SqlitePool, TypeInfo, ValueRef};

use super::error::{StorageError, ValueError};
use super::value::{Fields, Primitive, Value};

type SqliteQuery<'q> = Query<'q, Sqlite, SqliteArguments<'q>>;

/// Executes parameterized CRUD statements against one table.
///
/// Rows go in and come out as [`Fields`]; raw driver types never leave this
/// module. Single-row operations key on the conventional `id` column.
#[derive(Clone)]
pub struct SqliteAdapter {
    pool: SqlitePool,
    table: &'static str,
}

impl SqliteAdapter {
    pub fn new(pool: SqlitePool, table: &'static str) -> Self {
        Self { pool, table }
    }

    pub fn table(&self) -> &'static str {
        self.table
    }

    /// Inserts one row and returns the identifier the database assigned to it.
    pub async fn insert(&self, fields: &Fields) -> Result<i64, StorageError> {
        self.check_writable(fields)?;
        let columns: Vec<&str> = fields.columns().collect();
        let placeholders = vec!["?"; columns.len()].join(", ");
        let sql = format!("INSERT INTO {} ({}) VALUES ({})", self.table, columns.join(", "), placeholders);

        let mut query = sqlx::query(&sql);
        for (_, value) in fields.iter() {
            query = bind_value(query, value.to_primitive());
        }
        let result = query.execute(&self.pool).await?;
        Ok(result.last_insert_rowid())
    }

    /// `None` means the row does not exist; a present row may still hold `Value::Null` fields.
    pub async fn select_by_id(&self, id: i64) -> Result<Option<Fields>, StorageError> {
        let sql = format!("SELECT * FROM {} WHERE id = ?", self.table);
        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;
        row.as_ref().map(row_to_fields).transpose()
    }

    pub async fn select_by_field(&self, name: &str, value: &Value) -> Result<Vec<Fields>, StorageError> {
        check_identifier(name)?;
        let sql = format!("SELECT * FROM {} WHERE {} = ?", self.table, name);
        let rows = bind_value(sqlx::query(&sql), value.to_primitive()).fetch_all(&self.pool).await?;
        rows.iter().map(row_to_fields).collect()
    }

    /// Substring match. `%`, `_` and `\` in the needle are matched literally.
    /// A null needle has no substring and is refused.
    pub async fn select_like_field(&self, name: &str, value: &Value) -> Result<Vec<Fields>, StorageError> {
        check_identifier(name)?;
        let needle = match value.to_primitive() {
            Primitive::Null => return Err(ValueError::UnsupportedType("null").into()),
            Primitive::Int(i) => i.to_string(),
            Primitive::Float(f) => f.to_string(),
            Primitive::Text(s) => s,
        };
        let pattern = format!("%{}%", escape_like(&needle));
        let sql = format!("SELECT * FROM {} WHERE {} LIKE ? ESCAPE '\\'", self.table, name);
        let rows = sqlx::query(&sql).bind(pattern).fetch_all(&self.pool).await?;
        rows.iter().map(row_to_fields).collect()
    }

    pub async fn select_all(&self) -> Result<Vec<Fields>, StorageError> {
        let sql = format!("SELECT * FROM {}", self.table);
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        rows.iter().map(row_to_fields).collect()
    }

    /// Replaces every given column of the row. Returns whether a row was affected.
    pub async fn update(&self, id: i64, fields: &Fields) -> Result<bool, StorageError> {
        self.check_writable(fields)?;
        let assignments: Vec<String> = fields.columns().map(|c| format!("{} = ?", c)).collect();
        let sql = format!("UPDATE {} SET {} WHERE id = ?", self.table, assignments.join(", "));

        let mut query = sqlx::query(&sql);
        for (_, value) in fields.iter() {
            query = bind_value(query, value.to_primitive());
        }
        let result = query.bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(&self, id: i64) -> Result<bool, StorageError> {
        let sql = format!("DELETE FROM {} WHERE id = ?", self.table);
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    fn check_writable(&self, fields: &Fields) -> Result<(), StorageError> {
        if fields.is_empty() {
            return Err(StorageError::EmptyFields(self.table.to_string()));
        }
        fields.columns().try_for_each(check_identifier)
    }
}

fn bind_value(query: SqliteQuery<'_>, value: Primitive) -> SqliteQuery<'_> {
    match value {
        Primitive::Null => query.bind(None::<i64>),
        Primitive::Int(i) => query.bind(i),
        Primitive::Float(f) => query.bind(f),
        Primitive::Text(s) => query.bind(s),
    }
}

/// Column names are interpolated into SQL, so only plain identifiers are allowed.
pub(crate) fn check_identifier(name: &str) -> Result<(), StorageError> {
    let mut chars = name.chars();
    let valid_start = chars.next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    if valid_start && chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        Ok(())
    } else {
        Err(StorageError::InvalidColumn(name.to_string()))
    }
}

fn escape_like(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len());
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn row_to_fields(row: &SqliteRow) -> Result<Fields, StorageError> {
    let mut fields = Fields::new();
    for column in row.columns() {
        let idx = column.ordinal();
        let name = column.name();
        let type_name = {
            let raw = row.try_get_raw(idx)?;
            if raw.is_null() {
                None
            } else {
                Some(raw.type_info().name().to_string())
            }
        };
        let value = match type_name.as_deref() {
            None => Value::Null,
            Some("INTEGER") => Value::Int(row.try_get_unchecked::<i64, _>(idx)?),
            Some("REAL") => Value::Float(row.try_get_unchecked::<f64, _>(idx)?),
            Some("TEXT") => Value::Text(row.try_get_unchecked::<String, _>(idx)?),
            Some(other) => {
                return Err(ValueError::UnsupportedStorageType {
                    column: name.to_string(),
                    type_name: other.to_string(),
                }
                .into())
            }
        };
        fields.insert(name, value);
    }
    Ok(fields)
}
