use thiserror::Error;

/// A scalar that cannot cross the storage boundary.
#[derive(Debug, Error)]
pub enum ValueError {
    /// The stored column holds a type no [`Value`](super::Value) variant represents.
    #[error("column `{column}` holds unsupported storage type {type_name}")]
    UnsupportedStorageType { column: String, type_name: String },
    /// An untyped input value (e.g. a JSON array) has no storage form.
    #[error("unsupported value type: {0}")]
    UnsupportedType(&'static str),
}

/// A stored row does not fit the shape the domain model expects.
#[derive(Debug, Error)]
pub enum MappingError {
    #[error("Got wrong data type from database: column `{column}` is not {expected}")]
    TypeMismatch { column: String, expected: &'static str },
    #[error("Got incomplete row from database: column `{0}` is missing")]
    MissingColumn(String),
    #[error("{0}")]
    Invalid(String),
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("invalid column name `{0}`")]
    InvalidColumn(String),
    #[error("refusing to write an empty field mapping to `{0}`")]
    EmptyFields(String),
    #[error(transparent)]
    Value(#[from] ValueError),
    #[error("statement failed: {0}")]
    Sqlx(#[from] sqlx::Error),
}
