use std::collections::BTreeMap;

use chrono::NaiveDateTime;

use super::error::{MappingError, ValueError};

/// Text form used for every timestamp written to or read from storage.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One scalar field on its way into or out of storage.
///
/// The variant set is closed: anything that is not one of these cannot be
/// turned into a `Value`, so coercion in [`Value::to_primitive`] is total.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Timestamp(NaiveDateTime),
}

/// The storage-side form of a [`Value`]; what actually gets bound to a statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Null,
    Int(i64),
    Float(f64),
    Text(String),
}

impl Value {
    /// Coerces into the form the storage engine understands.
    ///
    /// Booleans become `0`/`1`, timestamps become `YYYY-MM-DD HH:MM:SS` text.
    pub fn to_primitive(&self) -> Primitive {
        match self {
            Value::Null => Primitive::Null,
            Value::Bool(b) => Primitive::Int(i64::from(*b)),
            Value::Int(i) => Primitive::Int(*i),
            Value::Float(f) => Primitive::Float(*f),
            Value::Text(s) => Primitive::Text(s.clone()),
            Value::Timestamp(t) => Primitive::Text(t.format(TIMESTAMP_FORMAT).to_string()),
        }
    }

    /// Converts an untyped JSON scalar. Arrays and objects have no storage form.
    pub fn from_json(value: &serde_json::Value) -> Result<Value, ValueError> {
        match value {
            serde_json::Value::Null => Ok(Value::Null),
            serde_json::Value::Bool(b) => Ok(Value::Bool(*b)),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(Value::Int(i))
                } else if let Some(f) = n.as_f64() {
                    Ok(Value::Float(f))
                } else {
                    Err(ValueError::UnsupportedType("number outside i64/f64 range"))
                }
            }
            serde_json::Value::String(s) => Ok(Value::Text(s.clone())),
            serde_json::Value::Array(_) => Err(ValueError::UnsupportedType("array")),
            serde_json::Value::Object(_) => Err(ValueError::UnsupportedType("object")),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_i64(&self, column: &str) -> Result<i64, MappingError> {
        match self {
            Value::Int(i) => Ok(*i),
            _ => Err(mismatch(column, "an integer")),
        }
    }

    pub fn as_f64(&self, column: &str) -> Result<f64, MappingError> {
        match self {
            Value::Float(f) => Ok(*f),
            Value::Int(i) => Ok(*i as f64),
            _ => Err(mismatch(column, "a number")),
        }
    }

    pub fn as_str(&self, column: &str) -> Result<&str, MappingError> {
        match self {
            Value::Text(s) => Ok(s),
            _ => Err(mismatch(column, "a string")),
        }
    }

    /// Accepts a native boolean or its stored `0`/`1` form; any other integer is rejected.
    pub fn as_bool(&self, column: &str) -> Result<bool, MappingError> {
        match self {
            Value::Bool(b) => Ok(*b),
            Value::Int(0) => Ok(false),
            Value::Int(1) => Ok(true),
            _ => Err(mismatch(column, "a boolean (0/1)")),
        }
    }

    /// Accepts a native timestamp or its stored text form.
    pub fn as_timestamp(&self, column: &str) -> Result<NaiveDateTime, MappingError> {
        match self {
            Value::Timestamp(t) => Ok(*t),
            Value::Text(s) => NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT)
                .map_err(|_| mismatch(column, "a timestamp")),
            _ => Err(mismatch(column, "a timestamp")),
        }
    }
}

fn mismatch(column: &str, expected: &'static str) -> MappingError {
    MappingError::TypeMismatch { column: column.to_string(), expected }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::Timestamp(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

impl From<Primitive> for Value {
    fn from(p: Primitive) -> Self {
        match p {
            Primitive::Null => Value::Null,
            Primitive::Int(i) => Value::Int(i),
            Primitive::Float(f) => Value::Float(f),
            Primitive::Text(s) => Value::Text(s),
        }
    }
}

/// Column name → [`Value`] mapping exchanged between mappers and the adapter.
///
/// Ordered by column name so generated statements are deterministic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fields(BTreeMap<String, Value>);

impl Fields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, used by mappers when assembling a row.
    pub fn with(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.0.insert(column.to_string(), value.into());
        self
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(column.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn get(&self, column: &str) -> Result<&Value, MappingError> {
        self.0.get(column).ok_or_else(|| MappingError::MissingColumn(column.to_string()))
    }

    pub fn i64(&self, column: &str) -> Result<i64, MappingError> {
        self.get(column)?.as_i64(column)
    }

    pub fn opt_i64(&self, column: &str) -> Result<Option<i64>, MappingError> {
        let value = self.get(column)?;
        if value.is_null() {
            return Ok(None);
        }
        value.as_i64(column).map(Some)
    }

    pub fn string(&self, column: &str) -> Result<String, MappingError> {
        self.get(column)?.as_str(column).map(str::to_string)
    }

    pub fn opt_string(&self, column: &str) -> Result<Option<String>, MappingError> {
        let value = self.get(column)?;
        if value.is_null() {
            return Ok(None);
        }
        value.as_str(column).map(|s| Some(s.to_string()))
    }

    pub fn bool(&self, column: &str) -> Result<bool, MappingError> {
        self.get(column)?.as_bool(column)
    }

    pub fn timestamp(&self, column: &str) -> Result<NaiveDateTime, MappingError> {
        self.get(column)?.as_timestamp(column)
    }

    pub fn opt_timestamp(&self, column: &str) -> Result<Option<NaiveDateTime>, MappingError> {
        let value = self.get(column)?;
        if value.is_null() {
            return Ok(None);
        }
        value.as_timestamp(column).map(Some)
    }
}

impl FromIterator<(String, Value)> for Fields {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Fields(iter.into_iter().collect())
    }
}
