use serde_json::{Map, Value as Json};

use crate::error::{AppError, AppResult};

/// A decoded JSON object body with checked, typed field access.
///
/// Missing keys and wrong types are client faults (400), never panics.
#[derive(Debug, Clone, Default)]
pub struct BodyData(Map<String, Json>);

impl BodyData {
    pub fn new(map: Map<String, Json>) -> Self {
        Self(map)
    }

    pub fn from_slice(bytes: &[u8]) -> AppResult<Self> {
        match serde_json::from_slice::<Json>(bytes) {
            Ok(Json::Object(map)) => Ok(Self(map)),
            _ => Err(AppError::bad_request("The data is not an object")),
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn check_and_get(&self, key: &str) -> AppResult<&Json> {
        self.0
            .get(key)
            .ok_or_else(|| AppError::bad_request(format!("Parameter {} is not found", key)))
    }

    pub fn string(&self, key: &str) -> AppResult<String> {
        match self.check_and_get(key)? {
            Json::String(s) => Ok(s.clone()),
            _ => Err(AppError::bad_request(format!("{} is not string", key))),
        }
    }

    pub fn opt_string(&self, key: &str) -> AppResult<Option<String>> {
        match self.check_and_get(key)? {
            Json::Null => Ok(None),
            Json::String(s) => Ok(Some(s.clone())),
            _ => Err(AppError::bad_request(format!("{} is not string or null", key))),
        }
    }

    pub fn bool(&self, key: &str) -> AppResult<bool> {
        self.check_and_get(key)?
            .as_bool()
            .ok_or_else(|| AppError::bad_request(format!("{} is not bool", key)))
    }

    pub fn i64(&self, key: &str) -> AppResult<i64> {
        self.check_and_get(key)?
            .as_i64()
            .ok_or_else(|| AppError::bad_request(format!("{} is not integer", key)))
    }

    pub fn opt_i64(&self, key: &str) -> AppResult<Option<i64>> {
        match self.check_and_get(key)? {
            Json::Null => Ok(None),
            other => other
                .as_i64()
                .map(Some)
                .ok_or_else(|| AppError::bad_request(format!("{} is not integer", key))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_body_must_be_object() {
        assert!(BodyData::from_slice(br#"{"a": 1}"#).is_ok());
        let err = BodyData::from_slice(b"[1, 2]").unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));
        assert!(BodyData::from_slice(b"not json").is_err());
    }

    #[test]
    fn test_typed_access() {
        let body = BodyData::from_slice(br#"{"name": "docs", "parentId": null, "n": 3}"#).unwrap();
        assert_eq!(body.string("name").unwrap(), "docs");
        assert_eq!(body.opt_i64("parentId").unwrap(), None);
        assert_eq!(body.i64("n").unwrap(), 3);
        assert!(body.i64("name").is_err());

        let missing = body.string("other").unwrap_err();
        assert_eq!(missing.public_message(), "Parameter other is not found");
    }
}
