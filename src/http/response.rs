use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::IntoResponse;
use bytes::Bytes;
use serde::Serialize;

use crate::error::AppResult;

/// Status, headers and body accumulated while a request travels the pipeline.
///
/// Every mutator consumes the response and hands back the changed copy, so a
/// middleware never alters a response another layer still holds.
#[derive(Debug, Clone)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl Default for Response {
    fn default() -> Self {
        Self { status: StatusCode::OK, headers: HeaderMap::new(), body: Bytes::new() }
    }
}

impl Response {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// Sets a header, replacing any previous value under the same name.
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn without_header(mut self, name: HeaderName) -> Self {
        self.headers.remove(name);
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Serializes `value` as the body and marks the response as JSON.
    pub fn with_json<T: Serialize + ?Sized>(self, value: &T) -> AppResult<Self> {
        let body = serde_json::to_vec(value)?;
        Ok(self
            .with_header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .with_body(body))
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn body_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.body).ok()
    }
}

/// Emission: hand status, headers and body over to axum.
impl IntoResponse for Response {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.headers, self.body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mutators_return_changed_copy() {
        let original = Response::new();
        let changed = original.clone().with_status(StatusCode::CREATED).with_body("x");
        assert_eq!(original.status(), StatusCode::OK);
        assert!(original.body().is_empty());
        assert_eq!(changed.status(), StatusCode::CREATED);
        assert_eq!(changed.body_str(), Some("x"));
    }

    #[test]
    fn test_with_json_sets_content_type() {
        let res = Response::new().with_json(&serde_json::json!({"a": 1})).unwrap();
        assert_eq!(res.header("content-type"), Some("application/json"));
        assert_eq!(res.body_str(), Some(r#"{"a":1}"#));
    }
}
