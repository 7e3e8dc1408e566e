use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::error::Error;
use std::fmt;

use crate::orm::{MappingError, StorageError};

/// The primary error type for the application.
///
/// Errors fall into two classes. Client faults ([`AppError::Http`] and
/// [`AppError::Mapping`]) carry a status code and are rendered directly by the
/// `http_errors` middleware. Everything else is a server fault and only the
/// catch-all `exceptions` middleware turns it into a response.
#[derive(Debug)]
pub enum AppError {
    /// A failure with an explicit HTTP status, meant to be shown to the caller.
    Http {
        status: StatusCode,
        message: String,
    },
    /// A row coming back from storage does not fit the domain model.
    Mapping(MappingError),
    /// Statement execution or row decoding failed.
    Storage(StorageError),
    /// No registered route accepts the method and path.
    RouteNotFound {
        method: String,
        path: String,
    },
    /// Broken bootstrap configuration, e.g. a route pattern that does not compile.
    Config(String),
    /// For internal server errors that are not expected to be handled by the client.
    Internal(anyhow::Error),
}

impl AppError {
    pub fn http(status: StatusCode, message: impl Into<String>) -> Self {
        AppError::Http { status, message: message.into() }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::http(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::http(StatusCode::UNAUTHORIZED, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::http(StatusCode::FORBIDDEN, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::http(StatusCode::NOT_FOUND, message)
    }

    /// Status code for client-fault errors, `None` for server faults.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            AppError::Http { status, .. } => Some(*status),
            AppError::Mapping(_) => Some(StatusCode::INTERNAL_SERVER_ERROR),
            _ => None,
        }
    }

    /// The message shown to the client when the error carries a status.
    pub fn public_message(&self) -> String {
        match self {
            AppError::Http { message, .. } => message.clone(),
            AppError::Mapping(e) => e.to_string(),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Http { status, message } => write!(f, "HTTP {}: {}", status.as_u16(), message),
            AppError::Mapping(e) => write!(f, "Mapping error: {}", e),
            AppError::Storage(e) => write!(f, "Storage error: {}", e),
            AppError::RouteNotFound { method, path } => {
                write!(f, "No route matched {} {}", method, path)
            }
            AppError::Config(msg) => write!(f, "Configuration error: {}", msg),
            AppError::Internal(e) => write!(f, "Internal error: {}", e),
        }
    }
}

impl Error for AppError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            AppError::Mapping(e) => Some(e),
            AppError::Storage(e) => Some(e),
            AppError::Internal(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

/// Rendering used only at the transport boundary, for errors that escaped every
/// middleware. Client faults keep their status; anything else is an opaque 500.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_code, error_message, details) = match self {
            AppError::Http { status, message } => (status, "HTTP_ERROR", message, None),
            other => {
                tracing::error!("Unhandled error: {}", other);
                let error_id = uuid::Uuid::new_v4();
                tracing::error!("Error ID: {}", error_id);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                    Some(json!({ "error_id": error_id.to_string() })),
                )
            }
        };

        let mut body = json!({
            "error": {
                "code": error_code,
                "message": error_message,
            },
            "status": status.as_u16(),
            "timestamp": chrono::Utc::now().to_rfc3339(),
        });

        if let Some(details) = details {
            body["error"]["details"] = details;
        }

        (status, Json(body)).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err)
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        AppError::Storage(err)
    }
}

impl From<MappingError> for AppError {
    fn from(err: MappingError) -> Self {
        AppError::Mapping(err)
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Storage(StorageError::Sqlx(err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Internal(anyhow::Error::new(err).context("JSON encoding failed"))
    }
}

/// A type alias for `Result<T, AppError>`, used throughout the application.
pub type AppResult<T> = Result<T, AppError>;

/// An extension trait for `Option` that turns repository absence into a 404.
pub trait OptionExt<T> {
    /// Converts an `Option<T>` to a `Result<T, AppError>`.
    ///
    /// # Arguments
    ///
    /// * `entity` - A string describing the entity that was not found.
    fn ok_or_not_found(self, entity: &str) -> AppResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_not_found(self, entity: &str) -> AppResult<T> {
        self.ok_or_else(|| AppError::not_found(format!("{} not found", entity)))
    }
}
