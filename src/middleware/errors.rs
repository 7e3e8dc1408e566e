//! The two recovery points of the pipeline.
//!
//! [`http_errors`] renders client faults. [`exceptions`] is the catch-all for
//! everything else. Nothing below them in the onion swallows an error.

use serde_json::json;

use crate::error::AppResult;
use crate::http::{Request, Response};
use crate::kernel::{Next, Services};

/// Turns an error carrying a status into `{"error": message}` with that status.
/// Other errors pass through unchanged.
pub async fn http_errors(request: Request, next: Next, _services: Services) -> AppResult<Response> {
    match next(request).await {
        Err(e) => match e.status() {
            Some(status) => Response::new().with_status(status).with_json(&json!({ "error": e.public_message() })),
            None => Err(e),
        },
        ok => ok,
    }
}

/// Renders any remaining error as a 500.
///
/// Production hides the message behind `Server side error`; `app.dev` shows
/// it; `app.dev` together with `app.debug` re-raises to the transport.
pub async fn exceptions(request: Request, next: Next, services: Services) -> AppResult<Response> {
    let e = match next(request).await {
        Ok(response) => return Ok(response),
        Err(e) => e,
    };

    tracing::error!("{}", e);
    let mode = &services.config().app;
    if mode.dev && mode.debug {
        return Err(e);
    }
    let message = if mode.dev { e.to_string() } else { "Server side error".to_string() };

    Response::new()
        .with_status(axum::http::StatusCode::INTERNAL_SERVER_ERROR)
        .with_json(&json!({ "error": message }))
}

