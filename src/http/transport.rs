use std::sync::Arc;

use axum::body::to_bytes;
use axum::extract::{FromRequest, Multipart, State};
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;

use super::{Request, UploadedFile};
use crate::error::{AppError, AppResult};
use crate::kernel::Kernel;

/// Fallback handler: every HTTP request goes through the kernel.
pub async fn dispatch(State(kernel): State<Arc<Kernel>>, request: axum::extract::Request) -> axum::response::Response {
    let limit = kernel.state().config.server.body_limit_bytes;
    let request = match from_http(request, limit).await {
        Ok(request) => request,
        Err(e) => return e.into_response(),
    };

    let method = request.method().clone();
    let path = request.path().to_string();
    match kernel.handle(request).await {
        Ok(response) => response.into_response(),
        Err(e) => {
            tracing::error!("{} {} failed outside the middleware pipeline: {}", method, path, e);
            e.into_response()
        }
    }
}

/// Converts the server's request into the kernel's, reading the whole body.
///
/// Multipart bodies are split into form fields and uploaded files;
/// url-encoded bodies are parsed into form fields and kept as raw bytes too.
pub async fn from_http(request: axum::extract::Request, limit: usize) -> AppResult<Request> {
    let (parts, body) = request.into_parts();
    let content_type = parts
        .headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_ascii_lowercase())
        .unwrap_or_default();

    let mut converted = Request::new(parts.method.clone(), parts.uri.path())
        .with_query(parts.uri.query().unwrap_or(""))
        .with_headers(parts.headers.clone());

    if content_type.starts_with("multipart/form-data") {
        let request = axum::extract::Request::from_parts(parts, body);
        let mut multipart = Multipart::from_request(request, &())
            .await
            .map_err(|e| AppError::bad_request(e.body_text()))?;

        while let Some(field) = multipart.next_field().await.map_err(|e| AppError::bad_request(e.body_text()))? {
            let name = field.name().unwrap_or_default().to_string();
            match field.file_name().map(str::to_string) {
                Some(file_name) => {
                    let content_type = field.content_type().map(str::to_string);
                    let bytes = field.bytes().await.map_err(|e| AppError::bad_request(e.body_text()))?;
                    converted = converted.with_file(UploadedFile { field: name, file_name, content_type, bytes });
                }
                None => {
                    let text = field.text().await.map_err(|e| AppError::bad_request(e.body_text()))?;
                    converted = converted.with_form_field(name, text);
                }
            }
        }
        return Ok(converted);
    }

    let bytes = to_bytes(body, limit)
        .await
        .map_err(|_| AppError::http(axum::http::StatusCode::PAYLOAD_TOO_LARGE, "Request body is too large"))?;

    if content_type.starts_with("application/x-www-form-urlencoded") {
        for (key, value) in form_urlencoded::parse(&bytes) {
            converted = converted.with_form_field(key.into_owned(), value.into_owned());
        }
    }

    Ok(converted.with_body(bytes))
}
