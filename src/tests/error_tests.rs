#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::{Method, StatusCode};
    use axum::response::IntoResponse;
    use serde_json::Value;

    use crate::error::{AppError, AppResult, OptionExt};
    use crate::http::{Request, Response};
    use crate::kernel::{HandlerFuture, MiddlewareChain, Next};
    use crate::middleware::{exceptions, http_errors};
    use crate::orm::{MappingError, StorageError};
    use crate::tests::support;

    fn failing(error: fn() -> AppError) -> Next {
        Arc::new(move |_request: Request| -> HandlerFuture { Box::pin(async move { Err::<Response, _>(error()) }) })
    }

    fn internal() -> AppError {
        AppError::Internal(anyhow::anyhow!("disk on fire"))
    }

    fn body_json(response: &Response) -> Value {
        serde_json::from_slice(response.body()).unwrap()
    }

    /// Runs `error` through the pipeline's error middleware, registered the
    /// way the route table does it.
    async fn render(config: crate::config::AppConfig, error: fn() -> AppError) -> AppResult<Response> {
        let (state, _db) = support::test_state_with(config).await;
        let mut chain = MiddlewareChain::new();
        chain.add(http_errors);
        chain.add(exceptions);
        let handler = chain.wrap(failing(error), &support::anonymous(&state));
        handler(Request::new(Method::GET, "/")).await
    }

    #[test]
    fn test_status_separates_client_and_server_faults() {
        assert_eq!(AppError::bad_request("x").status(), Some(StatusCode::BAD_REQUEST));
        assert_eq!(AppError::unauthorized("x").status(), Some(StatusCode::UNAUTHORIZED));
        assert_eq!(AppError::forbidden("x").status(), Some(StatusCode::FORBIDDEN));
        assert_eq!(AppError::not_found("x").status(), Some(StatusCode::NOT_FOUND));
        assert_eq!(
            AppError::Mapping(MappingError::Invalid("bad row".into())).status(),
            Some(StatusCode::INTERNAL_SERVER_ERROR)
        );

        assert_eq!(internal().status(), None);
        assert_eq!(AppError::Config("x".into()).status(), None);
        assert_eq!(AppError::Storage(StorageError::InvalidColumn("x".into())).status(), None);
        assert_eq!(AppError::RouteNotFound { method: "GET".into(), path: "/".into() }.status(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(AppError::not_found("File not found").to_string(), "HTTP 404: File not found");
        assert_eq!(
            AppError::RouteNotFound { method: "DELETE".into(), path: "/unknown".into() }.to_string(),
            "No route matched DELETE /unknown"
        );
        assert_eq!(AppError::not_found("File not found").public_message(), "File not found");
        assert_eq!(
            AppError::Mapping(MappingError::Invalid("First name is empty".into())).public_message(),
            "First name is empty"
        );
    }

    #[test]
    fn test_option_ext() {
        let found: Option<i32> = Some(1);
        assert_eq!(found.ok_or_not_found("User").unwrap(), 1);

        let missing: Option<i32> = None;
        let err = missing.ok_or_not_found("User").unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
        assert_eq!(err.public_message(), "User not found");
    }

    #[test]
    fn test_conversions() {
        let err: AppError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, AppError::Storage(StorageError::Sqlx(_))));

        let err: AppError = anyhow::anyhow!("boom").into();
        assert!(matches!(err, AppError::Internal(_)));

        let err: AppError = MappingError::MissingColumn("id".into()).into();
        assert!(matches!(err, AppError::Mapping(_)));
    }

    #[tokio::test]
    async fn test_transport_rendering_hides_server_faults() {
        let response = AppError::forbidden("nope").into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = internal().into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"]["code"], "INTERNAL_ERROR");
        assert!(body["error"]["details"]["error_id"].is_string());
        assert!(!body.to_string().contains("disk on fire"));
    }

    #[tokio::test]
    async fn test_http_errors_renders_status_and_message() {
        let response = render(support::test_config(), || AppError::not_found("Folder not found")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.header("content-type"), Some("application/json"));
        assert_eq!(body_json(&response)["error"], "Folder not found");

        let response = render(support::test_config(), || AppError::Mapping(MappingError::Invalid("bad".into())))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(&response)["error"], "bad");
    }

    #[tokio::test]
    async fn test_exceptions_hides_message_in_production() {
        let response = render(support::test_config(), internal).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(&response)["error"], "Server side error");
    }

    #[tokio::test]
    async fn test_exceptions_shows_message_in_dev_mode() {
        let mut config = support::test_config();
        config.app.dev = true;

        let response = render(config, internal).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(&response)["error"], "Internal error: disk on fire");
    }

    #[tokio::test]
    async fn test_exceptions_reraises_in_dev_debug_mode() {
        let mut config = support::test_config();
        config.app.dev = true;
        config.app.debug = true;

        let err = render(config.clone(), internal).await.unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));

        // client faults are still rendered by http_errors
        let response = render(config, || AppError::bad_request("x")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_debug_without_dev_behaves_like_production() {
        let mut config = support::test_config();
        config.app.debug = true;

        let response = render(config, internal).await.unwrap();
        assert_eq!(body_json(&response)["error"], "Server side error");
    }
}
