#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::http::{Method, StatusCode};

    use crate::error::{AppError, AppResult};
    use crate::http::{Request, Response};
    use crate::kernel::{HandlerFuture, Middleware, MiddlewareChain, Next, Services};
    use crate::middleware::Auth;
    use crate::tests::support;

    type Log = Arc<Mutex<Vec<String>>>;

    fn record(log: &Log, entry: impl Into<String>) {
        log.lock().unwrap().push(entry.into());
    }

    /// Logs on the way in and on the way out.
    fn logging(name: &'static str, log: Log) -> impl Middleware {
        move |request: Request, next: Next, _services: Services| {
            let log = Arc::clone(&log);
            async move {
                record(&log, format!("{} in", name));
                let result = next(request).await;
                record(&log, format!("{} out", name));
                result
            }
        }
    }

    fn terminal(log: Log) -> Next {
        Arc::new(move |_request: Request| -> HandlerFuture {
            record(&log, "T");
            Box::pin(async { Ok::<_, AppError>(Response::new().with_body("done")) })
        })
    }

    fn failing_terminal(error: fn() -> AppError) -> Next {
        Arc::new(move |_request: Request| -> HandlerFuture { Box::pin(async move { Err::<Response, _>(error()) }) })
    }

    fn get(path: &str) -> Request {
        Request::new(Method::GET, path)
    }

    #[tokio::test]
    async fn test_last_added_runs_first() {
        let (state, _db) = support::test_state().await;
        let services = support::anonymous(&state);
        let log: Log = Arc::default();

        let mut chain = MiddlewareChain::new();
        chain.add(logging("M1", Arc::clone(&log)));
        chain.add(logging("M2", Arc::clone(&log)));

        let handler = chain.wrap(terminal(Arc::clone(&log)), &services);
        let response = handler(get("/")).await.unwrap();

        assert_eq!(response.body_str(), Some("done"));
        assert_eq!(*log.lock().unwrap(), vec!["M2 in", "M1 in", "T", "M1 out", "M2 out"]);
    }

    #[tokio::test]
    async fn test_empty_chain_is_the_terminal() {
        let (state, _db) = support::test_state().await;
        let log: Log = Arc::default();

        let chain = MiddlewareChain::new();
        assert!(chain.is_empty());
        let handler = chain.wrap(terminal(Arc::clone(&log)), &support::anonymous(&state));
        handler(get("/")).await.unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["T"]);
    }

    #[tokio::test]
    async fn test_short_circuit_skips_inner_layers() {
        let (state, _db) = support::test_state().await;
        let log: Log = Arc::default();

        let mut chain = MiddlewareChain::new();
        chain.add(logging("inner", Arc::clone(&log)));
        chain.add(|_request: Request, _next: Next, _services: Services| async {
            Ok::<_, AppError>(Response::new().with_status(StatusCode::IM_A_TEAPOT))
        });

        let handler = chain.wrap(terminal(Arc::clone(&log)), &support::anonymous(&state));
        let response = handler(get("/")).await.unwrap();

        assert_eq!(response.status(), StatusCode::IM_A_TEAPOT);
        assert!(log.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_outer_layer_post_processes_response() {
        async fn stamp(request: Request, next: Next, _services: Services) -> AppResult<Response> {
            let response = next(request).await?;
            Ok(response.with_status(StatusCode::ACCEPTED))
        }

        let (state, _db) = support::test_state().await;
        let mut chain = MiddlewareChain::new();
        chain.add(stamp);

        let handler = chain.wrap(terminal(Log::default()), &support::anonymous(&state));
        let response = handler(get("/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
        assert_eq!(response.body_str(), Some("done"));
    }

    #[tokio::test]
    async fn test_outer_layer_catches_inner_error() {
        async fn recover(request: Request, next: Next, _services: Services) -> AppResult<Response> {
            match next(request).await {
                Err(AppError::Config(msg)) => Ok(Response::new().with_body(msg)),
                other => other,
            }
        }

        let (state, _db) = support::test_state().await;
        let log: Log = Arc::default();
        let mut chain = MiddlewareChain::new();
        chain.add(logging("inner", Arc::clone(&log)));
        chain.add(recover);

        let handler = chain.wrap(failing_terminal(|| AppError::Config("boom".into())), &support::anonymous(&state));
        let response = handler(get("/")).await.unwrap();

        assert_eq!(response.body_str(), Some("boom"));
        assert_eq!(*log.lock().unwrap(), vec!["inner in", "inner out"]);
    }

    #[tokio::test]
    async fn test_uncaught_error_propagates() {
        let (state, _db) = support::test_state().await;
        let mut chain = MiddlewareChain::new();
        chain.add(logging("only", Log::default()));

        let handler = chain.wrap(failing_terminal(|| AppError::not_found("gone")), &support::anonymous(&state));
        let err = handler(get("/")).await.unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
    }

    #[tokio::test]
    async fn test_auth_refuses_anonymous_and_non_admin() {
        let (state, _db) = support::test_state().await;
        let user = support::create_user(&state, "ann@example.com", false).await;
        let admin = support::create_user(&state, "root@example.com", true).await;

        let anonymous = support::anonymous(&state);
        let logged_in = support::logged_in(&state, &user);
        let administrator = support::logged_in(&state, &admin);

        let err = Auth::user().check(&anonymous).unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::FORBIDDEN));
        assert_eq!(err.public_message(), "Only logged in users can access this route");
        assert!(Auth::user().check(&logged_in).is_ok());

        let err = Auth::admin().check(&logged_in).unwrap_err();
        assert_eq!(err.public_message(), "Only administrator users can access this route");
        assert!(Auth::admin().check(&administrator).is_ok());
    }

    #[tokio::test]
    async fn test_auth_stops_the_request_before_the_action() {
        let (state, _db) = support::test_state().await;
        let log: Log = Arc::default();
        let mut chain = MiddlewareChain::new();
        chain.add(Auth::user());

        let handler = chain.wrap(terminal(Arc::clone(&log)), &support::anonymous(&state));
        assert!(handler(get("/")).await.is_err());
        assert!(log.lock().unwrap().is_empty());
    }
}
