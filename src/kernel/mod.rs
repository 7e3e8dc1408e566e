//! Request orchestration: routing, middleware composition and the per-request
//! service context.
//!
//! A [`Kernel`] is assembled once at startup and then only read. Handling a
//! request resolves one [`Route`], binds its path arguments into the
//! innermost handler, wraps that with the route's middleware and then with
//! the global middleware, and invokes the result once.

pub mod handler;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod session;

use std::sync::Arc;

use axum::http::header::CONTENT_TYPE;
use axum::http::HeaderValue;

pub use handler::{Action, BoundAction, HandlerFuture, Middleware, Next};
pub use middleware::MiddlewareChain;
pub use routes::{Route, RouteArgs, RoutesGroup, RoutesResolver};
pub use services::Services;
pub use session::{bearer_token, Session, SessionStore, SessionUser};

use crate::error::AppResult;
use crate::http::{Request, Response};
use crate::state::AppState;

pub struct Kernel {
    pub routes: RoutesResolver,
    pub middleware: MiddlewareChain,
    state: AppState,
}

impl Kernel {
    pub fn new(state: AppState) -> Self {
        Self { routes: RoutesResolver::new(), middleware: MiddlewareChain::new(), state }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Registers a global middleware. The last one added runs first.
    pub fn add_middleware<M: Middleware>(&mut self, middleware: M) -> &mut Self {
        self.middleware.add(middleware);
        self
    }

    /// Runs one request through the pipeline.
    ///
    /// A request no route accepts fails with
    /// [`AppError::RouteNotFound`](crate::error::AppError::RouteNotFound)
    /// before any middleware runs.
    pub async fn handle(&self, request: Request) -> AppResult<Response> {
        let metrics = &self.state.metrics;
        metrics.inc_requests();

        let route = match self.routes.resolve(request.method(), request.path()) {
            Ok(route) => route,
            Err(e) => {
                metrics.inc_unmatched();
                return Err(e);
            }
        };

        let services = Services::for_request(self.state.clone(), &request).await;
        let action = route.action(request.path());
        let initial = Response::new().with_header(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let terminal_services = services.clone();
        let terminal: Next = Arc::new(move |request: Request| {
            action(request, initial.clone(), terminal_services.clone())
        });
        let handler = self.middleware.wrap(route.middleware().wrap(terminal, &services), &services);

        let result = handler(request).await;
        match &result {
            Ok(response) => metrics.record_status(response.status().as_u16()),
            Err(e) => match e.status() {
                Some(status) => metrics.record_status(status.as_u16()),
                None => metrics.inc_server_errors(),
            },
        }
        result
    }
}

