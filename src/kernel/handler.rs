use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;

use super::routes::RouteArgs;
use super::services::Services;
use crate::error::AppResult;
use crate::http::{Request, Response};

pub type HandlerFuture = BoxFuture<'static, AppResult<Response>>;

/// The continuation a middleware receives: the rest of the onion.
pub type Next = Arc<dyn Fn(Request) -> HandlerFuture + Send + Sync>;

/// A route action with its path arguments already applied.
pub type BoundAction = Arc<dyn Fn(Request, Response, Services) -> HandlerFuture + Send + Sync>;

/// A controller action registered on a route.
///
/// Implemented for every `async fn(Request, Response, Services, RouteArgs) -> AppResult<Response>`.
pub trait Action: Send + Sync + 'static {
    fn call(&self, request: Request, response: Response, services: Services, args: RouteArgs) -> HandlerFuture;
}

impl<F, Fut> Action for F
where
    F: Fn(Request, Response, Services, RouteArgs) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = AppResult<Response>> + Send + 'static,
{
    fn call(&self, request: Request, response: Response, services: Services, args: RouteArgs) -> HandlerFuture {
        Box::pin(self(request, response, services, args))
    }
}

/// A layer of the onion. It may call `next` zero or one time, inspect or
/// replace the response, or catch the error `next` returns.
///
/// Implemented for every `async fn(Request, Next, Services) -> AppResult<Response>`.
pub trait Middleware: Send + Sync + 'static {
    fn call(&self, request: Request, next: Next, services: Services) -> HandlerFuture;
}

impl<F, Fut> Middleware for F
where
    F: Fn(Request, Next, Services) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = AppResult<Response>> + Send + 'static,
{
    fn call(&self, request: Request, next: Next, services: Services) -> HandlerFuture {
        Box::pin(self(request, next, services))
    }
}
