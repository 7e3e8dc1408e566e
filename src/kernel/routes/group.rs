use std::sync::Arc;

use axum::http::Method;

use super::route::Route;
use crate::error::AppResult;
use crate::kernel::handler::{Action, Middleware};

pub(crate) const ALL_METHODS: [Method; 5] = [Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::DELETE];

/// Routes registered under a common path prefix.
pub struct RoutesGroup {
    prefix: String,
    routes: Vec<Route>,
}

impl RoutesGroup {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into(), routes: Vec::new() }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Attaches `middleware` to every route currently in the group.
    ///
    /// Routes added afterwards do not receive it.
    pub fn add_middleware<M: Middleware>(&mut self, middleware: M) -> &mut Self {
        let shared: Arc<dyn Middleware> = Arc::new(middleware);
        for route in &mut self.routes {
            route.add_shared_middleware(Arc::clone(&shared));
        }
        self
    }

    /// First route in registration order accepting the method and path.
    pub fn matching_route(&self, method: &Method, path: &str) -> Option<&Route> {
        self.routes.iter().find(|route| route.is_match(method, path))
    }

    pub fn add_route<A: Action>(&mut self, methods: Vec<Method>, pattern: &str, action: A) -> AppResult<&mut Route> {
        let route = Route::new(methods, format!("{}{}", self.prefix, pattern), Arc::new(action))?;
        self.routes.push(route);
        let last = self.routes.len() - 1;
        Ok(&mut self.routes[last])
    }

    pub fn add_all<A: Action>(&mut self, pattern: &str, action: A) -> AppResult<&mut Route> {
        self.add_route(ALL_METHODS.to_vec(), pattern, action)
    }

    pub fn add_get<A: Action>(&mut self, pattern: &str, action: A) -> AppResult<&mut Route> {
        self.add_route(vec![Method::GET], pattern, action)
    }

    pub fn add_post<A: Action>(&mut self, pattern: &str, action: A) -> AppResult<&mut Route> {
        self.add_route(vec![Method::POST], pattern, action)
    }

    pub fn add_put<A: Action>(&mut self, pattern: &str, action: A) -> AppResult<&mut Route> {
        self.add_route(vec![Method::PUT], pattern, action)
    }

    pub fn add_patch<A: Action>(&mut self, pattern: &str, action: A) -> AppResult<&mut Route> {
        self.add_route(vec![Method::PATCH], pattern, action)
    }

    pub fn add_delete<A: Action>(&mut self, pattern: &str, action: A) -> AppResult<&mut Route> {
        self.add_route(vec![Method::DELETE], pattern, action)
    }
}
