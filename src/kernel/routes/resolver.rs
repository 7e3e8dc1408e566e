use axum::http::Method;

use super::group::RoutesGroup;
use super::route::Route;
use crate::error::{AppError, AppResult};
use crate::kernel::handler::Action;

/// Ordered groups of routes. The first group, then the first route in it,
/// that accepts a request wins.
#[derive(Default)]
pub struct RoutesResolver {
    groups: Vec<RoutesGroup>,
}

impl RoutesResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn groups(&self) -> &[RoutesGroup] {
        &self.groups
    }

    pub fn add_group(&mut self, prefix: &str) -> &mut RoutesGroup {
        self.groups.push(RoutesGroup::new(prefix));
        let last = self.groups.len() - 1;
        &mut self.groups[last]
    }

    pub fn resolve(&self, method: &Method, path: &str) -> AppResult<&Route> {
        let route = self
            .groups
            .iter()
            .find_map(|group| group.matching_route(method, path))
            .ok_or_else(|| AppError::RouteNotFound { method: method.to_string(), path: path.to_string() })?;
        tracing::debug!("{} {} resolved to {}", method, path, route.pattern());
        Ok(route)
    }

    /// Registers a single route in a fresh prefix-less group.
    pub fn add_route<A: Action>(&mut self, methods: Vec<Method>, pattern: &str, action: A) -> AppResult<&mut RoutesGroup> {
        let group = self.add_group("");
        group.add_route(methods, pattern, action)?;
        Ok(group)
    }

    pub fn add_all<A: Action>(&mut self, pattern: &str, action: A) -> AppResult<&mut RoutesGroup> {
        self.add_route(super::group::ALL_METHODS.to_vec(), pattern, action)
    }

    pub fn add_get<A: Action>(&mut self, pattern: &str, action: A) -> AppResult<&mut RoutesGroup> {
        self.add_route(vec![Method::GET], pattern, action)
    }

    pub fn add_post<A: Action>(&mut self, pattern: &str, action: A) -> AppResult<&mut RoutesGroup> {
        self.add_route(vec![Method::POST], pattern, action)
    }

    pub fn add_put<A: Action>(&mut self, pattern: &str, action: A) -> AppResult<&mut RoutesGroup> {
        self.add_route(vec![Method::PUT], pattern, action)
    }

    pub fn add_patch<A: Action>(&mut self, pattern: &str, action: A) -> AppResult<&mut RoutesGroup> {
        self.add_route(vec![Method::PATCH], pattern, action)
    }

    pub fn add_delete<A: Action>(&mut self, pattern: &str, action: A) -> AppResult<&mut RoutesGroup> {
        self.add_route(vec![Method::DELETE], pattern, action)
    }
}
