//! # Ablage Backend Library
//!
//! Ablage is the backend of a small cloud file store. Its core is a web
//! kernel: a router with prefix groups and `{name}` path parameters, an
//! onion-style middleware pipeline, and a generic data-mapper persistence
//! layer every domain entity goes through.
//!
//! ## Architecture
//!
//! - **Axum**: HTTP server; every request is handed to the kernel through a fallback handler
//! - **SQLx**: SQLite access behind the storage adapter
//! - **Tokio**: async runtime
//!
//! ## Core Components
//!
//! - [`kernel`]: routing, middleware composition, request-scoped services and sessions
//! - [`http`]: the kernel's request/response types and the axum boundary
//! - [`orm`]: values, storage adapter, data mappers and repositories
//! - [`models`]: users, folders, files and share records with their mappers
//! - [`middleware`]: error rendering, auth checks, security headers
//! - [`routes`]: controllers and the route table
//! - [`config`], [`db`], [`error`], [`metrics`], [`state`]: the usual plumbing

pub mod config;
pub mod db;
pub mod error;
pub mod http;
pub mod kernel;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod orm;
pub mod routes;
pub mod state;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use tower_http::trace::TraceLayer;

/// Builds the kernel with every route registered and wraps it in an axum router.
pub fn build_app(state: state::AppState) -> anyhow::Result<Router> {
    let body_limit = state.config.server.body_limit_bytes;
    let mut kernel = kernel::Kernel::new(state);
    routes::register(&mut kernel)?;

    Ok(Router::new()
        .fallback(http::dispatch)
        .with_state(Arc::new(kernel))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http()))
}

#[cfg(test)]
mod tests;
