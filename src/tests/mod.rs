//! Integration and unit tests for the Ablage backend.
//!
//! ## Test Modules
//!
//! - **routing_tests**: pattern matching, argument extraction, groups and resolution
//! - **middleware_tests**: onion ordering, short-circuits and error catching
//! - **kernel_tests**: request orchestration end to end without HTTP
//! - **value_tests**: value coercion and typed readers
//! - **adapter_tests**: the SQLite storage adapter
//! - **repository_tests**: mappers and repositories over the real schema
//! - **controller_tests**: register, folder trees, sharing
//! - **error_tests**: error types and the error-rendering middleware
//! - **config_tests**: configuration loading and validation
//! - **api_tests**: the full stack through the axum router
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test
//! cargo test routing_tests
//! ```

pub mod support;

pub mod error_tests;
pub mod middleware_tests;
pub mod routing_tests;
