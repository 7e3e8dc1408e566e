//! Kernel middleware.
//!
//! - `errors`: client-fault rendering and the catch-all for server faults
//! - `auth`: session checks for logged in and administrator routes
//! - `security_headers`: response hardening headers

pub mod auth;
pub mod errors;
pub mod security_headers;

pub use auth::{Access, Auth};
pub use errors::{exceptions, http_errors};
pub use security_headers::security_headers;
