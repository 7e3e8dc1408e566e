//! Path patterns, prefix groups and resolution.

mod group;
mod resolver;
mod route;

pub use group::RoutesGroup;
pub use resolver::RoutesResolver;
pub use route::{Route, RouteArgs};
