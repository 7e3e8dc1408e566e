//! Generic persistence: values, the SQLite storage adapter, data mappers and repositories.
//!
//! Layering, innermost first:
//!
//! - [`Value`]: one coercion-aware scalar crossing the storage boundary
//! - [`SqliteAdapter`]: table-bound executor of parameterized statements
//! - [`DataMapper`]: per-entity translation between entity and [`Fields`]
//! - [`MapperRepository`]: entity-facing CRUD over a mapper
//!
//! Every instance is a cheap wrapper around the pool handle; nothing is cached
//! and every call round-trips to the database.

pub mod adapter;
pub mod error;
pub mod mapper;
pub mod repository;
pub mod value;

pub use adapter::SqliteAdapter;
pub use error::{MappingError, StorageError, ValueError};
pub use mapper::DataMapper;
pub use repository::{MapperRepository, Repository};
pub use value::{Fields, Primitive, Value, TIMESTAMP_FORMAT};
