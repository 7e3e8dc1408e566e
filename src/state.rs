use std::sync::Arc;

use crate::config::AppConfig;
use crate::kernel::SessionStore;
use crate::metrics::Metrics;

/// Process-wide state shared by every request.
///
/// Cloning is cheap: the pool, config and counters are all reference-counted.
#[derive(Clone)]
pub struct AppState {
    /// The database connection pool handed to every storage adapter.
    pub db: sqlx::SqlitePool,
    pub config: Arc<AppConfig>,
    pub metrics: Metrics,
    /// Open login sessions keyed by bearer token.
    pub sessions: SessionStore,
}

impl AppState {
    pub fn new(db: sqlx::SqlitePool, config: AppConfig) -> Self {
        Self { db, config: Arc::new(config), metrics: Metrics::new(), sessions: SessionStore::new() }
    }
}
