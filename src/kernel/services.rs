use sqlx::SqlitePool;

use super::session::{Session, SessionStore};
use crate::config::AppConfig;
use crate::http::Request;
use crate::metrics::Metrics;
use crate::models::{FileRepository, FolderRepository, ShareRecordRepository, UserRepository};
use crate::orm::MapperRepository;
use crate::state::AppState;

/// Everything a middleware or action may need while handling one request.
///
/// Built per request and dropped with it. Repositories are constructed on
/// every call; nothing is cached between calls.
#[derive(Clone)]
pub struct Services {
    state: AppState,
    session: Session,
}

impl Services {
    pub fn new(state: AppState, session: Session) -> Self {
        Self { state, session }
    }

    /// Looks up the session named by the request's bearer token.
    pub async fn for_request(state: AppState, request: &Request) -> Self {
        let session = state.sessions.session_for(request.headers()).await;
        Self::new(state, session)
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn config(&self) -> &AppConfig {
        &self.state.config
    }

    pub fn db(&self) -> &SqlitePool {
        &self.state.db
    }

    pub fn metrics(&self) -> &Metrics {
        &self.state.metrics
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.state.sessions
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn users(&self) -> UserRepository {
        MapperRepository::from_pool(self.state.db.clone())
    }

    pub fn folders(&self) -> FolderRepository {
        MapperRepository::from_pool(self.state.db.clone())
    }

    pub fn files(&self) -> FileRepository {
        MapperRepository::from_pool(self.state.db.clone())
    }

    pub fn share_records(&self) -> ShareRecordRepository {
        MapperRepository::from_pool(self.state.db.clone())
    }
}
