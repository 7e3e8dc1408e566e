use std::collections::HashMap;
use std::sync::Arc;

use axum::http::{header::AUTHORIZATION, HeaderMap};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// What a login session remembers about its user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionUser {
    pub id: i64,
    pub is_admin: bool,
}

/// The session of the request being handled.
#[derive(Debug, Clone, Default)]
pub struct Session {
    token: Option<String>,
    user: Option<SessionUser>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn authenticated(token: impl Into<String>, user: SessionUser) -> Self {
        Self { token: Some(token.into()), user: Some(user) }
    }

    pub fn is_logged_in(&self) -> bool {
        self.user.is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.user.map(|u| u.is_admin).unwrap_or(false)
    }

    pub fn user(&self) -> Option<SessionUser> {
        self.user
    }

    /// Id of the logged in user. Actions reach this only behind the auth
    /// middleware, so an anonymous session here is a wiring bug.
    pub fn user_id(&self) -> AppResult<i64> {
        self.user
            .map(|u| u.id)
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("no user in session")))
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }
}

/// In-memory token to session map shared across requests.
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<String, SessionUser>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a session and returns its bearer token.
    pub async fn open(&self, user: SessionUser) -> String {
        let token = Uuid::new_v4().simple().to_string();
        self.inner.write().await.insert(token.clone(), user);
        token
    }

    pub async fn lookup(&self, token: &str) -> Option<SessionUser> {
        self.inner.read().await.get(token).copied()
    }

    pub async fn close(&self, token: &str) -> bool {
        self.inner.write().await.remove(token).is_some()
    }

    /// Ends every session of `user_id`, e.g. after the account was deleted.
    pub async fn close_user(&self, user_id: i64) -> usize {
        let mut map = self.inner.write().await;
        let before = map.len();
        map.retain(|_, u| u.id != user_id);
        before - map.len()
    }

    pub async fn session_for(&self, headers: &HeaderMap) -> Session {
        match bearer_token(headers) {
            Some(token) => match self.lookup(token).await {
                Some(user) => Session::authenticated(token, user),
                None => Session::anonymous(),
            },
            None => Session::anonymous(),
        }
    }
}

/// Extracts the token from `Authorization: Bearer <token>`.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_bearer_token() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        assert_eq!(bearer_token(&headers), Some("abc"));
        headers.insert(AUTHORIZATION, HeaderValue::from_static("bearer  xyz "));
        assert_eq!(bearer_token(&headers), Some("xyz"));
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(bearer_token(&headers), None);
    }

    #[tokio::test]
    async fn test_store_open_lookup_close() {
        let store = SessionStore::new();
        let token = store.open(SessionUser { id: 7, is_admin: false }).await;
        assert_eq!(store.lookup(&token).await.map(|u| u.id), Some(7));
        assert!(store.close(&token).await);
        assert!(store.lookup(&token).await.is_none());
        assert!(!store.close(&token).await);
    }
}
