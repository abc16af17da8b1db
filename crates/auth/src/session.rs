//! Server-side sessions bound to an opaque client token.
//!
//! A [`SessionManager`] hands out one [`Session`] per request. The session
//! reads and writes through the [`SessionStore`] on every call, so two
//! requests carrying the same token always observe each other's writes.

use std::sync::{Arc, Mutex};

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{DateTime, Duration, Utc};
use loginreg_config::AuthConfig;
use loginreg_database::{DatabaseResult, SessionRecord, SessionStore};
use rand::RngCore;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

/// Session key holding the authenticated user's identifier.
pub const USER_ID_KEY: &str = "user_id";

// keeps expiry timestamps inside four-digit years
const MAX_SESSION_TTL_SECONDS: u64 = 10 * 365 * 24 * 60 * 60;

#[derive(Clone)]
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    ttl: Duration,
}

impl SessionManager {
    pub fn new(store: Arc<dyn SessionStore>, config: &AuthConfig) -> Self {
        Self::with_ttl_seconds(store, config.session_ttl_seconds)
    }

    pub fn with_ttl_seconds(store: Arc<dyn SessionStore>, ttl_seconds: u64) -> Self {
        let seconds = ttl_seconds.min(MAX_SESSION_TTL_SECONDS) as i64;
        Self {
            store,
            ttl: Duration::seconds(seconds),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Bind a session to the token the client presented.
    ///
    /// Unknown or expired tokens are never adopted; the client gets a fresh
    /// token instead.
    pub async fn open(&self, token: Option<&str>) -> DatabaseResult<Session> {
        if let Some(token) = token.filter(|token| !token.is_empty()) {
            if self.store.load(token).await?.is_some() {
                return Ok(self.session(token.to_owned(), false));
            }
            debug!("client presented an unknown session token");
        }

        Ok(self.session(generate_session_token(), true))
    }

    pub async fn purge_expired(&self) -> DatabaseResult<u64> {
        self.store.delete_expired(Utc::now()).await
    }

    fn session(&self, token: String, is_new: bool) -> Session {
        Session {
            store: Arc::clone(&self.store),
            ttl: self.ttl,
            token,
            is_new,
            change: Arc::new(Mutex::new(SessionChange::Untouched)),
        }
    }
}

/// Last mutation a request made to its session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionChange {
    Untouched,
    Written,
    Cleared,
}

#[derive(Clone)]
pub struct Session {
    store: Arc<dyn SessionStore>,
    ttl: Duration,
    token: String,
    is_new: bool,
    change: Arc<Mutex<SessionChange>>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("is_new", &self.is_new)
            .field("change", &self.change())
            .finish_non_exhaustive()
    }
}

impl Session {
    pub fn token(&self) -> &str {
        &self.token
    }

    /// True when the client did not present a live token with this request.
    pub fn is_new(&self) -> bool {
        self.is_new
    }

    pub fn change(&self) -> SessionChange {
        self.change
            .lock()
            .map(|guard| *guard)
            .unwrap_or(SessionChange::Untouched)
    }

    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> DatabaseResult<Option<T>> {
        let Some(record) = self.store.load(&self.token).await? else {
            return Ok(None);
        };

        match record.data.get(key) {
            Some(value) => Ok(Some(serde_json::from_value(value.clone())?)),
            None => Ok(None),
        }
    }

    /// Set `key`, creating the session if needed and extending its expiry.
    pub async fn insert<T: Serialize>(&self, key: &str, value: T) -> DatabaseResult<()> {
        let value = serde_json::to_value(value)?;
        let mut record = self
            .store
            .load(&self.token)
            .await?
            .unwrap_or_else(|| SessionRecord::new(self.token.clone(), self.expiry()));

        record.data.insert(key.to_owned(), value);
        record.expires_at = self.expiry();
        self.store.save(&record).await?;
        self.record_change(SessionChange::Written);
        Ok(())
    }

    pub async fn remove(&self, key: &str) -> DatabaseResult<Option<Value>> {
        let Some(mut record) = self.store.load(&self.token).await? else {
            return Ok(None);
        };

        let removed = record.data.remove(key);
        if removed.is_some() {
            self.store.save(&record).await?;
            self.record_change(SessionChange::Written);
        }
        Ok(removed)
    }

    /// Drop every attribute. Safe to call on a session that holds nothing.
    pub async fn clear(&self) -> DatabaseResult<()> {
        self.store.delete(&self.token).await?;
        self.record_change(SessionChange::Cleared);
        Ok(())
    }

    pub async fn user_id(&self) -> DatabaseResult<Option<i64>> {
        self.get(USER_ID_KEY).await
    }

    pub async fn set_user_id(&self, user_id: i64) -> DatabaseResult<()> {
        self.insert(USER_ID_KEY, user_id).await
    }

    fn expiry(&self) -> DateTime<Utc> {
        Utc::now() + self.ttl
    }

    fn record_change(&self, change: SessionChange) {
        if let Ok(mut guard) = self.change.lock() {
            *guard = change;
        }
    }
}

fn generate_session_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use loginreg_database::MemorySessionStore;

    fn manager(store: &MemorySessionStore) -> SessionManager {
        SessionManager::with_ttl_seconds(Arc::new(store.clone()), 3_600)
    }

    #[tokio::test]
    async fn fresh_session_is_empty_and_untouched() {
        let store = MemorySessionStore::new();
        let session = manager(&store).open(None).await.unwrap();

        assert!(session.is_new());
        assert_eq!(session.token().len(), 43);
        assert_eq!(session.user_id().await.unwrap(), None);
        assert_eq!(session.change(), SessionChange::Untouched);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn user_id_round_trips_through_store() {
        let store = MemorySessionStore::new();
        let manager = manager(&store);

        let session = manager.open(None).await.unwrap();
        session.set_user_id(1).await.unwrap();
        assert_eq!(session.change(), SessionChange::Written);

        let next_request = manager.open(Some(session.token())).await.unwrap();
        assert!(!next_request.is_new());
        assert_eq!(next_request.token(), session.token());
        assert_eq!(next_request.user_id().await.unwrap(), Some(1));
    }

    #[tokio::test]
    async fn clear_is_idempotent() {
        let store = MemorySessionStore::new();
        let session = manager(&store).open(None).await.unwrap();
        session.set_user_id(5).await.unwrap();

        session.clear().await.unwrap();
        assert_eq!(session.user_id().await.unwrap(), None);

        session.clear().await.unwrap();
        assert_eq!(session.user_id().await.unwrap(), None);
        assert_eq!(session.change(), SessionChange::Cleared);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn unknown_token_is_replaced() {
        let store = MemorySessionStore::new();
        let session = manager(&store).open(Some("forged-token")).await.unwrap();

        assert!(session.is_new());
        assert_ne!(session.token(), "forged-token");
    }

    #[tokio::test]
    async fn remove_drops_single_key() {
        let store = MemorySessionStore::new();
        let session = manager(&store).open(None).await.unwrap();
        session.insert("theme", "dark").await.unwrap();
        session.set_user_id(3).await.unwrap();

        let removed = session.remove("theme").await.unwrap();
        assert_eq!(removed, Some(Value::from("dark")));
        assert_eq!(session.get::<String>("theme").await.unwrap(), None);
        assert_eq!(session.user_id().await.unwrap(), Some(3));
    }

    #[tokio::test]
    async fn oversized_ttl_is_capped() {
        let store = MemorySessionStore::new();
        let manager = SessionManager::with_ttl_seconds(Arc::new(store), u64::MAX);
        assert_eq!(manager.ttl(), Duration::seconds(MAX_SESSION_TTL_SECONDS as i64));
    }

    #[tokio::test]
    async fn configured_ttl_beyond_i64_is_capped_and_usable() {
        let config = AuthConfig {
            session_ttl_seconds: i64::MAX as u64 + 42,
            ..AuthConfig::default()
        };
        let store = MemorySessionStore::new();
        let manager = SessionManager::new(Arc::new(store.clone()), &config);
        assert_eq!(manager.ttl(), Duration::seconds(MAX_SESSION_TTL_SECONDS as i64));

        let session = manager.open(None).await.unwrap();
        session.set_user_id(7).await.unwrap();
        assert_eq!(store.len().await, 1);
    }
}
