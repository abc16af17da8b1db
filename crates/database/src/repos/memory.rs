//! In-memory store implementations for exercising the auth flow without SQLite

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::entities::{timestamp, NewUser, SessionRecord, User};
use crate::store::{SessionStore, UserStore};
use crate::types::{DatabaseError, DatabaseResult};

/// In-memory user store. Identifiers start at 1 like the SQLite table.
#[derive(Clone, Default)]
pub struct MemoryUserStore {
    users: Arc<RwLock<Vec<User>>>,
    unavailable: Arc<AtomicBool>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail with [`DatabaseError::Unavailable`].
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }

    fn check_available(&self) -> DatabaseResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(DatabaseError::Unavailable);
        }
        Ok(())
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create(&self, user: NewUser) -> DatabaseResult<User> {
        self.check_available()?;

        let mut users = self.users.write().await;
        let now = timestamp(Utc::now());
        let created = User {
            id: users.last().map_or(1, |last| last.id + 1),
            email: user.email,
            password_hash: user.password_hash,
            created_at: now.clone(),
            updated_at: now,
        };
        users.push(created.clone());
        Ok(created)
    }

    async fn find_by_email(&self, email: &str) -> DatabaseResult<Option<User>> {
        self.check_available()?;
        let users = self.users.read().await;
        Ok(users
            .iter()
            .find(|user| user.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn find_by_id(&self, id: i64) -> DatabaseResult<Option<User>> {
        self.check_available()?;
        let users = self.users.read().await;
        Ok(users.iter().find(|user| user.id == id).cloned())
    }
}

/// In-memory session store keyed by token.
#[derive(Clone, Default)]
pub struct MemorySessionStore {
    sessions: Arc<RwLock<HashMap<String, SessionRecord>>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self, token: &str) -> DatabaseResult<Option<SessionRecord>> {
        let sessions = self.sessions.read().await;
        Ok(sessions
            .get(token)
            .filter(|record| !record.is_expired(Utc::now()))
            .cloned())
    }

    async fn save(&self, record: &SessionRecord) -> DatabaseResult<()> {
        let mut sessions = self.sessions.write().await;
        sessions.insert(record.token.clone(), record.clone());
        Ok(())
    }

    async fn delete(&self, token: &str) -> DatabaseResult<()> {
        self.sessions.write().await.remove(token);
        Ok(())
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> DatabaseResult<u64> {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, record| !record.is_expired(now));
        Ok((before - sessions.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[tokio::test]
    async fn user_ids_are_sequential_from_one() {
        let store = MemoryUserStore::new();
        let first = store
            .create(NewUser {
                email: "a@b.com".into(),
                password_hash: "hash".into(),
            })
            .await
            .unwrap();
        let second = store
            .create(NewUser {
                email: "c@d.com".into(),
                password_hash: "hash".into(),
            })
            .await
            .unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
    }

    #[tokio::test]
    async fn find_by_email_returns_first_match() {
        let store = MemoryUserStore::new();
        for hash in ["first", "second"] {
            store
                .create(NewUser {
                    email: "dup@example.com".into(),
                    password_hash: hash.into(),
                })
                .await
                .unwrap();
        }

        let found = store.find_by_email("dup@example.com").await.unwrap().unwrap();
        assert_eq!(found.id, 1);
        assert_eq!(found.password_hash, "first");
        assert!(store.find_by_email("missing@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn find_by_email_ignores_ascii_case() {
        let store = MemoryUserStore::new();
        store
            .create(NewUser {
                email: "Mixed@Example.com".into(),
                password_hash: "hash".into(),
            })
            .await
            .unwrap();

        let found = store.find_by_email("mixed@example.COM").await.unwrap().unwrap();
        assert_eq!(found.id, 1);
        assert_eq!(found.email, "Mixed@Example.com");
    }

    #[tokio::test]
    async fn unavailable_store_rejects_writes() {
        let store = MemoryUserStore::new();
        store.set_unavailable(true);

        let result = store
            .create(NewUser {
                email: "a@b.com".into(),
                password_hash: "hash".into(),
            })
            .await;

        assert!(matches!(result, Err(DatabaseError::Unavailable)));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn expired_sessions_are_hidden_and_swept() {
        let store = MemorySessionStore::new();
        let now = Utc::now();
        store
            .save(&SessionRecord::new("stale", now - Duration::seconds(5)))
            .await
            .unwrap();
        store
            .save(&SessionRecord::new("live", now + Duration::hours(1)))
            .await
            .unwrap();

        assert!(store.load("stale").await.unwrap().is_none());
        assert!(store.load("live").await.unwrap().is_some());
        assert_eq!(store.delete_expired(now).await.unwrap(), 1);
        assert_eq!(store.len().await, 1);
    }
}
