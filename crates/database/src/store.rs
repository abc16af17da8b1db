//! Storage interfaces consumed by the authentication flow.
//!
//! The SQLite repositories in [`crate::repos`] implement these for the real
//! service; [`crate::repos::memory`] provides in-process fakes for tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::entities::{NewUser, SessionRecord, User};
use crate::types::DatabaseResult;

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Persist a user and return it with its generated identifier.
    async fn create(&self, user: NewUser) -> DatabaseResult<User>;

    /// First user with this email, compared ignoring ASCII case. Absence is
    /// not an error.
    async fn find_by_email(&self, email: &str) -> DatabaseResult<Option<User>>;

    async fn find_by_id(&self, id: i64) -> DatabaseResult<Option<User>>;
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Load a live session. Expired records are reported as absent.
    async fn load(&self, token: &str) -> DatabaseResult<Option<SessionRecord>>;

    /// Insert or replace the record stored under `record.token`.
    async fn save(&self, record: &SessionRecord) -> DatabaseResult<()>;

    /// Remove a session. Deleting an unknown token is not an error.
    async fn delete(&self, token: &str) -> DatabaseResult<()>;

    /// Drop every record that expired before `now`, returning how many went.
    async fn delete_expired(&self, now: DateTime<Utc>) -> DatabaseResult<u64>;
}
