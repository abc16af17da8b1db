//! Server-side session records

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde_json::Value;

/// Session state for one client, keyed by the opaque token the client holds.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionRecord {
    pub token: String,
    pub data: HashMap<String, Value>,
    pub expires_at: DateTime<Utc>,
}

impl SessionRecord {
    pub fn new(token: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            token: token.into(),
            data: HashMap::new(),
            expires_at,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}
