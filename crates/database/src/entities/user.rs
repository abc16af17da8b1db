//! User entity definitions

use serde::{Deserialize, Serialize};

/// A registered user.
///
/// `password_hash` only ever holds the PHC-formatted hash produced at
/// registration and is never serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Insert payload for a user whose password has already been hashed
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
}
