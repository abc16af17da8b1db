//! Domain entities for the database layer

pub mod session;
pub mod user;

pub use session::SessionRecord;
pub use user::{NewUser, User};

use chrono::{DateTime, SecondsFormat, Utc};

/// Fixed-width RFC 3339 so stored timestamps compare correctly as text.
pub fn timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}
