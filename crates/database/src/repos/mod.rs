//! Database repository implementations

pub mod memory;
pub mod session_repository;
pub mod user_repository;

pub use memory::{MemorySessionStore, MemoryUserStore};
pub use session_repository::SessionRepository;
pub use user_repository::UserRepository;
