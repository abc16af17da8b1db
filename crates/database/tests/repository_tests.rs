//! Repository-level tests against a migrated SQLite database

use chrono::{Duration, Utc};
use loginreg_config::DatabaseConfig;
use loginreg_database::{
    initialize_database, NewUser, SessionRecord, SessionRepository, SessionStore, UserRepository,
    UserStore,
};
use serde_json::json;
use sqlx::SqlitePool;
use tempfile::TempDir;

/// Helper function to create a migrated test database
async fn create_test_database() -> (SqlitePool, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("repo_tests.db");
    let config = DatabaseConfig {
        url: format!("sqlite://{}", db_path.display()),
        max_connections: 2,
    };

    let pool = initialize_database(&config)
        .await
        .expect("Failed to create test database");

    (pool, temp_dir)
}

fn new_user(email: &str, password_hash: &str) -> NewUser {
    NewUser {
        email: email.to_string(),
        password_hash: password_hash.to_string(),
    }
}

#[tokio::test]
async fn test_user_create_assigns_identifiers_from_one() {
    let (pool, _temp_dir) = create_test_database().await;
    let repo = UserRepository::new(pool);

    let first = repo.create(new_user("a@b.com", "$argon2id$first")).await.unwrap();
    let second = repo.create(new_user("c@d.com", "$argon2id$second")).await.unwrap();

    assert_eq!(first.id, 1);
    assert_eq!(second.id, 2);
    assert_eq!(first.email, "a@b.com");
    assert_eq!(first.created_at, first.updated_at);
}

#[tokio::test]
async fn test_user_lookup_by_email_and_id() {
    let (pool, _temp_dir) = create_test_database().await;
    let repo = UserRepository::new(pool);

    let created = repo.create(new_user("a@b.com", "$argon2id$hash")).await.unwrap();

    let by_email = repo.find_by_email("a@b.com").await.unwrap().unwrap();
    assert_eq!(by_email, created);

    let by_id = repo.find_by_id(created.id).await.unwrap().unwrap();
    assert_eq!(by_id.password_hash, "$argon2id$hash");

    assert!(repo.find_by_email("nobody@b.com").await.unwrap().is_none());
    assert!(repo.find_by_id(999).await.unwrap().is_none());
}

#[tokio::test]
async fn test_duplicate_emails_resolve_to_first_record() {
    let (pool, _temp_dir) = create_test_database().await;
    let repo = UserRepository::new(pool);

    let first = repo.create(new_user("dup@b.com", "$argon2id$one")).await.unwrap();
    repo.create(new_user("dup@b.com", "$argon2id$two")).await.unwrap();

    let found = repo.find_by_email("dup@b.com").await.unwrap().unwrap();
    assert_eq!(found.id, first.id);
}

#[tokio::test]
async fn test_email_lookup_ignores_case() {
    let (pool, _temp_dir) = create_test_database().await;
    let repo = UserRepository::new(pool);

    let created = repo.create(new_user("A@B.com", "$argon2id$hash")).await.unwrap();

    for variant in ["a@b.com", "A@B.COM", "A@B.com"] {
        let found = repo.find_by_email(variant).await.unwrap().unwrap();
        assert_eq!(found.id, created.id);
        assert_eq!(found.email, "A@B.com", "stored casing is preserved");
    }
}

#[tokio::test]
async fn test_closed_pool_surfaces_database_error() {
    let (pool, _temp_dir) = create_test_database().await;
    let repo = UserRepository::new(pool.clone());
    pool.close().await;

    let result = repo.create(new_user("a@b.com", "$argon2id$hash")).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_session_save_load_and_overwrite() {
    let (pool, _temp_dir) = create_test_database().await;
    let repo = SessionRepository::new(pool);

    let mut record = SessionRecord::new("token-1", Utc::now() + Duration::hours(1));
    record.data.insert("user_id".to_string(), json!(1));
    repo.save(&record).await.unwrap();

    let loaded = repo.load("token-1").await.unwrap().unwrap();
    assert_eq!(loaded.data.get("user_id"), Some(&json!(1)));

    record.data.insert("user_id".to_string(), json!(7));
    repo.save(&record).await.unwrap();

    let loaded = repo.load("token-1").await.unwrap().unwrap();
    assert_eq!(loaded.data.get("user_id"), Some(&json!(7)));

    let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sessions")
        .fetch_one(repo.pool())
        .await
        .unwrap();
    assert_eq!(rows, 1);
}

#[tokio::test]
async fn test_session_delete_is_idempotent() {
    let (pool, _temp_dir) = create_test_database().await;
    let repo = SessionRepository::new(pool);

    let record = SessionRecord::new("token-1", Utc::now() + Duration::hours(1));
    repo.save(&record).await.unwrap();

    repo.delete("token-1").await.unwrap();
    repo.delete("token-1").await.unwrap();

    assert!(repo.load("token-1").await.unwrap().is_none());
}

#[tokio::test]
async fn test_expired_sessions_are_not_loaded_and_get_swept() {
    let (pool, _temp_dir) = create_test_database().await;
    let repo = SessionRepository::new(pool);
    let now = Utc::now();

    repo.save(&SessionRecord::new("stale", now - Duration::seconds(30)))
        .await
        .unwrap();
    repo.save(&SessionRecord::new("live", now + Duration::hours(1)))
        .await
        .unwrap();

    assert!(repo.load("stale").await.unwrap().is_none());
    assert!(repo.load("live").await.unwrap().is_some());

    let removed = repo.delete_expired(now).await.unwrap();
    assert_eq!(removed, 1);
    assert!(repo.load("live").await.unwrap().is_some());
}
