//! Integration tests for the PostgreSQL store.
//!
//! These need a live server: run with
//! `DATABASE_URL=postgres://... cargo test -p keyward-db -- --ignored`.

use assert_matches::assert_matches;
use chrono::{Duration, Utc};
use keyward_core::roles::Role;
use keyward_db::models::email_verification::CreateEmailVerification;
use keyward_db::models::identity::CreateIdentity;
use keyward_db::models::session::CreateSession;
use keyward_db::repositories::{IdentityRepo, SessionRepo};
use keyward_db::{AuthStore, PgAuthStore, StoreError};
use sqlx::PgPool;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn new_identity(username: &str) -> CreateIdentity {
    CreateIdentity {
        username: username.to_string(),
        full_name: format!("{username} test"),
        email: Some(format!("{username}@test.com")),
        phone_number: "+1555".to_string(),
        password_hash: "$argon2id$placeholder".to_string(),
        role: Role::User,
    }
}

fn new_session(username: &str) -> CreateSession {
    CreateSession {
        id: Uuid::new_v4(),
        username: username.to_string(),
        refresh_token: format!("refresh-{}", Uuid::new_v4()),
        user_agent: "test-agent".to_string(),
        client_ip: "127.0.0.1".to_string(),
        expires_at: Utc::now() + Duration::hours(24),
    }
}

fn new_verification(username: &str, expires_in: Duration) -> CreateEmailVerification {
    CreateEmailVerification {
        id: Uuid::new_v4(),
        username: username.to_string(),
        email: format!("{username}@test.com"),
        secret_code: "s3cret".to_string(),
        expires_at: Utc::now() + expires_in,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires a live PostgreSQL via DATABASE_URL"]
async fn test_register_commits_identity_and_session(pool: PgPool) {
    let store = PgAuthStore::new(pool.clone());
    let (identity, session) = store
        .register(&new_identity("alice"), &new_session("alice"))
        .await
        .unwrap();

    assert_eq!(identity.username, "alice");
    assert_eq!(identity.role, "user");
    assert!(!identity.is_verified);

    let found = SessionRepo::find_by_id(&pool, session.id).await.unwrap().unwrap();
    assert_eq!(found.username, "alice");
    assert!(!found.is_blocked);
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires a live PostgreSQL via DATABASE_URL"]
async fn test_register_rolls_back_when_session_insert_fails(pool: PgPool) {
    let store = PgAuthStore::new(pool.clone());
    store
        .register(&new_identity("alice"), &new_session("alice"))
        .await
        .unwrap();

    // Reuse an existing session id so the second insert in the transaction fails.
    let taken = SessionRepo::list_for_username(&pool, "alice").await.unwrap()[0].id;
    let mut clash = new_session("bob");
    clash.id = taken;

    let result = store.register(&new_identity("bob"), &clash).await;
    assert_matches!(result, Err(StoreError::Duplicate { entity: "session", .. }));
    assert!(IdentityRepo::find_by_username(&pool, "bob").await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires a live PostgreSQL via DATABASE_URL"]
async fn test_duplicate_username_is_classified(pool: PgPool) {
    let store = PgAuthStore::new(pool);
    store
        .register(&new_identity("alice"), &new_session("alice"))
        .await
        .unwrap();

    let mut again = new_identity("alice");
    again.email = None;
    assert_matches!(
        store.register(&again, &new_session("alice")).await,
        Err(StoreError::Duplicate { entity: "identity", .. })
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires a live PostgreSQL via DATABASE_URL"]
async fn test_sessions_are_independent_and_blockable(pool: PgPool) {
    let store = PgAuthStore::new(pool);
    let (_, first) = store
        .register(&new_identity("alice"), &new_session("alice"))
        .await
        .unwrap();
    let second = store.create_session(&new_session("alice")).await.unwrap();
    assert_ne!(first.id, second.id);

    assert!(store.set_session_blocked(first.id, true).await.unwrap());
    assert!(store.find_session(first.id).await.unwrap().unwrap().is_blocked);
    assert!(!store.find_session(second.id).await.unwrap().unwrap().is_blocked);

    assert_eq!(store.block_sessions_for("alice").await.unwrap(), 1);
    assert_eq!(store.list_sessions_for("alice").await.unwrap().len(), 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires a live PostgreSQL via DATABASE_URL"]
async fn test_login_lookup_by_email(pool: PgPool) {
    let store = PgAuthStore::new(pool);
    store
        .register(&new_identity("alice"), &new_session("alice"))
        .await
        .unwrap();

    let found = store.find_identity_by_login("alice@test.com").await.unwrap();
    assert_eq!(found.unwrap().username, "alice");
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires a live PostgreSQL via DATABASE_URL"]
async fn test_email_verification_flips_identity_once(pool: PgPool) {
    let store = PgAuthStore::new(pool);
    store
        .register(&new_identity("alice"), &new_session("alice"))
        .await
        .unwrap();
    let issued = store
        .create_email_verification(&new_verification("alice", Duration::minutes(15)))
        .await
        .unwrap();

    let identity = store.complete_email_verification(issued.id).await.unwrap();
    assert!(identity.unwrap().is_verified);
    assert!(store.find_email_verification(issued.id).await.unwrap().unwrap().is_used);
    assert!(store.complete_email_verification(issued.id).await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires a live PostgreSQL via DATABASE_URL"]
async fn test_mismatched_verification_rolls_back(pool: PgPool) {
    let store = PgAuthStore::new(pool);
    store
        .register(&new_identity("alice"), &new_session("alice"))
        .await
        .unwrap();
    let mut stale_address = new_verification("alice", Duration::minutes(15));
    stale_address.email = "old@test.com".to_string();
    let issued = store.create_email_verification(&stale_address).await.unwrap();

    assert!(store.complete_email_verification(issued.id).await.unwrap().is_none());
    assert!(!store.find_email_verification(issued.id).await.unwrap().unwrap().is_used);
    assert!(!store.find_identity("alice").await.unwrap().unwrap().is_verified);
}
