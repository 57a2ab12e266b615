//! Integration tests for the secure-token repository using in-memory
//! SurrealDB.

use chrono::{Duration, Utc};
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use uuid::Uuid;

use workstead_core::models::organization::PRIMARY_ORGANIZATION_ID;
use workstead_core::models::token::{CreateSecureToken, TokenPurpose};
use workstead_core::repository::TokenRepository;
use workstead_db::repository::SurrealTokenRepository;

type Db = Surreal<surrealdb::engine::local::Db>;

async fn setup() -> Db {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    workstead_db::run_migrations(&db).await.unwrap();
    db
}

fn token_input(user_id: Uuid, purpose: TokenPurpose, hash: &str, ttl_hours: i64) -> CreateSecureToken {
    CreateSecureToken {
        organization_id: PRIMARY_ORGANIZATION_ID,
        user_id,
        purpose,
        secret_hash: hash.into(),
        expires_at: Utc::now() + Duration::hours(ttl_hours),
    }
}

#[tokio::test]
async fn replace_supersedes_the_live_token() {
    let db = setup().await;
    let repo = SurrealTokenRepository::new(db);
    let user_id = Uuid::new_v4();

    let first = repo
        .replace(token_input(user_id, TokenPurpose::Invitation, "hash-1", 72))
        .await
        .unwrap();
    let second = repo
        .replace(token_input(user_id, TokenPurpose::Invitation, "hash-2", 72))
        .await
        .unwrap();
    assert_ne!(first.id, second.id);

    // Only the newest token is live; the superseded hash is gone.
    let live = repo
        .get_live(user_id, TokenPurpose::Invitation, Utc::now())
        .await
        .unwrap()
        .expect("live token");
    assert_eq!(live.id, second.id);
    assert_eq!(live.secret_hash, "hash-2");
}

#[tokio::test]
async fn purposes_do_not_supersede_each_other() {
    let db = setup().await;
    let repo = SurrealTokenRepository::new(db);
    let user_id = Uuid::new_v4();

    repo.replace(token_input(user_id, TokenPurpose::Invitation, "hash-i", 72))
        .await
        .unwrap();
    repo.replace(token_input(user_id, TokenPurpose::PasswordReset, "hash-p", 72))
        .await
        .unwrap();

    assert!(
        repo.get_live(user_id, TokenPurpose::Invitation, Utc::now())
            .await
            .unwrap()
            .is_some()
    );
    assert!(
        repo.get_live(user_id, TokenPurpose::PasswordReset, Utc::now())
            .await
            .unwrap()
            .is_some()
    );
}

#[tokio::test]
async fn expired_tokens_are_not_live() {
    let db = setup().await;
    let repo = SurrealTokenRepository::new(db);
    let user_id = Uuid::new_v4();

    repo.replace(token_input(user_id, TokenPurpose::Invitation, "hash", 0))
        .await
        .unwrap();

    let live = repo
        .get_live(user_id, TokenPurpose::Invitation, Utc::now())
        .await
        .unwrap();
    assert!(live.is_none());
}

#[tokio::test]
async fn mark_used_wins_exactly_once() {
    let db = setup().await;
    let repo = SurrealTokenRepository::new(db);
    let user_id = Uuid::new_v4();

    let token = repo
        .replace(token_input(user_id, TokenPurpose::AttachmentUnlock, "hash", 72))
        .await
        .unwrap();

    assert!(repo.mark_used(token.id).await.unwrap());
    // The second redemption loses the guarded update.
    assert!(!repo.mark_used(token.id).await.unwrap());

    let live = repo
        .get_live(user_id, TokenPurpose::AttachmentUnlock, Utc::now())
        .await
        .unwrap();
    assert!(live.is_none());
}
