//! Integration tests for the token service: full issue/consume round
//! trips against in-memory SurrealDB.

use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use uuid::Uuid;

use workstead_auth::config::AuthConfig;
use workstead_auth::service::TokenService;
use workstead_core::error::HrError;
use workstead_core::models::organization::PRIMARY_ORGANIZATION_ID;
use workstead_core::models::token::TokenPurpose;
use workstead_db::repository::SurrealTokenRepository;

type TokenRepo = SurrealTokenRepository<surrealdb::engine::local::Db>;

async fn setup(config: AuthConfig) -> TokenService<TokenRepo> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    workstead_db::run_migrations(&db).await.unwrap();
    TokenService::new(SurrealTokenRepository::new(db), config)
}

fn assert_opaque_failure(err: HrError) {
    // Every failure mode must collapse to the same message.
    match err {
        HrError::Unauthorized { reason } => assert_eq!(reason, "invalid or expired token"),
        other => panic!("expected unauthorized, got {other:?}"),
    }
}

#[tokio::test]
async fn round_trip_succeeds_exactly_once() {
    let service = setup(AuthConfig::default()).await;
    let user_id = Uuid::new_v4();

    let issued = service
        .issue(PRIMARY_ORGANIZATION_ID, user_id, TokenPurpose::Invitation)
        .await
        .unwrap();
    assert!(!issued.secret.is_empty());

    service
        .consume(user_id, TokenPurpose::Invitation, &issued.secret)
        .await
        .unwrap();

    // The same secret cannot be redeemed twice.
    let err = service
        .consume(user_id, TokenPurpose::Invitation, &issued.secret)
        .await
        .unwrap_err();
    assert_opaque_failure(err);
}

#[tokio::test]
async fn wrong_secret_fails_generically() {
    let service = setup(AuthConfig::default()).await;
    let user_id = Uuid::new_v4();

    service
        .issue(PRIMARY_ORGANIZATION_ID, user_id, TokenPurpose::Invitation)
        .await
        .unwrap();

    let err = service
        .consume(user_id, TokenPurpose::Invitation, "not-the-secret")
        .await
        .unwrap_err();
    assert_opaque_failure(err);
}

#[tokio::test]
async fn expired_secret_fails_even_when_correct() {
    let config = AuthConfig {
        invitation_ttl_hours: 0,
        ..AuthConfig::default()
    };
    let service = setup(config).await;
    let user_id = Uuid::new_v4();

    let issued = service
        .issue(PRIMARY_ORGANIZATION_ID, user_id, TokenPurpose::Invitation)
        .await
        .unwrap();

    let err = service
        .consume(user_id, TokenPurpose::Invitation, &issued.secret)
        .await
        .unwrap_err();
    assert_opaque_failure(err);
}

#[tokio::test]
async fn reissuing_invalidates_the_previous_secret() {
    let service = setup(AuthConfig::default()).await;
    let user_id = Uuid::new_v4();

    let first = service
        .issue(PRIMARY_ORGANIZATION_ID, user_id, TokenPurpose::PasswordReset)
        .await
        .unwrap();
    let second = service
        .issue(PRIMARY_ORGANIZATION_ID, user_id, TokenPurpose::PasswordReset)
        .await
        .unwrap();
    assert_ne!(first.secret, second.secret);

    let err = service
        .consume(user_id, TokenPurpose::PasswordReset, &first.secret)
        .await
        .unwrap_err();
    assert_opaque_failure(err);

    service
        .consume(user_id, TokenPurpose::PasswordReset, &second.secret)
        .await
        .unwrap();
}

#[tokio::test]
async fn purposes_are_isolated() {
    let service = setup(AuthConfig::default()).await;
    let user_id = Uuid::new_v4();

    let issued = service
        .issue(PRIMARY_ORGANIZATION_ID, user_id, TokenPurpose::InvoiceUnlock)
        .await
        .unwrap();

    // A valid unlock secret is not a valid invitation.
    let err = service
        .consume(user_id, TokenPurpose::Invitation, &issued.secret)
        .await
        .unwrap_err();
    assert_opaque_failure(err);
}

#[tokio::test]
async fn pepper_is_applied_to_stored_hashes() {
    let config = AuthConfig {
        token_pepper: Some("server-secret".into()),
        ..AuthConfig::default()
    };
    let service = setup(config).await;
    let user_id = Uuid::new_v4();

    let issued = service
        .issue(PRIMARY_ORGANIZATION_ID, user_id, TokenPurpose::Invitation)
        .await
        .unwrap();

    service
        .consume(user_id, TokenPurpose::Invitation, &issued.secret)
        .await
        .unwrap();
}
