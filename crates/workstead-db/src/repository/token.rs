//! SurrealDB implementation of [`TokenRepository`].
//!
//! Issuance replaces any live token for the same `(user, purpose)` in
//! one transaction; consumption marks the row used through a guarded
//! update so only one of two concurrent redemptions can succeed.

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use workstead_core::error::HrResult;
use workstead_core::models::token::{CreateSecureToken, SecureToken, TokenPurpose};
use workstead_core::repository::TokenRepository;

use crate::error::{DbError, check_transaction};
use crate::repository::user::parse_uuid;

pub(crate) fn parse_purpose(s: &str) -> Result<TokenPurpose, DbError> {
    match s {
        "Invitation" => Ok(TokenPurpose::Invitation),
        "PasswordReset" => Ok(TokenPurpose::PasswordReset),
        "AttachmentUnlock" => Ok(TokenPurpose::AttachmentUnlock),
        "InvoiceUnlock" => Ok(TokenPurpose::InvoiceUnlock),
        other => Err(DbError::Query(format!("unknown token purpose: {other}"))),
    }
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct TokenRowWithId {
    record_id: String,
    organization_id: String,
    user_id: String,
    purpose: String,
    secret_hash: String,
    expires_at: DateTime<Utc>,
    used_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl TokenRowWithId {
    fn try_into_token(self) -> Result<SecureToken, DbError> {
        Ok(SecureToken {
            id: parse_uuid(&self.record_id, "secure_token")?,
            organization_id: parse_uuid(&self.organization_id, "organization")?,
            user_id: parse_uuid(&self.user_id, "user")?,
            purpose: parse_purpose(&self.purpose)?,
            secret_hash: self.secret_hash,
            expires_at: self.expires_at,
            used_at: self.used_at,
            created_at: self.created_at,
        })
    }
}

/// SurrealDB implementation of the secure-token repository.
#[derive(Clone)]
pub struct SurrealTokenRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealTokenRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> TokenRepository for SurrealTokenRepository<C> {
    async fn replace(&self, input: CreateSecureToken) -> HrResult<SecureToken> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        // Supersede-then-insert as one atomic unit: at most one live
        // token per (user, purpose) can ever exist.
        let result = self
            .db
            .query(
                "BEGIN TRANSACTION;
                 DELETE secure_token \
                     WHERE user_id = $user_id AND purpose = $purpose \
                     AND used_at IS NONE;
                 CREATE type::record('secure_token', $id) SET \
                     organization_id = $organization_id, \
                     user_id = $user_id, \
                     purpose = $purpose, \
                     secret_hash = $secret_hash, \
                     expires_at = $expires_at, \
                     used_at = NONE;
                 COMMIT TRANSACTION;",
            )
            .bind(("id", id_str.clone()))
            .bind(("organization_id", input.organization_id.to_string()))
            .bind(("user_id", input.user_id.to_string()))
            .bind(("purpose", input.purpose.as_str().to_string()))
            .bind(("secret_hash", input.secret_hash.clone()))
            .bind(("expires_at", input.expires_at))
            .await
            .map_err(DbError::from)?;

        check_transaction(result)?;

        Ok(SecureToken {
            id,
            organization_id: input.organization_id,
            user_id: input.user_id,
            purpose: input.purpose,
            secret_hash: input.secret_hash,
            expires_at: input.expires_at,
            used_at: None,
            created_at: Utc::now(),
        })
    }

    async fn get_live(
        &self,
        user_id: Uuid,
        purpose: TokenPurpose,
        now: DateTime<Utc>,
    ) -> HrResult<Option<SecureToken>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM secure_token \
                 WHERE user_id = $user_id AND purpose = $purpose \
                 AND used_at IS NONE AND expires_at > $now",
            )
            .bind(("user_id", user_id.to_string()))
            .bind(("purpose", purpose.as_str().to_string()))
            .bind(("now", now))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TokenRowWithId> = result.take(0).map_err(DbError::from)?;
        let token = rows
            .into_iter()
            .next()
            .map(|row| row.try_into_token())
            .transpose()?;

        Ok(token)
    }

    async fn mark_used(&self, id: Uuid) -> HrResult<bool> {
        // Guarded read-modify-write: the update only matches while
        // used_at is still null, so exactly one caller sees a row back.
        let mut result = self
            .db
            .query(
                "UPDATE type::record('secure_token', $id) \
                 SET used_at = time::now() \
                 WHERE used_at IS NONE \
                 RETURN VALUE meta::id(id)",
            )
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        let updated: Vec<String> = result.take(0).map_err(DbError::from)?;
        Ok(!updated.is_empty())
    }
}
