//! One-time token issuance and redemption.

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use workstead_core::error::{HrError, HrResult};
use workstead_core::models::token::{CreateSecureToken, TokenPurpose};
use workstead_core::repository::TokenRepository;

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::secret;

/// Result of issuing a token. `secret` is the only copy of the
/// plaintext value that will ever exist — it is not stored and cannot
/// be retrieved again.
#[derive(Debug)]
pub struct IssuedToken {
    pub secret: String,
    pub expires_at: DateTime<Utc>,
}

/// Token service.
///
/// Generic over the repository implementation so that issuance and
/// redemption logic has no dependency on the database crate.
pub struct TokenService<R: TokenRepository> {
    repo: R,
    config: AuthConfig,
}

impl<R: TokenRepository> TokenService<R> {
    pub fn new(repo: R, config: AuthConfig) -> Self {
        Self { repo, config }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Build a token row without persisting it, for callers that embed
    /// the row in a larger transaction (e.g. invitation provisioning).
    /// The plaintext secret is returned alongside; it is never stored.
    pub fn prepare(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
        purpose: TokenPurpose,
    ) -> (CreateSecureToken, IssuedToken) {
        let raw = secret::generate_secret();
        let secret_hash = secret::hash_secret(&raw, self.config.token_pepper.as_deref());
        let expires_at = Utc::now() + Duration::hours(self.config.ttl_hours(purpose) as i64);

        (
            CreateSecureToken {
                organization_id,
                user_id,
                purpose,
                secret_hash,
                expires_at,
            },
            IssuedToken {
                secret: raw,
                expires_at,
            },
        )
    }

    /// Issue a fresh token for `(user, purpose)`.
    ///
    /// Any live token for the same subject and purpose is superseded in
    /// the same write, so at most one secret is redeemable at a time.
    pub async fn issue(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
        purpose: TokenPurpose,
    ) -> HrResult<IssuedToken> {
        let (row, issued) = self.prepare(organization_id, user_id, purpose);
        self.repo.replace(row).await?;
        Ok(issued)
    }

    /// Redeem a secret. Succeeds at most once per issued token.
    ///
    /// Every failure mode — no live token, expired, already used, or
    /// wrong secret — collapses into the same generic error so callers
    /// cannot probe token state.
    pub async fn consume(
        &self,
        user_id: Uuid,
        purpose: TokenPurpose,
        provided: &str,
    ) -> HrResult<()> {
        // 1. Look up the live token for this subject and purpose.
        let token = self
            .repo
            .get_live(user_id, purpose, Utc::now())
            .await?
            .ok_or_else(|| HrError::from(AuthError::TokenInvalid))?;

        // 2. Constant-time hash comparison.
        let provided_hash = secret::hash_secret(provided, self.config.token_pepper.as_deref());
        if !secret::hashes_match(&token.secret_hash, &provided_hash) {
            return Err(AuthError::TokenInvalid.into());
        }

        // 3. Atomic mark-used; exactly one concurrent redemption wins.
        if !self.repo.mark_used(token.id).await? {
            return Err(AuthError::TokenInvalid.into());
        }

        Ok(())
    }
}
