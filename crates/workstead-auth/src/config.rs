//! Authentication configuration.

use std::env;

use workstead_core::models::token::TokenPurpose;

/// Configuration for token issuance and link construction.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Base URL the secure links are rooted at (e.g. `https://hr.acme.com`).
    pub site_base_url: String,
    /// Optional server-side secret prepended to token secrets before
    /// hashing — compromise of the token table alone must not yield
    /// redeemable values.
    pub token_pepper: Option<String>,
    /// Optional pepper for Argon2id password hashing.
    pub password_pepper: Option<String>,
    /// Invitation token lifetime in hours (default: 72).
    pub invitation_ttl_hours: u64,
    /// Password-reset token lifetime in hours (default: 72).
    pub password_reset_ttl_hours: u64,
    /// Attachment/invoice unlock token lifetime in hours (default: 72).
    pub unlock_ttl_hours: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            site_base_url: "http://localhost:3000".into(),
            token_pepper: None,
            password_pepper: None,
            invitation_ttl_hours: 72,
            password_reset_ttl_hours: 72,
            unlock_ttl_hours: 72,
        }
    }
}

impl AuthConfig {
    /// Build from `WORKSTEAD_*` environment variables, falling back to
    /// defaults for anything unset or unparsable.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let hours = |key: &str, fallback: u64| {
            env::var(key)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(fallback)
        };
        let shared_ttl = hours("WORKSTEAD_TOKEN_TTL_HOURS", 72);
        Self {
            site_base_url: env::var("WORKSTEAD_SITE_URL").unwrap_or(defaults.site_base_url),
            token_pepper: env::var("WORKSTEAD_TOKEN_PEPPER").ok(),
            password_pepper: env::var("WORKSTEAD_PASSWORD_PEPPER").ok(),
            invitation_ttl_hours: hours("WORKSTEAD_INVITATION_TTL_HOURS", shared_ttl),
            password_reset_ttl_hours: hours("WORKSTEAD_PASSWORD_RESET_TTL_HOURS", shared_ttl),
            unlock_ttl_hours: hours("WORKSTEAD_UNLOCK_TTL_HOURS", shared_ttl),
        }
    }

    /// Lifetime for a given token purpose, independently configurable.
    pub fn ttl_hours(&self, purpose: TokenPurpose) -> u64 {
        match purpose {
            TokenPurpose::Invitation => self.invitation_ttl_hours,
            TokenPurpose::PasswordReset => self.password_reset_ttl_hours,
            TokenPurpose::AttachmentUnlock | TokenPurpose::InvoiceUnlock => self.unlock_ttl_hours,
        }
    }
}
