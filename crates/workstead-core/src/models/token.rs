//! One-time secure token model.
//!
//! Only the hash of a secret is ever stored. A token is live while
//! `used_at` is null and `expires_at` is in the future; consumption is
//! a one-way transition enforced by the storage layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenPurpose {
    Invitation,
    PasswordReset,
    AttachmentUnlock,
    InvoiceUnlock,
}

impl TokenPurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenPurpose::Invitation => "Invitation",
            TokenPurpose::PasswordReset => "PasswordReset",
            TokenPurpose::AttachmentUnlock => "AttachmentUnlock",
            TokenPurpose::InvoiceUnlock => "InvoiceUnlock",
        }
    }

    pub const ALL: [TokenPurpose; 4] = [
        TokenPurpose::Invitation,
        TokenPurpose::PasswordReset,
        TokenPurpose::AttachmentUnlock,
        TokenPurpose::InvoiceUnlock,
    ];
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecureToken {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub user_id: Uuid,
    pub purpose: TokenPurpose,
    /// Hex SHA-256 of the pepper-prefixed secret. The plaintext secret
    /// is never stored.
    pub secret_hash: String,
    pub expires_at: DateTime<Utc>,
    pub used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl SecureToken {
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.used_at.is_none() && now < self.expires_at
    }
}

/// Row written when a token is issued. Superseded live tokens for the
/// same `(user, purpose)` are deleted in the same transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSecureToken {
    pub organization_id: Uuid,
    pub user_id: Uuid,
    pub purpose: TokenPurpose,
    pub secret_hash: String,
    pub expires_at: DateTime<Utc>,
}
