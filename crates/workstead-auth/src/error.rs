//! Authentication error types.

use thiserror::Error;
use workstead_core::error::HrError;

#[derive(Debug, Error)]
pub enum AuthError {
    /// Deliberately covers mismatch, expiry, prior use and absence —
    /// redemption failures must not leak which one occurred.
    #[error("invalid or expired token")]
    TokenInvalid,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("invalid base URL: {0}")]
    BadBaseUrl(String),

    #[error("cryptography error: {0}")]
    Crypto(String),
}

impl From<AuthError> for HrError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::TokenInvalid | AuthError::InvalidCredentials => HrError::Unauthorized {
                reason: err.to_string(),
            },
            AuthError::BadBaseUrl(msg) => HrError::Internal(format!("invalid base URL: {msg}")),
            AuthError::Crypto(msg) => HrError::Crypto(msg),
        }
    }
}
