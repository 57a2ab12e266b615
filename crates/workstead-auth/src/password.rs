//! Password hashing and verification using Argon2id.
//!
//! Used for placeholder credentials on unconfirmed accounts, for
//! password-reset redemption, and for the reauthentication step that
//! gates organization deletion.

use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHasher, PasswordVerifier};

use crate::error::AuthError;
use crate::secret;

fn peppered<'a>(password: &'a str, pepper: Option<&str>) -> std::borrow::Cow<'a, [u8]> {
    match pepper {
        Some(p) => std::borrow::Cow::Owned(format!("{p}{password}").into_bytes()),
        None => std::borrow::Cow::Borrowed(password.as_bytes()),
    }
}

/// Hash a password with Argon2id using OWASP-recommended parameters
/// (memory: 19 MiB, iterations: 2, parallelism: 1). Salt is randomly
/// generated per hash.
pub fn hash_password(password: &str, pepper: Option<&str>) -> Result<String, AuthError> {
    let params = argon2::Params::new(19456, 2, 1, None)
        .map_err(|e| AuthError::Crypto(format!("argon2 params error: {e}")))?;
    let argon2 = Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params);

    let salt = SaltString::generate(&mut argon2::password_hash::rand_core::OsRng);
    let hash = argon2
        .hash_password(&peppered(password, pepper), &salt)
        .map_err(|e| AuthError::Crypto(format!("password hash error: {e}")))?;

    Ok(hash.to_string())
}

/// Verify a plaintext password against an Argon2id PHC-format hash.
///
/// Returns `Ok(true)` on match, `Ok(false)` on mismatch, or
/// `Err(AuthError::Crypto)` if the stored hash is malformed.
pub fn verify_password(
    password: &str,
    hash: &str,
    pepper: Option<&str>,
) -> Result<bool, AuthError> {
    let parsed_hash = argon2::PasswordHash::new(hash)
        .map_err(|e| AuthError::Crypto(format!("invalid hash format: {e}")))?;

    let argon2 = Argon2::default();
    match argon2.verify_password(&peppered(password, pepper), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AuthError::Crypto(format!("verify error: {e}"))),
    }
}

/// Hash for an account that has not set a password yet: a random
/// throwaway secret nobody knows, so the account cannot log in until
/// the invitation is redeemed.
pub fn placeholder_hash(pepper: Option<&str>) -> Result<String, AuthError> {
    hash_password(&secret::generate_secret(), pepper)
}
