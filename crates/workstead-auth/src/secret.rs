//! Opaque one-time secret generation and hashing.
//!
//! A secret is 32 random bytes, base64url-encoded for transport. Only
//! its SHA-256 hash (pepper-prefixed when configured) is stored; the
//! plaintext leaves the process exactly once, inside the secure link.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Generate a cryptographically random secret
/// (32 bytes → base64url-encoded, no padding).
pub fn generate_secret() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 32] = rand::Rng::random(&mut rng);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// SHA-256 hash of a raw secret, hex-encoded.
///
/// If `pepper` is provided it is prepended to the secret before
/// hashing — the same pepper must be supplied at redemption time.
pub fn hash_secret(raw: &str, pepper: Option<&str>) -> String {
    let mut hasher = Sha256::new();
    if let Some(p) = pepper {
        hasher.update(p.as_bytes());
    }
    hasher.update(raw.as_bytes());
    hex::encode(hasher.finalize())
}

/// Constant-time comparison of two stored-format hashes.
pub fn hashes_match(stored: &str, provided: &str) -> bool {
    stored.as_bytes().ct_eq(provided.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secret_is_url_safe() {
        let secret = generate_secret();
        // base64url characters only (A-Z a-z 0-9 - _), no padding.
        assert!(
            secret
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
        // 32 bytes → 43 base64url chars.
        assert_eq!(secret.len(), 43);
    }

    #[test]
    fn secrets_are_unique() {
        assert_ne!(generate_secret(), generate_secret());
    }

    #[test]
    fn hash_is_deterministic() {
        assert_eq!(
            hash_secret("some-secret", None),
            hash_secret("some-secret", None)
        );
    }

    #[test]
    fn pepper_changes_the_hash() {
        assert_ne!(
            hash_secret("some-secret", None),
            hash_secret("some-secret", Some("pepper!"))
        );
    }

    #[test]
    fn comparison_accepts_equal_and_rejects_different() {
        let a = hash_secret("token-a", None);
        let b = hash_secret("token-b", None);
        assert!(hashes_match(&a, &a));
        assert!(!hashes_match(&a, &b));
    }
}
