//! Secure-link construction.
//!
//! Links embed the one-time secret and enough context to redeem it;
//! the path and purpose tag differ per token purpose.

use url::Url;
use uuid::Uuid;

use crate::error::AuthError;

fn build(base: &str, path: &str, pairs: &[(&str, &str)]) -> Result<String, AuthError> {
    let base = Url::parse(base).map_err(|e| AuthError::BadBaseUrl(e.to_string()))?;
    let mut url = base
        .join(path)
        .map_err(|e| AuthError::BadBaseUrl(e.to_string()))?;
    url.query_pairs_mut().extend_pairs(pairs);
    Ok(url.to_string())
}

/// `{base}/auth/signup?token={secret}&email={email}`
pub fn signup_link(base: &str, secret: &str, email: &str) -> Result<String, AuthError> {
    build(base, "/auth/signup", &[("token", secret), ("email", email)])
}

/// `{base}/auth/reset-password?token={secret}&email={email}`
pub fn password_reset_link(base: &str, secret: &str, email: &str) -> Result<String, AuthError> {
    build(
        base,
        "/auth/reset-password",
        &[("token", secret), ("email", email)],
    )
}

/// `{base}/files/unlock?token={secret}&file={id}`
pub fn attachment_unlock_link(base: &str, secret: &str, file_id: Uuid) -> Result<String, AuthError> {
    build(
        base,
        "/files/unlock",
        &[("token", secret), ("file", &file_id.to_string())],
    )
}

/// `{base}/invoices/unlock?token={secret}&invoice={id}`
pub fn invoice_unlock_link(
    base: &str,
    secret: &str,
    invoice_id: Uuid,
) -> Result<String, AuthError> {
    build(
        base,
        "/invoices/unlock",
        &[("token", secret), ("invoice", &invoice_id.to_string())],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signup_link_encodes_the_email() {
        let link = signup_link("https://hr.acme.test", "s3cret", "ada+hr@acme.test").unwrap();
        assert_eq!(
            link,
            "https://hr.acme.test/auth/signup?token=s3cret&email=ada%2Bhr%40acme.test"
        );
    }

    #[test]
    fn reset_link_uses_its_own_path() {
        let link = password_reset_link("https://hr.acme.test", "s", "a@b.test").unwrap();
        assert!(link.starts_with("https://hr.acme.test/auth/reset-password?"));
    }

    #[test]
    fn unlock_links_carry_the_resource_id() {
        let id = Uuid::new_v4();
        let link = attachment_unlock_link("https://hr.acme.test", "s", id).unwrap();
        assert!(link.contains(&format!("file={id}")));
        let link = invoice_unlock_link("https://hr.acme.test", "s", id).unwrap();
        assert!(link.contains(&format!("invoice={id}")));
    }

    #[test]
    fn bad_base_url_is_rejected() {
        assert!(signup_link("not a url", "s", "a@b.test").is_err());
    }
}
