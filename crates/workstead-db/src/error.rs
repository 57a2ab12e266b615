//! Database-specific error types and conversions.
//!
//! Unique-index and duplicate-record violations abort the enclosing
//! transaction; they are translated here into `Conflict` errors with
//! human-readable causes so raw constraint names never reach callers.

use workstead_core::error::HrError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },
}

/// Map a raw constraint-violation message onto its user-facing cause.
fn conflict_cause(raw: &str) -> Option<&'static str> {
    if raw.contains("idx_user_email") {
        Some("email address is already in use")
    } else if raw.contains("idx_employment_org_code") {
        Some("employee code is already in use")
    } else if raw.contains("idx_organization_domain") {
        Some("domain is already in use")
    } else if raw.contains("idx_department_org_name") {
        Some("department name is already in use")
    } else if raw.contains("organization") && raw.contains("already exists") {
        Some("an organization already exists")
    } else if raw.contains("already exists") || raw.contains("already contains") {
        Some("record already exists")
    } else {
        None
    }
}

/// Translate an error raised inside a query or transaction, turning
/// uniqueness violations into conflicts.
pub(crate) fn translate_query_error(raw: impl ToString) -> DbError {
    let message = raw.to_string();
    match conflict_cause(&message) {
        Some(cause) => DbError::Conflict(cause.to_string()),
        None => DbError::Query(message),
    }
}

/// Check a multi-statement transaction response.
///
/// When one statement fails, SurrealDB reports the real error on that
/// statement and "cancelled transaction" on the rest — so every
/// statement error is scanned for a conflict cause before falling back
/// to the first error in statement order.
pub(crate) fn check_transaction(
    mut response: surrealdb::Response,
) -> Result<surrealdb::Response, DbError> {
    let errors = response.take_errors();
    if errors.is_empty() {
        return Ok(response);
    }

    let mut ordered: Vec<_> = errors.into_iter().collect();
    ordered.sort_by_key(|(index, _)| *index);

    for (_, err) in &ordered {
        if let Some(cause) = conflict_cause(&err.to_string()) {
            return Err(DbError::Conflict(cause.to_string()));
        }
    }

    let (_, first) = ordered.into_iter().next().expect("checked non-empty");
    Err(DbError::Query(first.to_string()))
}

impl From<DbError> for HrError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => HrError::NotFound { entity, id },
            DbError::Conflict(message) => HrError::Conflict { message },
            other => HrError::Database(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_violation_reads_cleanly() {
        let err = translate_query_error(
            "Database index `idx_user_email` already contains 'ada@acme.test'",
        );
        assert!(matches!(
            err,
            DbError::Conflict(msg) if msg == "email address is already in use"
        ));
    }

    #[test]
    fn duplicate_organization_record_is_a_conflict() {
        let err =
            translate_query_error("Database record `organization:⟨...⟩` already exists");
        assert!(matches!(
            err,
            DbError::Conflict(msg) if msg == "an organization already exists"
        ));
    }

    #[test]
    fn unrelated_errors_pass_through() {
        let err = translate_query_error("some parse failure");
        assert!(matches!(err, DbError::Query(_)));
    }
}
