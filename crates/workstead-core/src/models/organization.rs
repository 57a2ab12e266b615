//! Organization domain model.
//!
//! This deployment serves exactly one organization. The row lives under
//! a fixed well-known record id, so a concurrent double-provision
//! surfaces as a store-level conflict instead of a silent duplicate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The fixed record id of the single allowed organization row.
pub const PRIMARY_ORGANIZATION_ID: Uuid = Uuid::from_u128(1);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Organization {
    pub id: Uuid,
    pub name: String,
    /// Globally unique when set (e.g. `acme.com`).
    pub domain: Option<String>,
    pub timezone: Option<String>,
    pub locale: Option<String>,
    pub logo_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields written when the organization is provisioned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrganization {
    pub name: String,
    pub domain: Option<String>,
    pub timezone: Option<String>,
    pub locale: Option<String>,
    pub logo_url: Option<String>,
}

/// Metadata patch applied by organization managers.
///
/// `name` and `logo_url` are mandatory on every update; the nullable
/// fields use `Some(Some(v))` = set, `Some(None)` = clear, `None` =
/// no change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateOrganization {
    pub name: String,
    pub logo_url: String,
    pub domain: Option<Option<String>>,
    pub timezone: Option<Option<String>>,
    pub locale: Option<Option<String>>,
}
