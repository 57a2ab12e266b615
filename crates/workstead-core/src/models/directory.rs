//! Departments and teams, and the combined directory view of a member.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::employment::{EmploymentDetail, EmploymentType};
use crate::models::profile::{EmergencyContact, Profile};
use crate::models::user::User;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Department {
    pub id: Uuid,
    pub organization_id: Uuid,
    /// Unique within the organization.
    pub name: String,
    pub head_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub department_id: Uuid,
    pub name: String,
    pub manager_id: Option<Uuid>,
    pub lead_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTeam {
    pub department_id: Uuid,
    pub name: String,
    pub manager_id: Option<Uuid>,
    pub lead_ids: Vec<Uuid>,
}

/// The full directory record of one member: identity, profile and
/// employment detail together.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryRecord {
    pub user: User,
    pub profile: Profile,
    pub employment: EmploymentDetail,
}

/// Directory edit as submitted by a caller. Dates arrive as raw
/// strings and are parsed (and rejected) before any write; the
/// department is referenced by name and upserted if absent.
///
/// Nullable fields follow `Some(Some(v))` = set, `Some(None)` = clear,
/// `None` = leave unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DirectoryPatch {
    pub first_name: Option<String>,
    pub last_name: Option<Option<String>>,
    pub phone: Option<Option<String>>,
    pub address: Option<Option<String>>,
    /// Replaced or removed as a set; never partially updated.
    pub emergency_contact: Option<Option<EmergencyContact>>,
    pub designation: Option<Option<String>>,
    pub employment_type: Option<EmploymentType>,
    /// Department referenced by name; created in the organization if
    /// not already present.
    pub department_name: Option<Option<String>>,
    pub team_id: Option<Option<Uuid>>,
    pub reporting_manager_id: Option<Option<Uuid>>,
    /// `%Y-%m-%d`; unparsable input is rejected before any write.
    pub start_date: Option<String>,
}

impl DirectoryPatch {
    /// Whether the patch touches employment-side fields. Self-edits are
    /// limited to the profile subset.
    pub fn touches_employment(&self) -> bool {
        self.designation.is_some()
            || self.employment_type.is_some()
            || self.department_name.is_some()
            || self.team_id.is_some()
            || self.reporting_manager_id.is_some()
            || self.start_date.is_some()
    }
}

/// A [`DirectoryPatch`] after validation: the start date parsed, ready
/// for a single storage transaction.
#[derive(Debug, Clone, Default)]
pub struct DirectoryUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<Option<String>>,
    pub phone: Option<Option<String>>,
    pub address: Option<Option<String>>,
    pub emergency_contact: Option<Option<EmergencyContact>>,
    pub designation: Option<Option<String>>,
    pub employment_type: Option<EmploymentType>,
    pub department_name: Option<Option<String>>,
    pub team_id: Option<Option<Uuid>>,
    pub reporting_manager_id: Option<Option<Uuid>>,
    pub start_date: Option<NaiveDate>,
}
