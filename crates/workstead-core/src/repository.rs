//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Multi-entity writes live on
//! [`ProvisioningRepository`] so that atomicity is part of the storage
//! contract: either every row of a provisioning bundle is written or
//! none is.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use uuid::Uuid;

use crate::error::HrResult;
use crate::models::{
    directory::{CreateTeam, Department, DirectoryRecord, DirectoryUpdate, Team},
    employment::{Compensation, CreateEmployment, EmploymentDetail, LeaveBalances},
    organization::{CreateOrganization, Organization, UpdateOrganization},
    profile::CreateProfile,
    token::{CreateSecureToken, SecureToken, TokenPurpose},
    user::{CreateUser, UpdateUser, User},
    work_policy::{Holiday, WeekDay, WorkPolicy},
};

/// Pagination parameters for list queries.
#[derive(Debug, Clone)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 50,
        }
    }
}

/// A paginated result set.
#[derive(Debug, Clone)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

// ---------------------------------------------------------------------------
// Organization (singleton)
// ---------------------------------------------------------------------------

pub trait OrganizationRepository: Send + Sync {
    /// Fetch the single organization row.
    fn get(&self) -> impl Future<Output = HrResult<Organization>> + Send;
    /// Number of organization rows (0 or 1 in a healthy store).
    fn count(&self) -> impl Future<Output = HrResult<u64>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateOrganization,
    ) -> impl Future<Output = HrResult<Organization>> + Send;
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

pub trait UserRepository: Send + Sync {
    fn get_by_id(
        &self,
        organization_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = HrResult<User>> + Send;
    /// Email is globally unique, so the lookup is organization-free.
    fn get_by_email(&self, email: &str) -> impl Future<Output = HrResult<User>> + Send;
    fn update(
        &self,
        organization_id: Uuid,
        id: Uuid,
        input: UpdateUser,
    ) -> impl Future<Output = HrResult<User>> + Send;
    fn list(
        &self,
        organization_id: Uuid,
        pagination: Pagination,
    ) -> impl Future<Output = HrResult<PaginatedResult<User>>> + Send;
}

// ---------------------------------------------------------------------------
// Directory (profile + employment, departments, teams)
// ---------------------------------------------------------------------------

pub trait DirectoryRepository: Send + Sync {
    fn get_record(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
    ) -> impl Future<Output = HrResult<DirectoryRecord>> + Send;

    /// Apply a validated directory edit as one transaction. When the
    /// update names a department not yet present in the organization,
    /// the department row is created inside the same transaction.
    fn apply_update(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
        update: DirectoryUpdate,
    ) -> impl Future<Output = HrResult<DirectoryRecord>> + Send;

    /// Balances are expected pre-clamped; the write is total.
    fn set_leave_balances(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
        balances: LeaveBalances,
    ) -> impl Future<Output = HrResult<EmploymentDetail>> + Send;

    fn set_compensation(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
        compensation: Compensation,
    ) -> impl Future<Output = HrResult<EmploymentDetail>> + Send;
}

pub trait OrgUnitRepository: Send + Sync {
    fn create_department(
        &self,
        organization_id: Uuid,
        name: &str,
        head_id: Option<Uuid>,
    ) -> impl Future<Output = HrResult<Department>> + Send;
    fn get_department_by_name(
        &self,
        organization_id: Uuid,
        name: &str,
    ) -> impl Future<Output = HrResult<Department>> + Send;
    fn list_departments(
        &self,
        organization_id: Uuid,
    ) -> impl Future<Output = HrResult<Vec<Department>>> + Send;
    /// Deletes the department, its teams, and nulls every employment
    /// reference to them, in one transaction.
    fn delete_department(
        &self,
        organization_id: Uuid,
        department_id: Uuid,
    ) -> impl Future<Output = HrResult<()>> + Send;

    fn create_team(
        &self,
        organization_id: Uuid,
        input: CreateTeam,
    ) -> impl Future<Output = HrResult<Team>> + Send;
    fn list_teams(
        &self,
        organization_id: Uuid,
        department_id: Uuid,
    ) -> impl Future<Output = HrResult<Vec<Team>>> + Send;
    /// Deletes the team and nulls every employment reference to it.
    fn delete_team(
        &self,
        organization_id: Uuid,
        team_id: Uuid,
    ) -> impl Future<Output = HrResult<()>> + Send;
}

// ---------------------------------------------------------------------------
// One-time tokens
// ---------------------------------------------------------------------------

pub trait TokenRepository: Send + Sync {
    /// Delete any live token for the same `(user, purpose)` and insert
    /// the new row, atomically — at most one live token per subject and
    /// purpose.
    fn replace(
        &self,
        input: CreateSecureToken,
    ) -> impl Future<Output = HrResult<SecureToken>> + Send;

    /// The not-yet-used, not-expired token for `(user, purpose)`, if any.
    fn get_live(
        &self,
        user_id: Uuid,
        purpose: TokenPurpose,
        now: DateTime<Utc>,
    ) -> impl Future<Output = HrResult<Option<SecureToken>>> + Send;

    /// Atomically mark a token used. Returns `false` when another
    /// redemption already won the race (`used_at` was no longer null).
    fn mark_used(&self, id: Uuid) -> impl Future<Output = HrResult<bool>> + Send;
}

// ---------------------------------------------------------------------------
// Work policy
// ---------------------------------------------------------------------------

pub trait WorkPolicyRepository: Send + Sync {
    fn get(&self, organization_id: Uuid) -> impl Future<Output = HrResult<WorkPolicy>> + Send;
    fn set_working_hours(
        &self,
        organization_id: Uuid,
        day_start: NaiveTime,
        day_end: NaiveTime,
    ) -> impl Future<Output = HrResult<WorkPolicy>> + Send;
    fn set_workweek(
        &self,
        organization_id: Uuid,
        days: Vec<WeekDay>,
    ) -> impl Future<Output = HrResult<WorkPolicy>> + Send;
    fn add_holiday(
        &self,
        organization_id: Uuid,
        name: &str,
        date: NaiveDate,
    ) -> impl Future<Output = HrResult<Holiday>> + Send;
    fn list_holidays(
        &self,
        organization_id: Uuid,
    ) -> impl Future<Output = HrResult<Vec<Holiday>>> + Send;
}

// ---------------------------------------------------------------------------
// Transactional provisioning & teardown
// ---------------------------------------------------------------------------

/// One new member: identity, profile, employment detail and invitation
/// token, written as a single atomic unit.
#[derive(Debug, Clone)]
pub struct ProvisionMember {
    pub user: CreateUser,
    pub profile: CreateProfile,
    pub employment: CreateEmployment,
    pub invitation: CreateSecureToken,
}

/// The organization together with its owner identity.
#[derive(Debug, Clone)]
pub struct ProvisionOrganization {
    pub organization: CreateOrganization,
    pub owner: ProvisionMember,
}

pub trait ProvisioningRepository: Send + Sync {
    /// Create the organization row (under its fixed record id) plus the
    /// owner bundle in one transaction. A lost creation race aborts with
    /// a conflict; no partial state survives.
    fn provision_organization(
        &self,
        input: ProvisionOrganization,
    ) -> impl Future<Output = HrResult<()>> + Send;

    /// Create one member bundle in one transaction. Duplicate email or
    /// employee code aborts the whole bundle with a conflict.
    fn provision_member(&self, input: ProvisionMember)
    -> impl Future<Output = HrResult<()>> + Send;

    /// Delete one identity and everything it owns, in dependency order,
    /// in one transaction.
    fn delete_identity(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
    ) -> impl Future<Output = HrResult<()>> + Send;

    /// Delete the organization and every dependent entity, in
    /// dependency order, in one transaction.
    fn delete_organization(
        &self,
        organization_id: Uuid,
    ) -> impl Future<Output = HrResult<()>> + Send;
}
