//! Employment detail domain model — the role-in-organization facts of
//! an identity, as distinct from the identity itself.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmploymentType {
    FullTime,
    PartTime,
    Contract,
    Intern,
}

/// Leave-day balances. Every balance is clamped to `[0, 365]` on the
/// way in, so writes are total and idempotent regardless of input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveBalances {
    pub annual: i32,
    pub sick: i32,
    pub casual: i32,
}

/// Inclusive bounds for any single leave balance.
pub const LEAVE_DAYS_MIN: i32 = 0;
pub const LEAVE_DAYS_MAX: i32 = 365;

impl LeaveBalances {
    pub fn clamped(self) -> Self {
        Self {
            annual: self.annual.clamp(LEAVE_DAYS_MIN, LEAVE_DAYS_MAX),
            sick: self.sick.clamp(LEAVE_DAYS_MIN, LEAVE_DAYS_MAX),
            casual: self.casual.clamp(LEAVE_DAYS_MIN, LEAVE_DAYS_MAX),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Compensation {
    pub monthly_salary: f64,
    pub currency: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmploymentDetail {
    pub user_id: Uuid,
    pub organization_id: Uuid,
    /// Unique within the organization.
    pub employee_code: String,
    pub designation: Option<String>,
    pub employment_type: EmploymentType,
    pub department_id: Option<Uuid>,
    pub team_id: Option<Uuid>,
    pub reporting_manager_id: Option<Uuid>,
    pub start_date: Option<NaiveDate>,
    pub leave_balances: LeaveBalances,
    pub compensation: Option<Compensation>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields written when an identity is provisioned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEmployment {
    pub employee_code: String,
    pub designation: Option<String>,
    pub employment_type: EmploymentType,
    pub department_id: Option<Uuid>,
    pub team_id: Option<Uuid>,
    pub reporting_manager_id: Option<Uuid>,
    pub start_date: Option<NaiveDate>,
}
