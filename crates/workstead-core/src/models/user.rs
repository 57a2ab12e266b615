//! User (identity) domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::policy::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserStatus {
    Active,
    Inactive,
    Probation,
    Terminated,
    Sabbatical,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub organization_id: Uuid,
    /// Globally unique, stored lowercase and trimmed.
    pub email: String,
    /// Argon2id PHC hash. Unconfirmed accounts carry a hash of a random
    /// throwaway secret until the invitation is redeemed.
    pub password_hash: String,
    pub role: Role,
    pub status: UserStatus,
    pub invited_at: Option<DateTime<Utc>>,
    pub invited_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields written when an identity is provisioned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub status: UserStatus,
    pub invited_at: Option<DateTime<Utc>>,
    pub invited_by: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUser {
    pub role: Option<Role>,
    pub status: Option<UserStatus>,
    pub password_hash: Option<String>,
}
