//! Role hierarchy and permission rules.
//!
//! The role matrix is a single total order plus a small set of
//! declarative exceptions (self-edit, self-termination, the untouchable
//! top role). All functions here are pure — callers re-resolve them
//! immediately before every mutating operation.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The fixed role hierarchy, highest rank first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    SuperAdmin,
    OrgOwner,
    OrgAdmin,
    HrAdmin,
    Manager,
    Employee,
}

impl Role {
    /// Total order over roles; higher rank wins every comparison rule.
    pub fn rank(&self) -> u8 {
        match self {
            Role::SuperAdmin => 6,
            Role::OrgOwner => 5,
            Role::OrgAdmin => 4,
            Role::HrAdmin => 3,
            Role::Manager => 2,
            Role::Employee => 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "SuperAdmin",
            Role::OrgOwner => "OrgOwner",
            Role::OrgAdmin => "OrgAdmin",
            Role::HrAdmin => "HrAdmin",
            Role::Manager => "Manager",
            Role::Employee => "Employee",
        }
    }

    /// All roles, in rank order.
    pub const ALL: [Role; 6] = [
        Role::SuperAdmin,
        Role::OrgOwner,
        Role::OrgAdmin,
        Role::HrAdmin,
        Role::Manager,
        Role::Employee,
    ];
}

/// An already-authenticated caller. Session/credential verification
/// happens outside the engine; every operation receives this record.
#[derive(Debug, Clone, Copy)]
pub struct Actor {
    pub id: Uuid,
    pub role: Role,
    pub organization_id: Uuid,
}

/// Outcome of a permission check, with the denial reason when refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allowed,
    Denied(&'static str),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allowed)
    }
}

/// Roles an actor may assign to an invitee.
///
/// The matrix is strictly decreasing: no set contains the actor's own
/// role or any role ranked at or above it. Managers and employees
/// delegate nobody — hiring is an HR/admin concern.
pub fn delegable_roles(actor: Role) -> &'static [Role] {
    match actor {
        Role::SuperAdmin => &[
            Role::OrgOwner,
            Role::OrgAdmin,
            Role::HrAdmin,
            Role::Manager,
            Role::Employee,
        ],
        Role::OrgOwner => &[Role::OrgAdmin, Role::HrAdmin, Role::Manager, Role::Employee],
        Role::OrgAdmin => &[Role::HrAdmin, Role::Manager, Role::Employee],
        Role::HrAdmin => &[Role::Employee],
        Role::Manager | Role::Employee => &[],
    }
}

/// Whether `actor` may invite or assign `target`.
pub fn can_delegate(actor: Role, target: Role) -> bool {
    delegable_roles(actor).contains(&target)
}

/// Whether `actor` may edit `target`'s record.
///
/// Strictly-higher rank is required, except that anyone may edit
/// themself on a restricted field subset — the caller enforces that a
/// self-edit touches neither role nor compensation.
pub fn can_edit(actor: Role, target: Role, is_self: bool) -> Decision {
    if is_self {
        return Decision::Allowed;
    }
    if actor.rank() > target.rank() {
        Decision::Allowed
    } else {
        Decision::Denied("actor rank does not exceed target rank")
    }
}

/// Whether `actor` may terminate `target`.
pub fn can_terminate(actor: Role, target: Role, is_self: bool) -> Decision {
    if is_self {
        return Decision::Denied("self-termination is not permitted");
    }
    if target == Role::SuperAdmin {
        return Decision::Denied("the SuperAdmin account cannot be terminated");
    }
    if actor.rank() > target.rank() {
        Decision::Allowed
    } else {
        Decision::Denied("actor rank does not exceed target rank")
    }
}

/// Rank threshold for organization-level management (metadata edits,
/// work policy, leave balances, directory administration).
pub fn can_manage_organization(role: Role) -> bool {
    role.rank() >= Role::OrgAdmin.rank()
}

/// Rank threshold for compensation changes.
pub fn can_manage_compensation(role: Role) -> bool {
    role.rank() >= Role::HrAdmin.rank()
}
