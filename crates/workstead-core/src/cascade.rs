//! Cascading-deletion dependency graph.
//!
//! Organization teardown must remove every dependent entity, and
//! termination must remove every entity owned by one identity. Instead
//! of a hand-ordered statement list, the dependency graph is declared
//! per entity kind and the deletion order derived from it — adding a
//! new dependent entity without wiring its references fails the
//! completeness tests below.

/// Every entity kind that belongs to the organization's dependency
/// graph, declared in preferred deletion order (used as the tie-break
/// when several kinds are simultaneously deletable).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Thread,
    Notification,
    DailyReport,
    MonthlyReport,
    Invoice,
    Project,
    Holiday,
    WorkPolicy,
    SecureToken,
    Profile,
    EmploymentDetail,
    Team,
    Department,
    User,
    Organization,
}

/// Which column scopes a row to its owner during identity-level
/// deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Organization,
    Identity,
}

impl EntityKind {
    pub const ALL: [EntityKind; 15] = [
        EntityKind::Thread,
        EntityKind::Notification,
        EntityKind::DailyReport,
        EntityKind::MonthlyReport,
        EntityKind::Invoice,
        EntityKind::Project,
        EntityKind::Holiday,
        EntityKind::WorkPolicy,
        EntityKind::SecureToken,
        EntityKind::Profile,
        EntityKind::EmploymentDetail,
        EntityKind::Team,
        EntityKind::Department,
        EntityKind::User,
        EntityKind::Organization,
    ];

    pub fn table(&self) -> &'static str {
        match self {
            EntityKind::Thread => "thread",
            EntityKind::Notification => "notification",
            EntityKind::DailyReport => "daily_report",
            EntityKind::MonthlyReport => "monthly_report",
            EntityKind::Invoice => "invoice",
            EntityKind::Project => "project",
            EntityKind::Holiday => "holiday",
            EntityKind::WorkPolicy => "work_policy",
            EntityKind::SecureToken => "secure_token",
            EntityKind::Profile => "profile",
            EntityKind::EmploymentDetail => "employment",
            EntityKind::Team => "team",
            EntityKind::Department => "department",
            EntityKind::User => "user",
            EntityKind::Organization => "organization",
        }
    }

    /// Entity kinds this kind holds references to. A kind must be
    /// deleted before everything it references; self-references
    /// (`invited_by`, `reporting_manager_id`) are irrelevant to
    /// ordering and omitted.
    pub fn references(&self) -> &'static [EntityKind] {
        match self {
            EntityKind::Thread => &[EntityKind::User, EntityKind::Organization],
            EntityKind::Notification => &[EntityKind::User, EntityKind::Organization],
            EntityKind::DailyReport => &[EntityKind::User, EntityKind::Organization],
            EntityKind::MonthlyReport => &[EntityKind::User, EntityKind::Organization],
            EntityKind::Invoice => &[EntityKind::Project, EntityKind::Organization],
            EntityKind::Project => &[EntityKind::Organization],
            EntityKind::Holiday => &[EntityKind::WorkPolicy, EntityKind::Organization],
            EntityKind::WorkPolicy => &[EntityKind::Organization],
            EntityKind::SecureToken => &[EntityKind::User],
            EntityKind::Profile => &[EntityKind::User, EntityKind::Organization],
            EntityKind::EmploymentDetail => &[
                EntityKind::User,
                EntityKind::Department,
                EntityKind::Team,
                EntityKind::Organization,
            ],
            EntityKind::Team => &[
                EntityKind::Department,
                EntityKind::User,
                EntityKind::Organization,
            ],
            EntityKind::Department => &[EntityKind::User, EntityKind::Organization],
            EntityKind::User => &[EntityKind::Organization],
            EntityKind::Organization => &[],
        }
    }

    pub fn scope(&self) -> Scope {
        match self {
            EntityKind::Notification
            | EntityKind::DailyReport
            | EntityKind::MonthlyReport
            | EntityKind::SecureToken
            | EntityKind::Profile
            | EntityKind::EmploymentDetail
            | EntityKind::User => Scope::Identity,
            EntityKind::Thread
            | EntityKind::Invoice
            | EntityKind::Project
            | EntityKind::Holiday
            | EntityKind::WorkPolicy
            | EntityKind::Team
            | EntityKind::Department
            | EntityKind::Organization => Scope::Organization,
        }
    }
}

/// Full teardown order: every kind appears exactly once, and every
/// kind precedes everything it references.
pub fn deletion_order() -> Vec<EntityKind> {
    let mut remaining: Vec<EntityKind> = EntityKind::ALL.to_vec();
    let mut order = Vec::with_capacity(remaining.len());

    while !remaining.is_empty() {
        let next = remaining
            .iter()
            .position(|kind| {
                !remaining
                    .iter()
                    .any(|other| other != kind && other.references().contains(kind))
            })
            .expect("entity dependency graph contains a cycle");
        order.push(remaining.remove(next));
    }

    order
}

/// Per-identity teardown order: the identity-scoped kinds, ending with
/// the user row itself. Used by termination.
pub fn identity_deletion_order() -> Vec<EntityKind> {
    deletion_order()
        .into_iter()
        .filter(|kind| kind.scope() == Scope::Identity)
        .collect()
}

/// Render the full teardown as one atomic transaction. Everything is
/// scoped by `organization_id`; the organization row itself goes last,
/// addressed by its fixed record id.
pub fn organization_teardown_query() -> String {
    let mut statements = vec!["BEGIN TRANSACTION".to_string()];
    for kind in deletion_order() {
        match kind {
            EntityKind::Organization => {
                statements.push("DELETE type::record('organization', $organization_id)".into());
            }
            other => statements.push(format!(
                "DELETE {} WHERE organization_id = $organization_id",
                other.table()
            )),
        }
    }
    statements.push("COMMIT TRANSACTION".into());
    statements.join(";\n") + ";"
}

/// Render one identity's teardown as one atomic transaction. The user
/// row is additionally scoped to its organization, so a stray id from
/// another store state deletes nothing.
pub fn identity_teardown_query() -> String {
    let mut statements = vec!["BEGIN TRANSACTION".to_string()];
    for kind in identity_deletion_order() {
        match kind {
            EntityKind::User => {
                statements.push(
                    "DELETE type::record('user', $user_id) \
                     WHERE organization_id = $organization_id"
                        .into(),
                );
            }
            other => statements.push(format!("DELETE {} WHERE user_id = $user_id", other.table())),
        }
    }
    statements.push("COMMIT TRANSACTION".into());
    statements.join(";\n") + ";"
}
