//! Schema definitions and migration runner for SurrealDB.
//!
//! All table definitions use SCHEMAFULL mode for data integrity.
//! UUIDs are stored as strings. Enums are stored as strings with
//! ASSERT constraints for validation. The unique indexes on `email`,
//! `(organization_id, employee_code)` and `domain` are the
//! authoritative concurrency guard for identity creation: a losing
//! racer's transaction aborts with a constraint violation.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
    #[allow(dead_code)]
    name: String,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial_schema",
    sql: SCHEMA_V1,
}];

// -----------------------------------------------------------------------
// Schema v1 — initial table definitions
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Organization (singleton, fixed record id)
-- =======================================================================
DEFINE TABLE organization SCHEMAFULL;
DEFINE FIELD name ON TABLE organization TYPE string;
DEFINE FIELD domain ON TABLE organization TYPE option<string>;
DEFINE FIELD timezone ON TABLE organization TYPE option<string>;
DEFINE FIELD locale ON TABLE organization TYPE option<string>;
DEFINE FIELD logo_url ON TABLE organization TYPE option<string>;
DEFINE FIELD created_at ON TABLE organization TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE organization TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_organization_domain ON TABLE organization \
    COLUMNS domain UNIQUE;

-- =======================================================================
-- Users (identities)
-- =======================================================================
DEFINE TABLE user SCHEMAFULL;
DEFINE FIELD organization_id ON TABLE user TYPE string;
DEFINE FIELD email ON TABLE user TYPE string;
DEFINE FIELD password_hash ON TABLE user TYPE string;
DEFINE FIELD role ON TABLE user TYPE string \
    ASSERT $value IN ['SuperAdmin', 'OrgOwner', 'OrgAdmin', \
    'HrAdmin', 'Manager', 'Employee'];
DEFINE FIELD status ON TABLE user TYPE string \
    ASSERT $value IN ['Active', 'Inactive', 'Probation', \
    'Terminated', 'Sabbatical'];
DEFINE FIELD invited_at ON TABLE user TYPE option<datetime>;
DEFINE FIELD invited_by ON TABLE user TYPE option<string>;
DEFINE FIELD created_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_user_email ON TABLE user COLUMNS email UNIQUE;
DEFINE INDEX idx_user_org ON TABLE user COLUMNS organization_id;

-- =======================================================================
-- Profiles (one per user)
-- =======================================================================
DEFINE TABLE profile SCHEMAFULL;
DEFINE FIELD user_id ON TABLE profile TYPE string;
DEFINE FIELD organization_id ON TABLE profile TYPE string;
DEFINE FIELD first_name ON TABLE profile TYPE string;
DEFINE FIELD last_name ON TABLE profile TYPE option<string>;
DEFINE FIELD phone ON TABLE profile TYPE option<string>;
DEFINE FIELD address ON TABLE profile TYPE option<string>;
DEFINE FIELD emergency_contact ON TABLE profile TYPE option<object>;
DEFINE FIELD emergency_contact.name ON TABLE profile TYPE string;
DEFINE FIELD emergency_contact.phone ON TABLE profile TYPE string;
DEFINE FIELD emergency_contact.relation ON TABLE profile TYPE string;
DEFINE FIELD created_at ON TABLE profile TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE profile TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_profile_user ON TABLE profile COLUMNS user_id UNIQUE;

-- =======================================================================
-- Employment details (one per user)
-- =======================================================================
DEFINE TABLE employment SCHEMAFULL;
DEFINE FIELD user_id ON TABLE employment TYPE string;
DEFINE FIELD organization_id ON TABLE employment TYPE string;
DEFINE FIELD employee_code ON TABLE employment TYPE string;
DEFINE FIELD designation ON TABLE employment TYPE option<string>;
DEFINE FIELD employment_type ON TABLE employment TYPE string \
    ASSERT $value IN ['FullTime', 'PartTime', 'Contract', 'Intern'];
DEFINE FIELD department_id ON TABLE employment TYPE option<string>;
DEFINE FIELD team_id ON TABLE employment TYPE option<string>;
DEFINE FIELD reporting_manager_id ON TABLE employment \
    TYPE option<string>;
DEFINE FIELD start_date ON TABLE employment TYPE option<string>;
DEFINE FIELD annual_leave ON TABLE employment TYPE int DEFAULT 0;
DEFINE FIELD sick_leave ON TABLE employment TYPE int DEFAULT 0;
DEFINE FIELD casual_leave ON TABLE employment TYPE int DEFAULT 0;
DEFINE FIELD monthly_salary ON TABLE employment TYPE option<float>;
DEFINE FIELD currency ON TABLE employment TYPE option<string>;
DEFINE FIELD created_at ON TABLE employment TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE employment TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_employment_user ON TABLE employment \
    COLUMNS user_id UNIQUE;
DEFINE INDEX idx_employment_org_code ON TABLE employment \
    COLUMNS organization_id, employee_code UNIQUE;

-- =======================================================================
-- Departments & teams
-- =======================================================================
DEFINE TABLE department SCHEMAFULL;
DEFINE FIELD organization_id ON TABLE department TYPE string;
DEFINE FIELD name ON TABLE department TYPE string;
DEFINE FIELD head_id ON TABLE department TYPE option<string>;
DEFINE FIELD created_at ON TABLE department TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE department TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_department_org_name ON TABLE department \
    COLUMNS organization_id, name UNIQUE;

DEFINE TABLE team SCHEMAFULL;
DEFINE FIELD organization_id ON TABLE team TYPE string;
DEFINE FIELD department_id ON TABLE team TYPE string;
DEFINE FIELD name ON TABLE team TYPE string;
DEFINE FIELD manager_id ON TABLE team TYPE option<string>;
DEFINE FIELD lead_ids ON TABLE team TYPE array DEFAULT [];
DEFINE FIELD lead_ids.* ON TABLE team TYPE string;
DEFINE FIELD created_at ON TABLE team TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE team TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_team_org_dept_name ON TABLE team \
    COLUMNS organization_id, department_id, name UNIQUE;

-- =======================================================================
-- One-time secure tokens
-- =======================================================================
DEFINE TABLE secure_token SCHEMAFULL;
DEFINE FIELD organization_id ON TABLE secure_token TYPE string;
DEFINE FIELD user_id ON TABLE secure_token TYPE string;
DEFINE FIELD purpose ON TABLE secure_token TYPE string \
    ASSERT $value IN ['Invitation', 'PasswordReset', \
    'AttachmentUnlock', 'InvoiceUnlock'];
DEFINE FIELD secret_hash ON TABLE secure_token TYPE string;
DEFINE FIELD expires_at ON TABLE secure_token TYPE datetime;
DEFINE FIELD used_at ON TABLE secure_token TYPE option<datetime>;
DEFINE FIELD created_at ON TABLE secure_token TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_token_user_purpose ON TABLE secure_token \
    COLUMNS user_id, purpose;

-- =======================================================================
-- Work policy & holidays
-- =======================================================================
DEFINE TABLE work_policy SCHEMAFULL;
DEFINE FIELD organization_id ON TABLE work_policy TYPE string;
DEFINE FIELD workweek ON TABLE work_policy TYPE array \
    DEFAULT ['Monday', 'Tuesday', 'Wednesday', 'Thursday', 'Friday'];
DEFINE FIELD workweek.* ON TABLE work_policy TYPE string \
    ASSERT $value IN ['Monday', 'Tuesday', 'Wednesday', 'Thursday', \
    'Friday', 'Saturday', 'Sunday'];
DEFINE FIELD day_start ON TABLE work_policy TYPE string \
    DEFAULT '09:00:00';
DEFINE FIELD day_end ON TABLE work_policy TYPE string \
    DEFAULT '17:00:00';
DEFINE FIELD updated_at ON TABLE work_policy TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_work_policy_org ON TABLE work_policy \
    COLUMNS organization_id UNIQUE;

DEFINE TABLE holiday SCHEMAFULL;
DEFINE FIELD organization_id ON TABLE holiday TYPE string;
DEFINE FIELD name ON TABLE holiday TYPE string;
DEFINE FIELD date ON TABLE holiday TYPE string;
DEFINE FIELD created_at ON TABLE holiday TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_holiday_org_date ON TABLE holiday \
    COLUMNS organization_id, date, name UNIQUE;

-- =======================================================================
-- Dependent tables owned by out-of-scope subsystems. Defined here so
-- cascading deletion covers them; written elsewhere.
-- =======================================================================
DEFINE TABLE thread SCHEMAFULL;
DEFINE FIELD organization_id ON TABLE thread TYPE string;
DEFINE FIELD data ON TABLE thread TYPE object FLEXIBLE DEFAULT {};
DEFINE FIELD created_at ON TABLE thread TYPE datetime \
    DEFAULT time::now();

DEFINE TABLE notification SCHEMAFULL;
DEFINE FIELD organization_id ON TABLE notification TYPE string;
DEFINE FIELD user_id ON TABLE notification TYPE string;
DEFINE FIELD data ON TABLE notification TYPE object FLEXIBLE \
    DEFAULT {};
DEFINE FIELD created_at ON TABLE notification TYPE datetime \
    DEFAULT time::now();

DEFINE TABLE daily_report SCHEMAFULL;
DEFINE FIELD organization_id ON TABLE daily_report TYPE string;
DEFINE FIELD user_id ON TABLE daily_report TYPE string;
DEFINE FIELD data ON TABLE daily_report TYPE object FLEXIBLE \
    DEFAULT {};
DEFINE FIELD created_at ON TABLE daily_report TYPE datetime \
    DEFAULT time::now();

DEFINE TABLE monthly_report SCHEMAFULL;
DEFINE FIELD organization_id ON TABLE monthly_report TYPE string;
DEFINE FIELD user_id ON TABLE monthly_report TYPE string;
DEFINE FIELD data ON TABLE monthly_report TYPE object FLEXIBLE \
    DEFAULT {};
DEFINE FIELD created_at ON TABLE monthly_report TYPE datetime \
    DEFAULT time::now();

DEFINE TABLE invoice SCHEMAFULL;
DEFINE FIELD organization_id ON TABLE invoice TYPE string;
DEFINE FIELD project_id ON TABLE invoice TYPE option<string>;
DEFINE FIELD data ON TABLE invoice TYPE object FLEXIBLE DEFAULT {};
DEFINE FIELD created_at ON TABLE invoice TYPE datetime \
    DEFAULT time::now();

DEFINE TABLE project SCHEMAFULL;
DEFINE FIELD organization_id ON TABLE project TYPE string;
DEFINE FIELD data ON TABLE project TYPE object FLEXIBLE DEFAULT {};
DEFINE FIELD created_at ON TABLE project TYPE datetime \
    DEFAULT time::now();
";

// -----------------------------------------------------------------------
// Public API
// -----------------------------------------------------------------------

/// Run all pending migrations against the given SurrealDB client.
///
/// Creates a `_migration` tracking table on first run, then applies
/// each migration whose version exceeds the current maximum.
/// All DEFINE statements are idempotent so re-running is safe.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    // Ensure migration tracking table exists (idempotent).
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    // Determine current schema version.
    let mut result = db
        .query("SELECT * FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    let current_version = records.first().map(|m| m.version).unwrap_or(0);

    for migration in MIGRATIONS {
        if migration.version > current_version {
            info!(
                version = migration.version,
                name = migration.name,
                "Applying migration"
            );
            db.query(migration.sql).await?.check().map_err(|e| {
                DbError::Migration(format!(
                    "Migration v{} '{}' failed: {}",
                    migration.version, migration.name, e,
                ))
            })?;

            // Record the applied migration.
            db.query(
                "CREATE _migration SET version = $version, \
                 name = $name",
            )
            .bind(("version", migration.version))
            .bind(("name", migration.name))
            .await?
            .check()
            .map_err(|e| {
                DbError::Migration(format!(
                    "Failed to record migration v{}: {}",
                    migration.version, e,
                ))
            })?;

            info!(
                version = migration.version,
                "Migration applied successfully"
            );
        }
    }

    Ok(())
}

/// Returns the raw schema DDL for version 1.
///
/// Exposed for testing with in-memory SurrealDB instances that
/// bypass the migration runner.
pub fn schema_v1() -> &'static str {
    SCHEMA_V1
}
