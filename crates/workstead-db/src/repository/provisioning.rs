//! SurrealDB implementation of [`ProvisioningRepository`].
//!
//! Every operation here is a single `BEGIN TRANSACTION … COMMIT
//! TRANSACTION` block: the identity bundle (user, profile, employment,
//! invitation token) and the organization bundle are written
//! all-or-nothing, and the cascading deletions are rendered from the
//! dependency graph in `workstead_core::cascade`. A unique-index
//! violation anywhere aborts the whole block and surfaces as a
//! conflict.

use surrealdb::{Connection, Surreal};
use uuid::Uuid;

use workstead_core::cascade::{identity_teardown_query, organization_teardown_query};
use workstead_core::error::HrResult;
use workstead_core::repository::{ProvisionMember, ProvisionOrganization, ProvisioningRepository};

use crate::error::{DbError, check_transaction};
use crate::repository::directory::employment_type_to_string;
use crate::repository::user::status_to_string;

/// Statements creating one member bundle. Shared between member and
/// organization provisioning; leave balances and compensation take
/// their schema defaults.
const MEMBER_STATEMENTS: &str = "\
CREATE type::record('user', $user_id) SET \
    organization_id = $organization_id, \
    email = $email, \
    password_hash = $password_hash, \
    role = $role, \
    status = $status, \
    invited_at = $invited_at, \
    invited_by = $invited_by;
CREATE type::record('profile', $profile_id) SET \
    user_id = $user_id, \
    organization_id = $organization_id, \
    first_name = $first_name, \
    last_name = $last_name, \
    phone = NONE, \
    address = NONE, \
    emergency_contact = NONE;
CREATE type::record('employment', $employment_id) SET \
    user_id = $user_id, \
    organization_id = $organization_id, \
    employee_code = $employee_code, \
    designation = $designation, \
    employment_type = $employment_type, \
    department_id = $department_id, \
    team_id = $team_id, \
    reporting_manager_id = $reporting_manager_id, \
    start_date = $start_date;
DELETE secure_token \
    WHERE user_id = $user_id AND purpose = $purpose \
    AND used_at IS NONE;
CREATE type::record('secure_token', $token_id) SET \
    organization_id = $organization_id, \
    user_id = $user_id, \
    purpose = $purpose, \
    secret_hash = $secret_hash, \
    expires_at = $token_expires_at, \
    used_at = NONE";

fn bind_member<'r, C: Connection>(
    builder: surrealdb::method::Query<'r, C>,
    member: ProvisionMember,
) -> surrealdb::method::Query<'r, C> {
    let ProvisionMember {
        user,
        profile,
        employment,
        invitation,
    } = member;

    builder
        .bind(("user_id", user.id.to_string()))
        .bind(("organization_id", user.organization_id.to_string()))
        .bind(("email", user.email))
        .bind(("password_hash", user.password_hash))
        .bind(("role", user.role.as_str().to_string()))
        .bind(("status", status_to_string(&user.status).to_string()))
        .bind(("invited_at", user.invited_at))
        .bind(("invited_by", user.invited_by.map(|id| id.to_string())))
        .bind(("profile_id", Uuid::new_v4().to_string()))
        .bind(("first_name", profile.first_name))
        .bind(("last_name", profile.last_name))
        .bind(("employment_id", Uuid::new_v4().to_string()))
        .bind(("employee_code", employment.employee_code))
        .bind(("designation", employment.designation))
        .bind((
            "employment_type",
            employment_type_to_string(&employment.employment_type).to_string(),
        ))
        .bind((
            "department_id",
            employment.department_id.map(|id| id.to_string()),
        ))
        .bind(("team_id", employment.team_id.map(|id| id.to_string())))
        .bind((
            "reporting_manager_id",
            employment.reporting_manager_id.map(|id| id.to_string()),
        ))
        .bind(("start_date", employment.start_date.map(|d| d.to_string())))
        .bind(("token_id", Uuid::new_v4().to_string()))
        .bind(("purpose", invitation.purpose.as_str().to_string()))
        .bind(("secret_hash", invitation.secret_hash))
        .bind(("token_expires_at", invitation.expires_at))
}

/// SurrealDB implementation of the provisioning repository.
#[derive(Clone)]
pub struct SurrealProvisioningRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealProvisioningRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> ProvisioningRepository for SurrealProvisioningRepository<C> {
    async fn provision_organization(&self, input: ProvisionOrganization) -> HrResult<()> {
        // The fixed record id makes a lost creation race fail here as
        // a duplicate-record conflict, aborting the whole block.
        let query = format!(
            "BEGIN TRANSACTION;
             CREATE type::record('organization', $organization_id) SET \
                 name = $org_name, \
                 domain = $org_domain, \
                 timezone = $org_timezone, \
                 locale = $org_locale, \
                 logo_url = $org_logo_url;
             CREATE work_policy SET organization_id = $organization_id;
             {MEMBER_STATEMENTS};
             COMMIT TRANSACTION;"
        );

        let organization = input.organization;
        let builder = self
            .db
            .query(&query)
            .bind(("org_name", organization.name))
            .bind(("org_domain", organization.domain))
            .bind(("org_timezone", organization.timezone))
            .bind(("org_locale", organization.locale))
            .bind(("org_logo_url", organization.logo_url));
        let builder = bind_member(builder, input.owner);

        let result = builder.await.map_err(DbError::from)?;
        check_transaction(result)?;

        Ok(())
    }

    async fn provision_member(&self, input: ProvisionMember) -> HrResult<()> {
        let query = format!(
            "BEGIN TRANSACTION;
             {MEMBER_STATEMENTS};
             COMMIT TRANSACTION;"
        );

        let builder = bind_member(self.db.query(&query), input);

        let result = builder.await.map_err(DbError::from)?;
        check_transaction(result)?;

        Ok(())
    }

    async fn delete_identity(&self, organization_id: Uuid, user_id: Uuid) -> HrResult<()> {
        let query = identity_teardown_query();

        let result = self
            .db
            .query(&query)
            .bind(("user_id", user_id.to_string()))
            .bind(("organization_id", organization_id.to_string()))
            .await
            .map_err(DbError::from)?;
        check_transaction(result)?;

        Ok(())
    }

    async fn delete_organization(&self, organization_id: Uuid) -> HrResult<()> {
        let query = organization_teardown_query();

        let result = self
            .db
            .query(&query)
            .bind(("organization_id", organization_id.to_string()))
            .await
            .map_err(DbError::from)?;
        check_transaction(result)?;

        Ok(())
    }
}
