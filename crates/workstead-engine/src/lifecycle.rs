//! Tenant lifecycle — provisioning, metadata updates, admin role
//! transitions, and the irreversible cascading teardown.

use chrono::{DateTime, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use workstead_auth::link;
use workstead_auth::password;
use workstead_auth::service::TokenService;
use workstead_core::effects::{EmailMessage, Mailer};
use workstead_core::error::{HrError, HrResult};
use workstead_core::models::employment::{CreateEmployment, EmploymentType};
use workstead_core::models::organization::{
    CreateOrganization, Organization, PRIMARY_ORGANIZATION_ID, UpdateOrganization,
};
use workstead_core::models::profile::CreateProfile;
use workstead_core::models::token::TokenPurpose;
use workstead_core::models::user::{CreateUser, UpdateUser, UserStatus};
use workstead_core::policy::{self, Actor, Decision, Role};
use workstead_core::repository::{
    OrganizationRepository, ProvisionMember, ProvisionOrganization, ProvisioningRepository,
    TokenRepository, UserRepository,
};

use crate::input;

/// Request to provision the single organization with its owner.
#[derive(Debug, Clone)]
pub struct CreateOrganizationRequest {
    pub name: String,
    pub domain: Option<String>,
    pub timezone: Option<String>,
    pub locale: Option<String>,
    pub logo_url: Option<String>,
    pub owner_email: String,
    pub owner_name: String,
    /// Defaults to `EMP-0001` when not provided.
    pub owner_employee_code: Option<String>,
}

/// Result of a successful organization provisioning.
#[derive(Debug)]
pub struct ProvisionedOrganization {
    pub organization_id: Uuid,
    pub owner_id: Uuid,
    pub signup_link: String,
    pub expires_at: DateTime<Utc>,
    pub email_sent: bool,
}

/// Tenant lifecycle service.
pub struct TenantLifecycle<O, U, P, T, M>
where
    O: OrganizationRepository,
    U: UserRepository,
    P: ProvisioningRepository,
    T: TokenRepository,
    M: Mailer,
{
    organizations: O,
    users: U,
    provisioning: P,
    tokens: TokenService<T>,
    mailer: M,
}

impl<O, U, P, T, M> TenantLifecycle<O, U, P, T, M>
where
    O: OrganizationRepository,
    U: UserRepository,
    P: ProvisioningRepository,
    T: TokenRepository,
    M: Mailer,
{
    pub fn new(
        organizations: O,
        users: U,
        provisioning: P,
        tokens: TokenService<T>,
        mailer: M,
    ) -> Self {
        Self {
            organizations,
            users,
            provisioning,
            tokens,
            mailer,
        }
    }

    /// Provision the organization and its owner identity atomically.
    ///
    /// Only the highest-privileged role may do this, and only while
    /// the store holds no organization. The fixed record id turns a
    /// lost creation race into a store-level conflict rather than a
    /// second organization.
    pub async fn create_organization(
        &self,
        actor: Actor,
        request: CreateOrganizationRequest,
    ) -> HrResult<ProvisionedOrganization> {
        // 1. Policy and input checks, before any write.
        if actor.role != Role::SuperAdmin {
            return Err(HrError::forbidden(
                "only a SuperAdmin may provision the organization",
            ));
        }
        if request.name.trim().is_empty() {
            return Err(HrError::bad_request("an organization name is required"));
        }
        let owner_email = input::normalize_email(&request.owner_email)?;
        let (first_name, last_name) = input::split_full_name(&request.owner_name)?;

        // 2. Singleton pre-check (the record id closes the race).
        if self.organizations.count().await? > 0 {
            return Err(HrError::forbidden("an organization already exists"));
        }

        // 3. One transaction: organization, owner identity, profile,
        //    employment and invitation token.
        let owner_id = Uuid::new_v4();
        let password_hash =
            password::placeholder_hash(self.tokens.config().password_pepper.as_deref())?;
        let (invitation, issued) =
            self.tokens
                .prepare(PRIMARY_ORGANIZATION_ID, owner_id, TokenPurpose::Invitation);

        self.provisioning
            .provision_organization(ProvisionOrganization {
                organization: CreateOrganization {
                    name: request.name.trim().to_string(),
                    domain: request.domain,
                    timezone: request.timezone,
                    locale: request.locale,
                    logo_url: request.logo_url,
                },
                owner: ProvisionMember {
                    user: CreateUser {
                        id: owner_id,
                        organization_id: PRIMARY_ORGANIZATION_ID,
                        email: owner_email.clone(),
                        password_hash,
                        role: Role::OrgOwner,
                        status: UserStatus::Inactive,
                        invited_at: Some(Utc::now()),
                        invited_by: Some(actor.id),
                    },
                    profile: CreateProfile {
                        first_name,
                        last_name,
                    },
                    employment: CreateEmployment {
                        employee_code: request
                            .owner_employee_code
                            .unwrap_or_else(|| "EMP-0001".to_string()),
                        designation: None,
                        employment_type: EmploymentType::FullTime,
                        department_id: None,
                        team_id: None,
                        reporting_manager_id: None,
                        start_date: None,
                    },
                    invitation,
                },
            })
            .await?;

        info!(organization = %PRIMARY_ORGANIZATION_ID, owner = %owner_id, "organization provisioned");

        // 4. Post-commit invitation delivery, best-effort.
        let signup_link = link::signup_link(
            &self.tokens.config().site_base_url,
            &issued.secret,
            &owner_email,
        )?;
        let message = EmailMessage {
            to: owner_email.clone(),
            subject: format!("You have been invited to manage {}", request.name.trim()),
            text: format!("Follow this link to set up your account: {signup_link}"),
            html: format!(
                "<p>Follow <a href=\"{signup_link}\">this link</a> to set up your account.</p>"
            ),
        };
        let email_sent = match self.mailer.send(message).await {
            Ok(()) => true,
            Err(err) => {
                warn!(email = %owner_email, error = %err, "owner invitation email delivery failed");
                false
            }
        };

        Ok(ProvisionedOrganization {
            organization_id: PRIMARY_ORGANIZATION_ID,
            owner_id,
            signup_link,
            expires_at: issued.expires_at,
            email_sent,
        })
    }

    /// Update organization metadata. Name and logo are mandatory;
    /// domain, timezone and locale may be set or cleared.
    pub async fn update_details(
        &self,
        actor: Actor,
        patch: UpdateOrganization,
    ) -> HrResult<Organization> {
        if !policy::can_manage_organization(actor.role) {
            return Err(HrError::forbidden(
                "organization updates require organization-management rank",
            ));
        }
        if patch.name.trim().is_empty() {
            return Err(HrError::bad_request("an organization name is required"));
        }
        if patch.logo_url.trim().is_empty() {
            return Err(HrError::bad_request("a logo URL is required"));
        }

        self.organizations
            .update(actor.organization_id, patch)
            .await
    }

    /// Tear the organization down, removing every dependent entity in
    /// dependency order, in one transaction.
    ///
    /// Irreversible, so the actor's own password is re-verified — a
    /// valid session is not enough.
    pub async fn delete_organization(
        &self,
        actor: Actor,
        organization_id: Uuid,
        confirmation_password: &str,
    ) -> HrResult<()> {
        if actor.role != Role::SuperAdmin {
            return Err(HrError::forbidden(
                "only a SuperAdmin may delete the organization",
            ));
        }

        let organization = self.organizations.get().await?;
        if organization.id != organization_id {
            return Err(HrError::not_found("organization", organization_id));
        }

        // Reauthentication, distinct from session validity.
        let account = self.users.get_by_id(organization_id, actor.id).await?;
        let verified = password::verify_password(
            confirmation_password,
            &account.password_hash,
            self.tokens.config().password_pepper.as_deref(),
        )?;
        if !verified {
            return Err(HrError::unauthorized("password re-verification failed"));
        }

        self.provisioning.delete_organization(organization_id).await?;
        info!(organization = %organization_id, "organization deleted");
        Ok(())
    }

    /// Promote an identity to OrgAdmin.
    pub async fn add_admin(&self, actor: Actor, user_id: Uuid) -> HrResult<()> {
        self.change_role(actor, user_id, Role::OrgAdmin).await
    }

    /// Demote an OrgAdmin back to Employee.
    pub async fn remove_admin(&self, actor: Actor, user_id: Uuid) -> HrResult<()> {
        let target = self.users.get_by_id(actor.organization_id, user_id).await?;
        if target.role != Role::OrgAdmin {
            return Err(HrError::bad_request("the target is not an OrgAdmin"));
        }
        self.change_role(actor, user_id, Role::Employee).await
    }

    /// Narrow state transition on one identity's role, re-validated
    /// against the delegation matrix and the edit rule.
    async fn change_role(&self, actor: Actor, user_id: Uuid, new_role: Role) -> HrResult<()> {
        if actor.id == user_id {
            return Err(HrError::forbidden("actors may not change their own role"));
        }
        if !policy::can_delegate(actor.role, new_role) {
            return Err(HrError::forbidden(format!(
                "{} may not assign the {} role",
                actor.role.as_str(),
                new_role.as_str()
            )));
        }

        let target = self.users.get_by_id(actor.organization_id, user_id).await?;
        if let Decision::Denied(reason) = policy::can_edit(actor.role, target.role, false) {
            return Err(HrError::forbidden(reason));
        }

        self.users
            .update(
                actor.organization_id,
                user_id,
                UpdateUser {
                    role: Some(new_role),
                    ..Default::default()
                },
            )
            .await?;
        Ok(())
    }
}
