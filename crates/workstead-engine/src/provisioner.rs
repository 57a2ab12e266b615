//! Identity provisioning — invitations, directory edits, leave and
//! compensation updates, termination, and token-redemption flows.

use chrono::{DateTime, Utc};
use tracing::warn;
use uuid::Uuid;

use workstead_auth::link;
use workstead_auth::password;
use workstead_auth::service::TokenService;
use workstead_core::effects::{EmailMessage, Mailer};
use workstead_core::error::{HrError, HrResult};
use workstead_core::models::directory::{DirectoryPatch, DirectoryRecord, DirectoryUpdate};
use workstead_core::models::employment::{
    Compensation, CreateEmployment, EmploymentDetail, EmploymentType, LeaveBalances,
};
use workstead_core::models::profile::CreateProfile;
use workstead_core::models::token::TokenPurpose;
use workstead_core::models::user::{CreateUser, UpdateUser, UserStatus};
use workstead_core::policy::{self, Actor, Decision, Role};
use workstead_core::repository::{
    DirectoryRepository, ProvisionMember, ProvisioningRepository, TokenRepository, UserRepository,
};

use crate::input;

/// A new-member invitation request.
#[derive(Debug, Clone)]
pub struct InviteRequest {
    pub email: String,
    pub full_name: String,
    pub role: Role,
    pub employee_code: String,
    pub designation: Option<String>,
    pub employment_type: EmploymentType,
    pub department_id: Option<Uuid>,
    pub team_id: Option<Uuid>,
    pub reporting_manager_id: Option<Uuid>,
    /// `%Y-%m-%d`; rejected before any write when unparsable.
    pub start_date: Option<String>,
}

/// Result of a successful invitation.
#[derive(Debug)]
pub struct Invitation {
    pub user_id: Uuid,
    pub signup_link: String,
    pub expires_at: DateTime<Utc>,
    /// Delivery is best-effort; the link stays retrievable out-of-band
    /// when this is `false`.
    pub email_sent: bool,
}

/// Result of a one-time unlock issuance.
#[derive(Debug)]
pub struct UnlockLink {
    pub link: String,
    pub expires_at: DateTime<Utc>,
}

/// Identity provisioning service.
///
/// Generic over repository and collaborator implementations so the
/// orchestration has no dependency on the database crate.
pub struct IdentityProvisioner<U, P, D, T, M>
where
    U: UserRepository,
    P: ProvisioningRepository,
    D: DirectoryRepository,
    T: TokenRepository,
    M: Mailer,
{
    users: U,
    provisioning: P,
    directory: D,
    tokens: TokenService<T>,
    mailer: M,
}

impl<U, P, D, T, M> IdentityProvisioner<U, P, D, T, M>
where
    U: UserRepository,
    P: ProvisioningRepository,
    D: DirectoryRepository,
    T: TokenRepository,
    M: Mailer,
{
    pub fn new(
        users: U,
        provisioning: P,
        directory: D,
        tokens: TokenService<T>,
        mailer: M,
    ) -> Self {
        Self {
            users,
            provisioning,
            directory,
            tokens,
            mailer,
        }
    }

    async fn send_invitation_email(&self, email: &str, signup_link: &str) -> bool {
        let message = EmailMessage {
            to: email.to_string(),
            subject: "You have been invited to join your organization".into(),
            text: format!("Follow this link to finish setting up your account: {signup_link}"),
            html: format!(
                "<p>Follow <a href=\"{signup_link}\">this link</a> to finish \
                 setting up your account.</p>"
            ),
        };
        match self.mailer.send(message).await {
            Ok(()) => true,
            Err(err) => {
                warn!(email, error = %err, "invitation email delivery failed");
                false
            }
        }
    }

    /// Invite a new member.
    ///
    /// Identity, profile, employment detail and invitation token are
    /// created in one transaction; email delivery happens after commit
    /// and never rolls it back.
    pub async fn invite(&self, actor: Actor, request: InviteRequest) -> HrResult<Invitation> {
        // 1. Delegation check: the actor must be allowed to assign the
        //    requested role.
        if !policy::can_delegate(actor.role, request.role) {
            return Err(HrError::forbidden(format!(
                "{} may not assign the {} role",
                actor.role.as_str(),
                request.role.as_str()
            )));
        }

        // 2. Input validation, all before any write.
        let email = input::normalize_email(&request.email)?;
        let (first_name, last_name) = input::split_full_name(&request.full_name)?;
        let start_date = request
            .start_date
            .as_deref()
            .map(input::parse_start_date)
            .transpose()?;
        if request.employee_code.trim().is_empty() {
            return Err(HrError::bad_request("an employee code is required"));
        }

        // 3. Assemble the atomic bundle. The account gets a placeholder
        //    hash until the invitation is redeemed.
        let user_id = Uuid::new_v4();
        let password_hash =
            password::placeholder_hash(self.tokens.config().password_pepper.as_deref())?;
        let (invitation, issued) =
            self.tokens
                .prepare(actor.organization_id, user_id, TokenPurpose::Invitation);

        self.provisioning
            .provision_member(ProvisionMember {
                user: CreateUser {
                    id: user_id,
                    organization_id: actor.organization_id,
                    email: email.clone(),
                    password_hash,
                    role: request.role,
                    status: UserStatus::Inactive,
                    invited_at: Some(Utc::now()),
                    invited_by: Some(actor.id),
                },
                profile: CreateProfile {
                    first_name,
                    last_name,
                },
                employment: CreateEmployment {
                    employee_code: request.employee_code.trim().to_string(),
                    designation: request.designation,
                    employment_type: request.employment_type,
                    department_id: request.department_id,
                    team_id: request.team_id,
                    reporting_manager_id: request.reporting_manager_id,
                    start_date,
                },
                invitation,
            })
            .await?;

        // 4. Post-commit side effect.
        let signup_link =
            link::signup_link(&self.tokens.config().site_base_url, &issued.secret, &email)?;
        let email_sent = self.send_invitation_email(&email, &signup_link).await;

        Ok(Invitation {
            user_id,
            signup_link,
            expires_at: issued.expires_at,
            email_sent,
        })
    }

    /// Reissue an invitation for a not-yet-activated member,
    /// superseding the previous secret.
    pub async fn resend_invitation(&self, actor: Actor, user_id: Uuid) -> HrResult<Invitation> {
        let target = self.users.get_by_id(actor.organization_id, user_id).await?;
        if !policy::can_delegate(actor.role, target.role) {
            return Err(HrError::forbidden(format!(
                "{} may not manage invitations for the {} role",
                actor.role.as_str(),
                target.role.as_str()
            )));
        }
        if target.status != UserStatus::Inactive {
            return Err(HrError::conflict("the account is already active"));
        }

        let issued = self
            .tokens
            .issue(actor.organization_id, user_id, TokenPurpose::Invitation)
            .await?;
        let signup_link = link::signup_link(
            &self.tokens.config().site_base_url,
            &issued.secret,
            &target.email,
        )?;
        let email_sent = self.send_invitation_email(&target.email, &signup_link).await;

        Ok(Invitation {
            user_id,
            signup_link,
            expires_at: issued.expires_at,
            email_sent,
        })
    }

    /// Apply a directory edit, re-resolving the edit policy first.
    pub async fn edit_directory(
        &self,
        actor: Actor,
        user_id: Uuid,
        patch: DirectoryPatch,
    ) -> HrResult<DirectoryRecord> {
        let target = self.users.get_by_id(actor.organization_id, user_id).await?;
        let is_self = actor.id == target.id;

        if let Decision::Denied(reason) = policy::can_edit(actor.role, target.role, is_self) {
            return Err(HrError::forbidden(reason));
        }
        // Self-service edits stop at the profile subset.
        if is_self && patch.touches_employment() {
            return Err(HrError::forbidden(
                "self-edit is limited to profile and contact fields",
            ));
        }

        if let Some(first_name) = &patch.first_name {
            if first_name.trim().is_empty() {
                return Err(HrError::bad_request("first name must not be empty"));
            }
        }
        if let Some(Some(name)) = &patch.department_name {
            if name.trim().is_empty() {
                return Err(HrError::bad_request("department name must not be empty"));
            }
        }
        let start_date = patch
            .start_date
            .as_deref()
            .map(input::parse_start_date)
            .transpose()?;

        let update = DirectoryUpdate {
            first_name: patch.first_name,
            last_name: patch.last_name,
            phone: patch.phone,
            address: patch.address,
            emergency_contact: patch.emergency_contact,
            designation: patch.designation,
            employment_type: patch.employment_type,
            department_name: patch.department_name,
            team_id: patch.team_id,
            reporting_manager_id: patch.reporting_manager_id,
            start_date,
        };

        self.directory
            .apply_update(actor.organization_id, user_id, update)
            .await
    }

    /// Total write: every balance is clamped into range, so the only
    /// failure mode is a missing employee.
    pub async fn update_leave_balances(
        &self,
        actor: Actor,
        user_id: Uuid,
        balances: LeaveBalances,
    ) -> HrResult<EmploymentDetail> {
        if !policy::can_manage_organization(actor.role) {
            return Err(HrError::forbidden(
                "leave balances require organization-management rank",
            ));
        }

        self.directory
            .set_leave_balances(actor.organization_id, user_id, balances.clamped())
            .await
    }

    pub async fn update_compensation(
        &self,
        actor: Actor,
        user_id: Uuid,
        compensation: Compensation,
    ) -> HrResult<EmploymentDetail> {
        if !policy::can_manage_compensation(actor.role) {
            return Err(HrError::forbidden(
                "compensation requires compensation-management rank",
            ));
        }
        if actor.id == user_id {
            return Err(HrError::forbidden(
                "actors may not change their own compensation",
            ));
        }

        self.directory
            .set_compensation(actor.organization_id, user_id, compensation)
            .await
    }

    /// Terminate an identity: the per-identity cascade of everything it
    /// owns, in one transaction.
    pub async fn terminate(&self, actor: Actor, user_id: Uuid) -> HrResult<()> {
        let target = self.users.get_by_id(actor.organization_id, user_id).await?;
        let is_self = actor.id == target.id;

        if let Decision::Denied(reason) = policy::can_terminate(actor.role, target.role, is_self) {
            return Err(HrError::forbidden(reason));
        }

        self.provisioning
            .delete_identity(actor.organization_id, user_id)
            .await
    }

    /// Start a password reset. Whether the address exists is not
    /// revealed; the returned flag only reports delivery.
    pub async fn request_password_reset(&self, email: &str) -> HrResult<bool> {
        let email = input::normalize_email(email)?;
        let user = match self.users.get_by_email(&email).await {
            Ok(user) => user,
            Err(HrError::NotFound { .. }) => return Ok(false),
            Err(other) => return Err(other),
        };

        let issued = self
            .tokens
            .issue(user.organization_id, user.id, TokenPurpose::PasswordReset)
            .await?;
        let reset_link = link::password_reset_link(
            &self.tokens.config().site_base_url,
            &issued.secret,
            &email,
        )?;

        let message = EmailMessage {
            to: email.clone(),
            subject: "Reset your password".into(),
            text: format!("Follow this link to reset your password: {reset_link}"),
            html: format!("<p>Follow <a href=\"{reset_link}\">this link</a> to reset your password.</p>"),
        };
        match self.mailer.send(message).await {
            Ok(()) => Ok(true),
            Err(err) => {
                warn!(email, error = %err, "password reset email delivery failed");
                Ok(false)
            }
        }
    }

    /// Redeem a password-reset secret and store the new credential.
    pub async fn redeem_password_reset(
        &self,
        email: &str,
        secret: &str,
        new_password: &str,
    ) -> HrResult<()> {
        let user = self.lookup_for_redemption(email).await?;
        self.tokens
            .consume(user.id, TokenPurpose::PasswordReset, secret)
            .await?;

        let password_hash =
            password::hash_password(new_password, self.tokens.config().password_pepper.as_deref())?;
        self.users
            .update(
                user.organization_id,
                user.id,
                UpdateUser {
                    password_hash: Some(password_hash),
                    ..Default::default()
                },
            )
            .await?;
        Ok(())
    }

    /// Redeem an invitation: set the first real password and activate
    /// the account.
    pub async fn redeem_invitation(
        &self,
        email: &str,
        secret: &str,
        new_password: &str,
    ) -> HrResult<()> {
        let user = self.lookup_for_redemption(email).await?;
        self.tokens
            .consume(user.id, TokenPurpose::Invitation, secret)
            .await?;

        let password_hash =
            password::hash_password(new_password, self.tokens.config().password_pepper.as_deref())?;
        self.users
            .update(
                user.organization_id,
                user.id,
                UpdateUser {
                    password_hash: Some(password_hash),
                    status: Some(UserStatus::Active),
                    ..Default::default()
                },
            )
            .await?;
        Ok(())
    }

    /// Issue a one-time attachment unlock link for the actor.
    pub async fn issue_attachment_unlock(
        &self,
        actor: Actor,
        file_id: Uuid,
    ) -> HrResult<UnlockLink> {
        let issued = self
            .tokens
            .issue(
                actor.organization_id,
                actor.id,
                TokenPurpose::AttachmentUnlock,
            )
            .await?;
        let link = link::attachment_unlock_link(
            &self.tokens.config().site_base_url,
            &issued.secret,
            file_id,
        )?;
        Ok(UnlockLink {
            link,
            expires_at: issued.expires_at,
        })
    }

    pub async fn redeem_attachment_unlock(&self, user_id: Uuid, secret: &str) -> HrResult<()> {
        self.tokens
            .consume(user_id, TokenPurpose::AttachmentUnlock, secret)
            .await
    }

    /// Issue a one-time invoice unlock link for the actor.
    pub async fn issue_invoice_unlock(&self, actor: Actor, invoice_id: Uuid) -> HrResult<UnlockLink> {
        let issued = self
            .tokens
            .issue(actor.organization_id, actor.id, TokenPurpose::InvoiceUnlock)
            .await?;
        let link = link::invoice_unlock_link(
            &self.tokens.config().site_base_url,
            &issued.secret,
            invoice_id,
        )?;
        Ok(UnlockLink {
            link,
            expires_at: issued.expires_at,
        })
    }

    pub async fn redeem_invoice_unlock(&self, user_id: Uuid, secret: &str) -> HrResult<()> {
        self.tokens
            .consume(user_id, TokenPurpose::InvoiceUnlock, secret)
            .await
    }

    /// Redemption lookups never reveal whether the address exists — a
    /// missing account fails exactly like a bad secret.
    async fn lookup_for_redemption(
        &self,
        email: &str,
    ) -> HrResult<workstead_core::models::user::User> {
        let email = input::normalize_email(email)?;
        self.users.get_by_email(&email).await.map_err(|err| match err {
            HrError::NotFound { .. } => HrError::unauthorized("invalid or expired token"),
            other => other,
        })
    }
}
