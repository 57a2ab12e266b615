//! Integration tests for the tenant lifecycle using in-memory
//! SurrealDB and real repositories.

use chrono::{Duration, Utc};
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use uuid::Uuid;

use workstead_auth::config::AuthConfig;
use workstead_auth::password;
use workstead_auth::service::TokenService;
use workstead_core::effects::NoopMailer;
use workstead_core::error::HrError;
use workstead_core::models::employment::{CreateEmployment, EmploymentType};
use workstead_core::models::organization::{PRIMARY_ORGANIZATION_ID, UpdateOrganization};
use workstead_core::models::profile::CreateProfile;
use workstead_core::models::token::{CreateSecureToken, TokenPurpose};
use workstead_core::models::user::{CreateUser, UserStatus};
use workstead_core::policy::{Actor, Role};
use workstead_core::repository::{
    OrganizationRepository, ProvisionMember, ProvisioningRepository, UserRepository,
};
use workstead_db::repository::{
    SurrealOrganizationRepository, SurrealProvisioningRepository, SurrealTokenRepository,
    SurrealUserRepository,
};
use workstead_engine::lifecycle::{CreateOrganizationRequest, TenantLifecycle};

type LocalDb = surrealdb::engine::local::Db;
type Lifecycle = TenantLifecycle<
    SurrealOrganizationRepository<LocalDb>,
    SurrealUserRepository<LocalDb>,
    SurrealProvisioningRepository<LocalDb>,
    SurrealTokenRepository<LocalDb>,
    NoopMailer,
>;

async fn setup() -> (Surreal<LocalDb>, Lifecycle) {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    workstead_db::run_migrations(&db).await.unwrap();

    let lifecycle = TenantLifecycle::new(
        SurrealOrganizationRepository::new(db.clone()),
        SurrealUserRepository::new(db.clone()),
        SurrealProvisioningRepository::new(db.clone()),
        TokenService::new(
            SurrealTokenRepository::new(db.clone()),
            AuthConfig::default(),
        ),
        NoopMailer,
    );
    (db, lifecycle)
}

fn super_admin() -> Actor {
    Actor {
        id: Uuid::new_v4(),
        role: Role::SuperAdmin,
        organization_id: PRIMARY_ORGANIZATION_ID,
    }
}

fn acme_request() -> CreateOrganizationRequest {
    CreateOrganizationRequest {
        name: "Acme".into(),
        domain: Some("acme.test".into()),
        timezone: Some("UTC".into()),
        locale: Some("en".into()),
        logo_url: None,
        owner_email: "a@acme.com".into(),
        owner_name: "Ada Lovelace".into(),
        owner_employee_code: None,
    }
}

/// Provision an extra identity directly through the storage layer,
/// with a real password hash when one is needed for reauthentication.
async fn seed_member(
    db: &Surreal<LocalDb>,
    email: &str,
    employee_code: &str,
    role: Role,
    password: Option<&str>,
) -> Uuid {
    let user_id = Uuid::new_v4();
    let password_hash = match password {
        Some(p) => password::hash_password(p, None).unwrap(),
        None => "$argon2id$v=19$m=19456,t=2,p=1$placeholder$placeholder".into(),
    };
    SurrealProvisioningRepository::new(db.clone())
        .provision_member(ProvisionMember {
            user: CreateUser {
                id: user_id,
                organization_id: PRIMARY_ORGANIZATION_ID,
                email: email.into(),
                password_hash,
                role,
                status: UserStatus::Active,
                invited_at: Some(Utc::now()),
                invited_by: None,
            },
            profile: CreateProfile {
                first_name: "Seed".into(),
                last_name: None,
            },
            employment: CreateEmployment {
                employee_code: employee_code.into(),
                designation: None,
                employment_type: EmploymentType::FullTime,
                department_id: None,
                team_id: None,
                reporting_manager_id: None,
                start_date: None,
            },
            invitation: CreateSecureToken {
                organization_id: PRIMARY_ORGANIZATION_ID,
                user_id,
                purpose: TokenPurpose::Invitation,
                secret_hash: "a".repeat(64),
                expires_at: Utc::now() + Duration::hours(72),
            },
        })
        .await
        .unwrap();
    user_id
}

#[tokio::test]
async fn provisioning_an_empty_store_returns_ids_and_a_link() {
    let (db, lifecycle) = setup().await;

    let provisioned = lifecycle
        .create_organization(super_admin(), acme_request())
        .await
        .unwrap();

    assert_eq!(provisioned.organization_id, PRIMARY_ORGANIZATION_ID);
    assert!(provisioned.signup_link.contains("/auth/signup?token="));
    assert!(provisioned.signup_link.contains("a%40acme.com"));
    // No SMTP credentials configured: delivery reports false, the
    // provisioning still commits.
    assert!(!provisioned.email_sent);

    let owner = SurrealUserRepository::new(db)
        .get_by_email("a@acme.com")
        .await
        .unwrap();
    assert_eq!(owner.id, provisioned.owner_id);
    assert_eq!(owner.role, Role::OrgOwner);
    assert_eq!(owner.status, UserStatus::Inactive);
}

#[tokio::test]
async fn only_a_super_admin_may_provision() {
    let (_db, lifecycle) = setup().await;
    let actor = Actor {
        role: Role::OrgOwner,
        ..super_admin()
    };

    let err = lifecycle
        .create_organization(actor, acme_request())
        .await
        .unwrap_err();
    assert!(matches!(err, HrError::Forbidden { .. }));
}

#[tokio::test]
async fn a_second_organization_is_forbidden() {
    let (_db, lifecycle) = setup().await;

    lifecycle
        .create_organization(super_admin(), acme_request())
        .await
        .unwrap();

    // Same payload or a different one — the singleton check refuses.
    let mut other = acme_request();
    other.name = "Globex".into();
    other.owner_email = "g@globex.com".into();
    other.domain = Some("globex.test".into());

    let err = lifecycle
        .create_organization(super_admin(), other)
        .await
        .unwrap_err();
    match err {
        HrError::Forbidden { reason } => assert_eq!(reason, "an organization already exists"),
        other => panic!("expected forbidden, got {other:?}"),
    }
}

#[tokio::test]
async fn updating_details_validates_and_persists() {
    let (_db, lifecycle) = setup().await;
    lifecycle
        .create_organization(super_admin(), acme_request())
        .await
        .unwrap();

    let manager = Actor {
        id: Uuid::new_v4(),
        role: Role::OrgAdmin,
        organization_id: PRIMARY_ORGANIZATION_ID,
    };

    let updated = lifecycle
        .update_details(
            manager,
            UpdateOrganization {
                name: "Acme Corporation".into(),
                logo_url: "https://cdn.acme.test/logo.png".into(),
                domain: Some(None),
                timezone: None,
                locale: Some(Some("en-GB".into())),
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.name, "Acme Corporation");
    assert_eq!(updated.domain, None);
    assert_eq!(updated.locale.as_deref(), Some("en-GB"));
    assert_eq!(updated.timezone.as_deref(), Some("UTC"));

    // Empty mandatory fields are rejected.
    let err = lifecycle
        .update_details(
            manager,
            UpdateOrganization {
                name: "  ".into(),
                logo_url: "https://cdn.acme.test/logo.png".into(),
                domain: None,
                timezone: None,
                locale: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, HrError::BadRequest { .. }));

    // Below organization-management rank.
    let err = lifecycle
        .update_details(
            Actor {
                role: Role::Manager,
                ..manager
            },
            UpdateOrganization {
                name: "Acme".into(),
                logo_url: "https://cdn.acme.test/logo.png".into(),
                domain: None,
                timezone: None,
                locale: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, HrError::Forbidden { .. }));
}

#[tokio::test]
async fn deletion_requires_password_reverification() {
    let (db, lifecycle) = setup().await;
    lifecycle
        .create_organization(super_admin(), acme_request())
        .await
        .unwrap();

    let admin_id = seed_member(
        &db,
        "root@acme.test",
        "EMP-9999",
        Role::SuperAdmin,
        Some("correct horse battery staple"),
    )
    .await;
    let actor = Actor {
        id: admin_id,
        role: Role::SuperAdmin,
        organization_id: PRIMARY_ORGANIZATION_ID,
    };

    let err = lifecycle
        .delete_organization(actor, PRIMARY_ORGANIZATION_ID, "wrong password")
        .await
        .unwrap_err();
    assert!(matches!(err, HrError::Unauthorized { .. }));

    // Nothing was deleted.
    let organizations = SurrealOrganizationRepository::new(db.clone());
    assert!(organizations.get().await.is_ok());
    assert!(
        SurrealUserRepository::new(db)
            .get_by_email("a@acme.com")
            .await
            .is_ok()
    );
}

#[tokio::test]
async fn deletion_with_the_correct_password_cascades() {
    let (db, lifecycle) = setup().await;
    lifecycle
        .create_organization(super_admin(), acme_request())
        .await
        .unwrap();

    let admin_id = seed_member(
        &db,
        "root@acme.test",
        "EMP-9999",
        Role::SuperAdmin,
        Some("correct horse battery staple"),
    )
    .await;
    let actor = Actor {
        id: admin_id,
        role: Role::SuperAdmin,
        organization_id: PRIMARY_ORGANIZATION_ID,
    };

    lifecycle
        .delete_organization(actor, PRIMARY_ORGANIZATION_ID, "correct horse battery staple")
        .await
        .unwrap();

    let organizations = SurrealOrganizationRepository::new(db.clone());
    assert!(matches!(
        organizations.get().await.unwrap_err(),
        HrError::NotFound { .. }
    ));
    assert!(
        SurrealUserRepository::new(db)
            .get_by_email("a@acme.com")
            .await
            .is_err()
    );
}

#[tokio::test]
async fn deletion_is_reserved_for_super_admins() {
    let (_db, lifecycle) = setup().await;
    lifecycle
        .create_organization(super_admin(), acme_request())
        .await
        .unwrap();

    let err = lifecycle
        .delete_organization(
            Actor {
                id: Uuid::new_v4(),
                role: Role::OrgOwner,
                organization_id: PRIMARY_ORGANIZATION_ID,
            },
            PRIMARY_ORGANIZATION_ID,
            "any",
        )
        .await
        .unwrap_err();
    assert!(matches!(err, HrError::Forbidden { .. }));
}

#[tokio::test]
async fn admin_promotion_and_demotion_follow_the_matrix() {
    let (db, lifecycle) = setup().await;
    lifecycle
        .create_organization(super_admin(), acme_request())
        .await
        .unwrap();

    let employee_id = seed_member(&db, "bob@acme.test", "EMP-0002", Role::Employee, None).await;
    let owner = Actor {
        id: Uuid::new_v4(),
        role: Role::OrgOwner,
        organization_id: PRIMARY_ORGANIZATION_ID,
    };

    lifecycle.add_admin(owner, employee_id).await.unwrap();
    let users = SurrealUserRepository::new(db);
    let promoted = users
        .get_by_id(PRIMARY_ORGANIZATION_ID, employee_id)
        .await
        .unwrap();
    assert_eq!(promoted.role, Role::OrgAdmin);

    // HrAdmin cannot hand out the OrgAdmin role.
    let err = lifecycle
        .add_admin(
            Actor {
                role: Role::HrAdmin,
                ..owner
            },
            employee_id,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, HrError::Forbidden { .. }));

    // Nobody changes their own role through this transition.
    let err = lifecycle
        .add_admin(
            Actor {
                id: employee_id,
                role: Role::OrgAdmin,
                organization_id: PRIMARY_ORGANIZATION_ID,
            },
            employee_id,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, HrError::Forbidden { .. }));

    lifecycle.remove_admin(owner, employee_id).await.unwrap();
    let demoted = users
        .get_by_id(PRIMARY_ORGANIZATION_ID, employee_id)
        .await
        .unwrap();
    assert_eq!(demoted.role, Role::Employee);

    // Demoting a non-admin is rejected outright.
    let err = lifecycle.remove_admin(owner, employee_id).await.unwrap_err();
    assert!(matches!(err, HrError::BadRequest { .. }));
}
