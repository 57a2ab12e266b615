//! Integration tests for the directory repository: transactional
//! edits, department upsert by name, and reference-preserving
//! department/team deletion.

use chrono::{Duration, NaiveDate, Utc};
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use uuid::Uuid;

use workstead_core::models::directory::{CreateTeam, DirectoryUpdate};
use workstead_core::models::employment::{
    Compensation, CreateEmployment, EmploymentType, LeaveBalances,
};
use workstead_core::models::organization::{CreateOrganization, PRIMARY_ORGANIZATION_ID};
use workstead_core::models::profile::{CreateProfile, EmergencyContact};
use workstead_core::models::token::{CreateSecureToken, TokenPurpose};
use workstead_core::models::user::{CreateUser, UserStatus};
use workstead_core::policy::Role;
use workstead_core::repository::{
    DirectoryRepository, OrgUnitRepository, ProvisionMember, ProvisionOrganization,
    ProvisioningRepository,
};
use workstead_db::repository::{
    SurrealDirectoryRepository, SurrealOrgUnitRepository, SurrealProvisioningRepository,
};

type Db = Surreal<surrealdb::engine::local::Db>;

fn member(email: &str, employee_code: &str) -> ProvisionMember {
    let user_id = Uuid::new_v4();
    ProvisionMember {
        user: CreateUser {
            id: user_id,
            organization_id: PRIMARY_ORGANIZATION_ID,
            email: email.into(),
            password_hash: "$argon2id$v=19$m=19456,t=2,p=1$placeholder$placeholder".into(),
            role: Role::Employee,
            status: UserStatus::Inactive,
            invited_at: Some(Utc::now()),
            invited_by: None,
        },
        profile: CreateProfile {
            first_name: "Test".into(),
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
    }
}

/// Spin up in-memory DB, run migrations, provision org + one employee.
async fn setup() -> (Db, Uuid) {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    workstead_db::run_migrations(&db).await.unwrap();

    let provisioning = SurrealProvisioningRepository::new(db.clone());
    provisioning
        .provision_organization(ProvisionOrganization {
            organization: CreateOrganization {
                name: "Acme".into(),
                domain: None,
                timezone: None,
                locale: None,
                logo_url: None,
            },
            owner: member("ada@acme.test", "EMP-0001"),
        })
        .await
        .unwrap();

    let employee = member("bob@acme.test", "EMP-0002");
    let employee_id = employee.user.id;
    provisioning.provision_member(employee).await.unwrap();

    (db, employee_id)
}

#[tokio::test]
async fn naming_an_unknown_department_creates_it() {
    let (db, employee_id) = setup().await;
    let directory = SurrealDirectoryRepository::new(db.clone());
    let org_units = SurrealOrgUnitRepository::new(db);

    let record = directory
        .apply_update(
            PRIMARY_ORGANIZATION_ID,
            employee_id,
            DirectoryUpdate {
                department_name: Some(Some("Research".into())),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let department = org_units
        .get_department_by_name(PRIMARY_ORGANIZATION_ID, "Research")
        .await
        .unwrap();
    assert_eq!(record.employment.department_id, Some(department.id));
}

#[tokio::test]
async fn naming_an_existing_department_reuses_it() {
    let (db, employee_id) = setup().await;
    let directory = SurrealDirectoryRepository::new(db.clone());
    let org_units = SurrealOrgUnitRepository::new(db);

    let existing = org_units
        .create_department(PRIMARY_ORGANIZATION_ID, "Engineering", None)
        .await
        .unwrap();

    let record = directory
        .apply_update(
            PRIMARY_ORGANIZATION_ID,
            employee_id,
            DirectoryUpdate {
                department_name: Some(Some("Engineering".into())),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(record.employment.department_id, Some(existing.id));
    assert_eq!(
        org_units
            .list_departments(PRIMARY_ORGANIZATION_ID)
            .await
            .unwrap()
            .len(),
        1
    );
}

#[tokio::test]
async fn emergency_contact_is_replaced_and_cleared_as_a_unit() {
    let (db, employee_id) = setup().await;
    let directory = SurrealDirectoryRepository::new(db);

    let record = directory
        .apply_update(
            PRIMARY_ORGANIZATION_ID,
            employee_id,
            DirectoryUpdate {
                emergency_contact: Some(Some(EmergencyContact {
                    name: "Grace Hopper".into(),
                    phone: "+1-555-0100".into(),
                    relation: "sister".into(),
                })),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let contact = record.profile.emergency_contact.expect("contact set");
    assert_eq!(contact.name, "Grace Hopper");
    assert_eq!(contact.relation, "sister");

    let record = directory
        .apply_update(
            PRIMARY_ORGANIZATION_ID,
            employee_id,
            DirectoryUpdate {
                emergency_contact: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(record.profile.emergency_contact.is_none());
}

#[tokio::test]
async fn start_date_and_designation_round_trip() {
    let (db, employee_id) = setup().await;
    let directory = SurrealDirectoryRepository::new(db);

    let record = directory
        .apply_update(
            PRIMARY_ORGANIZATION_ID,
            employee_id,
            DirectoryUpdate {
                designation: Some(Some("Staff Engineer".into())),
                start_date: NaiveDate::from_ymd_opt(2026, 2, 16),
                employment_type: Some(EmploymentType::Contract),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(record.employment.designation.as_deref(), Some("Staff Engineer"));
    assert_eq!(
        record.employment.start_date,
        NaiveDate::from_ymd_opt(2026, 2, 16)
    );
    assert_eq!(record.employment.employment_type, EmploymentType::Contract);
}

#[tokio::test]
async fn leave_balances_and_compensation_are_stored() {
    let (db, employee_id) = setup().await;
    let directory = SurrealDirectoryRepository::new(db);

    let employment = directory
        .set_leave_balances(
            PRIMARY_ORGANIZATION_ID,
            employee_id,
            LeaveBalances {
                annual: 20,
                sick: 10,
                casual: 5,
            },
        )
        .await
        .unwrap();
    assert_eq!(employment.leave_balances.annual, 20);

    let employment = directory
        .set_compensation(
            PRIMARY_ORGANIZATION_ID,
            employee_id,
            Compensation {
                monthly_salary: 9_000.0,
                currency: "EUR".into(),
            },
        )
        .await
        .unwrap();
    let compensation = employment.compensation.expect("compensation set");
    assert_eq!(compensation.currency, "EUR");
}

#[tokio::test]
async fn missing_employee_is_not_found() {
    let (db, _) = setup().await;
    let directory = SurrealDirectoryRepository::new(db);

    let err = directory
        .set_leave_balances(
            PRIMARY_ORGANIZATION_ID,
            Uuid::new_v4(),
            LeaveBalances {
                annual: 1,
                sick: 1,
                casual: 1,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        workstead_core::error::HrError::NotFound { .. }
    ));
}

#[tokio::test]
async fn deleting_a_department_nulls_references_and_removes_teams() {
    let (db, employee_id) = setup().await;
    let directory = SurrealDirectoryRepository::new(db.clone());
    let org_units = SurrealOrgUnitRepository::new(db);

    let department = org_units
        .create_department(PRIMARY_ORGANIZATION_ID, "Engineering", None)
        .await
        .unwrap();
    let team = org_units
        .create_team(
            PRIMARY_ORGANIZATION_ID,
            CreateTeam {
                department_id: department.id,
                name: "Platform".into(),
                manager_id: None,
                lead_ids: vec![],
            },
        )
        .await
        .unwrap();

    directory
        .apply_update(
            PRIMARY_ORGANIZATION_ID,
            employee_id,
            DirectoryUpdate {
                department_name: Some(Some("Engineering".into())),
                team_id: Some(Some(team.id)),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    org_units
        .delete_department(PRIMARY_ORGANIZATION_ID, department.id)
        .await
        .unwrap();

    let record = directory
        .get_record(PRIMARY_ORGANIZATION_ID, employee_id)
        .await
        .unwrap();
    assert_eq!(record.employment.department_id, None);
    assert_eq!(record.employment.team_id, None);
    assert!(
        org_units
            .list_teams(PRIMARY_ORGANIZATION_ID, department.id)
            .await
            .unwrap()
            .is_empty()
    );
}
