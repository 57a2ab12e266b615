//! SurrealDB implementation of [`DirectoryRepository`].
//!
//! A directory edit is one transaction: when the update names a
//! department that does not exist yet, the department row is created
//! inside the same `BEGIN … COMMIT` block that rewrites the profile
//! and employment rows.

use chrono::{DateTime, NaiveDate, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use workstead_core::error::HrResult;
use workstead_core::models::directory::{DirectoryRecord, DirectoryUpdate};
use workstead_core::models::employment::{
    Compensation, EmploymentDetail, EmploymentType, LeaveBalances,
};
use workstead_core::models::profile::{EmergencyContact, Profile};
use workstead_core::repository::DirectoryRepository;

use crate::error::{DbError, check_transaction};
use crate::repository::user::{UserRowWithId, parse_opt_uuid, parse_uuid};

pub(crate) fn parse_employment_type(s: &str) -> Result<EmploymentType, DbError> {
    match s {
        "FullTime" => Ok(EmploymentType::FullTime),
        "PartTime" => Ok(EmploymentType::PartTime),
        "Contract" => Ok(EmploymentType::Contract),
        "Intern" => Ok(EmploymentType::Intern),
        other => Err(DbError::Query(format!("unknown employment type: {other}"))),
    }
}

pub(crate) fn employment_type_to_string(t: &EmploymentType) -> &'static str {
    match t {
        EmploymentType::FullTime => "FullTime",
        EmploymentType::PartTime => "PartTime",
        EmploymentType::Contract => "Contract",
        EmploymentType::Intern => "Intern",
    }
}

pub(crate) fn parse_date(s: &str) -> Result<NaiveDate, DbError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| DbError::Query(format!("invalid stored date '{s}': {e}")))
}

#[derive(Debug, SurrealValue)]
struct EmergencyContactRow {
    name: String,
    phone: String,
    relation: String,
}

#[derive(Debug, SurrealValue)]
struct ProfileRow {
    user_id: String,
    organization_id: String,
    first_name: String,
    last_name: Option<String>,
    phone: Option<String>,
    address: Option<String>,
    emergency_contact: Option<EmergencyContactRow>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ProfileRow {
    fn try_into_profile(self) -> Result<Profile, DbError> {
        Ok(Profile {
            user_id: parse_uuid(&self.user_id, "user")?,
            organization_id: parse_uuid(&self.organization_id, "organization")?,
            first_name: self.first_name,
            last_name: self.last_name,
            phone: self.phone,
            address: self.address,
            emergency_contact: self.emergency_contact.map(|c| EmergencyContact {
                name: c.name,
                phone: c.phone,
                relation: c.relation,
            }),
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, SurrealValue)]
pub(crate) struct EmploymentRow {
    user_id: String,
    organization_id: String,
    employee_code: String,
    designation: Option<String>,
    employment_type: String,
    department_id: Option<String>,
    team_id: Option<String>,
    reporting_manager_id: Option<String>,
    start_date: Option<String>,
    annual_leave: i64,
    sick_leave: i64,
    casual_leave: i64,
    monthly_salary: Option<f64>,
    currency: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl EmploymentRow {
    pub(crate) fn try_into_employment(self) -> Result<EmploymentDetail, DbError> {
        let compensation = match (self.monthly_salary, self.currency) {
            (Some(monthly_salary), Some(currency)) => Some(Compensation {
                monthly_salary,
                currency,
            }),
            _ => None,
        };
        Ok(EmploymentDetail {
            user_id: parse_uuid(&self.user_id, "user")?,
            organization_id: parse_uuid(&self.organization_id, "organization")?,
            employee_code: self.employee_code,
            designation: self.designation,
            employment_type: parse_employment_type(&self.employment_type)?,
            department_id: parse_opt_uuid(self.department_id, "department")?,
            team_id: parse_opt_uuid(self.team_id, "team")?,
            reporting_manager_id: parse_opt_uuid(self.reporting_manager_id, "manager")?,
            start_date: self.start_date.as_deref().map(parse_date).transpose()?,
            leave_balances: LeaveBalances {
                annual: self.annual_leave as i32,
                sick: self.sick_leave as i32,
                casual: self.casual_leave as i32,
            },
            compensation,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// SurrealDB implementation of the Directory repository.
#[derive(Clone)]
pub struct SurrealDirectoryRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealDirectoryRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn fetch_employment(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
    ) -> Result<EmploymentDetail, DbError> {
        let mut result = self
            .db
            .query(
                "SELECT * FROM employment \
                 WHERE user_id = $user_id AND organization_id = $organization_id",
            )
            .bind(("user_id", user_id.to_string()))
            .bind(("organization_id", organization_id.to_string()))
            .await?;

        let rows: Vec<EmploymentRow> = result.take(0)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "employment".into(),
            id: user_id.to_string(),
        })?;

        row.try_into_employment()
    }
}

impl<C: Connection> DirectoryRepository for SurrealDirectoryRepository<C> {
    async fn get_record(&self, organization_id: Uuid, user_id: Uuid) -> HrResult<DirectoryRecord> {
        let user_id_str = user_id.to_string();
        let organization_id_str = organization_id.to_string();

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM type::record('user', $user_id) \
                 WHERE organization_id = $organization_id",
            )
            .bind(("user_id", user_id_str.clone()))
            .bind(("organization_id", organization_id_str.clone()))
            .await
            .map_err(DbError::from)?;
        let users: Vec<UserRowWithId> = result.take(0).map_err(DbError::from)?;
        let user = users
            .into_iter()
            .next()
            .ok_or_else(|| DbError::NotFound {
                entity: "user".into(),
                id: user_id_str.clone(),
            })?
            .try_into_user()?;

        let mut result = self
            .db
            .query(
                "SELECT * FROM profile \
                 WHERE user_id = $user_id AND organization_id = $organization_id",
            )
            .bind(("user_id", user_id_str.clone()))
            .bind(("organization_id", organization_id_str))
            .await
            .map_err(DbError::from)?;
        let profiles: Vec<ProfileRow> = result.take(0).map_err(DbError::from)?;
        let profile = profiles
            .into_iter()
            .next()
            .ok_or_else(|| DbError::NotFound {
                entity: "profile".into(),
                id: user_id_str,
            })?
            .try_into_profile()?;

        let employment = self.fetch_employment(organization_id, user_id).await?;

        Ok(DirectoryRecord {
            user,
            profile,
            employment,
        })
    }

    async fn apply_update(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
        update: DirectoryUpdate,
    ) -> HrResult<DirectoryRecord> {
        let mut statements: Vec<String> = vec!["BEGIN TRANSACTION".into()];

        // Department referenced by name: create-if-absent inside the
        // same transaction, then resolve its record id.
        let upserts_department = matches!(update.department_name, Some(Some(_)));
        if upserts_department {
            statements.push(
                "UPSERT department SET \
                 organization_id = $organization_id, name = $department_name \
                 WHERE organization_id = $organization_id AND name = $department_name"
                    .into(),
            );
            statements.push(
                "LET $department = (SELECT meta::id(id) AS record_id FROM department \
                 WHERE organization_id = $organization_id AND name = $department_name)"
                    .into(),
            );
        }

        let mut profile_sets: Vec<&str> = Vec::new();
        if update.first_name.is_some() {
            profile_sets.push("first_name = $first_name");
        }
        match update.last_name {
            Some(Some(_)) => profile_sets.push("last_name = $last_name"),
            Some(None) => profile_sets.push("last_name = NONE"),
            None => {}
        }
        match update.phone {
            Some(Some(_)) => profile_sets.push("phone = $phone"),
            Some(None) => profile_sets.push("phone = NONE"),
            None => {}
        }
        match update.address {
            Some(Some(_)) => profile_sets.push("address = $address"),
            Some(None) => profile_sets.push("address = NONE"),
            None => {}
        }
        match update.emergency_contact {
            // Replaced as a whole object, never field-by-field.
            Some(Some(_)) => profile_sets.push(
                "emergency_contact = { name: $ec_name, phone: $ec_phone, \
                 relation: $ec_relation }",
            ),
            Some(None) => profile_sets.push("emergency_contact = NONE"),
            None => {}
        }
        if !profile_sets.is_empty() {
            profile_sets.push("updated_at = time::now()");
            statements.push(format!(
                "UPDATE profile SET {} \
                 WHERE user_id = $user_id AND organization_id = $organization_id",
                profile_sets.join(", ")
            ));
        }

        let mut employment_sets: Vec<&str> = Vec::new();
        match update.designation {
            Some(Some(_)) => employment_sets.push("designation = $designation"),
            Some(None) => employment_sets.push("designation = NONE"),
            None => {}
        }
        if update.employment_type.is_some() {
            employment_sets.push("employment_type = $employment_type");
        }
        match update.department_name {
            Some(Some(_)) => employment_sets.push("department_id = $department[0].record_id"),
            Some(None) => employment_sets.push("department_id = NONE"),
            None => {}
        }
        match update.team_id {
            Some(Some(_)) => employment_sets.push("team_id = $team_id"),
            Some(None) => employment_sets.push("team_id = NONE"),
            None => {}
        }
        match update.reporting_manager_id {
            Some(Some(_)) => employment_sets.push("reporting_manager_id = $reporting_manager_id"),
            Some(None) => employment_sets.push("reporting_manager_id = NONE"),
            None => {}
        }
        if update.start_date.is_some() {
            employment_sets.push("start_date = $start_date");
        }
        if !employment_sets.is_empty() {
            employment_sets.push("updated_at = time::now()");
            statements.push(format!(
                "UPDATE employment SET {} \
                 WHERE user_id = $user_id AND organization_id = $organization_id",
                employment_sets.join(", ")
            ));
        }

        statements.push("COMMIT TRANSACTION".into());
        let query = statements.join(";\n") + ";";

        let mut builder = self
            .db
            .query(&query)
            .bind(("user_id", user_id.to_string()))
            .bind(("organization_id", organization_id.to_string()));

        if let Some(first_name) = update.first_name {
            builder = builder.bind(("first_name", first_name));
        }
        if let Some(Some(last_name)) = update.last_name {
            builder = builder.bind(("last_name", last_name));
        }
        if let Some(Some(phone)) = update.phone {
            builder = builder.bind(("phone", phone));
        }
        if let Some(Some(address)) = update.address {
            builder = builder.bind(("address", address));
        }
        if let Some(Some(contact)) = update.emergency_contact {
            builder = builder
                .bind(("ec_name", contact.name))
                .bind(("ec_phone", contact.phone))
                .bind(("ec_relation", contact.relation));
        }
        if let Some(Some(designation)) = update.designation {
            builder = builder.bind(("designation", designation));
        }
        if let Some(ref employment_type) = update.employment_type {
            builder = builder.bind((
                "employment_type",
                employment_type_to_string(employment_type).to_string(),
            ));
        }
        if let Some(Some(department_name)) = update.department_name {
            builder = builder.bind(("department_name", department_name));
        }
        if let Some(Some(team_id)) = update.team_id {
            builder = builder.bind(("team_id", team_id.to_string()));
        }
        if let Some(Some(reporting_manager_id)) = update.reporting_manager_id {
            builder = builder.bind(("reporting_manager_id", reporting_manager_id.to_string()));
        }
        if let Some(start_date) = update.start_date {
            builder = builder.bind(("start_date", start_date.to_string()));
        }

        let result = builder.await.map_err(DbError::from)?;
        check_transaction(result)?;

        self.get_record(organization_id, user_id).await
    }

    async fn set_leave_balances(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
        balances: LeaveBalances,
    ) -> HrResult<EmploymentDetail> {
        let mut result = self
            .db
            .query(
                "UPDATE employment SET \
                 annual_leave = $annual, sick_leave = $sick, \
                 casual_leave = $casual, updated_at = time::now() \
                 WHERE user_id = $user_id AND organization_id = $organization_id \
                 RETURN AFTER",
            )
            .bind(("user_id", user_id.to_string()))
            .bind(("organization_id", organization_id.to_string()))
            .bind(("annual", balances.annual as i64))
            .bind(("sick", balances.sick as i64))
            .bind(("casual", balances.casual as i64))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<EmploymentRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "employment".into(),
            id: user_id.to_string(),
        })?;

        Ok(row.try_into_employment()?)
    }

    async fn set_compensation(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
        compensation: Compensation,
    ) -> HrResult<EmploymentDetail> {
        let mut result = self
            .db
            .query(
                "UPDATE employment SET \
                 monthly_salary = $monthly_salary, currency = $currency, \
                 updated_at = time::now() \
                 WHERE user_id = $user_id AND organization_id = $organization_id \
                 RETURN AFTER",
            )
            .bind(("user_id", user_id.to_string()))
            .bind(("organization_id", organization_id.to_string()))
            .bind(("monthly_salary", compensation.monthly_salary))
            .bind(("currency", compensation.currency))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<EmploymentRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "employment".into(),
            id: user_id.to_string(),
        })?;

        Ok(row.try_into_employment()?)
    }
}
