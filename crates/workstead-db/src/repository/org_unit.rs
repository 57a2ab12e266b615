//! SurrealDB implementation of [`OrgUnitRepository`].
//!
//! Deleting a department or team never leaves dangling references:
//! the affected employment rows are rewritten in the same transaction.

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use workstead_core::error::HrResult;
use workstead_core::models::directory::{CreateTeam, Department, Team};
use workstead_core::repository::OrgUnitRepository;

use crate::error::{DbError, check_transaction, translate_query_error};
use crate::repository::user::{parse_opt_uuid, parse_uuid};

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct DepartmentRowWithId {
    record_id: String,
    organization_id: String,
    name: String,
    head_id: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl DepartmentRowWithId {
    fn try_into_department(self) -> Result<Department, DbError> {
        Ok(Department {
            id: parse_uuid(&self.record_id, "department")?,
            organization_id: parse_uuid(&self.organization_id, "organization")?,
            name: self.name,
            head_id: parse_opt_uuid(self.head_id, "head")?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, SurrealValue)]
struct TeamRowWithId {
    record_id: String,
    organization_id: String,
    department_id: String,
    name: String,
    manager_id: Option<String>,
    lead_ids: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TeamRowWithId {
    fn try_into_team(self) -> Result<Team, DbError> {
        Ok(Team {
            id: parse_uuid(&self.record_id, "team")?,
            organization_id: parse_uuid(&self.organization_id, "organization")?,
            department_id: parse_uuid(&self.department_id, "department")?,
            name: self.name,
            manager_id: parse_opt_uuid(self.manager_id, "manager")?,
            lead_ids: self
                .lead_ids
                .into_iter()
                .map(|id| parse_uuid(&id, "lead"))
                .collect::<Result<Vec<_>, _>>()?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// SurrealDB implementation of the department/team repository.
#[derive(Clone)]
pub struct SurrealOrgUnitRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealOrgUnitRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> OrgUnitRepository for SurrealOrgUnitRepository<C> {
    async fn create_department(
        &self,
        organization_id: Uuid,
        name: &str,
        head_id: Option<Uuid>,
    ) -> HrResult<Department> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('department', $id) SET \
                 organization_id = $organization_id, name = $name, \
                 head_id = $head_id",
            )
            .bind(("id", id_str.clone()))
            .bind(("organization_id", organization_id.to_string()))
            .bind(("name", name.to_string()))
            .bind(("head_id", head_id.map(|h| h.to_string())))
            .await
            .map_err(DbError::from)?;

        result.check().map_err(translate_query_error)?;

        self.db
            .query(
                "SELECT meta::id(id) AS record_id, * \
                 FROM type::record('department', $id)",
            )
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?
            .take::<Vec<DepartmentRowWithId>>(0)
            .map_err(DbError::from)?
            .into_iter()
            .next()
            .ok_or_else(|| DbError::NotFound {
                entity: "department".into(),
                id: id_str,
            })?
            .try_into_department()
            .map_err(Into::into)
    }

    async fn get_department_by_name(
        &self,
        organization_id: Uuid,
        name: &str,
    ) -> HrResult<Department> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM department \
                 WHERE organization_id = $organization_id AND name = $name",
            )
            .bind(("organization_id", organization_id.to_string()))
            .bind(("name", name.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<DepartmentRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "department".into(),
            id: format!("name={name}"),
        })?;

        Ok(row.try_into_department()?)
    }

    async fn list_departments(&self, organization_id: Uuid) -> HrResult<Vec<Department>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM department \
                 WHERE organization_id = $organization_id ORDER BY name ASC",
            )
            .bind(("organization_id", organization_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<DepartmentRowWithId> = result.take(0).map_err(DbError::from)?;
        Ok(rows
            .into_iter()
            .map(|row| row.try_into_department())
            .collect::<Result<Vec<_>, DbError>>()?)
    }

    async fn delete_department(&self, organization_id: Uuid, department_id: Uuid) -> HrResult<()> {
        // The department, its teams, and every employment reference to
        // either go together — no dangling foreign keys.
        let result = self
            .db
            .query(
                "BEGIN TRANSACTION;
                 UPDATE employment SET \
                     department_id = NONE, team_id = NONE, \
                     updated_at = time::now() \
                     WHERE organization_id = $organization_id \
                     AND department_id = $department_id;
                 DELETE team WHERE organization_id = $organization_id \
                     AND department_id = $department_id;
                 DELETE type::record('department', $department_id) \
                     WHERE organization_id = $organization_id;
                 COMMIT TRANSACTION;",
            )
            .bind(("organization_id", organization_id.to_string()))
            .bind(("department_id", department_id.to_string()))
            .await
            .map_err(DbError::from)?;

        check_transaction(result)?;
        Ok(())
    }

    async fn create_team(&self, organization_id: Uuid, input: CreateTeam) -> HrResult<Team> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('team', $id) SET \
                 organization_id = $organization_id, \
                 department_id = $department_id, name = $name, \
                 manager_id = $manager_id, lead_ids = $lead_ids",
            )
            .bind(("id", id_str.clone()))
            .bind(("organization_id", organization_id.to_string()))
            .bind(("department_id", input.department_id.to_string()))
            .bind(("name", input.name))
            .bind(("manager_id", input.manager_id.map(|m| m.to_string())))
            .bind((
                "lead_ids",
                input
                    .lead_ids
                    .iter()
                    .map(|l| l.to_string())
                    .collect::<Vec<_>>(),
            ))
            .await
            .map_err(DbError::from)?;

        result.check().map_err(translate_query_error)?;

        self.db
            .query("SELECT meta::id(id) AS record_id, * FROM type::record('team', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?
            .take::<Vec<TeamRowWithId>>(0)
            .map_err(DbError::from)?
            .into_iter()
            .next()
            .ok_or_else(|| DbError::NotFound {
                entity: "team".into(),
                id: id_str,
            })?
            .try_into_team()
            .map_err(Into::into)
    }

    async fn list_teams(&self, organization_id: Uuid, department_id: Uuid) -> HrResult<Vec<Team>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM team \
                 WHERE organization_id = $organization_id \
                 AND department_id = $department_id ORDER BY name ASC",
            )
            .bind(("organization_id", organization_id.to_string()))
            .bind(("department_id", department_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TeamRowWithId> = result.take(0).map_err(DbError::from)?;
        Ok(rows
            .into_iter()
            .map(|row| row.try_into_team())
            .collect::<Result<Vec<_>, DbError>>()?)
    }

    async fn delete_team(&self, organization_id: Uuid, team_id: Uuid) -> HrResult<()> {
        let result = self
            .db
            .query(
                "BEGIN TRANSACTION;
                 UPDATE employment SET \
                     team_id = NONE, updated_at = time::now() \
                     WHERE organization_id = $organization_id \
                     AND team_id = $team_id;
                 DELETE type::record('team', $team_id) \
                     WHERE organization_id = $organization_id;
                 COMMIT TRANSACTION;",
            )
            .bind(("organization_id", organization_id.to_string()))
            .bind(("team_id", team_id.to_string()))
            .await
            .map_err(DbError::from)?;

        check_transaction(result)?;
        Ok(())
    }
}
