//! SurrealDB implementation of [`WorkPolicyRepository`].

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use workstead_core::error::HrResult;
use workstead_core::models::work_policy::{Holiday, WeekDay, WorkPolicy};
use workstead_core::repository::WorkPolicyRepository;

use crate::error::{DbError, translate_query_error};
use crate::repository::directory::parse_date;
use crate::repository::user::parse_uuid;

fn parse_time(s: &str) -> Result<NaiveTime, DbError> {
    NaiveTime::parse_from_str(s, "%H:%M:%S")
        .map_err(|e| DbError::Query(format!("invalid stored time '{s}': {e}")))
}

fn parse_weekday(s: &str) -> Result<WeekDay, DbError> {
    WeekDay::parse(s).ok_or_else(|| DbError::Query(format!("unknown weekday: {s}")))
}

#[derive(Debug, SurrealValue)]
struct WorkPolicyRow {
    organization_id: String,
    workweek: Vec<String>,
    day_start: String,
    day_end: String,
    updated_at: DateTime<Utc>,
}

impl WorkPolicyRow {
    fn try_into_policy(self) -> Result<WorkPolicy, DbError> {
        Ok(WorkPolicy {
            organization_id: parse_uuid(&self.organization_id, "organization")?,
            workweek: self
                .workweek
                .iter()
                .map(|d| parse_weekday(d))
                .collect::<Result<Vec<_>, _>>()?,
            day_start: parse_time(&self.day_start)?,
            day_end: parse_time(&self.day_end)?,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, SurrealValue)]
struct HolidayRowWithId {
    record_id: String,
    organization_id: String,
    name: String,
    date: String,
    created_at: DateTime<Utc>,
}

impl HolidayRowWithId {
    fn try_into_holiday(self) -> Result<Holiday, DbError> {
        Ok(Holiday {
            id: parse_uuid(&self.record_id, "holiday")?,
            organization_id: parse_uuid(&self.organization_id, "organization")?,
            name: self.name,
            date: parse_date(&self.date)?,
            created_at: self.created_at,
        })
    }
}

fn single_policy(rows: Vec<WorkPolicyRow>, organization_id: Uuid) -> Result<WorkPolicy, DbError> {
    let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
        entity: "work_policy".into(),
        id: organization_id.to_string(),
    })?;
    row.try_into_policy()
}

/// SurrealDB implementation of the work-policy repository.
#[derive(Clone)]
pub struct SurrealWorkPolicyRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealWorkPolicyRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> WorkPolicyRepository for SurrealWorkPolicyRepository<C> {
    async fn get(&self, organization_id: Uuid) -> HrResult<WorkPolicy> {
        let mut result = self
            .db
            .query("SELECT * FROM work_policy WHERE organization_id = $organization_id")
            .bind(("organization_id", organization_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<WorkPolicyRow> = result.take(0).map_err(DbError::from)?;
        Ok(single_policy(rows, organization_id)?)
    }

    async fn set_working_hours(
        &self,
        organization_id: Uuid,
        day_start: NaiveTime,
        day_end: NaiveTime,
    ) -> HrResult<WorkPolicy> {
        let mut result = self
            .db
            .query(
                "UPSERT work_policy SET \
                 organization_id = $organization_id, \
                 day_start = $day_start, day_end = $day_end, \
                 updated_at = time::now() \
                 WHERE organization_id = $organization_id \
                 RETURN AFTER",
            )
            .bind(("organization_id", organization_id.to_string()))
            .bind(("day_start", day_start.format("%H:%M:%S").to_string()))
            .bind(("day_end", day_end.format("%H:%M:%S").to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<WorkPolicyRow> = result.take(0).map_err(DbError::from)?;
        Ok(single_policy(rows, organization_id)?)
    }

    async fn set_workweek(&self, organization_id: Uuid, days: Vec<WeekDay>) -> HrResult<WorkPolicy> {
        let day_names: Vec<String> = days.iter().map(|d| d.as_str().to_string()).collect();

        let mut result = self
            .db
            .query(
                "UPSERT work_policy SET \
                 organization_id = $organization_id, \
                 workweek = $workweek, updated_at = time::now() \
                 WHERE organization_id = $organization_id \
                 RETURN AFTER",
            )
            .bind(("organization_id", organization_id.to_string()))
            .bind(("workweek", day_names))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<WorkPolicyRow> = result.take(0).map_err(DbError::from)?;
        Ok(single_policy(rows, organization_id)?)
    }

    async fn add_holiday(
        &self,
        organization_id: Uuid,
        name: &str,
        date: NaiveDate,
    ) -> HrResult<Holiday> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('holiday', $id) SET \
                 organization_id = $organization_id, name = $name, \
                 date = $date",
            )
            .bind(("id", id_str.clone()))
            .bind(("organization_id", organization_id.to_string()))
            .bind(("name", name.to_string()))
            .bind(("date", date.to_string()))
            .await
            .map_err(DbError::from)?;

        result.check().map_err(translate_query_error)?;

        let mut result = self
            .db
            .query("SELECT meta::id(id) AS record_id, * FROM type::record('holiday', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;
        let rows: Vec<HolidayRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "holiday".into(),
            id: id_str,
        })?;

        Ok(row.try_into_holiday()?)
    }

    async fn list_holidays(&self, organization_id: Uuid) -> HrResult<Vec<Holiday>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM holiday \
                 WHERE organization_id = $organization_id ORDER BY date ASC",
            )
            .bind(("organization_id", organization_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<HolidayRowWithId> = result.take(0).map_err(DbError::from)?;
        Ok(rows
            .into_iter()
            .map(|row| row.try_into_holiday())
            .collect::<Result<Vec<_>, DbError>>()?)
    }
}
