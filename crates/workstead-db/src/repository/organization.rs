//! SurrealDB implementation of [`OrganizationRepository`].
//!
//! The organization is created only through the provisioning
//! repository (it lives under a fixed record id); this repository
//! covers reads and metadata updates.

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use workstead_core::error::HrResult;
use workstead_core::models::organization::{Organization, UpdateOrganization};
use workstead_core::repository::OrganizationRepository;

use crate::error::{DbError, translate_query_error};
use crate::repository::user::parse_uuid;

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct OrganizationRow {
    name: String,
    domain: Option<String>,
    timezone: Option<String>,
    locale: Option<String>,
    logo_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OrganizationRow {
    fn into_organization(self, id: Uuid) -> Organization {
        Organization {
            id,
            name: self.name,
            domain: self.domain,
            timezone: self.timezone,
            locale: self.locale,
            logo_url: self.logo_url,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct OrganizationRowWithId {
    record_id: String,
    name: String,
    domain: Option<String>,
    timezone: Option<String>,
    locale: Option<String>,
    logo_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OrganizationRowWithId {
    fn try_into_organization(self) -> Result<Organization, DbError> {
        Ok(Organization {
            id: parse_uuid(&self.record_id, "organization")?,
            name: self.name,
            domain: self.domain,
            timezone: self.timezone,
            locale: self.locale,
            logo_url: self.logo_url,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Row struct for count queries.
#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

/// SurrealDB implementation of the Organization repository.
#[derive(Clone)]
pub struct SurrealOrganizationRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealOrganizationRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> OrganizationRepository for SurrealOrganizationRepository<C> {
    async fn get(&self) -> HrResult<Organization> {
        let mut result = self
            .db
            .query("SELECT meta::id(id) AS record_id, * FROM organization")
            .await
            .map_err(DbError::from)?;

        let rows: Vec<OrganizationRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "organization".into(),
            id: "singleton".into(),
        })?;

        Ok(row.try_into_organization()?)
    }

    async fn count(&self) -> HrResult<u64> {
        let mut result = self
            .db
            .query("SELECT count() AS total FROM organization GROUP ALL")
            .await
            .map_err(DbError::from)?;
        let rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.first().map(|r| r.total).unwrap_or(0))
    }

    async fn update(&self, id: Uuid, input: UpdateOrganization) -> HrResult<Organization> {
        let id_str = id.to_string();

        // Name and logo are mandatory on every update; the nullable
        // fields are set, cleared or left alone per the patch.
        let mut sets = vec!["name = $name", "logo_url = $logo_url"];
        if input.domain.is_some() {
            sets.push("domain = $domain");
        }
        if input.timezone.is_some() {
            sets.push("timezone = $timezone");
        }
        if input.locale.is_some() {
            sets.push("locale = $locale");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('organization', $id) SET {}",
            sets.join(", ")
        );

        let mut builder = self
            .db
            .query(&query)
            .bind(("id", id_str.clone()))
            .bind(("name", input.name))
            .bind(("logo_url", input.logo_url));

        if let Some(domain) = input.domain {
            builder = builder.bind(("domain", domain));
        }
        if let Some(timezone) = input.timezone {
            builder = builder.bind(("timezone", timezone));
        }
        if let Some(locale) = input.locale {
            builder = builder.bind(("locale", locale));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result.check().map_err(translate_query_error)?;

        let rows: Vec<OrganizationRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "organization".into(),
            id: id_str,
        })?;

        Ok(row.into_organization(id))
    }
}
