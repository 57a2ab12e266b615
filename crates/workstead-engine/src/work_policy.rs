//! Work-policy mutations and the announcement side-effect emitter.
//!
//! Each mutation is a single-entity write. The announcement to the
//! realtime fan-out collaborator happens after the write has
//! committed; its failure is logged and swallowed, never retried
//! synchronously and never surfaced to the caller.

use chrono::Utc;
use tracing::warn;

use workstead_core::effects::Announcer;
use workstead_core::error::{HrError, HrResult};
use workstead_core::models::announcement::Announcement;
use workstead_core::models::work_policy::{Holiday, WeekDay, WorkPolicy};
use workstead_core::policy::{self, Actor};
use workstead_core::repository::WorkPolicyRepository;

use crate::input;

/// Work-policy service.
pub struct WorkPolicyService<W, A>
where
    W: WorkPolicyRepository,
    A: Announcer,
{
    policies: W,
    announcer: A,
}

impl<W, A> WorkPolicyService<W, A>
where
    W: WorkPolicyRepository,
    A: Announcer,
{
    pub fn new(policies: W, announcer: A) -> Self {
        Self {
            policies,
            announcer,
        }
    }

    pub async fn get(&self, actor: Actor) -> HrResult<WorkPolicy> {
        self.policies.get(actor.organization_id).await
    }

    pub async fn list_holidays(&self, actor: Actor) -> HrResult<Vec<Holiday>> {
        self.policies.list_holidays(actor.organization_id).await
    }

    /// Record a new holiday and announce it to the organization.
    pub async fn add_holiday(&self, actor: Actor, name: &str, date: &str) -> HrResult<Holiday> {
        self.require_manager(actor)?;
        if name.trim().is_empty() {
            return Err(HrError::bad_request("a holiday name is required"));
        }
        let date = input::parse_start_date(date)?;

        let holiday = self
            .policies
            .add_holiday(actor.organization_id, name.trim(), date)
            .await?;

        self.announce(
            actor,
            "New holiday".into(),
            format!("{} on {}", holiday.name, holiday.date),
            serde_json::json!({ "kind": "holiday", "date": holiday.date.to_string() }),
        )
        .await;

        Ok(holiday)
    }

    /// Change the working hours and announce the change.
    pub async fn set_working_hours(
        &self,
        actor: Actor,
        day_start: &str,
        day_end: &str,
    ) -> HrResult<WorkPolicy> {
        self.require_manager(actor)?;
        let start = input::parse_clock_time(day_start)?;
        let end = input::parse_clock_time(day_end)?;
        if start >= end {
            return Err(HrError::bad_request(
                "the working day must start before it ends",
            ));
        }

        let policy = self
            .policies
            .set_working_hours(actor.organization_id, start, end)
            .await?;

        self.announce(
            actor,
            "Working hours changed".into(),
            format!(
                "Working hours are now {} to {}",
                policy.day_start.format("%H:%M"),
                policy.day_end.format("%H:%M")
            ),
            serde_json::json!({ "kind": "working_hours" }),
        )
        .await;

        Ok(policy)
    }

    /// Change the workweek and announce the change. The day set must
    /// be non-empty valid weekday names, duplicates removed.
    pub async fn set_workweek(&self, actor: Actor, days: &[String]) -> HrResult<WorkPolicy> {
        self.require_manager(actor)?;

        let mut workweek: Vec<WeekDay> = Vec::new();
        for raw in days {
            let day = WeekDay::parse(raw)
                .ok_or_else(|| HrError::bad_request(format!("invalid weekday: {raw}")))?;
            if !workweek.contains(&day) {
                workweek.push(day);
            }
        }
        if workweek.is_empty() {
            return Err(HrError::bad_request(
                "the workweek must contain at least one day",
            ));
        }

        let policy = self
            .policies
            .set_workweek(actor.organization_id, workweek)
            .await?;

        self.announce(
            actor,
            "Workweek changed".into(),
            format!(
                "The workweek is now {}",
                policy
                    .workweek
                    .iter()
                    .map(|d| d.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            serde_json::json!({ "kind": "workweek" }),
        )
        .await;

        Ok(policy)
    }

    fn require_manager(&self, actor: Actor) -> HrResult<()> {
        if !policy::can_manage_organization(actor.role) {
            return Err(HrError::forbidden(
                "work-policy changes require organization-management rank",
            ));
        }
        Ok(())
    }

    /// Post-commit, fire-and-forget: a failed publish is logged and
    /// swallowed.
    async fn announce(
        &self,
        actor: Actor,
        title: String,
        body: String,
        metadata: serde_json::Value,
    ) {
        let announcement = Announcement {
            organization_id: actor.organization_id,
            title,
            body,
            metadata,
            created_at: Utc::now(),
        };
        if let Err(err) = self.announcer.publish(announcement).await {
            warn!(error = %err, "announcement fan-out failed");
        }
    }
}
