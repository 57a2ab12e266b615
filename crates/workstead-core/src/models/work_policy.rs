//! Work policy domain model: workweek, working hours, holidays.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeekDay {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl WeekDay {
    pub fn as_str(&self) -> &'static str {
        match self {
            WeekDay::Monday => "Monday",
            WeekDay::Tuesday => "Tuesday",
            WeekDay::Wednesday => "Wednesday",
            WeekDay::Thursday => "Thursday",
            WeekDay::Friday => "Friday",
            WeekDay::Saturday => "Saturday",
            WeekDay::Sunday => "Sunday",
        }
    }

    pub fn parse(s: &str) -> Option<WeekDay> {
        match s {
            "Monday" => Some(WeekDay::Monday),
            "Tuesday" => Some(WeekDay::Tuesday),
            "Wednesday" => Some(WeekDay::Wednesday),
            "Thursday" => Some(WeekDay::Thursday),
            "Friday" => Some(WeekDay::Friday),
            "Saturday" => Some(WeekDay::Saturday),
            "Sunday" => Some(WeekDay::Sunday),
            _ => None,
        }
    }
}

/// Per-organization work policy. One row per organization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkPolicy {
    pub organization_id: Uuid,
    pub workweek: Vec<WeekDay>,
    pub day_start: NaiveTime,
    pub day_end: NaiveTime,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Holiday {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub name: String,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
}
