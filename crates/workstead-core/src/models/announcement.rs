//! Announcement payload pushed to the realtime fan-out collaborator
//! after policy-relevant changes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Announcement {
    /// Audience: the whole organization.
    pub organization_id: Uuid,
    pub title: String,
    pub body: String,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
}
