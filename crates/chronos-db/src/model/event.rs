use serde::{Deserialize, Serialize};

use chronos_core::types::{EventKind, EventStatus, RepeatKind};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: uuid::Uuid,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub start_date: Option<chrono::DateTime<chrono::Utc>>,
    pub end_date: Option<chrono::DateTime<chrono::Utc>>,
    /// Always points at a calendar whose `events` list contains this id.
    pub calendar: uuid::Uuid,
    /// Immutable after creation; the only principal allowed to mutate.
    pub creator: uuid::Uuid,
    /// Never contains the creator.
    pub invited: Vec<uuid::Uuid>,
    pub status: EventStatus,
    pub repeat: RepeatKind,
    pub color: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl Event {
    #[must_use]
    pub fn is_invited(&self, user: uuid::Uuid) -> bool {
        self.invited.contains(&user)
    }
}

#[derive(Debug, Clone)]
pub struct NewEvent {
    pub title: String,
    pub description: String,
    pub kind: EventKind,
    pub start_date: Option<chrono::DateTime<chrono::Utc>>,
    pub end_date: Option<chrono::DateTime<chrono::Utc>>,
    pub calendar: uuid::Uuid,
    pub creator: uuid::Uuid,
    pub repeat: RepeatKind,
    pub color: String,
}
