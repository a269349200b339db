use serde::{Deserialize, Serialize};

use super::user::UserSummary;

/// A (user, per-share display color) pair granting read access to a
/// non-owner. Unique per user within one calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharingEntry {
    pub user: uuid::Uuid,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Calendar {
    pub id: uuid::Uuid,
    pub name: String,
    pub description: String,
    pub color: String,
    /// Immutable after creation.
    pub owner: uuid::Uuid,
    /// Exactly one per user; cannot be deleted or shared.
    pub is_default: bool,
    /// Requests the regional holiday overlay at read time.
    pub include_holidays: bool,
    pub shared_with: Vec<SharingEntry>,
    pub events: Vec<uuid::Uuid>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl Calendar {
    #[must_use]
    pub fn is_shared_with(&self, user: uuid::Uuid) -> bool {
        self.shared_with.iter().any(|entry| entry.user == user)
    }
}

#[derive(Debug, Clone)]
pub struct NewCalendar {
    pub name: String,
    pub description: String,
    pub color: String,
    pub owner: uuid::Uuid,
    pub is_default: bool,
    pub include_holidays: bool,
}

/// Calendar joined with the lightweight identities of its owner and sharers,
/// as returned by `find_user_calendars`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PopulatedCalendar {
    #[serde(flatten)]
    pub calendar: Calendar,
    pub owner_identity: UserSummary,
    pub sharer_identities: Vec<UserSummary>,
}
