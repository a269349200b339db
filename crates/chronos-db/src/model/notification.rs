use serde::{Deserialize, Serialize};

/// In-app notification record created for reminder templates and event
/// invitations. Delivery itself is an external collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: uuid::Uuid,
    pub user: uuid::Uuid,
    pub event: uuid::Uuid,
    pub message: String,
    pub send_at: chrono::DateTime<chrono::Utc>,
    pub method: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone)]
pub struct NewNotification {
    pub user: uuid::Uuid,
    pub event: uuid::Uuid,
    pub message: String,
    pub send_at: chrono::DateTime<chrono::Utc>,
}
