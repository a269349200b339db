use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: uuid::Uuid,
    /// Unique short handle, 3-20 word characters.
    pub login: String,
    /// Display name.
    pub username: String,
    /// Unique, stored lowercased.
    pub email: String,
    pub password_hash: String,
    pub email_confirmed: bool,
    pub email_confirmation_token: Option<String>,
    /// Two-letter country code driving the regional calendar overlay.
    pub region: Option<String>,
    /// Calendars this user owns.
    pub calendars: Vec<uuid::Uuid>,
    /// Calendars shared with this user by their owners.
    pub shared_with_me: Vec<uuid::Uuid>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub login: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub region: Option<String>,
}

/// Lightweight identity projection embedded in calendar listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: uuid::Uuid,
    pub login: String,
    pub username: String,
    pub email: String,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            login: user.login.clone(),
            username: user.username.clone(),
            email: user.email.clone(),
        }
    }
}
