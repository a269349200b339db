//! Persistence boundary of the system.
//!
//! The storage engine is an external collaborator consumed only through the
//! [`DataStore`] trait: create/find/update/delete per document plus the
//! set-add push/pull primitives the services rely on for reference fields.
//! [`memory::MemoryStore`] is the in-process implementation used by the
//! server and by tests.

pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::DbResult;
use crate::model::{
    Calendar, Event, NewCalendar, NewEvent, NewNotification, NewUser, Notification,
    PopulatedCalendar, SharingEntry, User, UserSummary,
};

/// Repository contract with at-least read-your-writes consistency within a
/// single request. Push operations have set-add semantics: re-adding an
/// existing reference is a no-op, not an error.
#[async_trait]
pub trait DataStore: Send + Sync {
    // --- users ---

    /// Fails with a duplicate error if login or email is already taken.
    async fn insert_user(&self, new: NewUser) -> DbResult<User>;
    async fn find_user(&self, id: Uuid) -> DbResult<Option<User>>;
    /// Looks up by login or email (email compared lowercased).
    async fn find_user_by_identifier(&self, identifier: &str) -> DbResult<Option<User>>;
    /// Looks up by pending email confirmation token.
    async fn find_user_by_confirmation_token(&self, token: &str) -> DbResult<Option<User>>;
    /// Fails with a duplicate error if the new email belongs to another user.
    async fn update_user(&self, user: User) -> DbResult<User>;
    async fn delete_user(&self, id: Uuid) -> DbResult<()>;
    async fn search_users(&self, query: &str) -> DbResult<Vec<UserSummary>>;
    async fn push_owned_calendar(&self, user: Uuid, calendar: Uuid) -> DbResult<()>;
    async fn pull_owned_calendar(&self, user: Uuid, calendar: Uuid) -> DbResult<()>;
    async fn push_shared_calendar(&self, user: Uuid, calendar: Uuid) -> DbResult<()>;
    async fn pull_shared_calendar(&self, user: Uuid, calendar: Uuid) -> DbResult<()>;
    /// Removes the given calendars from every user's `shared_with_me`.
    async fn pull_calendars_from_all_users(&self, calendars: &[Uuid]) -> DbResult<()>;

    // --- calendars ---

    async fn insert_calendar(&self, new: NewCalendar) -> DbResult<Calendar>;
    async fn find_calendar(&self, id: Uuid) -> DbResult<Option<Calendar>>;
    async fn update_calendar(&self, calendar: Calendar) -> DbResult<Calendar>;
    async fn delete_calendar(&self, id: Uuid) -> DbResult<()>;
    /// Owned union shared, each with owner/sharer identity projections.
    async fn find_user_calendars(&self, user: Uuid) -> DbResult<Vec<PopulatedCalendar>>;
    async fn find_default_calendar(&self, owner: Uuid) -> DbResult<Option<Calendar>>;
    async fn list_owned_calendars(&self, owner: Uuid) -> DbResult<Vec<Calendar>>;
    async fn push_event_ref(&self, calendar: Uuid, event: Uuid) -> DbResult<()>;
    async fn pull_event_ref(&self, calendar: Uuid, event: Uuid) -> DbResult<()>;
    /// Set-add keyed by the entry's user.
    async fn push_sharing_entry(&self, calendar: Uuid, entry: SharingEntry) -> DbResult<()>;
    async fn pull_sharing_entry(&self, calendar: Uuid, user: Uuid) -> DbResult<()>;
    /// Removes the user from every calendar's `shared_with` list.
    async fn pull_user_from_all_sharing(&self, user: Uuid) -> DbResult<()>;

    // --- events ---

    async fn insert_event(&self, new: NewEvent) -> DbResult<Event>;
    async fn find_event(&self, id: Uuid) -> DbResult<Option<Event>>;
    async fn update_event(&self, event: Event) -> DbResult<Event>;
    async fn delete_event(&self, id: Uuid) -> DbResult<()>;
    async fn find_calendar_events(&self, calendar: Uuid) -> DbResult<Vec<Event>>;
    async fn find_invited_events(&self, user: Uuid) -> DbResult<Vec<Event>>;
    async fn push_invitee(&self, event: Uuid, user: Uuid) -> DbResult<()>;
    async fn delete_calendar_events(&self, calendar: Uuid) -> DbResult<()>;
    /// Events whose start falls inside `[from, to]`, for the reminder scan.
    async fn find_due_events(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> DbResult<Vec<Event>>;

    // --- notifications ---

    async fn insert_notification(&self, new: NewNotification) -> DbResult<Notification>;
    async fn delete_event_notifications(&self, event: Uuid) -> DbResult<()>;
    async fn find_user_notifications(&self, user: Uuid) -> DbResult<Vec<Notification>>;
}
