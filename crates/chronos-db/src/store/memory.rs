//! In-process document store.
//!
//! One `RwLock` guards all collections, which gives read-your-writes within a
//! request and makes each push/pull primitive atomic. This is the per-process
//! collaborator the services run against; nothing survives a restart.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::model::{
    Calendar, Event, NewCalendar, NewEvent, NewNotification, NewUser, Notification,
    PopulatedCalendar, SharingEntry, User, UserSummary,
};
use crate::store::DataStore;

#[derive(Debug, Default)]
struct Collections {
    users: HashMap<Uuid, User>,
    calendars: HashMap<Uuid, Calendar>,
    events: HashMap<Uuid, Event>,
    notifications: HashMap<Uuid, Notification>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Collections>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn summarize(users: &HashMap<Uuid, User>, id: Uuid) -> Option<UserSummary> {
    users.get(&id).map(UserSummary::from)
}

#[async_trait]
impl DataStore for MemoryStore {
    async fn insert_user(&self, new: NewUser) -> DbResult<User> {
        let mut inner = self.inner.write().await;
        let email = new.email.to_lowercase();

        if inner.users.values().any(|u| u.login == new.login) {
            return Err(DbError::Duplicate("login".to_owned()));
        }
        if inner.users.values().any(|u| u.email == email) {
            return Err(DbError::Duplicate("email".to_owned()));
        }

        let user = User {
            id: Uuid::new_v4(),
            login: new.login,
            username: new.username,
            email,
            password_hash: new.password_hash,
            email_confirmed: false,
            email_confirmation_token: None,
            region: new.region,
            calendars: Vec::new(),
            shared_with_me: Vec::new(),
            created_at: Utc::now(),
        };
        inner.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user(&self, id: Uuid) -> DbResult<Option<User>> {
        Ok(self.inner.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_identifier(&self, identifier: &str) -> DbResult<Option<User>> {
        let email = identifier.to_lowercase();
        Ok(self
            .inner
            .read()
            .await
            .users
            .values()
            .find(|u| u.login == identifier || u.email == email)
            .cloned())
    }

    async fn find_user_by_confirmation_token(&self, token: &str) -> DbResult<Option<User>> {
        Ok(self
            .inner
            .read()
            .await
            .users
            .values()
            .find(|u| u.email_confirmation_token.as_deref() == Some(token))
            .cloned())
    }

    async fn update_user(&self, mut user: User) -> DbResult<User> {
        let mut inner = self.inner.write().await;
        user.email = user.email.to_lowercase();

        if !inner.users.contains_key(&user.id) {
            return Err(DbError::NotFound(format!("user {}", user.id)));
        }
        if inner
            .users
            .values()
            .any(|u| u.id != user.id && u.email == user.email)
        {
            return Err(DbError::Duplicate("email".to_owned()));
        }

        inner.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn delete_user(&self, id: Uuid) -> DbResult<()> {
        let mut inner = self.inner.write().await;
        inner
            .users
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| DbError::NotFound(format!("user {id}")))
    }

    async fn search_users(&self, query: &str) -> DbResult<Vec<UserSummary>> {
        let needle = query.to_lowercase();
        let inner = self.inner.read().await;
        let mut found: Vec<UserSummary> = inner
            .users
            .values()
            .filter(|u| {
                u.login.to_lowercase().contains(&needle)
                    || u.username.to_lowercase().contains(&needle)
                    || u.email.contains(&needle)
            })
            .map(UserSummary::from)
            .collect();
        found.sort_by(|a, b| a.login.cmp(&b.login));
        Ok(found)
    }

    async fn push_owned_calendar(&self, user: Uuid, calendar: Uuid) -> DbResult<()> {
        let mut inner = self.inner.write().await;
        let doc = inner
            .users
            .get_mut(&user)
            .ok_or_else(|| DbError::NotFound(format!("user {user}")))?;
        if !doc.calendars.contains(&calendar) {
            doc.calendars.push(calendar);
        }
        Ok(())
    }

    async fn pull_owned_calendar(&self, user: Uuid, calendar: Uuid) -> DbResult<()> {
        let mut inner = self.inner.write().await;
        let doc = inner
            .users
            .get_mut(&user)
            .ok_or_else(|| DbError::NotFound(format!("user {user}")))?;
        doc.calendars.retain(|id| *id != calendar);
        Ok(())
    }

    async fn push_shared_calendar(&self, user: Uuid, calendar: Uuid) -> DbResult<()> {
        let mut inner = self.inner.write().await;
        let doc = inner
            .users
            .get_mut(&user)
            .ok_or_else(|| DbError::NotFound(format!("user {user}")))?;
        if !doc.shared_with_me.contains(&calendar) {
            doc.shared_with_me.push(calendar);
        }
        Ok(())
    }

    async fn pull_shared_calendar(&self, user: Uuid, calendar: Uuid) -> DbResult<()> {
        let mut inner = self.inner.write().await;
        let doc = inner
            .users
            .get_mut(&user)
            .ok_or_else(|| DbError::NotFound(format!("user {user}")))?;
        doc.shared_with_me.retain(|id| *id != calendar);
        Ok(())
    }

    async fn pull_calendars_from_all_users(&self, calendars: &[Uuid]) -> DbResult<()> {
        let mut inner = self.inner.write().await;
        for user in inner.users.values_mut() {
            user.shared_with_me.retain(|id| !calendars.contains(id));
        }
        Ok(())
    }

    async fn insert_calendar(&self, new: NewCalendar) -> DbResult<Calendar> {
        let mut inner = self.inner.write().await;
        let calendar = Calendar {
            id: Uuid::new_v4(),
            name: new.name,
            description: new.description,
            color: new.color,
            owner: new.owner,
            is_default: new.is_default,
            include_holidays: new.include_holidays,
            shared_with: Vec::new(),
            events: Vec::new(),
            created_at: Utc::now(),
        };
        inner.calendars.insert(calendar.id, calendar.clone());
        Ok(calendar)
    }

    async fn find_calendar(&self, id: Uuid) -> DbResult<Option<Calendar>> {
        Ok(self.inner.read().await.calendars.get(&id).cloned())
    }

    async fn update_calendar(&self, calendar: Calendar) -> DbResult<Calendar> {
        let mut inner = self.inner.write().await;
        if !inner.calendars.contains_key(&calendar.id) {
            return Err(DbError::NotFound(format!("calendar {}", calendar.id)));
        }
        inner.calendars.insert(calendar.id, calendar.clone());
        Ok(calendar)
    }

    async fn delete_calendar(&self, id: Uuid) -> DbResult<()> {
        let mut inner = self.inner.write().await;
        inner
            .calendars
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| DbError::NotFound(format!("calendar {id}")))
    }

    async fn find_user_calendars(&self, user: Uuid) -> DbResult<Vec<PopulatedCalendar>> {
        let inner = self.inner.read().await;
        let mut calendars: Vec<&Calendar> = inner
            .calendars
            .values()
            .filter(|cal| cal.owner == user || cal.is_shared_with(user))
            .collect();
        // Owned first, then shared, oldest first within each group.
        calendars.sort_by_key(|cal| (cal.owner != user, cal.created_at));

        let mut populated = Vec::with_capacity(calendars.len());
        for cal in calendars {
            let Some(owner_identity) = summarize(&inner.users, cal.owner) else {
                tracing::warn!(calendar = %cal.id, owner = %cal.owner, "Calendar owner missing, skipping");
                continue;
            };
            let sharer_identities = cal
                .shared_with
                .iter()
                .filter_map(|entry| summarize(&inner.users, entry.user))
                .collect();
            populated.push(PopulatedCalendar {
                calendar: cal.clone(),
                owner_identity,
                sharer_identities,
            });
        }
        Ok(populated)
    }

    async fn find_default_calendar(&self, owner: Uuid) -> DbResult<Option<Calendar>> {
        Ok(self
            .inner
            .read()
            .await
            .calendars
            .values()
            .find(|cal| cal.owner == owner && cal.is_default)
            .cloned())
    }

    async fn list_owned_calendars(&self, owner: Uuid) -> DbResult<Vec<Calendar>> {
        let inner = self.inner.read().await;
        let mut owned: Vec<Calendar> = inner
            .calendars
            .values()
            .filter(|cal| cal.owner == owner)
            .cloned()
            .collect();
        owned.sort_by_key(|cal| cal.created_at);
        Ok(owned)
    }

    async fn push_event_ref(&self, calendar: Uuid, event: Uuid) -> DbResult<()> {
        let mut inner = self.inner.write().await;
        let doc = inner
            .calendars
            .get_mut(&calendar)
            .ok_or_else(|| DbError::NotFound(format!("calendar {calendar}")))?;
        if !doc.events.contains(&event) {
            doc.events.push(event);
        }
        Ok(())
    }

    async fn pull_event_ref(&self, calendar: Uuid, event: Uuid) -> DbResult<()> {
        let mut inner = self.inner.write().await;
        let doc = inner
            .calendars
            .get_mut(&calendar)
            .ok_or_else(|| DbError::NotFound(format!("calendar {calendar}")))?;
        doc.events.retain(|id| *id != event);
        Ok(())
    }

    async fn push_sharing_entry(&self, calendar: Uuid, entry: SharingEntry) -> DbResult<()> {
        let mut inner = self.inner.write().await;
        let doc = inner
            .calendars
            .get_mut(&calendar)
            .ok_or_else(|| DbError::NotFound(format!("calendar {calendar}")))?;
        if !doc.is_shared_with(entry.user) {
            doc.shared_with.push(entry);
        }
        Ok(())
    }

    async fn pull_sharing_entry(&self, calendar: Uuid, user: Uuid) -> DbResult<()> {
        let mut inner = self.inner.write().await;
        let doc = inner
            .calendars
            .get_mut(&calendar)
            .ok_or_else(|| DbError::NotFound(format!("calendar {calendar}")))?;
        doc.shared_with.retain(|entry| entry.user != user);
        Ok(())
    }

    async fn pull_user_from_all_sharing(&self, user: Uuid) -> DbResult<()> {
        let mut inner = self.inner.write().await;
        for cal in inner.calendars.values_mut() {
            cal.shared_with.retain(|entry| entry.user != user);
        }
        Ok(())
    }

    async fn insert_event(&self, new: NewEvent) -> DbResult<Event> {
        let mut inner = self.inner.write().await;
        let event = Event {
            id: Uuid::new_v4(),
            title: new.title,
            description: new.description,
            kind: new.kind,
            start_date: new.start_date,
            end_date: new.end_date,
            calendar: new.calendar,
            creator: new.creator,
            invited: Vec::new(),
            status: chronos_core::types::EventStatus::Pending,
            repeat: new.repeat,
            color: new.color,
            created_at: Utc::now(),
        };
        inner.events.insert(event.id, event.clone());
        Ok(event)
    }

    async fn find_event(&self, id: Uuid) -> DbResult<Option<Event>> {
        Ok(self.inner.read().await.events.get(&id).cloned())
    }

    async fn update_event(&self, event: Event) -> DbResult<Event> {
        let mut inner = self.inner.write().await;
        if !inner.events.contains_key(&event.id) {
            return Err(DbError::NotFound(format!("event {}", event.id)));
        }
        inner.events.insert(event.id, event.clone());
        Ok(event)
    }

    async fn delete_event(&self, id: Uuid) -> DbResult<()> {
        let mut inner = self.inner.write().await;
        inner
            .events
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| DbError::NotFound(format!("event {id}")))
    }

    async fn find_calendar_events(&self, calendar: Uuid) -> DbResult<Vec<Event>> {
        let inner = self.inner.read().await;
        let mut events: Vec<Event> = inner
            .events
            .values()
            .filter(|event| event.calendar == calendar)
            .cloned()
            .collect();
        events.sort_by_key(|event| (event.start_date, event.created_at));
        Ok(events)
    }

    async fn find_invited_events(&self, user: Uuid) -> DbResult<Vec<Event>> {
        let inner = self.inner.read().await;
        let mut events: Vec<Event> = inner
            .events
            .values()
            .filter(|event| event.is_invited(user))
            .cloned()
            .collect();
        events.sort_by_key(|event| (event.start_date, event.created_at));
        Ok(events)
    }

    async fn push_invitee(&self, event: Uuid, user: Uuid) -> DbResult<()> {
        let mut inner = self.inner.write().await;
        let doc = inner
            .events
            .get_mut(&event)
            .ok_or_else(|| DbError::NotFound(format!("event {event}")))?;
        if !doc.invited.contains(&user) {
            doc.invited.push(user);
        }
        Ok(())
    }

    async fn delete_calendar_events(&self, calendar: Uuid) -> DbResult<()> {
        let mut inner = self.inner.write().await;
        let removed: Vec<Uuid> = inner
            .events
            .values()
            .filter(|event| event.calendar == calendar)
            .map(|event| event.id)
            .collect();
        for id in &removed {
            inner.events.remove(id);
        }
        inner
            .notifications
            .retain(|_, n| !removed.contains(&n.event));
        if let Some(cal) = inner.calendars.get_mut(&calendar) {
            cal.events.retain(|id| !removed.contains(id));
        }
        Ok(())
    }

    async fn find_due_events(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> DbResult<Vec<Event>> {
        let inner = self.inner.read().await;
        Ok(inner
            .events
            .values()
            .filter(|event| {
                event
                    .start_date
                    .is_some_and(|start| start >= from && start <= to)
            })
            .cloned()
            .collect())
    }

    async fn insert_notification(&self, new: NewNotification) -> DbResult<Notification> {
        let mut inner = self.inner.write().await;
        let notification = Notification {
            id: Uuid::new_v4(),
            user: new.user,
            event: new.event,
            message: new.message,
            send_at: new.send_at,
            method: "in-app".to_owned(),
            created_at: Utc::now(),
        };
        inner
            .notifications
            .insert(notification.id, notification.clone());
        Ok(notification)
    }

    async fn delete_event_notifications(&self, event: Uuid) -> DbResult<()> {
        let mut inner = self.inner.write().await;
        inner.notifications.retain(|_, n| n.event != event);
        Ok(())
    }

    async fn find_user_notifications(&self, user: Uuid) -> DbResult<Vec<Notification>> {
        let inner = self.inner.read().await;
        let mut found: Vec<Notification> = inner
            .notifications
            .values()
            .filter(|n| n.user == user)
            .cloned()
            .collect();
        found.sort_by_key(|n| n.send_at);
        Ok(found)
    }
}
