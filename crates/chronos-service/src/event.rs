//! Event lifecycle: creation with recurrence expansion, reads across the
//! persisted and regional worlds, and the creator-only mutation surface.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use chronos_core::constants::DEFAULT_EVENT_COLOR;
use chronos_core::types::{CalendarRef, EventKind, EventRef, EventStatus, RepeatKind};
use chronos_db::model::{Calendar, Event, NewEvent, NewNotification, Notification};
use chronos_db::store::DataStore;

use crate::access;
use crate::error::{ServiceError, ServiceResult};
use crate::recurrence::{self, OCCURRENCE_COUNT};
use crate::regional::{countries, RegionalCalendarService, VirtualEvent};

/// One entry of an event lookup or listing, untagged like calendar entries.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum EventEntry {
    Persisted(Event),
    Regional(VirtualEvent),
}

#[derive(Debug, Clone)]
pub struct NewEventInput {
    pub title: String,
    pub description: String,
    pub kind: EventKind,
    pub start_date: Option<chrono::DateTime<chrono::Utc>>,
    pub end_date: Option<chrono::DateTime<chrono::Utc>>,
    pub calendar: Uuid,
    pub repeat: RepeatKind,
    pub color: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct EventUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<Option<chrono::DateTime<chrono::Utc>>>,
    pub end_date: Option<Option<chrono::DateTime<chrono::Utc>>>,
    pub color: Option<String>,
}

const MAX_TITLE_LEN: usize = 100;

fn validated_title(raw: &str) -> ServiceResult<String> {
    let title = raw.trim().to_owned();
    if title.is_empty() {
        return Err(ServiceError::ValidationError(
            "Event title is required".to_owned(),
        ));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(ServiceError::ValidationError(
            "Event title must be at most 100 characters".to_owned(),
        ));
    }
    Ok(title)
}

pub struct EventService {
    store: Arc<dyn DataStore>,
    regional: Arc<RegionalCalendarService>,
}

impl EventService {
    #[must_use]
    pub fn new(store: Arc<dyn DataStore>, regional: Arc<RegionalCalendarService>) -> Self {
        Self { store, regional }
    }

    /// Creates an event in a calendar the caller can read.
    ///
    /// A repeating template is expanded into its occurrence documents
    /// best-effort: a mid-loop store failure leaves a partial series and the
    /// template always survives. A reminder-kind template also records one
    /// notification at its start time.
    ///
    /// ## Errors
    /// Validation errors for a missing or overlong title or the kind's date
    /// requirements, access denied when the caller cannot read the calendar.
    pub async fn create(&self, creator: Uuid, input: NewEventInput) -> ServiceResult<Event> {
        let calendar = self.require_calendar(input.calendar).await?;
        if !access::can_access(&calendar, creator) {
            return Err(ServiceError::AccessDenied(
                "You do not have access to this calendar".to_owned(),
            ));
        }

        let title = validated_title(&input.title)?;
        if input.kind.requires_start() && input.start_date.is_none() {
            return Err(ServiceError::ValidationError(
                "Start date is required for this event type".to_owned(),
            ));
        }
        if input.kind.requires_end() && input.end_date.is_none() {
            return Err(ServiceError::ValidationError(
                "End date is required for this event type".to_owned(),
            ));
        }
        if let (Some(start), Some(end)) = (input.start_date, input.end_date) {
            if end < start {
                return Err(ServiceError::ValidationError(
                    "End date must be after start date".to_owned(),
                ));
            }
        }

        let template = self
            .store
            .insert_event(NewEvent {
                title,
                description: input.description,
                kind: input.kind,
                start_date: input.start_date,
                end_date: input.end_date,
                calendar: calendar.id,
                creator,
                repeat: input.repeat,
                color: input
                    .color
                    .unwrap_or_else(|| DEFAULT_EVENT_COLOR.to_owned()),
            })
            .await?;
        self.store.push_event_ref(calendar.id, template.id).await?;

        if template.repeat != RepeatKind::None {
            let mut created = 0_u32;
            for occurrence in recurrence::expand(&template, OCCURRENCE_COUNT) {
                let persisted = match self.store.insert_event(occurrence).await {
                    Ok(event) => event,
                    Err(e) => {
                        tracing::warn!(
                            template = %template.id,
                            created,
                            error = %e,
                            "Recurrence expansion stopped early"
                        );
                        break;
                    }
                };
                if let Err(e) = self.store.push_event_ref(calendar.id, persisted.id).await {
                    tracing::warn!(
                        template = %template.id,
                        created,
                        error = %e,
                        "Recurrence expansion stopped early"
                    );
                    break;
                }
                created += 1;
            }
            tracing::debug!(template = %template.id, occurrences = created, "Expanded recurring event");
        }

        if template.kind == EventKind::Reminder {
            if let Some(start) = template.start_date {
                self.store
                    .insert_notification(NewNotification {
                        user: creator,
                        event: template.id,
                        message: format!("Reminder: {}", template.title),
                        send_at: start,
                    })
                    .await?;
            }
        }

        Ok(template)
    }

    /// Resolves one event reference for the caller.
    ///
    /// ## Errors
    /// Not found for missing events, access denied when the caller is
    /// neither creator, invitee, nor calendar reader, or on a regional
    /// region mismatch.
    pub async fn get(&self, user_id: Uuid, event_ref: &EventRef) -> ServiceResult<EventEntry> {
        match event_ref {
            EventRef::Persisted(id) => {
                let event = self.require_event(*id).await?;
                let calendar = self.require_calendar(event.calendar).await?;
                if !access::can_view_event(&event, &calendar, user_id) {
                    return Err(ServiceError::AccessDenied(
                        "You do not have access to this event".to_owned(),
                    ));
                }
                Ok(EventEntry::Persisted(event))
            }
            EventRef::Regional(id) => {
                self.require_region_match(user_id, &id.country).await?;
                Ok(EventEntry::Regional(self.regional.get_event_by_id(id).await?))
            }
        }
    }

    /// All events of one calendar reference.
    ///
    /// ## Errors
    /// Access denied when the caller cannot read the calendar or, for a
    /// regional ref, their region does not match.
    pub async fn list_calendar_events(
        &self,
        user_id: Uuid,
        calendar_ref: &CalendarRef,
    ) -> ServiceResult<Vec<EventEntry>> {
        match calendar_ref {
            CalendarRef::Persisted(id) => {
                let calendar = self.require_calendar(*id).await?;
                if !access::can_access(&calendar, user_id) {
                    return Err(ServiceError::AccessDenied(
                        "You do not have access to this calendar".to_owned(),
                    ));
                }
                Ok(self
                    .store
                    .find_calendar_events(calendar.id)
                    .await?
                    .into_iter()
                    .map(EventEntry::Persisted)
                    .collect())
            }
            CalendarRef::Regional(id) => {
                self.require_region_match(user_id, &id.country).await?;
                Ok(self
                    .regional
                    .get_calendar_events(id)
                    .await?
                    .into_iter()
                    .map(EventEntry::Regional)
                    .collect())
            }
        }
    }

    /// Events the user has been invited to.
    ///
    /// ## Errors
    /// Database errors only.
    pub async fn invited(&self, user_id: Uuid) -> ServiceResult<Vec<Event>> {
        Ok(self.store.find_invited_events(user_id).await?)
    }

    /// Creator-only field merge. Dates use double options so a field can be
    /// left alone, set, or cleared.
    ///
    /// ## Errors
    /// Access denied for non-creators, validation error when the merged
    /// dates or title are inconsistent.
    pub async fn update(
        &self,
        user_id: Uuid,
        event_id: Uuid,
        update: EventUpdate,
    ) -> ServiceResult<Event> {
        let mut event = self.require_modifiable(user_id, event_id).await?;

        if let Some(title) = update.title {
            event.title = validated_title(&title)?;
        }
        if let Some(description) = update.description {
            event.description = description;
        }
        if let Some(start_date) = update.start_date {
            event.start_date = start_date;
        }
        if let Some(end_date) = update.end_date {
            event.end_date = end_date;
        }
        if let Some(color) = update.color {
            event.color = color;
        }

        if event.kind.requires_start() && event.start_date.is_none() {
            return Err(ServiceError::ValidationError(
                "Start date is required for this event type".to_owned(),
            ));
        }
        if event.kind.requires_end() && event.end_date.is_none() {
            return Err(ServiceError::ValidationError(
                "End date is required for this event type".to_owned(),
            ));
        }
        if let (Some(start), Some(end)) = (event.start_date, event.end_date) {
            if end < start {
                return Err(ServiceError::ValidationError(
                    "End date must be after start date".to_owned(),
                ));
            }
        }

        Ok(self.store.update_event(event).await?)
    }

    /// Deletes one event document with its notifications and calendar
    /// back-reference. Occurrences of a series are independent documents and
    /// are deleted one by one.
    ///
    /// ## Errors
    /// Access denied for non-creators.
    pub async fn delete(&self, user_id: Uuid, event_id: Uuid) -> ServiceResult<()> {
        let event = self.require_modifiable(user_id, event_id).await?;

        self.store.delete_event_notifications(event.id).await?;
        self.store.pull_event_ref(event.calendar, event.id).await?;
        self.store.delete_event(event.id).await?;
        tracing::debug!(event = %event.id, "Deleted event");
        Ok(())
    }

    /// Invites a user to an event. Re-inviting is a no-op on the invitee set
    /// but still records a fresh notification.
    ///
    /// ## Errors
    /// Access denied for non-creators, not found for a missing target,
    /// validation error when the target is the creator.
    pub async fn invite(&self, caller: Uuid, event_id: Uuid, target: Uuid) -> ServiceResult<Event> {
        let event = self.require_modifiable(caller, event_id).await?;
        self.store
            .find_user(target)
            .await?
            .ok_or_else(|| ServiceError::NotFound("User not found".to_owned()))?;
        if target == event.creator {
            return Err(ServiceError::ValidationError(
                "Cannot invite the event creator".to_owned(),
            ));
        }

        self.store.push_invitee(event.id, target).await?;
        self.store
            .insert_notification(NewNotification {
                user: target,
                event: event.id,
                message: format!("You have been invited to \"{}\"", event.title),
                send_at: event.start_date.unwrap_or_else(Utc::now),
            })
            .await?;

        tracing::debug!(event = %event.id, target = %target, "Invited user to event");
        self.require_event(event_id).await
    }

    /// ## Errors
    /// Access denied for non-creators.
    pub async fn update_status(
        &self,
        user_id: Uuid,
        event_id: Uuid,
        status: EventStatus,
    ) -> ServiceResult<Event> {
        let mut event = self.require_modifiable(user_id, event_id).await?;
        event.status = status;
        Ok(self.store.update_event(event).await?)
    }

    /// Changes the repeat tag of one document. Occurrences are not
    /// regenerated; the tag drives future expansion only.
    ///
    /// ## Errors
    /// Access denied for non-creators.
    pub async fn update_repeat(
        &self,
        user_id: Uuid,
        event_id: Uuid,
        repeat: RepeatKind,
    ) -> ServiceResult<Event> {
        let mut event = self.require_modifiable(user_id, event_id).await?;
        event.repeat = repeat;
        Ok(self.store.update_event(event).await?)
    }

    /// The caller's notification feed.
    ///
    /// ## Errors
    /// Database errors only.
    pub async fn notifications(&self, user_id: Uuid) -> ServiceResult<Vec<Notification>> {
        Ok(self.store.find_user_notifications(user_id).await?)
    }

    async fn require_calendar(&self, id: Uuid) -> ServiceResult<Calendar> {
        self.store
            .find_calendar(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Calendar not found".to_owned()))
    }

    async fn require_event(&self, id: Uuid) -> ServiceResult<Event> {
        self.store
            .find_event(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Event not found".to_owned()))
    }

    async fn require_modifiable(&self, user_id: Uuid, event_id: Uuid) -> ServiceResult<Event> {
        let event = self.require_event(event_id).await?;
        if !access::can_modify_event(&event, user_id) {
            return Err(ServiceError::AccessDenied(
                "Only the creator can modify this event".to_owned(),
            ));
        }
        Ok(event)
    }

    async fn require_region_match(&self, user_id: Uuid, country: &str) -> ServiceResult<()> {
        let country = countries::normalize(country)?;
        let user = self
            .store
            .find_user(user_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("User not found".to_owned()))?;
        if user.region.as_deref() != Some(country.as_str()) {
            return Err(ServiceError::AccessDenied(
                "You do not have access to this calendar".to_owned(),
            ));
        }
        Ok(())
    }
}
