//! Calendar lifecycle, sharing, and listing assembly.
//!
//! Listings merge two worlds: persisted calendars from the store and the
//! synthesized regional overlay for the user's region. The overlay is
//! assembled at this boundary on every read and never written back.

use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use chronos_core::constants::DEFAULT_CALENDAR_COLOR;
use chronos_core::types::CalendarRef;
use chronos_db::model::{Calendar, NewCalendar, PopulatedCalendar, SharingEntry, UserSummary};
use chronos_db::store::DataStore;

use crate::access;
use crate::error::{ServiceError, ServiceResult};
use crate::regional::{countries, RegionalCalendarService, VirtualCalendar};

/// One entry of a calendar listing or lookup. Serializes untagged so
/// persisted and regional calendars share one response shape.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum CalendarEntry {
    Persisted(PopulatedCalendar),
    Regional(VirtualCalendar),
}

/// Deleting the default calendar clears its events instead of removing the
/// document; the API reports which of the two happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Cleared,
    Deleted,
}

#[derive(Debug, Clone)]
pub struct NewCalendarInput {
    pub name: String,
    pub description: String,
    pub color: Option<String>,
    pub include_holidays: bool,
}

#[derive(Debug, Clone, Default)]
pub struct CalendarUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
    pub include_holidays: Option<bool>,
}

pub struct CalendarService {
    store: Arc<dyn DataStore>,
    regional: Arc<RegionalCalendarService>,
}

impl CalendarService {
    #[must_use]
    pub fn new(store: Arc<dyn DataStore>, regional: Arc<RegionalCalendarService>) -> Self {
        Self { store, regional }
    }

    /// Creates a non-default calendar owned by the caller.
    ///
    /// ## Errors
    /// Validation error for an empty name.
    pub async fn create(&self, owner: Uuid, input: NewCalendarInput) -> ServiceResult<Calendar> {
        let name = input.name.trim().to_owned();
        if name.is_empty() {
            return Err(ServiceError::ValidationError(
                "Calendar name is required".to_owned(),
            ));
        }

        let calendar = self
            .store
            .insert_calendar(NewCalendar {
                name,
                description: input.description,
                color: input
                    .color
                    .unwrap_or_else(|| DEFAULT_CALENDAR_COLOR.to_owned()),
                owner,
                is_default: false,
                include_holidays: input.include_holidays,
            })
            .await?;
        self.store.push_owned_calendar(owner, calendar.id).await?;

        tracing::debug!(calendar = %calendar.id, owner = %owner, "Created calendar");
        Ok(calendar)
    }

    /// Owned and shared calendars, plus the regional overlay when the user
    /// has a region and the feed is available. Overlay failures degrade to
    /// the persisted list alone.
    ///
    /// ## Errors
    /// Not found when the account no longer exists.
    pub async fn list_my(&self, user_id: Uuid) -> ServiceResult<Vec<CalendarEntry>> {
        let user = self
            .store
            .find_user(user_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("User not found".to_owned()))?;

        let mut entries: Vec<CalendarEntry> = self
            .store
            .find_user_calendars(user_id)
            .await?
            .into_iter()
            .map(CalendarEntry::Persisted)
            .collect();

        if let Some(region) = user.region.as_deref() {
            match self.regional.get_region_calendar(region, None).await {
                Ok(Some(overlay)) => entries.push(CalendarEntry::Regional(overlay)),
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(region, error = %e, "Skipping regional overlay");
                }
            }
        }

        Ok(entries)
    }

    /// Resolves one calendar reference for the caller.
    ///
    /// Persisted refs are access-checked; regional refs are readable when
    /// the caller's stored region matches the embedded country.
    ///
    /// ## Errors
    /// Access denied on a foreign calendar or region mismatch, not found
    /// when the id resolves to nothing.
    pub async fn get(&self, user_id: Uuid, calendar_ref: &CalendarRef) -> ServiceResult<CalendarEntry> {
        match calendar_ref {
            CalendarRef::Persisted(id) => {
                let calendar = self.require_calendar(*id).await?;
                if !access::can_access(&calendar, user_id) {
                    return Err(ServiceError::AccessDenied(
                        "You do not have access to this calendar".to_owned(),
                    ));
                }
                Ok(CalendarEntry::Persisted(self.populate(calendar).await?))
            }
            CalendarRef::Regional(id) => {
                let country = countries::normalize(&id.country)?;
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
                self.regional
                    .get_region_calendar(&country, id.year)
                    .await?
                    .map(CalendarEntry::Regional)
                    .ok_or_else(|| ServiceError::NotFound("Calendar not found".to_owned()))
            }
        }
    }

    /// Owner-only field merge. `shared_with` and `is_default` are never
    /// touched through this path.
    ///
    /// ## Errors
    /// Access denied for non-owners, not found for a missing calendar.
    pub async fn update(
        &self,
        user_id: Uuid,
        calendar_id: Uuid,
        update: CalendarUpdate,
    ) -> ServiceResult<Calendar> {
        let mut calendar = self.require_calendar(calendar_id).await?;
        if !access::can_write(&calendar, user_id) {
            return Err(ServiceError::AccessDenied(
                "Only the owner can modify this calendar".to_owned(),
            ));
        }

        if let Some(name) = update.name {
            let name = name.trim().to_owned();
            if name.is_empty() {
                return Err(ServiceError::ValidationError(
                    "Calendar name is required".to_owned(),
                ));
            }
            calendar.name = name;
        }
        if let Some(description) = update.description {
            calendar.description = description;
        }
        if let Some(color) = update.color {
            calendar.color = color;
        }
        if let Some(include_holidays) = update.include_holidays {
            calendar.include_holidays = include_holidays;
        }

        Ok(self.store.update_calendar(calendar).await?)
    }

    /// Deletes a calendar, or clears the default one.
    ///
    /// The default calendar document survives with an empty event list; any
    /// other calendar is removed together with its events, the owner's
    /// back-reference and every sharer's `shared_with_me` entry.
    ///
    /// ## Errors
    /// Access denied for non-owners, not found for a missing calendar.
    pub async fn delete(&self, user_id: Uuid, calendar_id: Uuid) -> ServiceResult<DeleteOutcome> {
        let calendar = self.require_calendar(calendar_id).await?;
        if !access::can_write(&calendar, user_id) {
            return Err(ServiceError::AccessDenied(
                "Only the owner can delete this calendar".to_owned(),
            ));
        }

        if calendar.is_default {
            self.store.delete_calendar_events(calendar.id).await?;
            tracing::debug!(calendar = %calendar.id, "Cleared default calendar");
            return Ok(DeleteOutcome::Cleared);
        }

        self.store.delete_calendar_events(calendar.id).await?;
        self.store.delete_calendar(calendar.id).await?;
        self.store
            .pull_owned_calendar(calendar.owner, calendar.id)
            .await?;
        self.store
            .pull_calendars_from_all_users(&[calendar.id])
            .await?;
        tracing::debug!(calendar = %calendar.id, "Deleted calendar");
        Ok(DeleteOutcome::Deleted)
    }

    /// Grants a user read access, recording both directions of the share.
    ///
    /// If the reciprocal `shared_with_me` write fails the sharing entry is
    /// pulled again so the two sides never diverge.
    ///
    /// ## Errors
    /// The precondition errors of [`access::ensure_share_allowed`], plus
    /// not found for a missing calendar or target user.
    pub async fn share(
        &self,
        caller: Uuid,
        calendar_id: Uuid,
        target: Uuid,
    ) -> ServiceResult<Calendar> {
        let calendar = self.require_calendar(calendar_id).await?;
        self.store
            .find_user(target)
            .await?
            .ok_or_else(|| ServiceError::NotFound("User not found".to_owned()))?;
        access::ensure_share_allowed(&calendar, caller, target)?;

        let entry = SharingEntry {
            user: target,
            color: share_color(),
        };
        self.store.push_sharing_entry(calendar.id, entry).await?;
        if let Err(e) = self.store.push_shared_calendar(target, calendar.id).await {
            self.store.pull_sharing_entry(calendar.id, target).await?;
            return Err(e.into());
        }

        tracing::debug!(calendar = %calendar.id, target = %target, "Shared calendar");
        self.require_calendar(calendar_id).await
    }

    /// Revokes a sharing entry, cleaning both directions.
    ///
    /// ## Errors
    /// The precedence errors of [`access::ensure_unshare_allowed`].
    pub async fn unshare(
        &self,
        caller: Uuid,
        calendar_id: Uuid,
        target: Uuid,
    ) -> ServiceResult<()> {
        let calendar = self.require_calendar(calendar_id).await?;
        access::ensure_unshare_allowed(&calendar, caller, target)?;

        self.store.pull_sharing_entry(calendar.id, target).await?;
        self.store.pull_shared_calendar(target, calendar.id).await?;
        tracing::debug!(calendar = %calendar.id, target = %target, "Unshared calendar");
        Ok(())
    }

    /// The owner followed by the sharers, as identity projections.
    ///
    /// ## Errors
    /// Access denied when the caller cannot read the calendar.
    pub async fn members(&self, caller: Uuid, calendar_id: Uuid) -> ServiceResult<Vec<UserSummary>> {
        let calendar = self.require_calendar(calendar_id).await?;
        if !access::can_access(&calendar, caller) {
            return Err(ServiceError::AccessDenied(
                "You do not have access to this calendar".to_owned(),
            ));
        }

        let populated = self.populate(calendar).await?;
        let mut members = vec![populated.owner_identity];
        members.extend(populated.sharer_identities);
        Ok(members)
    }

    async fn require_calendar(&self, id: Uuid) -> ServiceResult<Calendar> {
        self.store
            .find_calendar(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Calendar not found".to_owned()))
    }

    async fn populate(&self, calendar: Calendar) -> ServiceResult<PopulatedCalendar> {
        let owner = self
            .store
            .find_user(calendar.owner)
            .await?
            .ok_or_else(|| ServiceError::NotFound("User not found".to_owned()))?;

        let mut sharer_identities = Vec::with_capacity(calendar.shared_with.len());
        for entry in &calendar.shared_with {
            match self.store.find_user(entry.user).await? {
                Some(user) => sharer_identities.push(UserSummary::from(&user)),
                None => {
                    tracing::warn!(user = %entry.user, "Sharing entry points at a missing user");
                }
            }
        }

        Ok(PopulatedCalendar {
            owner_identity: UserSummary::from(&owner),
            sharer_identities,
            calendar,
        })
    }
}

/// Pseudo-random display color for a new sharing entry.
fn share_color() -> String {
    let bytes = Uuid::new_v4().into_bytes();
    format!("#{:02X}{:02X}{:02X}", bytes[0], bytes[1], bytes[2])
}
