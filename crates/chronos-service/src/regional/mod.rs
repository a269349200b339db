//! Regional (virtual) calendar adapter.
//!
//! Synthesizes read-only holiday calendars from an upstream feed and merges
//! them into calendar listings. Nothing here is ever persisted: virtual
//! calendars and events exist only in the TTL cache and are recognized by
//! their synthetic id prefixes. Every mutation entrypoint in the API rejects
//! those ids before any repository call.

pub mod cache;
pub mod countries;
pub mod feed;

use chrono::{Datelike, Utc};
use serde::Serialize;
use std::time::Duration;

use chronos_core::config::RegionalConfig;
use chronos_core::constants::HOLIDAY_COLOR;
use chronos_core::types::{RegionalCalendarId, RegionalEventId};

use crate::error::{ServiceError, ServiceResult};
use cache::TtlCache;
use feed::{FeedClient, FeedEvent};

/// A synthesized holiday event. Dates are passed through as the feed
/// reports them: a bare date for all-day holidays, RFC 3339 otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualEvent {
    pub id: String,
    pub title: String,
    pub description: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub all_day: bool,
    #[serde(rename = "type")]
    pub kind: String,
    pub color: String,
    pub creator: Option<uuid::Uuid>,
    pub calendar: String,
    pub invited: Vec<uuid::Uuid>,
    pub status: String,
    pub repeat: String,
}

/// A synthesized holiday calendar satisfying the same read shape as a
/// persisted calendar, with `is_regional` marking it immutable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualCalendar {
    pub id: String,
    pub name: String,
    pub description: String,
    pub owner: Option<uuid::Uuid>,
    pub is_default: bool,
    pub is_regional: bool,
    pub color: String,
    pub events: Vec<VirtualEvent>,
    pub shared_with: Vec<uuid::Uuid>,
}

pub struct RegionalCalendarService {
    cache: TtlCache,
    client: FeedClient,
    api_key: Option<String>,
}

impl RegionalCalendarService {
    #[must_use]
    pub fn new(config: &RegionalConfig) -> Self {
        Self {
            cache: TtlCache::new(Duration::from_secs(config.cache_ttl_hours * 3600)),
            client: FeedClient::new(&config.base_url),
            api_key: config.api_key.clone(),
        }
    }

    /// Returns the virtual holiday calendar for a country and year, serving
    /// from cache within the TTL. A cache miss fetches the requested year
    /// and the next one in two upstream calls and caches the concatenation
    /// under the requested year's key.
    ///
    /// Missing credentials and upstream failures degrade to `Ok(None)` so
    /// listings can omit the overlay instead of failing.
    ///
    /// ## Errors
    /// Returns a validation error for an empty or unsupported country code.
    pub async fn get_region_calendar(
        &self,
        country_code: &str,
        year: Option<i32>,
    ) -> ServiceResult<Option<VirtualCalendar>> {
        let normalized = countries::normalize(country_code)?;
        let target_year = year.unwrap_or_else(|| Utc::now().year());
        let cache_key = format!("{normalized}_{target_year}_extended");

        if let Some(cached) = self.cache.get(&cache_key) {
            tracing::debug!(country = %normalized, year = target_year, "Serving holidays from cache");
            return Ok(Some(cached));
        }

        let Some(api_key) = self.api_key.as_deref() else {
            tracing::warn!("Holiday feed API key is not configured - regional calendars disabled");
            return Ok(None);
        };

        let feed_calendar_id = countries::feed_calendar_id(&normalized)?;

        tracing::debug!(
            country = %normalized,
            years = ?(target_year, target_year + 1),
            "Fetching holidays from upstream"
        );

        let calendar_id = RegionalCalendarId::new(&normalized, target_year).to_string();

        let first_year = self
            .client
            .list_year(&feed_calendar_id, api_key, target_year)
            .await;
        let second_year = match &first_year {
            Ok(_) => {
                self.client
                    .list_year(&feed_calendar_id, api_key, target_year + 1)
                    .await
            }
            Err(_) => Ok(Vec::new()),
        };

        let (first_year, second_year) = match (first_year, second_year) {
            (Ok(first), Ok(second)) => (first, second),
            (Err(e), _) | (_, Err(e)) => {
                tracing::error!(country = %normalized, error = %e, "Failed to fetch regional calendar");
                return Ok(None);
            }
        };

        let mut events: Vec<VirtualEvent> = first_year
            .iter()
            .map(|item| synthesize_event(item, &normalized, &calendar_id, None))
            .collect();
        events.extend(
            second_year
                .iter()
                .map(|item| synthesize_event(item, &normalized, &calendar_id, Some(target_year + 1))),
        );

        let display = countries::display_name(&normalized);
        let calendar = VirtualCalendar {
            id: calendar_id,
            name: format!("{display} Holidays"),
            description: format!(
                "Public holidays for {display} ({target_year}-{})",
                target_year + 1
            ),
            owner: None,
            is_default: false,
            is_regional: true,
            color: HOLIDAY_COLOR.to_owned(),
            events,
            shared_with: Vec::new(),
        };

        tracing::debug!(
            country = %normalized,
            year = target_year,
            holidays = calendar.events.len(),
            "Cached regional calendar"
        );
        self.cache.set(&cache_key, calendar.clone());

        Ok(Some(calendar))
    }

    /// Events of a regional calendar id, empty when the overlay is
    /// unavailable.
    ///
    /// ## Errors
    /// Returns a validation error for an unsupported country code.
    pub async fn get_calendar_events(
        &self,
        id: &RegionalCalendarId,
    ) -> ServiceResult<Vec<VirtualEvent>> {
        let calendar = self.get_region_calendar(&id.country, id.year).await?;
        Ok(calendar.map(|cal| cal.events).unwrap_or_default())
    }

    /// Resolves a regional event id, preferring cached calendars for the
    /// current year and its neighbors before a direct upstream fetch.
    ///
    /// ## Errors
    /// Returns a validation error for an unsupported country and not-found
    /// when the event cannot be resolved anywhere.
    pub async fn get_event_by_id(&self, id: &RegionalEventId) -> ServiceResult<VirtualEvent> {
        let event_id = id.to_string();
        let current_year = Utc::now().year();

        for year in [current_year, current_year - 1, current_year + 1] {
            if let Some(calendar) = self.get_region_calendar(&id.country, Some(year)).await? {
                if let Some(event) = calendar.events.iter().find(|e| e.id == event_id) {
                    return Ok(event.clone());
                }
            }
        }

        let normalized = countries::normalize(&id.country)?;
        let feed_calendar_id = countries::feed_calendar_id(&normalized)?;
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(ServiceError::NotFound(
                "Event not found in regional calendar".to_owned(),
            ));
        };

        match self
            .client
            .fetch_event(&feed_calendar_id, api_key, &id.source_id)
            .await
        {
            Ok(item) => {
                let calendar_id = RegionalCalendarId::new(&normalized, current_year).to_string();
                Ok(synthesize_event(&item, &normalized, &calendar_id, None))
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to fetch regional event");
                Err(ServiceError::NotFound(
                    "Event not found in regional calendar".to_owned(),
                ))
            }
        }
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
        tracing::info!("Regional calendar cache cleared");
    }
}

/// Normalizes one feed item into a virtual event. Second-year batches get a
/// year suffix on the synthetic id to avoid collisions with the first year.
fn synthesize_event(
    item: &FeedEvent,
    country: &str,
    calendar_id: &str,
    year_suffix: Option<i32>,
) -> VirtualEvent {
    let source_id = match year_suffix {
        Some(year) => format!("{}_{year}", item.id),
        None => item.id.clone(),
    };
    let id = RegionalEventId {
        country: country.to_owned(),
        source_id,
    };

    VirtualEvent {
        id: id.to_string(),
        title: item.summary.clone().unwrap_or_default(),
        description: "Public Holiday".to_owned(),
        start_date: item.start.value().map(ToOwned::to_owned),
        end_date: item.end.value().map(ToOwned::to_owned),
        all_day: item.start.is_all_day(),
        kind: "holiday".to_owned(),
        color: HOLIDAY_COLOR.to_owned(),
        creator: None,
        calendar: calendar_id.to_owned(),
        invited: Vec::new(),
        status: "done".to_owned(),
        repeat: "none".to_owned(),
    }
}
