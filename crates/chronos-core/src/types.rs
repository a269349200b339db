use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::{REGIONAL_CALENDAR_PREFIX, REGIONAL_EVENT_PREFIX};
use crate::error::{CoreError, CoreResult};

/// Event kind without database dependencies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Arrangement,
    Reminder,
    Task,
}

impl EventKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Arrangement => "arrangement",
            Self::Reminder => "reminder",
            Self::Task => "task",
        }
    }

    /// Arrangements and reminders are scheduled, so they need a start time.
    #[must_use]
    pub const fn requires_start(self) -> bool {
        matches!(self, Self::Arrangement | Self::Reminder)
    }

    /// Only arrangements span an interval and need an end time.
    #[must_use]
    pub const fn requires_end(self) -> bool {
        matches!(self, Self::Arrangement)
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recurrence tag carried by templates and their materialized occurrences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatKind {
    None,
    Daily,
    Weekly,
    Monthly,
}

impl RepeatKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }
}

impl std::fmt::Display for RepeatKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Pending,
    Done,
    Cancelled,
}

impl EventStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Done => "done",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for EventStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifier of a synthesized regional calendar: `google_{country}_{year}`.
///
/// The year component is optional on parse; the original id format allowed a
/// bare `google_{country}` which resolves against the current year.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RegionalCalendarId {
    pub country: String,
    pub year: Option<i32>,
}

impl RegionalCalendarId {
    #[must_use]
    pub fn new(country: &str, year: i32) -> Self {
        Self {
            country: country.to_owned(),
            year: Some(year),
        }
    }
}

impl std::fmt::Display for RegionalCalendarId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.year {
            Some(year) => write!(f, "{REGIONAL_CALENDAR_PREFIX}{}_{year}", self.country),
            None => write!(f, "{REGIONAL_CALENDAR_PREFIX}{}", self.country),
        }
    }
}

/// Identifier of a synthesized regional event:
/// `system_holiday_{country}_{feed event id}`.
///
/// The feed event id may itself contain underscores (a `_{year}` suffix is
/// appended for second-year batches), so it is everything after the third
/// separator.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RegionalEventId {
    pub country: String,
    pub source_id: String,
}

impl std::fmt::Display for RegionalEventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{REGIONAL_EVENT_PREFIX}{}_{}", self.country, self.source_id)
    }
}

/// A calendar reference as it arrives on the wire, dispatched once at the
/// API entrypoint: either a persisted document id or a regional synthetic id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CalendarRef {
    Persisted(Uuid),
    Regional(RegionalCalendarId),
}

impl CalendarRef {
    /// Parses a path or body id into a calendar reference.
    ///
    /// ## Errors
    /// Returns a validation error if the id is neither a well-formed regional
    /// id nor a UUID.
    pub fn parse(id: &str) -> CoreResult<Self> {
        if let Some(rest) = id.strip_prefix(REGIONAL_CALENDAR_PREFIX) {
            let mut parts = rest.split('_');
            let country = parts
                .next()
                .filter(|c| !c.is_empty())
                .ok_or_else(|| {
                    CoreError::ValidationError("Invalid regional calendar ID".to_owned())
                })?
                .to_owned();
            let year = parts.next().and_then(|y| y.parse::<i32>().ok());
            return Ok(Self::Regional(RegionalCalendarId { country, year }));
        }

        Uuid::parse_str(id)
            .map(Self::Persisted)
            .map_err(|_| CoreError::ValidationError(format!("Invalid calendar id: {id}")))
    }

    #[must_use]
    pub const fn is_regional(&self) -> bool {
        matches!(self, Self::Regional(_))
    }
}

/// An event reference as it arrives on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventRef {
    Persisted(Uuid),
    Regional(RegionalEventId),
}

impl EventRef {
    /// Parses a path or body id into an event reference.
    ///
    /// ## Errors
    /// Returns a validation error for a malformed regional id (fewer than
    /// four `_`-separated parts) or a non-UUID persisted id.
    pub fn parse(id: &str) -> CoreResult<Self> {
        if id.starts_with(REGIONAL_EVENT_PREFIX) {
            let parts: Vec<&str> = id.split('_').collect();
            if parts.len() < 4 || parts[2].is_empty() || parts[3].is_empty() {
                return Err(CoreError::ValidationError(
                    "Invalid regional event ID format".to_owned(),
                ));
            }
            return Ok(Self::Regional(RegionalEventId {
                country: parts[2].to_owned(),
                source_id: parts[3..].join("_"),
            }));
        }

        Uuid::parse_str(id)
            .map(Self::Persisted)
            .map_err(|_| CoreError::ValidationError(format!("Invalid event id: {id}")))
    }

    #[must_use]
    pub const fn is_regional(&self) -> bool {
        matches!(self, Self::Regional(_))
    }
}

/// Prefix test kept for call sites that only need recognition, not parsing.
#[must_use]
pub fn is_regional_calendar_id(id: &str) -> bool {
    id.starts_with(REGIONAL_CALENDAR_PREFIX)
}

#[must_use]
pub fn is_regional_event_id(id: &str) -> bool {
    id.starts_with(REGIONAL_EVENT_PREFIX)
}
