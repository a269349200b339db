/// Route component constants shared across crates
pub const API_ROUTE_COMPONENT: &str = "api";

/// Synthetic-id prefix for regional (virtual) calendars, e.g. `google_ua_2025`.
pub const REGIONAL_CALENDAR_PREFIX: &str = "google_";

/// Synthetic-id prefix for regional (virtual) events,
/// e.g. `system_holiday_ua_<feed event id>`.
pub const REGIONAL_EVENT_PREFIX: &str = "system_holiday_";

/// Session cookie name checked by the authentication middleware.
pub const SESSION_COOKIE: &str = "chronos_session";

/// Default display color for calendars created without one.
pub const DEFAULT_CALENDAR_COLOR: &str = "#4E1E4A";

/// Default display color for events created without one.
pub const DEFAULT_EVENT_COLOR: &str = "#C9ABC3";

/// Display color of synthesized holiday calendars and events.
pub const HOLIDAY_COLOR: &str = "#FF6B6B";

/// Name given to the default calendar auto-created at registration.
pub const DEFAULT_CALENDAR_NAME: &str = "Main";

/// Fixed error messages for mutation attempts against regional ids.
pub const REGIONAL_CALENDAR_IMMUTABLE: &str = "cannot modify regional calendar";
pub const REGIONAL_EVENT_IMMUTABLE: &str = "cannot modify regional event";
