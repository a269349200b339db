//! Upstream holiday feed client.
//!
//! Thin reqwest wrapper over the public calendar events API. All failures
//! surface as [`ServiceError::UpstreamUnavailable`]; the adapter decides
//! whether to degrade or propagate.

use std::time::Duration;

use serde::Deserialize;

use crate::error::{ServiceError, ServiceResult};

const LIST_TIMEOUT: Duration = Duration::from_secs(10);
const SINGLE_TIMEOUT: Duration = Duration::from_secs(5);
const MAX_RESULTS: u32 = 250;

/// One event as the upstream feed reports it. All-day holidays carry `date`,
/// timed ones `date_time`.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedEvent {
    pub id: String,
    #[serde(default)]
    pub summary: Option<String>,
    pub start: FeedDate,
    pub end: FeedDate,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedDate {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default, rename = "dateTime")]
    pub date_time: Option<String>,
}

impl FeedDate {
    #[must_use]
    pub fn is_all_day(&self) -> bool {
        self.date.is_some()
    }

    #[must_use]
    pub fn value(&self) -> Option<&str> {
        self.date.as_deref().or(self.date_time.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct FeedEventList {
    #[serde(default)]
    items: Vec<FeedEvent>,
}

pub struct FeedClient {
    client: reqwest::Client,
    base_url: String,
}

impl FeedClient {
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }

    /// Fetches one calendar year of events from the upstream feed.
    ///
    /// ## Errors
    /// Returns `UpstreamUnavailable` on network, timeout or decode failure.
    pub async fn list_year(
        &self,
        feed_calendar_id: &str,
        api_key: &str,
        year: i32,
    ) -> ServiceResult<Vec<FeedEvent>> {
        let url = format!(
            "{}/{}/events",
            self.base_url,
            urlencoding::encode(feed_calendar_id)
        );
        let response = self
            .client
            .get(&url)
            .timeout(LIST_TIMEOUT)
            .query(&[
                ("key", api_key),
                ("timeMin", &format!("{year}-01-01T00:00:00Z")),
                ("timeMax", &format!("{year}-12-31T23:59:59Z")),
                ("orderBy", "startTime"),
                ("singleEvents", "true"),
                ("maxResults", &MAX_RESULTS.to_string()),
            ])
            .send()
            .await
            .map_err(|e| ServiceError::UpstreamUnavailable(e.to_string()))?
            .error_for_status()
            .map_err(|e| ServiceError::UpstreamUnavailable(e.to_string()))?;

        let list: FeedEventList = response
            .json()
            .await
            .map_err(|e| ServiceError::UpstreamUnavailable(e.to_string()))?;
        Ok(list.items)
    }

    /// Fetches a single event by its upstream id.
    ///
    /// ## Errors
    /// Returns `UpstreamUnavailable` on network, timeout or decode failure.
    pub async fn fetch_event(
        &self,
        feed_calendar_id: &str,
        api_key: &str,
        event_id: &str,
    ) -> ServiceResult<FeedEvent> {
        let url = format!(
            "{}/{}/events/{}",
            self.base_url,
            urlencoding::encode(feed_calendar_id),
            urlencoding::encode(event_id)
        );
        self.client
            .get(&url)
            .timeout(SINGLE_TIMEOUT)
            .query(&[("key", api_key)])
            .send()
            .await
            .map_err(|e| ServiceError::UpstreamUnavailable(e.to_string()))?
            .error_for_status()
            .map_err(|e| ServiceError::UpstreamUnavailable(e.to_string()))?
            .json()
            .await
            .map_err(|e| ServiceError::UpstreamUnavailable(e.to_string()))
    }
}
