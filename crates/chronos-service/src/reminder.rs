//! Periodic reminder scan.
//!
//! Delivery itself (mail, push) is an external collaborator; the scan finds
//! what is due and logs it. Two windows per tick: events whose start is ten
//! minutes out, and reminder-kind events starting right now. The tolerance
//! absorbs poll jitter; an event missed by a crashed tick is skipped, not
//! replayed.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};

use chronos_core::types::EventKind;
use chronos_db::model::Event;
use chronos_db::store::DataStore;

use crate::error::ServiceResult;

pub struct ReminderScanner {
    store: Arc<dyn DataStore>,
}

impl ReminderScanner {
    #[must_use]
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        Self { store }
    }

    /// One scan tick. Returns the events that triggered a delivery so the
    /// caller (and tests) can observe what happened.
    ///
    /// ## Errors
    /// Database errors only.
    pub async fn scan(&self, now: DateTime<Utc>) -> ServiceResult<Vec<Event>> {
        let lead = Duration::minutes(10);
        let tolerance = Duration::seconds(30);
        let mut delivered = Vec::new();

        let upcoming = self
            .store
            .find_due_events(now + lead - tolerance, now + lead + tolerance)
            .await?;
        for event in upcoming {
            tracing::info!(
                event = %event.id,
                user = %event.creator,
                title = %event.title,
                "Event starts in ten minutes"
            );
            delivered.push(event);
        }

        let due_now = self
            .store
            .find_due_events(now - tolerance, now + tolerance)
            .await?;
        for event in due_now {
            if event.kind != EventKind::Reminder {
                continue;
            }
            tracing::info!(
                event = %event.id,
                user = %event.creator,
                title = %event.title,
                "Reminder is due"
            );
            delivered.push(event);
        }

        Ok(delivered)
    }

    /// Poll loop spawned at startup. Never returns; scan failures are
    /// logged and the loop keeps going.
    pub async fn run(self: Arc<Self>, poll_interval_secs: u64) {
        let mut ticker = tokio::time::interval(StdDuration::from_secs(poll_interval_secs.max(1)));
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            if let Err(e) = self.scan(Utc::now()).await {
                tracing::error!(error = %e, "Reminder scan failed");
            }
        }
    }
}
