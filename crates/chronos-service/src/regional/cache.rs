//! Process-local TTL cache for synthesized regional calendars.
//!
//! Constructed once per process; entries expire lazily on read, there is no
//! sweeper. In a multi-instance deployment each replica cold-starts its own
//! cache; externalize to a shared store if cross-instance consistency is
//! ever needed.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use super::VirtualCalendar;

struct CacheEntry {
    value: VirtualCalendar,
    expires_at: Instant,
}

pub struct TtlCache {
    ttl: Duration,
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl TtlCache {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the cached calendar, dropping it first if it has expired.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<VirtualCalendar> {
        let mut entries = self.entries.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        match entries.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    pub fn set(&self, key: &str, value: VirtualCalendar) {
        let expires_at = Instant::now() + self.ttl;
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(key.to_owned(), CacheEntry { value, expires_at });
    }

    pub fn clear(&self) {
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clear();
    }
}
