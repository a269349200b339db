//! In-process session tokens.
//!
//! Sessions are opaque random tokens mapped to a user id with a fixed TTL.
//! Expired sessions are dropped lazily when resolved; logout revokes
//! eagerly. Restarting the process invalidates every session, which is the
//! intended behavior for a single-instance deployment.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

struct Session {
    user: Uuid,
    expires_at: DateTime<Utc>,
}

pub struct SessionStore {
    ttl: Duration,
    sessions: Mutex<HashMap<String, Session>>,
}

impl SessionStore {
    #[must_use]
    pub fn new(ttl_hours: u64) -> Self {
        Self {
            ttl: Duration::hours(i64::try_from(ttl_hours).unwrap_or(24)),
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Issues a fresh session token for a user.
    #[must_use]
    pub fn create(&self, user: Uuid) -> String {
        let token = format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple());
        let session = Session {
            user,
            expires_at: Utc::now() + self.ttl,
        };
        self.sessions
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(token.clone(), session);
        token
    }

    /// Resolves a token to its user, dropping the session if it has expired.
    #[must_use]
    pub fn resolve(&self, token: &str) -> Option<Uuid> {
        let mut sessions = self
            .sessions
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        match sessions.get(token) {
            Some(session) if session.expires_at > Utc::now() => Some(session.user),
            Some(_) => {
                sessions.remove(token);
                None
            }
            None => None,
        }
    }

    pub fn revoke(&self, token: &str) {
        self.sessions
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .remove(token);
    }

    /// Drops every session belonging to a user, for account deletion.
    pub fn revoke_user(&self, user: Uuid) {
        self.sessions
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .retain(|_, session| session.user != user);
    }
}
