//! In-memory directory of users seen since startup
//!
//! Injected into the handlers that need it instead of living in a global. It resets on
//! restart; the activity log is the durable record.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::time::Instant;

use crate::core::update::Sender;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnownUser {
    pub id: i64,
    pub name: String,
    pub first_seen: DateTime<Utc>,
}

pub struct UserDirectory {
    users: DashMap<i64, KnownUser>,
    started_at: Instant,
}

impl UserDirectory {
    pub fn new() -> Self {
        Self {
            users: DashMap::new(),
            started_at: Instant::now(),
        }
    }

    /// Records the sender; returns `true` if this is the first time we see them.
    pub fn remember(&self, sender: &Sender) -> bool {
        let mut inserted = false;
        self.users.entry(sender.id).or_insert_with(|| {
            inserted = true;
            KnownUser {
                id: sender.id,
                name: sender.log_name().to_string(),
                first_seen: Utc::now(),
            }
        });
        inserted
    }

    pub fn get(&self, id: i64) -> Option<KnownUser> {
        self.users.get(&id).map(|entry| entry.value().clone())
    }

    pub fn count(&self) -> usize {
        self.users.len()
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}

impl Default for UserDirectory {
    fn default() -> Self {
        Self::new()
    }
}
