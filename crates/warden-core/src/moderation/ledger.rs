use std::{collections::HashMap, time::Duration};

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::domain::UserId;

/// What happens to a participant after a confirmed violation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Consequence {
    /// First offense: the message is removed and a warning is shown.
    Warn,
    /// Repeat offense: no sending until `until`.
    Mute { until: DateTime<Utc> },
}

/// Map a post-increment offense count to its consequence.
///
/// Every repeat offense gets a fresh window starting at `now`; windows never stack.
pub fn consequence_for(count: u32, now: DateTime<Utc>, mute_for: Duration) -> Consequence {
    if count <= 1 {
        return Consequence::Warn;
    }
    let window =
        chrono::Duration::from_std(mute_for).unwrap_or_else(|_| chrono::Duration::hours(24));
    Consequence::Mute { until: now + window }
}

/// Per-participant offense counters for the lifetime of the process.
#[derive(Debug, Default)]
pub struct OffenseLedger {
    counts: Mutex<HashMap<UserId, u32>>,
}

impl OffenseLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one confirmed violation and return the new count.
    pub async fn record_offense(&self, user_id: UserId) -> u32 {
        let mut counts = self.counts.lock().await;
        let count = counts.entry(user_id).or_insert(0);
        *count = count.saturating_add(1);
        *count
    }

    /// Current count; 0 means no recorded offense.
    pub async fn count(&self, user_id: UserId) -> u32 {
        self.counts
            .lock()
            .await
            .get(&user_id)
            .copied()
            .unwrap_or(0)
    }
}
