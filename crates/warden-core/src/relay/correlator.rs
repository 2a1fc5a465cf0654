use std::collections::{BTreeMap, HashMap};

use tokio::sync::Mutex;

use crate::domain::{MessageId, UserId};

#[derive(Debug, Default)]
struct Lru {
    /// relay message id -> (participant, recency stamp)
    entries: HashMap<MessageId, (UserId, u64)>,
    /// recency stamp -> relay message id, oldest first
    order: BTreeMap<u64, MessageId>,
    next_stamp: u64,
}

impl Lru {
    fn put(&mut self, key: MessageId, value: UserId, capacity: usize) {
        let stamp = self.next_stamp;
        self.next_stamp += 1;

        if let Some((_, old_stamp)) = self.entries.insert(key, (value, stamp)) {
            self.order.remove(&old_stamp);
        }
        self.order.insert(stamp, key);

        while self.entries.len() > capacity {
            let Some((_, oldest)) = self.order.pop_first() else {
                break;
            };
            self.entries.remove(&oldest);
        }
    }
}

/// Bounded map from a message the bot wrote into the operator chat to the participant it
/// speaks for.
///
/// `put` refreshes recency and evicts the least recently written entry past capacity;
/// `get` never changes recency. Both go through one lock, so put's
/// move-to-front + evict is atomic.
#[derive(Debug)]
pub struct RelayCorrelator {
    capacity: usize,
    inner: Mutex<Lru>,
}

impl RelayCorrelator {
    pub const DEFAULT_CAPACITY: usize = 1000;

    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            inner: Mutex::new(Lru::default()),
        }
    }

    pub async fn put(&self, relay_message_id: MessageId, participant: UserId) {
        self.inner
            .lock()
            .await
            .put(relay_message_id, participant, self.capacity);
    }

    pub async fn get(&self, relay_message_id: MessageId) -> Option<UserId> {
        self.inner
            .lock()
            .await
            .entries
            .get(&relay_message_id)
            .map(|(user, _)| *user)
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for RelayCorrelator {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}
