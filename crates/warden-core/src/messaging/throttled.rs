use std::{collections::HashMap, sync::Arc, time::Duration};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};

use crate::{
    domain::{ChatId, MessageRef, ParticipantStatus, SelfIdentity, UserId},
    messaging::{port::MessagingPort, types::ReplyMarkup},
    Result,
};

#[derive(Clone, Copy, Debug)]
pub struct ThrottleConfig {
    /// Minimum spacing between *any* Telegram API calls (global flood control).
    pub global_min_interval: Duration,
    /// Minimum spacing between calls per chat.
    pub per_chat_min_interval: Duration,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            global_min_interval: Duration::from_millis(34), // ~30/sec
            per_chat_min_interval: Duration::from_millis(1050), // ~0.95/sec
        }
    }
}

/// Per-chat limiters beyond this count trigger a sweep of the idle ones.
const PER_CHAT_SWEEP_THRESHOLD: usize = 256;

#[derive(Debug)]
struct IntervalLimiter {
    interval: Duration,
    next: Instant,
}

impl IntervalLimiter {
    fn new(interval: Duration) -> Self {
        Self {
            interval,
            next: Instant::now(),
        }
    }

    /// No reservation pending at `now`; the limiter can be dropped and recreated later.
    fn is_idle_at(&self, now: Instant) -> bool {
        self.next <= now
    }

    /// Reserve the next slot and return how long to wait before using it.
    fn reserve_at(&mut self, now: Instant) -> Duration {
        let start = self.next.max(now);
        self.next = start + self.interval;
        start.saturating_duration_since(now)
    }
}

/// MessagingPort decorator that spaces out outbound calls.
///
/// Group moderation bursts (delete + restrict + notice for several offenders at once)
/// are what usually trips Telegram's 429s; this keeps them under the documented limits.
pub struct ThrottledMessenger {
    inner: Arc<dyn MessagingPort>,
    cfg: ThrottleConfig,
    global: Mutex<IntervalLimiter>,
    per_chat: Mutex<HashMap<ChatId, IntervalLimiter>>,
}

impl ThrottledMessenger {
    pub fn new(inner: Arc<dyn MessagingPort>, cfg: ThrottleConfig) -> Self {
        Self {
            inner,
            cfg,
            global: Mutex::new(IntervalLimiter::new(cfg.global_min_interval)),
            per_chat: Mutex::new(HashMap::new()),
        }
    }

    async fn throttle_chat(&self, chat_id: ChatId) {
        let now = Instant::now();
        let global_wait = self.global.lock().await.reserve_at(now);
        let chat_wait = {
            let mut map = self.per_chat.lock().await;
            let wait = map
                .entry(chat_id)
                .or_insert_with(|| IntervalLimiter::new(self.cfg.per_chat_min_interval))
                .reserve_at(now);
            if map.len() > PER_CHAT_SWEEP_THRESHOLD {
                map.retain(|_, lim| !lim.is_idle_at(now));
            }
            wait
        };

        let wait = global_wait.max(chat_wait);
        if !wait.is_zero() {
            sleep(wait).await;
        }
    }

    async fn throttle_global(&self) {
        let wait = self.global.lock().await.reserve_at(Instant::now());
        if !wait.is_zero() {
            sleep(wait).await;
        }
    }
}

#[async_trait]
impl MessagingPort for ThrottledMessenger {
    async fn send_html_with_markup(
        &self,
        chat_id: ChatId,
        html: &str,
        markup: Option<ReplyMarkup>,
    ) -> Result<MessageRef> {
        self.throttle_chat(chat_id).await;
        self.inner.send_html_with_markup(chat_id, html, markup).await
    }

    async fn delete_message(&self, msg: MessageRef) -> Result<()> {
        self.throttle_chat(msg.chat_id).await;
        self.inner.delete_message(msg).await
    }

    async fn copy_message(
        &self,
        to: ChatId,
        source: MessageRef,
        markup: Option<ReplyMarkup>,
    ) -> Result<MessageRef> {
        self.throttle_chat(to).await;
        self.inner.copy_message(to, source, markup).await
    }

    async fn restrict_participant(
        &self,
        chat_id: ChatId,
        user_id: UserId,
        until: DateTime<Utc>,
    ) -> Result<()> {
        self.throttle_chat(chat_id).await;
        self.inner
            .restrict_participant(chat_id, user_id, until)
            .await
    }

    async fn participant_status(
        &self,
        chat_id: ChatId,
        user_id: UserId,
    ) -> Result<ParticipantStatus> {
        // Reads do not post into the chat; global spacing is enough.
        self.throttle_global().await;
        self.inner.participant_status(chat_id, user_id).await
    }

    async fn self_identity(&self) -> Result<SelfIdentity> {
        self.throttle_global().await;
        self.inner.self_identity().await
    }

    async fn answer_button(&self, callback_id: &str, text: Option<&str>) -> Result<()> {
        // No chat_id available here; apply global throttling only.
        self.throttle_global().await;
        self.inner.answer_button(callback_id, text).await
    }
}
