//! Transient chat notices (welcome, warning, mute) that remove themselves after a delay.

use std::{sync::Arc, time::Duration};

use tokio::task::JoinHandle;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use crate::{
    domain::{ChatId, MessageRef},
    formatting::log_detail,
    messaging::{port::MessagingPort, types::ReplyMarkup},
    Result,
};

/// Handle to one pending deletion.
pub struct ScheduledDeletion {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl ScheduledDeletion {
    /// Keep the notice: the deletion will not run.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Wait until the deletion ran or was abandoned.
    pub async fn finished(self) {
        let _ = self.handle.await;
    }
}

/// Schedules best-effort deletion of bot notices without blocking the caller.
///
/// Each deletion runs as its own detached task and never holds a lock while waiting.
/// `shutdown()` abandons every deletion that has not fired yet.
#[derive(Clone)]
pub struct NoticeScheduler {
    messenger: Arc<dyn MessagingPort>,
    shutdown: CancellationToken,
}

impl NoticeScheduler {
    pub fn new(messenger: Arc<dyn MessagingPort>) -> Self {
        Self {
            messenger,
            shutdown: CancellationToken::new(),
        }
    }

    /// Send a notice and schedule its deletion after `ttl`.
    pub async fn send_ephemeral(
        &self,
        chat_id: ChatId,
        html: &str,
        markup: Option<ReplyMarkup>,
        ttl: Duration,
    ) -> Result<MessageRef> {
        let sent = self
            .messenger
            .send_html_with_markup(chat_id, html, markup)
            .await?;
        self.delete_after(sent, ttl);
        Ok(sent)
    }

    pub fn delete_after(&self, msg: MessageRef, delay: Duration) -> ScheduledDeletion {
        let cancel = self.shutdown.child_token();
        let messenger = self.messenger.clone();
        let token = cancel.clone();

        let handle = tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {
                    tracing::debug!(
                        event = "delete_abandoned",
                        chat_id = msg.chat_id.0,
                        message_id = msg.message_id.0,
                    );
                }
                _ = sleep(delay) => {
                    if let Err(e) = messenger.delete_message(msg).await {
                        tracing::debug!(
                            event = "delete_skip",
                            op = "delete_message",
                            chat_id = msg.chat_id.0,
                            message_id = msg.message_id.0,
                            detail = %log_detail(&e),
                        );
                    }
                }
            }
        });

        ScheduledDeletion { cancel, handle }
    }

    /// Abandon all pending deletions (process shutdown).
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{domain::MessageId, messaging::fake::FakeMessenger};

    #[tokio::test]
    async fn deletes_after_delay_without_blocking_sender() {
        let fake = Arc::new(FakeMessenger::new());
        let notices = NoticeScheduler::new(fake.clone());

        let sent = notices
            .send_ephemeral(ChatId(-1), "bye soon", None, Duration::from_millis(30))
            .await
            .unwrap();

        // Returned immediately; nothing deleted yet.
        assert!(fake.deleted().is_empty());

        sleep(Duration::from_millis(150)).await;
        assert_eq!(fake.deleted(), vec![sent]);
    }

    #[tokio::test]
    async fn cancelled_deletion_never_runs() {
        let fake = Arc::new(FakeMessenger::new());
        let notices = NoticeScheduler::new(fake.clone());

        let msg = MessageRef::new(ChatId(-1), MessageId(5));
        let pending = notices.delete_after(msg, Duration::from_millis(30));
        pending.cancel();
        pending.finished().await;

        assert!(fake.deleted().is_empty());
    }

    #[tokio::test]
    async fn shutdown_abandons_all_pending_deletions() {
        let fake = Arc::new(FakeMessenger::new());
        let notices = NoticeScheduler::new(fake.clone());

        let minute = Duration::from_secs(60);
        let a = notices.delete_after(MessageRef::new(ChatId(-1), MessageId(1)), minute);
        let b = notices.delete_after(MessageRef::new(ChatId(-2), MessageId(2)), minute);
        notices.shutdown();
        a.finished().await;
        b.finished().await;

        assert!(fake.deleted().is_empty());
    }

    #[tokio::test]
    async fn failed_deletion_is_swallowed() {
        let fake = Arc::new(FakeMessenger::new());
        fake.fail("delete");
        let notices = NoticeScheduler::new(fake.clone());

        let pending = notices.delete_after(
            MessageRef::new(ChatId(-1), MessageId(1)),
            Duration::from_millis(1),
        );
        pending.finished().await;

        assert!(fake.deleted().is_empty());
    }
}
