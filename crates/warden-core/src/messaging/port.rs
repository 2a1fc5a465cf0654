use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{
    domain::{ChatId, MessageRef, ParticipantStatus, SelfIdentity, UserId},
    messaging::types::ReplyMarkup,
    Result,
};

/// Outbound operations the bot needs from the chat platform.
///
/// Telegram is the only implementation today; the moderation and relay services only ever
/// talk to this trait, which keeps them testable without a network.
#[async_trait]
pub trait MessagingPort: Send + Sync {
    async fn send_html_with_markup(
        &self,
        chat_id: ChatId,
        html: &str,
        markup: Option<ReplyMarkup>,
    ) -> Result<MessageRef>;

    async fn send_html(&self, chat_id: ChatId, html: &str) -> Result<MessageRef> {
        self.send_html_with_markup(chat_id, html, None).await
    }

    async fn delete_message(&self, msg: MessageRef) -> Result<()>;

    /// Copy `source` into `to` without the "forwarded from" header.
    async fn copy_message(
        &self,
        to: ChatId,
        source: MessageRef,
        markup: Option<ReplyMarkup>,
    ) -> Result<MessageRef>;

    /// Deny `user_id` the right to send messages in `chat_id` until `until`.
    async fn restrict_participant(
        &self,
        chat_id: ChatId,
        user_id: UserId,
        until: DateTime<Utc>,
    ) -> Result<()>;

    async fn participant_status(
        &self,
        chat_id: ChatId,
        user_id: UserId,
    ) -> Result<ParticipantStatus>;

    async fn self_identity(&self) -> Result<SelfIdentity>;

    async fn answer_button(&self, callback_id: &str, text: Option<&str>) -> Result<()>;
}
