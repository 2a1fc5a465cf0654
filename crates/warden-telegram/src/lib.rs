//! Telegram adapter (teloxide).
//!
//! This crate implements the `warden-core` MessagingPort over the Telegram Bot API and
//! turns incoming updates into the core's inbound types.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use teloxide::{
    prelude::*,
    types::{
        ChatMemberKind, ChatPermissions, ForceReply, InlineKeyboardButton, InlineKeyboardMarkup,
        ParseMode,
    },
};

use tokio::time::sleep;

pub mod convert;
pub mod handlers;
pub mod router;

use warden_core::{
    domain::{ChatId, MessageId, MessageRef, ParticipantStatus, SelfIdentity, UserId},
    errors::Error,
    messaging::{
        port::MessagingPort,
        types::{InlineButton, InlineKeyboard, ReplyMarkup},
    },
    Result,
};

#[derive(Clone)]
pub struct TelegramMessenger {
    bot: Bot,
}

impl TelegramMessenger {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    fn tg_chat(chat_id: ChatId) -> teloxide::types::ChatId {
        teloxide::types::ChatId(chat_id.0)
    }

    fn tg_msg_id(message_id: MessageId) -> teloxide::types::MessageId {
        teloxide::types::MessageId(message_id.0)
    }

    fn tg_user(user_id: UserId) -> teloxide::types::UserId {
        teloxide::types::UserId(user_id.0 as u64)
    }

    fn tg_markup(markup: ReplyMarkup) -> Result<teloxide::types::ReplyMarkup> {
        match markup {
            ReplyMarkup::Inline(keyboard) => Ok(Self::tg_keyboard(keyboard)?.into()),
            ReplyMarkup::ForceReply { placeholder } => {
                let mut force = ForceReply::new();
                force.input_field_placeholder = placeholder;
                Ok(force.into())
            }
        }
    }

    fn tg_keyboard(keyboard: InlineKeyboard) -> Result<InlineKeyboardMarkup> {
        let mut rows = Vec::with_capacity(keyboard.buttons.len());
        for button in keyboard.buttons {
            let tg = match button {
                InlineButton::Callback { label, data } => {
                    InlineKeyboardButton::callback(label, data)
                }
                InlineButton::Url { label, url } => {
                    let url = reqwest::Url::parse(&url)
                        .map_err(|e| Error::External(format!("invalid button url {url}: {e}")))?;
                    InlineKeyboardButton::url(label, url)
                }
            };
            rows.push(vec![tg]);
        }
        Ok(InlineKeyboardMarkup::new(rows))
    }

    async fn with_retry<T, Fut>(&self, op: &'static str, mut call: impl FnMut() -> Fut) -> Result<T>
    where
        Fut: std::future::IntoFuture<Output = std::result::Result<T, teloxide::RequestError>>,
        Fut::IntoFuture: Send,
    {
        const MAX_RETRIES: usize = 1;
        let mut attempts = 0usize;
        loop {
            match call().await {
                Ok(v) => return Ok(v),
                Err(e) => match e {
                    teloxide::RequestError::RetryAfter(d) if attempts < MAX_RETRIES => {
                        attempts += 1;
                        tracing::warn!(
                            event = "retry_after",
                            op = op,
                            wait_ms = d.as_millis() as u64,
                        );
                        sleep(d).await;
                        continue;
                    }
                    other => return Err(Error::transport(op, other.to_string())),
                },
            }
        }
    }
}

#[async_trait]
impl MessagingPort for TelegramMessenger {
    async fn send_html_with_markup(
        &self,
        chat_id: ChatId,
        html: &str,
        markup: Option<ReplyMarkup>,
    ) -> Result<MessageRef> {
        let markup = markup.map(Self::tg_markup).transpose()?;

        let msg = self
            .with_retry("send_message", || {
                let req = self
                    .bot
                    .send_message(Self::tg_chat(chat_id), html.to_string())
                    .parse_mode(ParseMode::Html)
                    .disable_web_page_preview(true);
                match markup.clone() {
                    Some(m) => req.reply_markup(m),
                    None => req,
                }
            })
            .await?;

        Ok(MessageRef::new(chat_id, MessageId(msg.id.0)))
    }

    async fn delete_message(&self, msg: MessageRef) -> Result<()> {
        self.with_retry("delete_message", || {
            self.bot
                .delete_message(Self::tg_chat(msg.chat_id), Self::tg_msg_id(msg.message_id))
        })
        .await?;
        Ok(())
    }

    async fn copy_message(
        &self,
        to: ChatId,
        source: MessageRef,
        markup: Option<ReplyMarkup>,
    ) -> Result<MessageRef> {
        let markup = markup.map(Self::tg_markup).transpose()?;

        let id = self
            .with_retry("copy_message", || {
                let req = self.bot.copy_message(
                    Self::tg_chat(to),
                    Self::tg_chat(source.chat_id),
                    Self::tg_msg_id(source.message_id),
                );
                match markup.clone() {
                    Some(m) => req.reply_markup(m),
                    None => req,
                }
            })
            .await?;

        Ok(MessageRef::new(to, MessageId(id.0)))
    }

    async fn restrict_participant(
        &self,
        chat_id: ChatId,
        user_id: UserId,
        until: DateTime<Utc>,
    ) -> Result<()> {
        self.with_retry("restrict_chat_member", || {
            self.bot
                .restrict_chat_member(
                    Self::tg_chat(chat_id),
                    Self::tg_user(user_id),
                    ChatPermissions::empty(),
                )
                .until_date(until)
        })
        .await?;
        Ok(())
    }

    async fn participant_status(
        &self,
        chat_id: ChatId,
        user_id: UserId,
    ) -> Result<ParticipantStatus> {
        let member = self
            .with_retry("get_chat_member", || {
                self.bot
                    .get_chat_member(Self::tg_chat(chat_id), Self::tg_user(user_id))
            })
            .await?;

        Ok(match member.kind {
            ChatMemberKind::Owner(_) => ParticipantStatus::Creator,
            ChatMemberKind::Administrator(_) => ParticipantStatus::Administrator,
            _ => ParticipantStatus::Member,
        })
    }

    async fn self_identity(&self) -> Result<SelfIdentity> {
        let me = self.with_retry("get_me", || self.bot.get_me()).await?;
        Ok(SelfIdentity {
            id: UserId(me.user.id.0 as i64),
            handle: me.user.username.clone(),
        })
    }

    async fn answer_button(&self, callback_id: &str, text: Option<&str>) -> Result<()> {
        self.with_retry("answer_callback_query", || {
            let mut req = self.bot.answer_callback_query(callback_id.to_string());
            if let Some(t) = text {
                req = req.text(t.to_string());
            }
            req
        })
        .await?;
        Ok(())
    }
}
