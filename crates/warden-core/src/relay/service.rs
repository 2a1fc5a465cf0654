use std::sync::Arc;

use crate::{
    domain::{ChatId, MessageRef, UserId},
    formatting::{log_detail, truncate_text},
    messaging::{
        port::MessagingPort,
        types::{ButtonPress, InlineButton, InlineKeyboard, PrivateMessage, ReplyMarkup},
    },
    relay::correlator::RelayCorrelator,
    texts,
};

const RESPOND_PREFIX: &str = "reply:";
const FALLBACK_MAX_CHARS: usize = 3500;

/// Callback payload of the "respond" button for `user`.
pub fn respond_payload(user: UserId) -> String {
    format!("{RESPOND_PREFIX}{}", user.0)
}

pub fn parse_respond_payload(payload: &str) -> Option<UserId> {
    payload
        .strip_prefix(RESPOND_PREFIX)?
        .trim()
        .parse::<i64>()
        .ok()
        .map(UserId)
}

fn respond_keyboard(user: UserId) -> ReplyMarkup {
    InlineKeyboard::single(InlineButton::Callback {
        label: texts::RESPOND_BUTTON.to_string(),
        data: respond_payload(user),
    })
    .into()
}

/// Outcome of relaying a participant's private message to the operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RelayOutcome {
    /// Content reached the operator chat as `relayed`.
    Delivered { relayed: MessageRef },
    Failed,
}

/// Outcome of routing an operator message back to a participant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OperatorRoute {
    Delivered(UserId),
    DeliveryFailed(UserId),
    NoTarget,
}

/// Outcome of a "respond" button press.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Selection {
    Prompted(UserId),
    PromptFailed(UserId),
    NotAllowed,
    Invalid,
}

/// Relays private messages between participants and the single operator.
///
/// Replies are routed by the id of the message the operator answers, never by a
/// "currently selected" participant, so several conversations can interleave.
pub struct RelayService {
    operator: UserId,
    messenger: Arc<dyn MessagingPort>,
    correlator: RelayCorrelator,
}

impl RelayService {
    pub fn new(operator: UserId, messenger: Arc<dyn MessagingPort>, capacity: usize) -> Self {
        Self {
            operator,
            messenger,
            correlator: RelayCorrelator::new(capacity),
        }
    }

    pub fn is_operator(&self, user: UserId) -> bool {
        user == self.operator
    }

    pub fn correlator(&self) -> &RelayCorrelator {
        &self.correlator
    }

    fn operator_chat(&self) -> ChatId {
        ChatId::from(self.operator)
    }

    /// Copy a participant's private message into the operator chat and acknowledge it.
    pub async fn relay_to_operator(&self, msg: &PrivateMessage) -> RelayOutcome {
        let sender = &msg.from;
        let op_chat = self.operator_chat();

        match self
            .messenger
            .send_html_with_markup(
                op_chat,
                &texts::relay_header(sender),
                Some(respond_keyboard(sender.id)),
            )
            .await
        {
            Ok(header) => self.correlator.put(header.message_id, sender.id).await,
            Err(e) => self.log_failure("relay_header_failed", "send_message", sender.id, &e),
        }

        let relayed = match self
            .messenger
            .copy_message(op_chat, msg.message, Some(respond_keyboard(sender.id)))
            .await
        {
            Ok(copied) => Some(copied),
            Err(e) => {
                self.log_failure("relay_copy_failed", "copy_message", sender.id, &e);
                self.send_fallback(msg).await
            }
        };

        let outcome = match relayed {
            Some(relayed) => {
                self.correlator.put(relayed.message_id, sender.id).await;
                tracing::info!(
                    event = "relayed",
                    user_id = sender.id.0,
                    message_id = relayed.message_id.0,
                );
                RelayOutcome::Delivered { relayed }
            }
            None => RelayOutcome::Failed,
        };

        let ack = match outcome {
            RelayOutcome::Delivered { .. } => texts::delivered_ack(),
            RelayOutcome::Failed => texts::relay_failed(),
        };
        if let Err(e) = self.messenger.send_html(msg.message.chat_id, ack).await {
            self.log_failure("relay_ack_failed", "send_message", sender.id, &e);
        }

        outcome
    }

    async fn send_fallback(&self, msg: &PrivateMessage) -> Option<MessageRef> {
        let text = msg.text.as_deref().filter(|t| !t.trim().is_empty())?;
        let html = texts::relay_fallback(&msg.from, &truncate_text(text, FALLBACK_MAX_CHARS));

        match self
            .messenger
            .send_html_with_markup(
                self.operator_chat(),
                &html,
                Some(respond_keyboard(msg.from.id)),
            )
            .await
        {
            Ok(sent) => Some(sent),
            Err(e) => {
                self.log_failure("relay_fallback_failed", "send_message", msg.from.id, &e);
                None
            }
        }
    }

    /// Deliver an operator message to the participant it answers.
    pub async fn route_operator_message(&self, msg: &PrivateMessage) -> OperatorRoute {
        let target = match msg.reply_to {
            Some(id) => self.correlator.get(id).await,
            None => None,
        };

        let Some(target) = target else {
            if let Err(e) = self
                .messenger
                .send_html(msg.message.chat_id, texts::no_target_selected())
                .await
            {
                self.log_failure("no_target_notice_failed", "send_message", self.operator, &e);
            }
            return OperatorRoute::NoTarget;
        };

        let (route, confirmation) = match self
            .messenger
            .copy_message(ChatId::from(target), msg.message, None)
            .await
        {
            Ok(_) => {
                tracing::info!(event = "operator_reply_delivered", user_id = target.0);
                (OperatorRoute::Delivered(target), texts::operator_delivered(target))
            }
            Err(e) => {
                self.log_failure("operator_reply_failed", "copy_message", target, &e);
                (
                    OperatorRoute::DeliveryFailed(target),
                    texts::operator_delivery_failed(target),
                )
            }
        };

        if let Err(e) = self
            .messenger
            .send_html(msg.message.chat_id, &confirmation)
            .await
        {
            self.log_failure("operator_confirm_failed", "send_message", self.operator, &e);
        }

        route
    }

    /// "Respond" button: open a force-reply prompt bound to the participant.
    pub async fn handle_button(&self, press: &ButtonPress) -> Selection {
        if !self.is_operator(press.from) {
            self.answer(press, Some(texts::button_not_allowed())).await;
            return Selection::NotAllowed;
        }
        let Some(target) = parse_respond_payload(&press.payload) else {
            self.answer(press, Some(texts::button_invalid())).await;
            return Selection::Invalid;
        };

        let markup = ReplyMarkup::ForceReply {
            placeholder: Some(format!("Reply to {}", target.0)),
        };
        let selection = match self
            .messenger
            .send_html_with_markup(
                self.operator_chat(),
                &texts::reply_prompt(target),
                Some(markup),
            )
            .await
        {
            Ok(prompt) => {
                self.correlator.put(prompt.message_id, target).await;
                Selection::Prompted(target)
            }
            Err(e) => {
                self.log_failure("reply_prompt_failed", "send_message", target, &e);
                Selection::PromptFailed(target)
            }
        };

        self.answer(press, None).await;
        selection
    }

    async fn answer(&self, press: &ButtonPress, text: Option<&str>) {
        if let Err(e) = self.messenger.answer_button(&press.callback_id, text).await {
            self.log_failure("answer_button_failed", "answer_callback_query", press.from, &e);
        }
    }

    fn log_failure(
        &self,
        event: &'static str,
        op: &'static str,
        user: UserId,
        err: &crate::Error,
    ) {
        tracing::error!(event = event, op = op, user_id = user.0, detail = %log_detail(err));
    }
}
