//! Recording in-memory messenger for service tests.

use std::{
    collections::{HashMap, HashSet},
    sync::Mutex,
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{
    domain::{ChatId, MessageId, MessageRef, ParticipantStatus, SelfIdentity, UserId},
    errors::Error,
    messaging::{port::MessagingPort, types::ReplyMarkup},
    Result,
};

#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    Send {
        msg: MessageRef,
        html: String,
        markup: Option<ReplyMarkup>,
    },
    Delete(MessageRef),
    Copy {
        to: ChatId,
        source: MessageRef,
        result: MessageRef,
        markup: Option<ReplyMarkup>,
    },
    Restrict {
        chat_id: ChatId,
        user_id: UserId,
        until: DateTime<Utc>,
    },
    AnswerButton {
        callback_id: String,
        text: Option<String>,
    },
}

#[derive(Default)]
struct State {
    next_id: i32,
    calls: Vec<Call>,
    failing: HashSet<&'static str>,
    statuses: HashMap<UserId, ParticipantStatus>,
}

pub struct FakeMessenger {
    state: Mutex<State>,
    handle: Option<String>,
}

impl FakeMessenger {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                next_id: 1000,
                ..State::default()
            }),
            handle: Some("warden_bot".to_string()),
        }
    }

    pub fn without_handle() -> Self {
        Self {
            handle: None,
            ..Self::new()
        }
    }

    /// Make every call of `op` fail (`send`, `delete`, `copy`, `restrict`, `status`, `me`).
    pub fn fail(&self, op: &'static str) {
        self.state.lock().unwrap().failing.insert(op);
    }

    pub fn set_status(&self, user: UserId, status: ParticipantStatus) {
        self.state.lock().unwrap().statuses.insert(user, status);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn sent_texts(&self, chat_id: ChatId) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Send { msg, html, .. } if msg.chat_id == chat_id => Some(html),
                _ => None,
            })
            .collect()
    }

    pub fn sends(&self) -> Vec<(MessageRef, String, Option<ReplyMarkup>)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Send { msg, html, markup } => Some((msg, html, markup)),
                _ => None,
            })
            .collect()
    }

    pub fn copies(&self) -> Vec<(ChatId, MessageRef, MessageRef, Option<ReplyMarkup>)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Copy {
                    to,
                    source,
                    result,
                    markup,
                } => Some((to, source, result, markup)),
                _ => None,
            })
            .collect()
    }

    pub fn deleted(&self) -> Vec<MessageRef> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Delete(m) => Some(m),
                _ => None,
            })
            .collect()
    }

    pub fn restrictions(&self) -> Vec<(ChatId, UserId, DateTime<Utc>)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Restrict {
                    chat_id,
                    user_id,
                    until,
                } => Some((chat_id, user_id, until)),
                _ => None,
            })
            .collect()
    }

    fn check(&self, state: &State, op: &'static str) -> Result<()> {
        if state.failing.contains(op) {
            return Err(Error::transport(op, "simulated failure"));
        }
        Ok(())
    }

    fn alloc(state: &mut State, chat_id: ChatId) -> MessageRef {
        state.next_id += 1;
        MessageRef::new(chat_id, MessageId(state.next_id))
    }
}

#[async_trait]
impl MessagingPort for FakeMessenger {
    async fn send_html_with_markup(
        &self,
        chat_id: ChatId,
        html: &str,
        markup: Option<ReplyMarkup>,
    ) -> Result<MessageRef> {
        let mut state = self.state.lock().unwrap();
        self.check(&state, "send")?;
        let msg = Self::alloc(&mut state, chat_id);
        state.calls.push(Call::Send {
            msg,
            html: html.to_string(),
            markup,
        });
        Ok(msg)
    }

    async fn delete_message(&self, msg: MessageRef) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        self.check(&state, "delete")?;
        state.calls.push(Call::Delete(msg));
        Ok(())
    }

    async fn copy_message(
        &self,
        to: ChatId,
        source: MessageRef,
        markup: Option<ReplyMarkup>,
    ) -> Result<MessageRef> {
        let mut state = self.state.lock().unwrap();
        self.check(&state, "copy")?;
        let result = Self::alloc(&mut state, to);
        state.calls.push(Call::Copy {
            to,
            source,
            result,
            markup,
        });
        Ok(result)
    }

    async fn restrict_participant(
        &self,
        chat_id: ChatId,
        user_id: UserId,
        until: DateTime<Utc>,
    ) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        self.check(&state, "restrict")?;
        state.calls.push(Call::Restrict {
            chat_id,
            user_id,
            until,
        });
        Ok(())
    }

    async fn participant_status(
        &self,
        _chat_id: ChatId,
        user_id: UserId,
    ) -> Result<ParticipantStatus> {
        let state = self.state.lock().unwrap();
        self.check(&state, "status")?;
        Ok(state
            .statuses
            .get(&user_id)
            .copied()
            .unwrap_or(ParticipantStatus::Member))
    }

    async fn self_identity(&self) -> Result<SelfIdentity> {
        let state = self.state.lock().unwrap();
        self.check(&state, "me")?;
        Ok(SelfIdentity {
            id: UserId(1),
            handle: self.handle.clone(),
        })
    }

    async fn answer_button(&self, callback_id: &str, text: Option<&str>) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::AnswerButton {
            callback_id: callback_id.to_string(),
            text: text.map(str::to_string),
        });
        Ok(())
    }
}
