use crate::domain::{ChatId, MessageId, MessageRef, Participant, UserId};

/// Where a forwarded message came from, as far as the transport could tell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ForwardOrigin {
    /// Forwarded from a chat (or a user's private chat) whose id is known.
    Chat(ChatId),
    /// Forwarded, but the origin is hidden (privacy settings, anonymous sender).
    Hidden,
}

impl ForwardOrigin {
    pub fn chat_id(self) -> Option<ChatId> {
        match self {
            Self::Chat(id) => Some(id),
            Self::Hidden => None,
        }
    }
}

/// A text/caption message posted in a moderated group.
#[derive(Clone, Debug)]
pub struct GroupMessage {
    pub message: MessageRef,
    pub from: Participant,
    /// Text or caption; empty for media without a caption.
    pub text: String,
    pub forward: Option<ForwardOrigin>,
}

/// A message received in a private chat with the bot.
#[derive(Clone, Debug)]
pub struct PrivateMessage {
    pub message: MessageRef,
    pub from: Participant,
    /// Text or caption, when the content has any.
    pub text: Option<String>,
    /// Id of the message this one replies to (in the same private chat).
    pub reply_to: Option<MessageId>,
}

/// New members joined a group.
#[derive(Clone, Debug)]
pub struct MembersJoined {
    pub chat_id: ChatId,
    pub members: Vec<Participant>,
}

/// Inline button activation.
#[derive(Clone, Debug)]
pub struct ButtonPress {
    pub callback_id: String,
    pub from: UserId,
    pub payload: String,
}

/// Reply markup attached to an outgoing message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReplyMarkup {
    Inline(InlineKeyboard),
    /// Ask the client to open a reply to the sent message.
    ForceReply { placeholder: Option<String> },
}

/// Inline keyboard, one button per row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InlineKeyboard {
    pub buttons: Vec<InlineButton>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InlineButton {
    Callback { label: String, data: String },
    Url { label: String, url: String },
}

impl InlineKeyboard {
    pub fn new(buttons: Vec<InlineButton>) -> Self {
        Self { buttons }
    }

    pub fn single(button: InlineButton) -> Self {
        Self {
            buttons: vec![button],
        }
    }

    /// Callback payloads of all buttons, in order.
    pub fn callback_payloads(&self) -> Vec<&str> {
        self.buttons
            .iter()
            .filter_map(|b| match b {
                InlineButton::Callback { data, .. } => Some(data.as_str()),
                InlineButton::Url { .. } => None,
            })
            .collect()
    }
}

impl From<InlineKeyboard> for ReplyMarkup {
    fn from(k: InlineKeyboard) -> Self {
        Self::Inline(k)
    }
}
