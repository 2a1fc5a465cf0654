/// Telegram user id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserId(pub i64);

/// Telegram chat id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChatId(pub i64);

/// Telegram message id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageId(pub i32);

/// A stable reference to a Telegram message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageRef {
    pub chat_id: ChatId,
    pub message_id: MessageId,
}

impl MessageRef {
    pub fn new(chat_id: ChatId, message_id: MessageId) -> Self {
        Self {
            chat_id,
            message_id,
        }
    }
}

impl From<UserId> for ChatId {
    /// A user's private chat shares the user's numeric id.
    fn from(u: UserId) -> Self {
        ChatId(u.0)
    }
}

/// Sender of an inbound message, as reported by the transport at receive time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Participant {
    pub id: UserId,
    pub username: Option<String>,
    pub first_name: String,
    pub is_bot: bool,
}

impl Participant {
    /// `@username` when available, otherwise the first name.
    pub fn label(&self) -> String {
        match self.username.as_deref().filter(|u| !u.is_empty()) {
            Some(u) => format!("@{u}"),
            None => self.first_name.clone(),
        }
    }
}

/// Privilege level of a participant inside the moderated chat.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParticipantStatus {
    Member,
    Administrator,
    Creator,
}

impl ParticipantStatus {
    pub fn is_privileged(self) -> bool {
        matches!(self, Self::Administrator | Self::Creator)
    }
}

/// Identity of the bot account itself.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelfIdentity {
    pub id: UserId,
    pub handle: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn participant(username: Option<&str>) -> Participant {
        Participant {
            id: UserId(7),
            username: username.map(str::to_string),
            first_name: "Ana".to_string(),
            is_bot: false,
        }
    }

    #[test]
    fn label_prefers_username() {
        assert_eq!(participant(Some("ana_sj")).label(), "@ana_sj");
        assert_eq!(participant(None).label(), "Ana");
        assert_eq!(participant(Some("")).label(), "Ana");
    }

    #[test]
    fn privileged_statuses() {
        assert!(ParticipantStatus::Creator.is_privileged());
        assert!(ParticipantStatus::Administrator.is_privileged());
        assert!(!ParticipantStatus::Member.is_privileged());
    }
}
