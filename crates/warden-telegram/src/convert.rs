//! teloxide update types -> `warden-core` inbound types.

use teloxide::types::{CallbackQuery, ForwardedFrom, Message, User};

use warden_core::{
    domain::{ChatId, MessageId, MessageRef, Participant, UserId},
    messaging::types::{ButtonPress, ForwardOrigin, GroupMessage, MembersJoined, PrivateMessage},
};

pub fn participant(user: &User) -> Participant {
    Participant {
        id: UserId(user.id.0 as i64),
        username: user.username.clone(),
        first_name: user.first_name.clone(),
        is_bot: user.is_bot,
    }
}

/// Forward origin of `from`. A user's private chat shares the user's id; an origin the
/// sender chose to hide stays hidden.
pub fn forward_origin(from: &ForwardedFrom) -> ForwardOrigin {
    match from {
        ForwardedFrom::User(u) => ForwardOrigin::Chat(ChatId(u.id.0 as i64)),
        ForwardedFrom::Chat(c) => ForwardOrigin::Chat(ChatId(c.id.0)),
        ForwardedFrom::SenderName(_) => ForwardOrigin::Hidden,
    }
}

fn message_ref(msg: &Message) -> MessageRef {
    MessageRef::new(ChatId(msg.chat.id.0), MessageId(msg.id.0))
}

fn text_or_caption(msg: &Message) -> Option<&str> {
    msg.text().or_else(|| msg.caption())
}

pub fn group_message(msg: &Message) -> Option<GroupMessage> {
    let from = msg.from()?;
    Some(GroupMessage {
        message: message_ref(msg),
        from: participant(from),
        text: text_or_caption(msg).unwrap_or_default().to_string(),
        forward: msg.forward().map(|f| forward_origin(&f.from)),
    })
}

pub fn private_message(msg: &Message) -> Option<PrivateMessage> {
    let from = msg.from()?;
    Some(PrivateMessage {
        message: message_ref(msg),
        from: participant(from),
        text: text_or_caption(msg).map(str::to_string),
        reply_to: msg.reply_to_message().map(|r| MessageId(r.id.0)),
    })
}

pub fn members_joined(msg: &Message) -> Option<MembersJoined> {
    let members = msg.new_chat_members()?;
    Some(MembersJoined {
        chat_id: ChatId(msg.chat.id.0),
        members: members.iter().map(participant).collect(),
    })
}

/// `None` for presses without a payload (game buttons and the like).
pub fn button_press(q: &CallbackQuery) -> Option<ButtonPress> {
    let payload = q.data.clone().filter(|d| !d.is_empty())?;
    Some(ButtonPress {
        callback_id: q.id.clone(),
        from: UserId(q.from.id.0 as i64),
        payload,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: u64, username: Option<&str>) -> User {
        User {
            id: teloxide::types::UserId(id),
            is_bot: false,
            first_name: "Ana".to_string(),
            last_name: None,
            username: username.map(str::to_string),
            language_code: None,
            is_premium: false,
            added_to_attachment_menu: false,
        }
    }

    #[test]
    fn participant_copies_identity_fields() {
        let p = participant(&user(42, Some("ana")));
        assert_eq!(p.id, UserId(42));
        assert_eq!(p.label(), "@ana");
        assert!(!p.is_bot);
    }

    #[test]
    fn forwards_map_to_chat_ids_or_hidden() {
        assert_eq!(
            forward_origin(&ForwardedFrom::User(user(7, None))),
            ForwardOrigin::Chat(ChatId(7))
        );
        assert_eq!(
            forward_origin(&ForwardedFrom::SenderName("Someone".to_string())),
            ForwardOrigin::Hidden
        );
    }
}
