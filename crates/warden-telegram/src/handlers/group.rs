use std::sync::Arc;

use teloxide::types::Message;

use warden_core::{
    config::Config,
    domain::ChatId,
    messaging::types::{GroupMessage, MembersJoined},
};

use crate::{convert, router::AppState};

use super::commands::{self, Command};

/// What a group update turns into.
#[derive(Debug)]
pub(super) enum GroupRoute {
    Command(Command),
    Welcome(MembersJoined),
    Moderate(GroupMessage),
    Skip,
}

/// Known commands are answered and never moderated. Everything else posted in the
/// moderated group goes to the classifier, unless there is nothing to classify.
pub(super) fn route_group(
    cfg: &Config,
    chat_id: ChatId,
    joined: Option<MembersJoined>,
    message: Option<GroupMessage>,
) -> GroupRoute {
    if let Some(cmd) = message.as_ref().and_then(|m| Command::parse(&m.text)) {
        return GroupRoute::Command(cmd);
    }
    if !cfg.is_moderated_chat(chat_id) {
        return GroupRoute::Skip;
    }
    if let Some(joined) = joined {
        return GroupRoute::Welcome(joined);
    }

    match message {
        // Service messages and uncaptioned media have nothing to classify.
        Some(m) if m.text.is_empty() && m.forward.is_none() => GroupRoute::Skip,
        Some(m) => GroupRoute::Moderate(m),
        None => GroupRoute::Skip,
    }
}

pub(super) async fn handle_group(msg: Message, state: Arc<AppState>) {
    let chat_id = ChatId(msg.chat.id.0);
    let route = route_group(
        &state.cfg,
        chat_id,
        convert::members_joined(&msg),
        convert::group_message(&msg),
    );

    match route {
        GroupRoute::Command(cmd) => commands::handle_command(cmd, &msg, &state).await,
        GroupRoute::Welcome(joined) => {
            let sent = state.community.welcome(&joined).await;
            tracing::debug!(event = "welcome", chat_id = chat_id.0, sent = sent);
        }
        GroupRoute::Moderate(gm) => {
            let outcome = state.moderation.handle_group_message(&gm).await;
            tracing::debug!(
                event = "moderated",
                chat_id = chat_id.0,
                user_id = gm.from.id.0,
                verdict = ?outcome.verdict,
            );
        }
        GroupRoute::Skip => {}
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use warden_core::{
        domain::{MessageId, MessageRef, Participant, UserId},
        messaging::types::ForwardOrigin,
    };

    use super::*;

    const GROUP: ChatId = ChatId(-100500);

    fn config(group_id: Option<&str>) -> Config {
        let mut env = HashMap::from([("BOT_TOKEN", "t"), ("OPERATOR_ID", "1")]);
        if let Some(g) = group_id {
            env.insert("GROUP_ID", g);
        }
        Config::from_lookup(|k| env.get(k).map(|v| v.to_string())).unwrap()
    }

    fn pedro() -> Participant {
        Participant {
            id: UserId(5),
            username: Some("pedro".to_string()),
            first_name: "Pedro".to_string(),
            is_bot: false,
        }
    }

    fn text(chat: ChatId, text: &str) -> GroupMessage {
        GroupMessage {
            message: MessageRef::new(chat, MessageId(1)),
            from: pedro(),
            text: text.to_string(),
            forward: None,
        }
    }

    #[test]
    fn known_commands_are_answered_not_moderated() {
        let route = route_group(&config(None), GROUP, None, Some(text(GROUP, "/rules@warden_bot")));
        assert!(matches!(route, GroupRoute::Command(Command::Rules)));
    }

    #[test]
    fn slash_prefixed_spam_is_still_moderated() {
        for spam in [
            "/ join t.me/spamgroup",
            "/ http://evil.example",
            "/🔥🔥🔥🔥🔥🔥🔥🔥🔥🔥🔥🔥",
            "/unknown http://evil.example",
        ] {
            let route = route_group(&config(None), GROUP, None, Some(text(GROUP, spam)));
            assert!(matches!(route, GroupRoute::Moderate(_)), "{spam}");
        }
    }

    #[test]
    fn other_groups_are_left_alone_when_one_is_configured() {
        let cfg = config(Some("-100500"));
        let elsewhere = ChatId(-100999);

        let spam = text(elsewhere, "http://evil.example");
        let route = route_group(&cfg, elsewhere, None, Some(spam));
        assert!(matches!(route, GroupRoute::Skip));

        let route = route_group(&cfg, GROUP, None, Some(text(GROUP, "http://evil.example")));
        assert!(matches!(route, GroupRoute::Moderate(_)));
    }

    #[test]
    fn joins_are_welcomed() {
        let joined = MembersJoined {
            chat_id: GROUP,
            members: vec![pedro()],
        };
        let route = route_group(&config(None), GROUP, Some(joined), Some(text(GROUP, "")));
        assert!(matches!(route, GroupRoute::Welcome(j) if j.members.len() == 1));
    }

    #[test]
    fn empty_messages_are_skipped_unless_forwarded() {
        let route = route_group(&config(None), GROUP, None, Some(text(GROUP, "")));
        assert!(matches!(route, GroupRoute::Skip));

        let mut forwarded = text(GROUP, "");
        forwarded.forward = Some(ForwardOrigin::Hidden);
        let route = route_group(&config(None), GROUP, None, Some(forwarded));
        assert!(matches!(route, GroupRoute::Moderate(_)));

        assert!(matches!(route_group(&config(None), GROUP, None, None), GroupRoute::Skip));
    }
}
