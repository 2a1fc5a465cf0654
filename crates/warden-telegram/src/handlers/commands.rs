use teloxide::types::Message;

use warden_core::{
    config::Config, domain::ChatId, formatting::log_detail, messaging::types::ReplyMarkup,
    texts,
};

use crate::router::AppState;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum Command {
    Start,
    Help,
    Rules,
    Contact,
}

impl Command {
    pub(super) fn parse(text: &str) -> Option<Self> {
        if !text.starts_with('/') {
            return None;
        }
        let (cmd, _) = parse_command(text);
        match cmd.as_str() {
            "start" => Some(Self::Start),
            "help" => Some(Self::Help),
            "rules" | "reglas" => Some(Self::Rules),
            "contact" | "contacto" | "admin" => Some(Self::Contact),
            _ => None,
        }
    }

    /// `/contact` is tied to the community group when one is configured.
    pub(super) fn allowed_in(self, cfg: &Config, chat_id: ChatId) -> bool {
        match self {
            Self::Contact => cfg.is_moderated_chat(chat_id),
            Self::Start | Self::Help | Self::Rules => true,
        }
    }
}

fn parse_command(text: &str) -> (String, String) {
    // Telegram may send `/cmd@botname arg1 ...`
    let mut parts = text.trim().splitn(2, char::is_whitespace);
    let first = parts.next().unwrap_or("").trim();
    let rest = parts.next().unwrap_or("").trim().to_string();

    let cmd = first
        .trim_start_matches('/')
        .split('@')
        .next()
        .unwrap_or("")
        .to_lowercase();

    (cmd, rest)
}

/// `/word` shaped text, recognised or not.
pub(super) fn looks_like_command(text: &str) -> bool {
    text.strip_prefix('/')
        .and_then(|rest| rest.chars().next())
        .is_some_and(|c| !c.is_whitespace())
}

pub(super) async fn handle_command(cmd: Command, msg: &Message, state: &AppState) {
    let chat_id = ChatId(msg.chat.id.0);
    if !cmd.allowed_in(&state.cfg, chat_id) {
        return;
    }

    let (html, markup): (String, Option<ReplyMarkup>) = match cmd {
        Command::Start => (texts::start(state.community.community_name()), None),
        Command::Help => (texts::help(), None),
        Command::Rules => (texts::rules(), None),
        Command::Contact => (
            texts::contact_prompt().to_string(),
            state.community.contact_markup().await,
        ),
    };

    if let Err(e) = state
        .messenger
        .send_html_with_markup(chat_id, &html, markup)
        .await
    {
        tracing::error!(
            event = "command_reply_failed",
            op = "send_message",
            chat_id = chat_id.0,
            command = ?cmd,
            detail = %log_detail(&e),
        );
    }
}
