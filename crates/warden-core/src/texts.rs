//! User-facing message templates (Telegram HTML).

use crate::{
    domain::{Participant, UserId},
    formatting::escape_html,
    moderation::ViolationReason,
};

const RULES: &str = "• No spam, no porn, no drugs.\n\
• No links or mentions of other groups/channels.\n\
• Forwards from outside channels are not allowed.\n\
• Emoji floods get you muted.";

pub fn warning_notice(who: &Participant, reason: ViolationReason, mute_hours: u64) -> String {
    format!(
        "⚠️ {}, your message was removed for {}. Next time = {mute_hours}h mute.",
        escape_html(&who.label()),
        reason.describe()
    )
}

pub fn mute_notice(who: &Participant, reason: ViolationReason, hours: u64) -> String {
    format!(
        "🚫 {} has been muted for {hours} hours for repeated {}.",
        escape_html(&who.label()),
        reason.describe()
    )
}

pub fn welcome(first_name: &str, community: &str, contact_link: Option<&str>) -> String {
    let link_line = contact_link
        .map(|link| {
            format!(
                "\n\n❓ <b>Questions or proposals? Contact the admin:</b>\n🔗 <a href=\"{}\">Write to the bot</a>",
                escape_html(link)
            )
        })
        .unwrap_or_default();

    format!(
        "👋 Welcome {} to <b>{}</b>!\n\n📜 <b>Quick rules:</b>\n{RULES}{link_line}",
        escape_html(first_name),
        escape_html(community)
    )
}

pub fn start(community: &str) -> String {
    format!(
        "👋 Hi! This is the <b>{}</b> bot.\n\n\
✉️ Write your message here and I will pass it on to the admin.\n\
Thanks for getting in touch 🙌",
        escape_html(community)
    )
}

pub fn rules() -> String {
    format!("📜 <b>Group rules</b>\n{RULES}")
}

pub fn help() -> String {
    "<b>🛟 Bot help</b>\n\n\
👉 <b>/start</b> – start a chat with the bot.\n\
📜 <b>/rules</b> – group rules.\n\
📨 <b>/contact</b> – how to reach the admin.\n\
✉️ Any private message sent here is passed on to the admin."
        .to_string()
}

pub fn contact_prompt() -> &'static str {
    "To talk to the admin, open a private chat with the bot:"
}

pub const CONTACT_BUTTON: &str = "✉️ Write to the bot";

pub fn delivered_ack() -> &'static str {
    "✅ Message sent to the admin."
}

pub fn relay_failed() -> &'static str {
    "⚠️ I could not pass your message on to the admin.\n\
Possible causes:\n\
• The admin has not started a chat with the bot yet (/start).\n\
• The bot is misconfigured (wrong admin id)."
}

/// Header shown to the operator above a relayed message.
pub fn relay_header(from: &Participant) -> String {
    format!(
        "📩 Message from {} (id <code>{}</code>)",
        escape_html(&from.label()),
        from.id.0
    )
}

/// Stand-in for content the platform refused to copy.
pub fn relay_fallback(from: &Participant, text: &str) -> String {
    format!(
        "📩 {} (id <code>{}</code>) wrote:\n\n{}",
        escape_html(&from.label()),
        from.id.0,
        escape_html(text)
    )
}

pub const RESPOND_BUTTON: &str = "↩️ Respond";

pub fn reply_prompt(target: UserId) -> String {
    format!(
        "✍️ Replying to <code>{}</code>. Write your answer as a reply to this message.",
        target.0
    )
}

pub fn no_target_selected() -> &'static str {
    "ℹ️ No recipient selected. Reply to a relayed message, or press its \"Respond\" button first."
}

pub fn operator_delivered(target: UserId) -> String {
    format!("✅ Delivered to <code>{}</code>.", target.0)
}

pub fn operator_delivery_failed(target: UserId) -> String {
    format!(
        "⚠️ Could not deliver to <code>{}</code>. They may have blocked the bot or never started it.",
        target.0
    )
}

pub fn button_not_allowed() -> &'static str {
    "Not allowed"
}

pub fn button_invalid() -> &'static str {
    "Invalid button"
}
