//! Deterministic rules that decide whether a group message breaks the community rules.

use std::{collections::HashSet, fmt, ops::RangeInclusive};

use regex::Regex;

use crate::{
    domain::{ChatId, ParticipantStatus},
    messaging::types::ForwardOrigin,
};

/// Why a message was rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ViolationReason {
    ForwardNotWhitelisted,
    DisallowedLinkOrMention,
    EmojiFlood,
}

impl ViolationReason {
    /// Stable identifier for log fields.
    pub fn code(self) -> &'static str {
        match self {
            Self::ForwardNotWhitelisted => "forward_not_whitelisted",
            Self::DisallowedLinkOrMention => "disallowed_link_or_mention",
            Self::EmojiFlood => "emoji_flood",
        }
    }

    /// Human-readable description used in chat notices.
    pub fn describe(self) -> &'static str {
        match self {
            Self::ForwardNotWhitelisted => "forwarding from outside channels",
            Self::DisallowedLinkOrMention => "posting links or mentions that are not allowed",
            Self::EmojiFlood => "excessive emojis",
        }
    }
}

impl fmt::Display for ViolationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    Clean,
    Violation(ViolationReason),
}

impl Verdict {
    pub fn violation(self) -> Option<ViolationReason> {
        match self {
            Self::Clean => None,
            Self::Violation(r) => Some(r),
        }
    }
}

/// The parts of a group message the rules look at.
#[derive(Clone, Copy, Debug)]
pub struct MessageContent<'a> {
    pub text: &'a str,
    pub forward: Option<ForwardOrigin>,
}

const EMOJI_RANGES: [RangeInclusive<char>; 4] = [
    '\u{1F300}'..='\u{1F6FF}',
    '\u{1F900}'..='\u{1FAFF}',
    '\u{2600}'..='\u{26FF}',
    '\u{2700}'..='\u{27BF}',
];

/// Link/mention patterns, tested in order against the e-mail-stripped text.
const LINK_PATTERNS: [&str; 6] = [
    r"https?://",
    r"t\.me/",
    r"telegram\.me/",
    r"t\s*\[\s*\.\s*\]\s*me",
    r"telegram\s*\[\s*\.\s*\]\s*me",
    // `@handle` at the start of the text or after whitespace; `foo@bar` is not a mention.
    r"(?:^|\s)@\w{3,}",
];

/// Compiled moderation rules.
#[derive(Clone, Debug)]
pub struct Classifier {
    email: Regex,
    link_patterns: Vec<Regex>,
    allowed_links: Vec<String>,
    allowed_forward_chats: HashSet<ChatId>,
    emoji_limit: usize,
}

impl Classifier {
    pub fn new(
        allowed_links: &[String],
        allowed_forward_chats: HashSet<ChatId>,
        emoji_limit: usize,
    ) -> Self {
        Self {
            email: compile(r"\S+@\S+\.\S+"),
            link_patterns: LINK_PATTERNS.iter().map(|p| compile(p)).collect(),
            allowed_links: allowed_links.iter().map(|l| l.to_lowercase()).collect(),
            allowed_forward_chats,
            emoji_limit,
        }
    }

    /// Classify one group message.
    ///
    /// `status` is `None` when the privilege lookup failed; such senders are let through
    /// (fail-open), the same as administrators. Rules run in a fixed order and the first
    /// violation wins: forward origin, then links/mentions, then emoji flood.
    pub fn classify(
        &self,
        message: &MessageContent<'_>,
        status: Option<ParticipantStatus>,
    ) -> Verdict {
        match status {
            None => return Verdict::Clean,
            Some(s) if s.is_privileged() => return Verdict::Clean,
            Some(_) => {}
        }

        if let Some(origin) = message.forward {
            if !self.is_allowed_forward(origin) {
                return Verdict::Violation(ViolationReason::ForwardNotWhitelisted);
            }
        }

        if self.has_disallowed_link(message.text) {
            return Verdict::Violation(ViolationReason::DisallowedLinkOrMention);
        }

        if count_emojis(message.text) > self.emoji_limit {
            return Verdict::Violation(ViolationReason::EmojiFlood);
        }

        Verdict::Clean
    }

    fn is_allowed_forward(&self, origin: ForwardOrigin) -> bool {
        origin
            .chat_id()
            .is_some_and(|id| self.allowed_forward_chats.contains(&id))
    }

    fn has_disallowed_link(&self, text: &str) -> bool {
        let lower = text.to_lowercase();
        let sanitized = self.email.replace_all(&lower, "");
        let matched = self.link_patterns.iter().any(|re| re.is_match(&sanitized));
        matched && !self.contains_allowed_link(&lower)
    }

    fn contains_allowed_link(&self, lower: &str) -> bool {
        self.allowed_links
            .iter()
            .any(|allowed| lower.contains(allowed.as_str()))
    }
}

/// Number of code points that fall in the emoji blocks the community limits.
pub fn count_emojis(text: &str) -> usize {
    text.chars()
        .filter(|c| EMOJI_RANGES.iter().any(|r| r.contains(c)))
        .count()
}

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("valid regex")
}
