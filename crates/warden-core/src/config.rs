use std::{collections::HashSet, env, fs, path::Path, time::Duration};

use crate::{
    domain::{ChatId, UserId},
    errors::Error,
    Result,
};

/// Typed configuration for the bot.
///
/// Everything comes from the process environment; a `.env` file in the working directory
/// is read first but never overrides variables that are already set.
#[derive(Clone, Debug)]
pub struct Config {
    // Core
    pub bot_token: String,
    pub operator_id: UserId,
    pub group_id: Option<ChatId>,
    pub community_name: String,

    // Contact link
    pub bot_link: Option<String>,
    pub bot_username: Option<String>,

    // Moderation rules
    pub allowed_links: Vec<String>,
    pub allowed_forward_chats: HashSet<ChatId>,
    pub emoji_limit: usize,
    pub mute_duration: Duration,
    pub notice_ttl: Duration,
    pub welcome_ttl: Duration,

    // Relay
    pub relay_capacity: usize,

    // Logging
    pub log_level: String,
    pub log_json: bool,
}

impl Config {
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup (the environment in production).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).and_then(non_empty);

        // Required
        let bot_token = get("BOT_TOKEN").unwrap_or_default();
        if bot_token.trim().is_empty() {
            return Err(Error::Config(
                "BOT_TOKEN environment variable is required".to_string(),
            ));
        }

        let operator_id = get("OPERATOR_ID")
            .or_else(|| get("ADMIN_ID"))
            .and_then(|s| s.trim().parse::<i64>().ok())
            .filter(|id| *id != 0)
            .map(UserId)
            .ok_or_else(|| {
                Error::Config("OPERATOR_ID (or ADMIN_ID) must be a non-zero user id".to_string())
            })?;

        // 0 (or unset) means "moderate any group the bot is in".
        let group_id = get("GROUP_ID")
            .and_then(|s| s.trim().parse::<i64>().ok())
            .filter(|id| *id != 0)
            .map(ChatId);

        let community_name = get("COMMUNITY_NAME").unwrap_or_else(|| "the community".to_string());

        let bot_link = get("BOT_LINK");
        let bot_username = get("BOT_USERNAME")
            .map(|s| s.trim().trim_start_matches('@').to_string())
            .and_then(non_empty);

        let allowed_links = parse_csv_lower(get("ALLOWED_LINKS"));
        let allowed_forward_chats = parse_csv_i64(get("ALLOWED_FORWARD_CHATS"))
            .into_iter()
            .map(ChatId)
            .collect();

        let emoji_limit = parse_usize(get("EMOJI_LIMIT")).unwrap_or(10);
        let mute_duration =
            Duration::from_secs(parse_u64(get("MUTE_HOURS")).unwrap_or(24) * 60 * 60);
        let notice_ttl = Duration::from_secs(parse_u64(get("NOTICE_TTL_SECS")).unwrap_or(15));
        let welcome_ttl = Duration::from_secs(parse_u64(get("WELCOME_TTL_SECS")).unwrap_or(60));

        let relay_capacity = parse_usize(get("RELAY_CAPACITY")).unwrap_or(1000).max(1);

        let log_level = get("LOG_LEVEL").unwrap_or_else(|| "info".to_string());
        let log_json = parse_bool(get("LOG_JSON")).unwrap_or(true);

        Ok(Self {
            bot_token,
            operator_id,
            group_id,
            community_name,
            bot_link,
            bot_username,
            allowed_links,
            allowed_forward_chats,
            emoji_limit,
            mute_duration,
            notice_ttl,
            welcome_ttl,
            relay_capacity,
            log_level,
            log_json,
        })
    }

    /// Operator's private chat (same numeric id as the operator).
    pub fn operator_chat(&self) -> ChatId {
        ChatId::from(self.operator_id)
    }

    /// Whether `chat_id` falls under the optional single-chat restriction.
    pub fn is_moderated_chat(&self, chat_id: ChatId) -> bool {
        self.group_id.map_or(true, |g| g == chat_id)
    }
}

/// Read logging settings straight from the environment, before `Config::load()` runs.
///
/// Logging must come up first so configuration errors themselves get logged.
pub fn logging_from_env() -> (String, bool) {
    load_dotenv_if_present(Path::new(".env"));
    let level = env::var("LOG_LEVEL")
        .ok()
        .and_then(non_empty)
        .unwrap_or_else(|| "info".to_string());
    let json = parse_bool(env::var("LOG_JSON").ok()).unwrap_or(true);
    (level, json)
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }
        if env::var_os(key).is_some() {
            continue; // do not override existing env
        }

        env::set_var(key, strip_quotes(v.trim()));
    }
}

fn strip_quotes(val: &str) -> &str {
    if val.len() >= 2
        && ((val.starts_with('"') && val.ends_with('"'))
            || (val.starts_with('\'') && val.ends_with('\'')))
    {
        return &val[1..val.len() - 1];
    }
    val
}

fn parse_bool(v: Option<String>) -> Option<bool> {
    v.map(|s| {
        matches!(
            s.trim().to_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        )
    })
}

fn parse_u64(v: Option<String>) -> Option<u64> {
    v.and_then(|s| s.trim().parse::<u64>().ok())
}

fn parse_usize(v: Option<String>) -> Option<usize> {
    v.and_then(|s| s.trim().parse::<usize>().ok())
}

fn parse_csv_i64(v: Option<String>) -> Vec<i64> {
    v.unwrap_or_default()
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse::<i64>().ok())
        .collect()
}

fn parse_csv_lower(v: Option<String>) -> Vec<String> {
    v.unwrap_or_default()
        .split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn cfg(pairs: &[(&str, &str)]) -> Result<Config> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|k| map.get(k).cloned())
    }

    #[test]
    fn requires_token_and_operator() {
        assert!(matches!(cfg(&[]), Err(Error::Config(_))));
        assert!(matches!(cfg(&[("BOT_TOKEN", "t")]), Err(Error::Config(_))));
        assert!(matches!(
            cfg(&[("BOT_TOKEN", "t"), ("OPERATOR_ID", "0")]),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            cfg(&[("BOT_TOKEN", "t"), ("OPERATOR_ID", "abc")]),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn defaults_match_community_policy() {
        let c = cfg(&[("BOT_TOKEN", "t"), ("ADMIN_ID", "42")]).unwrap();
        assert_eq!(c.operator_id, UserId(42));
        assert_eq!(c.operator_chat(), ChatId(42));
        assert_eq!(c.group_id, None);
        assert_eq!(c.emoji_limit, 10);
        assert_eq!(c.mute_duration, Duration::from_secs(24 * 3600));
        assert_eq!(c.notice_ttl, Duration::from_secs(15));
        assert_eq!(c.welcome_ttl, Duration::from_secs(60));
        assert_eq!(c.relay_capacity, 1000);
        assert!(c.log_json);
        assert!(c.is_moderated_chat(ChatId(-100)));
    }

    #[test]
    fn parses_lists_and_group_restriction() {
        let c = cfg(&[
            ("BOT_TOKEN", "t"),
            ("OPERATOR_ID", "42"),
            ("GROUP_ID", "-1001"),
            ("BOT_USERNAME", "@WardenBot"),
            ("ALLOWED_LINKS", " https://t.me/OurGroup , @OurBot ,,"),
            ("ALLOWED_FORWARD_CHATS", "-100123, nope, -100456"),
            ("LOG_JSON", "0"),
        ])
        .unwrap();

        assert_eq!(c.group_id, Some(ChatId(-1001)));
        assert!(c.is_moderated_chat(ChatId(-1001)));
        assert!(!c.is_moderated_chat(ChatId(-2002)));
        assert_eq!(c.bot_username.as_deref(), Some("WardenBot"));
        assert_eq!(c.allowed_links, vec!["https://t.me/ourgroup", "@ourbot"]);
        assert!(c.allowed_forward_chats.contains(&ChatId(-100123)));
        assert!(c.allowed_forward_chats.contains(&ChatId(-100456)));
        assert_eq!(c.allowed_forward_chats.len(), 2);
        assert!(!c.log_json);
    }

    #[test]
    fn strips_dotenv_quotes() {
        assert_eq!(strip_quotes("\"abc\""), "abc");
        assert_eq!(strip_quotes("'abc'"), "abc");
        assert_eq!(strip_quotes("\"abc"), "\"abc");
    }
}
