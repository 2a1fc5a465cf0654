use tracing_subscriber::{fmt, EnvFilter};

use crate::{errors::Error, Result};

/// Initialize tracing for the bot.
///
/// `RUST_LOG` wins over `default_level`. With `json` set, every event is written as one
/// JSON object per line (fields such as `event`, `chat_id`, `user_id` stay structured).
pub fn init(service_name: &str, default_level: &str, json: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = default_level.to_lowercase();
        EnvFilter::new(format!(
            "warn,warden={level},warden_core={level},warden_telegram={level},{service_name}={level}"
        ))
    });

    let builder = fmt().with_env_filter(filter).with_target(false);
    let res = if json {
        builder.json().flatten_event(true).try_init()
    } else {
        builder.with_ansi(true).try_init()
    };

    res.map_err(|e| Error::Config(format!("failed to install tracing subscriber: {e}")))
}
