/// Core error type for the bot.
///
/// Adapter crates map their specific errors into this type so the moderation and relay
/// services can log every failure the same way (operation name + truncated detail).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("transport error in {op}: {detail}")]
    Transport { op: &'static str, detail: String },

    #[error("external error: {0}")]
    External(String),
}

impl Error {
    pub fn transport(op: &'static str, detail: impl Into<String>) -> Self {
        Self::Transport {
            op,
            detail: detail.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
