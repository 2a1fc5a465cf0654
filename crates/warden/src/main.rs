use std::sync::Arc;

use warden_core::{config, config::Config, logging};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let (level, json) = config::logging_from_env();
    logging::init("warden", &level, json)?;

    let cfg = match Config::load() {
        Ok(cfg) => Arc::new(cfg),
        Err(e) => {
            tracing::error!(event = "config_invalid", detail = %e);
            return Err(e.into());
        }
    };

    tracing::info!(
        event = "starting",
        community = %cfg.community_name,
        version = env!("CARGO_PKG_VERSION"),
    );

    warden_telegram::router::run_polling(cfg)
        .await
        .map_err(|e| anyhow::anyhow!("telegram bot failed: {e}"))?;

    Ok(())
}
