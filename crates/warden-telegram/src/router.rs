use std::sync::Arc;

use teloxide::{
    dispatching::Dispatcher,
    dptree,
    error_handlers::LoggingErrorHandler,
    prelude::*,
    update_listeners::Polling,
};

use warden_core::messaging::throttled::{ThrottleConfig, ThrottledMessenger};
use warden_core::{
    community::CommunityService, config::Config, messaging::port::MessagingPort,
    moderation::ModerationService, notice::NoticeScheduler, relay::RelayService,
};

use crate::handlers;
use crate::TelegramMessenger;

#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<Config>,
    pub messenger: Arc<dyn MessagingPort>,
    pub notices: NoticeScheduler,
    pub moderation: Arc<ModerationService>,
    pub relay: Arc<RelayService>,
    pub community: Arc<CommunityService>,
}

impl AppState {
    pub fn new(cfg: Arc<Config>, messenger: Arc<dyn MessagingPort>) -> Self {
        let notices = NoticeScheduler::new(messenger.clone());
        Self {
            moderation: Arc::new(ModerationService::new(
                &cfg,
                messenger.clone(),
                notices.clone(),
            )),
            relay: Arc::new(RelayService::new(
                cfg.operator_id,
                messenger.clone(),
                cfg.relay_capacity,
            )),
            community: Arc::new(CommunityService::new(
                &cfg,
                messenger.clone(),
                notices.clone(),
            )),
            notices,
            messenger,
            cfg,
        }
    }
}

pub async fn run_polling(cfg: Arc<Config>) -> anyhow::Result<()> {
    let bot = Bot::new(cfg.bot_token.clone());

    // Wrap the raw Telegram messenger with a throttling decorator to stay under the flood
    // limits. The adapter still retries once on RetryAfter.
    let raw_messenger: Arc<dyn MessagingPort> = Arc::new(TelegramMessenger::new(bot.clone()));
    let messenger: Arc<dyn MessagingPort> = Arc::new(ThrottledMessenger::new(
        raw_messenger,
        ThrottleConfig::default(),
    ));

    let state = Arc::new(AppState::new(cfg.clone(), messenger));

    // Resolve the contact link once up front; a failure here is retried lazily.
    match state.community.contact_link().await {
        Some(link) => tracing::info!(event = "startup", contact_link = %link),
        None => tracing::warn!(event = "startup", detail = "contact link unknown"),
    }
    tracing::info!(
        event = "startup",
        operator_id = cfg.operator_id.0,
        group_id = cfg.group_id.map(|g| g.0),
        relay_capacity = cfg.relay_capacity,
    );

    let handler = dptree::entry()
        .branch(Update::filter_callback_query().endpoint(handlers::handle_callback))
        .branch(Update::filter_message().endpoint(handlers::handle_message));

    let listener = polling_listener(bot.clone());
    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state.clone()])
        .enable_ctrlc_handler()
        .build()
        .dispatch_with_listener(
            listener,
            LoggingErrorHandler::with_custom_text("An error from the update listener"),
        )
        .await;

    state.notices.shutdown();
    tracing::info!(event = "shutdown");

    Ok(())
}

/// Long polling that discards the backlog queued while the bot was down, so a restart
/// neither re-welcomes old joins nor moderates stale messages.
fn polling_listener(bot: Bot) -> Polling<Bot> {
    Polling::builder(bot).drop_pending_updates().build()
}
