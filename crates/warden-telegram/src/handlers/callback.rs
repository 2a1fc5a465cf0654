use std::sync::Arc;

use teloxide::types::CallbackQuery;

use warden_core::formatting::log_detail;

use crate::{convert, router::AppState};

pub(super) async fn handle_callback(q: CallbackQuery, state: Arc<AppState>) {
    let Some(press) = convert::button_press(&q) else {
        // Always answer, or the client keeps its spinner.
        if let Err(e) = state.messenger.answer_button(&q.id, None).await {
            tracing::debug!(
                event = "answer_skip",
                op = "answer_callback_query",
                detail = %log_detail(&e),
            );
        }
        return;
    };

    let selection = state.relay.handle_button(&press).await;
    tracing::info!(
        event = "button",
        user_id = press.from.0,
        selection = ?selection,
    );
}
