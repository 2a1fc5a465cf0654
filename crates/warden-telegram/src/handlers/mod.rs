//! Telegram update handlers.
//!
//! Each endpoint converts the update into `warden-core` inbound types and runs the core
//! work in its own task, so a panic in one update is logged and the dispatcher keeps
//! serving.

use std::{future::Future, sync::Arc};

use teloxide::{
    prelude::*,
    types::{CallbackQuery, Message},
};

use crate::router::AppState;
mod callback;
mod commands;
mod group;
mod private;

async fn isolated(
    update_id: i32,
    kind: &'static str,
    work: impl Future<Output = ()> + Send + 'static,
) {
    if let Err(e) = tokio::spawn(work).await {
        tracing::error!(
            event = "update_failed",
            update_id = update_id,
            kind = kind,
            detail = %e,
        );
    }
}

pub async fn handle_callback(
    upd: Update,
    q: CallbackQuery,
    state: Arc<AppState>,
) -> ResponseResult<()> {
    isolated(upd.id, "callback_query", callback::handle_callback(q, state)).await;
    Ok(())
}

pub async fn handle_message(upd: Update, msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    if msg.chat.is_private() {
        isolated(upd.id, "private_message", private::handle_private(msg, state)).await;
    } else if msg.chat.is_group() || msg.chat.is_supergroup() {
        isolated(upd.id, "group_message", group::handle_group(msg, state)).await;
    }
    Ok(())
}
