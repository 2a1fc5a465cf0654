use std::sync::Arc;

use teloxide::types::Message;

use warden_core::relay::{OperatorRoute, RelayOutcome};

use crate::{convert, router::AppState};

use super::commands::{self, Command};

pub(super) async fn handle_private(msg: Message, state: Arc<AppState>) {
    let text = msg.text().unwrap_or_default();
    if let Some(cmd) = Command::parse(text) {
        commands::handle_command(cmd, &msg, &state).await;
        return;
    }
    // Unknown commands are not relayed.
    if commands::looks_like_command(text) {
        return;
    }

    let Some(pm) = convert::private_message(&msg) else {
        return;
    };

    if state.relay.is_operator(pm.from.id) {
        let route = state.relay.route_operator_message(&pm).await;
        if let OperatorRoute::Delivered(target) = route {
            tracing::info!(event = "operator_reply", user_id = target.0);
        }
        return;
    }

    if let RelayOutcome::Delivered { relayed } = state.relay.relay_to_operator(&pm).await {
        tracing::info!(
            event = "relayed",
            user_id = pm.from.id.0,
            message_id = relayed.message_id.0,
        );
    }
}
