use std::{sync::Arc, time::Duration};

use chrono::Utc;

use crate::{
    config::Config,
    domain::{MessageRef, Participant, ParticipantStatus},
    formatting::log_detail,
    messaging::{port::MessagingPort, types::GroupMessage},
    moderation::{
        classifier::{Classifier, MessageContent, Verdict, ViolationReason},
        ledger::{consequence_for, Consequence, OffenseLedger},
    },
    notice::NoticeScheduler,
    texts,
};

/// Result of moderating one group message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModerationOutcome {
    pub verdict: Verdict,
    /// Offense count after this message (only for violations).
    pub offense_count: Option<u32>,
    pub consequence: Option<Consequence>,
}

impl ModerationOutcome {
    fn clean() -> Self {
        Self {
            verdict: Verdict::Clean,
            offense_count: None,
            consequence: None,
        }
    }
}

/// Applies the community rules to group messages.
///
/// Owns the offense ledger. Transport failures are logged and swallowed; the offense count
/// is incremented even if every side effect fails.
pub struct ModerationService {
    classifier: Classifier,
    ledger: OffenseLedger,
    messenger: Arc<dyn MessagingPort>,
    notices: NoticeScheduler,
    mute_duration: Duration,
    notice_ttl: Duration,
}

impl ModerationService {
    pub fn new(cfg: &Config, messenger: Arc<dyn MessagingPort>, notices: NoticeScheduler) -> Self {
        Self {
            classifier: Classifier::new(
                &cfg.allowed_links,
                cfg.allowed_forward_chats.clone(),
                cfg.emoji_limit,
            ),
            ledger: OffenseLedger::new(),
            messenger,
            notices,
            mute_duration: cfg.mute_duration,
            notice_ttl: cfg.notice_ttl,
        }
    }

    pub fn ledger(&self) -> &OffenseLedger {
        &self.ledger
    }

    pub async fn handle_group_message(&self, msg: &GroupMessage) -> ModerationOutcome {
        let status = self.lookup_status(msg).await;
        let content = MessageContent {
            text: &msg.text,
            forward: msg.forward,
        };

        match self.classifier.classify(&content, status) {
            Verdict::Clean => ModerationOutcome::clean(),
            Verdict::Violation(reason) => self.enforce(msg, reason).await,
        }
    }

    async fn lookup_status(&self, msg: &GroupMessage) -> Option<ParticipantStatus> {
        match self
            .messenger
            .participant_status(msg.message.chat_id, msg.from.id)
            .await
        {
            Ok(s) => Some(s),
            Err(e) => {
                tracing::warn!(
                    event = "status_lookup_failed",
                    op = "get_chat_member",
                    chat_id = msg.message.chat_id.0,
                    user_id = msg.from.id.0,
                    detail = %log_detail(&e),
                );
                None
            }
        }
    }

    async fn enforce(&self, msg: &GroupMessage, reason: ViolationReason) -> ModerationOutcome {
        let chat_id = msg.message.chat_id;
        let user_id = msg.from.id;

        self.delete_offending(msg.message, &msg.from).await;

        let count = self.ledger.record_offense(user_id).await;
        let consequence = consequence_for(count, Utc::now(), self.mute_duration);

        tracing::info!(
            event = "violation",
            chat_id = chat_id.0,
            user_id = user_id.0,
            message_id = msg.message.message_id.0,
            reason = reason.code(),
            warns = count,
        );

        let mute_hours = self.mute_duration.as_secs() / 3600;
        let notice = match consequence {
            Consequence::Warn => texts::warning_notice(&msg.from, reason, mute_hours),
            Consequence::Mute { until } => {
                if let Err(e) = self
                    .messenger
                    .restrict_participant(chat_id, user_id, until)
                    .await
                {
                    tracing::error!(
                        event = "restrict_failed",
                        op = "restrict_chat_member",
                        chat_id = chat_id.0,
                        user_id = user_id.0,
                        detail = %log_detail(&e),
                    );
                }
                texts::mute_notice(&msg.from, reason, mute_hours)
            }
        };

        if let Err(e) = self
            .notices
            .send_ephemeral(chat_id, &notice, None, self.notice_ttl)
            .await
        {
            tracing::error!(
                event = "notice_failed",
                op = "send_message",
                chat_id = chat_id.0,
                user_id = user_id.0,
                detail = %log_detail(&e),
            );
        }

        ModerationOutcome {
            verdict: Verdict::Violation(reason),
            offense_count: Some(count),
            consequence: Some(consequence),
        }
    }

    async fn delete_offending(&self, msg: MessageRef, from: &Participant) {
        if let Err(e) = self.messenger.delete_message(msg).await {
            tracing::warn!(
                event = "delete_failed",
                op = "delete_message",
                chat_id = msg.chat_id.0,
                user_id = from.id.0,
                message_id = msg.message_id.0,
                detail = %log_detail(&e),
            );
        }
    }
}
