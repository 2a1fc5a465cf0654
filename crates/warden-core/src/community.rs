//! Community-facing surface: welcome notices and the "contact the admin" link.

use std::{sync::Arc, time::Duration};

use tokio::sync::RwLock;

use crate::{
    config::Config,
    formatting::log_detail,
    messaging::{
        port::MessagingPort,
        types::{InlineButton, InlineKeyboard, MembersJoined, ReplyMarkup},
    },
    notice::NoticeScheduler,
    texts,
};

/// Deep link that opens a private chat with the bot.
pub fn link_for_handle(handle: &str) -> String {
    format!("https://t.me/{}?start=contact", handle.trim_start_matches('@'))
}

/// Resolves the bot's contact link: explicit config first, then the configured handle,
/// then the bot's own identity. A successful lookup is cached; failures are retried later.
pub struct ContactLink {
    cached: RwLock<Option<String>>,
}

impl ContactLink {
    pub fn new(cfg: &Config) -> Self {
        let configured = cfg
            .bot_link
            .clone()
            .or_else(|| cfg.bot_username.as_deref().map(link_for_handle));
        Self {
            cached: RwLock::new(configured),
        }
    }

    pub async fn resolve(&self, messenger: &dyn MessagingPort) -> Option<String> {
        if let Some(link) = self.cached.read().await.clone() {
            return Some(link);
        }

        let identity = match messenger.self_identity().await {
            Ok(me) => me,
            Err(e) => {
                tracing::error!(event = "bot_link_fail", op = "get_me", detail = %log_detail(&e));
                return None;
            }
        };
        let link = link_for_handle(identity.handle.as_deref().filter(|h| !h.is_empty())?);

        tracing::info!(event = "bot_link_ready", detail = %link);
        *self.cached.write().await = Some(link.clone());
        Some(link)
    }
}

pub struct CommunityService {
    messenger: Arc<dyn MessagingPort>,
    notices: NoticeScheduler,
    contact: ContactLink,
    community_name: String,
    welcome_ttl: Duration,
}

impl CommunityService {
    pub fn new(cfg: &Config, messenger: Arc<dyn MessagingPort>, notices: NoticeScheduler) -> Self {
        Self {
            messenger,
            notices,
            contact: ContactLink::new(cfg),
            community_name: cfg.community_name.clone(),
            welcome_ttl: cfg.welcome_ttl,
        }
    }

    pub fn community_name(&self) -> &str {
        &self.community_name
    }

    pub async fn contact_link(&self) -> Option<String> {
        self.contact.resolve(self.messenger.as_ref()).await
    }

    /// URL button to the bot's private chat, if the link is known.
    pub async fn contact_markup(&self) -> Option<ReplyMarkup> {
        let url = self.contact_link().await?;
        Some(
            InlineKeyboard::single(InlineButton::Url {
                label: texts::CONTACT_BUTTON.to_string(),
                url,
            })
            .into(),
        )
    }

    /// Greet every human newcomer with a notice that disappears after the welcome TTL.
    ///
    /// Returns how many welcome notices went out.
    pub async fn welcome(&self, joined: &MembersJoined) -> usize {
        let mut sent = 0;
        for member in joined.members.iter().filter(|m| !m.is_bot) {
            let link = self.contact_link().await;
            let html = texts::welcome(&member.first_name, &self.community_name, link.as_deref());

            match self
                .notices
                .send_ephemeral(joined.chat_id, &html, None, self.welcome_ttl)
                .await
            {
                Ok(_) => sent += 1,
                Err(e) => tracing::error!(
                    event = "welcome_failed",
                    op = "send_message",
                    chat_id = joined.chat_id.0,
                    user_id = member.id.0,
                    detail = %log_detail(&e),
                ),
            }
        }
        sent
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::{
        domain::{ChatId, Participant, UserId},
        messaging::fake::FakeMessenger,
    };

    fn config(extra: &[(&str, &str)]) -> Config {
        let mut env = HashMap::from([
            ("BOT_TOKEN", "t"),
            ("OPERATOR_ID", "1"),
            ("COMMUNITY_NAME", "San Juan Online"),
        ]);
        env.extend(extra.iter().copied());
        Config::from_lookup(|k| env.get(k).map(|v| v.to_string())).unwrap()
    }

    fn member(id: i64, is_bot: bool) -> Participant {
        Participant {
            id: UserId(id),
            username: None,
            first_name: format!("user{id}"),
            is_bot,
        }
    }

    #[test]
    fn handle_links_drop_the_at_sign() {
        assert_eq!(
            link_for_handle("@WardenBot"),
            "https://t.me/WardenBot?start=contact"
        );
    }

    #[tokio::test]
    async fn configured_link_wins_over_identity() {
        let fake = FakeMessenger::new();
        fake.fail("me");

        let explicit = ContactLink::new(&config(&[("BOT_LINK", "https://example.org/contact")]));
        assert_eq!(
            explicit.resolve(&fake).await.as_deref(),
            Some("https://example.org/contact")
        );

        let by_name = ContactLink::new(&config(&[("BOT_USERNAME", "sjbot")]));
        assert_eq!(
            by_name.resolve(&fake).await.as_deref(),
            Some("https://t.me/sjbot?start=contact")
        );
    }

    #[tokio::test]
    async fn falls_back_to_own_identity_and_degrades_without_it() {
        let link = ContactLink::new(&config(&[]));
        assert_eq!(
            link.resolve(&FakeMessenger::new()).await.as_deref(),
            Some("https://t.me/warden_bot?start=contact")
        );

        let unknown = ContactLink::new(&config(&[]));
        assert_eq!(unknown.resolve(&FakeMessenger::without_handle()).await, None);
    }

    #[tokio::test]
    async fn welcomes_humans_only_and_schedules_cleanup() {
        let fake = Arc::new(FakeMessenger::new());
        let svc = CommunityService::new(
            &config(&[("WELCOME_TTL_SECS", "0")]),
            fake.clone(),
            NoticeScheduler::new(fake.clone()),
        );

        let joined = MembersJoined {
            chat_id: ChatId(-100),
            members: vec![member(2, false), member(3, true), member(4, false)],
        };
        assert_eq!(svc.welcome(&joined).await, 2);

        let texts = fake.sent_texts(ChatId(-100));
        assert!(texts[0].contains("user2"));
        assert!(texts[0].contains("San Juan Online"));
        assert!(texts[0].contains("?start=contact"));
        assert!(texts[1].contains("user4"));

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(fake.deleted().len(), 2);
    }

    #[tokio::test]
    async fn contact_markup_is_omitted_when_link_unknown() {
        let fake = Arc::new(FakeMessenger::without_handle());
        let svc = CommunityService::new(&config(&[]), fake.clone(), NoticeScheduler::new(fake));
        assert_eq!(svc.contact_markup().await, None);
    }
}
