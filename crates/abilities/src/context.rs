use std::sync::Arc;

use {
    herald_common::types::{Event, User},
    tracing::debug,
};

use crate::{
    db::Db,
    error::Result,
    localize::{Arg, Localizer},
    privacy::Privacy,
    registry::Registry,
    sender::{MessageSender, SilentSender},
};

/// Shared collaborators of a running bot, cheap to clone.
#[derive(Clone)]
pub struct BotContext {
    inner: Arc<Shared>,
}

pub(crate) struct Shared {
    pub creator_id: i64,
    pub username: String,
    pub db: Db,
    pub silent: SilentSender,
    pub localizer: Localizer,
    pub registry: Registry,
}

impl BotContext {
    pub(crate) fn new(shared: Shared) -> Self {
        Self {
            inner: Arc::new(shared),
        }
    }

    pub fn creator_id(&self) -> i64 {
        self.inner.creator_id
    }

    pub fn is_creator(&self, user_id: i64) -> bool {
        user_id == self.inner.creator_id
    }

    /// Bot username without the leading `@`.
    pub fn username(&self) -> &str {
        &self.inner.username
    }

    pub fn db(&self) -> &Db {
        &self.inner.db
    }

    /// The outbound sender, reporting errors.
    pub fn sender(&self) -> &Arc<dyn MessageSender> {
        self.inner.silent.inner()
    }

    /// The outbound sender, logging and swallowing errors.
    pub fn silent(&self) -> &SilentSender {
        &self.inner.silent
    }

    pub fn localizer(&self) -> &Localizer {
        &self.inner.localizer
    }

    pub fn registry(&self) -> &Registry {
        &self.inner.registry
    }

    /// Privacy level of `user_id` for `event`; the first matching rule wins.
    ///
    /// 1. the creator is [`Privacy::Creator`];
    /// 2. members of the admin set are [`Privacy::Admin`];
    /// 3. in groups, chat administrators are [`Privacy::GroupAdmin`];
    /// 4. everyone else is [`Privacy::Public`].
    ///
    /// A failed administrator lookup counts as "not an administrator".
    pub async fn privacy_of(&self, event: &Event, user_id: i64) -> Result<Privacy> {
        if self.is_creator(user_id) {
            return Ok(Privacy::Creator);
        }
        if self.db().is_admin(user_id)? {
            return Ok(Privacy::Admin);
        }
        if event.is_group_message() && self.is_group_admin(event.chat_id(), user_id).await {
            return Ok(Privacy::GroupAdmin);
        }
        Ok(Privacy::Public)
    }

    async fn is_group_admin(&self, chat_id: i64, user_id: i64) -> bool {
        let admins = self
            .silent()
            .chat_administrators(chat_id)
            .await
            .unwrap_or_default();
        let found = admins.contains(&user_id);
        debug!(chat_id, user_id, admins = admins.len(), found, "checked group admins");
        found
    }
}

/// Everything an action gets to see about the event it handles.
#[derive(Clone)]
pub struct MessageContext {
    event: Event,
    user: User,
    chat_id: i64,
    arguments: Vec<String>,
    bot: BotContext,
}

impl MessageContext {
    pub fn new(event: Event, user: User, chat_id: i64, arguments: Vec<String>, bot: BotContext) -> Self {
        Self {
            event,
            user,
            chat_id,
            arguments,
            bot,
        }
    }

    pub fn event(&self) -> &Event {
        &self.event
    }

    /// The requester.
    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn chat_id(&self) -> i64 {
        self.chat_id
    }

    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }

    pub fn first_arg(&self) -> Option<&str> {
        self.arguments.first().map(String::as_str)
    }

    pub fn bot(&self) -> &BotContext {
        &self.bot
    }

    /// Localize `code` for the requester's language.
    pub fn localize(&self, code: &str, args: &[Arg<'_>]) -> String {
        self.bot
            .localizer()
            .get(code, self.user.language_code.as_deref(), args)
    }

    /// Send `text` to the chat the event came from, logging failures.
    pub async fn reply(&self, text: &str) -> Option<()> {
        self.bot.silent().send(text, self.chat_id).await
    }

    /// Send the localized `code` to the chat the event came from.
    pub async fn reply_localized(&self, code: &str, args: &[Arg<'_>]) -> Option<()> {
        let text = self.localize(code, args);
        self.reply(&text).await
    }
}
