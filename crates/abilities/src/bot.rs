use std::{sync::Arc, time::Instant};

use {
    herald_common::types::Event,
    herald_store::{FileStore, Store},
    tracing::{debug, info, warn},
};

use crate::{
    ability::Ability,
    context::{BotContext, MessageContext, Shared},
    db::Db,
    defaults::{DEFAULT, DefaultAbilities},
    error::{Error, Result},
    flag,
    localize::{self, Arg, Localizer},
    privacy::Locality,
    registry::{AbilityExtension, Registry},
    reply::Reply,
    sender::{MessageSender, SilentSender},
    toggle::AbilityToggle,
};

/// Global admission predicate; events it refuses are dropped before anything
/// else happens.
pub type Admission = Arc<dyn Fn(&Event) -> bool + Send + Sync>;

/// Pipeline stage that dropped an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    Admission,
    Blacklisted,
    /// No ability matched the command, or no catch-all is registered.
    UnknownAbility,
    Privacy,
    Locality,
    Input,
    Flags,
}

/// What [`AbilityBot::dispatch`] did with an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    Rejected(Rejection),
    /// A reply intercepted the event.
    Replied,
    /// The named ability ran to completion.
    Executed { ability: String },
}

/// The dispatch engine: registries plus the collaborators actions run against.
pub struct AbilityBot {
    ctx: BotContext,
    admission: Option<Admission>,
}

impl AbilityBot {
    pub fn builder(
        creator_id: i64,
        username: impl Into<String>,
        sender: Arc<dyn MessageSender>,
    ) -> AbilityBotBuilder {
        AbilityBotBuilder {
            creator_id,
            username: username.into(),
            sender,
            store: None,
            localizer: Localizer::default(),
            toggle: AbilityToggle::default(),
            extensions: Vec::new(),
            admission: None,
        }
    }

    pub fn context(&self) -> &BotContext {
        &self.ctx
    }

    pub fn registry(&self) -> &Registry {
        self.ctx.registry()
    }

    pub fn db(&self) -> &Db {
        self.ctx.db()
    }

    /// Run one event through the pipeline.
    ///
    /// Rejections are reported as `Ok(Dispatch::Rejected(_))`; only store
    /// failures and failing actions come back as `Err`.
    pub async fn dispatch(&self, event: Event) -> Result<Dispatch> {
        let started = Instant::now();
        let update_id = event.update_id;
        let user_id = event.from.id;

        let outcome = self.pipeline(event).await;

        let elapsed_ms = started.elapsed().as_millis() as u64;
        match &outcome {
            Ok(dispatch) => {
                debug!(update_id, user_id, ?dispatch, elapsed_ms, "processed update");
            },
            Err(e) => {
                warn!(update_id, user_id, error = %e, elapsed_ms, "update failed");
            },
        }
        outcome
    }

    async fn pipeline(&self, event: Event) -> Result<Dispatch> {
        if !self.admits(&event) {
            return Ok(Dispatch::Rejected(Rejection::Admission));
        }
        if self.is_blacklisted(&event)? {
            debug!(user_id = event.from.id, "ignoring blacklisted user");
            return Ok(Dispatch::Rejected(Rejection::Blacklisted));
        }
        self.ctx.db().upsert_user(&event.from)?;

        if let Some(reply) = self.matching_reply(&event) {
            let ctx = self.message_context(event, Vec::new());
            reply.act_on(ctx).await.map_err(Error::reply)?;
            return Ok(Dispatch::Replied);
        }

        let (ability, arguments) = self.resolve(&event);
        let Some(ability) = ability else {
            return Ok(Dispatch::Rejected(Rejection::UnknownAbility));
        };

        let level = self.ctx.privacy_of(&event, event.from.id).await?;
        if level < ability.privacy() {
            debug!(ability = ability.name(), %level, required = %ability.privacy(), "insufficient privacy");
            self.notify(&event, localize::CHECK_PRIVACY_FAIL, &[]).await;
            return Ok(Dispatch::Rejected(Rejection::Privacy));
        }

        if !ability.locality().admits(Locality::of(&event)) {
            let locality = ability.locality().as_str();
            self.notify(&event, localize::CHECK_LOCALITY_FAIL, &[&locality])
                .await;
            return Ok(Dispatch::Rejected(Rejection::Locality));
        }

        if !ability.accepts_input(arguments.len()) {
            self.notify_input(&event, ability).await;
            return Ok(Dispatch::Rejected(Rejection::Input));
        }

        if !flag::all_hold(ability.flags(), &event) {
            return Ok(Dispatch::Rejected(Rejection::Flags));
        }

        let name = ability.name().to_string();
        let ctx = self.message_context(event, arguments);
        ability
            .run(ctx.clone())
            .await
            .map_err(|e| Error::action(&name, e))?;
        ability
            .run_post(ctx)
            .await
            .map_err(|e| Error::action(&name, e))?;

        Ok(Dispatch::Executed { ability: name })
    }

    fn admits(&self, event: &Event) -> bool {
        self.admission
            .as_ref()
            .is_none_or(|admission| admission(event))
    }

    fn is_blacklisted(&self, event: &Event) -> Result<bool> {
        let id = event.from.id;
        if self.ctx.is_creator(id) {
            return Ok(false);
        }
        self.ctx.db().is_blacklisted(id)
    }

    fn matching_reply(&self, event: &Event) -> Option<&Reply> {
        self.ctx
            .registry()
            .replies()
            .iter()
            .find(|reply| reply.is_ok_for(event))
    }

    /// Pick the ability for `event` and split out its arguments.
    ///
    /// Events without text go to the catch-all with no arguments. A leading
    /// `/command` (optionally addressed as `/command@botname`) selects that
    /// command and the remaining tokens are its arguments; any other text goes
    /// to the catch-all with every token as an argument.
    fn resolve(&self, event: &Event) -> (Option<&Ability>, Vec<String>) {
        let registry = self.ctx.registry();
        let Some(text) = event.text_body() else {
            return (registry.get(DEFAULT), Vec::new());
        };

        let mut tokens: Vec<String> = text.split_whitespace().map(str::to_string).collect();
        let command = tokens
            .first()
            .and_then(|token| token.strip_prefix('/'))
            .map(|command| self.strip_bot_username(command));

        match command {
            Some(command) => {
                tokens.remove(0);
                (registry.lookup(&command), tokens)
            },
            None => (registry.get(DEFAULT), tokens),
        }
    }

    /// Lower-case `command` and drop a trailing `@botname` addressed to us.
    fn strip_bot_username(&self, command: &str) -> String {
        let command = command.to_lowercase();
        let username = self.ctx.username();
        if username.is_empty() {
            return command;
        }
        let mention = format!("@{}", username.to_lowercase());
        match command.strip_suffix(&mention) {
            Some(stripped) => stripped.to_string(),
            None => command,
        }
    }

    fn message_context(&self, event: Event, arguments: Vec<String>) -> MessageContext {
        let user = event.from.clone();
        let chat_id = event.chat_id();
        MessageContext::new(event, user, chat_id, arguments, self.ctx.clone())
    }

    async fn notify(&self, event: &Event, code: &str, args: &[Arg<'_>]) {
        let text = self
            .ctx
            .localizer()
            .get(code, event.from.language_code.as_deref(), args);
        self.ctx.silent().send(&text, event.chat_id()).await;
    }

    async fn notify_input(&self, event: &Event, ability: &Ability) {
        let language = event.from.language_code.as_deref();
        let noun_code = if ability.input() == 1 {
            localize::CHECK_INPUT_SINGULAR
        } else {
            localize::CHECK_INPUT_PLURAL
        };
        let noun = self.ctx.localizer().get(noun_code, language, &[]);
        let input = ability.input();
        self.notify(event, localize::CHECK_INPUT_FAIL, &[&input, &noun])
            .await;
    }
}

#[must_use]
pub struct AbilityBotBuilder {
    creator_id: i64,
    username: String,
    sender: Arc<dyn MessageSender>,
    store: Option<Arc<dyn Store>>,
    localizer: Localizer,
    toggle: AbilityToggle,
    extensions: Vec<Box<dyn AbilityExtension>>,
    admission: Option<Admission>,
}

impl AbilityBotBuilder {
    /// Defaults to an in-memory store.
    pub fn store(mut self, store: Arc<dyn Store>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn localizer(mut self, localizer: Localizer) -> Self {
        self.localizer = localizer;
        self
    }

    /// Switch built-in abilities off or rename them.
    pub fn toggle(mut self, toggle: AbilityToggle) -> Self {
        self.toggle = toggle;
        self
    }

    /// Register an extension. Extensions are consulted after the built-ins,
    /// in the order they were added.
    pub fn extension(mut self, extension: impl AbilityExtension + 'static) -> Self {
        self.extensions.push(Box::new(extension));
        self
    }

    pub fn admission<F>(mut self, admission: F) -> Self
    where
        F: Fn(&Event) -> bool + Send + Sync + 'static,
    {
        self.admission = Some(Arc::new(admission));
        self
    }

    /// Build the registries. Fails on duplicate or invalid abilities.
    pub fn build(self) -> Result<AbilityBot> {
        let defaults = DefaultAbilities::new(self.creator_id, self.localizer.clone(), self.toggle);
        let mut sources: Vec<&dyn AbilityExtension> = Vec::with_capacity(self.extensions.len() + 1);
        sources.push(&defaults);
        sources.extend(self.extensions.iter().map(|extension| &**extension));
        let registry = Registry::build(&sources)?;

        let store: Arc<dyn Store> = match self.store {
            Some(store) => store,
            None => Arc::new(FileStore::in_memory()),
        };
        info!(
            creator_id = self.creator_id,
            username = %self.username,
            abilities = registry.len(),
            replies = registry.replies().len(),
            "ability bot ready"
        );

        let ctx = BotContext::new(Shared {
            creator_id: self.creator_id,
            username: self.username,
            db: Db::new(store),
            silent: SilentSender::new(self.sender),
            localizer: self.localizer,
            registry,
        });
        Ok(AbilityBot {
            ctx,
            admission: self.admission,
        })
    }
}
