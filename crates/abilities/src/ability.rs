use std::{fmt, future::Future, sync::Arc};

use futures::future::{BoxFuture, FutureExt};

use crate::{
    context::MessageContext,
    error::{Error, Result},
    flag::Flag,
    privacy::{Locality, Privacy},
    reply::Reply,
};

/// Async handler invoked with the context of one dispatched event.
pub type Action = Arc<dyn Fn(MessageContext) -> BoxFuture<'static, anyhow::Result<()>> + Send + Sync>;

pub(crate) fn action<F, Fut>(f: F) -> Action
where
    F: Fn(MessageContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    Arc::new(move |ctx| f(ctx).boxed())
}

/// A named command together with the checks that guard it.
///
/// Built once through [`Ability::builder`] and never mutated afterwards.
#[derive(Clone)]
pub struct Ability {
    name: String,
    info: Option<String>,
    privacy: Privacy,
    locality: Locality,
    input: usize,
    flags: Vec<Flag>,
    action: Action,
    post_action: Option<Action>,
    replies: Vec<Reply>,
}

impl Ability {
    pub fn builder(name: impl Into<String>) -> AbilityBuilder {
        AbilityBuilder {
            name: name.into(),
            info: None,
            privacy: Privacy::default(),
            locality: Locality::default(),
            input: 0,
            flags: Vec::new(),
            action: None,
            post_action: None,
            replies: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn info(&self) -> Option<&str> {
        self.info.as_deref()
    }

    pub fn privacy(&self) -> Privacy {
        self.privacy
    }

    pub fn locality(&self) -> Locality {
        self.locality
    }

    /// Required number of arguments; `0` disables the check.
    pub fn input(&self) -> usize {
        self.input
    }

    pub fn flags(&self) -> &[Flag] {
        &self.flags
    }

    pub fn replies(&self) -> &[Reply] {
        &self.replies
    }

    /// Whether `tokens` arguments satisfy the declared arity.
    pub fn accepts_input(&self, tokens: usize) -> bool {
        self.input == 0 || (tokens > 0 && tokens == self.input)
    }

    pub(crate) async fn run(&self, ctx: MessageContext) -> anyhow::Result<()> {
        (self.action)(ctx).await
    }

    pub(crate) async fn run_post(&self, ctx: MessageContext) -> anyhow::Result<()> {
        match &self.post_action {
            Some(post) => post(ctx).await,
            None => Ok(()),
        }
    }

    /// The same ability under another name, checked like a declared one.
    pub(crate) fn renamed(mut self, name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        validate_name(&name)?;
        self.name = name;
        Ok(self)
    }
}

impl fmt::Debug for Ability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ability")
            .field("name", &self.name)
            .field("info", &self.info)
            .field("privacy", &self.privacy)
            .field("locality", &self.locality)
            .field("input", &self.input)
            .field("flags", &self.flags)
            .field("replies", &self.replies.len())
            .finish_non_exhaustive()
    }
}

#[must_use]
pub struct AbilityBuilder {
    name: String,
    info: Option<String>,
    privacy: Privacy,
    locality: Locality,
    input: usize,
    flags: Vec<Flag>,
    action: Option<Action>,
    post_action: Option<Action>,
    replies: Vec<Reply>,
}

impl AbilityBuilder {
    /// One-line description shown by `/commands` and `/report`.
    pub fn info(mut self, info: impl Into<String>) -> Self {
        self.info = Some(info.into());
        self
    }

    pub fn privacy(mut self, privacy: Privacy) -> Self {
        self.privacy = privacy;
        self
    }

    pub fn locality(mut self, locality: Locality) -> Self {
        self.locality = locality;
        self
    }

    pub fn input(mut self, input: usize) -> Self {
        self.input = input;
        self
    }

    pub fn flag(mut self, flag: Flag) -> Self {
        self.flags.push(flag);
        self
    }

    pub fn flags(mut self, flags: impl IntoIterator<Item = Flag>) -> Self {
        self.flags.extend(flags);
        self
    }

    pub fn action<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(MessageContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.action = Some(action(f));
        self
    }

    /// Runs after the action returned `Ok`.
    pub fn post_action<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(MessageContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.post_action = Some(action(f));
        self
    }

    pub fn reply(mut self, reply: Reply) -> Self {
        self.replies.push(reply);
        self
    }

    pub fn build(self) -> Result<Ability> {
        validate_name(&self.name)?;
        let Some(action) = self.action else {
            return Err(Error::invalid_ability(self.name, "missing action"));
        };

        Ok(Ability {
            name: self.name,
            info: self.info,
            privacy: self.privacy,
            locality: self.locality,
            input: self.input,
            flags: self.flags,
            action,
            post_action: self.post_action,
            replies: self.replies,
        })
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::invalid_ability(name, "name must not be empty"));
    }
    if name.chars().any(char::is_whitespace) {
        return Err(Error::invalid_ability(
            name,
            "name must not contain whitespace",
        ));
    }
    Ok(())
}
