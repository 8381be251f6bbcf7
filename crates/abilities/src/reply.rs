use std::{fmt, future::Future, sync::Arc};

use herald_common::types::Event;

use crate::{
    ability::{Action, action},
    context::MessageContext,
    flag::{self, Flag},
};

/// Predicate over an inbound event.
pub type Condition = Arc<dyn Fn(&Event) -> bool + Send + Sync>;

/// A conversational continuation, matched on the shape and content of an
/// event rather than on a command name.
///
/// Replies are checked before ability resolution, in registration order, and
/// the first enabled reply whose flags and conditions all hold handles the
/// event.
#[derive(Clone)]
pub struct Reply {
    flags: Vec<Flag>,
    conditions: Vec<Condition>,
    action: Action,
    enabled: bool,
}

impl Reply {
    pub fn builder<F, Fut>(f: F) -> ReplyBuilder
    where
        F: Fn(MessageContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        ReplyBuilder {
            flags: Vec::new(),
            conditions: Vec::new(),
            action: action(f),
            enabled: true,
        }
    }

    /// Shorthand for an enabled reply guarded by flags only.
    pub fn of<F, Fut>(f: F, flags: impl IntoIterator<Item = Flag>) -> Self
    where
        F: Fn(MessageContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        Self::builder(f).flags(flags).build()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn flags(&self) -> &[Flag] {
        &self.flags
    }

    /// Whether this reply should handle `event`.
    pub fn is_ok_for(&self, event: &Event) -> bool {
        self.enabled
            && flag::all_hold(&self.flags, event)
            && self.conditions.iter().all(|condition| condition(event))
    }

    pub(crate) async fn act_on(&self, ctx: MessageContext) -> anyhow::Result<()> {
        (self.action)(ctx).await
    }
}

impl fmt::Debug for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reply")
            .field("flags", &self.flags)
            .field("conditions", &self.conditions.len())
            .field("enabled", &self.enabled)
            .finish_non_exhaustive()
    }
}

#[must_use]
pub struct ReplyBuilder {
    flags: Vec<Flag>,
    conditions: Vec<Condition>,
    action: Action,
    enabled: bool,
}

impl ReplyBuilder {
    pub fn flag(mut self, flag: Flag) -> Self {
        self.flags.push(flag);
        self
    }

    pub fn flags(mut self, flags: impl IntoIterator<Item = Flag>) -> Self {
        self.flags.extend(flags);
        self
    }

    pub fn condition<F>(mut self, condition: F) -> Self
    where
        F: Fn(&Event) -> bool + Send + Sync + 'static,
    {
        self.conditions.push(Arc::new(condition));
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn build(self) -> Reply {
        Reply {
            flags: self.flags,
            conditions: self.conditions,
            action: self.action,
            enabled: self.enabled,
        }
    }
}

/// Condition: the event is a message replying to a message whose text is
/// exactly `text`.
pub fn is_reply_to(text: impl Into<String>) -> impl Fn(&Event) -> bool + Send + Sync + 'static {
    let text = text.into();
    move |event| {
        event
            .direct_message()
            .and_then(|m| m.reply_to.as_deref())
            .and_then(|original| original.text.as_deref())
            == Some(text.as_str())
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        herald_common::types::{Chat, Message, User},
    };

    fn reply_to(prompt: &str) -> Event {
        let message = Message::text(2, Chat::private(7), "answer")
            .replying_to(Message::text(1, Chat::private(7), prompt));
        Event::message(1, User::new(7, "Jane"), message)
    }

    #[test]
    fn all_conditions_must_hold() {
        let reply = Reply::builder(|_ctx| async { Ok(()) })
            .flag(Flag::Reply)
            .condition(is_reply_to("what's your name?"))
            .condition(|event| event.from.id == 7)
            .build();

        assert!(reply.is_ok_for(&reply_to("what's your name?")));
        assert!(!reply.is_ok_for(&reply_to("something else")));
        let plain = Event::text(3, User::new(7, "Jane"), Chat::private(7), "hi");
        assert!(!reply.is_ok_for(&plain));
    }

    #[test]
    fn disabled_reply_never_matches() {
        let reply = Reply::builder(|_ctx| async { Ok(()) })
            .flag(Flag::Text)
            .enabled(false)
            .build();
        let event = Event::text(1, User::new(7, "Jane"), Chat::private(7), "hi");
        assert!(!reply.is_enabled());
        assert!(!reply.is_ok_for(&event));
    }

    #[test]
    fn of_uses_flags_only() {
        let reply = Reply::of(|_ctx| async { Ok(()) }, [Flag::Text]);
        let event = Event::text(1, User::new(7, "Jane"), Chat::private(7), "hi");
        assert!(reply.is_ok_for(&event));
        assert_eq!(reply.flags(), &[Flag::Text]);
    }
}
