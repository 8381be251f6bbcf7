//! Ability dispatch engine.
//!
//! An [`AbilityBot`] owns two immutable registries, one of named commands
//! ([`Ability`]) and one of conversational continuations ([`Reply`]), and
//! runs every inbound [`Event`](herald_common::types::Event) through a fixed
//! pipeline: admission, blacklist, identity upsert, reply interception,
//! ability resolution, privacy, locality, input arity, message flags, action,
//! post-action.

pub mod ability;
pub mod bot;
pub mod context;
pub mod db;
pub mod defaults;
pub mod error;
pub mod flag;
pub mod localize;
pub mod privacy;
pub mod registry;
pub mod reply;
pub mod sender;
pub mod toggle;

#[cfg(test)]
pub(crate) mod testing;

pub use {
    ability::{Ability, AbilityBuilder, Action},
    bot::{AbilityBot, AbilityBotBuilder, Admission, Dispatch, Rejection},
    context::{BotContext, MessageContext},
    db::Db,
    defaults::DefaultAbilities,
    error::{Error, Result},
    flag::Flag,
    localize::Localizer,
    privacy::{Locality, Privacy},
    registry::{AbilityExtension, Registry},
    reply::{Reply, ReplyBuilder, is_reply_to},
    sender::{MessageSender, SilentSender},
    toggle::AbilityToggle,
};
