//! Telegram transport for the ability engine.
//!
//! Converts Bot API updates into engine events, runs the long-polling loop and
//! implements the outbound [`herald_abilities::MessageSender`] on top of
//! teloxide.

pub mod bot;
pub mod convert;
pub mod error;
pub mod outbound;

#[cfg(test)]
pub(crate) mod testing;

pub use {
    bot::{Connection, connect, register_commands, start_polling},
    convert::event_from_update,
    error::{Error, Result},
    outbound::TelegramSender,
};
