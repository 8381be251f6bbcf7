//! Configuration loading and env substitution.
//!
//! Config files: `herald.toml`, `herald.yaml`, or `herald.json`
//! Searched in `./` then `~/.config/herald/`.
//!
//! `${ENV_VAR}` and `${ENV_VAR:-fallback}` placeholders are expanded before
//! parsing.

pub mod env_subst;
pub mod loader;
pub mod schema;

pub use {
    loader::{config_dir, data_dir, discover_and_load, load_config},
    schema::{AbilitiesConfig, BotConfig, HeraldConfig, MessagesConfig, StoreConfig, TelegramConfig},
};
