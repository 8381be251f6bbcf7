/// Config schema types (bot identity, Telegram transport, store, abilities, messages).
use std::{
    collections::{BTreeMap, BTreeSet},
    path::PathBuf,
};

use {
    secrecy::{ExposeSecret, Secret},
    serde::{Deserialize, Serialize},
};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HeraldConfig {
    pub bot: BotConfig,
    pub telegram: TelegramConfig,
    pub store: StoreConfig,
    pub abilities: AbilitiesConfig,
    /// Per-locale message overrides, keyed by language tag then message code.
    pub messages: MessagesConfig,
}

/// Who the bot is and who owns it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    /// Telegram user ID of the creator. The creator always resolves to the
    /// highest privacy level and can never be blacklisted.
    pub creator_id: i64,
    /// Bot username without the leading `@`. When unset it is fetched from
    /// Telegram at startup.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

/// Telegram transport settings.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    /// Bot token from @BotFather.
    #[serde(serialize_with = "serialize_secret")]
    pub token: Secret<String>,

    /// Long-polling timeout passed to `getUpdates` (seconds).
    pub poll_timeout_secs: u32,

    /// HTTP client timeout (seconds). Must exceed the long-polling timeout so
    /// the client doesn't abort the request before Telegram responds.
    pub client_timeout_secs: u64,

    /// Alternate Bot API endpoint, e.g. a local `telegram-bot-api` server.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
}

impl std::fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("token", &"[REDACTED]")
            .field("poll_timeout_secs", &self.poll_timeout_secs)
            .field("api_url", &self.api_url)
            .finish_non_exhaustive()
    }
}

fn serialize_secret<S: serde::Serializer>(
    secret: &Secret<String>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            token: Secret::new(String::new()),
            poll_timeout_secs: 30,
            client_timeout_secs: 45,
            api_url: None,
        }
    }
}

/// Where the ability store lives.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Path of the JSON store file. Defaults to `<data dir>/herald.db.json`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    /// Keep everything in memory; nothing survives a restart.
    pub in_memory: bool,
}

/// Switches for the built-in abilities.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AbilitiesConfig {
    /// Built-in abilities to leave out of the registry (e.g. `["ban", "unban"]`).
    pub off: BTreeSet<String>,
    /// Built-in abilities to register under a different name.
    pub rename: BTreeMap<String, String>,
}

/// Language tag → message code → template.
pub type MessagesConfig = BTreeMap<String, BTreeMap<String, String>>;
