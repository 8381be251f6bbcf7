use std::error::Error as StdError;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Two abilities were registered under the same name. Startup-fatal.
    #[error("duplicate ability name `{name}`; make sure declared abilities don't clash with the built-in ones")]
    DuplicateAbilityName { name: String },

    /// An ability declaration is unusable (empty name, missing action).
    #[error("invalid ability `{name}`: {reason}")]
    InvalidAbility { name: String, reason: String },

    #[error(transparent)]
    Store(#[from] herald_store::Error),

    /// An ability's action or post-action returned an error.
    #[error("ability `{ability}` failed: {source}")]
    Action {
        ability: String,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    /// A reply's action returned an error.
    #[error("reply failed: {source}")]
    Reply {
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
}

impl Error {
    #[must_use]
    pub fn invalid_ability(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidAbility {
            name: name.into(),
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn action(ability: impl Into<String>, source: anyhow::Error) -> Self {
        Self::Action {
            ability: ability.into(),
            source: source.into(),
        }
    }

    #[must_use]
    pub fn reply(source: anyhow::Error) -> Self {
        Self::Reply {
            source: source.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
