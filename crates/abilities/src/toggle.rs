use std::collections::{BTreeMap, BTreeSet};

use {herald_config::AbilitiesConfig, tracing::debug};

use crate::{ability::Ability, error::Result};

/// Switches built-in abilities off or renames them before registration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AbilityToggle {
    off: BTreeSet<String>,
    rename: BTreeMap<String, String>,
}

impl AbilityToggle {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn turn_off(mut self, name: impl Into<String>) -> Self {
        self.off.insert(name.into());
        self
    }

    #[must_use]
    pub fn rename(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.rename.insert(from.into(), to.into());
        self
    }

    pub fn is_off(&self, ability: &Ability) -> bool {
        self.off.contains(ability.name())
    }

    /// Apply the toggle to a list of built-in abilities. Fails when a rename
    /// target is not a valid ability name.
    pub fn apply(&self, abilities: Vec<Ability>) -> Result<Vec<Ability>> {
        abilities
            .into_iter()
            .filter(|ability| {
                let off = self.is_off(ability);
                if off {
                    debug!(ability = ability.name(), "built-in ability turned off");
                }
                !off
            })
            .map(|ability| self.process(ability))
            .collect()
    }

    fn process(&self, ability: Ability) -> Result<Ability> {
        match self.rename.get(ability.name()) {
            Some(name) => {
                debug!(from = ability.name(), to = %name, "renamed built-in ability");
                ability.renamed(name.clone())
            },
            None => Ok(ability),
        }
    }
}

impl From<&AbilitiesConfig> for AbilityToggle {
    fn from(config: &AbilitiesConfig) -> Self {
        Self {
            off: config.off.clone(),
            rename: config.rename.clone(),
        }
    }
}
