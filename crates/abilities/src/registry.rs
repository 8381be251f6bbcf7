use std::{collections::HashMap, sync::Arc};

use tracing::debug;

use crate::{
    ability::Ability,
    error::{Error, Result},
    reply::Reply,
};

/// A source of abilities and replies.
///
/// The built-in [`DefaultAbilities`](crate::DefaultAbilities) is one; bots add
/// their own through [`AbilityBotBuilder::extension`](crate::AbilityBotBuilder::extension).
pub trait AbilityExtension: Send + Sync {
    fn abilities(&self) -> Result<Vec<Ability>>;

    /// Replies that are not tied to any ability.
    fn replies(&self) -> Result<Vec<Reply>> {
        Ok(Vec::new())
    }
}

/// The immutable ability and reply registries of a bot.
#[derive(Clone, Default)]
pub struct Registry {
    abilities: Arc<[Ability]>,
    index: Arc<HashMap<String, usize>>,
    replies: Arc<[Reply]>,
}

impl Registry {
    /// Collect abilities and replies from `sources`, in order.
    ///
    /// Ability names must be unique (case-sensitive). Replies embedded in
    /// abilities come first, in ability order, followed by every source's
    /// standalone replies.
    pub fn build(sources: &[&dyn AbilityExtension]) -> Result<Self> {
        let mut abilities = Vec::new();
        let mut index = HashMap::new();
        let mut standalone = Vec::new();

        for source in sources {
            for ability in source.abilities()? {
                if index.contains_key(ability.name()) {
                    return Err(Error::DuplicateAbilityName {
                        name: ability.name().to_string(),
                    });
                }
                index.insert(ability.name().to_string(), abilities.len());
                abilities.push(ability);
            }
            standalone.extend(source.replies()?);
        }

        let replies: Vec<Reply> = abilities
            .iter()
            .flat_map(|ability| ability.replies().iter().cloned())
            .chain(standalone)
            .collect();

        debug!(
            abilities = abilities.len(),
            replies = replies.len(),
            "built ability registry"
        );
        Ok(Self {
            abilities: abilities.into(),
            index: Arc::new(index),
            replies: replies.into(),
        })
    }

    /// Exact, case-sensitive lookup.
    pub fn get(&self, name: &str) -> Option<&Ability> {
        self.index.get(name).map(|&i| &self.abilities[i])
    }

    /// Resolve a command token, ignoring case.
    ///
    /// An ability registered under the lowercased token wins; otherwise the
    /// first ability (in registration order) whose name matches ignoring case.
    pub fn lookup(&self, token: &str) -> Option<&Ability> {
        let lowered = token.to_lowercase();
        self.get(&lowered).or_else(|| {
            self.abilities
                .iter()
                .find(|ability| ability.name().to_lowercase() == lowered)
        })
    }

    /// Abilities in registration order.
    pub fn abilities(&self) -> &[Ability] {
        &self.abilities
    }

    /// Replies in evaluation order.
    pub fn replies(&self) -> &[Reply] {
        &self.replies
    }

    pub fn len(&self) -> usize {
        self.abilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.abilities.is_empty()
    }
}
