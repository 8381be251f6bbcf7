use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::error::Result;

/// The in-memory contents of a store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tables {
    pub maps: BTreeMap<String, BTreeMap<String, serde_json::Value>>,
    pub sets: BTreeMap<String, BTreeSet<String>>,
}

impl Tables {
    pub fn map(&self, name: &str) -> Option<&BTreeMap<String, serde_json::Value>> {
        self.maps.get(name)
    }

    /// Mutable access to a map, creating it when missing.
    pub fn map_mut(&mut self, name: &str) -> &mut BTreeMap<String, serde_json::Value> {
        self.maps.entry(name.to_string()).or_default()
    }

    pub fn set(&self, name: &str) -> Option<&BTreeSet<String>> {
        self.sets.get(name)
    }

    /// Mutable access to a set, creating it when missing.
    pub fn set_mut(&mut self, name: &str) -> &mut BTreeSet<String> {
        self.sets.entry(name.to_string()).or_default()
    }

    /// Deserialize the value stored under `key` in map `map`.
    pub fn get<T: DeserializeOwned>(&self, map: &str, key: &str) -> Result<Option<T>> {
        match self.map(map).and_then(|m| m.get(key)) {
            Some(value) => Ok(Some(serde_json::from_value(value.clone())?)),
            None => Ok(None),
        }
    }

    /// Serialize `value` under `key` in map `map`, returning the previous value.
    pub fn put<T: Serialize>(
        &mut self,
        map: &str,
        key: &str,
        value: &T,
    ) -> Result<Option<serde_json::Value>> {
        let value = serde_json::to_value(value)?;
        Ok(self.map_mut(map).insert(key.to_string(), value))
    }

    pub fn remove(&mut self, map: &str, key: &str) -> Option<serde_json::Value> {
        self.maps.get_mut(map).and_then(|m| m.remove(key))
    }

    pub fn contains(&self, set: &str, member: &str) -> bool {
        self.set(set).is_some_and(|s| s.contains(member))
    }

    pub fn is_empty(&self) -> bool {
        self.maps.values().all(BTreeMap::is_empty) && self.sets.values().all(BTreeSet::is_empty)
    }
}
