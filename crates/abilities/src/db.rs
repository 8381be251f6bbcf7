//! Typed access to the well-known store tables.

use std::{collections::BTreeSet, sync::Arc};

use {
    herald_common::types::User,
    herald_store::{Store, StoreExt},
    tracing::debug,
};

use crate::error::Result;

/// Set of user IDs promoted to admin.
pub const ADMINS: &str = "ADMINS";
/// Map of user ID to the last seen profile.
pub const USERS: &str = "USERS";
/// Map of lowercased username to user ID.
pub const USER_ID: &str = "USER_ID";
/// Set of banned user IDs.
pub const BLACKLIST: &str = "BLACKLIST";

/// Normalize a username as typed by a user (`@Jane` → `jane`).
pub fn strip_tag(username: &str) -> String {
    username.trim().trim_start_matches('@').to_lowercase()
}

#[derive(Clone)]
pub struct Db {
    store: Arc<dyn Store>,
}

impl Db {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    pub fn commit(&self) -> Result<()> {
        Ok(self.store.commit()?)
    }

    pub fn is_admin(&self, id: i64) -> Result<bool> {
        self.contains(ADMINS, id)
    }

    pub fn admins(&self) -> Result<BTreeSet<i64>> {
        self.ids(ADMINS)
    }

    /// Returns `false` when the user already was an admin.
    pub fn add_admin(&self, id: i64) -> Result<bool> {
        self.insert(ADMINS, id)
    }

    /// Returns `false` when the user was not an admin.
    pub fn remove_admin(&self, id: i64) -> Result<bool> {
        self.remove(ADMINS, id)
    }

    pub fn is_blacklisted(&self, id: i64) -> Result<bool> {
        self.contains(BLACKLIST, id)
    }

    pub fn blacklist(&self) -> Result<BTreeSet<i64>> {
        self.ids(BLACKLIST)
    }

    /// Returns `false` when the user already was banned.
    pub fn ban(&self, id: i64) -> Result<bool> {
        self.insert(BLACKLIST, id)
    }

    /// Returns `false` when the user was not banned.
    pub fn unban(&self, id: i64) -> Result<bool> {
        self.remove(BLACKLIST, id)
    }

    pub fn user(&self, id: i64) -> Result<Option<User>> {
        let key = id.to_string();
        Ok(self.store.view(|t| t.get::<User>(USERS, &key))??)
    }

    /// Resolve a username (with or without `@`, any case) to a user ID.
    pub fn user_id(&self, username: &str) -> Result<Option<i64>> {
        let key = strip_tag(username);
        Ok(self.store.view(|t| t.get::<i64>(USER_ID, &key))??)
    }

    /// Record the latest profile of `user` and keep the username index in
    /// step, then commit.
    ///
    /// The whole read-modify-write runs inside one store write, so concurrent
    /// events from the same user cannot interleave. Returns `false` when the
    /// stored profile was already identical, in which case nothing is written.
    pub fn upsert_user(&self, user: &User) -> Result<bool> {
        let changed = self.store.update(|t| -> herald_store::Result<bool> {
            let key = user.id.to_string();
            let previous: Option<User> = t.get(USERS, &key)?;
            if previous.as_ref() == Some(user) {
                return Ok(false);
            }

            if let Some(old) = previous.as_ref().and_then(|p| p.username.as_deref()) {
                let old = old.to_lowercase();
                if t.get::<i64>(USER_ID, &old)? == Some(user.id) {
                    t.remove(USER_ID, &old);
                }
            }
            if let Some(username) = user.username.as_deref() {
                t.put(USER_ID, &username.to_lowercase(), &user.id)?;
            }
            t.put(USERS, &key, user)?;
            Ok(true)
        })??;

        if changed {
            debug!(user_id = user.id, "recorded user profile");
            self.store.commit()?;
        }
        Ok(changed)
    }

    fn contains(&self, set: &str, id: i64) -> Result<bool> {
        let member = id.to_string();
        Ok(self.store.view(|t| t.contains(set, &member))?)
    }

    fn insert(&self, set: &str, id: i64) -> Result<bool> {
        let member = id.to_string();
        Ok(self.store.update(|t| t.set_mut(set).insert(member))?)
    }

    fn remove(&self, set: &str, id: i64) -> Result<bool> {
        let member = id.to_string();
        Ok(self.store.update(|t| t.set_mut(set).remove(&member))?)
    }

    fn ids(&self, set: &str) -> Result<BTreeSet<i64>> {
        Ok(self.store.view(|t| {
            t.set(set)
                .map(|members| members.iter().filter_map(|m| m.parse().ok()).collect())
                .unwrap_or_default()
        })?)
    }
}
