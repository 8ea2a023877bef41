//! Reader profiles: the external collaborator the recommendation engine
//! reads from.
//!
//! Account CRUD lives outside the core; this module defines the collaborator
//! interface and an in-memory implementation for tests and embedded use.

use ahash::AHashMap;
use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::{AlexandriaError, Result};

/// A reader profile, keyed by email.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub email: String,
    pub username: String,
    /// Append-only, ordered query strings. No dedup is enforced.
    #[serde(default)]
    pub search_history: Vec<String>,
    /// Append-only book ids, used as an exclusion filter.
    #[serde(default)]
    pub read_books: Vec<String>,
}

impl UserProfile {
    pub fn new(email: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            username: username.into(),
            search_history: Vec::new(),
            read_books: Vec::new(),
        }
    }
}

/// Append-only patch for a profile update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfilePatch {
    #[serde(default)]
    pub push_search_history: Vec<String>,
    #[serde(default)]
    pub push_read_books: Vec<String>,
}

/// Profile storage collaborator, keyed by email.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Look up a profile. `Ok(None)` is a normal miss, not an error.
    async fn find(&self, email: &str) -> Result<Option<UserProfile>>;

    /// Insert a new profile; returns its id. Duplicate emails are rejected.
    async fn insert(&self, profile: UserProfile) -> Result<String>;

    /// Apply an append-only patch to an existing profile.
    async fn update(&self, email: &str, patch: ProfilePatch) -> Result<()>;

    /// Delete a profile.
    async fn delete(&self, email: &str) -> Result<()>;
}

/// In-memory profile store.
pub struct InMemoryProfileStore {
    profiles: RwLock<AHashMap<String, UserProfile>>,
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        Self {
            profiles: RwLock::new(AHashMap::new()),
        }
    }
}

impl Default for InMemoryProfileStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn find(&self, email: &str) -> Result<Option<UserProfile>> {
        Ok(self.profiles.read().get(email).cloned())
    }

    async fn insert(&self, profile: UserProfile) -> Result<String> {
        let mut profiles = self.profiles.write();
        if profiles.contains_key(&profile.email) {
            return Err(AlexandriaError::invalid_argument(format!(
                "email '{}' already exists",
                profile.email
            )));
        }
        let id = profile.email.clone();
        profiles.insert(id.clone(), profile);
        Ok(id)
    }

    async fn update(&self, email: &str, patch: ProfilePatch) -> Result<()> {
        let mut profiles = self.profiles.write();
        let profile = profiles
            .get_mut(email)
            .ok_or_else(|| AlexandriaError::not_found(format!("profile '{email}'")))?;
        profile.search_history.extend(patch.push_search_history);
        profile.read_books.extend(patch.push_read_books);
        Ok(())
    }

    async fn delete(&self, email: &str) -> Result<()> {
        let mut profiles = self.profiles.write();
        profiles
            .remove(email)
            .map(|_| ())
            .ok_or_else(|| AlexandriaError::not_found(format!("profile '{email}'")))
    }
}
