//! Cache-aside profile reads.

use std::sync::Arc;

use chrono::Duration;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::cache::KeyValueCache;
use crate::error::{AdminError, Result};
use crate::store::DocumentStore;

/// Collection holding user profiles.
pub const PROFILES: &str = "profiles";

/// An operator's account profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Display name.
    pub name: String,
    /// Contact email.
    pub email: String,
    /// Operating company.
    #[serde(default)]
    pub company: Option<String>,
    /// Operator licence number.
    #[serde(default)]
    pub operator_licence: Option<String>,
}

/// Profile access with the cache consulted ahead of the store.
///
/// Reads go cache, then store, then repopulate the cache. Writes go to the
/// store and invalidate the cached copy. A failing cache never fails a read.
pub struct ProfileService {
    store: Arc<dyn DocumentStore>,
    cache: Arc<dyn KeyValueCache>,
    ttl: Duration,
}

impl ProfileService {
    /// Creates a service caching reads for `ttl`.
    pub fn new(store: Arc<dyn DocumentStore>, cache: Arc<dyn KeyValueCache>, ttl: Duration) -> Self {
        Self { store, cache, ttl }
    }

    /// Returns the cache key for a profile id.
    pub fn cache_key(id: &str) -> String {
        format!("profile:{id}")
    }

    /// Stores a new profile and returns its id.
    pub async fn create_profile(&self, profile: &Profile) -> Result<String> {
        let id = self
            .store
            .create(PROFILES, serde_json::to_value(profile)?)
            .await?;
        info!(id = %id, "profile created");
        Ok(id)
    }

    /// Reads a profile, from the cache when possible.
    pub async fn get_profile(&self, id: &str) -> Result<Option<Profile>> {
        let key = Self::cache_key(id);

        match self.cache.get(&key).await {
            Ok(Some(cached)) => match serde_json::from_str(&cached) {
                Ok(profile) => {
                    debug!(key = %key, "profile cache hit");
                    return Ok(Some(profile));
                }
                Err(e) => {
                    warn!(key = %key, error = %e, "discarding undecodable cached profile");
                    self.invalidate(&key).await;
                }
            },
            Ok(None) => debug!(key = %key, "profile cache miss"),
            Err(e) => warn!(key = %key, error = %e, "profile cache read failed"),
        }

        let Some(doc) = self.store.get(PROFILES, id).await? else {
            return Ok(None);
        };
        let profile: Profile = serde_json::from_value(doc.body)?;

        match serde_json::to_string(&profile) {
            Ok(encoded) => match self.cache.set_with_ttl(&key, encoded, self.ttl).await {
                Ok(()) => debug!(key = %key, ttl_secs = self.ttl.num_seconds(), "profile cache populated"),
                Err(e) => warn!(key = %key, error = %e, "profile cache write failed"),
            },
            Err(e) => warn!(key = %key, error = %e, "profile not cacheable"),
        }
        Ok(Some(profile))
    }

    /// Writes a profile to the store and drops its cached copy.
    pub async fn update_profile(&self, id: &str, profile: &Profile) -> Result<()> {
        self.store
            .update(PROFILES, id, serde_json::to_value(profile)?)
            .await?;
        self.invalidate(&Self::cache_key(id)).await;
        info!(id, "profile updated");
        Ok(())
    }

    /// Deletes a profile and its cached copy.
    pub async fn delete_profile(&self, id: &str) -> Result<()> {
        if !self.store.delete(PROFILES, id).await? {
            return Err(AdminError::NotFound {
                collection: PROFILES.to_string(),
                id: id.to_string(),
            });
        }
        self.invalidate(&Self::cache_key(id)).await;
        Ok(())
    }

    async fn invalidate(&self, key: &str) {
        match self.cache.delete(key).await {
            Ok(true) => debug!(key, "profile cache invalidated"),
            Ok(false) => {}
            Err(e) => warn!(key, error = %e, "profile cache invalidation failed"),
        }
    }
}
