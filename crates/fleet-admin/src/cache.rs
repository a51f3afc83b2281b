//! Key-value cache with per-entry expiry.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Duration, Utc};
use futures::future::BoxFuture;
use futures::FutureExt;
use tracing::debug;

use crate::error::Result;

/// A string cache with get / set-with-TTL / delete / exists.
///
/// Keys are the same opaque ids the document store uses, usually prefixed
/// with the kind of entry (`profile:<id>`).
pub trait KeyValueCache: Send + Sync {
    /// Returns the live value under `key`.
    fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<Option<String>>>;

    /// Stores `value` under `key` for `ttl`.
    fn set_with_ttl<'a>(
        &'a self,
        key: &'a str,
        value: String,
        ttl: Duration,
    ) -> BoxFuture<'a, Result<()>>;

    /// Removes `key`, returning whether a live entry was removed.
    fn delete<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<bool>>;

    /// Returns whether a live entry exists under `key`.
    fn exists<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<bool>>;
}

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: DateTime<Utc>,
}

impl Entry {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// In-process [`KeyValueCache`].
///
/// Expired entries behave as absent and are evicted when touched.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns whether nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Drops every expired entry and returns how many were dropped.
    pub fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        before - entries.len()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Entry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn live(&self, key: &str) -> Option<String> {
        let now = Utc::now();
        let mut entries = self.lock();
        match entries.get(key) {
            Some(entry) if entry.is_expired(now) => {
                entries.remove(key);
                debug!(key, "evicted expired cache entry");
                None
            }
            Some(entry) => Some(entry.value.clone()),
            None => None,
        }
    }
}

impl KeyValueCache for MemoryCache {
    fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<Option<String>>> {
        async move { Ok(self.live(key)) }.boxed()
    }

    fn set_with_ttl<'a>(
        &'a self,
        key: &'a str,
        value: String,
        ttl: Duration,
    ) -> BoxFuture<'a, Result<()>> {
        async move {
            let expires_at = Utc::now()
                .checked_add_signed(ttl)
                .unwrap_or(DateTime::<Utc>::MAX_UTC);
            self.lock()
                .insert(key.to_string(), Entry { value, expires_at });
            Ok(())
        }
        .boxed()
    }

    fn delete<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<bool>> {
        async move {
            let now = Utc::now();
            let removed = self.lock().remove(key);
            Ok(removed.is_some_and(|entry| !entry.is_expired(now)))
        }
        .boxed()
    }

    fn exists<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<bool>> {
        async move { Ok(self.live(key).is_some()) }.boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get_delete() {
        let cache = MemoryCache::new();
        assert_eq!(cache.get("profile:1").await.unwrap(), None);

        cache
            .set_with_ttl("profile:1", "ada".to_string(), Duration::minutes(5))
            .await
            .unwrap();
        assert_eq!(cache.get("profile:1").await.unwrap().as_deref(), Some("ada"));
        assert!(cache.exists("profile:1").await.unwrap());

        assert!(cache.delete("profile:1").await.unwrap());
        assert!(!cache.delete("profile:1").await.unwrap());
        assert!(!cache.exists("profile:1").await.unwrap());
    }

    #[tokio::test]
    async fn test_expired_entries_are_absent_and_evicted() {
        let cache = MemoryCache::new();
        cache
            .set_with_ttl("profile:2", "grace".to_string(), Duration::zero())
            .await
            .unwrap();
        assert_eq!(cache.len(), 1);

        assert!(!cache.exists("profile:2").await.unwrap());
        assert!(cache.is_empty());
        assert_eq!(cache.get("profile:2").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_purge_expired() {
        let cache = MemoryCache::new();
        cache
            .set_with_ttl("old", "x".to_string(), Duration::seconds(-1))
            .await
            .unwrap();
        cache
            .set_with_ttl("new", "y".to_string(), Duration::hours(1))
            .await
            .unwrap();
        assert_eq!(cache.purge_expired(), 1);
        assert_eq!(cache.len(), 1);
        assert!(cache.exists("new").await.unwrap());
    }

    #[tokio::test]
    async fn test_set_overwrites_and_refreshes() {
        let cache = MemoryCache::new();
        cache
            .set_with_ttl("k", "first".to_string(), Duration::zero())
            .await
            .unwrap();
        cache
            .set_with_ttl("k", "second".to_string(), Duration::hours(1))
            .await
            .unwrap();
        assert_eq!(cache.get("k").await.unwrap().as_deref(), Some("second"));
    }
}
