//! In-memory TTL cache for feature lookups and GitHub API responses.
//!
//! Entries expire lazily: `get` and `has` drop an entry once its deadline has
//! passed, so [`Cache::prune`] only reclaims memory early. There is no
//! capacity bound; entry counts are bounded by the feature catalog and by the
//! size of one pull request.

use parking_lot::Mutex;
use serde::Serialize;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

use crate::types::BaselineFeature;

/// Default TTL for feature lookups (24 hours)
pub const FEATURE_TTL: Duration = Duration::from_secs(86_400);

/// Default TTL for fetched diffs (10 minutes)
pub const DIFF_TTL: Duration = Duration::from_secs(600);

/// Default TTL for GitHub API responses (5 minutes)
pub const API_TTL: Duration = Duration::from_secs(300);

#[derive(Debug, Clone)]
struct CacheEntry<T> {
    data: T,
    timestamp: Instant,
    expires_at: Instant,
}

impl<T> CacheEntry<T> {
    fn is_expired(&self, now: Instant) -> bool {
        now > self.expires_at
    }
}

/// Cache size snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub size: usize,
}

/// Key-value store whose entries expire after a TTL.
#[derive(Debug)]
pub struct Cache<T> {
    entries: Mutex<HashMap<String, CacheEntry<T>>>,
    default_ttl: Duration,
}

impl<T: Clone> Cache<T> {
    /// Create a cache whose entries live for `default_ttl` unless overridden
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            default_ttl,
        }
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Store a value with the default TTL
    pub fn set(&self, key: impl Into<String>, value: T) {
        self.set_with_ttl(key, value, self.default_ttl);
    }

    /// Store a value with an explicit TTL
    pub fn set_with_ttl(&self, key: impl Into<String>, value: T, ttl: Duration) {
        let now = Instant::now();
        let entry = CacheEntry {
            data: value,
            timestamp: now,
            expires_at: now + ttl,
        };
        self.entries.lock().insert(key.into(), entry);
    }

    /// Get a value if present and unexpired
    pub fn get(&self, key: &str) -> Option<T> {
        let mut entries = self.entries.lock();
        let now = Instant::now();

        let expired = entries.get(key)?.is_expired(now);
        if expired {
            entries.remove(key);
            return None;
        }
        entries.get(key).map(|entry| entry.data.clone())
    }

    /// Check whether an unexpired value exists
    pub fn has(&self, key: &str) -> bool {
        let mut entries = self.entries.lock();
        let now = Instant::now();

        match entries.get(key).map(|entry| entry.is_expired(now)) {
            Some(true) => {
                entries.remove(key);
                false
            }
            Some(false) => true,
            None => false,
        }
    }

    /// Time since an unexpired entry was stored
    pub fn age(&self, key: &str) -> Option<Duration> {
        let entries = self.entries.lock();
        let now = Instant::now();
        entries
            .get(key)
            .filter(|entry| !entry.is_expired(now))
            .map(|entry| now.duration_since(entry.timestamp))
    }

    /// Remove a value. Returns whether it was present.
    pub fn delete(&self, key: &str) -> bool {
        self.entries.lock().remove(key).is_some()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    /// Remove every expired entry. Returns how many were removed.
    pub fn prune(&self) -> usize {
        let mut entries = self.entries.lock();
        let now = Instant::now();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        let pruned = before - entries.len();

        if pruned > 0 {
            tracing::debug!(pruned, "pruned expired cache entries");
        }
        pruned
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            size: self.entries.lock().len(),
        }
    }

    /// Return the cached value, or run `factory` once and cache its result.
    ///
    /// The lock is not held while the factory runs, so concurrent callers for
    /// the same key may each run the factory; the last write wins.
    pub async fn get_or_set<F, Fut, E>(
        &self,
        key: &str,
        factory: F,
        ttl: Option<Duration>,
    ) -> std::result::Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
    {
        if let Some(value) = self.get(key) {
            return Ok(value);
        }

        let value = factory().await?;
        self.set_with_ttl(key, value.clone(), ttl.unwrap_or(self.default_ttl));
        Ok(value)
    }
}

/// Statistics for every cache in a [`CacheSet`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheSetStats {
    pub features: CacheStats,
    pub diffs: CacheStats,
    pub api: CacheStats,
}

/// The caches owned by one check run.
#[derive(Debug, Clone)]
pub struct CacheSet {
    /// Resolved features, keyed by [`feature_key`]
    pub features: Arc<Cache<BaselineFeature>>,
    /// Raw diff text, keyed by [`diff_key`]
    pub diffs: Arc<Cache<String>>,
    /// Short-lived GitHub lookups, keyed by [`comment_key`]
    pub api: Arc<Cache<u64>>,
}

impl CacheSet {
    pub fn new() -> Self {
        Self {
            features: Arc::new(Cache::new(FEATURE_TTL)),
            diffs: Arc::new(Cache::new(DIFF_TTL)),
            api: Arc::new(Cache::new(API_TTL)),
        }
    }

    pub fn stats(&self) -> CacheSetStats {
        CacheSetStats {
            features: self.features.stats(),
            diffs: self.diffs.stats(),
            api: self.api.stats(),
        }
    }

    /// Prune expired entries from every cache. Returns the total removed.
    pub fn prune_all(&self) -> usize {
        self.features.prune() + self.diffs.prune() + self.api.prune()
    }
}

impl Default for CacheSet {
    fn default() -> Self {
        Self::new()
    }
}

/// Cache key for a feature lookup
pub fn feature_key(feature_id: &str) -> String {
    format!("feature:{feature_id}")
}

/// Cache key for a pull request diff
pub fn diff_key(owner: &str, repo: &str, pull_number: u64) -> String {
    format!("diff:{owner}/{repo}#{pull_number}")
}

/// Cache key for the id of the report comment on a pull request
pub fn comment_key(owner: &str, repo: &str, pull_number: u64) -> String {
    format!("comment:{owner}/{repo}#{pull_number}")
}
