//! Per-user saving rules cache.
//!
//! The relational store is the source of truth; this cache is strictly a
//! read-side optimization with no write-back. Entries expire via
//! time-to-live, so a rules change becomes visible after at most one TTL
//! window. That staleness is acceptable: rules are re-evaluated fresh on
//! every delivery.

use std::sync::Arc;
use std::time::Duration;

use moka::sync::Cache;
use uuid::Uuid;

use sprout_core::rules::RuleConfig;

/// Default time-to-live for a user's cached rule set (5 minutes).
const DEFAULT_TTL_SECS: u64 = 300;

/// Default cache capacity (number of users).
const DEFAULT_CAPACITY: u64 = 10_000;

/// Cache of each user's rule set, keyed by user id.
///
/// Thread-safe and cheap to clone. `disabled()` builds a cache that
/// stores nothing, which pins every load to the store; tests use it to
/// keep rule reads fresh.
#[derive(Clone)]
pub struct RulesCache {
    cache: Option<Cache<Uuid, Arc<Vec<RuleConfig>>>>,
}

impl RulesCache {
    /// Creates a cache with default capacity and TTL.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(DEFAULT_CAPACITY, DEFAULT_TTL_SECS)
    }

    /// Creates a cache with custom capacity and TTL.
    #[must_use]
    pub fn with_config(max_capacity: u64, ttl_secs: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();
        Self { cache: Some(cache) }
    }

    /// Creates a cache that never stores anything.
    #[must_use]
    pub const fn disabled() -> Self {
        Self { cache: None }
    }

    /// Returns the cached rule set for a user, if present and fresh.
    #[must_use]
    pub fn get(&self, user_id: &Uuid) -> Option<Arc<Vec<RuleConfig>>> {
        self.cache.as_ref()?.get(user_id)
    }

    /// Stores a user's rule set.
    pub fn insert(&self, user_id: Uuid, rules: Arc<Vec<RuleConfig>>) {
        if let Some(cache) = &self.cache {
            cache.insert(user_id, rules);
        }
    }

    /// Drops a user's cached rules (called when rules are modified).
    pub fn invalidate(&self, user_id: &Uuid) {
        if let Some(cache) = &self.cache {
            cache.invalidate(user_id);
        }
    }
}

impl Default for RulesCache {
    fn default() -> Self {
        Self::new()
    }
}
