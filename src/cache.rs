// ABOUTME: Fixed-capacity in-memory cache with oldest-insertion eviction
// ABOUTME: Structured keys give each per-user record type its own namespace
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Bounded Cache
//!
//! Capacity-bounded key/value store fronting the durable store. Eviction is
//! by oldest insertion sequence, not access recency; the relaxed policy is
//! deliberate and keeps observable hit behavior simple. A sweep triggered by
//! an over-capacity insertion frees down to capacity minus a buffer so a
//! single hot insert does not thrash repeated evictions.

use crate::config::CacheConfig;
use crate::errors::AppResult;
use chrono::NaiveDate;
use dashmap::DashMap;
use serde::{de::DeserializeOwned, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};

/// Cache entry: serialized payload plus insertion sequence for eviction order
struct CacheEntry {
    data: Vec<u8>,
    seq: u64,
}

/// Structured cache key with per-resource namespaces
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Owning user
    pub user_id: String,
    /// Record type being cached
    pub resource: CacheResource,
}

impl CacheKey {
    /// Create a key for `user_id` and `resource`
    #[must_use]
    pub fn new(user_id: impl Into<String>, resource: CacheResource) -> Self {
        Self {
            user_id: user_id.into(),
            resource,
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "user:{}:{}", self.user_id, self.resource)
    }
}

/// Per-user record types, each under its own key namespace
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheResource {
    /// Onboarded user profile
    Profile,
    /// Accumulated grocery list
    GroceryList,
    /// Cart item selections
    CartSelection,
    /// Meal rating history
    Ratings,
    /// Streak and points state
    Streak,
    /// Meal plan for one UTC day
    MealPlan {
        /// Plan day
        date: NaiveDate,
    },
    /// Meal log for one UTC day
    MealLog {
        /// Log day
        date: NaiveDate,
    },
}

impl fmt::Display for CacheResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Profile => write!(f, "profile"),
            Self::GroceryList => write!(f, "grocery_list"),
            Self::CartSelection => write!(f, "cart"),
            Self::Ratings => write!(f, "ratings"),
            Self::Streak => write!(f, "streak"),
            Self::MealPlan { date } => write!(f, "meal_plan:{date}"),
            Self::MealLog { date } => write!(f, "meal_log:{date}"),
        }
    }
}

/// Capacity-bounded cache with oldest-insertion-order eviction
pub struct BoundedCache {
    store: DashMap<String, CacheEntry>,
    seq: AtomicU64,
    config: CacheConfig,
}

impl BoundedCache {
    /// Create an empty cache with the given capacity settings
    #[must_use]
    pub fn new(config: CacheConfig) -> Self {
        Self {
            store: DashMap::new(),
            seq: AtomicU64::new(0),
            config,
        }
    }

    /// Store a value, evicting oldest entries if capacity is exceeded.
    ///
    /// The entry written by this call is never removed by its own sweep.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn put<T: Serialize>(&self, key: &CacheKey, value: &T) -> AppResult<()> {
        let data = serde_json::to_vec(value)?;
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        let key_str = key.to_string();
        self.store.insert(key_str.clone(), CacheEntry { data, seq });

        if self.store.len() > self.config.max_entries {
            self.evict_oldest(&key_str);
        }
        Ok(())
    }

    /// Fetch and deserialize a value, `None` on miss.
    ///
    /// # Errors
    ///
    /// Returns an error if a present entry fails to deserialize.
    pub fn get<T: DeserializeOwned>(&self, key: &CacheKey) -> AppResult<Option<T>> {
        match self.store.get(&key.to_string()) {
            Some(entry) => Ok(Some(serde_json::from_slice(&entry.data)?)),
            None => Ok(None),
        }
    }

    /// Remove one entry
    pub fn remove(&self, key: &CacheKey) {
        self.store.remove(&key.to_string());
    }

    /// Current entry count
    #[must_use]
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Whether the cache holds no entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Evict oldest-insertion entries until under capacity minus the buffer.
    ///
    /// `protect` is the key written by the triggering `put`. Entries that
    /// vanish between snapshot and removal are simply skipped; the cache may
    /// sit a few entries over capacity until the next sweep, which is valid.
    fn evict_oldest(&self, protect: &str) {
        let buffer = (self.config.max_entries as f64 * self.config.eviction_buffer) as usize;
        let target = self.config.max_entries.saturating_sub(buffer).max(1);
        let over = self.store.len().saturating_sub(target);
        if over == 0 {
            return;
        }

        let mut candidates: Vec<(String, u64)> = self
            .store
            .iter()
            .filter(|e| e.key() != protect)
            .map(|e| (e.key().clone(), e.value().seq))
            .collect();
        candidates.sort_by_key(|(_, seq)| *seq);

        let mut removed = 0usize;
        for (key, _) in candidates.into_iter().take(over) {
            if self.store.remove(&key).is_some() {
                removed += 1;
            } else {
                warn!(key, "cache entry disappeared during eviction sweep");
            }
        }
        debug!(removed, remaining = self.store.len(), "cache eviction sweep");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_cache(max: usize) -> BoundedCache {
        BoundedCache::new(CacheConfig {
            max_entries: max,
            eviction_buffer: 0.10,
        })
    }

    fn profile_key(id: &str) -> CacheKey {
        CacheKey::new(id, CacheResource::Profile)
    }

    #[test]
    fn put_then_get_round_trips() {
        let cache = small_cache(10);
        let key = profile_key("u1");
        cache.put(&key, &"hello".to_owned()).unwrap();
        let got: Option<String> = cache.get(&key).unwrap();
        assert_eq!(got.as_deref(), Some("hello"));
    }

    #[test]
    fn namespaces_do_not_collide() {
        let cache = small_cache(10);
        cache
            .put(&CacheKey::new("u1", CacheResource::Profile), &1_u32)
            .unwrap();
        cache
            .put(&CacheKey::new("u1", CacheResource::Streak), &2_u32)
            .unwrap();
        let profile: Option<u32> = cache.get(&profile_key("u1")).unwrap();
        assert_eq!(profile, Some(1));
    }

    #[test]
    fn eviction_frees_down_to_buffer_and_keeps_newest() {
        let cache = small_cache(10);
        for i in 0..11 {
            let key = profile_key(&format!("u{i}"));
            cache.put(&key, &i).unwrap();
        }
        // Sweep target is capacity minus 10% buffer.
        assert!(cache.len() <= 9);
        // The entry that triggered the sweep survives it.
        let newest: Option<i32> = cache.get(&profile_key("u10")).unwrap();
        assert_eq!(newest, Some(10));
        // The oldest insertion went first.
        let oldest: Option<i32> = cache.get(&profile_key("u0")).unwrap();
        assert_eq!(oldest, None);
    }

    #[test]
    fn remove_is_idempotent() {
        let cache = small_cache(10);
        let key = profile_key("u1");
        cache.put(&key, &42_u32).unwrap();
        cache.remove(&key);
        cache.remove(&key);
        let got: Option<u32> = cache.get(&key).unwrap();
        assert_eq!(got, None);
    }
}
