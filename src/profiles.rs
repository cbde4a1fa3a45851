// ABOUTME: Cache-aside repository for every per-user record type
// ABOUTME: Cache is written first so reads stay consistent while the store degrades
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Profile Store
//!
//! Cache-aside repository composing [`BoundedCache`] and
//! [`PersistenceAdapter`]. Saves sanitize input, write the cache immediately,
//! then attempt the durable write; a durable failure is logged and absorbed
//! so subsequent reads in this process still observe the update
//! (degrade-to-cache). Reads check the cache, fall back to read-through, and
//! populate the cache on a durable hit.

use crate::cache::{BoundedCache, CacheKey, CacheResource};
use crate::errors::{AppError, AppResult};
use crate::models::{
    CartSelection, GroceryList, MealLog, MealPlan, MealRating, StreakState, UserProfile,
};
use crate::sanitize::{normalize_tag, sanitize, validate_age, validate_name};
use crate::store::adapter::PersistenceAdapter;
use crate::store::paths;
use chrono::NaiveDate;
use dashmap::DashMap;
use serde::{de::DeserializeOwned, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Authoritative in-process view of all per-user records
pub struct ProfileStore {
    cache: BoundedCache,
    adapter: PersistenceAdapter,
    user_locks: DashMap<String, Arc<Mutex<()>>>,
}

impl ProfileStore {
    /// Compose a store from its cache and persistence layers
    #[must_use]
    pub fn new(cache: BoundedCache, adapter: PersistenceAdapter) -> Self {
        Self {
            cache,
            adapter,
            user_locks: DashMap::new(),
        }
    }

    /// Mutex serializing read-modify-write cycles for one user.
    ///
    /// Scoped per identity so distinct users never contend.
    #[must_use]
    pub fn user_lock(&self, user_id: &str) -> Arc<Mutex<()>> {
        self.user_locks
            .entry(user_id.to_owned())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Drop lock registry entries no caller currently holds.
    ///
    /// An entry whose only reference is the registry's own is not held by
    /// any in-flight operation and can be recreated on demand. Keeps the
    /// registry bounded by the active user set rather than the lifetime
    /// user population; intended to run on a low-frequency background tick.
    pub fn sweep_locks(&self) {
        let before = self.user_locks.len();
        self.user_locks
            .retain(|_, lock| Arc::strong_count(lock) > 1);
        let removed = before.saturating_sub(self.user_locks.len());
        if removed > 0 {
            debug!(removed, "swept idle user locks");
        }
    }

    /// Number of lock registry entries currently tracked
    #[must_use]
    pub fn tracked_locks(&self) -> usize {
        self.user_locks.len()
    }

    /// Fetch a user profile.
    ///
    /// # Errors
    ///
    /// Returns a `NotFound` error when no profile exists anywhere, which is
    /// the normal first-time-user outcome.
    pub async fn get_profile(&self, user_id: &str) -> AppResult<UserProfile> {
        let key = CacheKey::new(user_id, CacheResource::Profile);
        self.load(&key, &paths::profile(user_id))
            .await?
            .ok_or_else(|| AppError::not_found(format!("no profile for {user_id}")))
    }

    /// Validate, sanitize, and save a user profile.
    ///
    /// # Errors
    ///
    /// Returns a validation error before any state mutation if the name or
    /// age is out of shape. A durable-store failure is absorbed.
    pub async fn save_profile(&self, profile: UserProfile) -> AppResult<()> {
        let sanitized = UserProfile {
            name: validate_name(&profile.name)?,
            age: validate_age(profile.age)?,
            region: normalize_tag(&profile.region),
            medical_conditions: profile
                .medical_conditions
                .iter()
                .map(|c| normalize_tag(c))
                .filter(|c| !c.is_empty())
                .collect(),
            ..profile
        };
        let key = CacheKey::new(&sanitized.user_id, CacheResource::Profile);
        let path = paths::profile(&sanitized.user_id);
        self.store(&key, &path, &sanitized).await
    }

    /// Fetch a user's grocery list, empty if none saved yet.
    ///
    /// # Errors
    ///
    /// Returns an error if a cached entry fails to deserialize.
    pub async fn grocery_list(&self, user_id: &str) -> AppResult<GroceryList> {
        let key = CacheKey::new(user_id, CacheResource::GroceryList);
        Ok(self
            .load(&key, &paths::grocery_list(user_id))
            .await?
            .unwrap_or_default())
    }

    /// Save a grocery list, sanitizing each item.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub async fn save_grocery_list(&self, user_id: &str, list: GroceryList) -> AppResult<()> {
        let sanitized = GroceryList {
            items: list
                .items
                .iter()
                .map(|item| sanitize(item, 100))
                .filter(|item| !item.is_empty())
                .collect(),
        };
        let key = CacheKey::new(user_id, CacheResource::GroceryList);
        self.store(&key, &paths::grocery_list(user_id), &sanitized)
            .await
    }

    /// Fetch a user's cart selections, empty if none saved yet.
    ///
    /// # Errors
    ///
    /// Returns an error if a cached entry fails to deserialize.
    pub async fn cart(&self, user_id: &str) -> AppResult<CartSelection> {
        let key = CacheKey::new(user_id, CacheResource::CartSelection);
        Ok(self
            .load(&key, &paths::cart(user_id))
            .await?
            .unwrap_or_default())
    }

    /// Save cart selections.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub async fn save_cart(&self, user_id: &str, cart: CartSelection) -> AppResult<()> {
        let key = CacheKey::new(user_id, CacheResource::CartSelection);
        self.store(&key, &paths::cart(user_id), &cart).await
    }

    /// Rating history for a user, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if a cached entry fails to deserialize.
    pub async fn ratings(&self, user_id: &str) -> AppResult<Vec<MealRating>> {
        let key = CacheKey::new(user_id, CacheResource::Ratings);
        Ok(self
            .load(&key, &paths::ratings(user_id))
            .await?
            .unwrap_or_default())
    }

    /// Append one meal rating, sanitizing free-text fields.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub async fn add_rating(&self, user_id: &str, rating: MealRating) -> AppResult<()> {
        let _guard = self.user_lock(user_id).lock_owned().await;
        let mut history = self.ratings(user_id).await?;
        history.push(MealRating {
            meal_name: sanitize(&rating.meal_name, 100),
            feedback: sanitize(&rating.feedback, 500),
            ..rating
        });
        let key = CacheKey::new(user_id, CacheResource::Ratings);
        self.store(&key, &paths::ratings(user_id), &history).await
    }

    /// Names of meals this user has thumbed down, for recommendation exclusion
    ///
    /// # Errors
    ///
    /// Returns an error if the rating history fails to load.
    pub async fn disliked_meals(&self, user_id: &str) -> AppResult<BTreeSet<String>> {
        Ok(self
            .ratings(user_id)
            .await?
            .into_iter()
            .filter(|r| !r.liked)
            .map(|r| r.meal_name)
            .collect())
    }

    /// Fetch streak state, default zero state if none saved yet.
    ///
    /// # Errors
    ///
    /// Returns an error if a cached entry fails to deserialize.
    pub async fn streak(&self, user_id: &str) -> AppResult<StreakState> {
        let key = CacheKey::new(user_id, CacheResource::Streak);
        Ok(self
            .load(&key, &paths::streak(user_id))
            .await?
            .unwrap_or_default())
    }

    /// Save streak state.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub async fn save_streak(&self, user_id: &str, state: &StreakState) -> AppResult<()> {
        let key = CacheKey::new(user_id, CacheResource::Streak);
        self.store(&key, &paths::streak(user_id), state).await
    }

    /// Fetch the persisted meal plan for one UTC day, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if a cached entry fails to deserialize.
    pub async fn meal_plan(&self, user_id: &str, date: NaiveDate) -> AppResult<Option<MealPlan>> {
        let key = CacheKey::new(user_id, CacheResource::MealPlan { date });
        self.load(&key, &paths::meal_plan(user_id, date)).await
    }

    /// Persist the meal plan for its day.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub async fn save_meal_plan(&self, user_id: &str, plan: &MealPlan) -> AppResult<()> {
        let key = CacheKey::new(user_id, CacheResource::MealPlan { date: plan.date });
        self.store(&key, &paths::meal_plan(user_id, plan.date), plan)
            .await
    }

    /// Fetch the meal log for one UTC day, empty if none saved yet.
    ///
    /// # Errors
    ///
    /// Returns an error if a cached entry fails to deserialize.
    pub async fn meal_log(&self, user_id: &str, date: NaiveDate) -> AppResult<MealLog> {
        let key = CacheKey::new(user_id, CacheResource::MealLog { date });
        Ok(self
            .load(&key, &paths::meal_log(user_id, date))
            .await?
            .unwrap_or_default())
    }

    /// Persist a day's meal log.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub async fn save_meal_log(
        &self,
        user_id: &str,
        date: NaiveDate,
        log: &MealLog,
    ) -> AppResult<()> {
        let key = CacheKey::new(user_id, CacheResource::MealLog { date });
        self.store(&key, &paths::meal_log(user_id, date), log).await
    }

    /// Cache-aside read: cache hit, else read-through and populate.
    ///
    /// A store failure that survives the retry policy is absorbed here: the
    /// record is reported absent and the caller proceeds on cache-only data.
    async fn load<T>(&self, key: &CacheKey, path: &str) -> AppResult<Option<T>>
    where
        T: Serialize + DeserializeOwned,
    {
        if let Some(cached) = self.cache.get(key)? {
            return Ok(Some(cached));
        }
        match self.adapter.read_through(path).await {
            Ok(Some(value)) => {
                let typed: T = serde_json::from_value(value)
                    .map_err(|e| AppError::internal(format!("malformed document: {e}")))?;
                self.cache.put(key, &typed)?;
                Ok(Some(typed))
            }
            Ok(None) => Ok(None),
            Err(err) => {
                warn!(path, %err, "durable read failed, serving cache-only view");
                Ok(None)
            }
        }
    }

    /// Cache-first write: the cache is updated before the durable attempt,
    /// and the entry is kept even when the durable write fails, making the
    /// cache the temporary source of truth until a later write succeeds.
    async fn store<T: Serialize>(&self, key: &CacheKey, path: &str, value: &T) -> AppResult<()> {
        self.cache.put(key, value)?;
        if let Err(err) = self
            .adapter
            .write(path, serde_json::to_value(value)?)
            .await
        {
            warn!(path, %err, "durable write failed, degrading to cache-only");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CacheConfig, RetryConfig};
    use crate::store::memory::InMemoryStore;
    use std::time::Duration;

    fn store() -> ProfileStore {
        ProfileStore::new(
            BoundedCache::new(CacheConfig::default()),
            PersistenceAdapter::new(
                Arc::new(InMemoryStore::new()),
                RetryConfig {
                    max_attempts: 3,
                    initial_backoff: Duration::from_millis(1),
                },
            ),
        )
    }

    #[tokio::test]
    async fn lock_sweep_keeps_held_locks_and_drops_idle_ones() {
        let profiles = store();
        {
            let _guard = profiles.user_lock("held").lock_owned().await;
            profiles.user_lock("idle");
            assert_eq!(profiles.tracked_locks(), 2);

            // A lock someone is holding survives the sweep.
            profiles.sweep_locks();
            assert_eq!(profiles.tracked_locks(), 1);
        }
        profiles.sweep_locks();
        assert_eq!(profiles.tracked_locks(), 0);
    }

    #[tokio::test]
    async fn locks_are_recreated_after_a_sweep() {
        let profiles = store();
        profiles.user_lock("u1");
        profiles.sweep_locks();
        // The next operation simply mints a fresh lock.
        let _guard = profiles.user_lock("u1").lock_owned().await;
        assert_eq!(profiles.tracked_locks(), 1);
    }
}
