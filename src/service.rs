// ABOUTME: Caller-facing operations consumed by the conversational layer
// ABOUTME: Every operation is rate-gated and returns a typed result or failure
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Nutrition Service
//!
//! Composition root for the backend: rate limiter in front, cache-aside
//! profile store underneath, the generation chain and streak engine on top.
//! Only validation and rate-limit failures reject a request; store and
//! generator trouble degrades to cached or fallback results.

use crate::cache::BoundedCache;
use crate::catalog::MealCatalog;
use crate::config::ServerConfig;
use crate::errors::{AppError, AppResult};
use crate::generation::{GenerationFallbackChain, PlanGenerator};
use crate::models::{
    CartSelection, GroceryList, MealLog, MealPlan, MealRating, StreakState, UserProfile,
};
use crate::profiles::ProfileStore;
use crate::rate_limiting::RateLimiter;
use crate::sanitize::sanitize;
use crate::store::adapter::PersistenceAdapter;
use crate::store::DurableStore;
use crate::streaks::StreakEngine;
use chrono::Utc;
use std::sync::Arc;
use tracing::info;

/// Outcome of logging a day's meals
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MealLogOutcome {
    /// The merged log for the day
    pub log: MealLog,
    /// Updated streak state when the log contained a followed meal
    pub streak: Option<StreakState>,
}

/// Backend façade consumed by the conversational front-end
pub struct NutritionService {
    limiter: RateLimiter,
    profiles: Arc<ProfileStore>,
    catalog: MealCatalog,
    chain: GenerationFallbackChain,
    streaks: StreakEngine,
}

impl NutritionService {
    /// Wire the backend together from its configuration and injected
    /// collaborators (durable store client, meal catalog, optional AI
    /// generator).
    #[must_use]
    pub fn new(
        config: ServerConfig,
        store: Arc<dyn DurableStore>,
        catalog: MealCatalog,
        generator: Option<Arc<dyn PlanGenerator>>,
    ) -> Self {
        let cache = BoundedCache::new(config.cache.clone());
        let adapter = PersistenceAdapter::new(store, config.retry.clone());
        let profiles = Arc::new(ProfileStore::new(cache, adapter));
        Self {
            limiter: RateLimiter::new(config.rate_limit.clone()),
            streaks: StreakEngine::new(Arc::clone(&profiles), config.streak.clone()),
            chain: GenerationFallbackChain::new(generator, config.generation.clone()),
            profiles,
            catalog,
        }
    }

    /// Return the stored profile, or persist and return `draft` for a
    /// first-time user.
    ///
    /// The get/save pair holds the per-user lock, so concurrent first-time
    /// calls for one user create exactly one profile.
    ///
    /// # Errors
    ///
    /// Rejects with `RateLimited` or a validation error on the draft.
    pub async fn get_or_create_profile(&self, draft: UserProfile) -> AppResult<UserProfile> {
        self.admit(&draft.user_id)?;
        let _guard = self.profiles.user_lock(&draft.user_id).lock_owned().await;
        match self.profiles.get_profile(&draft.user_id).await {
            Ok(existing) => Ok(existing),
            Err(err) if err.is_not_found() => {
                info!(user_id = %draft.user_id, "creating profile for first-time user");
                self.profiles.save_profile(draft.clone()).await?;
                self.profiles.get_profile(&draft.user_id).await
            }
            Err(err) => Err(err),
        }
    }

    /// Validate and save a profile edit.
    ///
    /// # Errors
    ///
    /// Rejects with `RateLimited` or a validation error; durable-store
    /// failure is absorbed per the degrade policy.
    pub async fn save_profile(&self, profile: UserProfile) -> AppResult<()> {
        self.admit(&profile.user_id)?;
        self.profiles.save_profile(profile).await
    }

    /// Return today's meal plan, generating one if needed.
    ///
    /// Repeated same-day requests are idempotent reads of the persisted
    /// plan unless `regenerate` is set.
    ///
    /// # Errors
    ///
    /// Rejects with `RateLimited`, or `NotFound` when the user has no
    /// profile yet.
    pub async fn request_meal_plan(&self, user_id: &str, regenerate: bool) -> AppResult<MealPlan> {
        self.admit(user_id)?;
        let profile = self.profiles.get_profile(user_id).await?;
        let today = Utc::now().date_naive();

        if !regenerate {
            if let Some(existing) = self.profiles.meal_plan(user_id, today).await? {
                return Ok(existing);
            }
        }

        let exclude = self.profiles.disliked_meals(user_id).await?;
        let plan = self
            .chain
            .generate_plan(&profile, &self.catalog, &exclude, today)
            .await;
        self.profiles.save_meal_plan(user_id, &plan).await?;
        info!(user_id, source = ?plan.source, "meal plan generated");
        Ok(plan)
    }

    /// Merge followed/skipped/extra meals into today's log; a followed meal
    /// counts as qualifying streak activity.
    ///
    /// # Errors
    ///
    /// Rejects with `RateLimited`; an entirely empty log request is a
    /// validation error.
    pub async fn log_meal(
        &self,
        user_id: &str,
        followed: Vec<String>,
        skipped: Vec<String>,
        extra: Vec<String>,
    ) -> AppResult<MealLogOutcome> {
        self.admit(user_id)?;
        if followed.is_empty() && skipped.is_empty() && extra.is_empty() {
            return Err(AppError::validation("meal log must name at least one meal"));
        }

        let today = Utc::now().date_naive();
        let had_followed = !followed.is_empty();
        {
            let _guard = self.profiles.user_lock(user_id).lock_owned().await;
            let mut log = self.profiles.meal_log(user_id, today).await?;
            log.followed.extend(sanitize_all(followed));
            log.skipped.extend(sanitize_all(skipped));
            log.extra.extend(sanitize_all(extra));
            self.profiles.save_meal_log(user_id, today, &log).await?;
        }

        let streak = if had_followed {
            Some(self.streaks.record_activity(user_id, today).await?)
        } else {
            None
        };
        let log = self.profiles.meal_log(user_id, today).await?;
        Ok(MealLogOutcome { log, streak })
    }

    /// Flip one ingredient's selected state in the user's cart.
    ///
    /// # Errors
    ///
    /// Rejects with `RateLimited`; an empty item name is a validation error.
    pub async fn toggle_cart_item(&self, user_id: &str, item: &str) -> AppResult<CartSelection> {
        self.admit(user_id)?;
        let item = sanitize(item, 100);
        if item.is_empty() {
            return Err(AppError::validation("cart item name must not be empty"));
        }

        let _guard = self.profiles.user_lock(user_id).lock_owned().await;
        let mut cart = self.profiles.cart(user_id).await?;
        if !cart.selected.remove(&item) {
            cart.selected.insert(item);
        }
        self.profiles.save_cart(user_id, cart.clone()).await?;
        Ok(cart)
    }

    /// Current streak state.
    ///
    /// # Errors
    ///
    /// Rejects with `RateLimited`.
    pub async fn get_streak(&self, user_id: &str) -> AppResult<StreakState> {
        self.admit(user_id)?;
        self.streaks.current(user_id).await
    }

    /// The user's accumulated grocery list.
    ///
    /// # Errors
    ///
    /// Rejects with `RateLimited`.
    pub async fn grocery_list(&self, user_id: &str) -> AppResult<GroceryList> {
        self.admit(user_id)?;
        self.profiles.grocery_list(user_id).await
    }

    /// Append items to the grocery list, skipping duplicates.
    ///
    /// # Errors
    ///
    /// Rejects with `RateLimited`.
    pub async fn add_grocery_items(
        &self,
        user_id: &str,
        items: Vec<String>,
    ) -> AppResult<GroceryList> {
        self.admit(user_id)?;
        let _guard = self.profiles.user_lock(user_id).lock_owned().await;
        let mut list = self.profiles.grocery_list(user_id).await?;
        for item in sanitize_all(items) {
            if !list.items.contains(&item) {
                list.items.push(item);
            }
        }
        self.profiles
            .save_grocery_list(user_id, list.clone())
            .await?;
        Ok(list)
    }

    /// Remove one item from the grocery list and deselect it in the cart.
    ///
    /// # Errors
    ///
    /// Rejects with `RateLimited`.
    pub async fn remove_grocery_item(&self, user_id: &str, item: &str) -> AppResult<GroceryList> {
        self.admit(user_id)?;
        let item = sanitize(item, 100);
        let _guard = self.profiles.user_lock(user_id).lock_owned().await;
        let mut list = self.profiles.grocery_list(user_id).await?;
        list.items.retain(|existing| *existing != item);
        self.profiles
            .save_grocery_list(user_id, list.clone())
            .await?;

        let mut cart = self.profiles.cart(user_id).await?;
        if cart.selected.remove(&item) {
            self.profiles.save_cart(user_id, cart).await?;
        }
        Ok(list)
    }

    /// Clear the grocery list entirely.
    ///
    /// # Errors
    ///
    /// Rejects with `RateLimited`.
    pub async fn clear_grocery_list(&self, user_id: &str) -> AppResult<()> {
        self.admit(user_id)?;
        let _guard = self.profiles.user_lock(user_id).lock_owned().await;
        self.profiles
            .save_grocery_list(user_id, GroceryList::default())
            .await
    }

    /// Record a thumbs-up/down rating; disliked meals are excluded from
    /// future recommendations.
    ///
    /// # Errors
    ///
    /// Rejects with `RateLimited`; an empty meal name is a validation error.
    pub async fn rate_meal(
        &self,
        user_id: &str,
        meal_name: &str,
        liked: bool,
        feedback: &str,
    ) -> AppResult<()> {
        self.admit(user_id)?;
        if sanitize(meal_name, 100).is_empty() {
            return Err(AppError::validation("meal name must not be empty"));
        }
        self.profiles
            .add_rating(
                user_id,
                MealRating {
                    meal_name: meal_name.to_owned(),
                    liked,
                    feedback: feedback.to_owned(),
                    rated_at: Utc::now(),
                },
            )
            .await
    }

    /// Drop idle rate windows and unheld user locks; intended for a
    /// low-frequency background tick.
    pub fn sweep_idle_state(&self) {
        self.limiter.sweep(Utc::now());
        self.profiles.sweep_locks();
    }

    fn admit(&self, user_id: &str) -> AppResult<()> {
        if self.limiter.admit(user_id, Utc::now()) {
            Ok(())
        } else {
            Err(AppError::rate_limited(user_id))
        }
    }
}

fn sanitize_all(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|item| sanitize(&item, 100))
        .filter(|item| !item.is_empty())
        .collect()
}
