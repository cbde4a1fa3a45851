// ABOUTME: Consecutive-day streak tracking and capped exponential point accrual
// ABOUTME: UTC calendar days define activity boundaries to avoid client clock drift
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Streak Engine
//!
//! Same-day repeat activity is a no-op, the next consecutive day increments
//! the run, and any gap longer than one day resets the run to 1 (never 0).
//! Points per qualifying activity follow
//! `min(ceiling, base * growth^consecutive_days)`, so rewards grow with the
//! streak but cannot drift unbounded.

use crate::config::StreakConfig;
use crate::errors::AppResult;
use crate::models::StreakState;
use crate::profiles::ProfileStore;
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::debug;

/// Computes streaks and point accrual from logged activity days
pub struct StreakEngine {
    profiles: Arc<ProfileStore>,
    config: StreakConfig,
}

impl StreakEngine {
    /// Create an engine persisting through `profiles`
    #[must_use]
    pub fn new(profiles: Arc<ProfileStore>, config: StreakConfig) -> Self {
        Self { profiles, config }
    }

    /// Record qualifying activity for `user_id` on `date` (UTC calendar day)
    /// and return the resulting state.
    ///
    /// Activity dated on or before the last counted day is a no-op, so
    /// same-day double logging and backdated logs cannot inflate the
    /// total. The read-modify-write cycle
    /// holds the per-user lock so concurrent logs for one user serialize.
    ///
    /// # Errors
    ///
    /// Returns an error only for serialization problems; durable-store
    /// trouble is absorbed by the profile store's degrade policy.
    pub async fn record_activity(&self, user_id: &str, date: NaiveDate) -> AppResult<StreakState> {
        let _guard = self.profiles.user_lock(user_id).lock_owned().await;

        let mut state = self.profiles.streak(user_id).await?;
        match state.last_active_date {
            // Same day or earlier is already counted; a backdated log must
            // never move the streak backwards or earn points twice.
            Some(last) if date <= last => {
                debug!(user_id, %date, %last, "activity already counted through this day");
                return Ok(state);
            }
            Some(last) if date == last.succ_opt().unwrap_or(last) => {
                state.consecutive_days += 1;
            }
            _ => {
                // First activity ever, or a gap longer than one day.
                state.consecutive_days = 1;
            }
        }

        let earned = points_for(&self.config, state.consecutive_days);
        state.total_points += u64::from(earned);
        state.last_active_date = Some(date);

        self.profiles.save_streak(user_id, &state).await?;
        debug!(
            user_id,
            consecutive = state.consecutive_days,
            earned,
            total = state.total_points,
            "streak updated"
        );
        Ok(state)
    }

    /// Current streak state without recording anything.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored state fails to deserialize.
    pub async fn current(&self, user_id: &str) -> AppResult<StreakState> {
        self.profiles.streak(user_id).await
    }
}

/// Points for one activity at the given streak length:
/// `min(ceiling, base * growth^consecutive_days)`.
fn points_for(config: &StreakConfig, consecutive_days: u32) -> u32 {
    let raw =
        f64::from(config.base_points) * config.growth_rate.powi(consecutive_days.min(64) as i32);
    if raw >= f64::from(config.points_ceiling) {
        config.points_ceiling
    } else {
        raw as u32
    }
}
