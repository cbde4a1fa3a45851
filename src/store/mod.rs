// ABOUTME: Durable store abstraction with transient-vs-permanent error classes
// ABOUTME: Document paths follow the users/{id}/... convention of the backing store
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Durable Store
//!
//! The backing persistent store is injected behind [`DurableStore`], a
//! key-value-ish document interface. Implementations must classify failures
//! as transient (worth retrying) or permanent (not retried) so the
//! [`adapter::PersistenceAdapter`] can apply its bounded retry policy.

pub mod adapter;
pub mod memory;
pub mod retry;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Failure from the durable store, classified for retry decisions
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// Network or timeout trouble; a later attempt may succeed
    #[error("transient store error: {0}")]
    Transient(String),
    /// Malformed data, auth failure, or anything retries cannot fix
    #[error("permanent store error: {0}")]
    Permanent(String),
}

impl StoreError {
    /// Whether a retry is worthwhile
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}

/// Key-value document operations over `users/{id}/...` style paths
#[async_trait]
pub trait DurableStore: Send + Sync {
    /// Fetch the document at `path`; `None` means the document does not
    /// exist, which is a normal outcome rather than an error.
    async fn get(&self, path: &str) -> Result<Option<Value>, StoreError>;

    /// Write the document at `path`, creating or replacing it
    async fn set(&self, path: &str, value: Value) -> Result<(), StoreError>;
}

/// Document path helpers for per-user records
pub mod paths {
    use chrono::NaiveDate;

    /// Profile document for one user
    #[must_use]
    pub fn profile(user_id: &str) -> String {
        format!("users/{user_id}/profile")
    }

    /// Grocery list document
    #[must_use]
    pub fn grocery_list(user_id: &str) -> String {
        format!("users/{user_id}/grocery_list")
    }

    /// Cart selection document
    #[must_use]
    pub fn cart(user_id: &str) -> String {
        format!("users/{user_id}/cart")
    }

    /// Rating history document
    #[must_use]
    pub fn ratings(user_id: &str) -> String {
        format!("users/{user_id}/ratings")
    }

    /// Streak state document
    #[must_use]
    pub fn streak(user_id: &str) -> String {
        format!("users/{user_id}/streak")
    }

    /// Meal plan document for one UTC day
    #[must_use]
    pub fn meal_plan(user_id: &str, date: NaiveDate) -> String {
        format!("users/{user_id}/meals/{date}")
    }

    /// Meal log document for one UTC day
    #[must_use]
    pub fn meal_log(user_id: &str, date: NaiveDate) -> String {
        format!("users/{user_id}/meal_logs/{date}")
    }
}
