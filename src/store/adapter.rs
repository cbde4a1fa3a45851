// ABOUTME: Retrying adapter over the injected durable store client
// ABOUTME: Transient failures back off and retry, permanent failures fail fast
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use super::retry::call_with_retry;
use super::{DurableStore, StoreError};
use crate::config::RetryConfig;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Wraps the durable store with the bounded retry policy.
///
/// A `write` that exhausts its retries reports failure to the caller, which
/// must then keep the corresponding cache entry alive as the temporary
/// source of truth (degrade-to-cache). A `read_through` returning `None` is
/// the normal first-time-user outcome, not an error.
pub struct PersistenceAdapter {
    store: Arc<dyn DurableStore>,
    retry: RetryConfig,
}

impl PersistenceAdapter {
    /// Wrap `store` with retry policy `retry`
    #[must_use]
    pub fn new(store: Arc<dyn DurableStore>, retry: RetryConfig) -> Self {
        Self { store, retry }
    }

    /// Read the document at `path`, retrying transient failures.
    ///
    /// # Errors
    ///
    /// Returns the final [`StoreError`] once retries are exhausted or a
    /// permanent error occurs.
    pub async fn read_through(&self, path: &str) -> Result<Option<Value>, StoreError> {
        let result = call_with_retry(
            "durable read",
            &self.retry,
            StoreError::is_transient,
            || self.store.get(path),
        )
        .await;
        if let Ok(None) = &result {
            debug!(path, "durable read found no document");
        }
        result
    }

    /// Write the document at `path`, retrying transient failures.
    ///
    /// # Errors
    ///
    /// Returns the final [`StoreError`] once retries are exhausted or a
    /// permanent error occurs.
    pub async fn write(&self, path: &str, value: Value) -> Result<(), StoreError> {
        call_with_retry(
            "durable write",
            &self.retry,
            StoreError::is_transient,
            || self.store.set(path, value.clone()),
        )
        .await
    }
}
