// ABOUTME: In-memory durable store backend for tests and single-node deployments
// ABOUTME: Failure injection hooks simulate transient and permanent store outages
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use super::{DurableStore, StoreError};
use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use std::sync::atomic::{AtomicU32, Ordering};

/// How the in-memory store should misbehave, if at all
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureMode {
    /// Every call succeeds
    None,
    /// Every call fails with a transient error
    AlwaysTransient,
    /// Every call fails with a permanent error
    AlwaysPermanent,
    /// The next N calls fail transiently, then calls succeed
    TransientTimes(u32),
}

/// Document store held entirely in memory.
///
/// The default backend when no external store is configured, and the test
/// double for every persistence scenario: failure modes let tests script
/// outages without touching a network.
pub struct InMemoryStore {
    documents: DashMap<String, Value>,
    failure: std::sync::RwLock<FailureMode>,
    remaining_failures: AtomicU32,
    write_count: AtomicU32,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    /// Create an empty, always-healthy store
    #[must_use]
    pub fn new() -> Self {
        Self {
            documents: DashMap::new(),
            failure: std::sync::RwLock::new(FailureMode::None),
            remaining_failures: AtomicU32::new(0),
            write_count: AtomicU32::new(0),
        }
    }

    /// Script how subsequent calls should fail
    pub fn set_failure_mode(&self, mode: FailureMode) {
        if let FailureMode::TransientTimes(n) = mode {
            self.remaining_failures.store(n, Ordering::SeqCst);
        }
        if let Ok(mut guard) = self.failure.write() {
            *guard = mode;
        }
    }

    /// Number of successful writes so far
    #[must_use]
    pub fn write_count(&self) -> u32 {
        self.write_count.load(Ordering::SeqCst)
    }

    fn check_failure(&self) -> Result<(), StoreError> {
        let mode = self.failure.read().map(|g| *g).unwrap_or(FailureMode::None);
        match mode {
            FailureMode::None => Ok(()),
            FailureMode::AlwaysTransient => {
                Err(StoreError::Transient("simulated network failure".into()))
            }
            FailureMode::AlwaysPermanent => {
                Err(StoreError::Permanent("simulated auth failure".into()))
            }
            FailureMode::TransientTimes(_) => {
                let prev = self
                    .remaining_failures
                    .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                    .unwrap_or(0);
                if prev > 0 {
                    Err(StoreError::Transient("simulated network failure".into()))
                } else {
                    Ok(())
                }
            }
        }
    }
}

#[async_trait]
impl DurableStore for InMemoryStore {
    async fn get(&self, path: &str) -> Result<Option<Value>, StoreError> {
        self.check_failure()?;
        Ok(self.documents.get(path).map(|doc| doc.clone()))
    }

    async fn set(&self, path: &str, value: Value) -> Result<(), StoreError> {
        self.check_failure()?;
        self.documents.insert(path.to_owned(), value);
        self.write_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
