// ABOUTME: Reusable bounded-retry helper with exponential backoff
// ABOUTME: A classifier decides which errors are worth another attempt
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use crate::config::RetryConfig;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::warn;

/// Run `operation` up to `config.max_attempts` times, sleeping an
/// exponentially doubling backoff between attempts.
///
/// `is_retryable` classifies each failure; a non-retryable error is returned
/// immediately without burning the remaining attempts.
///
/// # Errors
///
/// Returns the last error once attempts are exhausted or a permanent error
/// is seen.
pub async fn call_with_retry<T, E, F, Fut, C>(
    label: &str,
    config: &RetryConfig,
    is_retryable: C,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    C: Fn(&E) -> bool,
    E: std::fmt::Display,
{
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if attempt < max_attempts && is_retryable(&err) => {
                let backoff = backoff_for(config.initial_backoff, attempt);
                warn!(
                    "{label} attempt {attempt}/{max_attempts} failed ({err}), retrying after {}ms",
                    backoff.as_millis()
                );
                sleep(backoff).await;
                attempt += 1;
            }
            Err(err) => {
                if is_retryable(&err) {
                    warn!("{label} failed after {attempt} attempts: {err}");
                } else {
                    warn!("{label} failed with non-retryable error: {err}");
                }
                return Err(err);
            }
        }
    }
}

/// Base delay doubled once per completed attempt
fn backoff_for(initial: Duration, attempt: u32) -> Duration {
    initial.saturating_mul(2_u32.saturating_pow(attempt.saturating_sub(1)))
}
