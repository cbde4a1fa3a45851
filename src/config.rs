// ABOUTME: Environment-driven configuration for all backend components
// ABOUTME: Coded defaults with optional overrides from environment variables
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::env;
use std::time::Duration;
use tracing::warn;

/// Sliding-window rate limiter configuration
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Trailing window size
    pub window: Duration,
    /// Maximum admitted requests per identity within the window
    pub max_requests: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window: Duration::from_secs(60),
            max_requests: 30,
        }
    }
}

/// Bounded cache configuration
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of entries before an eviction sweep runs
    pub max_entries: usize,
    /// Fraction of capacity freed below the cap by each sweep, 0.0..1.0
    pub eviction_buffer: f64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 1000,
            eviction_buffer: 0.10,
        }
    }
}

/// Retry behavior for durable-store calls
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts (first try included)
    pub max_attempts: u32,
    /// Initial backoff delay, doubled after each failed attempt
    pub initial_backoff: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(250),
        }
    }
}

/// Meal plan generation chain configuration
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    /// Bound on the external generator call
    pub generator_timeout: Duration,
    /// Token budget passed to the generator
    pub max_tokens: u32,
    /// Sampling temperature passed to the generator
    pub temperature: f32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            generator_timeout: Duration::from_secs(30),
            max_tokens: 1000,
            temperature: 0.7,
        }
    }
}

/// Streak point accrual configuration
#[derive(Debug, Clone)]
pub struct StreakConfig {
    /// Points awarded for a single-day streak
    pub base_points: u32,
    /// Multiplier applied per consecutive day
    pub growth_rate: f64,
    /// Hard ceiling on points per activity
    pub points_ceiling: u32,
}

impl Default for StreakConfig {
    fn default() -> Self {
        Self {
            base_points: 5,
            growth_rate: 1.5,
            points_ceiling: 500,
        }
    }
}

/// Aggregate server configuration
#[derive(Debug, Clone, Default)]
pub struct ServerConfig {
    /// Rate limiter settings
    pub rate_limit: RateLimitConfig,
    /// Bounded cache settings
    pub cache: CacheConfig,
    /// Durable-store retry settings
    pub retry: RetryConfig,
    /// Generation chain settings
    pub generation: GenerationConfig,
    /// Streak accrual settings
    pub streak: StreakConfig,
}

impl ServerConfig {
    /// Build configuration from environment variables, falling back to
    /// coded defaults for anything unset or unparseable.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            rate_limit: RateLimitConfig {
                window: Duration::from_secs(env_u64("NUTRIO_RATE_LIMIT_WINDOW_SECS", 60)),
                max_requests: env_u32("NUTRIO_RATE_LIMIT_MAX_REQUESTS", 30),
            },
            cache: CacheConfig {
                max_entries: env_u64("NUTRIO_CACHE_MAX_ENTRIES", 1000) as usize,
                eviction_buffer: 0.10,
            },
            retry: RetryConfig {
                max_attempts: env_u32("NUTRIO_STORE_MAX_ATTEMPTS", 3),
                initial_backoff: Duration::from_millis(env_u64("NUTRIO_STORE_BACKOFF_MS", 250)),
            },
            generation: GenerationConfig {
                generator_timeout: Duration::from_secs(env_u64("NUTRIO_GENERATOR_TIMEOUT_SECS", 30)),
                max_tokens: env_u32("NUTRIO_GENERATOR_MAX_TOKENS", 1000),
                temperature: 0.7,
            },
            streak: StreakConfig::default(),
        }
    }
}

fn env_u64(key: &str, default: u64) -> u64 {
    match env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            warn!("Invalid value for {key}, using default {default}");
            default
        }),
        Err(_) => default,
    }
}

fn env_u32(key: &str, default: u32) -> u32 {
    match env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            warn!("Invalid value for {key}, using default {default}");
            default
        }),
        Err(_) => default,
    }
}
