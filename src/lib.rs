// ABOUTME: Personalization and resilience backend for a conversational nutrition assistant
// ABOUTME: Rate limiting, bounded caching, degrade-to-cache persistence, and plan generation
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Nutrio Server
//!
//! Backend library for a conversational nutrition assistant. The
//! [`service::NutritionService`] façade composes the pieces:
//!
//! - [`rate_limiting`] — per-user sliding-window admission control
//! - [`cache`] — bounded in-memory cache with oldest-insertion eviction
//! - [`store`] — durable-store trait, retry policy, and in-memory backend
//! - [`profiles`] — cache-aside repository for every per-user record
//! - [`catalog`] — curated meal catalog with derived diet tags
//! - [`recommendation`] — constraint filtering with fixed-order relaxation
//! - [`generation`] — AI / catalog / static fallback chain for daily plans
//! - [`streaks`] — consecutive-day streak tracking and point accrual
//!
//! The overriding design rule is graceful degradation: a failing durable
//! store or generator reduces freshness or personalization, never
//! availability. Only invalid input and rate-limit rejection surface as
//! user-visible errors.

pub mod cache;
pub mod catalog;
pub mod config;
pub mod errors;
pub mod generation;
pub mod logging;
pub mod models;
pub mod profiles;
pub mod rate_limiting;
pub mod recommendation;
pub mod sanitize;
pub mod service;
pub mod store;
pub mod streaks;
