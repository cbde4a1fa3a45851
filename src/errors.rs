// ABOUTME: Unified error handling for the Nutrio backend
// ABOUTME: Stable error codes plus constructor helpers for each failure class
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Unified Error Handling
//!
//! Centralized error types for all modules. Only [`ErrorCode::InvalidInput`]
//! and [`ErrorCode::RateLimitExceeded`] surface to callers as request-rejecting
//! outcomes; store and generator failures are absorbed internally with logging
//! and a degraded result. Error messages never embed raw text from the durable
//! store or the plan generator.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Stable error codes used throughout the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    /// Bad input, rejected before any state mutation
    #[serde(rename = "INVALID_INPUT")]
    InvalidInput,
    /// Admission denied by the rate limiter; caller should back off
    #[serde(rename = "RATE_LIMIT_EXCEEDED")]
    RateLimitExceeded,
    /// Expected absence (first-time user, no plan yet)
    #[serde(rename = "RESOURCE_NOT_FOUND")]
    ResourceNotFound,
    /// Durable store failed after exhausting retries
    #[serde(rename = "STORE_UNAVAILABLE")]
    StoreUnavailable,
    /// External plan generator timed out or errored
    #[serde(rename = "GENERATION_TIMEOUT")]
    GenerationTimeout,
    /// Catalog exhausted even after constraint relaxation
    #[serde(rename = "NO_MATCH")]
    NoMatch,
    /// Unexpected internal failure
    #[serde(rename = "INTERNAL_ERROR")]
    InternalError,
}

impl ErrorCode {
    /// Get a user-friendly description of this error
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::InvalidInput => "The provided input is invalid",
            Self::RateLimitExceeded => "Rate limit exceeded. Please slow down your requests",
            Self::ResourceNotFound => "The requested resource was not found",
            Self::StoreUnavailable => "The durable store is temporarily unavailable",
            Self::GenerationTimeout => "Plan generation did not complete in time",
            Self::NoMatch => "No meal matches the requested constraints",
            Self::InternalError => "An internal error occurred",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::InvalidInput => "INVALID_INPUT",
            Self::RateLimitExceeded => "RATE_LIMIT_EXCEEDED",
            Self::ResourceNotFound => "RESOURCE_NOT_FOUND",
            Self::StoreUnavailable => "STORE_UNAVAILABLE",
            Self::GenerationTimeout => "GENERATION_TIMEOUT",
            Self::NoMatch => "NO_MATCH",
            Self::InternalError => "INTERNAL_ERROR",
        };
        f.write_str(name)
    }
}

/// Application error with a stable code and a sanitized message
#[derive(Debug, Error)]
#[error("{code}: {message}")]
pub struct AppError {
    /// Stable error classification
    pub code: ErrorCode,
    /// Human-readable message, safe to show to callers
    pub message: String,
}

impl AppError {
    /// Create a new error with an explicit code
    #[must_use]
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Input validation failure; rejected before any state mutation
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    /// Admission denied by the rate limiter
    #[must_use]
    pub fn rate_limited(identity: &str) -> Self {
        Self::new(
            ErrorCode::RateLimitExceeded,
            format!("too many requests for {identity}"),
        )
    }

    /// Expected absence of a resource
    #[must_use]
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::new(ErrorCode::ResourceNotFound, what)
    }

    /// Durable store unavailable after retries
    #[must_use]
    pub fn store_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::StoreUnavailable, message)
    }

    /// Internal failure
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// Whether this error represents the normal-absence outcome
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self.code, ErrorCode::ResourceNotFound)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::internal(format!("serialization failed: {err}"))
    }
}

/// Result alias used across the crate
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_carries_code() {
        let err = AppError::validation("age out of range");
        assert_eq!(err.code, ErrorCode::InvalidInput);
        assert_eq!(err.to_string(), "INVALID_INPUT: age out of range");
    }

    #[test]
    fn not_found_is_distinguishable() {
        assert!(AppError::not_found("profile").is_not_found());
        assert!(!AppError::internal("boom").is_not_found());
    }
}
