// ABOUTME: Input sanitization and validation for user-supplied strings
// ABOUTME: All string fields pass through here before any state mutation
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use crate::errors::{AppError, AppResult};

/// Maximum length applied by [`sanitize`] when none is given
pub const DEFAULT_MAX_LENGTH: usize = 200;

/// Strip characters that could smuggle markup or quotes, trim whitespace,
/// and clamp length.
#[must_use]
pub fn sanitize(text: &str, max_length: usize) -> String {
    let cleaned: String = text
        .chars()
        .filter(|c| !matches!(c, '<' | '>' | '"' | '\''))
        .collect();
    let cleaned = cleaned.trim();
    if cleaned.chars().count() > max_length {
        cleaned.chars().take(max_length).collect()
    } else {
        cleaned.to_owned()
    }
}

/// Validate and sanitize a display name.
///
/// Accepts 2-50 characters drawn from letters, digits, spaces, and `.-'`.
///
/// # Errors
///
/// Returns a validation error for empty, too-short, too-long, or
/// oddly-charactered names.
pub fn validate_name(raw: &str) -> AppResult<String> {
    let name = sanitize(raw, 50);
    let len = name.chars().count();
    if len < 2 || len > 50 {
        return Err(AppError::validation("name must be 2-50 characters"));
    }
    let ok = name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, ' ' | '.' | '-' | '\''));
    if !ok {
        return Err(AppError::validation("name contains invalid characters"));
    }
    Ok(name)
}

/// Validate an age value.
///
/// # Errors
///
/// Returns a validation error outside 1-120.
pub fn validate_age(age: u8) -> AppResult<u8> {
    if (1..=120).contains(&age) {
        Ok(age)
    } else {
        Err(AppError::validation("age must be between 1 and 120"))
    }
}

/// Sanitize a free-text tag (medical condition, region name) to a
/// lowercase comparable form.
#[must_use]
pub fn normalize_tag(raw: &str) -> String {
    sanitize(raw, 100).to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_strips_markup_characters() {
        assert_eq!(sanitize("<b>hi</b>", 200), "bhi/b");
        assert_eq!(sanitize("  o'brien \" ", 200), "obrien");
    }

    #[test]
    fn sanitize_clamps_length() {
        let long = "a".repeat(500);
        assert_eq!(sanitize(&long, 100).len(), 100);
    }

    #[test]
    fn name_validation_rejects_bad_shapes() {
        assert!(validate_name("A").is_err());
        assert!(validate_name("Ravi Kumar").is_ok());
        assert!(validate_name("x;drop table").is_err());
    }

    #[test]
    fn age_bounds() {
        assert!(validate_age(0).is_err());
        assert!(validate_age(1).is_ok());
        assert!(validate_age(120).is_ok());
        assert!(validate_age(121).is_err());
    }
}
