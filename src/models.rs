// ABOUTME: Domain types for profiles, meals, plans, streaks, and ratings
// ABOUTME: Diet type enumeration with a fixed synonym normalization table
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Dietary preference, normalized from free-text user input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DietType {
    /// No meat, fish, or eggs
    Vegetarian,
    /// Meat and fish allowed
    NonVegetarian,
    /// No animal products at all
    Vegan,
    /// Vegetarian, additionally excluding onion, garlic, and root vegetables
    Jain,
    /// Vegetarian plus eggs
    Eggitarian,
    /// Low-carbohydrate, high-fat
    Keto,
    /// No restriction; matches every diet tag
    Mixed,
}

impl DietType {
    /// Parse a diet string through the fixed synonym table.
    ///
    /// Matching is case-insensitive; unknown strings yield `None` so the
    /// caller can reject them as a validation error instead of guessing.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "vegetarian" | "veg" => Some(Self::Vegetarian),
            "non-vegetarian" | "non-veg" | "nonveg" => Some(Self::NonVegetarian),
            "vegan" => Some(Self::Vegan),
            "jain" => Some(Self::Jain),
            "eggitarian" | "egg" => Some(Self::Eggitarian),
            "keto" => Some(Self::Keto),
            "mixed" => Some(Self::Mixed),
            _ => None,
        }
    }

    /// Whether a meal carrying `tag` is acceptable for this diet.
    ///
    /// `Mixed` accepts every tag; every diet accepts its own tag.
    #[must_use]
    pub fn accepts(self, tag: Self) -> bool {
        self == Self::Mixed || self == tag
    }
}

impl fmt::Display for DietType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Vegetarian => "vegetarian",
            Self::NonVegetarian => "non-vegetarian",
            Self::Vegan => "vegan",
            Self::Jain => "jain",
            Self::Eggitarian => "eggitarian",
            Self::Keto => "keto",
            Self::Mixed => "mixed",
        };
        f.write_str(name)
    }
}

/// Self-reported gender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    /// Male
    Male,
    /// Female
    Female,
    /// Anything else or undisclosed
    Other,
}

/// Self-reported activity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    /// Little to no exercise
    Sedentary,
    /// Exercise 1-3 days a week
    Light,
    /// Exercise 3-5 days a week
    Moderate,
    /// Exercise 6-7 days a week
    Active,
}

/// User profile, created on onboarding completion and superseded on edit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Opaque unique identifier
    pub user_id: String,
    /// Display name, 2-50 sanitized characters
    pub name: String,
    /// Age in years, 1-120
    pub age: u8,
    /// Self-reported gender
    pub gender: Gender,
    /// Normalized dietary preference
    pub diet_type: DietType,
    /// State/region name, normalized lowercase
    pub region: String,
    /// Sanitized free-text condition tags ("diabetes", "thyroid", ...)
    pub medical_conditions: BTreeSet<String>,
    /// Self-reported activity level
    pub activity_level: ActivityLevel,
}

/// Approximate calorie tier of a catalog meal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalorieTier {
    /// Under roughly 150 kcal
    Low,
    /// Roughly 150-300 kcal
    Medium,
    /// Over roughly 300 kcal
    High,
}

/// Immutable meal from the curated catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealRecord {
    /// Dish name
    pub name: String,
    /// Literal ingredient list, never synthesized
    pub ingredients: Vec<String>,
    /// Approximate calories
    pub calories: u32,
    /// Calorie tier derived from calories
    pub calorie_tier: CalorieTier,
    /// Short health-impact note
    pub health_note: String,
    /// Region tag, normalized lowercase; empty means pan-regional
    pub region: String,
    /// Diets this meal is compatible with
    pub diet_tags: BTreeSet<DietType>,
    /// Medical condition tags this meal is unsuitable for
    pub contraindications: BTreeSet<String>,
}

impl MealRecord {
    /// Composite lookup key: normalized region + name
    #[must_use]
    pub fn key(&self) -> String {
        format!("{}:{}", self.region, self.name.to_lowercase())
    }
}

/// Where a returned meal plan came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanSource {
    /// External AI generator
    Ai,
    /// Catalog recommendation engine
    Catalog,
    /// Fixed always-available fallback
    StaticFallback,
}

/// A day's meal plan, persisted under a per-day key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealPlan {
    /// UTC calendar day this plan covers
    pub date: NaiveDate,
    /// Which chain step produced the plan
    pub source: PlanSource,
    /// Selected catalog meals; empty for pure-text AI plans
    pub meals: Vec<MealRecord>,
    /// Free-text plan body from the AI generator, if any
    pub text: Option<String>,
    /// Generation timestamp
    pub generated_at: DateTime<Utc>,
}

/// Thumbs-up/down rating for a served meal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealRating {
    /// Rated dish name
    pub meal_name: String,
    /// True for thumbs-up
    pub liked: bool,
    /// Optional sanitized free-text feedback
    pub feedback: String,
    /// Rating timestamp
    pub rated_at: DateTime<Utc>,
}

/// What a user actually ate on one day
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealLog {
    /// Planned meals the user followed
    pub followed: Vec<String>,
    /// Planned meals the user skipped
    pub skipped: Vec<String>,
    /// Unplanned extras the user ate
    pub extra: Vec<String>,
}

/// Per-user grocery list, accumulated across sessions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroceryList {
    /// Sanitized ingredient names, insertion-ordered
    pub items: Vec<String>,
}

/// Per-user cart: which grocery items are currently selected
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartSelection {
    /// Selected ingredient names
    pub selected: BTreeSet<String>,
}

/// Consecutive-day streak and accrued points
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakState {
    /// Last UTC day with qualifying activity
    pub last_active_date: Option<NaiveDate>,
    /// Current run of consecutive active days
    pub consecutive_days: u32,
    /// Lifetime points, monotonically non-decreasing
    pub total_points: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diet_synonyms_normalize() {
        assert_eq!(DietType::parse("veg"), Some(DietType::Vegetarian));
        assert_eq!(DietType::parse("Non-Veg"), Some(DietType::NonVegetarian));
        assert_eq!(DietType::parse("VEGAN"), Some(DietType::Vegan));
        assert_eq!(DietType::parse("paleo"), None);
    }

    #[test]
    fn mixed_accepts_all_tags() {
        for tag in [
            DietType::Vegetarian,
            DietType::NonVegetarian,
            DietType::Vegan,
            DietType::Jain,
            DietType::Eggitarian,
            DietType::Keto,
        ] {
            assert!(DietType::Mixed.accepts(tag));
            assert!(!tag.accepts(DietType::Mixed) || tag == DietType::Mixed);
        }
    }
}
