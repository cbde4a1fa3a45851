// ABOUTME: Immutable in-memory meal catalog consumed from parsed dataset records
// ABOUTME: Derives diet tags and contraindications from ingredient keyword rules
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Meal Catalog
//!
//! The catalog is built once at startup from externally parsed records and
//! never mutated. Raw dataset rows carry only name, ingredients, calories,
//! and region; diet compatibility and medical contraindications are derived
//! here with fixed keyword rules so the recommendation engine can filter on
//! explicit tags instead of re-scanning ingredient strings.

use crate::models::{CalorieTier, DietType, MealRecord};
use crate::sanitize::normalize_tag;
use std::collections::{BTreeSet, HashMap};
use tracing::{info, warn};

/// Ingredients that mark a meal as containing meat or fish
const MEAT_KEYWORDS: &[&str] = &["chicken", "fish", "meat", "mutton", "prawn"];
/// Ingredients that mark a meal as containing dairy
const DAIRY_KEYWORDS: &[&str] = &["milk", "ghee", "curd", "paneer", "butter"];
/// Ingredients excluded by the jain diet beyond meat and eggs
const JAIN_EXCLUDED: &[&str] = &["onion", "garlic", "potato"];
/// Carbohydrate-heavy ingredients incompatible with keto
const KETO_EXCLUDED: &[&str] = &["rice", "wheat flour", "potato", "sugar", "jaggery"];

/// Calories above which a meal is contraindicated for diabetes
const DIABETES_CALORIE_LIMIT: u32 = 300;

/// A raw dataset row before tag derivation
#[derive(Debug, Clone)]
pub struct RawMeal {
    /// Dish name
    pub name: String,
    /// Literal ingredient list
    pub ingredients: Vec<String>,
    /// Approximate calories
    pub calories: u32,
    /// Short health-impact note
    pub health_note: String,
    /// Region tag; empty means pan-regional
    pub region: String,
}

/// Immutable catalog of curated meals, keyed by region+name
pub struct MealCatalog {
    meals: Vec<MealRecord>,
    by_key: HashMap<String, usize>,
}

impl MealCatalog {
    /// Build a catalog from raw dataset rows.
    ///
    /// Rows failing structural validation (empty name, no ingredients, zero
    /// calories) are dropped with a warning rather than failing the load.
    #[must_use]
    pub fn from_raw(rows: Vec<RawMeal>) -> Self {
        let mut meals = Vec::with_capacity(rows.len());
        for row in rows {
            if row.name.trim().is_empty() || row.ingredients.is_empty() || row.calories == 0 {
                warn!(name = %row.name, "dropping malformed catalog row");
                continue;
            }
            meals.push(annotate(row));
        }
        info!(count = meals.len(), "meal catalog loaded");
        Self::from_records(meals)
    }

    /// Build a catalog from already-annotated records
    #[must_use]
    pub fn from_records(meals: Vec<MealRecord>) -> Self {
        let by_key = meals
            .iter()
            .enumerate()
            .map(|(i, m)| (m.key(), i))
            .collect();
        Self { meals, by_key }
    }

    /// Built-in minimal meal set used when no dataset is supplied
    #[must_use]
    pub fn fallback() -> Self {
        let rows = vec![
            RawMeal {
                name: "Rice and Dal".into(),
                ingredients: str_vec(&["rice", "lentils", "spices", "onion", "tomato"]),
                calories: 250,
                health_note: "Balanced meal with protein and carbs".into(),
                region: String::new(),
            },
            RawMeal {
                name: "Vegetable Curry".into(),
                ingredients: str_vec(&["vegetables", "spices", "onion", "tomato", "oil"]),
                calories: 180,
                health_note: "High in fiber and vitamins".into(),
                region: String::new(),
            },
            RawMeal {
                name: "Chapati".into(),
                ingredients: str_vec(&["wheat flour", "water", "salt"]),
                calories: 120,
                health_note: "Whole grain bread, good source of fiber".into(),
                region: String::new(),
            },
            RawMeal {
                name: "Mixed Vegetable Salad".into(),
                ingredients: str_vec(&["cucumber", "tomato", "lemon", "salt"]),
                calories: 80,
                health_note: "Low calorie, high in vitamins".into(),
                region: String::new(),
            },
        ];
        Self::from_raw(rows)
    }

    /// All meals in the catalog
    #[must_use]
    pub fn meals(&self) -> &[MealRecord] {
        &self.meals
    }

    /// Look up a meal by region and name
    #[must_use]
    pub fn get(&self, region: &str, name: &str) -> Option<&MealRecord> {
        let key = format!("{}:{}", normalize_tag(region), name.to_lowercase());
        self.by_key.get(&key).map(|&i| &self.meals[i])
    }

    /// Whether any meal carries the given region tag
    #[must_use]
    pub fn has_region(&self, region: &str) -> bool {
        let region = normalize_tag(region);
        !region.is_empty() && self.meals.iter().any(|m| m.region == region)
    }

    /// Number of meals
    #[must_use]
    pub fn len(&self) -> usize {
        self.meals.len()
    }

    /// Whether the catalog holds no meals
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.meals.is_empty()
    }
}

/// Derive tier, diet tags, and contraindications for one raw row
fn annotate(row: RawMeal) -> MealRecord {
    let joined = row
        .ingredients
        .iter()
        .map(|i| i.to_lowercase())
        .collect::<Vec<_>>()
        .join(",");

    let has_any = |keywords: &[&str]| keywords.iter().any(|k| joined.contains(k));
    let has_meat = has_any(MEAT_KEYWORDS);
    let has_egg = joined.contains("egg");
    let has_dairy = has_any(DAIRY_KEYWORDS);

    let mut diet_tags: BTreeSet<DietType> = BTreeSet::new();
    if has_meat {
        diet_tags.insert(DietType::NonVegetarian);
    } else if has_egg {
        diet_tags.insert(DietType::NonVegetarian);
        diet_tags.insert(DietType::Eggitarian);
    } else {
        diet_tags.insert(DietType::Vegetarian);
        diet_tags.insert(DietType::NonVegetarian);
        diet_tags.insert(DietType::Eggitarian);
        if !has_dairy {
            diet_tags.insert(DietType::Vegan);
        }
        if !has_any(JAIN_EXCLUDED) {
            diet_tags.insert(DietType::Jain);
        }
    }
    if !has_any(KETO_EXCLUDED) {
        diet_tags.insert(DietType::Keto);
    }

    let calorie_tier = if row.calories < 150 {
        CalorieTier::Low
    } else if row.calories <= 300 {
        CalorieTier::Medium
    } else {
        CalorieTier::High
    };

    let mut contraindications: BTreeSet<String> = BTreeSet::new();
    if row.calories > DIABETES_CALORIE_LIMIT {
        contraindications.insert("diabetes".into());
    }
    if joined.contains("coconut") {
        contraindications.insert("thyroid".into());
    }

    MealRecord {
        name: row.name,
        ingredients: row.ingredients,
        calories: row.calories,
        calorie_tier,
        health_note: row.health_note,
        region: normalize_tag(&row.region),
        diet_tags,
        contraindications,
    }
}

fn str_vec(items: &[&str]) -> Vec<String> {
    items.iter().map(|&s| s.to_owned()).collect()
}
