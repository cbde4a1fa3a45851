// ABOUTME: Constraint filtering and fixed-order relaxation behavior
// ABOUTME: Catalogs constructed per test to force each relaxation level
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2026 Nutrio

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use nutrio_server::catalog::{MealCatalog, RawMeal};
use nutrio_server::models::{ActivityLevel, DietType, Gender, UserProfile};
use nutrio_server::recommendation::RecommendationEngine;
use std::collections::BTreeSet;

fn raw(name: &str, ingredients: &[&str], calories: u32, region: &str) -> RawMeal {
    RawMeal {
        name: name.to_owned(),
        ingredients: ingredients.iter().map(|&i| i.to_owned()).collect(),
        calories,
        health_note: String::new(),
        region: region.to_owned(),
    }
}

fn profile(diet: DietType, region: &str, conditions: &[&str]) -> UserProfile {
    UserProfile {
        user_id: "u1".to_owned(),
        name: "Ravi Kumar".to_owned(),
        age: 30,
        gender: Gender::Male,
        diet_type: diet,
        region: region.to_owned(),
        medical_conditions: conditions.iter().map(|&c| c.to_owned()).collect(),
        activity_level: ActivityLevel::Moderate,
    }
}

#[test]
fn fully_constrained_match_wins_when_available() {
    let catalog = MealCatalog::from_raw(vec![
        raw("Ragi Mudde", &["ragi", "water"], 150, "karnataka"),
        raw("Veg Pulao", &["rice", "vegetables"], 260, ""),
    ]);
    let chosen = RecommendationEngine::select(
        &profile(DietType::Vegetarian, "karnataka", &[]),
        &catalog,
        &BTreeSet::new(),
    )
    .expect("non-empty catalog always yields a meal");
    assert_eq!(chosen.name, "Ragi Mudde");
}

#[test]
fn regional_gap_relaxes_to_pan_regional_meals() {
    // The only regional meal is meat, so a vegetarian falls through to the
    // pan-regional pool rather than getting nothing.
    let catalog = MealCatalog::from_raw(vec![
        raw("Chicken Curry", &["chicken", "spices"], 340, "karnataka"),
        raw("Veg Pulao", &["rice", "vegetables"], 260, ""),
    ]);
    let chosen = RecommendationEngine::select(
        &profile(DietType::Vegetarian, "karnataka", &[]),
        &catalog,
        &BTreeSet::new(),
    )
    .expect("relaxation must find the pan-regional meal");
    assert_eq!(chosen.name, "Veg Pulao");
}

#[test]
fn medical_constraints_relax_before_diet() {
    // Every vegetarian meal is contraindicated for diabetes; the engine drops
    // the medical filter before it ever serves meat to a vegetarian.
    let catalog = MealCatalog::from_raw(vec![
        raw("Festive Thali", &["rice", "vegetables", "ghee"], 450, ""),
        raw("Grilled Fish", &["fish", "lemon"], 200, ""),
    ]);
    let chosen = RecommendationEngine::select(
        &profile(DietType::Vegetarian, "kerala", &["diabetes"]),
        &catalog,
        &BTreeSet::new(),
    )
    .expect("relaxation must find the vegetarian meal");
    assert_eq!(chosen.name, "Festive Thali");
}

#[test]
fn exclusions_are_relaxed_last() {
    let catalog = MealCatalog::from_raw(vec![raw("Veg Pulao", &["rice", "vegetables"], 260, "")]);
    let exclude: BTreeSet<String> = ["Veg Pulao".to_owned()].into();
    let chosen = RecommendationEngine::select(
        &profile(DietType::Vegetarian, "", &[]),
        &catalog,
        &exclude,
    )
    .expect("the sole meal is re-served rather than returning nothing");
    assert_eq!(chosen.name, "Veg Pulao");
}

#[test]
fn empty_catalog_yields_none() {
    let catalog = MealCatalog::from_records(vec![]);
    let chosen = RecommendationEngine::select(
        &profile(DietType::Mixed, "", &[]),
        &catalog,
        &BTreeSet::new(),
    );
    assert!(chosen.is_none());
}

#[test]
fn plan_selection_yields_distinct_meals() {
    let catalog = MealCatalog::from_raw(vec![
        raw("Veg Pulao", &["rice", "vegetables"], 260, ""),
        raw("Dal Tadka", &["lentils", "spices"], 200, ""),
        raw("Cucumber Salad", &["cucumber", "lemon"], 60, ""),
        raw("Chapati", &["wheat flour", "water"], 120, ""),
        raw("Upma", &["semolina", "vegetables"], 220, ""),
        raw("Poha", &["flattened rice", "peanuts"], 240, ""),
    ]);
    let meals = RecommendationEngine::select_plan(
        &profile(DietType::Vegetarian, "", &[]),
        &catalog,
        &BTreeSet::new(),
        4,
    );
    assert_eq!(meals.len(), 4);
    let names: BTreeSet<&str> = meals.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names.len(), 4);
}

#[test]
fn small_pools_yield_fewer_meals_instead_of_duplicates() {
    let catalog = MealCatalog::from_raw(vec![
        raw("Veg Pulao", &["rice", "vegetables"], 260, ""),
        raw("Dal Tadka", &["lentils", "spices"], 200, ""),
    ]);
    let meals = RecommendationEngine::select_plan(
        &profile(DietType::Vegetarian, "", &[]),
        &catalog,
        &BTreeSet::new(),
        4,
    );
    assert_eq!(meals.len(), 2);
}
