// ABOUTME: Degrade-to-cache behavior of the profile store under store outages
// ABOUTME: Failure modes scripted on the in-memory durable store backend
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2026 Nutrio

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use anyhow::Result;
use nutrio_server::cache::BoundedCache;
use nutrio_server::config::{CacheConfig, RetryConfig};
use nutrio_server::errors::ErrorCode;
use nutrio_server::models::{ActivityLevel, DietType, Gender, UserProfile};
use nutrio_server::profiles::ProfileStore;
use nutrio_server::store::adapter::PersistenceAdapter;
use nutrio_server::store::memory::{FailureMode, InMemoryStore};
use nutrio_server::store::{paths, DurableStore};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

fn fast_retry() -> RetryConfig {
    RetryConfig {
        max_attempts: 3,
        initial_backoff: Duration::from_millis(1),
    }
}

fn profile_store(store: Arc<InMemoryStore>) -> ProfileStore {
    ProfileStore::new(
        BoundedCache::new(CacheConfig::default()),
        PersistenceAdapter::new(store, fast_retry()),
    )
}

fn test_profile(user_id: &str) -> UserProfile {
    UserProfile {
        user_id: user_id.to_owned(),
        name: "Ravi Kumar".to_owned(),
        age: 30,
        gender: Gender::Male,
        diet_type: DietType::Vegetarian,
        region: "karnataka".to_owned(),
        medical_conditions: BTreeSet::new(),
        activity_level: ActivityLevel::Moderate,
    }
}

#[tokio::test]
async fn saves_survive_a_store_outage_through_the_cache() -> Result<()> {
    let store = Arc::new(InMemoryStore::new());
    let profiles = profile_store(Arc::clone(&store));
    store.set_failure_mode(FailureMode::AlwaysTransient);

    // The durable write fails after retries but the save still succeeds.
    profiles.save_profile(test_profile("u1")).await?;
    assert_eq!(store.write_count(), 0);

    // Reads in this process observe the update from the cache.
    let read_back = profiles.get_profile("u1").await?;
    assert_eq!(read_back.name, "Ravi Kumar");
    Ok(())
}

#[tokio::test]
async fn durable_write_succeeds_after_transient_failures() -> Result<()> {
    let store = Arc::new(InMemoryStore::new());
    let profiles = profile_store(Arc::clone(&store));
    store.set_failure_mode(FailureMode::TransientTimes(2));

    profiles.save_profile(test_profile("u1")).await?;
    assert_eq!(store.write_count(), 1);

    // A fresh process with an empty cache reads the durable copy.
    let fresh = profile_store(Arc::clone(&store));
    assert_eq!(fresh.get_profile("u1").await?.name, "Ravi Kumar");
    Ok(())
}

#[tokio::test]
async fn grocery_and_cart_round_trip_through_a_failing_store() -> Result<()> {
    use nutrio_server::models::{CartSelection, GroceryList};

    let store = Arc::new(InMemoryStore::new());
    let profiles = profile_store(Arc::clone(&store));
    store.set_failure_mode(FailureMode::AlwaysTransient);

    profiles
        .save_grocery_list(
            "u1",
            GroceryList {
                items: vec!["tomato".to_owned(), "rice".to_owned()],
            },
        )
        .await?;
    profiles
        .save_cart(
            "u1",
            CartSelection {
                selected: ["tomato".to_owned()].into(),
            },
        )
        .await?;
    assert_eq!(store.write_count(), 0);

    // Both records still read back from the cache while the store is down.
    let list = profiles.grocery_list("u1").await?;
    assert_eq!(list.items, vec!["tomato".to_owned(), "rice".to_owned()]);
    let cart = profiles.cart("u1").await?;
    assert!(cart.selected.contains("tomato"));
    Ok(())
}

#[tokio::test]
async fn read_through_populates_the_cache() -> Result<()> {
    let store = Arc::new(InMemoryStore::new());
    store
        .set(
            &paths::profile("u1"),
            serde_json::to_value(test_profile("u1"))?,
        )
        .await?;

    let profiles = profile_store(Arc::clone(&store));
    assert_eq!(profiles.get_profile("u1").await?.age, 30);

    // The store can now go dark; the cached copy keeps serving.
    store.set_failure_mode(FailureMode::AlwaysTransient);
    assert_eq!(profiles.get_profile("u1").await?.age, 30);
    Ok(())
}

#[tokio::test]
async fn failed_read_with_cold_cache_reports_absence() {
    let store = Arc::new(InMemoryStore::new());
    store.set_failure_mode(FailureMode::AlwaysPermanent);
    let profiles = profile_store(store);

    let err = profiles
        .get_profile("u1")
        .await
        .expect_err("nothing cached and the store is down");
    assert_eq!(err.code, ErrorCode::ResourceNotFound);
}

#[tokio::test]
async fn invalid_profiles_are_rejected_before_any_write() {
    let store = Arc::new(InMemoryStore::new());
    let profiles = profile_store(Arc::clone(&store));

    let mut too_young = test_profile("u1");
    too_young.age = 0;
    let err = profiles
        .save_profile(too_young)
        .await
        .expect_err("age outside 1-120 must fail");
    assert_eq!(err.code, ErrorCode::InvalidInput);

    let mut short_name = test_profile("u1");
    short_name.name = "R".to_owned();
    let err = profiles
        .save_profile(short_name)
        .await
        .expect_err("one-character name must fail");
    assert_eq!(err.code, ErrorCode::InvalidInput);

    assert_eq!(store.write_count(), 0);
}

#[tokio::test]
async fn disliked_meals_collect_thumbs_down_names() -> Result<()> {
    use chrono::Utc;
    use nutrio_server::models::MealRating;

    let profiles = profile_store(Arc::new(InMemoryStore::new()));
    for (name, liked) in [("Veg Pulao", true), ("Chicken Curry", false)] {
        profiles
            .add_rating(
                "u1",
                MealRating {
                    meal_name: name.to_owned(),
                    liked,
                    feedback: String::new(),
                    rated_at: Utc::now(),
                },
            )
            .await?;
    }
    let disliked = profiles.disliked_meals("u1").await?;
    assert!(disliked.contains("Chicken Curry"));
    assert!(!disliked.contains("Veg Pulao"));
    Ok(())
}
