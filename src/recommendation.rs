// ABOUTME: Deterministic meal filtering with uniform random selection
// ABOUTME: Fixed-order constraint relaxation when no candidate survives
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Recommendation Engine
//!
//! Filtering is a strict conjunction: diet tag, region (when the catalog has
//! entries for the profile's region), no contraindication overlap, and no
//! prior exclusions. Selection among survivors is uniformly random for
//! variety. When nothing survives, constraints relax in a fixed order:
//! region first, medical exclusions second, diet last, and finally the
//! exclusion set itself, so `None` is returned only for an empty catalog.

use crate::catalog::MealCatalog;
use crate::models::{MealRecord, UserProfile};
use rand::seq::SliceRandom;
use std::collections::BTreeSet;
use tracing::{debug, info};

/// Constraint sets applied in relaxation order, strictest first
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Relaxation {
    Full,
    NoRegion,
    NoMedical,
    NoDiet,
    ExclusionsOnly,
}

const RELAXATION_ORDER: [Relaxation; 5] = [
    Relaxation::Full,
    Relaxation::NoRegion,
    Relaxation::NoMedical,
    Relaxation::NoDiet,
    Relaxation::ExclusionsOnly,
];

/// Selects meals from the catalog for a profile
pub struct RecommendationEngine;

impl RecommendationEngine {
    /// Pick one meal for the profile, excluding `exclude_set` names.
    ///
    /// Returns `None` only when the catalog itself is empty.
    #[must_use]
    pub fn select(
        profile: &UserProfile,
        catalog: &MealCatalog,
        exclude_set: &BTreeSet<String>,
    ) -> Option<MealRecord> {
        if catalog.is_empty() {
            return None;
        }
        for level in RELAXATION_ORDER {
            let candidates = Self::candidates(profile, catalog, exclude_set, level);
            if candidates.is_empty() {
                continue;
            }
            if level != Relaxation::Full {
                info!(
                    user_id = %profile.user_id,
                    level = ?level,
                    "relaxed recommendation constraints"
                );
            }
            let chosen = candidates.choose(&mut rand::thread_rng()).copied();
            return chosen.cloned();
        }
        // Unreachable for a non-empty catalog: the last level keeps everything.
        None
    }

    /// Pick up to `count` distinct meals for one day's plan.
    ///
    /// Already-chosen names join the exclusion set between picks so a small
    /// candidate pool yields fewer meals rather than duplicates.
    #[must_use]
    pub fn select_plan(
        profile: &UserProfile,
        catalog: &MealCatalog,
        exclude_set: &BTreeSet<String>,
        count: usize,
    ) -> Vec<MealRecord> {
        let mut chosen = Vec::with_capacity(count);
        let mut exclude = exclude_set.clone();
        for _ in 0..count {
            let Some(meal) = Self::select(profile, catalog, &exclude) else {
                break;
            };
            if !exclude.insert(meal.name.clone()) {
                // The relaxed final level can re-serve an excluded meal;
                // stop rather than repeat it within one plan.
                break;
            }
            chosen.push(meal);
        }
        chosen
    }

    fn candidates<'a>(
        profile: &UserProfile,
        catalog: &'a MealCatalog,
        exclude_set: &BTreeSet<String>,
        level: Relaxation,
    ) -> Vec<&'a MealRecord> {
        // Region filtering only applies when the catalog actually carries
        // entries for the profile's region; otherwise the full national
        // catalog is in play.
        let apply_region = level == Relaxation::Full && catalog.has_region(&profile.region);
        let apply_medical = matches!(level, Relaxation::Full | Relaxation::NoRegion);
        let apply_diet = !matches!(level, Relaxation::NoDiet | Relaxation::ExclusionsOnly);
        let apply_exclusions = level != Relaxation::ExclusionsOnly;

        let survivors: Vec<&MealRecord> = catalog
            .meals()
            .iter()
            .filter(|meal| {
                if apply_diet
                    && !meal
                        .diet_tags
                        .iter()
                        .any(|tag| profile.diet_type.accepts(*tag))
                {
                    return false;
                }
                if apply_region && meal.region != profile.region {
                    return false;
                }
                if apply_medical
                    && meal
                        .contraindications
                        .iter()
                        .any(|c| profile.medical_conditions.contains(c))
                {
                    return false;
                }
                if apply_exclusions && exclude_set.contains(&meal.name) {
                    return false;
                }
                true
            })
            .collect();

        debug!(
            level = ?level,
            count = survivors.len(),
            "recommendation candidate pool"
        );
        survivors
    }
}
