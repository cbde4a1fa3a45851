// ABOUTME: Meal plan generation chain: AI generator, catalog engine, static fallback
// ABOUTME: Each step is time-bounded so the chain never blocks indefinitely
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Generation Fallback Chain
//!
//! Three ordered attempts: the external AI generator under a timeout, the
//! catalog recommendation engine, and a fixed minimal plan that is always
//! available. Every fallback transition is logged with its reason, and a
//! generator timeout or error never surfaces to the caller.

use crate::catalog::MealCatalog;
use crate::config::GenerationConfig;
use crate::models::{MealPlan, PlanSource, UserProfile};
use crate::recommendation::RecommendationEngine;
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use std::collections::BTreeSet;
use std::sync::Arc;
use thiserror::Error;
use tokio::time::timeout;
use tracing::{info, warn};

/// Meals per generated day plan (breakfast, lunch, dinner, snack)
const MEALS_PER_PLAN: usize = 4;

/// Failure from the external plan generator
#[derive(Debug, Clone, Error)]
#[error("generator error: {0}")]
pub struct GeneratorError(pub String);

/// External free-text plan generator, treated as opaque and fallback-worthy
#[async_trait]
pub trait PlanGenerator: Send + Sync {
    /// Produce a plan text for the prompt, within the caller's patience
    async fn generate(
        &self,
        prompt: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String, GeneratorError>;
}

/// Orchestrates the three-step generation chain
pub struct GenerationFallbackChain {
    generator: Option<Arc<dyn PlanGenerator>>,
    config: GenerationConfig,
}

impl GenerationFallbackChain {
    /// Build a chain; `generator` is `None` when no AI backend is configured,
    /// in which case the chain starts at the catalog step.
    #[must_use]
    pub fn new(generator: Option<Arc<dyn PlanGenerator>>, config: GenerationConfig) -> Self {
        Self { generator, config }
    }

    /// Produce a plan for `date`. Never fails: the final step is a fixed
    /// always-available plan.
    pub async fn generate_plan(
        &self,
        profile: &UserProfile,
        catalog: &MealCatalog,
        exclude_set: &BTreeSet<String>,
        date: NaiveDate,
    ) -> MealPlan {
        if let Some(text) = self.ai_attempt(profile).await {
            return MealPlan {
                date,
                source: PlanSource::Ai,
                meals: Vec::new(),
                text: Some(text),
                generated_at: Utc::now(),
            };
        }

        let meals = RecommendationEngine::select_plan(profile, catalog, exclude_set, MEALS_PER_PLAN);
        if meals.is_empty() {
            warn!(
                user_id = %profile.user_id,
                "catalog yielded no meals, falling back to static plan"
            );
            return Self::static_fallback(date);
        }
        MealPlan {
            date,
            source: PlanSource::Catalog,
            meals,
            text: None,
            generated_at: Utc::now(),
        }
    }

    /// Step 1: bounded call to the external generator
    async fn ai_attempt(&self, profile: &UserProfile) -> Option<String> {
        let generator = self.generator.as_ref()?;
        let prompt = build_prompt(profile);
        let bounded = timeout(
            self.config.generator_timeout,
            generator.generate(&prompt, self.config.max_tokens, self.config.temperature),
        );
        match bounded.await {
            Ok(Ok(text)) if !text.trim().is_empty() => Some(text),
            Ok(Ok(_)) => {
                warn!(user_id = %profile.user_id, "generator returned empty plan, falling back to catalog");
                None
            }
            Ok(Err(err)) => {
                warn!(user_id = %profile.user_id, %err, "generator failed, falling back to catalog");
                None
            }
            Err(_) => {
                warn!(
                    user_id = %profile.user_id,
                    timeout_secs = self.config.generator_timeout.as_secs(),
                    "generator timed out, falling back to catalog"
                );
                None
            }
        }
    }

    /// Step 3: fixed minimal plan built from the built-in meal set
    fn static_fallback(date: NaiveDate) -> MealPlan {
        info!("serving static fallback meal plan");
        MealPlan {
            date,
            source: PlanSource::StaticFallback,
            meals: MealCatalog::fallback().meals().to_vec(),
            text: None,
            generated_at: Utc::now(),
        }
    }
}

/// Render the profile into a generator prompt
fn build_prompt(profile: &UserProfile) -> String {
    let conditions = if profile.medical_conditions.is_empty() {
        "none".to_owned()
    } else {
        profile
            .medical_conditions
            .iter()
            .cloned()
            .collect::<Vec<_>>()
            .join(", ")
    };
    format!(
        "Create a one-day meal plan (breakfast, lunch, dinner, snack) for \
         {name}, age {age}, following a {diet} diet from the {region} region. \
         Medical conditions: {conditions}. Activity level: {activity:?}. \
         Only suggest regionally appropriate dishes and include approximate \
         calories per meal.",
        name = profile.name,
        age = profile.age,
        diet = profile.diet_type,
        region = profile.region,
        activity = profile.activity_level,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ActivityLevel, DietType, Gender};

    fn profile() -> UserProfile {
        UserProfile {
            user_id: "u1".into(),
            name: "Ravi".into(),
            age: 30,
            gender: Gender::Male,
            diet_type: DietType::Vegetarian,
            region: "karnataka".into(),
            medical_conditions: BTreeSet::new(),
            activity_level: ActivityLevel::Moderate,
        }
    }

    #[test]
    fn prompt_mentions_profile_constraints() {
        let prompt = build_prompt(&profile());
        assert!(prompt.contains("vegetarian"));
        assert!(prompt.contains("karnataka"));
        assert!(prompt.contains("none"));
    }
}
