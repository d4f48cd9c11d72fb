//! Engine entry points combining predictor, solver and insights
//!
//! Two modes:
//! - [`Planner::estimate`] answers "am I on track?" starting from the model
//! - [`Planner::recommend`] answers "what should I save?" starting from the solver

use crate::error::Result;
use crate::handle::ModelHandle;
use crate::insights::{Narrative, NarrativeStyle};
use crate::models::{EstimationResult, FinancialProfile};
use crate::predictor::predict_months;
use crate::solver::calculate_recommendation;

/// Goal estimation engine bound to a serving model
#[derive(Clone)]
pub struct Planner {
    handle: ModelHandle,
    style: NarrativeStyle,
}

impl Planner {
    pub fn new(handle: ModelHandle, style: NarrativeStyle) -> Self {
        Self { handle, style }
    }

    pub fn handle(&self) -> &ModelHandle {
        &self.handle
    }

    pub fn style(&self) -> &NarrativeStyle {
        &self.style
    }

    /// Predict time to goal and reconcile it with the required savings rate
    pub fn estimate(&self, profile: &FinancialProfile) -> Result<EstimationResult> {
        profile.validate()?;
        let model = self.handle.require()?;

        let predicted_months = predict_months(model.as_ref(), profile);
        let recommendation = calculate_recommendation(profile, profile.target_months());
        let narrative = Narrative::reconcile(profile, predicted_months, &recommendation);

        tracing::debug!(
            goal_type = %profile.goal_type,
            predicted_months,
            recommended = recommendation.percent,
            narrative = %narrative.kind(),
            "Estimated goal"
        );

        Ok(EstimationResult {
            goal_type: profile.goal_type.clone(),
            predicted_months,
            recommended_savings_percent: recommendation.percent,
            insight: narrative.render(&self.style),
            feasible: recommendation.feasibility.is_feasible(),
            narrative: narrative.kind(),
        })
    }

    /// Solve for the savings rate first, then predict time under that rate
    pub fn recommend(&self, profile: &FinancialProfile) -> Result<EstimationResult> {
        profile.validate()?;
        let model = self.handle.require()?;

        let recommendation = calculate_recommendation(profile, profile.target_months());
        let narrative = Narrative::plan(profile, &recommendation);

        let adjusted = profile.with_savings_percent(f64::from(recommendation.percent));
        let predicted_months = predict_months(model.as_ref(), &adjusted);

        tracing::debug!(
            goal_type = %profile.goal_type,
            predicted_months,
            recommended = recommendation.percent,
            feasibility = %recommendation.feasibility,
            "Recommended savings plan"
        );

        Ok(EstimationResult {
            goal_type: profile.goal_type.clone(),
            predicted_months,
            recommended_savings_percent: recommendation.percent,
            insight: narrative.render(&self.style),
            feasible: recommendation.feasibility.is_feasible(),
            narrative: narrative.kind(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::forest::ForestConfig;
    use crate::models::NarrativeKind;
    use crate::synthetic::generate_synthetic_dataset;
    use crate::trainer::{Trainer, TrainerConfig};

    fn planner() -> Planner {
        let model = Trainer::new(TrainerConfig {
            forest: ForestConfig {
                n_trees: 8,
                ..Default::default()
            },
            ..Default::default()
        })
        .train(&generate_synthetic_dataset(300, 42))
        .unwrap()
        .model;
        Planner::new(ModelHandle::with_model(model), NarrativeStyle::default())
    }

    #[test]
    fn test_estimate_without_model() {
        let planner = Planner::new(ModelHandle::empty(), NarrativeStyle::default());
        let profile = FinancialProfile::new(100_000.0, 50_000.0, 240_000.0, "car", 2);
        assert!(matches!(
            planner.estimate(&profile),
            Err(Error::ModelUnavailable)
        ));
        assert!(matches!(
            planner.recommend(&profile),
            Err(Error::ModelUnavailable)
        ));
    }

    #[test]
    fn test_estimate_rejects_invalid_profile() {
        let profile = FinancialProfile::new(-1.0, 50_000.0, 240_000.0, "car", 2);
        assert!(matches!(
            planner().estimate(&profile),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_estimate_outputs_in_range() {
        let planner = planner();
        for (salary, expenses, goal, years) in [
            (100_000.0, 60_000.0, 600_000.0, 1),
            (100_000.0, 50_000.0, 240_000.0, 2),
            (30_000.0, 29_000.0, 4_900_000.0, 9),
            (200_000.0, 10_000.0, 100.0, 1),
            (1_000.0, 5_000.0, 50_000.0, 3),
        ] {
            let profile = FinancialProfile::new(salary, expenses, goal, "car", years);
            let result = planner.estimate(&profile).unwrap();
            assert!(result.predicted_months >= 1);
            assert!((1..=100).contains(&result.recommended_savings_percent));
            assert!(!result.insight.is_empty());
            assert_eq!(result.goal_type, "car");
        }
    }

    #[test]
    fn test_estimate_branch_matches_prediction() {
        let planner = planner();
        let profile = FinancialProfile::new(100_000.0, 50_000.0, 240_000.0, "car", 2);
        let result = planner.estimate(&profile).unwrap();

        if result.predicted_months <= 24 {
            assert_eq!(result.narrative, NarrativeKind::OnTrack);
        } else {
            // Savings cover the requirement, so a late prediction is model noise
            assert_eq!(result.narrative, NarrativeKind::ModelNoise);
        }
        assert_eq!(result.recommended_savings_percent, 60);
        assert!(result.feasible);
    }

    #[test]
    fn test_recommend_infeasible_goal() {
        let profile = FinancialProfile::new(100_000.0, 60_000.0, 600_000.0, "house", 1);
        let result = planner().recommend(&profile).unwrap();

        assert_eq!(result.recommended_savings_percent, 100);
        assert!(!result.feasible);
        assert_eq!(result.narrative, NarrativeKind::Infeasible);
        assert!(result.insight.contains("**Warning**"));
    }

    #[test]
    fn test_recommend_feasible_goal() {
        let profile = FinancialProfile::new(100_000.0, 50_000.0, 240_000.0, "car", 2);
        let planner = planner();
        let result = planner.recommend(&profile).unwrap();

        assert_eq!(result.recommended_savings_percent, 60);
        assert!(result.feasible);
        assert_eq!(result.narrative, NarrativeKind::SavingsPlan);
        assert!(result.insight.contains("₹10,000"));

        // The pass-through percent is not a model feature
        let estimate = planner.estimate(&profile).unwrap();
        assert_eq!(result.predicted_months, estimate.predicted_months);
    }
}
