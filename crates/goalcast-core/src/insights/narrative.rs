//! Narrative selection and rendering
//!
//! The learned estimate and the closed-form solver are independent and can
//! disagree. Every combination of inputs maps to exactly one [`Narrative`].

use serde::{Deserialize, Serialize};

use crate::models::{FinancialProfile, NarrativeKind, Recommendation};

use super::style::NarrativeStyle;

/// The story told to the user about their goal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Narrative {
    /// Predicted completion fits inside the desired duration
    OnTrack {
        goal_type: String,
        /// Net income as a percentage of salary
        current_savings_rate: f64,
        /// Net income per month
        monthly_savings: f64,
        predicted_months: u32,
    },
    /// Behind schedule; current savings fall short by `monthly_shortfall`
    BehindSchedule {
        duration_years: u32,
        monthly_shortfall: f64,
        recommended_percent: u8,
    },
    /// Behind schedule per the model although current savings already suffice
    ModelNoise {
        duration_years: u32,
        recommended_percent: u8,
    },
    /// Recommendation mode: more than all of net income would be needed
    Infeasible,
    /// Recommendation mode: save this much each month on top of expenses
    SavingsPlan {
        goal_type: String,
        duration_years: u32,
        monthly_over_expenses: f64,
        recommended_percent: u8,
    },
}

impl Narrative {
    /// Reconcile a predicted completion time with the solver's recommendation
    pub fn reconcile(
        profile: &FinancialProfile,
        predicted_months: u32,
        recommendation: &Recommendation,
    ) -> Self {
        let target_months = profile.target_months();
        let net_income = profile.net_income();

        if predicted_months <= target_months {
            return Self::OnTrack {
                goal_type: profile.goal_type.clone(),
                current_savings_rate: net_income / profile.salary * 100.0,
                monthly_savings: net_income,
                predicted_months,
            };
        }

        let required_per_month = profile.goal_amount / f64::from(target_months.max(1));
        let shortfall = required_per_month - net_income;

        if shortfall > 0.0 {
            Self::BehindSchedule {
                duration_years: profile.duration_years,
                monthly_shortfall: shortfall,
                recommended_percent: recommendation.percent,
            }
        } else {
            tracing::debug!(
                predicted_months,
                target_months,
                shortfall,
                "Model and solver disagree, using recommended rate"
            );
            Self::ModelNoise {
                duration_years: profile.duration_years,
                recommended_percent: recommendation.percent,
            }
        }
    }

    /// Narrative for recommendation-first mode, chosen by feasibility
    pub fn plan(profile: &FinancialProfile, recommendation: &Recommendation) -> Self {
        if !recommendation.feasibility.is_feasible() {
            return Self::Infeasible;
        }

        let set_aside = f64::from(recommendation.percent) / 100.0 * profile.salary;
        Self::SavingsPlan {
            goal_type: profile.goal_type.clone(),
            duration_years: profile.duration_years,
            monthly_over_expenses: set_aside - profile.expenses,
            recommended_percent: recommendation.percent,
        }
    }

    pub fn kind(&self) -> NarrativeKind {
        match self {
            Self::OnTrack { .. } => NarrativeKind::OnTrack,
            Self::BehindSchedule { .. } => NarrativeKind::BehindSchedule,
            Self::ModelNoise { .. } => NarrativeKind::ModelNoise,
            Self::Infeasible => NarrativeKind::Infeasible,
            Self::SavingsPlan { .. } => NarrativeKind::SavingsPlan,
        }
    }

    /// Insight text shown to the user
    pub fn render(&self, style: &NarrativeStyle) -> String {
        match self {
            Self::OnTrack {
                goal_type,
                current_savings_rate,
                monthly_savings,
                predicted_months,
            } => format!(
                "You are on track! By saving **{:.0}%** of your salary ({}/month), you will reach your {} goal in {} {}.",
                current_savings_rate,
                style.amount(*monthly_savings),
                goal_type,
                predicted_months,
                plural(*predicted_months, "month", "months")
            ),
            Self::BehindSchedule {
                duration_years,
                monthly_shortfall,
                recommended_percent,
            } => format!(
                "To hit your target of {} {}, you need to increase your monthly savings by **{}**. This translates to a recommended savings rate of {}%.",
                duration_years,
                plural(*duration_years, "year", "years"),
                style.amount(*monthly_shortfall),
                recommended_percent
            ),
            Self::ModelNoise {
                duration_years,
                recommended_percent,
            } => format!(
                "The model suggests you may take longer. Save **{}%** of your salary to reach your goal in exactly {} {}.",
                recommended_percent,
                duration_years,
                plural(*duration_years, "year", "years")
            ),
            Self::Infeasible => "**Warning**: To reach your goal in the desired time you would have to save more than all of your net income (salary minus expenses). Consider extending your duration or lowering the goal amount.".to_string(),
            Self::SavingsPlan {
                goal_type,
                duration_years,
                monthly_over_expenses,
                recommended_percent,
            } => format!(
                "To reach your **{}** goal in **{} {}**, you must save **{}** monthly on top of your current expenses. This corresponds to the recommended savings rate of {}%.",
                goal_type,
                duration_years,
                plural(*duration_years, "year", "years"),
                style.amount(*monthly_over_expenses),
                recommended_percent
            ),
        }
    }
}

fn plural(n: u32, one: &'static str, many: &'static str) -> &'static str {
    if n == 1 {
        one
    } else {
        many
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::calculate_recommendation;

    fn style() -> NarrativeStyle {
        NarrativeStyle::default()
    }

    fn reconcile(profile: &FinancialProfile, predicted: u32) -> Narrative {
        let rec = calculate_recommendation(profile, profile.target_months());
        Narrative::reconcile(profile, predicted, &rec)
    }

    #[test]
    fn test_on_track_when_prediction_fits() {
        let profile = FinancialProfile::new(100_000.0, 60_000.0, 400_000.0, "car", 1);
        let narrative = reconcile(&profile, 12);

        assert_eq!(narrative.kind(), NarrativeKind::OnTrack);
        let text = narrative.render(&style());
        assert!(text.contains("**40%**"), "{}", text);
        assert!(text.contains("₹40,000/month"), "{}", text);
        assert!(text.contains("car goal in 12 months"), "{}", text);
    }

    #[test]
    fn test_behind_schedule_reports_shortfall() {
        // Needs 50_000/month against 40_000 net income
        let profile = FinancialProfile::new(100_000.0, 60_000.0, 600_000.0, "house", 1);
        let narrative = reconcile(&profile, 15);

        assert_eq!(
            narrative,
            Narrative::BehindSchedule {
                duration_years: 1,
                monthly_shortfall: 10_000.0,
                recommended_percent: 100,
            }
        );
        let text = narrative.render(&style());
        assert!(text.contains("**₹10,000**"), "{}", text);
        assert!(text.contains("target of 1 year,"), "{}", text);
        assert!(text.contains("100%"), "{}", text);
    }

    #[test]
    fn test_model_noise_when_savings_already_suffice() {
        let profile = FinancialProfile::new(100_000.0, 50_000.0, 240_000.0, "car", 2);
        let narrative = reconcile(&profile, 30);

        assert_eq!(
            narrative,
            Narrative::ModelNoise {
                duration_years: 2,
                recommended_percent: 60,
            }
        );
        assert!(narrative.render(&style()).contains("**60%**"));
    }

    #[test]
    fn test_zero_gap_counts_as_model_noise() {
        // Required exactly equals net income
        let profile = FinancialProfile::new(30_000.0, 20_000.0, 120_000.0, "trip", 1);
        assert_eq!(reconcile(&profile, 13).kind(), NarrativeKind::ModelNoise);
    }

    #[test]
    fn test_every_combination_selects_one_branch() {
        for predicted in [1, 11, 12, 13, 120] {
            for goal in [1_000.0, 119_999.0, 120_000.0, 120_001.0, 1e7] {
                let profile = FinancialProfile::new(30_000.0, 20_000.0, goal, "trip", 1);
                let narrative = reconcile(&profile, predicted);
                let gap = goal / 12.0 - 10_000.0;

                let expected = if predicted <= 12 {
                    NarrativeKind::OnTrack
                } else if gap > 0.0 {
                    NarrativeKind::BehindSchedule
                } else {
                    NarrativeKind::ModelNoise
                };
                assert_eq!(narrative.kind(), expected, "predicted {} goal {}", predicted, goal);
                assert!(!narrative.render(&style()).is_empty());
            }
        }
    }

    #[test]
    fn test_on_track_with_negative_net_income_renders() {
        let profile = FinancialProfile::new(2_000.0, 2_500.0, 1_000.0, "gift", 1);
        let text = reconcile(&profile, 3).render(&style());
        assert!(text.contains("-25%"), "{}", text);
        assert!(text.contains("-₹500/month"), "{}", text);
    }

    #[test]
    fn test_plan_uses_feasibility_flag() {
        let infeasible = FinancialProfile::new(100_000.0, 60_000.0, 600_000.0, "house", 1);
        let rec = calculate_recommendation(&infeasible, 12);
        assert_eq!(Narrative::plan(&infeasible, &rec), Narrative::Infeasible);

        // Exactly 100% but feasible still gets a plan
        let exact = FinancialProfile::new(30_000.0, 20_000.0, 120_000.0, "trip", 1);
        let rec = calculate_recommendation(&exact, 12);
        assert_eq!(rec.percent, 100);
        assert_eq!(Narrative::plan(&exact, &rec).kind(), NarrativeKind::SavingsPlan);
    }

    #[test]
    fn test_plan_amount_over_expenses() {
        let profile = FinancialProfile::new(100_000.0, 50_000.0, 240_000.0, "car", 2);
        let rec = calculate_recommendation(&profile, 24);
        let narrative = Narrative::plan(&profile, &rec);

        match &narrative {
            Narrative::SavingsPlan {
                monthly_over_expenses,
                recommended_percent,
                ..
            } => {
                assert_eq!(*recommended_percent, 60);
                assert!((monthly_over_expenses - 10_000.0).abs() < 1e-6);
            }
            other => panic!("unexpected narrative: {:?}", other),
        }

        let text = narrative.render(&style());
        assert!(text.contains("**car** goal in **2 years**"), "{}", text);
        assert!(text.contains("**₹10,000**"), "{}", text);
    }

    #[test]
    fn test_infeasible_text() {
        let text = Narrative::Infeasible.render(&style());
        assert!(text.starts_with("**Warning**"));
        assert!(text.contains("extending your duration"));
    }

    #[test]
    fn test_custom_currency_symbol() {
        let profile = FinancialProfile::new(5_000.0, 3_000.0, 12_000.0, "trip", 1);
        let custom = NarrativeStyle {
            currency_symbol: "$".to_string(),
        };
        let text = reconcile(&profile, 6).render(&custom);
        assert!(text.contains("$2,000/month"), "{}", text);
    }

    #[test]
    fn test_narrative_serializes_with_kind_tag() {
        let json = serde_json::to_value(Narrative::ModelNoise {
            duration_years: 3,
            recommended_percent: 45,
        })
        .unwrap();
        assert_eq!(json["kind"], "model_noise");
        assert_eq!(json["recommended_percent"], 45);
    }
}
