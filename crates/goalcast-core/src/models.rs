//! Domain models for Goalcast

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Months in a planning year
pub const MONTHS_PER_YEAR: u32 = 12;

/// A person's financial situation and savings goal for one estimation request
///
/// Amounts are monthly figures in a single currency. Profiles arriving from
/// outside the crate should pass through [`FinancialProfile::validate`] before
/// reaching the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialProfile {
    /// Monthly salary
    pub salary: f64,
    /// Monthly fixed and variable expenses
    pub expenses: f64,
    /// Target goal amount
    pub goal_amount: f64,
    /// Free-text goal label (car, house, trip...)
    pub goal_type: String,
    /// Desired time to reach the goal, in years
    pub duration_years: u32,
    /// Current or hypothetical savings percentage (0-100), carried through untouched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub savings_percent: Option<f64>,
}

impl FinancialProfile {
    pub fn new(
        salary: f64,
        expenses: f64,
        goal_amount: f64,
        goal_type: impl Into<String>,
        duration_years: u32,
    ) -> Self {
        Self {
            salary,
            expenses,
            goal_amount,
            goal_type: goal_type.into(),
            duration_years,
            savings_percent: None,
        }
    }

    /// Copy of this profile with the savings percentage replaced
    pub fn with_savings_percent(&self, percent: f64) -> Self {
        Self {
            savings_percent: Some(percent),
            ..self.clone()
        }
    }

    /// Desired duration expressed in months
    pub fn target_months(&self) -> u32 {
        self.duration_years.saturating_mul(MONTHS_PER_YEAR)
    }

    /// Salary minus expenses (negative when expenses exceed salary)
    pub fn net_income(&self) -> f64 {
        self.salary - self.expenses
    }

    /// Check the boundary guarantees the engine relies on
    pub fn validate(&self) -> Result<()> {
        positive("salary", self.salary)?;
        positive("expenses", self.expenses)?;
        positive("goal_amount", self.goal_amount)?;

        if self.duration_years == 0 {
            return Err(Error::InvalidInput(
                "duration_years must be greater than 0".to_string(),
            ));
        }

        if self.goal_type.trim().is_empty() {
            return Err(Error::InvalidInput("goal_type must not be empty".to_string()));
        }

        if let Some(percent) = self.savings_percent {
            if !percent.is_finite() || !(0.0..=100.0).contains(&percent) {
                return Err(Error::InvalidInput(format!(
                    "savings_percent must be between 0 and 100, got {}",
                    percent
                )));
            }
        }

        Ok(())
    }
}

fn positive(field: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidInput(format!(
            "{} must be greater than 0, got {}",
            field, value
        )))
    }
}

/// One labelled synthetic scenario
///
/// Field order matches the CSV column order of exported datasets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingRecord {
    pub salary: f64,
    pub expenses: f64,
    pub goal_amount: f64,
    pub duration_years: u32,
    pub goal_type: String,
    /// Savings rate used to compute the label, as a percentage (0-100)
    pub savings_percent: f64,
    /// Months needed to reach the goal (label, 1-120)
    pub time_months: u32,
    /// Whether the goal lands inside the desired duration (diagnostic only)
    pub achieved: bool,
}

/// Whether a goal can be reached within the target window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feasibility {
    /// Reachable using at most all of net income
    Feasible,
    /// Needs more per month than net income provides
    Infeasible,
}

impl Feasibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Feasible => "feasible",
            Self::Infeasible => "infeasible",
        }
    }

    pub fn is_feasible(&self) -> bool {
        matches!(self, Self::Feasible)
    }
}

impl std::fmt::Display for Feasibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Output of the closed-form savings solver
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    /// Percent of salary to set aside (expenses plus goal savings), 1-100
    pub percent: u8,
    pub feasibility: Feasibility,
    /// Goal amount divided by the target months
    pub monthly_savings_needed: f64,
    /// Salary minus expenses
    pub net_income: f64,
}

/// Which narrative branch produced an insight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NarrativeKind {
    /// Predicted completion lands inside the target window
    OnTrack,
    /// Behind schedule and current savings fall short of the requirement
    BehindSchedule,
    /// Behind schedule per the model, although current savings already suffice
    ModelNoise,
    /// Recommendation mode: the goal needs more than all of net income
    Infeasible,
    /// Recommendation mode: a feasible monthly savings plan
    SavingsPlan,
}

impl NarrativeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OnTrack => "on_track",
            Self::BehindSchedule => "behind_schedule",
            Self::ModelNoise => "model_noise",
            Self::Infeasible => "infeasible",
            Self::SavingsPlan => "savings_plan",
        }
    }
}

impl std::fmt::Display for NarrativeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for NarrativeKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "on_track" => Ok(Self::OnTrack),
            "behind_schedule" => Ok(Self::BehindSchedule),
            "model_noise" => Ok(Self::ModelNoise),
            "infeasible" => Ok(Self::Infeasible),
            "savings_plan" => Ok(Self::SavingsPlan),
            _ => Err(format!("Unknown narrative kind: {}", s)),
        }
    }
}

/// Response for a single estimation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimationResult {
    pub goal_type: String,
    /// Model estimate of months to goal, always >= 1
    pub predicted_months: u32,
    /// Solver output, always within 1-100
    pub recommended_savings_percent: u8,
    pub insight: String,
    /// Solver feasibility at the desired duration
    pub feasible: bool,
    pub narrative: NarrativeKind,
}
