//! Feature derivation shared by training and inference
//!
//! The model consumes four features in a fixed order. That order lives in
//! exactly one place, [`FeatureVector::to_row`], and both the trainer and the
//! predictor build their inputs through [`FeatureVector`].

use serde::{Deserialize, Serialize};

use crate::models::{FinancialProfile, TrainingRecord, MONTHS_PER_YEAR};

/// Features derived from raw financial inputs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DerivedFeatures {
    /// Salary minus expenses; not clamped
    pub net_income: f64,
    /// Monthly amount needed to reach the goal within the desired duration
    pub required_savings_rate: f64,
}

impl DerivedFeatures {
    pub fn compute(salary: f64, expenses: f64, goal_amount: f64, duration_years: u32) -> Self {
        let months = f64::from(duration_years) * f64::from(MONTHS_PER_YEAR);
        Self {
            net_income: salary - expenses,
            required_savings_rate: goal_amount / months,
        }
    }
}

/// Derive the engineered features for a profile
pub fn derive_features(profile: &FinancialProfile) -> DerivedFeatures {
    DerivedFeatures::compute(
        profile.salary,
        profile.expenses,
        profile.goal_amount,
        profile.duration_years,
    )
}

/// Number of model input columns
pub const FEATURE_COUNT: usize = 4;

/// The model's input, one named field per column
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub net_income: f64,
    pub required_savings_rate: f64,
    pub salary: f64,
    pub expenses: f64,
}

impl FeatureVector {
    /// Column names in model order
    pub const NAMES: [&'static str; FEATURE_COUNT] =
        ["net_income", "required_savings_rate", "salary", "expenses"];

    pub fn from_profile(profile: &FinancialProfile) -> Self {
        let derived = derive_features(profile);
        Self {
            net_income: derived.net_income,
            required_savings_rate: derived.required_savings_rate,
            salary: profile.salary,
            expenses: profile.expenses,
        }
    }

    pub fn from_record(record: &TrainingRecord) -> Self {
        let derived = DerivedFeatures::compute(
            record.salary,
            record.expenses,
            record.goal_amount,
            record.duration_years,
        );
        Self {
            net_income: derived.net_income,
            required_savings_rate: derived.required_savings_rate,
            salary: record.salary,
            expenses: record.expenses,
        }
    }

    /// Values in model column order (see [`FeatureVector::NAMES`])
    pub fn to_row(&self) -> [f64; FEATURE_COUNT] {
        [
            self.net_income,
            self.required_savings_rate,
            self.salary,
            self.expenses,
        ]
    }

    /// Name of the first non-finite column, if any
    pub fn first_non_finite(&self) -> Option<&'static str> {
        self.to_row()
            .iter()
            .zip(Self::NAMES)
            .find(|(value, _)| !value.is_finite())
            .map(|(_, name)| name)
    }
}
