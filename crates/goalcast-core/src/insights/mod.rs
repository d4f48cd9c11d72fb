//! Goal Insights - reconciling learned and closed-form estimates
//!
//! Two independent computations describe a goal: the regression model's
//! months-to-goal estimate and the solver's required savings rate. This
//! module turns them into a single narrative.
//!
//! ## Narratives
//!
//! - **On track** - predicted completion fits the desired duration
//! - **Behind schedule** - report the monthly shortfall and recommended rate
//! - **Model noise** - model says "later" but savings already suffice
//! - **Infeasible** / **Savings plan** - recommendation-first mode
//!
//! ## Usage
//!
//! ```rust,ignore
//! use goalcast_core::insights::{Narrative, NarrativeStyle};
//!
//! let rec = calculate_recommendation(&profile, profile.target_months());
//! let text = Narrative::reconcile(&profile, predicted, &rec).render(&NarrativeStyle::default());
//! ```

pub mod narrative;
pub mod style;

pub use narrative::Narrative;
pub use style::NarrativeStyle;
