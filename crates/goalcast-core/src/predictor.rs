//! Time-to-goal prediction

use crate::error::Result;
use crate::features::FeatureVector;
use crate::forest::Regressor;
use crate::handle::ModelHandle;
use crate::models::FinancialProfile;

/// Round a raw model output to whole months, never below 1
///
/// Ties round to even. Non-finite output falls back to 1.
pub fn clamp_months(raw: f64) -> u32 {
    if !raw.is_finite() {
        tracing::warn!(raw, "Model produced a non-finite estimate, clamping to 1 month");
        return 1;
    }

    let rounded = raw.round_ties_even();
    if rounded < 1.0 {
        1
    } else if rounded >= f64::from(u32::MAX) {
        u32::MAX
    } else {
        rounded as u32
    }
}

/// Estimate months to goal with a specific model
pub fn predict_months<R: Regressor + ?Sized>(model: &R, profile: &FinancialProfile) -> u32 {
    let features = FeatureVector::from_profile(profile);
    let raw = model.predict(&features);
    let months = clamp_months(raw);

    tracing::debug!(
        goal_type = %profile.goal_type,
        raw,
        months,
        "Predicted time to goal"
    );

    months
}

/// Estimate months to goal with the handle's current model
///
/// Fails with [`crate::Error::ModelUnavailable`] when no model is loaded.
pub fn predict_time_to_goal(handle: &ModelHandle, profile: &FinancialProfile) -> Result<u32> {
    let model = handle.require()?;
    Ok(predict_months(model.as_ref(), profile))
}
