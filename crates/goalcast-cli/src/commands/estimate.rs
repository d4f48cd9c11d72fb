//! Predict and recommend commands

use anyhow::Result;
use goalcast_core::{EstimationResult, FinancialProfile, GoalcastConfig};

use super::open_planner;

pub fn cmd_predict(config: &GoalcastConfig, profile: &FinancialProfile, json: bool) -> Result<()> {
    let result = open_planner(config)?.estimate(profile)?;
    print_result(&result, json)
}

pub fn cmd_recommend(
    config: &GoalcastConfig,
    profile: &FinancialProfile,
    json: bool,
) -> Result<()> {
    let result = open_planner(config)?.recommend(profile)?;
    print_result(&result, json)
}

fn print_result(result: &EstimationResult, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(result)?);
        return Ok(());
    }

    let status = if result.feasible { "🎯" } else { "⚠️ " };

    println!();
    println!("{} {} goal", status, result.goal_type);
    println!("   ─────────────────────────────────────────");
    println!("   Predicted time:        {} months", result.predicted_months);
    println!(
        "   Recommended savings:   {}% of salary",
        result.recommended_savings_percent
    );
    println!("   Outlook:               {}", result.narrative);
    println!();
    println!("   {}", result.insight);
    println!();

    Ok(())
}
