//! Closed-form savings rate solver
//!
//! Computes the share of salary that must be set aside (existing expenses
//! plus goal savings) to reach a goal in a given number of months. No model,
//! no randomness: the same inputs always give the same answer.

use crate::models::{Feasibility, FinancialProfile, Recommendation};

/// Solve for the savings percentage that reaches the goal in `target_months`
///
/// A `target_months` of 0 is treated as 1. When the goal needs more per month
/// than net income provides, the result is 100 with
/// [`Feasibility::Infeasible`]; a feasible plan that happens to need exactly
/// 100 keeps [`Feasibility::Feasible`].
pub fn calculate_recommendation(profile: &FinancialProfile, target_months: u32) -> Recommendation {
    let months = target_months.max(1);
    let monthly_savings_needed = profile.goal_amount / f64::from(months);
    let net_income = profile.net_income();

    if monthly_savings_needed > net_income {
        return Recommendation {
            percent: 100,
            feasibility: Feasibility::Infeasible,
            monthly_savings_needed,
            net_income,
        };
    }

    let set_aside = monthly_savings_needed + profile.expenses;
    let percent = (100.0 * set_aside / profile.salary)
        .round_ties_even()
        .clamp(1.0, 100.0) as u8;

    Recommendation {
        percent,
        feasibility: Feasibility::Feasible,
        monthly_savings_needed,
        net_income,
    }
}

/// Just the percentage, for callers that do not need the feasibility flag
pub fn recommended_percent(profile: &FinancialProfile, target_months: u32) -> u8 {
    calculate_recommendation(profile, target_months).percent
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infeasible_goal_returns_100() {
        let profile = FinancialProfile::new(100_000.0, 60_000.0, 600_000.0, "house", 1);
        let rec = calculate_recommendation(&profile, profile.target_months());

        assert_eq!(rec.net_income, 40_000.0);
        assert_eq!(rec.monthly_savings_needed, 50_000.0);
        assert_eq!(rec.percent, 100);
        assert_eq!(rec.feasibility, Feasibility::Infeasible);
    }

    #[test]
    fn test_feasible_goal_percent() {
        let profile = FinancialProfile::new(100_000.0, 50_000.0, 240_000.0, "car", 2);
        let rec = calculate_recommendation(&profile, 24);

        assert_eq!(rec.monthly_savings_needed, 10_000.0);
        assert_eq!(rec.percent, 60);
        assert_eq!(rec.feasibility, Feasibility::Feasible);
        assert_eq!(recommended_percent(&profile, 24), 60);
    }

    #[test]
    fn test_exactly_all_net_income_is_feasible() {
        // 120_000 over 12 months needs exactly the 10_000 net income
        let profile = FinancialProfile::new(30_000.0, 20_000.0, 120_000.0, "trip", 1);
        let rec = calculate_recommendation(&profile, 12);
        assert_eq!(rec.percent, 100);
        assert_eq!(rec.feasibility, Feasibility::Feasible);
    }

    #[test]
    fn test_negative_net_income_is_infeasible() {
        let profile = FinancialProfile::new(3_000.0, 3_500.0, 1_000.0, "trip", 5);
        let rec = calculate_recommendation(&profile, 60);
        assert_eq!(rec.percent, 100);
        assert_eq!(rec.feasibility, Feasibility::Infeasible);
    }

    #[test]
    fn test_lower_clamp() {
        // Tiny goal and tiny expenses round to 0% before clamping
        let profile = FinancialProfile::new(1_000_000.0, 1.0, 1.0, "gift", 9);
        assert_eq!(recommended_percent(&profile, 108), 1);
    }

    #[test]
    fn test_zero_target_months_treated_as_one() {
        let profile = FinancialProfile::new(10_000.0, 2_000.0, 4_000.0, "trip", 1);
        let rec = calculate_recommendation(&profile, 0);
        assert_eq!(rec.monthly_savings_needed, 4_000.0);
        assert_eq!(rec.percent, 60);
    }

    #[test]
    fn test_feasibility_boundary() {
        let salary = 8_000.0;
        let expenses = 5_000.0;
        for goal in [36_001.0, 50_000.0, 1_000_000.0] {
            let profile = FinancialProfile::new(salary, expenses, goal, "car", 1);
            assert!(goal / 12.0 > salary - expenses);
            assert_eq!(recommended_percent(&profile, 12), 100);
        }
    }

    #[test]
    fn test_monotonic_in_goal_amount() {
        let mut previous = 0;
        for step in 1..=400 {
            let goal = step as f64 * 2_500.0;
            let profile = FinancialProfile::new(9_000.0, 4_000.0, goal, "house", 3);
            let percent = recommended_percent(&profile, profile.target_months());
            assert!(percent >= previous, "goal {} dropped to {}", goal, percent);
            assert!((1..=100).contains(&percent));
            previous = percent;
        }
        assert_eq!(previous, 100);
    }

    #[test]
    fn test_always_in_range() {
        for salary in [500.0, 5_000.0, 50_000.0] {
            for expenses in [1.0, 400.0, 4_999.0, 60_000.0] {
                for goal in [1.0, 10_000.0, 1e9] {
                    for months in [0, 1, 12, 120, 1200] {
                        let profile = FinancialProfile::new(salary, expenses, goal, "x", 1);
                        let percent = recommended_percent(&profile, months);
                        assert!((1..=100).contains(&percent));
                    }
                }
            }
        }
    }

    #[test]
    fn test_deterministic() {
        let profile = FinancialProfile::new(7_345.0, 2_210.5, 98_765.0, "education", 4);
        let a = calculate_recommendation(&profile, 48);
        let b = calculate_recommendation(&profile, 48);
        assert_eq!(a, b);
    }
}
