//! Presentation settings for rendered insights

use serde::{Deserialize, Serialize};

/// How amounts are written into insight text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NarrativeStyle {
    /// Prefix for currency amounts
    pub currency_symbol: String,
}

impl Default for NarrativeStyle {
    fn default() -> Self {
        Self {
            currency_symbol: "₹".to_string(),
        }
    }
}

impl NarrativeStyle {
    /// Whole-unit amount with thousands separators, e.g. `₹1,250,000`.
    /// Halves round to even.
    pub fn amount(&self, value: f64) -> String {
        let rounded = value.round_ties_even();
        let sign = if rounded < 0.0 { "-" } else { "" };
        format!(
            "{}{}{}",
            sign,
            self.currency_symbol,
            group_thousands(rounded.abs() as u64)
        )
    }
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
