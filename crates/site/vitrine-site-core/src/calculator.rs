//! Revenue pipeline and bad-hire cost calculators.
//!
//! Inputs arrive as raw field text and parse like the browser does
//! (`parseInt` / `parseFloat` prefixes), falling back to zero.

use serde::{Deserialize, Serialize};
use vitrine_api_core::{parse_float, parse_int};

/// Monthly pipeline figures.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RevenueInputs {
    pub monthly_leads: i64,
    /// Percent, e.g. `2.5` for 2.5 %.
    pub conversion_rate: f64,
    pub deal_size: i64,
}

impl RevenueInputs {
    pub fn parse(leads: &str, conversion: &str, deal_size: &str) -> Self {
        Self {
            monthly_leads: parse_int(leads).unwrap_or(0),
            conversion_rate: parse_float(conversion).unwrap_or(0.0),
            deal_size: parse_int(deal_size).unwrap_or(0),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RevenueEstimate {
    pub current: f64,
    pub optimized: f64,
    pub annual_impact: f64,
}

pub fn estimate_revenue(inputs: &RevenueInputs, multiplier: f64) -> RevenueEstimate {
    let conversions = inputs.monthly_leads as f64 * inputs.conversion_rate / 100.0;
    let current = conversions * inputs.deal_size as f64;
    let optimized = current * multiplier;
    RevenueEstimate {
        current,
        optimized,
        annual_impact: (optimized - current) * 12.0,
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BadHireInputs {
    pub average_salary: i64,
    /// Percent of the team replaced per year.
    pub turnover_rate: f64,
    pub team_size: i64,
}

impl BadHireInputs {
    pub fn parse(salary: &str, turnover: &str, team: &str) -> Self {
        Self {
            average_salary: parse_int(salary).unwrap_or(0),
            turnover_rate: parse_float(turnover).unwrap_or(0.0),
            team_size: parse_int(team).unwrap_or(0),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BadHireEstimate {
    pub cost_per_hire: f64,
    pub hires_per_year: f64,
    pub annual_impact: f64,
}

pub fn estimate_bad_hire(inputs: &BadHireInputs, cost_multiplier: f64) -> BadHireEstimate {
    let cost_per_hire = inputs.average_salary as f64 * cost_multiplier;
    let hires_per_year = round_half_up(inputs.team_size as f64 * inputs.turnover_rate / 100.0);
    BadHireEstimate {
        cost_per_hire,
        hires_per_year,
        annual_impact: cost_per_hire * hires_per_year,
    }
}

/// Rounds .5 toward positive infinity.
pub fn round_half_up(x: f64) -> f64 {
    (x + 0.5).floor()
}

/// Whole US dollars with thousands separators: `1234.5` -> `"$1,235"`,
/// `-80` -> `"-$80"`. Halves round away from zero.
pub fn format_usd(amount: f64) -> String {
    if !amount.is_finite() {
        return "$0".to_string();
    }
    let rounded = amount.abs().round();
    let digits = format!("{rounded:.0}");
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 2);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if amount < 0.0 && rounded > 0.0 {
        format!("-${grouped}")
    } else {
        format!("${grouped}")
    }
}

/// The calculators a page may carry.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalculatorKind {
    Revenue,
    BadHire,
}

impl CalculatorKind {
    /// Currency figures produced by [`evaluate`](Self::evaluate), in order.
    pub fn fields(&self) -> &'static [&'static str] {
        match self {
            CalculatorKind::Revenue => &["current", "optimized", "annual_impact"],
            CalculatorKind::BadHire => &["cost_per_hire", "annual_impact"],
        }
    }

    /// Evaluate three raw field values (missing ones read as blank). The
    /// result is parallel to [`fields`](Self::fields).
    pub fn evaluate(&self, values: &[String], multiplier: f64) -> Vec<f64> {
        let raw = |i: usize| values.get(i).map(String::as_str).unwrap_or("");
        match self {
            CalculatorKind::Revenue => {
                let est = estimate_revenue(&RevenueInputs::parse(raw(0), raw(1), raw(2)), multiplier);
                vec![est.current, est.optimized, est.annual_impact]
            }
            CalculatorKind::BadHire => {
                let est = estimate_bad_hire(&BadHireInputs::parse(raw(0), raw(1), raw(2)), multiplier);
                vec![est.cost_per_hire, est.annual_impact]
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CalculatorCfg {
    pub kind: CalculatorKind,
    /// Input selectors in evaluation order.
    pub inputs: Vec<String>,
    /// Output selectors, parallel to [`CalculatorKind::fields`].
    pub outputs: Vec<String>,
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,
}

fn default_multiplier() -> f64 {
    2.5
}

impl CalculatorCfg {
    pub fn revenue() -> Self {
        Self {
            kind: CalculatorKind::Revenue,
            inputs: ["#monthlyLeads", "#conversionRate", "#dealSize"].map(String::from).to_vec(),
            outputs: ["#currentRevenue", "#optimizedRevenue", "#annualImpact"]
                .map(String::from)
                .to_vec(),
            multiplier: default_multiplier(),
        }
    }

    pub fn bad_hire() -> Self {
        Self {
            kind: CalculatorKind::BadHire,
            inputs: ["#averageSalary", "#turnoverRate", "#teamSize"].map(String::from).to_vec(),
            outputs: ["#costPerBadHire", "#annualBadHireImpact"].map(String::from).to_vec(),
            multiplier: default_multiplier(),
        }
    }
}
