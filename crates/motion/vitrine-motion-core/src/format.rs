//! Display formatting for animated counters.

use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CounterFormat {
    /// `value + suffix`
    Plain,
    /// `value + "%"`
    Percentage,
    /// `$X.XM` from one million, `Xk` from one thousand, plain below.
    #[default]
    CurrencyScaled,
    /// `value + " Days"`
    TimeUnit,
}

impl CounterFormat {
    /// Map a `data-type` attribute value to a format. Unknown or missing types
    /// fall back to the scaled currency rendering.
    pub fn from_data_type(data_type: Option<&str>) -> Self {
        match data_type.map(str::trim) {
            Some("percentage") => CounterFormat::Percentage,
            Some("time") => CounterFormat::TimeUnit,
            Some("plain") => CounterFormat::Plain,
            _ => CounterFormat::CurrencyScaled,
        }
    }

    /// Render `value`. `scale_basis` picks the currency unit so a counter
    /// heading for 1,250,000 stays in millions on every frame.
    pub fn render(self, value: i64, scale_basis: i64, suffix: &str) -> String {
        match self {
            CounterFormat::Plain => format!("{value}{suffix}"),
            CounterFormat::Percentage => format!("{value}%"),
            CounterFormat::TimeUnit => format!("{value} Days"),
            CounterFormat::CurrencyScaled => {
                if scale_basis >= 1_000_000 {
                    let millions = round_half_up(value as f64 / 1_000_000.0, 1);
                    format!("${millions:.1}M{suffix}")
                } else if scale_basis >= 1_000 {
                    let thousands = round_half_up(value as f64 / 1_000.0, 0);
                    format!("{thousands:.0}k{suffix}")
                } else {
                    format!("{value}{suffix}")
                }
            }
        }
    }
}

/// Format a settled value, using the value itself as the scale basis.
pub fn format_counter(value: i64, format: CounterFormat, suffix: &str) -> String {
    format.render(value, value, suffix)
}

/// Round to `digits` decimals with ties going away from zero (1.25 -> 1.3).
fn round_half_up(x: f64, digits: i32) -> f64 {
    let scale = 10f64.powi(digits);
    (x * scale).round() / scale
}
