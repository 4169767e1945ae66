//! Site widget configuration: which elements to bind and the texts and
//! timings the widgets use. `Default` describes the production site.

use serde::{Deserialize, Serialize};

use crate::accordion::AccordionCfg;
use crate::analytics::SinkKind;
use crate::calculator::CalculatorCfg;
use crate::error::SiteError;
use crate::filter::FilterCfg;
use crate::nav::{AnchorScrollCfg, NavMenuCfg};
use crate::quiz::QuizCfg;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsCfg {
    /// Sinks tried for every event, in order.
    pub sinks: Vec<SinkKind>,
    /// Emit a page view when the host installs.
    pub page_view: bool,
    /// Click targets are the closest ancestor matching this selector.
    pub click_selector: String,
}

impl Default for AnalyticsCfg {
    fn default() -> Self {
        Self {
            sinks: SinkKind::ALL.to_vec(),
            page_view: true,
            click_selector: "[data-event]".into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormCfg {
    pub selector: String,
    /// Submit button inside the form.
    pub submit: String,
    pub required: Vec<String>,
    pub submitting_text: String,
    /// Simulated round trip before the acknowledgment.
    pub ack_delay_ms: f64,
    pub success_message: String,
}

impl Default for FormCfg {
    fn default() -> Self {
        Self {
            selector: "#qualificationForm".into(),
            submit: ".form-submit".into(),
            required: [
                "companyName",
                "role",
                "companyStage",
                "primaryChallenge",
                "urgency",
                "email",
            ]
            .map(String::from)
            .to_vec(),
            submitting_text: "Submitting...".into(),
            ack_delay_ms: 1500.0,
            success_message:
                "Thank you! We'll be in touch within 2 business hours during ET business days."
                    .into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub analytics: AnalyticsCfg,
    pub form: Option<FormCfg>,
    pub calculators: Vec<CalculatorCfg>,
    pub quizzes: Vec<QuizCfg>,
    pub filter: Option<FilterCfg>,
    pub accordions: Vec<AccordionCfg>,
    pub nav: Option<NavMenuCfg>,
    pub anchors: Option<AnchorScrollCfg>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            analytics: AnalyticsCfg::default(),
            form: Some(FormCfg::default()),
            calculators: vec![CalculatorCfg::revenue(), CalculatorCfg::bad_hire()],
            quizzes: vec![QuizCfg::partnership(), QuizCfg::ai_maturity()],
            filter: Some(FilterCfg::default()),
            accordions: vec![
                AccordionCfg::faq(),
                AccordionCfg::pillars(),
                AccordionCfg::process_steps(),
            ],
            nav: Some(NavMenuCfg::default()),
            anchors: Some(AnchorScrollCfg::default()),
        }
    }
}

impl SiteConfig {
    pub fn from_json_str(s: &str) -> Result<Self, SiteError> {
        serde_json::from_str(s).map_err(|e| SiteError::Config(e.to_string()))
    }

    /// Analytics only; every widget is switched off.
    pub fn analytics_only() -> Self {
        Self {
            analytics: AnalyticsCfg::default(),
            form: None,
            calculators: Vec::new(),
            quizzes: Vec::new(),
            filter: None,
            accordions: Vec::new(),
            nav: None,
            anchors: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_other_defaults() {
        let cfg = SiteConfig::from_json_str(r#"{ "filter": null, "analytics": { "sinks": ["gtag"] } }"#)
            .expect("parse");
        assert!(cfg.filter.is_none());
        assert_eq!(cfg.analytics.sinks, vec![SinkKind::Gtag]);
        assert!(cfg.analytics.page_view);
        assert_eq!(cfg.form.as_ref().map(|f| f.ack_delay_ms), Some(1500.0));
        assert_eq!(cfg.accordions.len(), 3);
        assert_eq!(cfg.anchors.map(|a| a.offset_px), Some(80.0));
    }

    #[test]
    fn bad_json_is_a_config_error() {
        assert!(matches!(
            SiteConfig::from_json_str(r#"{ "quizzes": 1 }"#),
            Err(SiteError::Config(_))
        ));
    }
}
