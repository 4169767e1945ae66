//! Qualification form: validation and the submit/acknowledge cycle.

use hashbrown::HashMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::FormError;

/// Submitted field values by input name.
pub type FormFields = HashMap<String, String>;

static EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

pub fn is_valid_email(email: &str) -> bool {
    EMAIL.is_match(email)
}

/// Check required fields (blank or whitespace-only counts as missing), then
/// the email address.
pub fn validate(fields: &FormFields, required: &[String]) -> Result<(), FormError> {
    let missing: Vec<String> = required
        .iter()
        .filter(|name| fields.get(*name).map_or(true, |v| v.trim().is_empty()))
        .cloned()
        .collect();
    if !missing.is_empty() {
        return Err(FormError::MissingFields(missing));
    }
    let email = fields.get("email").map(String::as_str).unwrap_or_default();
    if !is_valid_email(email) {
        return Err(FormError::InvalidEmail);
    }
    Ok(())
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SubmitState {
    #[default]
    Idle,
    /// Waiting for the acknowledgment; remembers the button label to restore.
    Pending { button_text: String },
}

/// Submission state of one form.
#[derive(Debug, Default)]
pub struct QualificationForm {
    required: Vec<String>,
    state: SubmitState,
}

impl QualificationForm {
    pub fn new(required: Vec<String>) -> Self {
        Self {
            required,
            state: SubmitState::Idle,
        }
    }

    pub fn state(&self) -> &SubmitState {
        &self.state
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, SubmitState::Pending { .. })
    }

    /// Validate and enter `Pending`. A submit while pending is refused
    /// without re-validating.
    pub fn submit(&mut self, fields: &FormFields, button_text: &str) -> Result<(), FormError> {
        if self.is_pending() {
            return Err(FormError::Pending);
        }
        validate(fields, &self.required)?;
        let mut logged: Vec<_> = fields.iter().collect();
        logged.sort();
        log::info!("form submission: {logged:?}");
        self.state = SubmitState::Pending {
            button_text: button_text.to_string(),
        };
        Ok(())
    }

    /// Leave `Pending`. Returns the button label to restore, or `None` when
    /// nothing was pending.
    pub fn acknowledge(&mut self) -> Option<String> {
        match std::mem::take(&mut self.state) {
            SubmitState::Pending { button_text } => Some(button_text),
            SubmitState::Idle => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn required() -> Vec<String> {
        ["companyName", "email"].map(String::from).to_vec()
    }

    fn fields(pairs: &[(&str, &str)]) -> FormFields {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn email_needs_at_and_dotted_domain() {
        assert!(is_valid_email("a@b.co"));
        assert!(!is_valid_email("a.b.co"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a b@c.d"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn missing_fields_are_listed_in_order() {
        let err = validate(&fields(&[("companyName", " ")]), &required()).unwrap_err();
        assert_eq!(
            err,
            FormError::MissingFields(vec!["companyName".into(), "email".into()])
        );
        assert_eq!(err.to_string(), "Please fill in all required fields.");
    }

    #[test]
    fn second_submit_while_pending_is_rejected() {
        let mut form = QualificationForm::new(required());
        let ok = fields(&[("companyName", "Acme"), ("email", "x@acme.io")]);
        form.submit(&ok, "Get My Assessment").unwrap();
        assert_eq!(form.submit(&ok, "Submitting...").unwrap_err(), FormError::Pending);
        assert_eq!(form.acknowledge().as_deref(), Some("Get My Assessment"));
        assert_eq!(form.acknowledge(), None);
        assert!(form.submit(&ok, "Get My Assessment").is_ok());
    }

    #[test]
    fn invalid_submit_stays_idle() {
        let mut form = QualificationForm::new(required());
        let bad = fields(&[("companyName", "Acme"), ("email", "nope")]);
        assert_eq!(form.submit(&bad, "Send").unwrap_err(), FormError::InvalidEmail);
        assert_eq!(form.state(), &SubmitState::Idle);
    }
}
