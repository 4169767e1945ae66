//! Case-study filter: one active button, matching cards fade in one after
//! another, the rest fade out and are hidden.

use serde::{Deserialize, Serialize};
use vitrine_api_core::{ElementKey, WriteOp};

use crate::outputs::SiteOutputs;

/// Filter value that matches every card.
pub const ALL: &str = "all";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterCfg {
    /// Buttons carrying `data-filter`.
    pub buttons: String,
    /// Cards carrying `data-category`.
    pub cards: String,
    pub active_class: String,
    pub fade_class: String,
    /// Delay between consecutive matching cards.
    pub step_ms: f64,
    /// Delay before a non-matching card is hidden.
    pub hide_after_ms: f64,
}

impl Default for FilterCfg {
    fn default() -> Self {
        Self {
            buttons: ".filter-btn".into(),
            cards: ".case-card".into(),
            active_class: "filter-active".into(),
            fade_class: "card-fade-in".into(),
            step_ms: 100.0,
            hide_after_ms: 300.0,
        }
    }
}

#[derive(Clone, Debug)]
pub struct FilterButton {
    pub key: ElementKey,
    pub filter: String,
}

#[derive(Clone, Debug)]
pub struct FilterCard {
    pub key: ElementKey,
    pub category: Option<String>,
}

impl FilterCard {
    pub fn matches(&self, filter: &str) -> bool {
        filter == ALL || self.category.as_deref() == Some(filter)
    }
}

#[derive(Debug)]
pub struct CaseFilter {
    cfg: FilterCfg,
    buttons: Vec<FilterButton>,
    cards: Vec<FilterCard>,
    active: Option<usize>,
}

impl CaseFilter {
    pub fn new(cfg: FilterCfg, buttons: Vec<FilterButton>, cards: Vec<FilterCard>) -> Self {
        Self {
            cfg,
            buttons,
            cards,
            active: None,
        }
    }

    pub fn buttons(&self) -> &[FilterButton] {
        &self.buttons
    }

    pub fn active(&self) -> Option<&str> {
        self.active.map(|i| self.buttons[i].filter.as_str())
    }

    /// Activate button `index`. Returns false for an unknown index.
    pub fn select(&mut self, index: usize, out: &mut SiteOutputs) -> bool {
        let Some(button) = self.buttons.get(index) else {
            return false;
        };
        let filter = button.filter.clone();
        self.active = Some(index);

        for (i, b) in self.buttons.iter().enumerate() {
            out.writes
                .push(WriteOp::set_class(&b.key, &self.cfg.active_class, i == index));
        }
        for (i, card) in self.cards.iter().enumerate() {
            if card.matches(&filter) {
                let delay = i as f64 * self.cfg.step_ms;
                out.schedule(delay, WriteOp::set_style(&card.key, "display", "block"));
                out.schedule(delay, WriteOp::add_class(&card.key, &self.cfg.fade_class));
            } else {
                out.writes
                    .push(WriteOp::remove_class(&card.key, &self.cfg.fade_class));
                out.schedule(
                    self.cfg.hide_after_ms,
                    WriteOp::set_style(&card.key, "display", "none"),
                );
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vitrine_api_core::DomWrite;

    fn filter() -> CaseFilter {
        let button = |k: &str, f: &str| FilterButton {
            key: ElementKey::new(k),
            filter: f.into(),
        };
        let card = |k: &str, c: &str| FilterCard {
            key: ElementKey::new(k),
            category: Some(c.into()),
        };
        CaseFilter::new(
            FilterCfg::default(),
            vec![button("b-all", "all"), button("b-saas", "saas")],
            vec![card("c0", "saas"), card("c1", "fintech"), card("c2", "saas")],
        )
    }

    #[test]
    fn exactly_one_button_is_active() {
        let mut f = filter();
        let mut out = SiteOutputs::default();
        assert!(f.select(1, &mut out));
        let on: Vec<_> = out
            .writes
            .iter()
            .filter(|op| matches!(&op.write, DomWrite::SetClass { on: true, .. }))
            .map(|op| op.target.as_str())
            .collect();
        assert_eq!(on, vec!["b-saas"]);
        assert_eq!(f.active(), Some("saas"));
        assert!(!f.select(7, &mut out));
    }

    #[test]
    fn matching_cards_are_staggered_by_position() {
        let mut f = filter();
        let mut out = SiteOutputs::default();
        f.select(1, &mut out);
        let shows: Vec<_> = out
            .timed
            .iter()
            .filter(|t| matches!(&t.op.write, DomWrite::SetStyle { value, .. } if value == "block"))
            .map(|t| (t.op.target.as_str(), t.delay_ms))
            .collect();
        assert_eq!(shows, vec![("c2", 200.0)]);
        // position 0 shows at once
        assert!(out
            .writes
            .for_target(&ElementKey::new("c0"))
            .any(|w| matches!(w, DomWrite::SetStyle { value, .. } if value == "block")));
        let hides: Vec<_> = out
            .timed
            .iter()
            .filter(|t| matches!(&t.op.write, DomWrite::SetStyle { value, .. } if value == "none"))
            .map(|t| (t.op.target.as_str(), t.delay_ms))
            .collect();
        assert_eq!(hides, vec![("c1", 300.0)]);
    }
}
