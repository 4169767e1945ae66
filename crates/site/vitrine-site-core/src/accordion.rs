//! Exclusive accordions (FAQ items, expandable pillars, process steps):
//! opening one item closes the others; clicking the open item closes it.

use serde::{Deserialize, Serialize};
use vitrine_api_core::{ElementKey, WriteBatch, WriteOp};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AccordionCfg {
    pub name: String,
    pub items: String,
    /// Clickable part inside each item; `None` makes the whole item the trigger.
    #[serde(default)]
    pub trigger: Option<String>,
    pub open_class: String,
    /// Body inside each item shown with `display: block` when open.
    #[serde(default)]
    pub panel: Option<String>,
    /// Element inside each item whose text marks the state.
    #[serde(default)]
    pub indicator: Option<String>,
    #[serde(default = "default_collapsed_mark")]
    pub collapsed_mark: String,
    #[serde(default = "default_expanded_mark")]
    pub expanded_mark: String,
}

fn default_collapsed_mark() -> String {
    "+".into()
}

fn default_expanded_mark() -> String {
    "\u{2212}".into()
}

impl AccordionCfg {
    pub fn faq() -> Self {
        Self {
            name: "faq".into(),
            items: ".faq-item".into(),
            trigger: Some(".faq-question".into()),
            open_class: "active".into(),
            panel: None,
            indicator: None,
            collapsed_mark: default_collapsed_mark(),
            expanded_mark: default_expanded_mark(),
        }
    }

    pub fn pillars() -> Self {
        Self {
            name: "pillars".into(),
            items: ".pillar-expandable".into(),
            trigger: Some(".pillar-surface".into()),
            open_class: "expanded".into(),
            panel: Some(".pillar-depth".into()),
            indicator: Some(".expand-indicator".into()),
            collapsed_mark: default_collapsed_mark(),
            expanded_mark: default_expanded_mark(),
        }
    }

    pub fn process_steps() -> Self {
        Self {
            name: "process".into(),
            items: ".process-step".into(),
            trigger: None,
            open_class: "step-expanded".into(),
            panel: None,
            indicator: None,
            collapsed_mark: default_collapsed_mark(),
            expanded_mark: default_expanded_mark(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccordionItem {
    pub item: ElementKey,
    /// The item itself when no trigger selector is configured.
    pub trigger: ElementKey,
    pub panel: Option<ElementKey>,
    pub indicator: Option<ElementKey>,
}

impl AccordionItem {
    pub fn new(item: ElementKey) -> Self {
        Self {
            trigger: item.clone(),
            item,
            panel: None,
            indicator: None,
        }
    }
}

#[derive(Debug)]
pub struct Accordion {
    cfg: AccordionCfg,
    items: Vec<AccordionItem>,
    open: Option<usize>,
}

impl Accordion {
    pub fn new(cfg: AccordionCfg, items: Vec<AccordionItem>) -> Self {
        Self {
            cfg,
            items,
            open: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.cfg.name
    }

    pub fn items(&self) -> &[AccordionItem] {
        &self.items
    }

    pub fn open(&self) -> Option<usize> {
        self.open
    }

    /// Toggle item `index`. Returns the item now open, if any.
    pub fn toggle(&mut self, index: usize, batch: &mut WriteBatch) -> Option<usize> {
        if index >= self.items.len() {
            return self.open;
        }
        let next = if self.open == Some(index) {
            None
        } else {
            Some(index)
        };
        for i in 0..self.items.len() {
            self.render_item(i, next == Some(i), batch);
        }
        self.open = next;
        next
    }

    fn render_item(&self, i: usize, open: bool, batch: &mut WriteBatch) {
        let item = &self.items[i];
        batch.push(WriteOp::set_class(&item.item, &self.cfg.open_class, open));
        if let Some(panel) = &item.panel {
            batch.push(WriteOp::set_style(panel, "display", if open { "block" } else { "none" }));
        }
        if let Some(indicator) = &item.indicator {
            let mark = if open {
                &self.cfg.expanded_mark
            } else {
                &self.cfg.collapsed_mark
            };
            batch.push(WriteOp::set_text(indicator, mark.clone()));
        }
    }
}
