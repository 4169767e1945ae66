//! Host events fed to `Site::handle()`.

use serde::{Deserialize, Serialize};

use crate::analytics::ClickContext;
use crate::calculator::CalculatorKind;
use crate::form::FormFields;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
#[non_exhaustive]
pub enum SiteInput {
    /// A click that resolved to a `[data-event]` element.
    Click { context: ClickContext },
    /// Submission of a form carrying `data-event`.
    FormTracked {
        event: String,
        #[serde(default)]
        form_id: Option<String>,
    },
    PageView,
    /// Raw values of a calculator's inputs, in configured order.
    CalculatorChanged {
        kind: CalculatorKind,
        values: Vec<String>,
    },
    QuizAnswer {
        quiz: String,
        question: String,
        value: String,
    },
    /// Index into the bound filter buttons.
    FilterSelected { index: usize },
    /// Index into the named accordion's bound items.
    AccordionToggled { accordion: String, index: usize },
    FormSubmit {
        fields: FormFields,
        /// Current submit button label, restored on acknowledgment.
        #[serde(default)]
        button_text: String,
    },
    FormAcknowledged,
    /// The mobile menu button was clicked.
    NavToggled,
    /// Any click in the document, after the widgets' own listeners.
    DocumentClicked {
        /// The target sits inside the navigation bar.
        inside_nav: bool,
        /// Index of the bound dropdown containing the target.
        #[serde(default)]
        dropdown: Option<usize>,
    },
    Resized { viewport_width: f64 },
    /// Index into the bound in-page links.
    AnchorClicked { index: usize },
}
