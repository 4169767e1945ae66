//! The site engine: binds the configured widgets to a page once, then turns
//! host events into DOM writes, visitor notices and analytics dispatches.

use serde::{Deserialize, Serialize};
use vitrine_api_core::{ElementKey, ElementResolver, WriteBatch, WriteOp};

use crate::accordion::{Accordion, AccordionCfg, AccordionItem};
use crate::analytics::{AnalyticsEvent, Dispatcher, PageContext};
use crate::calculator::{format_usd, CalculatorCfg, CalculatorKind};
use crate::config::{FormCfg, SiteConfig};
use crate::error::{FormError, SiteError};
use crate::filter::{CaseFilter, FilterButton, FilterCard};
use crate::form::{FormFields, QualificationForm, SubmitState};
use crate::inputs::SiteInput;
use crate::nav::{anchor_target, link_is_current, MobileMenu, Navigation, ScrollTo};
use crate::outputs::{FormAction, NoticeKind, SiteOutputs, Tracked};
use crate::quiz::Quiz;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FormBinding {
    pub form: ElementKey,
    pub submit: Option<ElementKey>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CalculatorBinding {
    pub kind: CalculatorKind,
    /// Input elements in evaluation order.
    pub inputs: Vec<ElementKey>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct QuizBinding {
    pub name: String,
    pub questions: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AccordionBinding {
    pub name: String,
    /// Click targets, by item index.
    pub triggers: Vec<ElementKey>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NavBinding {
    /// Clicks outside it close the mobile menu.
    pub nav: Option<ElementKey>,
    /// Mobile menu button.
    pub toggle: Option<ElementKey>,
    pub dropdowns: Vec<ElementKey>,
}

/// What the host has to listen to after [`Site::bind`].
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SiteBindReport {
    pub form: Option<FormBinding>,
    pub calculators: Vec<CalculatorBinding>,
    pub quizzes: Vec<QuizBinding>,
    pub filter_buttons: Vec<ElementKey>,
    pub accordions: Vec<AccordionBinding>,
    pub nav: Option<NavBinding>,
    /// In-page links; the host cancels their default jump.
    pub anchors: Vec<ElementKey>,
    /// Selectors that matched nothing.
    pub skipped: Vec<String>,
}

struct BoundForm {
    cfg: FormCfg,
    submit: Option<ElementKey>,
    state: QualificationForm,
}

struct BoundCalculator {
    cfg: CalculatorCfg,
    outputs: Vec<Option<ElementKey>>,
}

struct BoundQuiz {
    quiz: Quiz,
    score: Option<ElementKey>,
    recommendation: Option<ElementKey>,
    results: Option<ElementKey>,
}

pub struct Site {
    cfg: SiteConfig,
    page: PageContext,
    dispatcher: Dispatcher,
    form: Option<BoundForm>,
    calculators: Vec<BoundCalculator>,
    quizzes: Vec<BoundQuiz>,
    filter: Option<CaseFilter>,
    accordions: Vec<Accordion>,
    nav: Option<Navigation>,
    /// Scroll target of each bound in-page link.
    anchors: Vec<Option<ElementKey>>,
    /// Writes produced while binding, flushed by the next `handle`.
    staged: WriteBatch,
    outputs: SiteOutputs,
    bound: bool,
    torn_down: bool,
}

impl Site {
    pub fn new(cfg: SiteConfig) -> Self {
        Self {
            cfg,
            page: PageContext::default(),
            dispatcher: Dispatcher::new(),
            form: None,
            calculators: Vec::new(),
            quizzes: Vec::new(),
            filter: None,
            accordions: Vec::new(),
            nav: None,
            anchors: Vec::new(),
            staged: WriteBatch::new(),
            outputs: SiteOutputs::default(),
            bound: false,
            torn_down: false,
        }
    }

    pub fn cfg(&self) -> &SiteConfig {
        &self.cfg
    }

    pub fn set_page(&mut self, page: PageContext) {
        self.page = page;
    }

    pub fn set_dispatcher(&mut self, dispatcher: Dispatcher) {
        self.dispatcher = dispatcher;
    }

    pub fn dispatcher_mut(&mut self) -> &mut Dispatcher {
        &mut self.dispatcher
    }

    pub fn form_state(&self) -> Option<&SubmitState> {
        self.form.as_ref().map(|f| f.state.state())
    }

    pub fn active_filter(&self) -> Option<&str> {
        self.filter.as_ref().and_then(CaseFilter::active)
    }

    /// Index of the open item of the named accordion.
    pub fn open_item(&self, accordion: &str) -> Option<usize> {
        self.accordions
            .iter()
            .find(|a| a.name() == accordion)
            .and_then(Accordion::open)
    }

    pub fn nav_menu_open(&self) -> bool {
        self.nav.as_ref().is_some_and(Navigation::is_open)
    }

    /// Resolve every configured widget. Widgets whose elements are missing
    /// are skipped and listed in the report.
    pub fn bind(&mut self, resolver: &mut dyn ElementResolver) -> Result<SiteBindReport, SiteError> {
        if self.torn_down {
            return Err(SiteError::TornDown);
        }
        if self.bound {
            return Err(SiteError::AlreadyBound);
        }
        self.bound = true;
        let cfg = self.cfg.clone();
        let mut report = SiteBindReport::default();

        if let Some(form_cfg) = &cfg.form {
            match resolver.query_first(&form_cfg.selector) {
                Some(form) => {
                    let submit = resolver.query_within(&form, &form_cfg.submit).into_iter().next();
                    report.form = Some(FormBinding {
                        form,
                        submit: submit.clone(),
                    });
                    self.form = Some(BoundForm {
                        cfg: form_cfg.clone(),
                        submit,
                        state: QualificationForm::new(form_cfg.required.clone()),
                    });
                }
                None => skip(&mut report, &form_cfg.selector),
            }
        }

        for calc in &cfg.calculators {
            let inputs: Option<Vec<ElementKey>> =
                calc.inputs.iter().map(|s| resolver.query_first(s)).collect();
            let Some(inputs) = inputs else {
                skip(&mut report, &calc.inputs.join(", "));
                continue;
            };
            let outputs = calc.outputs.iter().map(|s| resolver.query_first(s)).collect();
            report.calculators.push(CalculatorBinding {
                kind: calc.kind,
                inputs,
            });
            self.calculators.push(BoundCalculator {
                cfg: calc.clone(),
                outputs,
            });
        }

        for quiz in &cfg.quizzes {
            let score = resolver.query_first(&quiz.score);
            let recommendation = resolver.query_first(&quiz.recommendation);
            if score.is_none() && recommendation.is_none() {
                skip(&mut report, &quiz.score);
                continue;
            }
            let results = quiz.results.as_deref().and_then(|s| resolver.query_first(s));
            report.quizzes.push(QuizBinding {
                name: quiz.name.clone(),
                questions: quiz.questions.clone(),
            });
            self.quizzes.push(BoundQuiz {
                quiz: Quiz::new(quiz.clone()),
                score,
                recommendation,
                results,
            });
        }

        if let Some(filter_cfg) = &cfg.filter {
            let buttons: Vec<FilterButton> = resolver
                .query_all(&filter_cfg.buttons)
                .into_iter()
                .filter_map(|key| {
                    let filter = resolver.data(&key, "filter")?;
                    Some(FilterButton { key, filter })
                })
                .collect();
            if buttons.is_empty() {
                skip(&mut report, &filter_cfg.buttons);
            } else {
                let cards = resolver
                    .query_all(&filter_cfg.cards)
                    .into_iter()
                    .map(|key| {
                        let category = resolver.data(&key, "category");
                        FilterCard { key, category }
                    })
                    .collect();
                report.filter_buttons = buttons.iter().map(|b| b.key.clone()).collect();
                self.filter = Some(CaseFilter::new(filter_cfg.clone(), buttons, cards));
            }
        }

        for acc in &cfg.accordions {
            let items = accordion_items(resolver, acc);
            if items.is_empty() {
                skip(&mut report, &acc.items);
                continue;
            }
            report.accordions.push(AccordionBinding {
                name: acc.name.clone(),
                triggers: items.iter().map(|i| i.trigger.clone()).collect(),
            });
            self.accordions.push(Accordion::new(acc.clone(), items));
        }

        if let Some(nav_cfg) = &cfg.nav {
            let nav = resolver.query_first(&nav_cfg.nav);
            let toggle = resolver.query_first(&nav_cfg.toggle);
            let menu = match (nav.is_some(), toggle, resolver.query_first(&nav_cfg.menu)) {
                (true, Some(toggle), Some(menu)) => Some(MobileMenu {
                    toggle,
                    menu,
                    body: resolver.query_first(&nav_cfg.body),
                }),
                _ => {
                    skip(&mut report, &nav_cfg.toggle);
                    None
                }
            };
            for link in resolver.query_all(&nav_cfg.links) {
                let current = resolver
                    .attribute(&link, "href")
                    .is_some_and(|href| link_is_current(&self.page.path, &href, &nav_cfg.home_href));
                if current {
                    self.staged
                        .push(WriteOp::add_class(&link, &nav_cfg.link_active_class));
                }
            }
            let dropdowns = resolver.query_all(&nav_cfg.dropdowns);
            if menu.is_some() || !dropdowns.is_empty() {
                report.nav = Some(NavBinding {
                    nav,
                    toggle: menu.as_ref().map(|m| m.toggle.clone()),
                    dropdowns: dropdowns.clone(),
                });
                self.nav = Some(Navigation::new(nav_cfg.clone(), menu, dropdowns));
            }
        }

        if let Some(anchor_cfg) = &cfg.anchors {
            for link in resolver.query_all(&anchor_cfg.selector) {
                let target = resolver
                    .attribute(&link, "href")
                    .and_then(|href| anchor_target(&href).map(|id| format!("#{id}")))
                    .and_then(|selector| resolver.query_first(&selector));
                report.anchors.push(link);
                self.anchors.push(target);
            }
        }

        log::debug!(
            "site bound: form={} calculators={} quizzes={} filter buttons={} accordions={} nav={} anchors={}",
            report.form.is_some(),
            report.calculators.len(),
            report.quizzes.len(),
            report.filter_buttons.len(),
            report.accordions.len(),
            report.nav.is_some(),
            report.anchors.len()
        );
        Ok(report)
    }

    /// Handle one host event. The returned outputs are valid until the next
    /// call.
    pub fn handle(&mut self, input: SiteInput) -> &SiteOutputs {
        self.outputs.clear();
        if self.torn_down {
            log::debug!("site torn down; ignoring {input:?}");
            return &self.outputs;
        }
        if !self.staged.is_empty() {
            let staged = std::mem::take(&mut self.staged);
            self.outputs.writes.extend(staged.into_vec());
        }
        match input {
            SiteInput::Click { context } => {
                let event = AnalyticsEvent::click(&context, &self.page);
                self.track(event);
            }
            SiteInput::FormTracked { event, form_id } => {
                let event = AnalyticsEvent::form_submit(&event, form_id, &self.page);
                self.track(event);
            }
            SiteInput::PageView => {
                if self.cfg.analytics.page_view {
                    let event = AnalyticsEvent::page_view(&self.page);
                    self.track(event);
                }
            }
            SiteInput::CalculatorChanged { kind, values } => self.calculate(kind, &values),
            SiteInput::QuizAnswer {
                quiz,
                question,
                value,
            } => self.answer(&quiz, &question, &value),
            SiteInput::FilterSelected { index } => match self.filter.as_mut() {
                Some(filter) => {
                    if !filter.select(index, &mut self.outputs) {
                        log::debug!("no filter button {index}");
                    }
                }
                None => log::debug!("filter not bound"),
            },
            SiteInput::AccordionToggled { accordion, index } => {
                match self.accordions.iter_mut().find(|a| a.name() == accordion) {
                    Some(acc) => {
                        acc.toggle(index, &mut self.outputs.writes);
                    }
                    None => log::debug!("accordion {accordion} not bound"),
                }
            }
            SiteInput::FormSubmit {
                fields,
                button_text,
            } => self.submit(&fields, &button_text),
            SiteInput::FormAcknowledged => self.acknowledge(),
            SiteInput::NavToggled => match self.nav.as_mut() {
                Some(nav) => {
                    nav.toggle(&mut self.outputs.writes);
                }
                None => log::debug!("navigation not bound"),
            },
            SiteInput::DocumentClicked {
                inside_nav,
                dropdown,
            } => {
                if let Some(nav) = self.nav.as_mut() {
                    nav.document_click(inside_nav, dropdown, &mut self.outputs.writes);
                }
            }
            SiteInput::Resized { viewport_width } => {
                if let Some(nav) = self.nav.as_mut() {
                    nav.resized(viewport_width, &mut self.outputs.writes);
                }
            }
            SiteInput::AnchorClicked { index } => match self.anchors.get(index) {
                Some(Some(target)) => {
                    let offset_px = self.cfg.anchors.as_ref().map_or(0.0, |a| a.offset_px);
                    self.outputs.scroll = Some(ScrollTo {
                        target: target.clone(),
                        offset_px,
                    });
                }
                Some(None) => log::debug!("in-page link {index} has no target"),
                None => log::debug!("no in-page link {index}"),
            },
        }
        &self.outputs
    }

    /// Drop every binding. Later events produce empty outputs.
    pub fn teardown(&mut self) {
        let pending = self.form.as_ref().is_some_and(|f| f.state.is_pending());
        self.form = None;
        self.calculators.clear();
        self.quizzes.clear();
        self.filter = None;
        self.accordions.clear();
        self.nav = None;
        self.anchors.clear();
        self.staged.clear();
        self.outputs.clear();
        self.torn_down = true;
        log::debug!("site torn down (form pending: {pending})");
    }

    fn track(&mut self, event: AnalyticsEvent) {
        let report = self.dispatcher.dispatch(&event);
        self.outputs.tracked.push(Tracked { event, report });
    }

    fn calculate(&mut self, kind: CalculatorKind, values: &[String]) {
        let Some(calc) = self.calculators.iter().find(|c| c.cfg.kind == kind) else {
            log::debug!("calculator {kind:?} not bound");
            return;
        };
        let amounts = kind.evaluate(values, calc.cfg.multiplier);
        for (key, amount) in calc.outputs.iter().zip(amounts) {
            if let Some(key) = key {
                self.outputs.writes.push(WriteOp::set_text(key, format_usd(amount)));
            }
        }
    }

    fn answer(&mut self, quiz: &str, question: &str, value: &str) {
        let Some(bound) = self.quizzes.iter_mut().find(|q| q.quiz.cfg().name == quiz) else {
            log::debug!("quiz {quiz} not bound");
            return;
        };
        let Some(result) = bound.quiz.answer(question, value) else {
            return;
        };
        let writes = &mut self.outputs.writes;
        if let Some(key) = &bound.score {
            writes.push(WriteOp::set_text(key, format!("{}%", result.score)));
        }
        if let Some(key) = &bound.recommendation {
            writes.push(WriteOp::set_text(key, result.recommendation));
        }
        if let Some(key) = &bound.results {
            writes.push(WriteOp::set_style(key, "display", "block"));
        }
    }

    fn submit(&mut self, fields: &FormFields, button_text: &str) {
        let Some(form) = self.form.as_mut() else {
            log::debug!("form not bound");
            return;
        };
        match form.state.submit(fields, button_text) {
            Ok(()) => {
                if let Some(button) = &form.submit {
                    let writes = &mut self.outputs.writes;
                    writes.push(WriteOp::set_text(button, form.cfg.submitting_text.clone()));
                    writes.push(WriteOp::set_attribute(button, "disabled", ""));
                }
                self.outputs.form = Some(FormAction::ScheduleAck {
                    delay_ms: form.cfg.ack_delay_ms,
                });
            }
            Err(FormError::Pending) => log::warn!("form submit ignored: already pending"),
            Err(e) => {
                log::debug!("form rejected: {e:?}");
                self.outputs.notify(NoticeKind::Error, e.to_string());
            }
        }
    }

    fn acknowledge(&mut self) {
        let Some(form) = self.form.as_mut() else {
            return;
        };
        let Some(button_text) = form.state.acknowledge() else {
            log::debug!("acknowledgment without a pending submission");
            return;
        };
        self.outputs
            .notify(NoticeKind::Success, form.cfg.success_message.clone());
        self.outputs.form = Some(FormAction::Reset);
        if let Some(button) = &form.submit {
            let writes = &mut self.outputs.writes;
            writes.push(WriteOp::set_text(button, button_text));
            writes.push(WriteOp::remove_attribute(button, "disabled"));
        }
    }
}

impl std::fmt::Debug for Site {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Site")
            .field("bound", &self.bound)
            .field("torn_down", &self.torn_down)
            .field("sinks", &self.dispatcher)
            .field("calculators", &self.calculators.len())
            .field("quizzes", &self.quizzes.len())
            .field("accordions", &self.accordions.len())
            .field("nav", &self.nav.is_some())
            .field("anchors", &self.anchors.len())
            .finish()
    }
}

fn skip(report: &mut SiteBindReport, selector: &str) {
    log::debug!("no element matches {selector}; skipping");
    report.skipped.push(selector.to_string());
}

fn accordion_items(resolver: &mut dyn ElementResolver, cfg: &AccordionCfg) -> Vec<AccordionItem> {
    let keys = resolver.query_all(&cfg.items);
    let mut within = |item: &ElementKey, selector: &Option<String>| {
        selector
            .as_deref()
            .and_then(|s| resolver.query_within(item, s).into_iter().next())
    };
    keys.into_iter()
        .filter_map(|item| {
            let trigger = match &cfg.trigger {
                Some(_) => within(&item, &cfg.trigger)?,
                None => item.clone(),
            };
            Some(AccordionItem {
                panel: within(&item, &cfg.panel),
                indicator: within(&item, &cfg.indicator),
                trigger,
                item,
            })
        })
        .collect()
}
