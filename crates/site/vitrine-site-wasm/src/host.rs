//! Browser runtime for the site widgets: owns the `Site`, its element table,
//! the listeners and the pending timers.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use gloo_timers::callback::Timeout;
use hashbrown::HashMap;
use js_sys::{Function, Object, Reflect};
use vitrine_api_wasm::{viewport, DomResolver, ElementTable, Listeners};
use vitrine_site_core::{
    ClickContext, Dispatcher, ElementKey, FormAction, FormFields, Notice, PageContext, ScrollTo,
    Site, SiteBindReport, SiteConfig, SiteInput, SiteOutputs, WriteBatch,
};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    Document, Element, Event, HtmlElement, HtmlFormElement, Node, ScrollBehavior, ScrollToOptions,
    Window,
};

use crate::sinks::JsSink;

struct Runtime {
    site: Site,
    table: ElementTable,
    form: Option<ElementKey>,
    /// Timed writes of the latest batch that had any.
    timed: Vec<Timeout>,
    ack: Option<Timeout>,
    on_notice: Option<Function>,
}

/// Cheap handle shared by every listener.
#[derive(Clone)]
struct Shared {
    rt: Rc<RefCell<Runtime>>,
}

impl Shared {
    fn handle(&self, input: SiteInput) {
        let Ok(mut guard) = self.rt.try_borrow_mut() else {
            log::warn!("site event while busy; dropped");
            return;
        };
        let rt = &mut *guard;
        let out = rt.site.handle(input).clone();
        rt.table.apply(&out.writes);
        self.schedule(rt, &out);
        if let Some(notice) = &out.notice {
            show(rt.on_notice.as_ref(), notice);
        }
        if let Some(to) = &out.scroll {
            if let Some(el) = rt.table.get(&to.target) {
                smooth_scroll(el, to);
            }
        }
        match out.form {
            Some(FormAction::ScheduleAck { delay_ms }) => {
                let weak = Rc::downgrade(&self.rt);
                rt.ack = Some(Timeout::new(millis(delay_ms), move || {
                    if let Some(rt) = weak.upgrade() {
                        Shared { rt }.handle(SiteInput::FormAcknowledged);
                    }
                }));
            }
            Some(FormAction::Reset) => {
                let form = rt.form.as_ref().and_then(|k| rt.table.get(k));
                if let Some(form) = form.and_then(|el| el.dyn_ref::<HtmlFormElement>()) {
                    form.reset();
                }
            }
            None => {}
        }
    }

    /// Replaces (and so cancels) the previous batch of timed writes.
    fn schedule(&self, rt: &mut Runtime, out: &SiteOutputs) {
        if out.timed.is_empty() {
            return;
        }
        rt.timed = out
            .timed
            .iter()
            .map(|t| {
                let weak: Weak<RefCell<Runtime>> = Rc::downgrade(&self.rt);
                let batch = WriteBatch(vec![t.op.clone()]);
                Timeout::new(millis(t.delay_ms), move || {
                    if let Some(rt) = weak.upgrade() {
                        if let Ok(rt) = rt.try_borrow() {
                            rt.table.apply(&batch);
                        }
                    }
                })
            })
            .collect();
    }
}

fn millis(ms: f64) -> u32 {
    ms.clamp(0.0, u32::MAX as f64) as u32
}

fn show(on_notice: Option<&Function>, notice: &Notice) {
    if let Some(f) = on_notice {
        match serde_wasm_bindgen::to_value(notice) {
            Ok(v) => {
                if let Err(e) = f.call1(&JsValue::UNDEFINED, &v) {
                    log::warn!("notice listener threw: {e:?}");
                }
            }
            Err(e) => log::warn!("notice serialization failed: {e}"),
        }
        return;
    }
    if let Some(win) = web_sys::window() {
        let _ = win.alert_with_message(&notice.message);
    }
}

fn smooth_scroll(el: &Element, to: &ScrollTo) {
    let Some(win) = web_sys::window() else {
        return;
    };
    let page_y = win.page_y_offset().unwrap_or(0.0);
    let opts = ScrollToOptions::new();
    opts.set_top(to.top(el.get_bounding_client_rect().top(), page_y));
    opts.set_behavior(ScrollBehavior::Smooth);
    win.scroll_to_with_scroll_to_options(&opts);
}

fn page_context(win: &Window, doc: &Document) -> PageContext {
    PageContext {
        location: win.location().href().unwrap_or_default(),
        title: doc.title(),
        referrer: doc.referrer(),
        path: win.location().pathname().unwrap_or_default(),
    }
}

fn string_prop(target: &JsValue, name: &str) -> Option<String> {
    Reflect::get(target, &JsValue::from_str(name))
        .ok()
        .and_then(|v| v.as_string())
}

/// Current `value` of an input, select or textarea.
fn field_value(el: &Element) -> String {
    string_prop(el, "value").unwrap_or_default()
}

fn click_context(el: &Element) -> Option<ClickContext> {
    let html = el.dyn_ref::<HtmlElement>()?;
    let event = el.get_attribute("data-event")?;
    let dataset = Object::entries(&html.dataset())
        .iter()
        .filter_map(|entry| {
            let pair: js_sys::Array = entry.dyn_into().ok()?;
            Some((pair.get(0).as_string()?, pair.get(1).as_string()?))
        })
        .collect();
    let non_empty = |s: String| (!s.is_empty()).then_some(s);
    Some(ClickContext {
        event,
        dataset,
        text: el.text_content().unwrap_or_default(),
        href: string_prop(el, "href"),
        id: non_empty(el.id()),
        class: non_empty(el.class_name()),
    })
}

fn form_fields(form: &HtmlFormElement) -> FormFields {
    let mut fields = FormFields::new();
    let Ok(data) = web_sys::FormData::new_with_form(form) else {
        return fields;
    };
    let Ok(Some(entries)) = js_sys::try_iter(&data) else {
        return fields;
    };
    for entry in entries.flatten() {
        let Ok(pair) = entry.dyn_into::<js_sys::Array>() else {
            continue;
        };
        if let (Some(k), Some(v)) = (pair.get(0).as_string(), pair.get(1).as_string()) {
            fields.insert(k, v);
        }
    }
    fields
}

fn event_element(event: &Event) -> Option<Element> {
    event.target()?.dyn_into::<Element>().ok()
}

fn event_node(event: &Event) -> Option<Node> {
    event.target()?.dyn_into::<Node>().ok()
}

/// An installed site. Dropping it tears everything down.
pub struct Installed {
    shared: Shared,
    listeners: Listeners,
    report: SiteBindReport,
    active: bool,
}

impl Installed {
    pub fn install(cfg: SiteConfig) -> Result<Self, JsValue> {
        let win = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let doc = win.document().ok_or_else(|| JsValue::from_str("no document"))?;

        let mut dispatcher = Dispatcher::new();
        for kind in &cfg.analytics.sinks {
            dispatcher.add(JsSink::new(*kind));
        }
        let click_selector = cfg.analytics.click_selector.clone();

        let mut site = Site::new(cfg);
        site.set_page(page_context(&win, &doc));
        site.set_dispatcher(dispatcher);
        let mut table = ElementTable::new();
        let report = site
            .bind(&mut DomResolver {
                document: &doc,
                table: &mut table,
            })
            .map_err(|e| JsValue::from_str(&format!("bind error: {e}")))?;

        let shared = Shared {
            rt: Rc::new(RefCell::new(Runtime {
                site,
                table,
                form: report.form.as_ref().map(|f| f.form.clone()),
                timed: Vec::new(),
                ack: None,
                on_notice: None,
            })),
        };
        let mut this = Self {
            shared,
            listeners: Listeners::new(),
            report,
            active: true,
        };

        // Clicks on tracked elements, delegated.
        {
            let s = this.shared.clone();
            this.listeners.add(&doc, "click", move |event| {
                let tracked = event_element(&event)
                    .and_then(|el| el.closest(&click_selector).ok().flatten())
                    .and_then(|el| click_context(&el));
                if let Some(context) = tracked {
                    s.handle(SiteInput::Click { context });
                }
            })?;
        }

        // Form submissions: tracking for any `form[data-event]`, validation
        // for the qualification form.
        {
            let s = this.shared.clone();
            let submit_key = this.report.form.as_ref().and_then(|f| f.submit.clone());
            this.listeners.add(&doc, "submit", move |event| {
                let Some(form) = event_element(&event)
                    .and_then(|el| el.dyn_into::<HtmlFormElement>().ok())
                else {
                    return;
                };
                if let Some(name) = form.get_attribute("data-event") {
                    let id = form.id();
                    s.handle(SiteInput::FormTracked {
                        event: name,
                        form_id: (!id.is_empty()).then_some(id),
                    });
                }
                let (is_bound, button_text) = {
                    let Ok(rt) = s.rt.try_borrow() else {
                        return;
                    };
                    let bound = rt.form.as_ref().and_then(|k| rt.table.get(k));
                    let node: &web_sys::Node = form.as_ref();
                    let is_bound = bound.is_some_and(|el| el.is_same_node(Some(node)));
                    let text = submit_key
                        .as_ref()
                        .and_then(|k| rt.table.get(k))
                        .and_then(|b| b.text_content())
                        .unwrap_or_default();
                    (is_bound, text)
                };
                if is_bound {
                    event.prevent_default();
                    s.handle(SiteInput::FormSubmit {
                        fields: form_fields(&form),
                        button_text,
                    });
                }
            })?;
        }

        // Calculators recompute on every keystroke and commit.
        for calc in &this.report.calculators {
            let inputs: Vec<Element> = {
                let rt = this.shared.rt.borrow();
                calc.inputs
                    .iter()
                    .filter_map(|k| rt.table.get(k).cloned())
                    .collect()
            };
            let recompute = {
                let s = this.shared.clone();
                let kind = calc.kind;
                let inputs = inputs.clone();
                move || {
                    let values = inputs.iter().map(field_value).collect();
                    s.handle(SiteInput::CalculatorChanged { kind, values });
                }
            };
            for el in &inputs {
                for name in ["input", "change"] {
                    let f = recompute.clone();
                    this.listeners.add(el, name, move |_| f())?;
                }
            }
            recompute();
        }

        // Quiz radios, delegated by group name.
        if !this.report.quizzes.is_empty() {
            let questions: HashMap<String, String> = this
                .report
                .quizzes
                .iter()
                .flat_map(|q| q.questions.iter().map(|name| (name.clone(), q.name.clone())))
                .collect();
            let s = this.shared.clone();
            this.listeners.add(&doc, "change", move |event| {
                let Some(el) = event_element(&event) else {
                    return;
                };
                let Some(question) = el.get_attribute("name") else {
                    return;
                };
                if let Some(quiz) = questions.get(&question) {
                    s.handle(SiteInput::QuizAnswer {
                        quiz: quiz.clone(),
                        question,
                        value: field_value(&el),
                    });
                }
            })?;
        }

        let elements = |keys: &[ElementKey]| -> Vec<(usize, Element)> {
            let rt = this.shared.rt.borrow();
            keys.iter()
                .enumerate()
                .filter_map(|(i, k)| Some((i, rt.table.get(k)?.clone())))
                .collect()
        };
        let filter_buttons = elements(&this.report.filter_buttons);
        let accordion_triggers: Vec<_> = this
            .report
            .accordions
            .iter()
            .map(|a| (a.name.clone(), elements(&a.triggers)))
            .collect();
        let nav = this.report.nav.as_ref().map(|n| {
            let one = |k: &Option<ElementKey>| {
                k.as_ref()
                    .and_then(|k| elements(std::slice::from_ref(k)).pop())
                    .map(|(_, el)| el)
            };
            let dropdowns: Vec<Element> = elements(&n.dropdowns)
                .into_iter()
                .map(|(_, el)| el)
                .collect();
            (one(&n.nav), one(&n.toggle), dropdowns)
        });
        let anchors = elements(&this.report.anchors);

        for (index, el) in filter_buttons {
            let s = this.shared.clone();
            this.listeners.add(&el, "click", move |_| {
                s.handle(SiteInput::FilterSelected { index });
            })?;
        }
        for (name, triggers) in accordion_triggers {
            for (index, el) in triggers {
                let s = this.shared.clone();
                let accordion = name.clone();
                this.listeners.add(&el, "click", move |_| {
                    s.handle(SiteInput::AccordionToggled {
                        accordion: accordion.clone(),
                        index,
                    });
                })?;
            }
        }

        // Navigation: the menu button, clicks elsewhere and widening.
        if let Some((nav_el, toggle, dropdowns)) = nav {
            if let Some(el) = toggle {
                let s = this.shared.clone();
                this.listeners
                    .add(&el, "click", move |_| s.handle(SiteInput::NavToggled))?;
            }
            let s = this.shared.clone();
            this.listeners.add(&doc, "click", move |event| {
                let Some(target) = event_node(&event) else {
                    return;
                };
                let inside_nav = nav_el.as_ref().is_some_and(|n| n.contains(Some(&target)));
                let dropdown = dropdowns.iter().position(|d| d.contains(Some(&target)));
                s.handle(SiteInput::DocumentClicked {
                    inside_nav,
                    dropdown,
                });
            })?;
            let s = this.shared.clone();
            this.listeners.add(&win, "resize", move |_| {
                s.handle(SiteInput::Resized {
                    viewport_width: viewport().0,
                });
            })?;
        }
        for (index, el) in anchors {
            let s = this.shared.clone();
            this.listeners.add(&el, "click", move |event| {
                event.prevent_default();
                s.handle(SiteInput::AnchorClicked { index });
            })?;
        }

        this.shared.handle(SiteInput::PageView);
        log::debug!("site installed: {} listeners", this.listeners.len());
        Ok(this)
    }

    pub fn report(&self) -> &SiteBindReport {
        &self.report
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn set_notice_listener(&self, f: Option<Function>) {
        if let Ok(mut rt) = self.shared.rt.try_borrow_mut() {
            rt.on_notice = f;
        }
    }

    /// Returns false when already torn down or called from inside a
    /// site callback.
    pub fn teardown(&mut self) -> bool {
        if !self.active {
            return false;
        }
        let Ok(mut rt) = self.shared.rt.try_borrow_mut() else {
            log::warn!("teardown requested from inside a site callback; ignored");
            return false;
        };
        self.active = false;
        self.listeners.clear();
        rt.timed.clear();
        rt.ack = None;
        rt.on_notice = None;
        rt.site.teardown();
        rt.table.clear();
        true
    }
}

impl Drop for Installed {
    fn drop(&mut self) {
        self.teardown();
    }
}
