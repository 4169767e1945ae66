//! Analytics events and multi-sink dispatch.
//!
//! Events are built from page context plus element context, then handed to
//! every available sink. A sink that is missing is skipped; a sink that
//! fails is logged and the remaining sinks still run.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::SinkError;

pub type EventData = Map<String, Value>;

/// Where the event happened.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageContext {
    pub location: String,
    pub title: String,
    #[serde(default)]
    pub referrer: String,
    /// `location.pathname`, used to highlight the current navigation link.
    #[serde(default)]
    pub path: String,
}

/// The `[data-event]` element a click resolved to.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClickContext {
    /// Value of `data-event`.
    pub event: String,
    /// Remaining `data-*` entries, keys as the browser's `dataset` names them.
    #[serde(default)]
    pub dataset: Vec<(String, String)>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub href: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub class: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsEvent {
    pub name: String,
    pub data: EventData,
}

fn non_empty(v: &Option<String>) -> Value {
    match v.as_deref() {
        Some(s) if !s.is_empty() => Value::String(s.to_string()),
        _ => Value::Null,
    }
}

impl AnalyticsEvent {
    pub fn new(name: impl Into<String>, data: EventData) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    /// A click on an element carrying `data-event`.
    pub fn click(ctx: &ClickContext, page: &PageContext) -> Self {
        let mut data = EventData::new();
        data.insert("event_category".into(), "CTA".into());
        data.insert("page_location".into(), page.location.clone().into());
        data.insert("page_title".into(), page.title.clone().into());
        for (k, v) in &ctx.dataset {
            if k != "event" {
                data.insert(k.clone(), v.clone().into());
            }
        }
        data.insert("element_text".into(), ctx.text.trim().into());
        data.insert("element_href".into(), non_empty(&ctx.href));
        data.insert("element_id".into(), non_empty(&ctx.id));
        data.insert("element_class".into(), non_empty(&ctx.class));
        Self::new(ctx.event.clone(), data)
    }

    /// Submission of a form carrying `data-event`.
    pub fn form_submit(name: &str, form_id: Option<String>, page: &PageContext) -> Self {
        let mut data = EventData::new();
        data.insert("event_category".into(), "Form".into());
        data.insert("form_id".into(), non_empty(&form_id));
        data.insert("page_location".into(), page.location.clone().into());
        data.insert("page_title".into(), page.title.clone().into());
        Self::new(name, data)
    }

    pub fn page_view(page: &PageContext) -> Self {
        let mut data = EventData::new();
        data.insert("event_category".into(), "Page View".into());
        data.insert("page_location".into(), page.location.clone().into());
        data.insert("page_title".into(), page.title.clone().into());
        data.insert("page_referrer".into(), page.referrer.clone().into());
        Self::new("page_view", data)
    }

    pub fn category(&self) -> Option<&str> {
        self.data.get("event_category").and_then(Value::as_str)
    }

    pub fn label(&self) -> Option<&str> {
        self.data.get("event_label").and_then(Value::as_str)
    }
}

/// The third-party trackers a page may carry.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkKind {
    /// `gtag('event', name, data)`
    Gtag,
    /// `ga('send', 'event', category, name, label)`
    UniversalAnalytics,
    /// `fbq('track', 'CustomEvent', {event_name, ...data})`
    Pixel,
    /// `dataLayer.push({event: 'custom_event', event_name, ...data})`
    DataLayer,
}

impl SinkKind {
    pub const ALL: [SinkKind; 4] = [
        SinkKind::Gtag,
        SinkKind::UniversalAnalytics,
        SinkKind::Pixel,
        SinkKind::DataLayer,
    ];

    /// Name of the page global the sink lives under.
    pub fn global(&self) -> &'static str {
        match self {
            SinkKind::Gtag => "gtag",
            SinkKind::UniversalAnalytics => "ga",
            SinkKind::Pixel => "fbq",
            SinkKind::DataLayer => "dataLayer",
        }
    }

    /// The call this sink expects for `event`.
    pub fn call(&self, event: &AnalyticsEvent) -> SinkCall {
        let name = Value::String(event.name.clone());
        match self {
            SinkKind::Gtag => SinkCall::Invoke {
                args: vec!["event".into(), name, Value::Object(event.data.clone())],
            },
            SinkKind::UniversalAnalytics => SinkCall::Invoke {
                args: vec![
                    "send".into(),
                    "event".into(),
                    event.category().unwrap_or("Engagement").into(),
                    name,
                    event.label().map(Value::from).unwrap_or(Value::Null),
                ],
            },
            SinkKind::Pixel => {
                let mut payload = EventData::new();
                payload.insert("event_name".into(), name);
                payload.extend(event.data.clone());
                SinkCall::Invoke {
                    args: vec!["track".into(), "CustomEvent".into(), Value::Object(payload)],
                }
            }
            SinkKind::DataLayer => {
                let mut payload = EventData::new();
                payload.insert("event".into(), "custom_event".into());
                payload.insert("event_name".into(), name);
                payload.extend(event.data.clone());
                SinkCall::Push {
                    item: Value::Object(payload),
                }
            }
        }
    }
}

/// What a host does with the sink global.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SinkCall {
    /// Call the global as a function.
    Invoke { args: Vec<Value> },
    /// Call `push` on the global.
    Push { item: Value },
}

/// One destination for analytics events.
pub trait EventSink {
    fn name(&self) -> &str;

    /// Checked before every send; the page may load trackers late.
    fn is_available(&self) -> bool;

    fn send(&mut self, event: &AnalyticsEvent) -> Result<(), SinkError>;
}

/// Outcome of one dispatch.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchReport {
    pub delivered: Vec<String>,
    pub skipped: Vec<String>,
    pub failed: Vec<String>,
}

#[derive(Default)]
pub struct Dispatcher {
    sinks: Vec<Box<dyn EventSink>>,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.sinks.iter().map(|s| s.name()))
            .finish()
    }
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sink(mut self, sink: impl EventSink + 'static) -> Self {
        self.add(sink);
        self
    }

    pub fn add(&mut self, sink: impl EventSink + 'static) {
        self.sinks.push(Box::new(sink));
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    pub fn dispatch(&mut self, event: &AnalyticsEvent) -> DispatchReport {
        log::debug!("analytics event {}: {:?}", event.name, event.data);
        let mut report = DispatchReport::default();
        for sink in self.sinks.iter_mut() {
            let name = sink.name().to_string();
            if !sink.is_available() {
                report.skipped.push(name);
                continue;
            }
            match sink.send(event) {
                Ok(()) => report.delivered.push(name),
                Err(e) => {
                    log::warn!("analytics: {e}");
                    report.failed.push(name);
                }
            }
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn page() -> PageContext {
        PageContext {
            location: "https://example.test/services".into(),
            title: "Services".into(),
            referrer: String::new(),
            path: "/services".into(),
        }
    }

    struct Recording {
        kind: SinkKind,
        available: bool,
        fail: bool,
        calls: Rc<RefCell<Vec<SinkCall>>>,
    }

    impl EventSink for Recording {
        fn name(&self) -> &str {
            self.kind.global()
        }

        fn is_available(&self) -> bool {
            self.available
        }

        fn send(&mut self, event: &AnalyticsEvent) -> Result<(), SinkError> {
            if self.fail {
                return Err(SinkError::Threw {
                    sink: self.name().into(),
                    message: "boom".into(),
                });
            }
            self.calls.borrow_mut().push(self.kind.call(event));
            Ok(())
        }
    }

    #[test]
    fn click_event_carries_element_context() {
        let ctx = ClickContext {
            event: "book_call".into(),
            dataset: vec![
                ("event".into(), "book_call".into()),
                ("placement".into(), "hero".into()),
            ],
            text: "  Book a call \n".into(),
            href: Some("https://example.test/book".into()),
            id: Some(String::new()),
            class: Some("btn primary".into()),
        };
        let ev = AnalyticsEvent::click(&ctx, &page());
        assert_eq!(ev.name, "book_call");
        assert_eq!(ev.category(), Some("CTA"));
        assert_eq!(ev.data["placement"], "hero");
        assert_eq!(ev.data["element_text"], "Book a call");
        assert_eq!(ev.data["element_id"], Value::Null);
        assert!(!ev.data.contains_key("event"));
    }

    #[test]
    fn universal_analytics_defaults_category() {
        let ev = AnalyticsEvent::new("x", EventData::new());
        let SinkCall::Invoke { args } = SinkKind::UniversalAnalytics.call(&ev) else {
            panic!("ga is invoked");
        };
        assert_eq!(args[2], "Engagement");
        assert_eq!(args[4], Value::Null);
    }

    #[test]
    fn data_layer_push_is_flattened() {
        let ev = AnalyticsEvent::form_submit("lead", Some("qualificationForm".into()), &page());
        let SinkCall::Push { item } = SinkKind::DataLayer.call(&ev) else {
            panic!("dataLayer is pushed");
        };
        assert_eq!(item["event"], "custom_event");
        assert_eq!(item["event_name"], "lead");
        assert_eq!(item["event_category"], "Form");
        assert_eq!(item["form_id"], "qualificationForm");
    }

    #[test]
    fn failing_sink_does_not_stop_the_rest() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let sink = |kind, available, fail| Recording {
            kind,
            available,
            fail,
            calls: calls.clone(),
        };
        let mut d = Dispatcher::new()
            .with_sink(sink(SinkKind::Gtag, true, true))
            .with_sink(sink(SinkKind::UniversalAnalytics, false, false))
            .with_sink(sink(SinkKind::Pixel, true, false))
            .with_sink(sink(SinkKind::DataLayer, true, false));
        let report = d.dispatch(&AnalyticsEvent::page_view(&page()));
        assert_eq!(report.failed, vec!["gtag"]);
        assert_eq!(report.skipped, vec!["ga"]);
        assert_eq!(report.delivered, vec!["fbq", "dataLayer"]);
        assert_eq!(calls.borrow().len(), 2);
    }
}
