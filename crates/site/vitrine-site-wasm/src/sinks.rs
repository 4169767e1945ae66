//! Analytics sinks backed by the page globals (`gtag`, `ga`, `fbq`,
//! `dataLayer`).

use js_sys::{Array, Function, Reflect};
use serde::Serialize;
use serde_json::Value;
use serde_wasm_bindgen::Serializer;
use vitrine_site_core::{AnalyticsEvent, EventSink, SinkCall, SinkError, SinkKind};
use wasm_bindgen::{JsCast, JsValue};

/// Looks the global up on every send; trackers often load after us.
pub struct JsSink {
    kind: SinkKind,
}

impl JsSink {
    pub fn new(kind: SinkKind) -> Self {
        Self { kind }
    }

    fn global(&self) -> Option<JsValue> {
        let win = web_sys::window()?;
        let value = Reflect::get(&win, &JsValue::from_str(self.kind.global())).ok()?;
        (!value.is_undefined() && !value.is_null()).then_some(value)
    }

    fn to_js(&self, value: &Value) -> Result<JsValue, SinkError> {
        value
            .serialize(&Serializer::json_compatible())
            .map_err(|e| SinkError::Payload {
                sink: self.name().to_string(),
                message: e.to_string(),
            })
    }

    fn threw(&self, e: JsValue) -> SinkError {
        SinkError::Threw {
            sink: self.name().to_string(),
            message: e.as_string().unwrap_or_else(|| format!("{e:?}")),
        }
    }
}

impl EventSink for JsSink {
    fn name(&self) -> &str {
        self.kind.global()
    }

    fn is_available(&self) -> bool {
        match (self.kind, self.global()) {
            (_, None) => false,
            (SinkKind::DataLayer, Some(_)) => true,
            (_, Some(g)) => g.is_function(),
        }
    }

    fn send(&mut self, event: &AnalyticsEvent) -> Result<(), SinkError> {
        let global = self
            .global()
            .ok_or_else(|| SinkError::Unavailable(self.name().to_string()))?;
        match self.kind.call(event) {
            SinkCall::Invoke { args } => {
                let f: &Function = global
                    .dyn_ref()
                    .ok_or_else(|| SinkError::Unavailable(self.name().to_string()))?;
                let js_args = Array::new();
                for arg in &args {
                    js_args.push(&self.to_js(arg)?);
                }
                f.apply(&JsValue::UNDEFINED, &js_args)
                    .map(|_| ())
                    .map_err(|e| self.threw(e))
            }
            SinkCall::Push { item } => {
                let push = Reflect::get(&global, &JsValue::from_str("push"))
                    .map_err(|e| self.threw(e))?
                    .dyn_into::<Function>()
                    .map_err(|_| SinkError::Unavailable(format!("{}.push", self.name())))?;
                push.call1(&global, &self.to_js(&item)?)
                    .map(|_| ())
                    .map_err(|e| self.threw(e))
            }
        }
    }
}
