//! wasm-bindgen surface for the Vitrine site widgets.
//!
//! [`install`] wires analytics, the qualification form, calculators,
//! quizzes, the case-study filter and accordions on the current document and
//! returns a [`SiteHandle`]. [`VitrineSite`] exposes the site engine directly
//! for hosts that route events themselves.

mod host;
mod sinks;

use std::cell::Cell;
use std::str::FromStr;

use js_sys::Function;
use serde::Serialize;
use serde_wasm_bindgen as swb;
use wasm_bindgen::prelude::*;

use vitrine_api_wasm::{DomResolver, ElementTable};
use vitrine_site_core::{SinkKind, Site, SiteConfig, SiteInput, WriteBatch};

use crate::host::Installed;
use crate::sinks::JsSink;

thread_local! {
    static INSTALLED: Cell<bool> = const { Cell::new(false) };
}

fn jsvalue_is_undefined_or_null(v: &JsValue) -> bool {
    v.is_undefined() || v.is_null()
}

fn parse_config(config: JsValue) -> Result<SiteConfig, JsError> {
    if jsvalue_is_undefined_or_null(&config) {
        Ok(SiteConfig::default())
    } else {
        swb::from_value(config).map_err(|e| JsError::new(&format!("config error: {e}")))
    }
}

/// Plain objects instead of `Map`s, so event data reads like JSON.
fn to_js<T: Serialize>(value: &T, what: &str) -> Result<JsValue, JsError> {
    value
        .serialize(&swb::Serializer::json_compatible())
        .map_err(|e| JsError::new(&format!("{what} error: {e}")))
}

/// Route `log` records to the browser console. Later calls are no-ops.
#[wasm_bindgen(js_name = init_logging)]
pub fn init_logging(level: Option<String>) {
    let level = level
        .as_deref()
        .and_then(|l| log::Level::from_str(l).ok())
        .unwrap_or(log::Level::Info);
    if console_log::init_with_level(level).is_ok() {
        log::debug!("console logging at {level}");
    }
}

/// Headless site engine. The caller routes DOM events in as inputs and
/// applies the writes that come back.
#[wasm_bindgen]
pub struct VitrineSite {
    core: Site,
    table: ElementTable,
}

#[wasm_bindgen]
impl VitrineSite {
    /// Create a site. Pass a config object, or undefined/null for the
    /// production defaults. No analytics sinks are attached until
    /// `use_browser_sinks`.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<VitrineSite, JsError> {
        console_error_panic_hook::set_once();
        Ok(VitrineSite {
            core: Site::new(parse_config(config)?),
            table: ElementTable::new(),
        })
    }

    /// Attach the configured page-global sinks (`gtag`, `ga`, `fbq`,
    /// `dataLayer`).
    #[wasm_bindgen(js_name = use_browser_sinks)]
    pub fn use_browser_sinks(&mut self) {
        let kinds: Vec<SinkKind> = self.core.cfg().analytics.sinks.clone();
        let dispatcher = self.core.dispatcher_mut();
        for kind in kinds {
            dispatcher.add(JsSink::new(kind));
        }
    }

    /// Resolve the configured widgets against `window.document`. Returns the
    /// bind report.
    #[wasm_bindgen(js_name = bind_document)]
    pub fn bind_document(&mut self) -> Result<JsValue, JsError> {
        let doc = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| JsError::new("bind_document: no document"))?;
        let report = self
            .core
            .bind(&mut DomResolver {
                document: &doc,
                table: &mut self.table,
            })
            .map_err(|e| JsError::new(&format!("bind error: {e}")))?;
        to_js(&report, "report")
    }

    /// Handle one input object (`{ type: "filter_selected", index: 1 }`, ...).
    /// Returns the outputs object.
    #[wasm_bindgen]
    pub fn handle(&mut self, input: JsValue) -> Result<JsValue, JsError> {
        let input: SiteInput =
            swb::from_value(input).map_err(|e| JsError::new(&format!("input error: {e}")))?;
        to_js(self.core.handle(input), "outputs")
    }

    /// Apply a list of writes to the elements bound by `bind_document`.
    /// Returns how many were applied.
    #[wasm_bindgen]
    pub fn apply(&self, writes: JsValue) -> Result<usize, JsError> {
        let batch: WriteBatch =
            swb::from_value(writes).map_err(|e| JsError::new(&format!("writes error: {e}")))?;
        self.table.apply(&batch);
        Ok(batch.len())
    }

    #[wasm_bindgen]
    pub fn teardown(&mut self) {
        self.core.teardown();
        self.table.clear();
    }
}

/// Handle returned by [`install`]. Freeing it tears the widgets down.
#[wasm_bindgen]
pub struct SiteHandle {
    inner: Installed,
}

#[wasm_bindgen]
impl SiteHandle {
    #[wasm_bindgen(js_name = is_active)]
    pub fn is_active(&self) -> bool {
        self.inner.is_active()
    }

    /// Bind report produced at install time.
    #[wasm_bindgen]
    pub fn report(&self) -> Result<JsValue, JsError> {
        to_js(self.inner.report(), "report")
    }

    /// Register `f(notice)` to show form messages instead of `alert`; pass
    /// null to go back to `alert`.
    #[wasm_bindgen(js_name = on_notice)]
    pub fn on_notice(&self, f: Option<Function>) {
        self.inner.set_notice_listener(f);
    }

    /// Remove listeners and cancel pending timers. Returns false when
    /// already torn down.
    #[wasm_bindgen]
    pub fn teardown(&mut self) -> bool {
        let torn = self.inner.teardown();
        if torn {
            INSTALLED.with(|flag| flag.set(false));
        }
        torn
    }
}

impl Drop for SiteHandle {
    fn drop(&mut self) {
        if self.inner.is_active() {
            self.inner.teardown();
            INSTALLED.with(|flag| flag.set(false));
        }
    }
}

/// Install the site widgets on the current document. Only one installation
/// may be active at a time.
#[wasm_bindgen]
pub fn install(config: JsValue) -> Result<SiteHandle, JsError> {
    console_error_panic_hook::set_once();
    if INSTALLED.with(Cell::get) {
        return Err(JsError::new("install error: already installed"));
    }
    let cfg = parse_config(config)?;
    let inner = Installed::install(cfg).map_err(|e| {
        JsError::new(&format!(
            "install error: {}",
            e.as_string().unwrap_or_else(|| format!("{e:?}"))
        ))
    })?;
    INSTALLED.with(|flag| flag.set(true));
    Ok(SiteHandle { inner })
}

/// Numeric ABI version for compatibility checks at init.
#[wasm_bindgen]
pub fn abi_version() -> u32 {
    1
}
