//! wasm-bindgen surface for Vitrine page motion.
//!
//! Two entry points: [`install`] wires a whole page (observers, listeners,
//! frame loop) and returns a [`MotionHandle`]; [`VitrineMotion`] exposes the
//! engine directly for hosts that drive their own loop.

mod backdrop;
mod host;
mod observe;

use std::cell::Cell;
use std::str::FromStr;

use js_sys::Function;
use serde_wasm_bindgen as swb;
use wasm_bindgen::prelude::*;

use vitrine_api_wasm::{DomResolver, ElementTable};
use vitrine_motion_core::{Config, Engine, Inputs, Outputs, WriteBatch};

use crate::host::Installed;

pub use vitrine_api_wasm::KEY_ATTR;

thread_local! {
    static INSTALLED: Cell<bool> = const { Cell::new(false) };
}

fn jsvalue_is_undefined_or_null(v: &JsValue) -> bool {
    v.is_undefined() || v.is_null()
}

fn parse_config(config: JsValue) -> Result<Config, JsError> {
    if jsvalue_is_undefined_or_null(&config) {
        Ok(Config::default())
    } else {
        swb::from_value(config).map_err(|e| JsError::new(&format!("config error: {e}")))
    }
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

/// Headless engine handle. The caller owns the frame loop and the observers.
#[wasm_bindgen]
pub struct VitrineMotion {
    core: Engine,
    table: ElementTable,
}

#[wasm_bindgen]
impl VitrineMotion {
    /// Create an engine. Pass a config object, or undefined/null for the
    /// site defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<VitrineMotion, JsError> {
        console_error_panic_hook::set_once();
        Ok(VitrineMotion {
            core: Engine::new(parse_config(config)?),
            table: ElementTable::new(),
        })
    }

    /// Resolve the configured selectors against `window.document`. Matched
    /// elements are tagged with `data-vitrine-key`. Returns the bind report.
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
        swb::to_value(&report).map_err(|e| JsError::new(&format!("report error: {e}")))
    }

    /// Step by `dt_ms` with an inputs object. Returns the outputs object.
    #[wasm_bindgen]
    pub fn update(&mut self, dt_ms: f64, inputs: JsValue) -> Result<JsValue, JsError> {
        let inputs: Inputs = if jsvalue_is_undefined_or_null(&inputs) {
            Inputs::default()
        } else {
            swb::from_value(inputs).map_err(|e| JsError::new(&format!("inputs error: {e}")))?
        };
        let out: &Outputs = self.core.update(dt_ms, inputs);
        swb::to_value(out).map_err(|e| JsError::new(&format!("outputs error: {e}")))
    }

    /// Apply a list of writes (the `writes` field of an outputs object) to
    /// the elements bound by `bind_document`. Returns how many were applied.
    #[wasm_bindgen]
    pub fn apply(&self, writes: JsValue) -> Result<usize, JsError> {
        let batch: WriteBatch =
            swb::from_value(writes).map_err(|e| JsError::new(&format!("writes error: {e}")))?;
        self.table.apply(&batch);
        Ok(batch.len())
    }

    #[wasm_bindgen(js_name = wants_frame)]
    pub fn wants_frame(&self) -> bool {
        self.core.wants_frame()
    }

    /// Current particle frame, or null without a backdrop.
    #[wasm_bindgen(js_name = backdrop_frame)]
    pub fn backdrop_frame(&self) -> Result<JsValue, JsError> {
        match self.core.backdrop_frame() {
            Some(frame) => {
                swb::to_value(&frame).map_err(|e| JsError::new(&format!("frame error: {e}")))
            }
            None => Ok(JsValue::NULL),
        }
    }

    #[wasm_bindgen(js_name = resize_backdrop)]
    pub fn resize_backdrop(&mut self, width: f64, height: f64) {
        self.core.resize_backdrop(width, height);
    }

    /// Stop everything. Returns the targets the caller must unobserve.
    #[wasm_bindgen]
    pub fn teardown(&mut self) -> Result<JsValue, JsError> {
        let torn = self.core.teardown();
        self.table.clear();
        swb::to_value(&torn).map_err(|e| JsError::new(&format!("teardown error: {e}")))
    }
}

/// Handle returned by [`install`]. Freeing it tears the page down.
#[wasm_bindgen]
pub struct MotionHandle {
    inner: Installed,
}

#[wasm_bindgen]
impl MotionHandle {
    #[wasm_bindgen(js_name = is_active)]
    pub fn is_active(&self) -> bool {
        self.inner.is_active()
    }

    /// Bind report produced at install time.
    #[wasm_bindgen]
    pub fn report(&self) -> Result<JsValue, JsError> {
        swb::to_value(self.inner.report())
            .map_err(|e| JsError::new(&format!("report error: {e}")))
    }

    /// Register `f(event)` for engine events; pass null to remove it.
    #[wasm_bindgen(js_name = on_event)]
    pub fn on_event(&self, f: Option<Function>) {
        self.inner.set_event_listener(f);
    }

    /// Disconnect observers, remove listeners and cancel pending frames.
    /// Returns null when already torn down.
    #[wasm_bindgen]
    pub fn teardown(&mut self) -> Result<JsValue, JsError> {
        match self.inner.teardown() {
            Some(torn) => {
                INSTALLED.with(|flag| flag.set(false));
                swb::to_value(&torn).map_err(|e| JsError::new(&format!("teardown error: {e}")))
            }
            None => Ok(JsValue::NULL),
        }
    }
}

impl Drop for MotionHandle {
    fn drop(&mut self) {
        if self.inner.is_active() {
            self.inner.teardown();
            INSTALLED.with(|flag| flag.set(false));
        }
    }
}

/// Install page motion on the current document. Only one installation may
/// be active at a time.
#[wasm_bindgen]
pub fn install(config: JsValue) -> Result<MotionHandle, JsError> {
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
    Ok(MotionHandle { inner })
}

/// Numeric ABI version for compatibility checks at init.
#[wasm_bindgen]
pub fn abi_version() -> u32 {
    1
}
