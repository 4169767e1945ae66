//! vitrine-api-wasm: the `web_sys` side of vitrine-api-core.
//!
//! [`ElementTable`] maps keys to live elements and applies write batches,
//! [`DomResolver`] implements the resolver seam over a `Document`, and
//! [`Listeners`] owns event listener closures. Two JSON helpers are exported
//! for JS callers that build write batches by hand.

pub mod dom;
pub mod listeners;

pub use dom::{viewport, DomResolver, ElementTable, KEY_ATTR};
pub use listeners::Listeners;

use serde_wasm_bindgen::to_value;
use vitrine_api_core::WriteBatch;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub fn validate_writebatch_json(batch_json: &str) -> Result<(), JsValue> {
    serde_json::from_str::<WriteBatch>(batch_json)
        .map(|_| ())
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

#[wasm_bindgen]
pub fn writebatch_to_js(batch_json: &str) -> Result<JsValue, JsValue> {
    let batch: WriteBatch =
        serde_json::from_str(batch_json).map_err(|e| JsValue::from_str(&e.to_string()))?;
    to_value(&batch).map_err(|e| JsValue::from_str(&e.to_string()))
}
