#![cfg(target_arch = "wasm32")]
use std::cell::Cell;
use std::rc::Rc;

use vitrine_api_core::{ElementKey, ElementResolver, WriteBatch, WriteOp};
use vitrine_api_wasm::{validate_writebatch_json, DomResolver, ElementTable, Listeners, KEY_ATTR};
use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn document() -> web_sys::Document {
    web_sys::window().unwrap().document().unwrap()
}

fn host(id: &str, inner: &str) -> web_sys::Element {
    let doc = document();
    let el = doc.create_element("section").unwrap();
    el.set_id(id);
    el.set_inner_html(inner);
    doc.body().unwrap().append_child(&el).unwrap();
    el
}

#[wasm_bindgen_test]
fn resolver_keys_by_id_then_generated() {
    let root = host("api-root", r#"<p id="named" class="t"></p><p class="t"></p>"#);
    let doc = document();
    let mut table = ElementTable::new();
    let keys = DomResolver {
        document: &doc,
        table: &mut table,
    }
    .query_all("#api-root .t");
    assert_eq!(keys.len(), 2);
    assert_eq!(keys[0].as_str(), "named");
    assert!(keys[1].as_str().starts_with("vt-"));
    let second = root.query_selector("p:not(#named)").unwrap().unwrap();
    assert_eq!(second.get_attribute(KEY_ATTR).as_deref(), Some(keys[1].as_str()));
    root.remove();
}

#[wasm_bindgen_test]
fn two_tables_never_hand_out_the_same_generated_key() {
    let root = host("api-shared", r#"<p class="first"></p><p class="second"></p>"#);
    let doc = document();
    let mut motion = ElementTable::new();
    let first = DomResolver {
        document: &doc,
        table: &mut motion,
    }
    .query_all("#api-shared .first");

    let mut site = ElementTable::new();
    let mut resolver = DomResolver {
        document: &doc,
        table: &mut site,
    };
    let adopted = resolver.query_all("#api-shared .first");
    let second = resolver.query_all("#api-shared .second");
    assert_eq!(adopted, first);
    assert_ne!(second, first);

    let first_el = root.query_selector(".first").unwrap().unwrap();
    let second_el = root.query_selector(".second").unwrap().unwrap();
    let first_node: &web_sys::Node = &first_el;
    let second_node: &web_sys::Node = &second_el;
    assert!(site.get(&first[0]).unwrap().is_same_node(Some(first_node)));
    assert!(site.get(&second[0]).unwrap().is_same_node(Some(second_node)));
    assert!(motion.get(&first[0]).unwrap().is_same_node(Some(first_node)));
    root.remove();
}

#[wasm_bindgen_test]
fn batch_applies_in_order_and_skips_unknown_keys() {
    let root = host("api-apply", r#"<div id="apply-target"></div>"#);
    let doc = document();
    let mut table = ElementTable::new();
    let key = DomResolver {
        document: &doc,
        table: &mut table,
    }
    .query_first("#apply-target")
    .unwrap();

    let mut batch = WriteBatch::new();
    batch.push(WriteOp::add_class(&key, "a"));
    batch.push(WriteOp::set_text(&key, "hello"));
    batch.push(WriteOp::set_style(&key, "width", "40%"));
    batch.push(WriteOp::remove_class(&key, "a"));
    batch.push(WriteOp::add_class(&ElementKey::new("missing"), "x"));
    table.apply(&batch);

    let el = table.get(&key).unwrap();
    assert!(!el.class_list().contains("a"));
    assert_eq!(el.text_content().as_deref(), Some("hello"));
    let html: &web_sys::HtmlElement = el.dyn_ref().unwrap();
    assert_eq!(html.style().get_property_value("width").unwrap(), "40%");
    root.remove();
}

#[wasm_bindgen_test]
fn listeners_detach_on_clear() {
    let root = host("api-listen", "");
    let hits = Rc::new(Cell::new(0));
    let mut listeners = Listeners::new();
    let h = hits.clone();
    listeners
        .add(&root, "click", move |_| h.set(h.get() + 1))
        .unwrap();
    let html: web_sys::HtmlElement = root.clone().dyn_into().unwrap();
    html.click();
    listeners.clear();
    html.click();
    assert_eq!(hits.get(), 1);
    assert!(listeners.is_empty());
    root.remove();
}

#[wasm_bindgen_test]
fn writebatch_json_is_validated() {
    assert!(validate_writebatch_json(r#"[{"target":"a","op":"add_class","class":"x"}]"#).is_ok());
    assert!(validate_writebatch_json(r#"[{"target":"","op":"add_class","class":"x"}]"#).is_err());
}
