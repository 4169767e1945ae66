//! Element table and the `web_sys` side of the core contracts.

use hashbrown::HashMap;
use vitrine_api_core::{DomWrite, ElementKey, ElementResolver, WriteBatch};
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, Node, NodeList};

/// Attribute carrying the key of every element the host hands to the core.
pub const KEY_ATTR: &str = "data-vitrine-key";

/// Maps core keys to live elements. Elements with an `id` use it as their
/// key; others get a generated one stored in [`KEY_ATTR`].
///
/// [`KEY_ATTR`] is shared by every table on the page, so a key is only
/// claimed when neither this table nor another element in the document
/// already carries it.
#[derive(Default)]
pub struct ElementTable {
    by_key: HashMap<ElementKey, Element>,
    next: u32,
}

impl ElementTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key_for(&mut self, el: &Element) -> ElementKey {
        let tagged = el.get_attribute(KEY_ATTR).and_then(|k| ElementKey::parse(&k).ok());
        if let Some(existing) = tagged {
            if !self.held_elsewhere(&existing, el) {
                self.by_key.insert(existing.clone(), el.clone());
                return existing;
            }
        }
        let key = match ElementKey::parse(&el.id()) {
            Ok(id) if !self.held_elsewhere(&id, el) => id,
            _ => loop {
                self.next += 1;
                let candidate = ElementKey::new(format!("vt-{}", self.next));
                if !self.held_elsewhere(&candidate, el) {
                    break candidate;
                }
            },
        };
        let _ = el.set_attribute(KEY_ATTR, key.as_str());
        self.by_key.insert(key.clone(), el.clone());
        key
    }

    /// True when `key` already names an element other than `el`, in this
    /// table or through [`KEY_ATTR`] anywhere in `el`'s document.
    fn held_elsewhere(&self, key: &ElementKey, el: &Element) -> bool {
        let node: &Node = el.as_ref();
        if let Some(held) = self.by_key.get(key) {
            return !held.is_same_node(Some(node));
        }
        let raw = key.as_str();
        if raw.contains(['"', '\\']) {
            return false;
        }
        let tagged = el
            .owner_document()
            .and_then(|doc| doc.query_selector(&format!("[{KEY_ATTR}=\"{raw}\"]")).ok().flatten());
        tagged.is_some_and(|other| !other.is_same_node(Some(node)))
    }

    pub fn get(&self, key: &ElementKey) -> Option<&Element> {
        self.by_key.get(key)
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }

    pub fn clear(&mut self) {
        self.by_key.clear();
    }

    /// Apply a batch in order. Unknown keys and failing writes are logged and skipped.
    pub fn apply(&self, batch: &WriteBatch) {
        for op in batch.iter() {
            let Some(el) = self.by_key.get(&op.target) else {
                log::debug!("write to unknown element {}", op.target);
                continue;
            };
            if let Err(e) = apply_one(el, &op.write) {
                log::warn!("write {op} failed: {e:?}");
            }
        }
    }
}

fn apply_one(el: &Element, write: &DomWrite) -> Result<(), wasm_bindgen::JsValue> {
    match write {
        DomWrite::AddClass { class } => el.class_list().add_1(class),
        DomWrite::RemoveClass { class } => el.class_list().remove_1(class),
        DomWrite::SetClass { class, on } => el.class_list().toggle_with_force(class, *on).map(|_| ()),
        DomWrite::SetStyle { property, value } => match el.dyn_ref::<HtmlElement>() {
            Some(html) => html.style().set_property(property, value),
            None => Ok(()),
        },
        DomWrite::RemoveStyle { property } => match el.dyn_ref::<HtmlElement>() {
            Some(html) => html.style().remove_property(property).map(|_| ()),
            None => Ok(()),
        },
        DomWrite::SetText { text } => {
            el.set_text_content(Some(text));
            Ok(())
        }
        DomWrite::SetAttribute { name, value } => el.set_attribute(name, value),
        DomWrite::RemoveAttribute { name } => el.remove_attribute(name),
    }
}

fn elements(list: NodeList) -> impl Iterator<Item = Element> {
    (0..list.length()).filter_map(move |i| list.item(i)?.dyn_into::<Element>().ok())
}

/// Resolver over the live document.
pub struct DomResolver<'a> {
    pub document: &'a Document,
    pub table: &'a mut ElementTable,
}

impl ElementResolver for DomResolver<'_> {
    fn query_all(&mut self, selector: &str) -> Vec<ElementKey> {
        match self.document.query_selector_all(selector) {
            Ok(list) => elements(list).map(|el| self.table.key_for(&el)).collect(),
            Err(_) => {
                log::warn!("invalid selector {selector}");
                Vec::new()
            }
        }
    }

    fn query_within(&mut self, parent: &ElementKey, selector: &str) -> Vec<ElementKey> {
        let Some(parent) = self.table.get(parent).cloned() else {
            return Vec::new();
        };
        match parent.query_selector_all(selector) {
            Ok(list) => elements(list).map(|el| self.table.key_for(&el)).collect(),
            Err(_) => {
                log::warn!("invalid selector {selector}");
                Vec::new()
            }
        }
    }

    fn data(&mut self, key: &ElementKey, name: &str) -> Option<String> {
        self.attribute(key, &format!("data-{name}"))
    }

    fn attribute(&mut self, key: &ElementKey, name: &str) -> Option<String> {
        self.table.get(key)?.get_attribute(name)
    }

    fn viewport(&mut self) -> (f64, f64) {
        viewport()
    }

    fn ensure_element(&mut self, id: &str, class: &str) -> Option<ElementKey> {
        if let Some(el) = self.document.get_element_by_id(id) {
            return Some(self.table.key_for(&el));
        }
        let el = self.document.create_element("div").ok()?;
        el.set_id(id);
        el.set_class_name(class);
        self.document.body()?.append_child(&el).ok()?;
        Some(self.table.key_for(&el))
    }
}

pub fn viewport() -> (f64, f64) {
    let Some(win) = web_sys::window() else {
        return (0.0, 0.0);
    };
    let w = win.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    let h = win.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    (w, h)
}
