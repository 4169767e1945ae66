//! Host seam for looking up page elements while a core binds to a page.

use crate::key::ElementKey;

/// Implemented by hosts (the wasm crate over `web_sys::Document`, tests over
/// in-memory pages). Every lookup may come back empty; the cores skip
/// whatever it cannot find.
pub trait ElementResolver {
    /// All elements matching `selector`, in document order.
    fn query_all(&mut self, selector: &str) -> Vec<ElementKey>;

    /// Descendants of `parent` matching `selector`, in document order.
    fn query_within(&mut self, parent: &ElementKey, selector: &str) -> Vec<ElementKey>;

    /// Value of the `data-{name}` attribute.
    fn data(&mut self, key: &ElementKey, name: &str) -> Option<String>;

    /// Value of any attribute, as written in the markup (`href` stays relative).
    fn attribute(&mut self, key: &ElementKey, name: &str) -> Option<String>;

    /// Viewport `(width, height)` in CSS pixels.
    fn viewport(&mut self) -> (f64, f64);

    /// Find the element with `id`, creating it with `class` when missing.
    fn ensure_element(&mut self, id: &str, class: &str) -> Option<ElementKey>;

    fn query_first(&mut self, selector: &str) -> Option<ElementKey> {
        self.query_all(selector).into_iter().next()
    }
}
