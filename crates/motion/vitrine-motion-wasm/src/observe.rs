//! One `IntersectionObserver` per watch.

use js_sys::Array;
use vitrine_api_wasm::{ElementTable, KEY_ATTR};
use vitrine_motion_core::{ElementKey, IntersectionEntry, Unobserve, WatchBinding, WatchId};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit};

type EntryCallback = Closure<dyn FnMut(Array, IntersectionObserver)>;

struct Watched {
    watch: WatchId,
    observer: IntersectionObserver,
    _callback: EntryCallback,
}

#[derive(Default)]
pub struct Observers {
    items: Vec<Watched>,
}

/// True when the browser provides `IntersectionObserver`.
pub fn supported() -> bool {
    web_sys::window()
        .map(|w| js_sys::Reflect::has(&w, &JsValue::from_str("IntersectionObserver")).unwrap_or(false))
        .unwrap_or(false)
}

impl Observers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the observer for `binding` and observe its keys. `on_entries`
    /// receives translated entries for every callback batch.
    pub fn observe(
        &mut self,
        binding: &WatchBinding,
        table: &ElementTable,
        mut on_entries: impl FnMut(Vec<IntersectionEntry>) + 'static,
    ) -> Result<(), JsValue> {
        if binding.keys.is_empty() {
            return Ok(());
        }
        let watch = binding.watch;
        let callback = EntryCallback::new(move |entries: Array, _observer| {
            let batch: Vec<_> = entries
                .iter()
                .filter_map(|v| v.dyn_into::<IntersectionObserverEntry>().ok())
                .filter_map(|entry| {
                    let key = entry.target().get_attribute(KEY_ATTR)?;
                    Some(IntersectionEntry {
                        watch,
                        key: ElementKey::parse(&key).ok()?,
                        ratio: entry.intersection_ratio(),
                        is_intersecting: entry.is_intersecting(),
                    })
                })
                .collect();
            if !batch.is_empty() {
                on_entries(batch);
            }
        });

        let init = IntersectionObserverInit::new();
        init.set_threshold(&JsValue::from_f64(binding.options.threshold));
        init.set_root_margin(&binding.options.root_margin);
        let observer =
            IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init)?;
        for key in &binding.keys {
            if let Some(el) = table.get(key) {
                observer.observe(el);
            }
        }
        self.items.push(Watched {
            watch,
            observer,
            _callback: callback,
        });
        Ok(())
    }

    pub fn unobserve(&self, targets: &[Unobserve], table: &ElementTable) {
        for t in targets {
            let (Some(w), Some(el)) = (self.items.iter().find(|w| w.watch == t.watch), table.get(&t.key))
            else {
                continue;
            };
            w.observer.unobserve(el);
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn disconnect_all(&mut self) {
        for w in self.items.drain(..) {
            w.observer.disconnect();
        }
    }
}
