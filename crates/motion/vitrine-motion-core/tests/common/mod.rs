#![allow(dead_code)]
use vitrine_motion_core::{DomWrite, ElementKey, IntersectionEntry, Outputs, WatchBinding, WriteBatch};
pub use vitrine_test_fixtures::FixturePage;

pub fn visible(watch: &WatchBinding, key: &str, ratio: f64) -> IntersectionEntry {
    IntersectionEntry {
        watch: watch.watch,
        key: ElementKey::new(key),
        ratio,
        is_intersecting: ratio > 0.0,
    }
}

pub fn watch_for<'a>(watches: &'a [WatchBinding], key: &str) -> &'a WatchBinding {
    watches
        .iter()
        .find(|w| w.keys.iter().any(|k| k.as_str() == key))
        .unwrap_or_else(|| panic!("no watch covers {key}"))
}

pub fn texts(batch: &WriteBatch, key: &str) -> Vec<String> {
    batch
        .for_target(&ElementKey::new(key))
        .filter_map(|w| match w {
            DomWrite::SetText { text } => Some(text.clone()),
            _ => None,
        })
        .collect()
}

pub fn added_classes(out: &Outputs, key: &str) -> Vec<String> {
    out.writes
        .for_target(&ElementKey::new(key))
        .filter_map(|w| match w {
            DomWrite::AddClass { class } => Some(class.clone()),
            DomWrite::SetClass { class, on: true } => Some(class.clone()),
            _ => None,
        })
        .collect()
}

pub fn style(out: &Outputs, key: &str, property: &str) -> Option<String> {
    out.writes
        .for_target(&ElementKey::new(key))
        .filter_map(|w| match w {
            DomWrite::SetStyle { property: p, value } if p == property => Some(value.clone()),
            _ => None,
        })
        .last()
}
