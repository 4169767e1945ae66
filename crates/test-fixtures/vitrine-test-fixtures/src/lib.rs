//! Shared test data: page configurations, in-memory page layouts and form
//! submissions, listed in `fixtures/manifest.json`.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use vitrine_api_core::{ElementKey, ElementResolver};

static MANIFEST: Lazy<Manifest> = Lazy::new(|| {
    let raw = include_str!("../../../../fixtures/manifest.json");
    serde_json::from_str(raw).expect("fixtures manifest should parse")
});

#[derive(Debug, Deserialize)]
struct Manifest {
    configs: HashMap<String, String>,
    pages: HashMap<String, PageEntry>,
    forms: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PageEntry {
    Layout(String),
    WithConfig { layout: String, config: String },
}

impl PageEntry {
    fn layout(&self) -> &str {
        match self {
            PageEntry::Layout(path) => path,
            PageEntry::WithConfig { layout, .. } => layout,
        }
    }

    fn config(&self) -> Option<&str> {
        match self {
            PageEntry::Layout(_) => None,
            PageEntry::WithConfig { config, .. } => Some(config),
        }
    }
}

/// One element of an in-memory page.
#[derive(Clone, Debug, Deserialize)]
pub struct ElementFixture {
    pub key: String,
    /// Selectors this element answers to.
    #[serde(default)]
    pub matches: Vec<String>,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub data: HashMap<String, String>,
    /// Plain attributes such as `href`; `data-*` go in `data`.
    #[serde(default)]
    pub attrs: HashMap<String, String>,
}

/// A page reduced to what selector lookups need.
#[derive(Clone, Debug, Deserialize)]
pub struct PageLayout {
    #[serde(default = "default_viewport")]
    pub viewport: (f64, f64),
    pub elements: Vec<ElementFixture>,
}

fn default_viewport() -> (f64, f64) {
    (1280.0, 800.0)
}

impl PageLayout {
    /// Elements matching `selector`, in document order.
    pub fn matching<'a>(&'a self, selector: &'a str) -> impl Iterator<Item = &'a ElementFixture> {
        self.elements
            .iter()
            .filter(move |e| e.matches.iter().any(|m| m == selector))
    }

    pub fn get(&self, key: &str) -> Option<&ElementFixture> {
        self.elements.iter().find(|e| e.key == key)
    }

    /// True when `ancestor` is a strict ancestor of `key`.
    pub fn is_within(&self, key: &str, ancestor: &str) -> bool {
        let mut cur = self.get(key).and_then(|e| e.parent.as_deref());
        while let Some(parent) = cur {
            if parent == ancestor {
                return true;
            }
            cur = self.get(parent).and_then(|e| e.parent.as_deref());
        }
        false
    }
}

/// One qualification form submission and whether it should pass validation.
#[derive(Clone, Debug, Deserialize)]
pub struct FormCase {
    pub name: String,
    pub fields: HashMap<String, String>,
    pub valid: bool,
}

/// [`ElementResolver`] over an in-memory page. Elements created through
/// `ensure_element` are recorded in `created`.
#[derive(Clone, Debug)]
pub struct FixturePage {
    pub layout: PageLayout,
    pub created: Vec<String>,
}

impl FixturePage {
    pub fn new(layout: PageLayout) -> Self {
        Self {
            layout,
            created: Vec::new(),
        }
    }

    pub fn load(name: &str) -> Result<Self> {
        pages::layout(name).map(Self::new)
    }
}

impl ElementResolver for FixturePage {
    fn query_all(&mut self, selector: &str) -> Vec<ElementKey> {
        self.layout
            .matching(selector)
            .map(|e| ElementKey::new(e.key.as_str()))
            .collect()
    }

    fn query_within(&mut self, parent: &ElementKey, selector: &str) -> Vec<ElementKey> {
        self.layout
            .matching(selector)
            .filter(|e| self.layout.is_within(&e.key, parent.as_str()))
            .map(|e| ElementKey::new(e.key.as_str()))
            .collect()
    }

    fn data(&mut self, key: &ElementKey, name: &str) -> Option<String> {
        self.layout.get(key.as_str())?.data.get(name).cloned()
    }

    fn attribute(&mut self, key: &ElementKey, name: &str) -> Option<String> {
        let el = self.layout.get(key.as_str())?;
        match name.strip_prefix("data-") {
            Some(data) => el.data.get(data).cloned(),
            None => el.attrs.get(name).cloned(),
        }
    }

    fn viewport(&mut self) -> (f64, f64) {
        self.layout.viewport
    }

    fn ensure_element(&mut self, id: &str, _class: &str) -> Option<ElementKey> {
        if self.layout.get(id).is_none() && !self.created.iter().any(|c| c == id) {
            self.created.push(id.to_string());
        }
        Some(ElementKey::new(id))
    }
}

fn fixtures_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../../fixtures")
}

fn resolve_path(rel: &str) -> PathBuf {
    fixtures_root().join(rel)
}

fn read_to_string(rel: &str) -> Result<String> {
    let path = resolve_path(rel);
    fs::read_to_string(&path)
        .with_context(|| format!("failed to read fixture at {}", path.display()))
}

fn load_json<T: DeserializeOwned>(rel: &str) -> Result<T> {
    let text = read_to_string(rel)?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse JSON fixture {rel}"))
}

fn lookup<'a, T>(map: &'a HashMap<String, T>, kind: &str, name: &str) -> Result<&'a T> {
    map.get(name)
        .ok_or_else(|| anyhow!("unknown {kind} fixture '{name}'"))
}

pub mod configs {
    use super::*;

    pub fn keys() -> Vec<String> {
        MANIFEST.configs.keys().cloned().collect()
    }

    pub fn json(name: &str) -> Result<String> {
        let rel = lookup(&MANIFEST.configs, "config", name)?;
        read_to_string(rel)
    }

    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        let rel = lookup(&MANIFEST.configs, "config", name)?;
        super::load_json(rel)
    }
}

pub mod pages {
    use super::*;

    pub fn keys() -> Vec<String> {
        MANIFEST.pages.keys().cloned().collect()
    }

    pub fn layout(name: &str) -> Result<PageLayout> {
        let entry = lookup(&MANIFEST.pages, "page", name)?;
        super::load_json(entry.layout())
    }

    /// Config JSON paired with the page, if the manifest names one.
    pub fn config_json(name: &str) -> Result<Option<String>> {
        let entry = lookup(&MANIFEST.pages, "page", name)?;
        entry.config().map(read_to_string).transpose()
    }

    pub fn path(name: &str) -> Result<PathBuf> {
        let entry = lookup(&MANIFEST.pages, "page", name)?;
        Ok(resolve_path(entry.layout()))
    }
}

pub mod forms {
    use super::*;

    pub fn keys() -> Vec<String> {
        MANIFEST.forms.keys().cloned().collect()
    }

    pub fn cases(name: &str) -> Result<Vec<FormCase>> {
        let rel = lookup(&MANIFEST.forms, "form", name)?;
        super::load_json(rel)
    }
}
