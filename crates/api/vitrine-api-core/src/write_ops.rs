//! Write operations produced by the cores to describe DOM mutations.
//!
//! WriteOp serializes to JSON as:
//!   { "target": "cta", "op": "add_class", "class": "visible" }
//!   { "target": "track-0", "op": "set_style", "property": "transform", "value": "translateX(-100%)" }
//!
//! WriteBatch is a simple Vec<WriteOp> with helpers. Hosts apply ops in order.

use crate::ElementKey;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One mutation on one element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DomWrite {
    AddClass { class: String },
    RemoveClass { class: String },
    /// Add when `on`, remove otherwise (`classList.toggle(class, on)`).
    SetClass { class: String, on: bool },
    SetStyle { property: String, value: String },
    RemoveStyle { property: String },
    SetText { text: String },
    SetAttribute { name: String, value: String },
    RemoveAttribute { name: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WriteOp {
    pub target: ElementKey,
    #[serde(flatten)]
    pub write: DomWrite,
}

impl WriteOp {
    pub fn new(target: ElementKey, write: DomWrite) -> Self {
        Self { target, write }
    }

    pub fn add_class(target: &ElementKey, class: &str) -> Self {
        Self::new(
            target.clone(),
            DomWrite::AddClass {
                class: class.to_string(),
            },
        )
    }

    pub fn remove_class(target: &ElementKey, class: &str) -> Self {
        Self::new(
            target.clone(),
            DomWrite::RemoveClass {
                class: class.to_string(),
            },
        )
    }

    pub fn set_class(target: &ElementKey, class: &str, on: bool) -> Self {
        Self::new(
            target.clone(),
            DomWrite::SetClass {
                class: class.to_string(),
                on,
            },
        )
    }

    pub fn set_style(target: &ElementKey, property: &str, value: impl Into<String>) -> Self {
        Self::new(
            target.clone(),
            DomWrite::SetStyle {
                property: property.to_string(),
                value: value.into(),
            },
        )
    }

    pub fn remove_style(target: &ElementKey, property: &str) -> Self {
        Self::new(
            target.clone(),
            DomWrite::RemoveStyle {
                property: property.to_string(),
            },
        )
    }

    pub fn set_text(target: &ElementKey, text: impl Into<String>) -> Self {
        Self::new(target.clone(), DomWrite::SetText { text: text.into() })
    }

    pub fn set_attribute(target: &ElementKey, name: &str, value: impl Into<String>) -> Self {
        Self::new(
            target.clone(),
            DomWrite::SetAttribute {
                name: name.to_string(),
                value: value.into(),
            },
        )
    }

    pub fn remove_attribute(target: &ElementKey, name: &str) -> Self {
        Self::new(
            target.clone(),
            DomWrite::RemoveAttribute {
                name: name.to_string(),
            },
        )
    }
}

/// A batch of write operations. Cores emit one WriteBatch per tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WriteBatch(pub Vec<WriteOp>);

impl WriteBatch {
    pub fn new() -> Self {
        WriteBatch(Vec::new())
    }

    pub fn push(&mut self, op: WriteOp) {
        self.0.push(op);
    }

    pub fn extend(&mut self, other: impl IntoIterator<Item = WriteOp>) {
        self.0.extend(other);
    }

    pub fn into_vec(self) -> Vec<WriteOp> {
        self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &WriteOp> {
        self.0.iter()
    }

    /// Ops addressed to one element, in application order. The writes
    /// borrow the batch only, not `target`.
    pub fn for_target<'a>(&'a self, target: &ElementKey) -> impl Iterator<Item = &'a DomWrite> + 'a {
        let target = target.clone();
        self.0
            .iter()
            .filter(move |op| op.target == target)
            .map(|op| &op.write)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Merge another batch in-place (append).
    pub fn append(&mut self, mut other: WriteBatch) {
        self.0.append(&mut other.0)
    }
}

impl fmt::Display for WriteOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.write {
            DomWrite::AddClass { class } => write!(f, "{} +.{}", self.target, class),
            DomWrite::RemoveClass { class } => write!(f, "{} -.{}", self.target, class),
            DomWrite::SetClass { class, on } => {
                write!(f, "{} {}.{}", self.target, if *on { '+' } else { '-' }, class)
            }
            DomWrite::SetStyle { property, value } => {
                write!(f, "{} style.{}={}", self.target, property, value)
            }
            DomWrite::RemoveStyle { property } => write!(f, "{} style.{}=''", self.target, property),
            DomWrite::SetText { text } => write!(f, "{} text={:?}", self.target, text),
            DomWrite::SetAttribute { name, value } => {
                write!(f, "{} [{}={:?}]", self.target, name, value)
            }
            DomWrite::RemoveAttribute { name } => write!(f, "{} [-{}]", self.target, name),
        }
    }
}
