//! Output contracts from the motion engine.
//!
//! `writes` are DOM mutations for this tick in application order, `unobserve`
//! lists targets the host should stop observing, and `events` carries
//! semantic signals for analytics or debugging.

use serde::{Deserialize, Serialize};
use vitrine_api_core::{ElementKey, WriteBatch};

use crate::ids::{CarouselId, RotatorId};
use crate::watcher::Unobserve;

/// Discrete semantic signals emitted during a tick.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
#[non_exhaustive]
pub enum MotionEvent {
    Revealed {
        key: ElementKey,
        immediate: bool,
    },
    CounterFinished {
        key: ElementKey,
        text: String,
    },
    SlideChanged {
        carousel: CarouselId,
        index: usize,
        autoplay: bool,
    },
    CtaVisibility {
        visible: bool,
    },
    NavHidden {
        hidden: bool,
    },
    WordRotated {
        rotator: RotatorId,
        word: String,
    },
}

/// Outputs returned by `Engine::update()`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Outputs {
    #[serde(default)]
    pub writes: WriteBatch,
    #[serde(default)]
    pub unobserve: Vec<Unobserve>,
    #[serde(default)]
    pub events: Vec<MotionEvent>,
}

impl Outputs {
    #[inline]
    pub fn clear(&mut self) {
        self.writes.clear();
        self.unobserve.clear();
        self.events.clear();
    }

    #[inline]
    pub fn push_event(&mut self, event: MotionEvent) {
        self.events.push(event);
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.writes.is_empty() && self.unobserve.is_empty() && self.events.is_empty()
    }
}
