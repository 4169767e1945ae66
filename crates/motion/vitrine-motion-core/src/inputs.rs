//! Input contracts for the motion engine.
//!
//! Hosts collect observer entries, the latest scroll sample and user carousel
//! commands between frames and pass them to `Engine::update()`.

use serde::{Deserialize, Serialize};

use crate::carousel::CarouselAction;
use crate::ids::CarouselId;
use crate::scroll::ScrollSample;
use crate::watcher::IntersectionEntry;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Inputs {
    #[serde(default)]
    pub intersections: Vec<IntersectionEntry>,
    /// Latest sample since the previous frame; `None` when the page did not scroll.
    #[serde(default)]
    pub scroll: Option<ScrollSample>,
    #[serde(default)]
    pub carousel_cmds: Vec<CarouselCommand>,
}

impl Inputs {
    pub fn is_empty(&self) -> bool {
        self.intersections.is_empty() && self.scroll.is_none() && self.carousel_cmds.is_empty()
    }
}

/// A user-driven carousel transition (arrow click, indicator click).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CarouselCommand {
    pub carousel: CarouselId,
    pub action: CarouselAction,
}
