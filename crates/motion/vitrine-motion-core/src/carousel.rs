//! Carousel state machine: a wrapping index over a fixed slide set.

use serde::{Deserialize, Serialize};
use vitrine_api_core::{ElementKey, WriteBatch, WriteOp};

use crate::error::MotionError;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "index", rename_all = "snake_case")]
pub enum CarouselAction {
    Next,
    Prev,
    Goto(usize),
}

/// Elements a carousel renders into. Only `slides` is required.
#[derive(Clone, Debug, Default)]
pub struct CarouselParts {
    pub track: Option<ElementKey>,
    pub slides: Vec<ElementKey>,
    pub indicators: Vec<ElementKey>,
    pub active_class: String,
}

/// Fixed-interval timer. Manual navigation does not touch it.
#[derive(Clone, Debug)]
struct Autoplay {
    interval_ms: f64,
    elapsed_ms: f64,
}

#[derive(Debug)]
pub struct Carousel {
    parts: CarouselParts,
    index: usize,
    autoplay: Option<Autoplay>,
}

impl Carousel {
    pub fn new(parts: CarouselParts) -> Result<Self, MotionError> {
        if parts.slides.is_empty() {
            return Err(MotionError::EmptyCarousel);
        }
        Ok(Self {
            parts,
            index: 0,
            autoplay: None,
        })
    }

    /// Enable autoplay. Non-positive intervals disable it.
    pub fn with_autoplay(mut self, interval_ms: Option<f64>) -> Self {
        self.autoplay = interval_ms
            .filter(|ms| *ms > 0.0)
            .map(|interval_ms| Autoplay {
                interval_ms,
                elapsed_ms: 0.0,
            });
        self
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.parts.slides.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.parts.slides.is_empty()
    }

    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current_slide(&self) -> &ElementKey {
        &self.parts.slides[self.index]
    }

    pub fn has_autoplay(&self) -> bool {
        self.autoplay.is_some()
    }

    pub fn next(&mut self) -> usize {
        self.index = (self.index + 1) % self.len();
        self.index
    }

    pub fn prev(&mut self) -> usize {
        let n = self.len();
        self.index = (self.index + n - 1) % n;
        self.index
    }

    pub fn goto(&mut self, k: usize) -> usize {
        self.index = k % self.len();
        self.index
    }

    pub fn apply(&mut self, action: CarouselAction) -> usize {
        match action {
            CarouselAction::Next => self.next(),
            CarouselAction::Prev => self.prev(),
            CarouselAction::Goto(k) => self.goto(k),
        }
    }

    /// Advance the autoplay timer. Returns how many automatic `next` steps fired.
    pub fn advance(&mut self, dt_ms: f64) -> u32 {
        let Some(auto) = self.autoplay.as_mut() else {
            return 0;
        };
        auto.elapsed_ms += dt_ms.max(0.0);
        let fires = (auto.elapsed_ms / auto.interval_ms).floor();
        if fires < 1.0 {
            return 0;
        }
        auto.elapsed_ms -= fires * auto.interval_ms;
        let n = self.len();
        self.index = (self.index + (fires as usize % n)) % n;
        fires as u32
    }

    pub fn stop_autoplay(&mut self) -> bool {
        self.autoplay.take().is_some()
    }

    /// Track transform plus exactly one active indicator.
    pub fn render(&self, batch: &mut WriteBatch) {
        if let Some(track) = &self.parts.track {
            batch.push(WriteOp::set_style(
                track,
                "transform",
                format!("translateX({}%)", -(self.index as i64) * 100),
            ));
        }
        for (i, indicator) in self.parts.indicators.iter().enumerate() {
            batch.push(WriteOp::set_class(
                indicator,
                &self.parts.active_class,
                i == self.index,
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vitrine_api_core::DomWrite;

    fn parts(n: usize) -> CarouselParts {
        CarouselParts {
            track: Some(ElementKey::new("track")),
            slides: (0..n).map(|i| ElementKey::new(format!("s{i}"))).collect(),
            indicators: (0..n).map(|i| ElementKey::new(format!("i{i}"))).collect(),
            active_class: "indicator-active".into(),
        }
    }

    #[test]
    fn empty_is_rejected() {
        assert_eq!(
            Carousel::new(CarouselParts::default()).unwrap_err(),
            MotionError::EmptyCarousel
        );
    }

    #[test]
    fn render_moves_track_and_one_indicator() {
        let mut c = Carousel::new(parts(3)).unwrap();
        c.goto(2);
        let mut batch = WriteBatch::new();
        c.render(&mut batch);
        let key = ElementKey::new("track");
        let track: Vec<_> = batch.for_target(&key).collect();
        assert_eq!(
            track,
            vec![&DomWrite::SetStyle {
                property: "transform".into(),
                value: "translateX(-200%)".into()
            }]
        );
        let active: Vec<_> = batch
            .iter()
            .filter(|op| matches!(op.write, DomWrite::SetClass { on: true, .. }))
            .map(|op| op.target.as_str())
            .collect();
        assert_eq!(active, vec!["i2"]);
    }

    #[test]
    fn autoplay_catches_up_after_long_gaps() {
        let mut c = Carousel::new(parts(3)).unwrap().with_autoplay(Some(6000.0));
        assert_eq!(c.advance(5999.0), 0);
        assert_eq!(c.advance(1.0), 1);
        assert_eq!(c.index(), 1);
        assert_eq!(c.advance(6000.0 * 4.0), 4);
        assert_eq!(c.index(), 2);
    }
}
