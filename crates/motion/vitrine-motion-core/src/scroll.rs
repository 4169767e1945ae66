//! Scroll position reactor: frame throttle, progress, parallax, and the
//! scroll-driven visibility of the navigation bar, floating CTA and mobile bar.

use serde::{Deserialize, Serialize};
use vitrine_api_core::{ElementKey, WriteBatch, WriteOp};

use crate::config::{CtaCfg, MobileBarCfg, NavCfg};
use crate::outputs::MotionEvent;

/// Scroll geometry read once per frame.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ScrollSample {
    pub scroll_top: f64,
    pub viewport_height: f64,
    pub document_height: f64,
    #[serde(default)]
    pub viewport_width: f64,
}

impl ScrollSample {
    /// Percentage of the scrollable distance covered, clamped to [0, 100].
    /// A page that cannot scroll reports 0.
    pub fn progress_percent(&self) -> f64 {
        let scrollable = self.document_height - self.viewport_height;
        if scrollable <= 0.0 || !scrollable.is_finite() {
            return 0.0;
        }
        (self.scroll_top / scrollable * 100.0).clamp(0.0, 100.0)
    }
}

/// Coalesces scroll events into at most one update per rendered frame.
///
/// `record` keeps only the newest sample; the frame consumes it with `take`,
/// so the final position of a burst is never dropped.
#[derive(Debug, Default)]
pub struct FrameThrottle {
    pending: bool,
    latest: Option<ScrollSample>,
}

impl FrameThrottle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a sample. Returns true when the caller must request a frame.
    pub fn record(&mut self, sample: ScrollSample) -> bool {
        self.latest = Some(sample);
        if self.pending {
            return false;
        }
        self.pending = true;
        true
    }

    /// Called from the frame callback.
    pub fn take(&mut self) -> Option<ScrollSample> {
        self.pending = false;
        self.latest.take()
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Moves against the scroll (negative offset).
    #[default]
    Up,
    Down,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ParallaxLayer {
    pub key: ElementKey,
    pub speed: f64,
    pub direction: Direction,
}

impl ParallaxLayer {
    pub fn offset(&self, scroll_top: f64) -> f64 {
        let y = scroll_top * self.speed;
        match self.direction {
            Direction::Up => -y,
            Direction::Down => y,
        }
    }

    pub fn transform(&self, scroll_top: f64) -> String {
        format!("translateY({}px)", self.offset(scroll_top))
    }
}

/// Navigation bar flags derived from scroll position and direction.
#[derive(Debug)]
pub struct NavBar {
    cfg: NavCfg,
    last_top: f64,
    scrolled: Option<bool>,
    hidden: Option<bool>,
}

impl NavBar {
    pub fn new(cfg: NavCfg) -> Self {
        Self {
            cfg,
            last_top: 0.0,
            scrolled: None,
            hidden: None,
        }
    }

    /// Returns `(scrolled, hidden)` for this position.
    pub fn update(&mut self, scroll_top: f64) -> (bool, bool) {
        let scrolled = scroll_top > self.cfg.scrolled_after_px;
        let hidden = scroll_top > self.last_top && scroll_top > self.cfg.hide_after_px;
        self.last_top = scroll_top.max(0.0);
        (scrolled, hidden)
    }

    fn react(&mut self, key: &ElementKey, scroll_top: f64, batch: &mut WriteBatch, events: &mut Vec<MotionEvent>) {
        let (scrolled, hidden) = self.update(scroll_top);
        if self.scrolled != Some(scrolled) {
            self.scrolled = Some(scrolled);
            batch.push(WriteOp::set_class(key, &self.cfg.scrolled_class, scrolled));
        }
        if self.hidden != Some(hidden) {
            self.hidden = Some(hidden);
            batch.push(WriteOp::set_class(key, &self.cfg.hidden_class, hidden));
            events.push(MotionEvent::NavHidden { hidden });
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CtaState {
    #[default]
    Hidden,
    Visible,
}

/// Floating call-to-action: Hidden -> Visible inside the show band,
/// Visible -> Hidden near the bottom or while overridden.
#[derive(Debug)]
pub struct FloatingCta {
    show_at_pct: f64,
    hide_at_pct: f64,
    state: CtaState,
}

impl FloatingCta {
    pub fn new(show_at_pct: f64, hide_at_pct: f64) -> Self {
        Self {
            show_at_pct,
            hide_at_pct,
            state: CtaState::Hidden,
        }
    }

    pub fn state(&self) -> CtaState {
        self.state
    }

    /// Feed the current progress. Returns the new state on a transition.
    pub fn update(&mut self, progress_pct: f64, overridden: bool) -> Option<CtaState> {
        let next = match self.state {
            CtaState::Hidden
                if !overridden
                    && progress_pct >= self.show_at_pct
                    && progress_pct < self.hide_at_pct =>
            {
                CtaState::Visible
            }
            CtaState::Visible if overridden || progress_pct >= self.hide_at_pct => {
                CtaState::Hidden
            }
            current => current,
        };
        if next == self.state {
            return None;
        }
        self.state = next;
        Some(next)
    }
}

/// Mobile bottom bar shown between the hero and the footer on narrow screens.
#[derive(Debug)]
pub struct MobileBar {
    cfg: MobileBarCfg,
    visible: Option<bool>,
}

impl MobileBar {
    pub fn new(cfg: MobileBarCfg) -> Self {
        Self { cfg, visible: None }
    }

    pub fn should_show(&self, s: &ScrollSample) -> bool {
        s.viewport_width <= self.cfg.max_viewport_width
            && s.scroll_top > s.viewport_height * self.cfg.show_after_viewport_fraction
            && s.scroll_top < s.document_height - s.viewport_height - self.cfg.bottom_margin_px
    }

    pub fn is_visible(&self) -> bool {
        self.visible.unwrap_or(false)
    }
}

/// Everything derived from one scroll sample.
#[derive(Debug, Default)]
pub struct ScrollReactor {
    progress_bar: Option<ElementKey>,
    last_progress: Option<f64>,
    layers: Vec<ParallaxLayer>,
    nav: Option<(ElementKey, NavBar)>,
    cta: Option<(ElementKey, String, FloatingCta)>,
    mobile: Option<(ElementKey, MobileBar)>,
}

impl ScrollReactor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_progress_bar(&mut self, key: ElementKey) {
        self.progress_bar = Some(key);
    }

    pub fn add_layer(&mut self, layer: ParallaxLayer) {
        self.layers.push(layer);
    }

    pub fn layers(&self) -> &[ParallaxLayer] {
        &self.layers
    }

    pub fn set_nav(&mut self, key: ElementKey, cfg: NavCfg) {
        self.nav = Some((key, NavBar::new(cfg)));
    }

    pub fn set_cta(&mut self, key: ElementKey, cfg: &CtaCfg) {
        self.cta = Some((
            key,
            cfg.visible_class.clone(),
            FloatingCta::new(cfg.show_at_pct, cfg.hide_at_pct),
        ));
    }

    pub fn set_mobile_bar(&mut self, key: ElementKey, cfg: MobileBarCfg) {
        self.mobile = Some((key, MobileBar::new(cfg)));
    }

    pub fn cta_state(&self) -> Option<CtaState> {
        self.cta.as_ref().map(|(_, _, cta)| cta.state())
    }

    pub fn is_empty(&self) -> bool {
        self.progress_bar.is_none()
            && self.layers.is_empty()
            && self.nav.is_none()
            && self.cta.is_none()
            && self.mobile.is_none()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn react(&mut self, s: &ScrollSample, batch: &mut WriteBatch, events: &mut Vec<MotionEvent>) {
        let progress = s.progress_percent();

        if let Some(bar) = &self.progress_bar {
            if self.last_progress != Some(progress) {
                self.last_progress = Some(progress);
                batch.push(WriteOp::set_style(bar, "width", format!("{progress}%")));
            }
        }

        for layer in &self.layers {
            batch.push(WriteOp::set_style(
                &layer.key,
                "transform",
                layer.transform(s.scroll_top),
            ));
        }

        if let Some((key, nav)) = self.nav.as_mut() {
            nav.react(key, s.scroll_top, batch, events);
        }

        let mut overridden = false;
        if let Some((key, bar)) = self.mobile.as_mut() {
            let show = bar.should_show(s);
            if bar.visible != Some(show) {
                bar.visible = Some(show);
                batch.push(WriteOp::set_class(key, &bar.cfg.visible_class, show));
            }
            overridden = show;
        }

        if let Some((key, class, cta)) = self.cta.as_mut() {
            if let Some(state) = cta.update(progress, overridden) {
                let visible = state == CtaState::Visible;
                batch.push(WriteOp::set_class(key, class, visible));
                events.push(MotionEvent::CtaVisibility { visible });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(top: f64) -> ScrollSample {
        ScrollSample {
            scroll_top: top,
            viewport_height: 800.0,
            document_height: 4800.0,
            viewport_width: 1280.0,
        }
    }

    #[test]
    fn progress_is_clamped() {
        assert_eq!(sample(0.0).progress_percent(), 0.0);
        assert_eq!(sample(4800.0).progress_percent(), 100.0);
        assert_eq!(sample(-50.0).progress_percent(), 0.0);
        assert_eq!(sample(2000.0).progress_percent(), 50.0);
        let flat = ScrollSample {
            scroll_top: 10.0,
            viewport_height: 900.0,
            document_height: 900.0,
            viewport_width: 0.0,
        };
        assert_eq!(flat.progress_percent(), 0.0);
    }

    #[test]
    fn throttle_requests_one_frame_per_burst() {
        let mut t = FrameThrottle::new();
        assert!(t.record(sample(10.0)));
        assert!(!t.record(sample(20.0)));
        assert!(!t.record(sample(30.0)));
        assert_eq!(t.take().map(|s| s.scroll_top), Some(30.0));
        assert!(t.take().is_none());
        assert!(t.record(sample(40.0)));
    }

    #[test]
    fn parallax_direction_sets_sign() {
        let up = ParallaxLayer {
            key: ElementKey::new("card"),
            speed: 0.1,
            direction: Direction::Up,
        };
        let down = ParallaxLayer {
            direction: Direction::Down,
            ..up.clone()
        };
        assert_eq!(up.offset(500.0), -50.0);
        assert_eq!(down.offset(500.0), 50.0);
        assert_eq!(down.transform(500.0), "translateY(50px)");
    }

    #[test]
    fn nav_hides_on_downward_scroll_past_threshold() {
        let mut nav = NavBar::new(NavCfg::default());
        assert_eq!(nav.update(40.0), (false, false));
        assert_eq!(nav.update(90.0), (true, false));
        assert_eq!(nav.update(150.0), (true, true));
        assert_eq!(nav.update(140.0), (true, false));
    }
}
