//! Engine: owns every motion component of one page.
//!
//! Lifecycle: `new` -> `bind` (once, through an [`ElementResolver`]) ->
//! `update` per frame -> `teardown`. Writes produced while binding are staged
//! and flushed by the first `update`.

use serde::{Deserialize, Serialize};
use vitrine_api_core::{parse_float, parse_int, ElementKey, ElementResolver, WriteBatch, WriteOp};

use crate::backdrop::{BackdropFrame, BackdropKind, ParticleField};
use crate::carousel::{Carousel, CarouselParts};
use crate::config::{Config, CounterGroup};
use crate::counter::{CounterAnimator, CounterSpec};
use crate::error::MotionError;
use crate::format::CounterFormat;
use crate::ids::{CarouselId, RotatorId, Sequence, WatchId};
use crate::inputs::Inputs;
use crate::outputs::{MotionEvent, Outputs};
use crate::rotator::TextRotator;
use crate::schedule::DelayedWrites;
use crate::scroll::{ParallaxLayer, ScrollReactor};
use crate::watcher::{Trigger, Unobserve, VisibilityWatcher, WatchOptions};

/// What happens to a target when it becomes visible.
#[derive(Clone, Debug, PartialEq)]
pub enum RevealAction {
    AddClasses(Vec<String>),
    Counter {
        spec: CounterSpec,
        marker_class: Option<String>,
    },
    /// Set `property` to `percent%`.
    FillBar { property: String, percent: f64 },
    /// Add `classes` to each child, `step_ms` apart.
    Stagger {
        children: Vec<ElementKey>,
        classes: Vec<String>,
        step_ms: f64,
    },
}

/// One observer the host must create.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WatchBinding {
    pub watch: WatchId,
    pub options: WatchOptions,
    pub keys: Vec<ElementKey>,
}

/// Controls the host must wire to carousel commands.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CarouselBinding {
    pub carousel: CarouselId,
    pub prev: Vec<ElementKey>,
    pub next: Vec<ElementKey>,
    /// Clicking indicator `i` means `Goto(i)`.
    pub indicators: Vec<ElementKey>,
}

/// Result of binding a configuration to a page.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct BindReport {
    pub watches: Vec<WatchBinding>,
    pub carousels: Vec<CarouselBinding>,
    pub backdrop: Option<ElementKey>,
    /// Selectors that matched nothing.
    pub skipped: Vec<String>,
}

/// Returned by [`Engine::teardown`].
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Teardown {
    pub unobserve: Vec<Unobserve>,
    pub cancelled_counters: usize,
    pub dropped_writes: usize,
}

#[derive(Debug)]
pub struct Engine {
    cfg: Config,
    carousel_ids: Sequence<CarouselId>,
    rotator_ids: Sequence<RotatorId>,

    watcher: VisibilityWatcher<RevealAction>,
    counters: CounterAnimator,
    carousels: Vec<(CarouselId, Carousel)>,
    rotators: Vec<(RotatorId, TextRotator)>,
    scroll: ScrollReactor,
    delayed: DelayedWrites,
    backdrop: Option<ParticleField>,

    staged: WriteBatch,
    bound: bool,
    torn_down: bool,

    outputs: Outputs,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl Engine {
    pub fn new(cfg: Config) -> Self {
        Self {
            watcher: VisibilityWatcher::new(cfg.observer),
            cfg,
            carousel_ids: Sequence::default(),
            rotator_ids: Sequence::default(),
            counters: CounterAnimator::new(),
            carousels: Vec::new(),
            rotators: Vec::new(),
            scroll: ScrollReactor::new(),
            delayed: DelayedWrites::new(),
            backdrop: None,
            staged: WriteBatch::new(),
            bound: false,
            torn_down: false,
            outputs: Outputs::default(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Resolve every configured selector and register the matches.
    pub fn bind(&mut self, resolver: &mut dyn ElementResolver) -> Result<BindReport, MotionError> {
        if self.torn_down {
            return Err(MotionError::TornDown);
        }
        if self.bound {
            return Err(MotionError::AlreadyBound);
        }
        self.bound = true;
        let cfg = self.cfg.clone();
        let mut report = BindReport::default();

        for group in &cfg.reveals {
            let keys = resolver.query_all(&group.selector);
            if keys.is_empty() {
                skip(&mut report, &group.selector);
                continue;
            }
            for key in &keys {
                for class in &group.prepare_classes {
                    self.staged.push(WriteOp::add_class(key, class));
                }
            }
            let action = RevealAction::AddClasses(group.classes.clone());
            let targets = keys.into_iter().map(|k| (k, action.clone()));
            report.watches.push(self.watch(targets, group.watch.clone()));
        }

        for group in &cfg.counters {
            let keys = resolver.query_all(&group.selector);
            let targets: Vec<_> = keys
                .into_iter()
                .filter_map(|key| {
                    let spec = counter_spec(resolver, &key, group)?;
                    Some((
                        key,
                        RevealAction::Counter {
                            spec,
                            marker_class: group.marker_class.clone(),
                        },
                    ))
                })
                .collect();
            if targets.is_empty() {
                skip(&mut report, &group.selector);
                continue;
            }
            report.watches.push(self.watch(targets, group.watch.clone()));
        }

        for group in &cfg.bars {
            let targets: Vec<_> = resolver
                .query_all(&group.selector)
                .into_iter()
                .filter_map(|key| {
                    let raw = resolver.data(&key, &group.data)?;
                    let percent = parse_float(&raw)?.min(100.0);
                    Some((
                        key,
                        RevealAction::FillBar {
                            property: group.property.clone(),
                            percent,
                        },
                    ))
                })
                .collect();
            if targets.is_empty() {
                skip(&mut report, &group.selector);
                continue;
            }
            report.watches.push(self.watch(targets, group.watch.clone()));
        }

        for group in &cfg.staggers {
            let targets: Vec<_> = resolver
                .query_all(&group.selector)
                .into_iter()
                .filter_map(|key| {
                    let children = resolver.query_within(&key, &group.children);
                    if children.is_empty() {
                        return None;
                    }
                    Some((
                        key,
                        RevealAction::Stagger {
                            children,
                            classes: group.classes.clone(),
                            step_ms: group.step_ms,
                        },
                    ))
                })
                .collect();
            if targets.is_empty() {
                skip(&mut report, &group.selector);
                continue;
            }
            report.watches.push(self.watch(targets, group.watch.clone()));
        }

        for c in &cfg.carousels {
            let Some(track) = resolver.query_first(&c.track) else {
                skip(&mut report, &c.track);
                continue;
            };
            let slides = resolver.query_within(&track, &c.slides);
            let indicators = c
                .indicators
                .as_deref()
                .map(|s| resolver.query_all(s))
                .unwrap_or_default();
            let parts = CarouselParts {
                track: Some(track),
                slides,
                indicators: indicators.clone(),
                active_class: c.active_class.clone(),
            };
            match self.add_carousel(parts, c.autoplay_ms) {
                Ok(carousel) => report.carousels.push(CarouselBinding {
                    carousel,
                    prev: c.prev.as_deref().map(|s| resolver.query_all(s)).unwrap_or_default(),
                    next: c.next.as_deref().map(|s| resolver.query_all(s)).unwrap_or_default(),
                    indicators,
                }),
                Err(e) => {
                    log::debug!("carousel {} skipped: {e}", c.track);
                    skip(&mut report, &c.slides);
                }
            }
        }

        let scroll = &cfg.scroll;
        if let Some(bar) = &scroll.progress_bar {
            match resolver.ensure_element(&bar.id, &bar.class) {
                Some(key) => self.scroll.set_progress_bar(key),
                None => skip(&mut report, &bar.id),
            }
        }
        if let Some(nav) = &scroll.nav {
            match resolver.query_first(&nav.selector) {
                Some(key) => self.scroll.set_nav(key, nav.clone()),
                None => skip(&mut report, &nav.selector),
            }
        }
        if let Some(cta) = &scroll.cta {
            match resolver.query_first(&cta.selector) {
                Some(key) => self.scroll.set_cta(key, cta),
                None => skip(&mut report, &cta.selector),
            }
        }
        if let Some(bar) = &scroll.mobile_bar {
            match resolver.query_first(&bar.selector) {
                Some(key) => self.scroll.set_mobile_bar(key, bar.clone()),
                None => skip(&mut report, &bar.selector),
            }
        }

        for p in &cfg.parallax {
            let keys = resolver.query_all(&p.selector);
            if keys.is_empty() {
                skip(&mut report, &p.selector);
            }
            for key in keys {
                self.staged.push(WriteOp::add_class(&key, &p.marker_class));
                self.add_parallax(ParallaxLayer {
                    key,
                    speed: p.speed,
                    direction: p.direction,
                });
            }
        }

        for r in &cfg.rotators {
            let Some(key) = resolver.query_first(&r.selector) else {
                skip(&mut report, &r.selector);
                continue;
            };
            if let Err(e) = self.add_rotator(key, r.words.clone(), r.interval_ms) {
                log::debug!("rotator {} skipped: {e}", r.selector);
                skip(&mut report, &r.selector);
            }
        }

        if cfg.backdrop.kind != BackdropKind::None {
            match resolver.query_first(&cfg.backdrop.selector) {
                Some(key) => {
                    let (w, h) = resolver.viewport();
                    self.set_backdrop(w, h);
                    report.backdrop = Some(key);
                }
                None => skip(&mut report, &cfg.backdrop.selector),
            }
        }

        log::debug!(
            "bound {} watches, {} carousels, {} skipped selectors",
            report.watches.len(),
            report.carousels.len(),
            report.skipped.len()
        );
        Ok(report)
    }

    /// Register targets under one observer configuration.
    pub fn watch(
        &mut self,
        targets: impl IntoIterator<Item = (ElementKey, RevealAction)>,
        options: WatchOptions,
    ) -> WatchBinding {
        let watch = self.watcher.register(targets, options.clone());
        WatchBinding {
            watch,
            keys: self.watcher.keys(watch),
            options,
        }
    }

    pub fn add_carousel(
        &mut self,
        parts: CarouselParts,
        autoplay_ms: Option<f64>,
    ) -> Result<CarouselId, MotionError> {
        let carousel = Carousel::new(parts)?.with_autoplay(autoplay_ms);
        carousel.render(&mut self.staged);
        let id = self.carousel_ids.next_id();
        self.carousels.push((id, carousel));
        Ok(id)
    }

    pub fn add_parallax(&mut self, layer: ParallaxLayer) {
        self.scroll.add_layer(layer);
    }

    pub fn add_rotator(
        &mut self,
        key: ElementKey,
        words: Vec<String>,
        interval_ms: f64,
    ) -> Result<RotatorId, MotionError> {
        let rotator = TextRotator::new(key, words, interval_ms)?;
        rotator.start(&mut self.staged);
        let id = self.rotator_ids.next_id();
        self.rotators.push((id, rotator));
        Ok(id)
    }

    /// (Re)create the particle field for a `width x height` surface.
    pub fn set_backdrop(&mut self, width: f64, height: f64) {
        if self.cfg.backdrop.kind == BackdropKind::None {
            return;
        }
        self.backdrop = Some(ParticleField::new(&self.cfg.backdrop, width, height));
    }

    pub fn resize_backdrop(&mut self, width: f64, height: f64) {
        if let Some(field) = self.backdrop.as_mut() {
            field.resize(width, height);
        }
    }

    pub fn backdrop_kind(&self) -> BackdropKind {
        self.cfg.backdrop.kind
    }

    pub fn backdrop_frame(&self) -> Option<BackdropFrame> {
        self.backdrop.as_ref().map(ParticleField::frame)
    }

    pub fn carousel_index(&self, id: CarouselId) -> Option<usize> {
        self.carousels
            .iter()
            .find(|(cid, _)| *cid == id)
            .map(|(_, c)| c.index())
    }

    /// True while anything time-based still needs frames.
    pub fn wants_frame(&self) -> bool {
        !self.torn_down
            && (!self.staged.is_empty()
                || self.counters.is_animating()
                || !self.delayed.is_empty()
                || self.backdrop.is_some()
                || self.carousels.iter().any(|(_, c)| c.has_autoplay())
                || !self.rotators.is_empty())
    }

    /// Step by `dt_ms` and apply `inputs`.
    pub fn update(&mut self, dt_ms: f64, inputs: Inputs) -> &Outputs {
        self.outputs.clear();
        if self.torn_down {
            return &self.outputs;
        }
        let dt_ms = if dt_ms.is_finite() { dt_ms.max(0.0) } else { 0.0 };

        let staged = std::mem::take(&mut self.staged);
        self.outputs.writes.append(staged);

        for cmd in inputs.carousel_cmds {
            let Some((_, carousel)) = self.carousels.iter_mut().find(|(id, _)| *id == cmd.carousel)
            else {
                log::warn!("{}", MotionError::UnknownCarousel(cmd.carousel.0));
                continue;
            };
            let index = carousel.apply(cmd.action);
            carousel.render(&mut self.outputs.writes);
            self.outputs.push_event(MotionEvent::SlideChanged {
                carousel: cmd.carousel,
                index,
                autoplay: false,
            });
        }

        self.delayed.release(dt_ms, &mut self.outputs.writes);

        let outputs = &mut self.outputs;
        self.counters.tick(dt_ms, |key, frame| {
            outputs.writes.push(WriteOp::set_text(key, frame.text.clone()));
            if frame.done {
                outputs.push_event(MotionEvent::CounterFinished {
                    key: key.clone(),
                    text: frame.text,
                });
            }
        });

        self.handle_intersections(&inputs.intersections);

        for (id, carousel) in self.carousels.iter_mut() {
            if carousel.advance(dt_ms) > 0 {
                carousel.render(&mut self.outputs.writes);
                self.outputs.push_event(MotionEvent::SlideChanged {
                    carousel: *id,
                    index: carousel.index(),
                    autoplay: true,
                });
            }
        }

        for (id, rotator) in self.rotators.iter_mut() {
            if let Some(word) = rotator.tick(dt_ms, &mut self.outputs.writes) {
                self.outputs.push_event(MotionEvent::WordRotated { rotator: *id, word });
            }
        }

        if let Some(sample) = inputs.scroll.as_ref() {
            self.scroll
                .react(sample, &mut self.outputs.writes, &mut self.outputs.events);
        }

        if let Some(field) = self.backdrop.as_mut() {
            field.step(dt_ms);
        }

        &self.outputs
    }

    fn handle_intersections(&mut self, entries: &[crate::watcher::IntersectionEntry]) {
        let Self {
            watcher,
            counters,
            delayed,
            outputs,
            ..
        } = self;
        let unobserve = watcher.handle(entries, |t| {
            apply_reveal(&t, counters, delayed, outputs);
        });
        outputs.unobserve.extend(unobserve);
    }

    /// Stop everything. The engine produces no further output afterwards.
    pub fn teardown(&mut self) -> Teardown {
        let out = Teardown {
            unobserve: self.watcher.clear(),
            cancelled_counters: self.counters.cancel_all(),
            dropped_writes: self.delayed.clear() + self.staged.len(),
        };
        self.staged.clear();
        for (_, carousel) in self.carousels.iter_mut() {
            carousel.stop_autoplay();
        }
        self.carousels.clear();
        self.rotators.clear();
        self.scroll.clear();
        self.backdrop = None;
        self.outputs.clear();
        self.torn_down = true;
        log::debug!(
            "engine torn down: {} targets unobserved, {} counters cancelled",
            out.unobserve.len(),
            out.cancelled_counters
        );
        out
    }
}

fn skip(report: &mut BindReport, selector: &str) {
    log::debug!("no element matches {selector}; skipping");
    report.skipped.push(selector.to_string());
}

fn counter_spec(
    resolver: &mut dyn ElementResolver,
    key: &ElementKey,
    group: &CounterGroup,
) -> Option<CounterSpec> {
    let Some(end) = resolver.data(key, "target").as_deref().and_then(parse_int) else {
        log::debug!("counter {key} has no numeric data-target; skipping");
        return None;
    };
    let format = match resolver.data(key, "type") {
        Some(t) => CounterFormat::from_data_type(Some(&t)),
        None => group.default_format,
    };
    let suffix = resolver.data(key, "suffix").unwrap_or_default();
    Some(
        CounterSpec::new(end)
            .with_format(format)
            .with_suffix(suffix)
            .with_easing(group.easing)
            .with_duration(group.duration_ms)
            .with_delay(group.start_delay_ms),
    )
}

fn apply_reveal(
    t: &Trigger<'_, RevealAction>,
    counters: &mut CounterAnimator,
    delayed: &mut DelayedWrites,
    outputs: &mut Outputs,
) {
    let mut write = |delay_ms: f64, op: WriteOp| {
        if delay_ms > 0.0 && !t.immediate {
            delayed.schedule(delay_ms, op);
        } else {
            outputs.writes.push(op);
        }
    };

    match t.action {
        RevealAction::AddClasses(classes) => {
            for class in classes {
                write(t.delay_ms, WriteOp::add_class(t.key, class));
            }
        }
        RevealAction::Counter { spec, marker_class } => {
            if let Some(class) = marker_class {
                write(0.0, WriteOp::add_class(t.key, class));
            }
            if t.immediate {
                if let Some(text) = counters.settle(t.key.clone(), spec) {
                    write(0.0, WriteOp::set_text(t.key, text));
                }
            } else {
                let spec = spec.clone().with_delay(spec.delay_ms + t.delay_ms);
                counters.animate(t.key.clone(), spec);
            }
        }
        RevealAction::FillBar { property, percent } => {
            write(t.delay_ms, WriteOp::set_style(t.key, property, format!("{percent}%")));
        }
        RevealAction::Stagger {
            children,
            classes,
            step_ms,
        } => {
            for (i, child) in children.iter().enumerate() {
                let delay = t.delay_ms + i as f64 * step_ms;
                for class in classes {
                    write(delay, WriteOp::add_class(child, class));
                }
            }
        }
    }
    outputs.push_event(MotionEvent::Revealed {
        key: t.key.clone(),
        immediate: t.immediate,
    });
}
