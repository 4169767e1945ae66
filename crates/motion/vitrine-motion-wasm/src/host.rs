//! Browser runtime: owns the engine, observers, listeners and frame loop.

use std::cell::RefCell;
use std::rc::Rc;

use js_sys::Function;
use serde_wasm_bindgen as swb;
use vitrine_api_wasm::{viewport, DomResolver, ElementTable, Listeners};
use vitrine_motion_core::config::DEFAULT_BACKDROP_SEED;
use vitrine_motion_core::{
    BindReport, CarouselAction, CarouselCommand, CarouselId, Config, ElementKey, Engine,
    FrameThrottle, Inputs, MotionEvent, ObserverSupport, ScrollSample, Teardown,
};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Window};

use crate::backdrop::BackdropRenderer;
use crate::observe::{self, Observers};

/// Longest step fed to the engine; longer gaps (background tabs) are clipped.
const MAX_STEP_MS: f64 = 1000.0;

struct Runtime {
    engine: Engine,
    table: ElementTable,
    observers: Observers,
    throttle: FrameThrottle,
    backdrop: BackdropRenderer,
    last_frame_ms: Option<f64>,
    raf: Option<i32>,
}

type FrameCallback = Closure<dyn FnMut(f64)>;

/// Cheap handle shared by every callback.
///
/// `rt` is never borrowed while JS code runs. Inputs and the event listener
/// live in their own cells so callbacks fired from `on_event` can still queue
/// commands or replace the listener.
#[derive(Clone)]
struct Scheduler {
    rt: Rc<RefCell<Runtime>>,
    pending: Rc<RefCell<Inputs>>,
    on_event: Rc<RefCell<Option<Function>>>,
    frame: Rc<RefCell<Option<FrameCallback>>>,
}

impl Scheduler {
    fn request_frame(&self) {
        let Ok(mut rt) = self.rt.try_borrow_mut() else {
            // Called from inside a frame; the frame re-arms itself.
            return;
        };
        if rt.raf.is_some() {
            return;
        }
        let frame = self.frame.borrow();
        let (Some(win), Some(cb)) = (web_sys::window(), frame.as_ref()) else {
            return;
        };
        match win.request_animation_frame(cb.as_ref().unchecked_ref()) {
            Ok(handle) => rt.raf = Some(handle),
            Err(e) => log::warn!("requestAnimationFrame failed: {e:?}"),
        }
    }

    fn push(&self, f: impl FnOnce(&mut Inputs)) {
        f(&mut *self.pending.borrow_mut());
        self.request_frame();
    }

    fn record_scroll(&self, sample: ScrollSample) {
        let wants = match self.rt.try_borrow_mut() {
            Ok(mut rt) => rt.throttle.record(sample),
            Err(_) => false,
        };
        if wants {
            self.request_frame();
        }
    }

    fn run_frame(&self, now_ms: f64) {
        let events = {
            let Ok(mut guard) = self.rt.try_borrow_mut() else {
                log::warn!("frame fired while the runtime was busy; skipped");
                return;
            };
            let rt = &mut *guard;
            rt.raf = None;
            let dt = match rt.last_frame_ms {
                Some(last) => (now_ms - last).clamp(0.0, MAX_STEP_MS),
                None => 0.0,
            };
            rt.last_frame_ms = Some(now_ms);

            let mut inputs = self.pending.take();
            inputs.scroll = rt.throttle.take();
            let out = rt.engine.update(dt, inputs);
            rt.table.apply(&out.writes);
            rt.observers.unobserve(&out.unobserve, &rt.table);
            let events = out.events.clone();
            if let Some(frame) = rt.engine.backdrop_frame() {
                if let Err(e) = rt.backdrop.draw(&frame) {
                    log::warn!("backdrop draw failed: {e:?}");
                }
            }
            events
        };
        self.dispatch(&events);

        let again = match self.rt.try_borrow() {
            Ok(rt) => rt.engine.wants_frame() || rt.throttle.is_pending(),
            Err(_) => false,
        } || !self.pending.borrow().is_empty();
        if again {
            self.request_frame();
        }
    }

    fn dispatch(&self, events: &[MotionEvent]) {
        if events.is_empty() {
            return;
        }
        // Cloned out so the listener may replace or remove itself.
        let Some(f) = self.on_event.borrow().clone() else {
            return;
        };
        for event in events {
            match swb::to_value(event) {
                Ok(v) => {
                    if let Err(e) = f.call1(&JsValue::UNDEFINED, &v) {
                        log::warn!("event listener threw: {e:?}");
                    }
                }
                Err(e) => log::warn!("event serialization failed: {e}"),
            }
        }
    }
}

fn scroll_sample(win: &Window, doc: &Document) -> ScrollSample {
    let (width, height) = viewport();
    let document_height = doc
        .document_element()
        .map(|el| el.scroll_height() as f64)
        .unwrap_or(height);
    ScrollSample {
        scroll_top: win.page_y_offset().unwrap_or(0.0),
        viewport_height: height,
        document_height,
        viewport_width: width,
    }
}

/// An installed page. Dropping it tears everything down.
pub struct Installed {
    sched: Scheduler,
    listeners: Listeners,
    report: BindReport,
    active: bool,
}

impl Installed {
    pub fn install(mut cfg: Config) -> Result<Self, JsValue> {
        let win = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let doc = win.document().ok_or_else(|| JsValue::from_str("no document"))?;

        if !observe::supported() {
            log::info!("IntersectionObserver unavailable; revealing everything immediately");
            cfg.observer = ObserverSupport::Unavailable;
        }
        if cfg.backdrop.seed == DEFAULT_BACKDROP_SEED {
            cfg.backdrop.seed = (js_sys::Math::random() * u32::MAX as f64) as u64;
        }

        let mut engine = Engine::new(cfg);
        let mut table = ElementTable::new();
        let report = engine
            .bind(&mut DomResolver {
                document: &doc,
                table: &mut table,
            })
            .map_err(|e| JsValue::from_str(&format!("bind error: {e}")))?;

        let backdrop = report
            .backdrop
            .as_ref()
            .and_then(|k| table.get(k))
            .map(|el| BackdropRenderer::for_element(engine.backdrop_kind(), el))
            .unwrap_or(BackdropRenderer::None);

        let sched = Scheduler {
            rt: Rc::new(RefCell::new(Runtime {
                engine,
                table,
                observers: Observers::new(),
                throttle: FrameThrottle::new(),
                backdrop,
                last_frame_ms: None,
                raf: None,
            })),
            pending: Rc::new(RefCell::new(Inputs::default())),
            on_event: Rc::new(RefCell::new(None)),
            frame: Rc::new(RefCell::new(None)),
        };

        {
            let s = sched.clone();
            *sched.frame.borrow_mut() = Some(FrameCallback::new(move |ts: f64| s.run_frame(ts)));
        }
        // From here on an early return drops `this`, which tears down.
        let mut this = Self {
            sched,
            listeners: Listeners::new(),
            report,
            active: true,
        };

        {
            let mut rt = this.sched.rt.borrow_mut();
            let rt = &mut *rt;
            for binding in &this.report.watches {
                let s = this.sched.clone();
                rt.observers.observe(binding, &rt.table, move |entries| {
                    s.push(|inputs| inputs.intersections.extend(entries));
                })?;
            }
        }

        {
            let s = this.sched.clone();
            let (w, d) = (win.clone(), doc.clone());
            this.listeners
                .add(&win, "scroll", move |_| s.record_scroll(scroll_sample(&w, &d)))?;
        }
        {
            let s = this.sched.clone();
            let (w, d) = (win.clone(), doc.clone());
            this.listeners.add(&win, "resize", move |_| {
                let (vw, vh) = viewport();
                if let Ok(mut rt) = s.rt.try_borrow_mut() {
                    rt.engine.resize_backdrop(vw, vh);
                }
                s.record_scroll(scroll_sample(&w, &d));
            })?;
        }

        for c in &this.report.carousels {
            let rt = this.sched.rt.borrow();
            let sched = &this.sched;
            let listeners = &mut this.listeners;
            let mut wire = |key: &ElementKey, action: CarouselAction| -> Result<(), JsValue> {
                let Some(el) = rt.table.get(key) else {
                    return Ok(());
                };
                let s = sched.clone();
                let carousel: CarouselId = c.carousel;
                listeners.add(el, "click", move |_| {
                    s.push(|inputs| inputs.carousel_cmds.push(CarouselCommand { carousel, action }));
                })
            };
            for key in &c.prev {
                wire(key, CarouselAction::Prev)?;
            }
            for key in &c.next {
                wire(key, CarouselAction::Next)?;
            }
            for (i, key) in c.indicators.iter().enumerate() {
                wire(key, CarouselAction::Goto(i))?;
            }
        }

        // Initial state: staged writes plus the current scroll position.
        this.sched.record_scroll(scroll_sample(&win, &doc));
        this.sched.request_frame();

        log::debug!(
            "installed: {} observers, {} listeners",
            this.sched.rt.borrow().observers.len(),
            this.listeners.len()
        );
        Ok(this)
    }

    pub fn report(&self) -> &BindReport {
        &self.report
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn set_event_listener(&self, f: Option<Function>) {
        *self.sched.on_event.borrow_mut() = f;
    }

    pub fn teardown(&mut self) -> Option<Teardown> {
        if !self.active {
            return None;
        }
        let Ok(mut rt) = self.sched.rt.try_borrow_mut() else {
            log::warn!("teardown requested from inside a frame; ignored");
            return None;
        };
        self.active = false;
        self.listeners.clear();
        if let (Some(win), Some(handle)) = (web_sys::window(), rt.raf.take()) {
            let _ = win.cancel_animation_frame(handle);
        }
        let torn = rt.engine.teardown();
        rt.observers.disconnect_all();
        rt.backdrop.clear();
        rt.table.clear();
        drop(rt);
        *self.sched.on_event.borrow_mut() = None;
        *self.sched.pending.borrow_mut() = Inputs::default();
        // Breaks the frame closure's reference cycle.
        *self.sched.frame.borrow_mut() = None;
        Some(torn)
    }
}

impl Drop for Installed {
    fn drop(&mut self) {
        self.teardown();
    }
}
