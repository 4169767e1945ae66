//! Vitrine Motion Core (host-agnostic)
//!
//! Scroll-driven page motion: a visibility watcher that triggers reveals and
//! counters, a carousel state machine, a scroll reactor for progress,
//! parallax and sticky call-to-action state, a text rotator and a particle
//! backdrop. [`Engine`] composes them for one page; hosts feed it [`Inputs`]
//! each frame and apply the [`Outputs`] it returns.

pub mod backdrop;
pub mod carousel;
pub mod config;
pub mod counter;
pub mod easing;
pub mod engine;
pub mod error;
pub mod format;
pub mod ids;
pub mod inputs;
pub mod outputs;
pub mod rotator;
pub mod schedule;
pub mod scroll;
pub mod watcher;

// Re-exports for hosts
pub use backdrop::{BackdropFrame, BackdropKind, Link, Particle, ParticleField};
pub use carousel::{Carousel, CarouselAction, CarouselParts};
pub use config::{
    BackdropCfg, BarGroup, CarouselCfg, Config, CounterGroup, CtaCfg, MobileBarCfg, NavCfg,
    ParallaxCfg, ProgressBarCfg, RevealGroup, RotatorCfg, ScrollCfg, StaggerGroup,
};
pub use counter::{CounterAnimator, CounterFrame, CounterSpec};
pub use easing::Easing;
pub use engine::{BindReport, CarouselBinding, Engine, RevealAction, Teardown, WatchBinding};
pub use error::MotionError;
pub use format::{format_counter, CounterFormat};
pub use ids::{CarouselId, RotatorId, WatchId};
pub use inputs::{CarouselCommand, Inputs};
pub use outputs::{MotionEvent, Outputs};
pub use rotator::TextRotator;
pub use schedule::DelayedWrites;
pub use scroll::{CtaState, Direction, FloatingCta, FrameThrottle, NavBar, ParallaxLayer, ScrollSample};
pub use vitrine_api_core::{DomWrite, ElementKey, ElementResolver, WriteBatch, WriteOp};
pub use watcher::{
    IntersectionEntry, ObserverSupport, Trigger, Unobserve, VisibilityWatcher, WatchOptions,
};
