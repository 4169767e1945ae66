//! Page configuration for the motion engine.
//!
//! Selectors are opaque to the core; hosts resolve them through
//! [`ElementResolver`](vitrine_api_core::ElementResolver). `Default` reproduces the
//! marketing site's own markup, and every field is `#[serde(default)]` so a
//! partial JSON object only overrides what it names.

use serde::{Deserialize, Serialize};

use crate::backdrop::BackdropKind;
use crate::easing::Easing;
use crate::error::MotionError;
use crate::format::CounterFormat;
use crate::scroll::Direction;
use crate::watcher::{ObserverSupport, WatchOptions};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Hosts overwrite this after probing for an intersection observer.
    pub observer: ObserverSupport,
    pub reveals: Vec<RevealGroup>,
    pub counters: Vec<CounterGroup>,
    pub bars: Vec<BarGroup>,
    pub staggers: Vec<StaggerGroup>,
    pub carousels: Vec<CarouselCfg>,
    pub scroll: ScrollCfg,
    pub parallax: Vec<ParallaxCfg>,
    pub rotators: Vec<RotatorCfg>,
    pub backdrop: BackdropCfg,
}

impl Config {
    pub fn from_json_str(s: &str) -> Result<Self, MotionError> {
        serde_json::from_str(s).map_err(|e| MotionError::Config(e.to_string()))
    }

    /// A config that binds nothing; useful as a base for hand-built pages.
    pub fn empty() -> Self {
        Self {
            observer: ObserverSupport::Available,
            reveals: Vec::new(),
            counters: Vec::new(),
            bars: Vec::new(),
            staggers: Vec::new(),
            carousels: Vec::new(),
            scroll: ScrollCfg {
                progress_bar: None,
                nav: None,
                cta: None,
                mobile_bar: None,
            },
            parallax: Vec::new(),
            rotators: Vec::new(),
            backdrop: BackdropCfg {
                kind: BackdropKind::None,
                ..BackdropCfg::default()
            },
        }
    }
}

/// Class-toggle reveal.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RevealGroup {
    pub selector: String,
    /// Added at registration so the hidden starting state applies.
    #[serde(default)]
    pub prepare_classes: Vec<String>,
    pub classes: Vec<String>,
    #[serde(default)]
    pub watch: WatchOptions,
}

/// Elements carrying `data-target` (and optionally `data-type`, `data-suffix`).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CounterGroup {
    pub selector: String,
    #[serde(default = "default_counter_watch")]
    pub watch: WatchOptions,
    #[serde(default = "default_counter_duration")]
    pub duration_ms: f64,
    #[serde(default)]
    pub easing: Easing,
    #[serde(default)]
    pub start_delay_ms: f64,
    /// Used when `data-type` is absent.
    #[serde(default)]
    pub default_format: CounterFormat,
    /// Class added when the counter starts.
    #[serde(default)]
    pub marker_class: Option<String>,
}

fn default_counter_watch() -> WatchOptions {
    WatchOptions {
        threshold: 0.5,
        root_margin: "0px".to_string(),
        one_shot: true,
        stagger_ms: 0.0,
    }
}

fn default_counter_duration() -> f64 {
    2000.0
}

/// Bars whose `data-*` value becomes a percentage style on reveal.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BarGroup {
    pub selector: String,
    /// Data attribute name without the `data-` prefix.
    pub data: String,
    /// Style property receiving `min(value, 100)%`.
    pub property: String,
    #[serde(default)]
    pub watch: WatchOptions,
}

/// Sections whose children receive classes one after another.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StaggerGroup {
    pub selector: String,
    pub children: String,
    pub classes: Vec<String>,
    pub step_ms: f64,
    #[serde(default)]
    pub watch: WatchOptions,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CarouselCfg {
    pub track: String,
    pub slides: String,
    #[serde(default)]
    pub indicators: Option<String>,
    #[serde(default)]
    pub prev: Option<String>,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default = "default_active_class")]
    pub active_class: String,
    #[serde(default)]
    pub autoplay_ms: Option<f64>,
}

fn default_active_class() -> String {
    "indicator-active".to_string()
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollCfg {
    pub progress_bar: Option<ProgressBarCfg>,
    pub nav: Option<NavCfg>,
    pub cta: Option<CtaCfg>,
    pub mobile_bar: Option<MobileBarCfg>,
}

impl Default for ScrollCfg {
    fn default() -> Self {
        Self {
            progress_bar: Some(ProgressBarCfg::default()),
            nav: Some(NavCfg::default()),
            cta: Some(CtaCfg::default()),
            mobile_bar: Some(MobileBarCfg::default()),
        }
    }
}

/// Progress bar element, created by the host when missing.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressBarCfg {
    pub id: String,
    pub class: String,
}

impl Default for ProgressBarCfg {
    fn default() -> Self {
        Self {
            id: "scrollProgress".to_string(),
            class: "scroll-progress".to_string(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct NavCfg {
    pub selector: String,
    pub scrolled_class: String,
    pub scrolled_after_px: f64,
    pub hidden_class: String,
    pub hide_after_px: f64,
}

impl Default for NavCfg {
    fn default() -> Self {
        Self {
            selector: "#mainNav".to_string(),
            scrolled_class: "scrolled".to_string(),
            scrolled_after_px: 50.0,
            hidden_class: "nav-hidden".to_string(),
            hide_after_px: 100.0,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct CtaCfg {
    pub selector: String,
    pub visible_class: String,
    pub show_at_pct: f64,
    pub hide_at_pct: f64,
}

impl Default for CtaCfg {
    fn default() -> Self {
        Self {
            selector: "#floatingCta".to_string(),
            visible_class: "visible".to_string(),
            show_at_pct: 30.0,
            hide_at_pct: 90.0,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct MobileBarCfg {
    pub selector: String,
    pub visible_class: String,
    pub max_viewport_width: f64,
    pub show_after_viewport_fraction: f64,
    pub bottom_margin_px: f64,
}

impl Default for MobileBarCfg {
    fn default() -> Self {
        Self {
            selector: ".mobile-bottom-cta".to_string(),
            visible_class: "visible".to_string(),
            max_viewport_width: 768.0,
            show_after_viewport_fraction: 0.5,
            bottom_margin_px: 100.0,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ParallaxCfg {
    pub selector: String,
    pub speed: f64,
    #[serde(default)]
    pub direction: Direction,
    #[serde(default = "default_parallax_class")]
    pub marker_class: String,
}

fn default_parallax_class() -> String {
    "parallax-element".to_string()
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RotatorCfg {
    pub selector: String,
    pub words: Vec<String>,
    #[serde(default = "default_rotator_interval")]
    pub interval_ms: f64,
}

fn default_rotator_interval() -> f64 {
    2000.0
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct BackdropCfg {
    pub kind: BackdropKind,
    pub selector: String,
    pub particle_count: usize,
    pub link_distance: f64,
    /// Velocity components are drawn from `[-max_speed/2, max_speed/2)`.
    pub max_speed: f64,
    pub color: String,
    /// Hosts pass a random seed; tests pin one.
    pub seed: u64,
}

/// Seed used when the configuration does not pick one. Browser hosts replace
/// it with a random seed.
pub const DEFAULT_BACKDROP_SEED: u64 = 0x5EED;

impl Default for BackdropCfg {
    fn default() -> Self {
        Self {
            kind: BackdropKind::Canvas2d,
            selector: "#hero-canvas".to_string(),
            particle_count: 50,
            link_distance: 100.0,
            max_speed: 0.8,
            color: "#CDDC39".to_string(),
            seed: DEFAULT_BACKDROP_SEED,
        }
    }
}

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|w| w.to_string()).collect()
}

fn strings(list: &[&str]) -> Vec<String> {
    words(list)
}

impl Default for Config {
    fn default() -> Self {
        let section_watch = WatchOptions {
            threshold: 0.1,
            root_margin: "0px 0px -50px 0px".to_string(),
            one_shot: false,
            stagger_ms: 0.0,
        };
        Self {
            observer: ObserverSupport::Available,
            reveals: vec![
                RevealGroup {
                    selector: ".service-section, .problem-card, .deliverable-card, .case-study-card, .approach-step".to_string(),
                    prepare_classes: strings(&["animate-on-scroll"]),
                    classes: strings(&["visible"]),
                    watch: WatchOptions::default(),
                },
                RevealGroup {
                    selector: ".section-white, .section-gray".to_string(),
                    prepare_classes: strings(&["fade-in-section"]),
                    classes: strings(&["visible"]),
                    watch: section_watch.clone(),
                },
                RevealGroup {
                    selector: ".section".to_string(),
                    prepare_classes: Vec::new(),
                    classes: strings(&["animate-in"]),
                    watch: section_watch,
                },
                RevealGroup {
                    selector: ".timeline-item".to_string(),
                    prepare_classes: Vec::new(),
                    classes: strings(&["timeline-reveal"]),
                    watch: WatchOptions {
                        threshold: 0.3,
                        root_margin: "0px 0px -10% 0px".to_string(),
                        one_shot: true,
                        stagger_ms: 200.0,
                    },
                },
            ],
            counters: vec![CounterGroup {
                selector: ".stat-counter".to_string(),
                watch: default_counter_watch(),
                duration_ms: default_counter_duration(),
                easing: Easing::EaseOutQuart,
                start_delay_ms: 0.0,
                default_format: CounterFormat::CurrencyScaled,
                marker_class: Some("counted".to_string()),
            }],
            bars: vec![
                BarGroup {
                    selector: ".bar-fill[data-width]".to_string(),
                    data: "width".to_string(),
                    property: "width".to_string(),
                    watch: WatchOptions::default(),
                },
                BarGroup {
                    selector: ".bar-fill[data-value]".to_string(),
                    data: "value".to_string(),
                    property: "height".to_string(),
                    watch: WatchOptions {
                        threshold: 0.0,
                        root_margin: "0px".to_string(),
                        one_shot: true,
                        stagger_ms: 0.0,
                    },
                },
            ],
            staggers: vec![StaggerGroup {
                selector: ".services-preview, .social-proof".to_string(),
                children: ".service-card, .proof-stat".to_string(),
                classes: strings(&["animate-in"]),
                step_ms: 100.0,
                watch: WatchOptions {
                    threshold: 0.1,
                    root_margin: "0px 0px -10% 0px".to_string(),
                    one_shot: true,
                    stagger_ms: 0.0,
                },
            }],
            carousels: vec![CarouselCfg {
                track: ".testimonial-carousel".to_string(),
                slides: ".testimonial-slide".to_string(),
                indicators: Some(".carousel-indicator".to_string()),
                prev: Some(".carousel-prev".to_string()),
                next: Some(".carousel-next".to_string()),
                active_class: default_active_class(),
                autoplay_ms: Some(6000.0),
            }],
            scroll: ScrollCfg::default(),
            parallax: vec![
                ParallaxCfg {
                    selector: ".service-card".to_string(),
                    speed: 0.1,
                    direction: Direction::Up,
                    marker_class: default_parallax_class(),
                },
                ParallaxCfg {
                    selector: ".hero-content".to_string(),
                    speed: 0.05,
                    direction: Direction::Down,
                    marker_class: default_parallax_class(),
                },
                ParallaxCfg {
                    selector: "#hero-canvas".to_string(),
                    speed: 0.02,
                    direction: Direction::Down,
                    marker_class: default_parallax_class(),
                },
            ],
            rotators: vec![
                RotatorCfg {
                    selector: "#rolling-industry".to_string(),
                    words: words(&[
                        "SaaS",
                        "Healthcare",
                        "FinTech",
                        "HR Tech",
                        "Insurance",
                        "Logistics",
                        "E-commerce",
                        "Professional Services",
                        "Manufacturing",
                    ]),
                    interval_ms: 2500.0,
                },
                RotatorCfg {
                    selector: "#rolling-growth-stage".to_string(),
                    words: words(&[
                        "venture-backed",
                        "bootstrapped",
                        "PE-backed",
                        "family-owned",
                        "Series A",
                        "Series B",
                        "profitable",
                    ]),
                    interval_ms: 3000.0,
                },
                RotatorCfg {
                    selector: "#rolling-service".to_string(),
                    words: words(&[
                        "Revenue Architecture",
                        "Strategic Partnerships",
                        "AI Implementation",
                        "Design & UX",
                        "Talent Solutions",
                    ]),
                    interval_ms: 2800.0,
                },
            ],
            backdrop: BackdropCfg::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = Config::from_json_str(r#"{ "observer": "unavailable", "carousels": [] }"#)
            .expect("parse");
        assert_eq!(cfg.observer, ObserverSupport::Unavailable);
        assert!(cfg.carousels.is_empty());
        assert_eq!(cfg.reveals.len(), Config::default().reveals.len());
        assert_eq!(cfg.scroll.cta.as_ref().map(|c| c.show_at_pct), Some(30.0));
    }

    #[test]
    fn bad_json_is_a_config_error() {
        assert!(matches!(
            Config::from_json_str("{ \"reveals\": 3 }"),
            Err(MotionError::Config(_))
        ));
    }
}
