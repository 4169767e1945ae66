mod common;

use common::{added_classes, style, texts, visible, watch_for, FixturePage};
use vitrine_motion_core::{
    Carousel, CarouselAction, CarouselCommand, CarouselParts, Config, DomWrite, ElementKey,
    Engine, Inputs, MotionError, MotionEvent, ObserverSupport, ScrollSample, WriteBatch,
};

fn bound(page: &str) -> (Engine, vitrine_motion_core::BindReport, FixturePage) {
    let cfg = match vitrine_test_fixtures::pages::config_json(page).expect("fixture") {
        Some(json) => Config::from_json_str(&json).expect("config"),
        None => Config::default(),
    };
    let mut resolver = FixturePage::load(page).expect("page fixture");
    let mut engine = Engine::new(cfg);
    let report = engine.bind(&mut resolver).expect("bind");
    (engine, report, resolver)
}

fn with_entries(entries: Vec<vitrine_motion_core::IntersectionEntry>) -> Inputs {
    Inputs {
        intersections: entries,
        ..Inputs::default()
    }
}

#[test]
fn landing_page_binds_every_present_widget() {
    let (engine, report, resolver) = bound("landing");
    assert_eq!(report.carousels.len(), 1);
    let carousel = &report.carousels[0];
    assert_eq!(carousel.indicators.len(), 3);
    assert_eq!(carousel.prev.len(), 1);
    assert_eq!(carousel.next.len(), 1);
    assert_eq!(report.backdrop.as_ref().map(|k| k.as_str()), Some("hero-canvas"));
    assert_eq!(
        report.skipped,
        vec!["#rolling-growth-stage".to_string(), "#rolling-service".to_string()]
    );
    assert_eq!(resolver.created, vec!["scrollProgress".to_string()]);
    assert!(engine.wants_frame());
}

#[test]
fn binding_twice_is_rejected() {
    let (mut engine, _, mut resolver) = bound("landing");
    assert_eq!(
        engine.bind(&mut resolver).unwrap_err(),
        MotionError::AlreadyBound
    );
}

#[test]
fn first_update_flushes_initial_state() {
    let (mut engine, _, _) = bound("landing");
    let out = engine.update(0.0, Inputs::default());
    assert!(added_classes(out, "svc-1").contains(&"animate-on-scroll".to_string()));
    assert!(added_classes(out, "card-1").contains(&"parallax-element".to_string()));
    assert_eq!(style(out, "carousel", "transform").as_deref(), Some("translateX(0%)"));
    assert_eq!(added_classes(out, "ind-0"), vec!["indicator-active".to_string()]);
    assert_eq!(texts(&out.writes, "rolling-industry"), vec!["SaaS".to_string()]);

    let out = engine.update(16.0, Inputs::default());
    assert!(added_classes(out, "svc-1").is_empty());
}

#[test]
fn percentage_counter_ends_on_exact_target() {
    let (mut engine, report, _) = bound("stats");
    let watch = watch_for(&report.watches, "stat-pct").clone();
    assert_eq!(watch.keys.len(), 4, "counter without numeric target is skipped");

    engine.update(0.0, with_entries(vec![visible(&watch, "stat-pct", 0.6)]));
    let mut shown = Vec::new();
    let mut finished = Vec::new();
    for _ in 0..80 {
        let out = engine.update(16.0, Inputs::default());
        shown.extend(texts(&out.writes, "stat-pct"));
        finished.extend(out.events.iter().cloned().filter_map(|e| match e {
            MotionEvent::CounterFinished { key, text } => Some((key.to_string(), text)),
            _ => None,
        }));
    }
    assert_eq!(shown.last().map(String::as_str), Some("22%"));
    assert!(shown.iter().all(|t| t.trim_end_matches('%').parse::<i64>().unwrap() <= 22));
    assert_eq!(finished, vec![("stat-pct".to_string(), "22%".to_string())]);
}

#[test]
fn currency_counter_keeps_its_unit_while_running() {
    let (mut engine, report, _) = bound("stats");
    let watch = watch_for(&report.watches, "stat-revenue").clone();
    engine.update(
        0.0,
        with_entries(vec![
            visible(&watch, "stat-revenue", 1.0),
            visible(&watch, "stat-deals", 1.0),
        ]),
    );
    let mut revenue = Vec::new();
    let mut deals = Vec::new();
    for _ in 0..70 {
        let out = engine.update(16.0, Inputs::default());
        revenue.extend(texts(&out.writes, "stat-revenue"));
        deals.extend(texts(&out.writes, "stat-deals"));
    }
    assert!(revenue.iter().all(|t| t.starts_with('$') && t.ends_with('M')));
    assert_eq!(revenue.last().map(String::as_str), Some("$1.3M"));
    assert_eq!(deals.last().map(String::as_str), Some("45k+"));
}

#[test]
fn counter_waits_until_intersecting() {
    let (mut engine, report, _) = bound("stats");
    let watch = watch_for(&report.watches, "stat-days").clone();
    engine.update(0.0, with_entries(vec![visible(&watch, "stat-days", 0.0)]));
    let out = engine.update(500.0, Inputs::default());
    assert!(texts(&out.writes, "stat-days").is_empty());
}

#[test]
fn one_shot_targets_fire_once() {
    let (mut engine, report, _) = bound("landing");
    let watch = watch_for(&report.watches, "timeline-1").clone();
    let out = engine.update(0.0, with_entries(vec![visible(&watch, "timeline-1", 0.5)]));
    assert_eq!(out.unobserve.len(), 1);
    assert_eq!(added_classes(out, "timeline-1"), vec!["timeline-reveal".to_string()]);

    let mut revealed = 0;
    for ratio in [0.0, 0.8, 0.0, 1.0] {
        let out = engine.update(16.0, with_entries(vec![visible(&watch, "timeline-1", ratio)]));
        revealed += out
            .events
            .iter()
            .filter(|e| matches!(e, MotionEvent::Revealed { .. }))
            .count();
    }
    assert_eq!(revealed, 0);
}

#[test]
fn repeating_reveal_fires_again_after_leaving() {
    let (mut engine, report, _) = bound("landing");
    let watch = watch_for(&report.watches, "hero").clone();
    assert!(!watch.options.one_shot);
    let mut count = 0;
    for ratio in [0.5, 0.6, 0.0, 0.5] {
        let out = engine.update(16.0, with_entries(vec![visible(&watch, "hero", ratio)]));
        count += added_classes(out, "hero").len();
        assert!(out.unobserve.is_empty());
    }
    assert_eq!(count, 2);
}

#[test]
fn timeline_items_stagger_within_a_batch() {
    let (mut engine, report, _) = bound("landing");
    let watch = watch_for(&report.watches, "timeline-1").clone();
    let out = engine.update(
        0.0,
        with_entries(vec![
            visible(&watch, "timeline-1", 1.0),
            visible(&watch, "timeline-2", 1.0),
            visible(&watch, "timeline-3", 1.0),
        ]),
    );
    assert_eq!(added_classes(out, "timeline-1").len(), 1);
    assert!(added_classes(out, "timeline-2").is_empty());
    let out = engine.update(200.0, Inputs::default());
    assert_eq!(added_classes(out, "timeline-2").len(), 1);
    assert!(added_classes(out, "timeline-3").is_empty());
    let out = engine.update(200.0, Inputs::default());
    assert_eq!(added_classes(out, "timeline-3").len(), 1);
}

#[test]
fn stagger_children_and_capped_bars() {
    let (mut engine, report, _) = bound("landing");
    // The section is also a plain reveal target; the stagger watch is registered last.
    let section = report
        .watches
        .iter()
        .filter(|w| w.keys.iter().any(|k| k.as_str() == "services-preview"))
        .last()
        .expect("stagger watch")
        .clone();
    let bars = watch_for(&report.watches, "bar-1").clone();
    let tall = watch_for(&report.watches, "bar-2").clone();

    let out = engine.update(
        0.0,
        with_entries(vec![
            visible(&section, "services-preview", 0.5),
            visible(&bars, "bar-1", 0.5),
            visible(&tall, "bar-2", 0.5),
        ]),
    );
    assert_eq!(style(out, "bar-1", "width").as_deref(), Some("100%"));
    assert_eq!(style(out, "bar-2", "height").as_deref(), Some("35.5%"));
    assert!(added_classes(out, "card-1").contains(&"animate-in".to_string()));
    assert!(!added_classes(out, "card-2").contains(&"animate-in".to_string()));

    let out = engine.update(100.0, Inputs::default());
    assert!(added_classes(out, "card-2").contains(&"animate-in".to_string()));
    assert!(added_classes(out, "card-3").is_empty());
    let out = engine.update(100.0, Inputs::default());
    assert!(added_classes(out, "card-3").contains(&"animate-in".to_string()));
}

#[test]
fn fallback_applies_final_state_without_observer() {
    let (mut engine, report, _) = bound("landing-no-observer");
    assert_eq!(engine.config().observer, ObserverSupport::Unavailable);
    assert!(report.watches.iter().all(|w| w.keys.is_empty()));

    let out = engine.update(0.0, Inputs::default());
    assert!(added_classes(out, "svc-1").contains(&"visible".to_string()));
    assert_eq!(texts(&out.writes, "stat-revenue"), vec!["$1.3M".to_string()]);
    assert_eq!(texts(&out.writes, "stat-pct"), vec!["22%".to_string()]);
    assert_eq!(style(out, "bar-1", "width").as_deref(), Some("100%"));
    for card in ["card-1", "card-2", "card-3"] {
        assert!(added_classes(out, card).contains(&"animate-in".to_string()));
    }
    assert!(out
        .events
        .iter()
        .all(|e| !matches!(e, MotionEvent::Revealed { immediate: false, .. })));
}

#[test]
fn carousel_index_wraps_for_every_size() {
    for n in 1..=8usize {
        let mut carousel = Carousel::new(CarouselParts {
            track: Some(ElementKey::new("track")),
            slides: (0..n).map(|i| ElementKey::new(format!("slide-{i}"))).collect(),
            indicators: (0..n).map(|i| ElementKey::new(format!("dot-{i}"))).collect(),
            active_class: "indicator-active".into(),
        })
        .expect("non-empty");
        assert_eq!(carousel.prev(), n - 1, "prev from 0 with n={n}");
        carousel.goto(0);

        let mut expected = 0i64;
        for step in 0..40usize {
            let action = match step % 5 {
                0 | 3 => CarouselAction::Prev,
                1 | 4 => CarouselAction::Next,
                _ => CarouselAction::Goto(step * 7),
            };
            expected = match action {
                CarouselAction::Next => expected + 1,
                CarouselAction::Prev => expected - 1,
                CarouselAction::Goto(k) => k as i64,
            }
            .rem_euclid(n as i64);
            let index = carousel.apply(action);
            assert!(index < n, "n={n} step={step}");
            assert_eq!(index as i64, expected, "n={n} step={step}");

            let mut batch = WriteBatch::new();
            carousel.render(&mut batch);
            let active = batch
                .iter()
                .filter(|op| matches!(op.write, DomWrite::SetClass { on: true, .. }))
                .count();
            assert_eq!(active, 1, "n={n} step={step}");
        }
    }
}

#[test]
fn carousel_commands_wrap_and_move_one_indicator() {
    let (mut engine, report, _) = bound("landing");
    let id = report.carousels[0].carousel;
    engine.update(0.0, Inputs::default());

    let out = engine.update(
        16.0,
        Inputs {
            carousel_cmds: vec![CarouselCommand {
                carousel: id,
                action: CarouselAction::Prev,
            }],
            ..Inputs::default()
        },
    );
    assert_eq!(style(out, "carousel", "transform").as_deref(), Some("translateX(-200%)"));
    assert_eq!(added_classes(out, "ind-2"), vec!["indicator-active".to_string()]);
    assert!(added_classes(out, "ind-0").is_empty());
    assert_eq!(engine.carousel_index(id), Some(2));

    let mut index = 2usize;
    for step in 0..20 {
        let action = if step % 3 == 0 {
            CarouselAction::Prev
        } else {
            CarouselAction::Next
        };
        engine.update(
            16.0,
            Inputs {
                carousel_cmds: vec![CarouselCommand { carousel: id, action }],
                ..Inputs::default()
            },
        );
        index = match action {
            CarouselAction::Prev => (index + 2) % 3,
            _ => (index + 1) % 3,
        };
        assert_eq!(engine.carousel_index(id), Some(index));
    }
}

#[test]
fn carousel_autoplay_ignores_manual_moves() {
    let (mut engine, report, _) = bound("landing");
    let id = report.carousels[0].carousel;
    engine.update(5000.0, Inputs::default());
    engine.update(
        0.0,
        Inputs {
            carousel_cmds: vec![CarouselCommand {
                carousel: id,
                action: CarouselAction::Goto(2),
            }],
            ..Inputs::default()
        },
    );
    let out = engine.update(1000.0, Inputs::default());
    assert!(out.events.contains(&MotionEvent::SlideChanged {
        carousel: id,
        index: 0,
        autoplay: true,
    }));
}

#[test]
fn scroll_drives_progress_nav_and_cta() {
    let (mut engine, _, _) = bound("landing");
    let sample = |top: f64| ScrollSample {
        scroll_top: top,
        viewport_height: 800.0,
        document_height: 4800.0,
        viewport_width: 1280.0,
    };
    let scrolled = |engine: &mut Engine, top: f64| {
        engine
            .update(
                16.0,
                Inputs {
                    scroll: Some(sample(top)),
                    ..Inputs::default()
                },
            )
            .clone()
    };

    let out = scrolled(&mut engine, 0.0);
    assert_eq!(style(&out, "scrollProgress", "width").as_deref(), Some("0%"));

    let out = scrolled(&mut engine, 2000.0);
    assert_eq!(style(&out, "scrollProgress", "width").as_deref(), Some("50%"));
    assert!(out.events.contains(&MotionEvent::CtaVisibility { visible: true }));
    assert!(out.events.contains(&MotionEvent::NavHidden { hidden: true }));
    assert!(added_classes(&out, "nav").contains(&"scrolled".to_string()));
    assert_eq!(style(&out, "card-1", "transform").as_deref(), Some("translateY(-200px)"));
    assert_eq!(style(&out, "hero-content", "transform").as_deref(), Some("translateY(100px)"));

    let out = scrolled(&mut engine, 4800.0);
    assert_eq!(style(&out, "scrollProgress", "width").as_deref(), Some("100%"));
    assert!(out.events.contains(&MotionEvent::CtaVisibility { visible: false }));

    let out = scrolled(&mut engine, 9000.0);
    assert_eq!(style(&out, "scrollProgress", "width"), None, "unchanged progress is not rewritten");
}

#[test]
fn mobile_bar_overrides_floating_cta() {
    let (mut engine, _, _) = bound("landing");
    let narrow = ScrollSample {
        scroll_top: 1400.0,
        viewport_height: 800.0,
        document_height: 4800.0,
        viewport_width: 390.0,
    };
    let out = engine.update(
        16.0,
        Inputs {
            scroll: Some(narrow),
            ..Inputs::default()
        },
    );
    assert!(added_classes(out, "mobile-cta").contains(&"visible".to_string()));
    assert!(!out
        .events
        .contains(&MotionEvent::CtaVisibility { visible: true }));
}

#[test]
fn teardown_stops_everything() {
    let (mut engine, report, mut resolver) = bound("landing");
    let observed: usize = report.watches.iter().map(|w| w.keys.len()).sum();
    let torn = engine.teardown();
    assert_eq!(torn.unobserve.len(), observed);
    assert!(!engine.wants_frame());
    assert!(engine.update(6000.0, Inputs::default()).is_empty());
    assert!(engine.backdrop_frame().is_none());
    assert_eq!(engine.bind(&mut resolver).unwrap_err(), MotionError::TornDown);
}

#[test]
fn backdrop_backend_follows_config() {
    let json = vitrine_test_fixtures::configs::json("svg-backdrop").expect("fixture");
    let cfg = Config::from_json_str(&json).expect("config");
    let mut engine = Engine::new(cfg);
    engine
        .bind(&mut FixturePage::load("landing").expect("page fixture"))
        .expect("bind");
    let frame = engine.backdrop_frame().expect("svg backdrop simulates");
    assert_eq!(frame.dots.len(), 12);
    assert_eq!((frame.width, frame.height), (1280.0, 800.0));
    assert!(frame.svg_markup().contains("#CDDC39"));

    let (engine, _, _) = bound("stats");
    assert!(engine.backdrop_frame().is_none());
}
