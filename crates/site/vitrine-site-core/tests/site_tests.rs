use std::cell::RefCell;
use std::rc::Rc;

use vitrine_site_core::{
    AnalyticsEvent, ClickContext, DomWrite, ElementKey, EventSink, FormAction, FormFields,
    NoticeKind, PageContext, ScrollTo, SinkError, Site, SiteBindReport, SiteConfig, SiteError,
    SiteInput, SiteOutputs, SubmitState, WriteBatch,
};
use vitrine_test_fixtures::{forms, FixturePage};

fn bound() -> (Site, SiteBindReport) {
    let mut page = FixturePage::load("services").expect("page fixture");
    let mut site = Site::new(SiteConfig::default());
    site.set_page(PageContext {
        location: "https://example.test/services".into(),
        title: "Services".into(),
        referrer: "https://search.test/".into(),
        path: "/services.html".into(),
    });
    let report = site.bind(&mut page).expect("bind");
    (site, report)
}

fn text_of(batch: &WriteBatch, key: &str) -> Option<String> {
    batch
        .for_target(&ElementKey::new(key))
        .filter_map(|w| match w {
            DomWrite::SetText { text } => Some(text.clone()),
            _ => None,
        })
        .last()
}

fn has_class(batch: &WriteBatch, key: &str, class: &str) -> bool {
    batch.for_target(&ElementKey::new(key)).any(|w| {
        matches!(w, DomWrite::SetClass { class: c, on: true } if c == class)
            || matches!(w, DomWrite::AddClass { class: c } if c == class)
    })
}

fn complete_fields() -> FormFields {
    let cases = forms::cases("qualification").expect("form fixture");
    let case = cases.iter().find(|c| c.valid).expect("a valid case");
    case.fields.clone().into_iter().collect()
}

#[test]
fn services_page_binds_present_widgets() {
    let (_, report) = bound();
    let form = report.form.as_ref().expect("form bound");
    assert_eq!(form.submit.as_ref().map(ElementKey::as_str), Some("form-submit"));
    assert_eq!(report.calculators.len(), 1);
    assert_eq!(report.quizzes.len(), 1);
    assert_eq!(report.quizzes[0].name, "partnership");
    // the button without data-filter is left out
    assert_eq!(report.filter_buttons.len(), 3);
    let names: Vec<_> = report.accordions.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["faq", "pillars", "process"]);
    // faq-2 has no question element
    assert_eq!(report.accordions[0].triggers.len(), 2);
    assert_eq!(report.accordions[2].triggers[1].as_str(), "step-1");
    assert_eq!(
        report.skipped,
        vec![
            "#averageSalary, #turnoverRate, #teamSize".to_string(),
            "#aiMaturityScore".to_string()
        ]
    );
}

#[test]
fn second_bind_is_refused() {
    let (mut site, _) = bound();
    let mut page = FixturePage::load("services").expect("page fixture");
    assert!(matches!(site.bind(&mut page), Err(SiteError::AlreadyBound)));
}

#[test]
fn revenue_calculator_writes_currency() {
    let (mut site, _) = bound();
    let out = site.handle(SiteInput::CalculatorChanged {
        kind: vitrine_site_core::CalculatorKind::Revenue,
        values: vec!["500".into(), "2.5".into(), "12000".into()],
    });
    assert_eq!(text_of(&out.writes, "currentRevenue").as_deref(), Some("$150,000"));
    assert_eq!(text_of(&out.writes, "optimizedRevenue").as_deref(), Some("$375,000"));
    assert_eq!(text_of(&out.writes, "annualImpact").as_deref(), Some("$2,700,000"));

    // bad hire inputs are incomplete on this page
    let out = site.handle(SiteInput::CalculatorChanged {
        kind: vitrine_site_core::CalculatorKind::BadHire,
        values: vec!["80000".into(), "15".into(), "30".into()],
    });
    assert!(out.writes.is_empty());
}

#[test]
fn quiz_reports_once_complete() {
    let (mut site, report) = bound();
    let questions = report.quizzes[0].questions.clone();
    for q in &questions[..4] {
        let out = site.handle(SiteInput::QuizAnswer {
            quiz: "partnership".into(),
            question: q.clone(),
            value: "2".into(),
        });
        assert!(text_of(&out.writes, "partnershipScore").is_none());
    }
    let out = site.handle(SiteInput::QuizAnswer {
        quiz: "partnership".into(),
        question: questions[4].clone(),
        value: "2".into(),
    });
    assert_eq!(text_of(&out.writes, "partnershipScore").as_deref(), Some("67%"));
    let rec = text_of(&out.writes, "partnershipRecommendation").expect("recommendation");
    assert!(rec.starts_with("Good foundation"));
    assert!(out
        .writes
        .for_target(&ElementKey::new("quiz-results"))
        .any(|w| matches!(w, DomWrite::SetStyle { value, .. } if value == "block")));
}

#[test]
fn filter_marks_one_button_and_staggers_cards() {
    let (mut site, _) = bound();
    let out = site.handle(SiteInput::FilterSelected { index: 1 }).clone();
    assert!(has_class(&out.writes, "filter-saas", "filter-active"));
    assert!(!has_class(&out.writes, "filter-all", "filter-active"));
    assert!(has_class(&out.writes, "case-0", "card-fade-in"));
    let delays: Vec<_> = out
        .timed
        .iter()
        .map(|t| (t.op.target.as_str().to_string(), t.delay_ms))
        .collect();
    assert!(delays.contains(&("case-2".to_string(), 200.0)));
    assert!(delays.contains(&("case-1".to_string(), 300.0)));
    assert!(delays.contains(&("case-3".to_string(), 300.0)));
    assert_eq!(site.active_filter(), Some("saas"));

    let out = site.handle(SiteInput::FilterSelected { index: 0 });
    // everything matches "all": no card is hidden
    assert!(out
        .timed
        .iter()
        .all(|t| !matches!(&t.op.write, DomWrite::SetStyle { value, .. } if value == "none")));
}

#[test]
fn accordions_are_exclusive_per_group() {
    let (mut site, _) = bound();
    site.handle(SiteInput::AccordionToggled {
        accordion: "pillars".into(),
        index: 0,
    });
    let out = site.handle(SiteInput::AccordionToggled {
        accordion: "pillars".into(),
        index: 1,
    });
    assert!(has_class(&out.writes, "pillar-1", "expanded"));
    assert!(!has_class(&out.writes, "pillar-0", "expanded"));
    assert_eq!(text_of(&out.writes, "pillar-0-mark").as_deref(), Some("+"));
    assert_eq!(text_of(&out.writes, "pillar-1-mark").as_deref(), Some("\u{2212}"));

    site.handle(SiteInput::AccordionToggled {
        accordion: "faq".into(),
        index: 0,
    });
    assert_eq!(site.open_item("pillars"), Some(1));
    assert_eq!(site.open_item("faq"), Some(0));
    site.handle(SiteInput::AccordionToggled {
        accordion: "faq".into(),
        index: 0,
    });
    assert_eq!(site.open_item("faq"), None);
}

#[test]
fn form_fixture_cases_validate_as_labelled() {
    for case in forms::cases("qualification").expect("form fixture") {
        let (mut site, _) = bound();
        let fields: FormFields = case.fields.clone().into_iter().collect();
        let out = site.handle(SiteInput::FormSubmit {
            fields,
            button_text: "Get My Assessment".into(),
        });
        if case.valid {
            assert!(out.notice.is_none(), "{}", case.name);
            assert_eq!(
                out.form,
                Some(FormAction::ScheduleAck { delay_ms: 1500.0 }),
                "{}",
                case.name
            );
        } else {
            let notice = out.notice.as_ref().expect("rejected");
            assert_eq!(notice.kind, NoticeKind::Error, "{}", case.name);
            assert!(out.form.is_none(), "{}", case.name);
        }
    }
}

#[test]
fn form_cycle_disables_then_restores_the_button() {
    let (mut site, _) = bound();
    let out = site.handle(SiteInput::FormSubmit {
        fields: complete_fields(),
        button_text: "Get My Assessment".into(),
    });
    assert_eq!(text_of(&out.writes, "form-submit").as_deref(), Some("Submitting..."));
    assert!(out
        .writes
        .for_target(&ElementKey::new("form-submit"))
        .any(|w| matches!(w, DomWrite::SetAttribute { name, .. } if name == "disabled")));

    let again = site.handle(SiteInput::FormSubmit {
        fields: complete_fields(),
        button_text: "Submitting...".into(),
    });
    assert!(again.is_empty());

    let out = site.handle(SiteInput::FormAcknowledged);
    let notice = out.notice.as_ref().expect("confirmation");
    assert_eq!(notice.kind, NoticeKind::Success);
    assert!(notice.message.starts_with("Thank you!"));
    assert_eq!(out.form, Some(FormAction::Reset));
    assert_eq!(text_of(&out.writes, "form-submit").as_deref(), Some("Get My Assessment"));
    assert_eq!(site.form_state(), Some(&SubmitState::Idle));
}

struct Recording {
    name: &'static str,
    seen: Rc<RefCell<Vec<String>>>,
}

impl EventSink for Recording {
    fn name(&self) -> &str {
        self.name
    }

    fn is_available(&self) -> bool {
        true
    }

    fn send(&mut self, event: &AnalyticsEvent) -> Result<(), SinkError> {
        self.seen.borrow_mut().push(event.name.clone());
        Ok(())
    }
}

#[test]
fn analytics_inputs_are_dispatched_with_page_context() {
    let (mut site, _) = bound();
    let seen = Rc::new(RefCell::new(Vec::new()));
    site.dispatcher_mut().add(Recording {
        name: "recording",
        seen: seen.clone(),
    });

    let out = site.handle(SiteInput::PageView);
    let tracked = &out.tracked[0];
    assert_eq!(tracked.event.data["page_referrer"], "https://search.test/");
    assert_eq!(tracked.report.delivered, vec!["recording"]);

    let out = site.handle(SiteInput::Click {
        context: ClickContext {
            event: "book_call".into(),
            text: "Book".into(),
            ..ClickContext::default()
        },
    });
    assert_eq!(out.tracked[0].event.data["page_title"], "Services");

    site.handle(SiteInput::FormTracked {
        event: "lead_form_submit".into(),
        form_id: Some("qualificationForm".into()),
    });
    assert_eq!(
        *seen.borrow(),
        vec!["page_view", "book_call", "lead_form_submit"]
    );
}

#[test]
fn teardown_silences_the_site() {
    let (mut site, _) = bound();
    site.teardown();
    let out: &SiteOutputs = site.handle(SiteInput::FilterSelected { index: 0 });
    assert!(out.is_empty());
    let mut page = FixturePage::load("services").expect("page fixture");
    assert!(matches!(site.bind(&mut page), Err(SiteError::TornDown)));
}

#[test]
fn analytics_only_config_binds_no_widgets() {
    let mut page = FixturePage::load("services").expect("page fixture");
    let mut site = Site::new(SiteConfig::analytics_only());
    let report = site.bind(&mut page).expect("bind");
    assert!(report.form.is_none());
    assert!(report.calculators.is_empty() && report.accordions.is_empty());
    let out = site.handle(SiteInput::PageView);
    assert_eq!(out.tracked.len(), 1);
    assert!(out.tracked[0].report.delivered.is_empty());
}

#[test]
fn navigation_marks_the_current_link_on_first_output() {
    let (mut site, report) = bound();
    let nav = report.nav.as_ref().expect("nav bound");
    assert_eq!(nav.toggle.as_ref().map(ElementKey::as_str), Some("navToggle"));
    assert_eq!(nav.dropdowns.len(), 2);

    let out = site.handle(SiteInput::PageView).clone();
    assert!(has_class(&out.writes, "link-services", "active"));
    assert!(!has_class(&out.writes, "link-home", "active"));
    let out = site.handle(SiteInput::PageView);
    assert!(out.writes.is_empty());
}

#[test]
fn mobile_menu_opens_and_closes_on_outside_click_or_wide_resize() {
    let (mut site, _) = bound();
    let out = site.handle(SiteInput::NavToggled);
    assert!(has_class(&out.writes, "navMenu", "active"));
    assert!(out
        .writes
        .for_target(&ElementKey::new("body"))
        .any(|w| matches!(w, DomWrite::SetStyle { property, value } if property == "overflow" && value == "hidden")));

    // the toggle's own click bubbles to the document from inside the nav
    site.handle(SiteInput::DocumentClicked {
        inside_nav: true,
        dropdown: None,
    });
    assert!(site.nav_menu_open());
    site.handle(SiteInput::Resized {
        viewport_width: 600.0,
    });
    assert!(site.nav_menu_open());

    let out = site.handle(SiteInput::DocumentClicked {
        inside_nav: false,
        dropdown: None,
    }).clone();
    assert!(!site.nav_menu_open());
    assert!(out
        .writes
        .for_target(&ElementKey::new("dropdown-1"))
        .any(|w| matches!(w, DomWrite::RemoveClass { class } if class == "active")));

    site.handle(SiteInput::NavToggled);
    site.handle(SiteInput::Resized {
        viewport_width: 1024.0,
    });
    assert!(!site.nav_menu_open());
}

#[test]
fn anchor_clicks_scroll_with_the_nav_offset() {
    let (mut site, report) = bound();
    assert_eq!(report.anchors.len(), 2);
    let out = site.handle(SiteInput::AnchorClicked { index: 0 });
    assert_eq!(
        out.scroll,
        Some(ScrollTo {
            target: ElementKey::new("pricing"),
            offset_px: 80.0,
        })
    );
    // "#" has no target: the jump is cancelled and nothing scrolls
    let out = site.handle(SiteInput::AnchorClicked { index: 1 });
    assert!(out.scroll.is_none());
}
