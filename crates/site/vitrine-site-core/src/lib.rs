//! Vitrine Site Core (host-agnostic)
//!
//! The interactive widgets of a marketing page: analytics events fanned out
//! to whichever trackers the page loaded, the qualification form, ROI
//! calculators, readiness quizzes, the case-study filter, exclusive
//! accordions and the navigation menu. [`Site`] binds them to a page; hosts feed it [`SiteInput`]s
//! and apply the [`SiteOutputs`] it returns.

pub mod accordion;
pub mod analytics;
pub mod calculator;
pub mod config;
pub mod error;
pub mod filter;
pub mod form;
pub mod inputs;
pub mod nav;
pub mod outputs;
pub mod quiz;
pub mod site;

pub use accordion::{Accordion, AccordionCfg, AccordionItem};
pub use analytics::{
    AnalyticsEvent, ClickContext, DispatchReport, Dispatcher, EventData, EventSink, PageContext,
    SinkCall, SinkKind,
};
pub use calculator::{
    estimate_bad_hire, estimate_revenue, format_usd, BadHireEstimate, BadHireInputs,
    CalculatorCfg, CalculatorKind, RevenueEstimate, RevenueInputs,
};
pub use config::{AnalyticsCfg, FormCfg, SiteConfig};
pub use error::{FormError, SinkError, SiteError};
pub use filter::{CaseFilter, FilterButton, FilterCard, FilterCfg};
pub use form::{is_valid_email, validate, FormFields, QualificationForm, SubmitState};
pub use inputs::SiteInput;
pub use nav::{
    anchor_target, link_is_current, AnchorScrollCfg, MobileMenu, NavMenuCfg, Navigation, ScrollTo,
};
pub use outputs::{FormAction, Notice, NoticeKind, SiteOutputs, TimedWrite, Tracked};
pub use quiz::{Band, Quiz, QuizCfg, QuizResult};
pub use site::{
    AccordionBinding, CalculatorBinding, FormBinding, NavBinding, QuizBinding, Site,
    SiteBindReport,
};
pub use vitrine_api_core::{DomWrite, ElementKey, ElementResolver, WriteBatch, WriteOp};
