//! Output contracts from the site engine.
//!
//! `writes` apply immediately, `timed` after their delay, in the order given.
//! `notice` is a message for the visitor and `form` asks the host to do
//! something with the form element itself.

use serde::{Deserialize, Serialize};
use vitrine_api_core::{WriteBatch, WriteOp};

use crate::analytics::{AnalyticsEvent, DispatchReport};
use crate::nav::ScrollTo;

/// A write the host applies after `delay_ms`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimedWrite {
    pub delay_ms: f64,
    #[serde(flatten)]
    pub op: WriteOp,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    Error,
    Success,
}

/// Text to show the visitor (the browser host uses `alert`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum FormAction {
    /// Send `SiteInput::FormAcknowledged` after `delay_ms`.
    ScheduleAck { delay_ms: f64 },
    /// Clear every field (`form.reset()`).
    Reset,
}

/// An analytics event and where it went.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tracked {
    pub event: AnalyticsEvent,
    pub report: DispatchReport,
}

/// Outputs returned by `Site::handle()`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SiteOutputs {
    #[serde(default)]
    pub writes: WriteBatch,
    #[serde(default)]
    pub timed: Vec<TimedWrite>,
    #[serde(default)]
    pub notice: Option<Notice>,
    #[serde(default)]
    pub form: Option<FormAction>,
    #[serde(default)]
    pub tracked: Vec<Tracked>,
    #[serde(default)]
    pub scroll: Option<ScrollTo>,
}

impl SiteOutputs {
    pub fn clear(&mut self) {
        self.writes.clear();
        self.timed.clear();
        self.notice = None;
        self.form = None;
        self.tracked.clear();
        self.scroll = None;
    }

    /// Queue `op` after `delay_ms`; zero or negative delays go straight to
    /// `writes`.
    pub fn schedule(&mut self, delay_ms: f64, op: WriteOp) {
        if delay_ms > 0.0 {
            self.timed.push(TimedWrite { delay_ms, op });
        } else {
            self.writes.push(op);
        }
    }

    pub fn notify(&mut self, kind: NoticeKind, message: impl Into<String>) {
        self.notice = Some(Notice {
            kind,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
            && self.timed.is_empty()
            && self.notice.is_none()
            && self.form.is_none()
            && self.tracked.is_empty()
            && self.scroll.is_none()
    }
}
