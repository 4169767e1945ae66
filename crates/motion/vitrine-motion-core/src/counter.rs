//! Counter animation: time-eased integer sequences rendered as text.

use hashbrown::HashSet;
use serde::{Deserialize, Serialize};
use vitrine_api_core::ElementKey;

use crate::easing::Easing;
use crate::format::CounterFormat;

/// Immutable description of one counter run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CounterSpec {
    #[serde(default)]
    pub start: i64,
    pub end: i64,
    #[serde(default = "default_duration_ms")]
    pub duration_ms: f64,
    #[serde(default)]
    pub format: CounterFormat,
    #[serde(default)]
    pub suffix: String,
    #[serde(default)]
    pub easing: Easing,
    /// Wait before the first frame is shown.
    #[serde(default)]
    pub delay_ms: f64,
}

fn default_duration_ms() -> f64 {
    2000.0
}

impl CounterSpec {
    pub fn new(end: i64) -> Self {
        Self {
            start: 0,
            end,
            duration_ms: default_duration_ms(),
            format: CounterFormat::default(),
            suffix: String::new(),
            easing: Easing::default(),
            delay_ms: 0.0,
        }
    }

    pub fn with_format(mut self, format: CounterFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn with_duration(mut self, duration_ms: f64) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    pub fn with_delay(mut self, delay_ms: f64) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    /// Value shown `elapsed_ms` after the first frame (delay excluded).
    /// Once the duration has passed the value is exactly `end`.
    pub fn value_at(&self, elapsed_ms: f64) -> i64 {
        if self.duration_ms <= 0.0 || elapsed_ms >= self.duration_ms {
            return self.end;
        }
        let progress = (elapsed_ms / self.duration_ms).max(0.0);
        let eased = self.easing.apply(progress);
        let raw = self.start as f64 + (self.end - self.start) as f64 * eased;
        raw.floor() as i64
    }

    pub fn render(&self, value: i64) -> String {
        self.format.render(value, self.end, &self.suffix)
    }

    pub fn final_text(&self) -> String {
        self.render(self.end)
    }
}

/// One frame of a running counter.
#[derive(Clone, Debug, PartialEq)]
pub struct CounterFrame {
    pub value: i64,
    pub text: String,
    pub done: bool,
}

#[derive(Debug)]
struct Running {
    key: ElementKey,
    spec: CounterSpec,
    /// Time since `animate`, delay included.
    clock_ms: f64,
    last_text: Option<String>,
}

/// Runs counters and remembers which elements already animated.
#[derive(Debug, Default)]
pub struct CounterAnimator {
    animated: HashSet<ElementKey>,
    running: Vec<Running>,
}

impl CounterAnimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a counter on `key`. Returns false (and does nothing) if the
    /// element already animated or is animating.
    pub fn animate(&mut self, key: ElementKey, spec: CounterSpec) -> bool {
        if !self.animated.insert(key.clone()) {
            log::debug!("counter on {key} already animated; ignoring re-trigger");
            return false;
        }
        self.running.push(Running {
            key,
            spec,
            clock_ms: 0.0,
            last_text: None,
        });
        true
    }

    /// Jump straight to the final text without animating. The element is
    /// marked as animated. Returns None if it already was.
    pub fn settle(&mut self, key: ElementKey, spec: &CounterSpec) -> Option<String> {
        if !self.animated.insert(key) {
            return None;
        }
        Some(spec.final_text())
    }

    pub fn has_animated(&self, key: &ElementKey) -> bool {
        self.animated.contains(key)
    }

    pub fn is_animating(&self) -> bool {
        !self.running.is_empty()
    }

    /// Advance every running counter by `dt_ms`. `emit` receives a frame only
    /// when the displayed text changes, and always for the final frame.
    pub fn tick(&mut self, dt_ms: f64, mut emit: impl FnMut(&ElementKey, CounterFrame)) {
        for run in self.running.iter_mut() {
            run.clock_ms += dt_ms.max(0.0);
            let elapsed = run.clock_ms - run.spec.delay_ms;
            if elapsed < 0.0 {
                continue;
            }
            let value = run.spec.value_at(elapsed);
            let done = value == run.spec.end && elapsed >= run.spec.duration_ms.max(0.0);
            let text = run.spec.render(value);
            if !done && run.last_text.as_deref() == Some(text.as_str()) {
                continue;
            }
            run.last_text = Some(text.clone());
            emit(&run.key, CounterFrame { value, text, done });
        }
        self.running
            .retain(|run| run.clock_ms - run.spec.delay_ms < run.spec.duration_ms.max(0.0));
    }

    /// Stop all running counters. Elements keep their "animated" mark.
    pub fn cancel_all(&mut self) -> usize {
        let n = self.running.len();
        self.running.clear();
        n
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_never_overshoots_and_lands_on_end() {
        let spec = CounterSpec::new(22).with_format(CounterFormat::Percentage);
        let mut last = 0;
        for i in 0..=250 {
            let v = spec.value_at(i as f64 * 8.0);
            assert!(v <= 22);
            assert!(v >= last);
            last = v;
        }
        assert_eq!(spec.value_at(2000.0), 22);
        assert_eq!(spec.value_at(1e9), 22);
    }

    #[test]
    fn zero_duration_is_immediate() {
        let spec = CounterSpec::new(7).with_duration(0.0);
        assert_eq!(spec.value_at(0.0), 7);
    }

    #[test]
    fn counts_down_without_undershoot() {
        let spec = CounterSpec::new(0).with_duration(100.0);
        let spec = CounterSpec { start: 10, ..spec };
        for i in 0..=12 {
            assert!(spec.value_at(i as f64 * 10.0) >= 0);
        }
        assert_eq!(spec.value_at(100.0), 0);
    }
}
