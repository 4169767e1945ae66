//! Rotating word display.
//!
//! Every interval the element fades out, swaps to the next word and fades
//! back in. A cycle that comes due while the previous one is still in flight
//! is skipped.

use vitrine_api_core::{ElementKey, WriteBatch, WriteOp};

use crate::error::MotionError;

const FADE_OUT_MS: f64 = 300.0;
const SWAP_GAP_MS: f64 = 50.0;
const SETTLE_MS: f64 = 300.0;
const TRANSITION: &str =
    "opacity 0.3s cubic-bezier(0.4, 0, 0.2, 1), transform 0.3s cubic-bezier(0.4, 0, 0.2, 1)";

#[derive(Copy, Clone, Debug, PartialEq)]
enum Phase {
    Idle,
    FadingOut { left_ms: f64 },
    Swapped { left_ms: f64 },
    Settling { left_ms: f64 },
}

#[derive(Debug)]
pub struct TextRotator {
    key: ElementKey,
    words: Vec<String>,
    index: usize,
    interval_ms: f64,
    clock_ms: f64,
    phase: Phase,
}

impl TextRotator {
    pub fn new(key: ElementKey, words: Vec<String>, interval_ms: f64) -> Result<Self, MotionError> {
        if words.is_empty() {
            return Err(MotionError::EmptyRotator);
        }
        Ok(Self {
            key,
            words,
            index: 0,
            interval_ms,
            clock_ms: 0.0,
            phase: Phase::Idle,
        })
    }

    pub fn key(&self) -> &ElementKey {
        &self.key
    }

    pub fn current_word(&self) -> &str {
        &self.words[self.index]
    }

    pub fn is_in_flight(&self) -> bool {
        self.phase != Phase::Idle
    }

    /// Show the first word.
    pub fn start(&self, batch: &mut WriteBatch) {
        batch.push(WriteOp::set_text(&self.key, self.current_word()));
    }

    /// Advance by `dt_ms`. Returns the word swapped in during this tick, if any.
    pub fn tick(&mut self, dt_ms: f64, batch: &mut WriteBatch) -> Option<String> {
        let dt_ms = dt_ms.max(0.0);
        let mut swapped = self.run_phases(dt_ms, batch);

        if self.interval_ms <= 0.0 || self.words.len() < 2 {
            return swapped;
        }
        self.clock_ms += dt_ms;
        while self.clock_ms >= self.interval_ms {
            self.clock_ms -= self.interval_ms;
            if self.is_in_flight() {
                log::debug!("rotator {} still in flight; skipping cycle", self.key);
                continue;
            }
            self.begin(batch);
            // Time past the due point belongs to the new cycle.
            if let Some(word) = self.run_phases(self.clock_ms, batch) {
                swapped = Some(word);
            }
        }
        swapped
    }

    fn begin(&mut self, batch: &mut WriteBatch) {
        self.index = (self.index + 1) % self.words.len();
        batch.push(WriteOp::set_style(&self.key, "transition", TRANSITION));
        batch.push(WriteOp::set_style(&self.key, "opacity", "0"));
        batch.push(WriteOp::set_style(&self.key, "transform", "translateY(-10px)"));
        self.phase = Phase::FadingOut {
            left_ms: FADE_OUT_MS,
        };
    }

    fn run_phases(&mut self, mut budget: f64, batch: &mut WriteBatch) -> Option<String> {
        let mut swapped = None;
        loop {
            let left = match self.phase {
                Phase::Idle => return swapped,
                Phase::FadingOut { left_ms }
                | Phase::Swapped { left_ms }
                | Phase::Settling { left_ms } => left_ms,
            };
            if budget < left {
                let left_ms = left - budget;
                self.phase = match self.phase {
                    Phase::FadingOut { .. } => Phase::FadingOut { left_ms },
                    Phase::Swapped { .. } => Phase::Swapped { left_ms },
                    _ => Phase::Settling { left_ms },
                };
                return swapped;
            }
            budget -= left;
            self.phase = match self.phase {
                Phase::FadingOut { .. } => {
                    let word = self.words[self.index].clone();
                    batch.push(WriteOp::set_text(&self.key, word.clone()));
                    batch.push(WriteOp::set_style(&self.key, "transform", "translateY(10px)"));
                    swapped = Some(word);
                    Phase::Swapped {
                        left_ms: SWAP_GAP_MS,
                    }
                }
                Phase::Swapped { .. } => {
                    batch.push(WriteOp::set_style(&self.key, "opacity", "1"));
                    batch.push(WriteOp::set_style(&self.key, "transform", "translateY(0)"));
                    Phase::Settling { left_ms: SETTLE_MS }
                }
                _ => Phase::Idle,
            };
        }
    }
}
