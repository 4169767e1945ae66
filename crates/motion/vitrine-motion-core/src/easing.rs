//! Easing curves used by counters.
//!
//! All curves map progress `p` in [0, 1] to [0, 1], are monotonic and hit both
//! endpoints exactly. Input outside [0, 1] is clamped.

use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    Linear,
    /// `1 - (1-p)^3`
    EaseOutCubic,
    /// `1 - (1-p)^4`
    #[default]
    EaseOutQuart,
}

impl Easing {
    #[inline]
    pub fn apply(self, p: f64) -> f64 {
        let p = p.clamp(0.0, 1.0);
        match self {
            Easing::Linear => p,
            Easing::EaseOutCubic => 1.0 - (1.0 - p).powi(3),
            Easing::EaseOutQuart => 1.0 - (1.0 - p).powi(4),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_are_exact() {
        for e in [Easing::Linear, Easing::EaseOutCubic, Easing::EaseOutQuart] {
            assert_eq!(e.apply(0.0), 0.0);
            assert_eq!(e.apply(1.0), 1.0);
            assert_eq!(e.apply(1.7), 1.0);
            assert_eq!(e.apply(-0.3), 0.0);
        }
    }

    #[test]
    fn ease_out_curves_lead_linear() {
        let p = 0.5;
        assert!((Easing::EaseOutCubic.apply(p) - 0.875).abs() < 1e-12);
        assert!((Easing::EaseOutQuart.apply(p) - 0.9375).abs() < 1e-12);
        assert!(Easing::EaseOutQuart.apply(p) > Easing::EaseOutCubic.apply(p));
    }

    #[test]
    fn monotonic() {
        for e in [Easing::Linear, Easing::EaseOutCubic, Easing::EaseOutQuart] {
            let mut last = 0.0;
            for i in 0..=100 {
                let v = e.apply(i as f64 / 100.0);
                assert!(v >= last, "{e:?} not monotonic at {i}");
                last = v;
            }
        }
    }
}
