//! Writes held back until a later tick (staggered reveals).

use vitrine_api_core::{WriteBatch, WriteOp};

#[derive(Debug)]
struct Pending {
    due_ms: f64,
    seq: u64,
    op: WriteOp,
}

/// Time-ordered queue of delayed writes against the engine clock.
#[derive(Debug, Default)]
pub struct DelayedWrites {
    now_ms: f64,
    seq: u64,
    pending: Vec<Pending>,
}

impl DelayedWrites {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    /// Queue `op` to run `delay_ms` from now. Non-positive delays go out on
    /// the next release.
    pub fn schedule(&mut self, delay_ms: f64, op: WriteOp) {
        self.seq += 1;
        self.pending.push(Pending {
            due_ms: self.now_ms + delay_ms.max(0.0),
            seq: self.seq,
            op,
        });
    }

    /// Advance the clock and move every due write into `batch`, earliest first.
    /// Writes due at the same instant keep their scheduling order.
    pub fn release(&mut self, dt_ms: f64, batch: &mut WriteBatch) -> usize {
        self.now_ms += dt_ms.max(0.0);
        let now = self.now_ms;
        let (mut due, rest): (Vec<_>, Vec<_>) =
            std::mem::take(&mut self.pending).into_iter().partition(|p| p.due_ms <= now);
        self.pending = rest;
        due.sort_by(|a, b| a.due_ms.total_cmp(&b.due_ms).then(a.seq.cmp(&b.seq)));
        let n = due.len();
        batch.extend(due.into_iter().map(|p| p.op));
        n
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clear(&mut self) -> usize {
        let n = self.pending.len();
        self.pending.clear();
        n
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vitrine_api_core::ElementKey;

    #[test]
    fn releases_in_due_order() {
        let mut q = DelayedWrites::new();
        let a = ElementKey::new("a");
        let b = ElementKey::new("b");
        q.schedule(200.0, WriteOp::add_class(&b, "animate-in"));
        q.schedule(0.0, WriteOp::add_class(&a, "animate-in"));
        let mut batch = WriteBatch::new();
        assert_eq!(q.release(16.0, &mut batch), 1);
        assert_eq!(batch.iter().next().map(|op| op.target.as_str()), Some("a"));
        assert_eq!(q.release(150.0, &mut batch), 0);
        assert_eq!(q.release(50.0, &mut batch), 1);
        assert!(q.is_empty());
    }
}
