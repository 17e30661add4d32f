//! Round-robin strategy ordering.
//!
//! Pass `i` starts with strategy `i mod k` and continues cyclically, so over
//! `n` passes every strategy leads `n / k` times (±1) and no strategy is
//! systematically first against a cold cache.

use rangebench_core::strategy::Strategy;

/// Execution order for each pass.
#[derive(Debug, Clone)]
pub struct Rotation {
    order: Vec<Strategy>,
}

impl Rotation {
    /// Rotate over `order` (already shuffled, if shuffling was requested).
    #[must_use]
    pub fn new(order: Vec<Strategy>) -> Self {
        Self { order }
    }

    /// Base order.
    #[must_use]
    pub fn strategies(&self) -> &[Strategy] {
        &self.order
    }

    /// Strategy that runs first in `pass`.
    #[must_use]
    pub fn leader(&self, pass: u64) -> Option<Strategy> {
        self.order.get(self.offset(pass)).copied()
    }

    /// Full order for `pass`.
    #[must_use]
    pub fn order_for(&self, pass: u64) -> Vec<Strategy> {
        if self.order.is_empty() {
            return Vec::new();
        }
        let offset = self.offset(pass);
        self.order[offset..]
            .iter()
            .chain(&self.order[..offset])
            .copied()
            .collect()
    }

    #[allow(clippy::cast_possible_truncation)]
    fn offset(&self, pass: u64) -> usize {
        if self.order.is_empty() {
            return 0;
        }
        (pass % self.order.len() as u64) as usize
    }
}
