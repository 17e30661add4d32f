//! Datastore collaborator trait and the fault-injecting decorator.
//!
//! `RangeStore` is what the executor talks to. Connection handling lives
//! entirely behind it: the executor only asks for counts and, after a
//! transient fault, for a reconnect.

use std::cell::Cell;

use tracing::debug;

use crate::error::StoreError;
use crate::query::Predicate;

/// A collection of interval records that can be counted two ways.
pub trait RangeStore: Send {
    /// Direct filtered count.
    fn count_matching(&self, predicate: &Predicate) -> Result<u64, StoreError>;

    /// Aggregation-style count (match then group).
    fn count_matching_grouped(&self, predicate: &Predicate) -> Result<u64, StoreError>;

    /// Drop and reacquire the underlying connection handle.
    fn reconnect(&mut self) -> Result<(), StoreError>;

    /// Short description for logs and reports.
    fn describe(&self) -> String;
}

impl<S: RangeStore + ?Sized> RangeStore for Box<S> {
    fn count_matching(&self, predicate: &Predicate) -> Result<u64, StoreError> {
        (**self).count_matching(predicate)
    }

    fn count_matching_grouped(&self, predicate: &Predicate) -> Result<u64, StoreError> {
        (**self).count_matching_grouped(predicate)
    }

    fn reconnect(&mut self) -> Result<(), StoreError> {
        (**self).reconnect()
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// Decorator that makes the next `n` counts fail with a transient fault.
///
/// Each reconnect is recorded; counts delegate to the wrapped store once the
/// injected faults are used up.
pub struct FaultInjector<S> {
    inner: S,
    pending_faults: Cell<u32>,
    reconnects: u32,
}

impl<S: RangeStore> FaultInjector<S> {
    /// Wrap `inner`, failing the next `faults` count calls.
    #[must_use]
    pub fn new(inner: S, faults: u32) -> Self {
        Self {
            inner,
            pending_faults: Cell::new(faults),
            reconnects: 0,
        }
    }

    /// Number of reconnects performed so far.
    #[must_use]
    pub fn reconnects(&self) -> u32 {
        self.reconnects
    }

    /// Faults still waiting to be injected.
    #[must_use]
    pub fn pending_faults(&self) -> u32 {
        self.pending_faults.get()
    }

    /// Unwrap the inner store.
    pub fn into_inner(self) -> S {
        self.inner
    }

    fn inject(&self) -> Result<(), StoreError> {
        let pending = self.pending_faults.get();
        if pending > 0 {
            self.pending_faults.set(pending - 1);
            debug!(remaining = pending - 1, "injecting transient fault");
            return Err(StoreError::CursorExhausted);
        }
        Ok(())
    }
}

impl<S: RangeStore> RangeStore for FaultInjector<S> {
    fn count_matching(&self, predicate: &Predicate) -> Result<u64, StoreError> {
        self.inject()?;
        self.inner.count_matching(predicate)
    }

    fn count_matching_grouped(&self, predicate: &Predicate) -> Result<u64, StoreError> {
        self.inject()?;
        self.inner.count_matching_grouped(predicate)
    }

    fn reconnect(&mut self) -> Result<(), StoreError> {
        self.reconnects += 1;
        self.inner.reconnect()
    }

    fn describe(&self) -> String {
        format!("{} (fault injection)", self.inner.describe())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory_store::MemoryStore;
    use crate::query::{IntervalRecord, Query};

    fn store() -> MemoryStore {
        MemoryStore::from_records(vec![IntervalRecord::new("1", 150, 160)])
    }

    #[test]
    fn injects_then_delegates() {
        let p = Query::new("1", 100, 200, 0).predicate();
        let mut faulty = FaultInjector::new(store(), 2);
        assert_eq!(faulty.count_matching(&p), Err(StoreError::CursorExhausted));
        assert_eq!(faulty.count_matching_grouped(&p), Err(StoreError::CursorExhausted));
        assert_eq!(faulty.count_matching(&p), Ok(1));
        assert_eq!(faulty.pending_faults(), 0);
        faulty.reconnect().unwrap();
        assert_eq!(faulty.reconnects(), 1);
    }

    #[test]
    fn boxed_store_delegates() {
        let p = Query::new("1", 100, 200, 0).predicate();
        let boxed: Box<dyn RangeStore> = Box::new(store());
        assert_eq!(boxed.count_matching(&p), Ok(1));
        assert_eq!(boxed.count_matching_grouped(&p), Ok(1));
        assert!(boxed.describe().contains("memory"));
    }
}
