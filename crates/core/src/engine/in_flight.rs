//! In-flight operation tracking.

use std::sync::{Mutex, MutexGuard, PoisonError};

use rustc_hash::FxHashSet;

use crate::products::ProductId;

/// Whether an operation is waiting on the inventory service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OperationState {
    /// Nothing outstanding
    #[default]
    Idle,

    /// A request is outstanding
    Pending,
}

/// What an outstanding operation is holding.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OperationKey {
    /// A reservation for one product
    Product(ProductId),

    /// A checkout (commit and refresh)
    Checkout,

    /// A reload of the snapshot, held by loads and checkouts alike
    Refresh,
}

/// Registry of outstanding operations.
#[derive(Debug, Default)]
pub struct InFlight {
    pending: Mutex<FxHashSet<OperationKey>>,
}

impl InFlight {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    fn pending(&self) -> MutexGuard<'_, FxHashSet<OperationKey>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current state of an operation.
    pub fn state(&self, key: &OperationKey) -> OperationState {
        if self.pending().contains(key) {
            OperationState::Pending
        } else {
            OperationState::Idle
        }
    }

    /// Mark an operation as pending.
    ///
    /// Returns `None` if it already is. The operation goes back to idle when
    /// the returned guard is dropped.
    pub fn try_begin(&self, key: OperationKey) -> Option<PendingGuard<'_>> {
        if !self.pending().insert(key.clone()) {
            return None;
        }

        Some(PendingGuard {
            registry: self,
            key,
        })
    }
}

/// Keeps an operation pending until dropped.
#[derive(Debug)]
pub struct PendingGuard<'a> {
    registry: &'a InFlight,
    key: OperationKey,
}

impl PendingGuard<'_> {
    /// The operation this guard holds.
    pub fn key(&self) -> &OperationKey {
        &self.key
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.registry.pending().remove(&self.key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_begin_is_refused_until_guard_drops() {
        let in_flight = InFlight::new();
        let key = OperationKey::Product(ProductId::from("1"));

        let guard = in_flight.try_begin(key.clone());

        assert!(guard.is_some());
        assert_eq!(in_flight.state(&key), OperationState::Pending);
        assert!(in_flight.try_begin(key.clone()).is_none());

        drop(guard);

        assert_eq!(in_flight.state(&key), OperationState::Idle);
        assert!(in_flight.try_begin(key).is_some());
    }

    #[test]
    fn keys_are_independent() {
        let in_flight = InFlight::new();

        let _first = in_flight.try_begin(OperationKey::Product(ProductId::from("1")));

        assert!(
            in_flight
                .try_begin(OperationKey::Product(ProductId::from("2")))
                .is_some()
        );
        assert!(in_flight.try_begin(OperationKey::Checkout).is_some());
    }
}
