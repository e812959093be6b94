//! Per-component record of the closest outgoing edge found in a round.
//!
//! Each slot pairs an atomic copy of the best squared weight, read without
//! locking by the pruning tests, with a mutex guarding the candidate itself.
//! A slot only ever moves to a strictly smaller candidate under the total
//! order `(squared weight, smaller endpoint, larger endpoint)`, so the value
//! left in a slot after a round does not depend on thread interleaving.

use std::{
    cmp::Ordering as CmpOrdering,
    sync::{
        Mutex, PoisonError,
        atomic::{AtomicU64, Ordering},
    },
};

/// A candidate edge in the mutual-reachability graph.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Candidate {
    squared: f64,
    source: usize,
    target: usize,
}

impl Candidate {
    pub(crate) fn new(squared: f64, left: usize, right: usize) -> Self {
        Self {
            squared,
            source: left.min(right),
            target: left.max(right),
        }
    }

    #[rustfmt::skip]
    pub(crate) fn squared(&self) -> f64 { self.squared }

    #[rustfmt::skip]
    pub(crate) fn source(&self) -> usize { self.source }

    #[rustfmt::skip]
    pub(crate) fn target(&self) -> usize { self.target }

    fn precedes(&self, other: &Self) -> bool {
        self.squared
            .total_cmp(&other.squared)
            .then_with(|| self.source.cmp(&other.source))
            .then_with(|| self.target.cmp(&other.target))
            == CmpOrdering::Less
    }
}

pub(crate) struct ClosestDistanceTracker {
    best: Vec<AtomicU64>,
    candidates: Vec<Mutex<Option<Candidate>>>,
}

const UNSET: u64 = f64::INFINITY.to_bits();

impl ClosestDistanceTracker {
    pub(crate) fn new(slots: usize) -> Self {
        Self {
            best: (0..slots).map(|_| AtomicU64::new(UNSET)).collect(),
            candidates: (0..slots).map(|_| Mutex::new(None)).collect(),
        }
    }

    /// Best squared weight recorded for `component`, or infinity.
    pub(crate) fn best(&self, component: usize) -> f64 {
        f64::from_bits(self.best[component].load(Ordering::Acquire))
    }

    /// Records `candidate` for `component` if it beats the current entry.
    pub(crate) fn offer(&self, component: usize, candidate: Candidate) {
        if candidate.squared > self.best(component) {
            return;
        }
        let mut slot = self.candidates[component]
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if slot.is_none_or(|current| candidate.precedes(&current)) {
            *slot = Some(candidate);
            self.best[component].store(candidate.squared.to_bits(), Ordering::Release);
        }
    }

    /// Removes and returns the candidate of `component`, resetting the slot.
    pub(crate) fn take(&mut self, component: usize) -> Option<Candidate> {
        *self.best[component].get_mut() = UNSET;
        self.candidates[component]
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}
