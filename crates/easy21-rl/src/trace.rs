//! Eligibility traces for SARSA(lambda)
//!
//! Sparse per-episode memory of recently visited `(state, action)` pairs.
//! A visit adds 1.0 to the pair's trace; every TD update decays all traces
//! by `gamma * lambda`. Traces are cleared at the start of each episode.

use std::hash::Hash;

use crate::table::SparseMap;

/// Sparse eligibility trace storage
#[derive(Debug, Clone)]
pub struct EligibilityTrace<S, A> {
    traces: SparseMap<(S, A), f64>,
}

impl<S, A> Default for EligibilityTrace<S, A> {
    fn default() -> Self {
        Self {
            traces: SparseMap::default(),
        }
    }
}

impl<S: Clone + Eq + Hash, A: Copy + Eq + Hash> EligibilityTrace<S, A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Trace for a pair; `0.0` if not visited this episode
    pub fn get(&self, state: &S, action: &A) -> f64 {
        self.traces.get(&(state.clone(), *action))
    }

    /// Record a visit. Returns the new trace value.
    pub fn increment(&mut self, state: S, action: A) -> f64 {
        self.traces.add((state, action), 1.0)
    }

    /// Multiply every trace by `factor`
    pub fn decay(&mut self, factor: f64) {
        for (_, trace) in self.traces.iter_mut() {
            *trace *= factor;
        }
    }

    /// Drop all traces
    pub fn clear(&mut self) {
        self.traces.clear();
    }

    pub fn len(&self) -> usize {
        self.traces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.traces.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&(S, A), f64)> {
        self.traces.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&(S, A), &mut f64)> {
        self.traces.iter_mut()
    }
}
