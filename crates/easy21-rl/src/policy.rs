//! Epsilon-greedy action selection
//!
//! Exploration is driven either by a visit-count schedule
//! `epsilon = N0 / (N0 + N(s))` or by a fixed epsilon. Greedy lookups that
//! find no materialized values fall back to a uniform draw over the valid
//! actions.

use std::fmt::Debug;
use std::hash::Hash;

use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

use easy21_core::{Easy21Error, Result};

use crate::table::{QTable, VisitCounter};

/// Default exploration scale
pub const DEFAULT_N0: f64 = 100.0;

/// Source of greedy actions for a state
pub trait ActionValues<S, A> {
    /// Best known `(action, value)` for `state`, or `NotFound` if nothing is known
    fn sample_greedy(&self, state: &S) -> Result<(A, f64)>;
}

impl<S: Clone + Eq + Hash + Debug, A: Copy + Eq + Hash> ActionValues<S, A> for QTable<S, A> {
    fn sample_greedy(&self, state: &S) -> Result<(A, f64)> {
        QTable::sample_greedy(self, state)
    }
}

/// How epsilon is derived for a state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Exploration {
    /// `epsilon = n0 / (n0 + visits(state))`
    VisitCount { n0: f64 },
    /// Constant epsilon regardless of visits
    Fixed(f64),
}

impl Default for Exploration {
    fn default() -> Self {
        Exploration::VisitCount { n0: DEFAULT_N0 }
    }
}

impl Exploration {
    pub fn validate(&self) -> Result<()> {
        match *self {
            Exploration::VisitCount { n0 } => {
                if n0.is_finite() && n0 > 0.0 {
                    Ok(())
                } else {
                    Err(Easy21Error::InvalidConfiguration(format!(
                        "n0 must be a positive finite number, got {n0}"
                    )))
                }
            }
            Exploration::Fixed(epsilon) => Easy21Error::check_unit_interval("epsilon", epsilon),
        }
    }

    /// Exploration probability for a state visited `visits` times
    pub fn epsilon(&self, visits: u64) -> f64 {
        match *self {
            Exploration::VisitCount { n0 } => n0 / (n0 + visits as f64),
            Exploration::Fixed(epsilon) => epsilon,
        }
    }
}

/// Epsilon-greedy selector owning its random stream
#[derive(Debug, Clone)]
pub struct EpsilonGreedy {
    exploration: Exploration,
    rng: StdRng,
}

impl EpsilonGreedy {
    pub fn new(exploration: Exploration, rng: StdRng) -> Result<Self> {
        exploration.validate()?;
        Ok(Self { exploration, rng })
    }

    pub fn exploration(&self) -> Exploration {
        self.exploration
    }

    pub fn epsilon(&self, visits: u64) -> f64 {
        self.exploration.epsilon(visits)
    }

    /// Choose an action for `state`.
    ///
    /// Returns `None` without consuming randomness when `valid` is empty.
    pub fn sample<S, A, Q>(&mut self, state: &S, visits: u64, values: &Q, valid: &[A]) -> Option<A>
    where
        A: Copy,
        Q: ActionValues<S, A> + ?Sized,
    {
        if valid.is_empty() {
            return None;
        }

        let epsilon = self.epsilon(visits);
        if self.rng.gen::<f64>() < epsilon {
            return Some(self.uniform(valid));
        }

        match values.sample_greedy(state) {
            Ok((action, _)) => Some(action),
            Err(_) => Some(self.uniform(valid)),
        }
    }

    fn uniform<A: Copy>(&mut self, valid: &[A]) -> A {
        valid[self.rng.gen_range(0..valid.len())]
    }
}

/// Snapshot of a learned policy: the Q-table, the visit counts that drive
/// exploration, and the selector.
#[derive(Debug, Clone)]
pub struct Policy<S, A> {
    q_table: QTable<S, A>,
    visits: VisitCounter<S, A>,
    selector: EpsilonGreedy,
}

impl<S: Clone + Eq + Hash + Debug, A: Copy + Eq + Hash> Policy<S, A> {
    pub fn new(q_table: QTable<S, A>, visits: VisitCounter<S, A>, selector: EpsilonGreedy) -> Self {
        Self {
            q_table,
            visits,
            selector,
        }
    }

    /// `Q(state, action)`
    pub fn value(&self, state: &S, action: &A) -> f64 {
        self.q_table.get(state, action)
    }

    /// Exploitation-only action, if anything is known about `state`
    pub fn greedy_action(&self, state: &S) -> Option<A> {
        self.q_table.sample_greedy(state).ok().map(|(a, _)| a)
    }

    /// Current exploration probability at `state`
    pub fn epsilon(&self, state: &S) -> f64 {
        self.selector.epsilon(self.visits.state(state))
    }

    /// Epsilon-greedy action at `state`
    pub fn sample(&mut self, state: &S, valid: &[A]) -> Option<A> {
        let visits = self.visits.state(state);
        self.selector.sample(state, visits, &self.q_table, valid)
    }

    pub fn q_table(&self) -> &QTable<S, A> {
        &self.q_table
    }

    pub fn visits(&self) -> &VisitCounter<S, A> {
        &self.visits
    }

    pub fn into_q_table(self) -> QTable<S, A> {
        self.q_table
    }
}
