//! Sparse value tables with default-zero reads
//!
//! Reads of absent keys return the default and never insert. Writes and
//! accumulations always insert-or-update.

use std::collections::HashMap;
use std::fmt::{Debug, Display};
use std::hash::Hash;
use std::ops::AddAssign;

use serde::{Deserialize, Serialize};

use easy21_core::{Easy21Error, Result};

/// Hash map that reads absent keys as `V::default()` without materializing them
#[derive(Debug, Clone)]
pub struct SparseMap<K, V> {
    entries: HashMap<K, V>,
}

impl<K: Eq + Hash, V: PartialEq> PartialEq for SparseMap<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl<K, V> Default for SparseMap<K, V> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash, V: Copy + Default + AddAssign> SparseMap<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Point read; absent keys yield the default
    pub fn get(&self, key: &K) -> V {
        self.entries.get(key).copied().unwrap_or_default()
    }

    pub fn set(&mut self, key: K, value: V) {
        self.entries.insert(key, value);
    }

    /// Accumulate into a key, starting from the default. Returns the new value.
    pub fn add(&mut self, key: K, delta: V) -> V {
        let entry = self.entries.entry(key).or_default();
        *entry += delta;
        *entry
    }

    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of materialized entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Materialized entries only
    pub fn iter(&self) -> impl Iterator<Item = (&K, V)> {
        self.entries.iter().map(|(k, v)| (k, *v))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&K, &mut V)> {
        self.entries.iter_mut()
    }
}

/// One materialized Q-value, as exported for inspection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QEntry<S, A> {
    pub state: S,
    pub action: A,
    pub value: f64,
}

/// Action-value table keyed by `(state, action)`.
///
/// Entries for a state are kept in the order they were first written, so
/// ties in [`QTable::sample_greedy`] go to the earliest materialized action.
#[derive(Debug, Clone)]
pub struct QTable<S, A> {
    store: HashMap<S, Vec<(A, f64)>>,
    len: usize,
}

impl<S, A> Default for QTable<S, A> {
    fn default() -> Self {
        Self {
            store: HashMap::new(),
            len: 0,
        }
    }
}

impl<S: Clone + Eq + Hash + Debug, A: Copy + Eq + Hash> QTable<S, A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Point read; never-written pairs are exactly `0.0`
    pub fn get(&self, state: &S, action: &A) -> f64 {
        self.store
            .get(state)
            .and_then(|actions| actions.iter().find(|(a, _)| a == action))
            .map_or(0.0, |(_, v)| *v)
    }

    pub fn set(&mut self, state: S, action: A, value: f64) {
        *self.slot(state, action) = value;
    }

    /// `Q[s, a] += delta`, materializing the pair at zero first. Returns the new value.
    pub fn add(&mut self, state: S, action: A, delta: f64) -> f64 {
        let slot = self.slot(state, action);
        *slot += delta;
        *slot
    }

    fn slot(&mut self, state: S, action: A) -> &mut f64 {
        let actions = self.store.entry(state).or_default();
        let index = match actions.iter().position(|(a, _)| *a == action) {
            Some(index) => index,
            None => {
                actions.push((action, 0.0));
                self.len += 1;
                actions.len() - 1
            }
        };
        &mut actions[index].1
    }

    pub fn contains(&self, state: &S, action: &A) -> bool {
        self.store
            .get(state)
            .is_some_and(|actions| actions.iter().any(|(a, _)| a == action))
    }

    /// Number of materialized `(state, action)` entries
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of states with at least one materialized entry
    pub fn state_count(&self) -> usize {
        self.store.len()
    }

    /// Materialized entries for one state, in first-write order
    pub fn actions(&self, state: &S) -> &[(A, f64)] {
        self.store.get(state).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Iterate over materialized entries only
    pub fn iter(&self) -> impl Iterator<Item = (&S, A, f64)> {
        self.store
            .iter()
            .flat_map(|(s, actions)| actions.iter().map(move |(a, v)| (s, *a, *v)))
    }

    /// Action maximizing Q among the materialized entries for `state`.
    ///
    /// Fails with `NotFound` when the state has no materialized entries.
    pub fn sample_greedy(&self, state: &S) -> Result<(A, f64)> {
        let mut best: Option<(A, f64)> = None;
        for &(action, value) in self.actions(state) {
            match best {
                Some((_, best_value)) if value <= best_value => {}
                _ => best = Some((action, value)),
            }
        }
        best.ok_or_else(|| Easy21Error::NotFound(format!("no Q-values for state {state:?}")))
    }

    /// `V(s) = max_a Q(s, a)` over materialized entries
    pub fn state_values(&self) -> HashMap<S, f64> {
        self.store
            .iter()
            .filter_map(|(s, actions)| {
                actions
                    .iter()
                    .map(|(_, v)| *v)
                    .reduce(f64::max)
                    .map(|v| (s.clone(), v))
            })
            .collect()
    }

    /// Mean squared difference over the union of materialized pairs.
    ///
    /// Pairs missing from one side count as `0.0` there. Two empty tables have
    /// an error of `0.0`.
    pub fn mean_squared_error(&self, other: &Self) -> f64 {
        let mut total = 0.0;
        let mut count = 0usize;
        for (s, a, v) in self.iter() {
            total += (v - other.get(s, &a)).powi(2);
            count += 1;
        }
        for (s, a, v) in other.iter() {
            if !self.contains(s, &a) {
                total += v.powi(2);
                count += 1;
            }
        }
        if count == 0 {
            0.0
        } else {
            total / count as f64
        }
    }

    /// Export materialized entries for inspection
    pub fn entries(&self) -> Vec<QEntry<S, A>> {
        self.iter()
            .map(|(state, action, value)| QEntry {
                state: state.clone(),
                action,
                value,
            })
            .collect()
    }
}

impl<S: Clone + Eq + Hash + Debug, A: Copy + Eq + Hash> PartialEq for QTable<S, A> {
    /// Mapping equality, independent of insertion order
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len
            && self
                .iter()
                .all(|(s, a, v)| other.contains(s, &a) && other.get(s, &a) == v)
    }
}

impl<S, A> Display for QTable<S, A>
where
    S: Clone + Eq + Hash + Debug + Display + Ord,
    A: Copy + Eq + Hash + Display + Ord,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut rows: Vec<_> = self.iter().collect();
        rows.sort_by(|x, y| x.0.cmp(y.0).then(x.1.cmp(&y.1)));

        writeln!(f, "| {:<40} | {:>8} |", "Q Table", "Value")?;
        writeln!(f, "+{}+{}+", "-".repeat(42), "-".repeat(10))?;
        for (s, a, v) in rows {
            writeln!(f, "| {:<40} | {:>8.3} |", format!("{s}, {a}"), v)?;
        }
        write!(f, "+{}+{}+", "-".repeat(42), "-".repeat(10))
    }
}

/// Lifetime visit counts, per state and per `(state, action)`
#[derive(Debug, Clone)]
pub struct VisitCounter<S, A> {
    states: SparseMap<S, u64>,
    pairs: SparseMap<(S, A), u64>,
}

impl<S, A> Default for VisitCounter<S, A> {
    fn default() -> Self {
        Self {
            states: SparseMap::default(),
            pairs: SparseMap::default(),
        }
    }
}

impl<S: Eq + Hash, A: Eq + Hash> PartialEq for VisitCounter<S, A> {
    fn eq(&self, other: &Self) -> bool {
        self.states == other.states && self.pairs == other.pairs
    }
}

impl<S: Clone + Eq + Hash, A: Copy + Eq + Hash> VisitCounter<S, A> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, state: &S) -> u64 {
        self.states.get(state)
    }

    pub fn pair(&self, state: &S, action: &A) -> u64 {
        self.pairs.get(&(state.clone(), *action))
    }

    /// Returns the new count
    pub fn increment_state(&mut self, state: S) -> u64 {
        self.states.add(state, 1)
    }

    /// Returns the new count
    pub fn increment_pair(&mut self, state: S, action: A) -> u64 {
        self.pairs.add((state, action), 1)
    }

    /// Number of distinct states visited
    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    /// Number of distinct `(state, action)` pairs visited
    pub fn pair_count(&self) -> usize {
        self.pairs.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use easy21_core::{Action, State};

    #[test]
    fn test_sparse_map_read_does_not_insert() {
        let map: SparseMap<u32, f64> = SparseMap::new();
        assert_eq!(map.get(&7), 0.0);
        assert!(map.is_empty());
        assert!(!map.contains(&7));
    }

    #[test]
    fn test_sparse_map_add_and_set() {
        let mut map: SparseMap<&str, u64> = SparseMap::new();
        assert_eq!(map.add("a", 1), 1);
        assert_eq!(map.add("a", 2), 3);
        map.set("b", 10);
        assert_eq!(map.get(&"b"), 10);
        assert_eq!(map.len(), 2);

        map.clear();
        assert!(map.is_empty());
        assert_eq!(map.get(&"a"), 0);
    }

    #[test]
    fn test_qtable_default_zero() {
        let table: QTable<State, Action> = QTable::new();
        let state = State::active(12, 4);
        assert_eq!(table.get(&state, &Action::Hit), 0.0);
        assert!(!table.contains(&state, &Action::Hit));
        assert!(table.is_empty());
    }

    #[test]
    fn test_qtable_write_and_accumulate() {
        let mut table = QTable::new();
        let state = State::active(12, 4);
        table.set(state, Action::Hit, 0.5);
        assert_eq!(table.add(state, Action::Hit, 0.25), 0.75);
        assert_eq!(table.add(state, Action::Stick, -1.0), -1.0);

        assert_eq!(table.len(), 2);
        assert_eq!(table.state_count(), 1);
        assert_eq!(table.get(&state, &Action::Hit), 0.75);
        assert_eq!(table.iter().count(), 2);
    }

    #[test]
    fn test_sample_greedy_unseen_state_fails() {
        let mut table = QTable::new();
        table.set(State::active(1, 1), Action::Hit, 1.0);
        let err = table.sample_greedy(&State::active(2, 2)).unwrap_err();
        assert!(matches!(err, Easy21Error::NotFound(_)));
    }

    #[test]
    fn test_sample_greedy_considers_materialized_only() {
        let mut table = QTable::new();
        let state = State::active(10, 10);
        // Only a negative entry exists; the unwritten action must not win at 0.0
        table.set(state, Action::Stick, -0.5);
        assert_eq!(table.sample_greedy(&state).unwrap(), (Action::Stick, -0.5));

        table.set(state, Action::Hit, -0.1);
        assert_eq!(table.sample_greedy(&state).unwrap(), (Action::Hit, -0.1));
    }

    #[test]
    fn test_sample_greedy_tie_goes_to_first_written() {
        let mut table = QTable::new();
        let state = State::active(5, 5);
        table.set(state, Action::Stick, 0.2);
        table.set(state, Action::Hit, 0.2);
        assert_eq!(table.sample_greedy(&state).unwrap().0, Action::Stick);
    }

    #[test]
    fn test_state_values() {
        let mut table = QTable::new();
        let a = State::active(5, 5);
        let b = State::active(6, 5);
        table.set(a, Action::Hit, 0.3);
        table.set(a, Action::Stick, -0.2);
        table.set(b, Action::Stick, -0.7);

        let values = table.state_values();
        assert_eq!(values.len(), 2);
        assert_eq!(values[&a], 0.3);
        assert_eq!(values[&b], -0.7);
    }

    #[test]
    fn test_mean_squared_error() {
        let mut left = QTable::new();
        let mut right = QTable::new();
        assert_eq!(left.mean_squared_error(&right), 0.0);

        let s = State::active(3, 3);
        left.set(s, Action::Hit, 1.0);
        right.set(s, Action::Hit, 0.5);
        right.set(s, Action::Stick, 1.0);
        // ((1.0 - 0.5)^2 + (0 - 1.0)^2) / 2
        assert_eq!(left.mean_squared_error(&right), 0.625);
        assert_eq!(right.mean_squared_error(&left), 0.625);
        assert_eq!(left.mean_squared_error(&left), 0.0);
    }

    #[test]
    fn test_qtable_equality_ignores_insertion_order() {
        let s = State::active(9, 2);
        let mut a = QTable::new();
        a.set(s, Action::Hit, 0.1);
        a.set(s, Action::Stick, 0.2);
        let mut b = QTable::new();
        b.set(s, Action::Stick, 0.2);
        b.set(s, Action::Hit, 0.1);
        assert_eq!(a, b);

        b.set(s, Action::Hit, 0.3);
        assert_ne!(a, b);
    }

    #[test]
    fn test_entries_export() {
        let mut table = QTable::new();
        table.set(State::active(4, 4), Action::Hit, 0.4);
        let entries = table.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].state, State::active(4, 4));
        assert_eq!(entries[0].action, Action::Hit);

        let json = serde_json::to_value(&entries).unwrap();
        assert_eq!(json[0]["action"], "hit");
        assert_eq!(json[0]["value"], 0.4);
    }

    #[test]
    fn test_display_sorted_rows() {
        let mut table = QTable::new();
        table.set(State::active(7, 2), Action::Stick, -0.25);
        table.set(State::active(3, 2), Action::Hit, 0.5);
        let rendered = table.to_string();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[2].contains("P: 3"));
        assert!(lines[2].contains("hit"));
        assert!(lines[2].contains("0.500"));
        assert!(lines[3].contains("-0.250"));
    }

    #[test]
    fn test_visit_counter() {
        let mut visits: VisitCounter<State, Action> = VisitCounter::new();
        let s = State::active(8, 8);
        assert_eq!(visits.state(&s), 0);
        assert_eq!(visits.pair(&s, &Action::Hit), 0);
        assert_eq!(visits.state_count(), 0);

        assert_eq!(visits.increment_state(s), 1);
        assert_eq!(visits.increment_state(s), 2);
        assert_eq!(visits.increment_pair(s, Action::Hit), 1);

        assert_eq!(visits.state(&s), 2);
        assert_eq!(visits.pair(&s, &Action::Hit), 1);
        assert_eq!(visits.pair(&s, &Action::Stick), 0);
        assert_eq!(visits.pair_count(), 1);
    }
}
