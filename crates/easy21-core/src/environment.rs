//! Environment contract consumed by the control agents

use std::fmt::Debug;
use std::hash::Hash;

use crate::error::Result;
use crate::types::Reward;

/// Episodic environment with a finite, discrete action set.
///
/// Implementations own their source of randomness. `step` takes the state
/// explicitly and must fail on terminal input rather than continue.
pub trait Environment {
    type State: Clone + Eq + Hash + Debug;
    type Action: Copy + Eq + Hash + Debug;

    /// Start a new episode and return its initial state
    fn reset(&mut self) -> Self::State;

    /// Apply an action, returning the successor state and the reward
    fn step(&mut self, state: &Self::State, action: Self::Action) -> Result<(Self::State, Reward)>;

    /// Actions available from a state. Empty for terminal states.
    fn valid_actions(&self, state: &Self::State) -> Vec<Self::Action>;

    fn is_terminal(&self, state: &Self::State) -> bool;
}
