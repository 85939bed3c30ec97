//! Episode buffer for Monte Carlo control

use serde::{Deserialize, Serialize};

use easy21_core::Reward;

/// A single `(state, action, reward)` step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step<S, A> {
    pub state: S,
    pub action: A,
    pub reward: Reward,
}

/// Ordered steps of one episode, from the initial state to termination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Episode<S, A> {
    steps: Vec<Step<S, A>>,
}

impl<S, A> Default for Episode<S, A> {
    fn default() -> Self {
        Self { steps: Vec::new() }
    }
}

impl<S, A> Episode<S, A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a step
    pub fn push(&mut self, state: S, action: A, reward: Reward) {
        self.steps.push(Step {
            state,
            action,
            reward,
        });
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn steps(&self) -> &[Step<S, A>] {
        &self.steps
    }

    /// Undiscounted sum of rewards
    pub fn total_reward(&self) -> Reward {
        self.steps.iter().map(|s| s.reward).sum()
    }

    /// Reward of the final step, `0.0` for an empty episode
    pub fn final_reward(&self) -> Reward {
        self.steps.last().map_or(0.0, |s| s.reward)
    }

    /// Steps paired with their discounted return, walking backwards from the end.
    ///
    /// `G = r` for the last step and `G = gamma * G + r` for each earlier one.
    pub fn returns(&self, gamma: f64) -> Vec<(&Step<S, A>, Reward)> {
        let mut g = 0.0;
        self.steps
            .iter()
            .rev()
            .enumerate()
            .map(|(i, step)| {
                g = if i == 0 { step.reward } else { gamma * g + step.reward };
                (step, g)
            })
            .collect()
    }
}
