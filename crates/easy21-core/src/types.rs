//! State, Action, and Reward types for Easy21

use serde::{Deserialize, Serialize};

/// Reward value from environment
pub type Reward = f64;

/// Lowest valid hand total
pub const MIN_SUM: i32 = 1;

/// Highest valid hand total
pub const MAX_SUM: i32 = 21;

/// The dealer keeps drawing while below this total
pub const DEALER_STICK_THRESHOLD: i32 = 17;

/// Game state observed by the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct State {
    /// Running total of the player's signed card values
    pub player_sum: i32,

    /// Running total of the dealer's signed card values
    pub dealer_sum: i32,

    /// Whether the episode has ended
    pub terminal: bool,
}

impl State {
    /// Create a new state
    pub fn new(player_sum: i32, dealer_sum: i32, terminal: bool) -> Self {
        Self {
            player_sum,
            dealer_sum,
            terminal,
        }
    }

    /// Non-terminal state with the given sums
    pub fn active(player_sum: i32, dealer_sum: i32) -> Self {
        Self::new(player_sum, dealer_sum, false)
    }

    pub fn is_terminal(&self) -> bool {
        self.terminal
    }

    /// Whether a running total is still in play
    pub fn valid_sum(sum: i32) -> bool {
        (MIN_SUM..=MAX_SUM).contains(&sum)
    }

    /// Payout for this state once the episode is over.
    ///
    /// Non-terminal states pay nothing.
    pub fn outcome(&self) -> Reward {
        if !self.terminal {
            return 0.0;
        }
        if !Self::valid_sum(self.player_sum) {
            return -1.0;
        }
        if !Self::valid_sum(self.dealer_sum) {
            return 1.0;
        }
        match self.player_sum.cmp(&self.dealer_sum) {
            std::cmp::Ordering::Greater => 1.0,
            std::cmp::Ordering::Equal => 0.0,
            std::cmp::Ordering::Less => -1.0,
        }
    }
}

impl std::fmt::Display for State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "P: {:<3}, D: {:<3}, T: {}",
            self.player_sum,
            self.dealer_sum,
            if self.terminal { 'y' } else { 'n' }
        )
    }
}

/// Player action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Draw another card
    Hit,
    /// Stop drawing and let the dealer play out
    Stick,
}

impl Action {
    /// Every action, in index order
    pub const ALL: [Action; 2] = [Action::Hit, Action::Stick];

    /// Convert action to index for discrete action spaces
    pub fn to_index(self) -> usize {
        match self {
            Action::Hit => 0,
            Action::Stick => 1,
        }
    }

    /// Create action from index
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Number of discrete actions
    pub fn action_space_size() -> usize {
        Self::ALL.len()
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Hit => write!(f, "hit"),
            Action::Stick => write!(f, "stick"),
        }
    }
}
