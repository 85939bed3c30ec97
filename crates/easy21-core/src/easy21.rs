//! Easy21 game-rule engine
//!
//! Player and dealer each start with one black card. Every later card is
//! black (added) or red (subtracted). Totals outside `[1, 21]` are bust.
//! After the player sticks, the dealer draws until reaching at least 17.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::card::{CardSource, RandomDeck, DEFAULT_P_RED};
use crate::environment::Environment;
use crate::error::{Easy21Error, Result};
use crate::types::{Action, Reward, State, DEALER_STICK_THRESHOLD};

/// Easy21 environment configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Easy21Config {
    /// Probability that a drawn card is red
    pub p_red: f64,
}

impl Default for Easy21Config {
    fn default() -> Self {
        Self {
            p_red: DEFAULT_P_RED,
        }
    }
}

impl Easy21Config {
    pub fn validate(&self) -> Result<()> {
        Easy21Error::check_unit_interval("p_red", self.p_red)
    }
}

/// The Easy21 environment
#[derive(Debug, Clone)]
pub struct Easy21<D = RandomDeck> {
    deck: D,
}

impl Easy21<RandomDeck> {
    /// Create an environment with a seeded random deck
    pub fn seeded(config: &Easy21Config, seed: u64) -> Result<Self> {
        config.validate()?;
        Ok(Self::with_deck(RandomDeck::seeded(seed, config.p_red)?))
    }
}

impl<D: CardSource> Easy21<D> {
    /// Create an environment dealing from the given card source
    pub fn with_deck(deck: D) -> Self {
        Self { deck }
    }

    fn hit(&mut self, state: &State) -> (State, Reward) {
        let card = self.deck.draw();
        let player_sum = state.player_sum + card.signed_value();
        if State::valid_sum(player_sum) {
            trace!(%card, player_sum, "player hit");
            (State::active(player_sum, state.dealer_sum), 0.0)
        } else {
            trace!(%card, player_sum, "player bust");
            (State::new(player_sum, state.dealer_sum, true), -1.0)
        }
    }

    fn stick(&mut self, state: &State) -> (State, Reward) {
        let mut dealer_sum = state.dealer_sum;
        while State::valid_sum(dealer_sum) && dealer_sum < DEALER_STICK_THRESHOLD {
            let card = self.deck.draw();
            dealer_sum += card.signed_value();
            trace!(%card, dealer_sum, "dealer draw");
        }
        let next = State::new(state.player_sum, dealer_sum, true);
        (next, next.outcome())
    }
}

impl<D: CardSource> Environment for Easy21<D> {
    type State = State;
    type Action = Action;

    fn reset(&mut self) -> State {
        let player = self.deck.draw_black();
        let dealer = self.deck.draw_black();
        State::active(player.signed_value(), dealer.signed_value())
    }

    fn step(&mut self, state: &State, action: Action) -> Result<(State, Reward)> {
        if state.terminal {
            return Err(Easy21Error::InvalidTransition(format!(
                "cannot {action} from terminal state ({state})"
            )));
        }
        Ok(match action {
            Action::Hit => self.hit(state),
            Action::Stick => self.stick(state),
        })
    }

    fn valid_actions(&self, state: &State) -> Vec<Action> {
        if state.terminal {
            Vec::new()
        } else {
            Action::ALL.to_vec()
        }
    }

    fn is_terminal(&self, state: &State) -> bool {
        state.terminal
    }
}
