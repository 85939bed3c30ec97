//! Cards and card sources

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::{Easy21Error, Result};

/// Smallest card face value
pub const MIN_CARD_VALUE: i32 = 1;

/// Largest card face value
pub const MAX_CARD_VALUE: i32 = 10;

/// Default probability of drawing a red card
pub const DEFAULT_P_RED: f64 = 1.0 / 3.0;

/// Card color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    /// Subtracts its value from a running total
    Red,
    /// Adds its value to a running total
    Black,
}

/// A single card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    pub value: i32,
    pub color: Color,
}

impl Card {
    pub fn new(value: i32, color: Color) -> Self {
        Self { value, color }
    }

    pub fn red(value: i32) -> Self {
        Self::new(value, Color::Red)
    }

    pub fn black(value: i32) -> Self {
        Self::new(value, Color::Black)
    }

    /// Contribution of this card to a running total
    pub fn signed_value(&self) -> i32 {
        match self.color {
            Color::Black => self.value,
            Color::Red => -self.value,
        }
    }
}

impl std::fmt::Display for Card {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.color {
            Color::Black => write!(f, "black {}", self.value),
            Color::Red => write!(f, "red {}", self.value),
        }
    }
}

/// Source of cards for the environment
pub trait CardSource {
    /// Draw a card with a randomly chosen color
    fn draw(&mut self) -> Card;

    /// Draw a card that is always black
    fn draw_black(&mut self) -> Card;
}

/// Infinite deck with uniform values and a biased color draw
#[derive(Debug, Clone)]
pub struct RandomDeck {
    rng: StdRng,
    p_red: f64,
}

impl RandomDeck {
    /// Create a deck from an owned generator.
    ///
    /// Fails when `p_red` is outside `[0, 1]`.
    pub fn new(rng: StdRng, p_red: f64) -> Result<Self> {
        Easy21Error::check_unit_interval("p_red", p_red)?;
        Ok(Self { rng, p_red })
    }

    /// Create a deck seeded from a fixed value
    pub fn seeded(seed: u64, p_red: f64) -> Result<Self> {
        Self::new(StdRng::seed_from_u64(seed), p_red)
    }

    fn draw_value(&mut self) -> i32 {
        self.rng.gen_range(MIN_CARD_VALUE..=MAX_CARD_VALUE)
    }
}

impl CardSource for RandomDeck {
    fn draw(&mut self) -> Card {
        let value = self.draw_value();
        let color = if self.rng.gen_bool(self.p_red) {
            Color::Red
        } else {
            Color::Black
        };
        Card::new(value, color)
    }

    fn draw_black(&mut self) -> Card {
        Card::black(self.draw_value())
    }
}

/// Scripted deck that deals a fixed sequence of cards, cycling when exhausted.
///
/// `draw_black` deals the next scripted value with its color forced to black.
#[derive(Debug, Clone)]
pub struct StackedDeck {
    cards: VecDeque<Card>,
}

impl StackedDeck {
    pub fn new(cards: impl IntoIterator<Item = Card>) -> Result<Self> {
        let cards: VecDeque<Card> = cards.into_iter().collect();
        if cards.is_empty() {
            return Err(Easy21Error::InvalidConfiguration(
                "stacked deck needs at least one card".to_string(),
            ));
        }
        if let Some(card) = cards
            .iter()
            .find(|c| !(MIN_CARD_VALUE..=MAX_CARD_VALUE).contains(&c.value))
        {
            return Err(Easy21Error::InvalidConfiguration(format!(
                "card value out of range: {card}"
            )));
        }
        Ok(Self { cards })
    }

    fn next_card(&mut self) -> Card {
        // Non-empty by construction
        let card = self.cards[0];
        self.cards.rotate_left(1);
        card
    }
}

impl CardSource for StackedDeck {
    fn draw(&mut self) -> Card {
        self.next_card()
    }

    fn draw_black(&mut self) -> Card {
        Card::black(self.next_card().value)
    }
}
