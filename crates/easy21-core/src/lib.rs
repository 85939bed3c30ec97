//! Easy21 Core - Card game rules, environment contract, and shared types
//!
//! This crate provides the game-rule engine and the environment interface
//! consumed by the tabular control agents in `easy21-rl`.

// Clippy pedantic allows - these are intentional design choices
#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::module_name_repetitions)]

pub mod card;
pub mod easy21;
pub mod environment;
pub mod error;
pub mod types;

pub use card::{Card, CardSource, Color, RandomDeck, StackedDeck};
pub use easy21::{Easy21, Easy21Config};
pub use environment::Environment;
pub use error::{Easy21Error, Result};
pub use types::{Action, Reward, State};
