//! Easy21 RL - Tabular control algorithms
//!
//! This crate provides sparse value tables, an epsilon-greedy policy driven
//! by visit counts, and the Monte Carlo and SARSA(lambda) control agents.

// Clippy pedantic allows - these are intentional design choices
#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::float_cmp)]
#![allow(clippy::similar_names)]
#![allow(clippy::module_name_repetitions)]

pub mod agent;
pub mod episode;
pub mod montecarlo;
pub mod policy;
pub mod sarsa;
pub mod table;
pub mod trace;

pub use agent::{build_agent, Agent, AgentConfig, Algorithm, EpisodeSummary, TrainingStats};
pub use episode::{Episode, Step};
pub use montecarlo::MonteCarloAgent;
pub use policy::{ActionValues, EpsilonGreedy, Exploration, Policy};
pub use sarsa::SarsaLambdaAgent;
pub use table::{QEntry, QTable, SparseMap, VisitCounter};
pub use trace::EligibilityTrace;
