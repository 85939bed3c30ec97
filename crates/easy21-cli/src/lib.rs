//! Easy21 CLI support - configuration loading and result reporting
//!
//! The `easy21` binary is a thin layer over these modules.

// Clippy pedantic allows - these are intentional design choices
#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod report;

pub use crate::config::{Config, LoggingConfig, TrainingConfig};
pub use crate::report::{TrainingReport, ValueGrid};
