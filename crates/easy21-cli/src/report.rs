//! Rendering and export of training results

use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use easy21_core::{Action, State};
use easy21_rl::{QEntry, QTable, TrainingStats};

const PLAYER_SUMS: std::ops::RangeInclusive<i32> = 1..=21;
const DEALER_CARDS: std::ops::RangeInclusive<i32> = 1..=10;

/// Easy21 value function `V(s) = max_a Q(s, a)` laid out dealer by player
#[derive(Debug, Clone, PartialEq)]
pub struct ValueGrid {
    /// `rows[dealer - 1][player - 1]`, `None` where nothing was learned
    rows: Vec<Vec<Option<f64>>>,
}

impl ValueGrid {
    pub fn from_q_table(q_table: &QTable<State, Action>) -> Self {
        let values = q_table.state_values();
        let rows = DEALER_CARDS
            .map(|dealer| {
                PLAYER_SUMS
                    .map(|player| values.get(&State::active(player, dealer)).copied())
                    .collect()
            })
            .collect();
        Self { rows }
    }

    pub fn get(&self, player_sum: i32, dealer_sum: i32) -> Option<f64> {
        let row = usize::try_from(dealer_sum - 1).ok()?;
        let col = usize::try_from(player_sum - 1).ok()?;
        self.rows.get(row)?.get(col).copied().flatten()
    }

    /// Number of cells with a learned value
    pub fn coverage(&self) -> usize {
        self.rows.iter().flatten().filter(|v| v.is_some()).count()
    }
}

impl fmt::Display for ValueGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>6} |", "D \\ P")?;
        for player in PLAYER_SUMS {
            write!(f, "{player:>6}")?;
        }
        writeln!(f)?;
        writeln!(f, "{}+{}", "-".repeat(7), "-".repeat(6 * PLAYER_SUMS.count()))?;

        for (dealer, row) in DEALER_CARDS.zip(&self.rows) {
            write!(f, "{dealer:>6} |")?;
            for value in row {
                match value {
                    Some(v) => write!(f, "{v:>6.2}")?,
                    None => write!(f, "{:>6}", ".")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Everything a training run produced, as written by `train --output`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingReport {
    pub params: serde_json::Value,
    pub stats: TrainingStats,
    pub entries: Vec<QEntry<State, Action>>,
}

impl TrainingReport {
    pub fn new(
        params: serde_json::Value,
        stats: TrainingStats,
        q_table: &QTable<State, Action>,
    ) -> Self {
        let mut entries = q_table.entries();
        entries.sort_by(|a, b| a.state.cmp(&b.state).then(a.action.cmp(&b.action)));
        Self {
            params,
            stats,
            entries,
        }
    }

    /// Rebuild the table from the exported entries
    pub fn q_table(&self) -> QTable<State, Action> {
        let mut table = QTable::new();
        for entry in &self.entries {
            table.set(entry.state, entry.action, entry.value);
        }
        table
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize report")?;
        std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
    }

    pub fn read_json(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&json).context("Failed to parse report")
    }
}
