//! Agent trait, shared configuration, and training statistics

use std::fmt::Debug;
use std::hash::Hash;
use std::str::FromStr;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use easy21_core::{Easy21Error, Environment, Result, Reward};

use crate::montecarlo::MonteCarloAgent;
use crate::policy::{EpsilonGreedy, Exploration, Policy, DEFAULT_N0};
use crate::sarsa::SarsaLambdaAgent;
use crate::table::{QTable, VisitCounter};

/// Learning parameters shared by the control agents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Exploration scale for `epsilon = n0 / (n0 + N(s))`
    pub n0: f64,

    /// Discount factor
    pub gamma: f64,

    /// Trace decay (SARSA(lambda) only)
    pub lambda: f64,

    /// Fixed epsilon overriding the visit-count schedule
    #[serde(skip_serializing_if = "Option::is_none")]
    pub epsilon: Option<f64>,

    /// Episodes between progress log lines; 0 disables them
    pub log_interval: u64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            n0: DEFAULT_N0,
            gamma: 1.0,
            lambda: 0.2,
            epsilon: None,
            log_interval: 100_000,
        }
    }
}

impl AgentConfig {
    pub fn validate(&self) -> Result<()> {
        Easy21Error::check_unit_interval("gamma", self.gamma)?;
        Easy21Error::check_unit_interval("lambda", self.lambda)?;
        self.exploration().validate()
    }

    /// Exploration schedule described by this config
    pub fn exploration(&self) -> Exploration {
        match self.epsilon {
            Some(epsilon) => Exploration::Fixed(epsilon),
            None => Exploration::VisitCount { n0: self.n0 },
        }
    }

    /// Validate and build the epsilon-greedy selector
    pub fn selector(&self, rng: StdRng) -> Result<EpsilonGreedy> {
        self.validate()?;
        EpsilonGreedy::new(self.exploration(), rng)
    }

    pub(crate) fn should_log(&self, episode: u64) -> bool {
        self.log_interval > 0 && episode % self.log_interval == 0
    }
}

/// Running statistics over a training run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingStats {
    pub episodes: u64,
    pub steps: u64,
    pub wins: u64,
    pub draws: u64,
    pub losses: u64,
    pub total_reward: f64,
}

impl TrainingStats {
    /// Record a finished episode by its length and undiscounted return
    pub fn record_episode(&mut self, steps: usize, episode_return: Reward) {
        self.episodes += 1;
        self.steps += steps as u64;
        self.total_reward += episode_return;
        if episode_return > 0.0 {
            self.wins += 1;
        } else if episode_return < 0.0 {
            self.losses += 1;
        } else {
            self.draws += 1;
        }
    }

    pub fn average_reward(&self) -> f64 {
        if self.episodes > 0 {
            self.total_reward / self.episodes as f64
        } else {
            0.0
        }
    }

    pub fn win_rate(&self) -> f64 {
        if self.episodes > 0 {
            self.wins as f64 / self.episodes as f64
        } else {
            0.0
        }
    }
}

/// Outcome of a single training episode
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpisodeSummary {
    pub steps: usize,
    pub total_reward: Reward,
}

/// Tabular control agent trained against an owned environment
pub trait Agent<E: Environment> {
    /// Algorithm name
    fn name(&self) -> &str;

    /// Run `num_iterations` training episodes and return the resulting policy
    fn learn(&mut self, num_iterations: u64) -> Result<Policy<E::State, E::Action>>;

    fn q_table(&self) -> &QTable<E::State, E::Action>;

    fn visits(&self) -> &VisitCounter<E::State, E::Action>;

    fn stats(&self) -> &TrainingStats;

    /// Parameters as JSON, for reporting
    fn params(&self) -> serde_json::Value;
}

/// Available control algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Algorithm {
    MonteCarlo,
    SarsaLambda,
}

impl Algorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::MonteCarlo => "monte-carlo",
            Algorithm::SarsaLambda => "sarsa-lambda",
        }
    }
}

impl std::fmt::Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = Easy21Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "monte-carlo" | "mc" => Ok(Algorithm::MonteCarlo),
            "sarsa-lambda" | "sarsa" => Ok(Algorithm::SarsaLambda),
            other => Err(Easy21Error::InvalidConfiguration(format!(
                "unknown algorithm: {other}"
            ))),
        }
    }
}

/// Build an agent for `algorithm`, seeding its policy stream from `seed`
pub fn build_agent<E>(
    algorithm: Algorithm,
    env: E,
    config: &AgentConfig,
    seed: u64,
) -> Result<Box<dyn Agent<E>>>
where
    E: Environment + 'static,
{
    let rng = StdRng::seed_from_u64(seed);
    let agent: Box<dyn Agent<E>> = match algorithm {
        Algorithm::MonteCarlo => Box::new(MonteCarloAgent::new(env, config.clone(), rng)?),
        Algorithm::SarsaLambda => Box::new(SarsaLambdaAgent::new(env, config.clone(), rng)?),
    };
    Ok(agent)
}

pub(crate) fn snapshot<S, A>(
    q_table: &QTable<S, A>,
    visits: &VisitCounter<S, A>,
    selector: &EpsilonGreedy,
) -> Policy<S, A>
where
    S: Clone + Eq + Hash + Debug,
    A: Copy + Eq + Hash,
{
    Policy::new(q_table.clone(), visits.clone(), selector.clone())
}
