//! Every-visit Monte Carlo control
//!
//! Each episode is played to termination under the epsilon-greedy policy and
//! then replayed backwards. Every occurrence of a `(state, action)` pair is
//! updated towards the return observed from that position, with step size
//! `1 / N(s, a)`.

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, trace};

use easy21_core::{Easy21Error, Environment, Result};

use crate::agent::{snapshot, Agent, AgentConfig, EpisodeSummary, TrainingStats};
use crate::episode::Episode;
use crate::policy::{EpsilonGreedy, Policy};
use crate::table::{QTable, VisitCounter};

/// Monte Carlo control agent
pub struct MonteCarloAgent<E: Environment> {
    env: E,
    config: AgentConfig,
    q_table: QTable<E::State, E::Action>,
    visits: VisitCounter<E::State, E::Action>,
    policy: EpsilonGreedy,
    stats: TrainingStats,
}

impl<E: Environment> MonteCarloAgent<E> {
    /// Create an agent whose policy draws from `rng`
    pub fn new(env: E, config: AgentConfig, rng: StdRng) -> Result<Self> {
        let policy = config.selector(rng)?;
        Ok(Self {
            env,
            config,
            q_table: QTable::new(),
            visits: VisitCounter::new(),
            policy,
            stats: TrainingStats::default(),
        })
    }

    pub fn seeded(env: E, config: AgentConfig, seed: u64) -> Result<Self> {
        Self::new(env, config, StdRng::seed_from_u64(seed))
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Play one episode without learning from it
    pub fn generate_episode(&mut self) -> Result<Episode<E::State, E::Action>> {
        let mut episode = Episode::new();
        let mut state = self.env.reset();
        while !self.env.is_terminal(&state) {
            let valid = self.env.valid_actions(&state);
            let visits = self.visits.state(&state);
            let action = self
                .policy
                .sample(&state, visits, &self.q_table, &valid)
                .ok_or_else(|| Easy21Error::EmptyActionSet(format!("{state:?}")))?;
            let (next_state, reward) = self.env.step(&state, action)?;
            episode.push(state, action, reward);
            state = next_state;
        }
        Ok(episode)
    }

    /// Apply the every-visit update for a finished episode
    pub fn update(&mut self, episode: &Episode<E::State, E::Action>) {
        for (step, g) in episode.returns(self.config.gamma) {
            let n = self.visits.increment_pair(step.state.clone(), step.action);
            self.visits.increment_state(step.state.clone());
            let q = self.q_table.get(&step.state, &step.action);
            self.q_table
                .set(step.state.clone(), step.action, q + (1.0 / n as f64) * (g - q));
        }
    }

    /// Generate one episode and learn from it
    pub fn run_episode(&mut self) -> Result<EpisodeSummary> {
        let episode = self.generate_episode()?;
        self.update(&episode);

        let summary = EpisodeSummary {
            steps: episode.len(),
            total_reward: episode.total_reward(),
        };
        self.stats.record_episode(summary.steps, summary.total_reward);
        trace!(
            steps = summary.steps,
            reward = summary.total_reward,
            "monte carlo episode finished"
        );
        Ok(summary)
    }
}

impl<E: Environment> Agent<E> for MonteCarloAgent<E> {
    fn name(&self) -> &str {
        "monte_carlo"
    }

    fn learn(&mut self, num_iterations: u64) -> Result<Policy<E::State, E::Action>> {
        info!(
            "Monte Carlo control: {} episodes, n0={}, gamma={}",
            num_iterations, self.config.n0, self.config.gamma
        );

        for episode in 1..=num_iterations {
            self.run_episode()?;
            if self.config.should_log(episode) {
                debug!(
                    "episode {}/{}: average reward {:.4}, {} Q entries",
                    episode,
                    num_iterations,
                    self.stats.average_reward(),
                    self.q_table.len()
                );
            }
        }

        info!(
            "Monte Carlo control finished: {} Q entries over {} states, win rate {:.3}",
            self.q_table.len(),
            self.q_table.state_count(),
            self.stats.win_rate()
        );

        Ok(snapshot(&self.q_table, &self.visits, &self.policy))
    }

    fn q_table(&self) -> &QTable<E::State, E::Action> {
        &self.q_table
    }

    fn visits(&self) -> &VisitCounter<E::State, E::Action> {
        &self.visits
    }

    fn stats(&self) -> &TrainingStats {
        &self.stats
    }

    fn params(&self) -> serde_json::Value {
        serde_json::json!({
            "algorithm": self.name(),
            "n0": self.config.n0,
            "gamma": self.config.gamma,
            "epsilon": self.config.epsilon,
            "q_table_size": self.q_table.len()
        })
    }
}
