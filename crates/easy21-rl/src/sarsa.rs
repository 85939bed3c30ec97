//! SARSA(lambda) control with accumulating eligibility traces
//!
//! Updates happen after every step. The TD error of the current transition
//! is spread over every pair in the episode's trace, each with step size
//! `1 / N(s, a)`, after which all traces decay by `gamma * lambda`.

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, trace};

use easy21_core::{Easy21Error, Environment, Result};

use crate::agent::{snapshot, Agent, AgentConfig, EpisodeSummary, TrainingStats};
use crate::policy::{EpsilonGreedy, Policy};
use crate::table::{QTable, VisitCounter};
use crate::trace::EligibilityTrace;

/// SARSA(lambda) control agent
pub struct SarsaLambdaAgent<E: Environment> {
    env: E,
    config: AgentConfig,
    q_table: QTable<E::State, E::Action>,
    visits: VisitCounter<E::State, E::Action>,
    trace: EligibilityTrace<E::State, E::Action>,
    policy: EpsilonGreedy,
    stats: TrainingStats,
}

impl<E: Environment> SarsaLambdaAgent<E> {
    /// Create an agent whose policy draws from `rng`
    pub fn new(env: E, config: AgentConfig, rng: StdRng) -> Result<Self> {
        let policy = config.selector(rng)?;
        Ok(Self {
            env,
            config,
            q_table: QTable::new(),
            visits: VisitCounter::new(),
            trace: EligibilityTrace::new(),
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

    /// Trace left behind by the most recent episode
    pub fn trace(&self) -> &EligibilityTrace<E::State, E::Action> {
        &self.trace
    }

    fn choose(&mut self, state: &E::State) -> Option<E::Action> {
        let valid = self.env.valid_actions(state);
        let visits = self.visits.state(state);
        self.policy.sample(state, visits, &self.q_table, &valid)
    }

    /// Play one episode, updating the table after every step
    pub fn run_episode(&mut self) -> Result<EpisodeSummary> {
        let gamma = self.config.gamma;
        let decay = gamma * self.config.lambda;

        self.trace.clear();
        let mut state = self.env.reset();
        let mut action = self.choose(&state);
        self.visits.increment_state(state.clone());
        if let Some(a) = action {
            self.visits.increment_pair(state.clone(), a);
        }

        let mut steps = 0;
        let mut total_reward = 0.0;
        while !self.env.is_terminal(&state) {
            let current = action.ok_or_else(|| Easy21Error::EmptyActionSet(format!("{state:?}")))?;
            let (next_state, reward) = self.env.step(&state, current)?;
            steps += 1;
            total_reward += reward;

            self.visits.increment_state(next_state.clone());
            // Terminal successors offer no action and contribute Q = 0
            let next_action = self.choose(&next_state);

            self.trace.increment(state.clone(), current);
            if let Some(a) = next_action {
                self.visits.increment_pair(next_state.clone(), a);
            }

            let next_q = next_action.map_or(0.0, |a| self.q_table.get(&next_state, &a));
            let delta = reward + gamma * next_q - self.q_table.get(&state, &current);

            for ((s, a), eligibility) in self.trace.iter_mut() {
                let n = self.visits.pair(s, a);
                self.q_table
                    .add(s.clone(), *a, (1.0 / n as f64) * delta * *eligibility);
                *eligibility *= decay;
            }

            state = next_state;
            action = next_action;
        }

        self.stats.record_episode(steps, total_reward);
        trace!(steps, reward = total_reward, "sarsa episode finished");
        Ok(EpisodeSummary {
            steps,
            total_reward,
        })
    }
}

impl<E: Environment> Agent<E> for SarsaLambdaAgent<E> {
    fn name(&self) -> &str {
        "sarsa_lambda"
    }

    fn learn(&mut self, num_iterations: u64) -> Result<Policy<E::State, E::Action>> {
        info!(
            "SARSA(lambda) control: {} episodes, lambda={}, n0={}, gamma={}",
            num_iterations, self.config.lambda, self.config.n0, self.config.gamma
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
            "SARSA(lambda) control finished: {} Q entries over {} states, win rate {:.3}",
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
            "lambda": self.config.lambda,
            "epsilon": self.config.epsilon,
            "q_table_size": self.q_table.len()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use easy21_core::{Action, Card, Easy21, Easy21Config, StackedDeck, State};

    fn scripted(
        cards: Vec<Card>,
        config: AgentConfig,
    ) -> SarsaLambdaAgent<Easy21<StackedDeck>> {
        let env = Easy21::with_deck(StackedDeck::new(cards).unwrap());
        SarsaLambdaAgent::seeded(env, config, 0).unwrap()
    }

    fn greedy_config(lambda: f64) -> AgentConfig {
        AgentConfig {
            lambda,
            epsilon: Some(0.0),
            ..AgentConfig::default()
        }
    }

    #[test]
    fn test_rejects_invalid_lambda() {
        let env = Easy21::seeded(&Easy21Config::default(), 0).unwrap();
        let config = AgentConfig {
            lambda: 1.2,
            ..AgentConfig::default()
        };
        assert!(matches!(
            SarsaLambdaAgent::seeded(env, config, 0),
            Err(Easy21Error::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_single_stick_episode() {
        // Deck of black 9s: start (9, 9). Prime Stick as the greedy choice.
        let mut agent = scripted(vec![Card::black(9)], greedy_config(0.5));
        let start = State::active(9, 9);
        agent.q_table.set(start, Action::Stick, 0.0);

        let summary = agent.run_episode().unwrap();
        // Dealer: 9 -> 18, player 9 loses
        assert_eq!(summary.steps, 1);
        assert_eq!(summary.total_reward, -1.0);

        // delta = -1 + 0 - 0, N(s, a) = 1, E = 1
        assert_eq!(agent.q_table.get(&start, &Action::Stick), -1.0);
        assert_eq!(agent.visits.state(&start), 1);
        assert_eq!(agent.visits.pair(&start, &Action::Stick), 1);
        assert_eq!(agent.visits.state(&State::new(9, 18, true)), 1);
        assert_eq!(agent.trace.get(&start, &Action::Stick), 0.5);
    }

    #[test]
    fn test_trace_propagates_terminal_error_backwards() {
        // Black 5s: start (5, 5), hit -> (10, 5), stick -> dealer 5,10,15,20
        let config = AgentConfig {
            lambda: 0.5,
            epsilon: Some(0.0),
            ..AgentConfig::default()
        };
        let mut agent = scripted(vec![Card::black(5)], config);
        let s0 = State::active(5, 5);
        let s1 = State::active(10, 5);
        agent.q_table.set(s0, Action::Hit, 0.0);
        agent.q_table.set(s1, Action::Stick, 0.0);

        let summary = agent.run_episode().unwrap();
        assert_eq!(summary.steps, 2);
        assert_eq!(summary.total_reward, -1.0);

        // Step 1: delta = 0 + Q(s1, stick) - Q(s0, hit) = 0; E(s0, hit) -> 0.5
        // Step 2: delta = -1; E(s1, stick) = 1, E(s0, hit) = 0.5
        assert_eq!(agent.q_table.get(&s1, &Action::Stick), -1.0);
        assert_eq!(agent.q_table.get(&s0, &Action::Hit), -0.5);
        assert_eq!(agent.trace.get(&s0, &Action::Hit), 0.25);
        assert_eq!(agent.trace.get(&s1, &Action::Stick), 0.5);
    }

    #[test]
    fn test_discount_scales_target_and_trace_decay() {
        // Black 5s: start (5, 5), hit -> (10, 5), stick -> dealer 20, loss
        let config = AgentConfig {
            gamma: 0.5,
            lambda: 0.5,
            epsilon: Some(0.0),
            ..AgentConfig::default()
        };
        let mut agent = scripted(vec![Card::black(5)], config);
        let s0 = State::active(5, 5);
        let s1 = State::active(10, 5);
        agent.q_table.set(s0, Action::Hit, 0.0);
        agent.q_table.set(s1, Action::Stick, 0.4);

        agent.run_episode().unwrap();

        // Step 1: delta = 0 + 0.5 * 0.4 - 0 = 0.2; Q(s0, hit) = 0.2; E(s0, hit) -> 0.25
        // Step 2: delta = -1 + 0 - 0.4 = -1.4
        //   Q(s0, hit) = 0.2 - 1.4 * 0.25 = -0.15, Q(s1, stick) = 0.4 - 1.4 = -1.0
        assert!((agent.q_table.get(&s0, &Action::Hit) + 0.15).abs() < 1e-12);
        assert!((agent.q_table.get(&s1, &Action::Stick) + 1.0).abs() < 1e-12);
        assert_eq!(agent.trace.get(&s0, &Action::Hit), 0.0625);
        assert_eq!(agent.trace.get(&s1, &Action::Stick), 0.25);
    }

    #[test]
    fn test_lambda_zero_only_updates_current_pair() {
        let mut agent = scripted(vec![Card::black(5)], greedy_config(0.0));
        let s0 = State::active(5, 5);
        let s1 = State::active(10, 5);
        agent.q_table.set(s0, Action::Hit, 0.0);
        agent.q_table.set(s1, Action::Stick, 0.0);

        agent.run_episode().unwrap();
        assert_eq!(agent.q_table.get(&s1, &Action::Stick), -1.0);
        // Bootstrapped from Q(s1, stick) = 0 before the terminal update
        assert_eq!(agent.q_table.get(&s0, &Action::Hit), 0.0);
    }

    #[test]
    fn test_trace_cleared_between_episodes() {
        let mut agent = scripted(vec![Card::black(9)], greedy_config(0.9));
        let stale = State::active(3, 3);
        agent.trace.increment(stale, Action::Hit);
        agent.q_table.set(State::active(9, 9), Action::Stick, 0.0);

        agent.run_episode().unwrap();
        assert_eq!(agent.trace.get(&stale, &Action::Hit), 0.0);
        assert_eq!(agent.q_table.get(&stale, &Action::Hit), 0.0);
        assert_eq!(agent.trace.len(), 1);
    }

    #[test]
    fn test_learn_records_stats() {
        let env = Easy21::seeded(&Easy21Config::default(), 5).unwrap();
        let mut agent = SarsaLambdaAgent::seeded(env, AgentConfig::default(), 6).unwrap();
        let policy = agent.learn(300).unwrap();

        assert_eq!(agent.stats().episodes, 300);
        assert!(!agent.q_table().is_empty());
        assert_eq!(policy.q_table(), agent.q_table());
        assert_eq!(agent.params()["lambda"], 0.2);
        for ((s, a), _) in agent.trace().iter() {
            assert!(agent.visits().pair(s, a) >= 1);
        }
    }
}
