//! RL Algorithm Benchmarks
//!
//! Benchmarks for the tabular control loop:
//! - Environment stepping (reset, hit, stick)
//! - Greedy lookups and epsilon-greedy selection
//! - Monte Carlo and SARSA(lambda) training episodes
//!
//! ## Hot Paths
//! 1. Easy21::step() - called on every transition
//! 2. EpsilonGreedy::sample() - called before every transition
//! 3. QTable::add() - called for every trace entry on every SARSA step

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::SeedableRng;

use easy21_core::{Action, Easy21, Easy21Config, Environment, State};
use easy21_rl::{
    Agent, AgentConfig, EpsilonGreedy, Exploration, MonteCarloAgent, QTable, SarsaLambdaAgent,
};

fn env(seed: u64) -> Easy21 {
    Easy21::seeded(&Easy21Config::default(), seed).unwrap()
}

fn populated_table() -> QTable<State, Action> {
    let mut table = QTable::new();
    for player in 1..=21 {
        for dealer in 1..=10 {
            let state = State::active(player, dealer);
            table.set(state, Action::Hit, f64::from(player - dealer) / 21.0);
            table.set(state, Action::Stick, f64::from(dealer - player) / 21.0);
        }
    }
    table
}

// ============================================================================
// Environment Benchmarks
// ============================================================================

fn bench_env_reset(c: &mut Criterion) {
    let mut easy21 = env(0);
    c.bench_function("env/reset", |b| b.iter(|| easy21.reset()));
}

fn bench_env_step(c: &mut Criterion) {
    let mut easy21 = env(1);
    let state = State::active(12, 5);

    let mut group = c.benchmark_group("env/step");
    for action in Action::ALL {
        group.bench_with_input(BenchmarkId::from_parameter(action), &action, |b, &action| {
            b.iter(|| easy21.step(black_box(&state), action))
        });
    }
    group.finish();
}

// ============================================================================
// Policy Benchmarks
// ============================================================================

fn bench_sample_greedy(c: &mut Criterion) {
    let table = populated_table();
    let state = State::active(15, 7);
    c.bench_function("q_table/sample_greedy", |b| {
        b.iter(|| table.sample_greedy(black_box(&state)))
    });
}

fn bench_epsilon_greedy(c: &mut Criterion) {
    let table = populated_table();
    let state = State::active(15, 7);

    let mut group = c.benchmark_group("policy/epsilon_greedy");
    for visits in [0u64, 100, 10_000] {
        let mut selector =
            EpsilonGreedy::new(Exploration::default(), StdRng::seed_from_u64(visits)).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(visits), &visits, |b, &visits| {
            b.iter(|| selector.sample(black_box(&state), visits, &table, &Action::ALL))
        });
    }
    group.finish();
}

fn bench_state_values(c: &mut Criterion) {
    let table = populated_table();
    c.bench_function("q_table/state_values", |b| b.iter(|| table.state_values()));
}

// ============================================================================
// Training Benchmarks
// ============================================================================

fn bench_monte_carlo_episodes(c: &mut Criterion) {
    let mut group = c.benchmark_group("monte_carlo/learn");
    for episodes in [100u64, 1_000] {
        group.throughput(Throughput::Elements(episodes));
        group.bench_with_input(
            BenchmarkId::from_parameter(episodes),
            &episodes,
            |b, &episodes| {
                b.iter(|| {
                    let mut agent =
                        MonteCarloAgent::seeded(env(2), AgentConfig::default(), 3).unwrap();
                    agent.learn(episodes).unwrap().q_table().len()
                })
            },
        );
    }
    group.finish();
}

fn bench_sarsa_episodes(c: &mut Criterion) {
    let mut group = c.benchmark_group("sarsa_lambda/learn");
    for lambda in [0.0, 0.5, 1.0] {
        let config = AgentConfig {
            lambda,
            ..AgentConfig::default()
        };
        group.throughput(Throughput::Elements(1_000));
        group.bench_with_input(BenchmarkId::from_parameter(lambda), &config, |b, config| {
            b.iter(|| {
                let mut agent = SarsaLambdaAgent::seeded(env(4), config.clone(), 5).unwrap();
                agent.learn(1_000).unwrap().q_table().len()
            })
        });
    }
    group.finish();
}

fn bench_warm_sarsa_episode(c: &mut Criterion) {
    let mut agent = SarsaLambdaAgent::seeded(env(6), AgentConfig::default(), 7).unwrap();
    agent.learn(10_000).unwrap();
    c.bench_function("sarsa_lambda/warm_episode", |b| {
        b.iter(|| agent.run_episode().unwrap())
    });
}

// ============================================================================
// Criterion Groups
// ============================================================================

criterion_group!(
    name = env_benchmarks;
    config = Criterion::default();
    targets =
        bench_env_reset,
        bench_env_step,
);

criterion_group!(
    name = policy_benchmarks;
    config = Criterion::default();
    targets =
        bench_sample_greedy,
        bench_epsilon_greedy,
        bench_state_values,
);

criterion_group!(
    name = training_benchmarks;
    config = Criterion::default().sample_size(20);
    targets =
        bench_monte_carlo_episodes,
        bench_sarsa_episodes,
        bench_warm_sarsa_episode,
);

criterion_main!(env_benchmarks, policy_benchmarks, training_benchmarks);
