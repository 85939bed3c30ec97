//! Sweep SARSA(lambda) over lambda and measure it against a Monte Carlo reference

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use easy21_cli::Config;
use easy21_core::{Action, Easy21, State};
use easy21_rl::{Agent, AgentConfig, MonteCarloAgent, QTable, SarsaLambdaAgent};

/// Lambdas 0.0, 0.1, ..., 1.0
const LAMBDA_STEPS: u32 = 10;

#[derive(Args)]
pub struct CompareArgs {
    /// Monte Carlo episodes for the reference table
    #[arg(short, long, default_value_t = 1_000_000)]
    reference_episodes: u64,

    /// SARSA(lambda) episodes per lambda
    #[arg(short, long, default_value_t = 10_000)]
    episodes: u64,

    /// Environment seed; policies use seed + 1
    #[arg(short, long)]
    seed: Option<u64>,
}

pub fn run(args: CompareArgs, mut config: Config) -> Result<()> {
    if let Some(seed) = args.seed {
        config.training.seed = seed;
    }
    config.validate()?;
    let seed = config.training.seed;

    info!(
        "Training Monte Carlo reference for {} episodes",
        args.reference_episodes
    );
    let env = Easy21::seeded(&config.environment, seed).context("Failed to create environment")?;
    let mut reference = MonteCarloAgent::seeded(env, config.agent.clone(), config.policy_seed())?;
    let reference = reference.learn(args.reference_episodes)?.into_q_table();

    println!(
        "SARSA(lambda) after {} episodes vs Monte Carlo after {} episodes",
        args.episodes, args.reference_episodes
    );
    println!("+--------+------------+");
    println!("| {:>6} | {:>10} |", "lambda", "MSE");
    println!("+--------+------------+");
    for step in 0..=LAMBDA_STEPS {
        let lambda = f64::from(step) / f64::from(LAMBDA_STEPS);
        let agent_config = AgentConfig {
            lambda,
            ..config.agent.clone()
        };
        let mse = sarsa_error(&config, agent_config, args.episodes, &reference)?;
        println!("| {lambda:>6.1} | {mse:>10.5} |");
    }
    println!("+--------+------------+");

    Ok(())
}

fn sarsa_error(
    config: &Config,
    agent_config: AgentConfig,
    episodes: u64,
    reference: &QTable<State, Action>,
) -> Result<f64> {
    let env = Easy21::seeded(&config.environment, config.training.seed)?;
    let mut agent = SarsaLambdaAgent::seeded(env, agent_config, config.policy_seed())?;
    let q_table = agent.learn(episodes)?.into_q_table();
    Ok(q_table.mean_squared_error(reference))
}
