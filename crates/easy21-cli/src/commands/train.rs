//! Train a single agent

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use easy21_cli::{Config, TrainingReport, ValueGrid};
use easy21_core::Easy21;
use easy21_rl::{build_agent, Algorithm};

#[derive(Args)]
pub struct TrainArgs {
    /// Control algorithm (monte-carlo or sarsa-lambda)
    #[arg(short, long)]
    algorithm: Option<Algorithm>,

    /// Number of training episodes
    #[arg(short, long)]
    episodes: Option<u64>,

    /// Trace decay for SARSA(lambda)
    #[arg(short, long)]
    lambda: Option<f64>,

    /// Environment seed; the policy uses seed + 1
    #[arg(short, long)]
    seed: Option<u64>,

    /// Write Q entries, statistics and parameters as JSON
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print every learned Q-value
    #[arg(long)]
    show_table: bool,
}

impl TrainArgs {
    fn apply(&self, config: &mut Config) {
        if let Some(algorithm) = self.algorithm {
            config.training.algorithm = algorithm;
        }
        if let Some(episodes) = self.episodes {
            config.training.num_iterations = episodes;
        }
        if let Some(lambda) = self.lambda {
            config.agent.lambda = lambda;
        }
        if let Some(seed) = self.seed {
            config.training.seed = seed;
        }
    }
}

pub fn run(args: TrainArgs, mut config: Config) -> Result<()> {
    args.apply(&mut config);
    config.validate()?;

    let training = &config.training;
    let env = Easy21::seeded(&config.environment, training.seed)
        .context("Failed to create environment")?;
    let mut agent = build_agent(training.algorithm, env, &config.agent, config.policy_seed())
        .context("Failed to create agent")?;

    info!(
        "Training {} for {} episodes (seed {})",
        training.algorithm, training.num_iterations, training.seed
    );
    let policy = agent.learn(training.num_iterations)?;
    let stats = agent.stats();

    println!("{} after {} episodes", agent.name(), stats.episodes);
    println!("========================================");
    println!("  Steps:          {}", stats.steps);
    println!(
        "  Wins/Draws/Losses: {}/{}/{}",
        stats.wins, stats.draws, stats.losses
    );
    println!("  Win rate:       {:.3}", stats.win_rate());
    println!("  Average reward: {:.4}", stats.average_reward());
    println!(
        "  Q entries:      {} over {} states",
        policy.q_table().len(),
        policy.q_table().state_count()
    );

    let grid = ValueGrid::from_q_table(policy.q_table());
    println!("\nState values V(s) = max_a Q(s, a), dealer card by player sum:\n");
    println!("{grid}");

    if args.show_table {
        println!("{}", policy.q_table());
    }

    if let Some(path) = &args.output {
        let report = TrainingReport::new(agent.params(), stats.clone(), policy.q_table());
        report.write_json(path)?;
        println!("Results written to {}", path.display());
    }

    Ok(())
}
