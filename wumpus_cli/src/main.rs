use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};
use wumpus_core::{
    agent::LogicalAgent,
    config::{ExperimentConfig, WorldConfig},
    environment::{EpisodeEnd, WumpusWorld, load_world_from_string},
    episode::{run_episode_with, run_experiments},
};

#[derive(Parser, Debug)]
#[command(name = "wumpus")]
#[command(version, about = "Knowledge-based Wumpus World agent", long_about = None)]
struct Cli {
    /// Log every decision
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Play a single episode and print the world after every step
    Run {
        /// Map file to load instead of generating a world
        #[arg(short, long, value_name = "MAP_FILE")]
        map: Option<PathBuf>,

        #[command(flatten)]
        world: WorldArgs,

        /// Step budget for the episode
        #[arg(long, default_value_t = 100)]
        max_steps: usize,
    },

    /// Play many episodes on generated worlds and report statistics
    Experiment {
        /// JSON experiment configuration; command-line flags are ignored when given
        #[arg(short, long, value_name = "CONFIG_FILE")]
        config: Option<PathBuf>,

        #[command(flatten)]
        world: WorldArgs,

        /// Number of episodes
        #[arg(short = 'n', long, default_value_t = 100)]
        episodes: usize,

        /// Step budget per episode
        #[arg(long, default_value_t = 100)]
        max_steps: usize,

        /// Print statistics as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug)]
struct WorldArgs {
    /// Grid width
    #[arg(long, default_value_t = 4)]
    width: usize,

    /// Grid height
    #[arg(long, default_value_t = 4)]
    height: usize,

    /// Chance that a cell holds a pit
    #[arg(long, default_value_t = 0.1)]
    pit_probability: f64,

    /// Seed for reproducible worlds
    #[arg(long)]
    seed: Option<u64>,
}

impl From<WorldArgs> for WorldConfig {
    fn from(args: WorldArgs) -> Self {
        WorldConfig {
            width: args.width,
            height: args.height,
            pit_probability: args.pit_probability,
            seed: args.seed,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    fmt().with_env_filter(filter).with_target(false).init();

    match cli.command {
        Commands::Run {
            map,
            world,
            max_steps,
        } => run(map.as_deref(), world.into(), max_steps),
        Commands::Experiment {
            config,
            world,
            episodes,
            max_steps,
            json,
        } => {
            let config = match config {
                Some(path) => load_config(&path)?,
                None => ExperimentConfig {
                    world: world.into(),
                    episodes,
                    max_steps,
                },
            };
            experiment(&config, json)
        }
    }
}

fn load_config(path: &Path) -> Result<ExperimentConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Invalid config file {}", path.display()))
}

fn load_world(map: Option<&Path>, config: &WorldConfig) -> Result<WumpusWorld> {
    match map {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read map file {}", path.display()))?;
            load_world_from_string(&text).context("Failed to load map")
        }
        None => WumpusWorld::random(config).context("Failed to generate world"),
    }
}

/// Plays one episode, showing the world after each action.
fn run(map: Option<&Path>, config: WorldConfig, max_steps: usize) -> Result<()> {
    // Pin the layout so the episode replays the world printed below.
    let mut world = WumpusWorld::from_layout(load_world(map, &config)?.layout().clone());
    let dims = world.dimensions();
    let mut agent = LogicalAgent::new(dims.width, dims.height);

    println!("=== Starting Episode ===\n{world}");
    let result = run_episode_with(&mut agent, &mut world, max_steps, |action, world| {
        println!("Action: {action:?}\n{world}");
    });

    println!("=== Episode Complete ===");
    match result.end {
        Some(EpisodeEnd::EscapedWithGold) => info!("VICTORY! Escaped with gold!"),
        Some(EpisodeEnd::EscapedWithoutGold) => info!("Escaped without gold."),
        Some(reason) => warn!("DEATH: {reason:?}"),
        None => warn!(max_steps, "Timeout."),
    }
    info!(score = result.score, steps = result.steps, "Final Score: {}", result.score);
    Ok(())
}

fn experiment(config: &ExperimentConfig, json: bool) -> Result<()> {
    config.validate().context("Invalid experiment configuration")?;
    if config.episodes == 0 {
        bail!("At least one episode is required");
    }

    let mut world = WumpusWorld::random(&config.world)?;
    let mut agent = LogicalAgent::new(config.world.width, config.world.height);
    let stats = run_experiments(&mut agent, &mut world, config.episodes, config.max_steps);

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("=== Results ===");
    println!("Episodes: {}", stats.episodes);
    println!("Wins: {} ({:.1}%)", stats.wins, stats.win_rate * 100.0);
    println!("Deaths: {} ({:.1}%)", stats.deaths, stats.death_rate * 100.0);
    println!("Escapes (no gold): {}", stats.escapes);
    println!("Timeouts: {}", stats.timeouts);
    println!("Average Score: {:.1}", stats.average_score);
    println!("Average Steps: {:.1}", stats.average_steps);

    Ok(())
}
