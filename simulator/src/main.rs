use anyhow::Context;
use clap::Parser;
use futures::future::{abortable, Aborted};
use std::{fs, path::PathBuf};
use tracing::{info, warn};
use winfinity_execution::{arcade::GameRng, Cabinet, Economy};
use winfinity_simulator::{Config, FileStore, LocalStaking, Runner};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(short, long)]
    game: Option<String>,

    #[arg(short, long)]
    rounds: Option<u32>,

    #[arg(short, long)]
    seed: Option<u64>,

    /// Wallet file
    #[arg(short, long)]
    data: Option<PathBuf>,

    #[arg(long)]
    log_level: Option<String>,

    /// Emit logs as JSON
    #[arg(long)]
    json: bool,

    /// Tick on wall-clock time
    #[arg(long)]
    realtime: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse args
    let args = Args::parse();

    // Load config
    let mut config = match &args.config {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            serde_yaml::from_str::<Config>(&raw).context("failed to parse config")?
        }
        None => Config::default(),
    };
    if let Some(game) = args.game {
        config.game = game;
    }
    if let Some(rounds) = args.rounds {
        config.rounds = rounds;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(data) = args.data {
        config.data = data.display().to_string();
    }
    if let Some(level) = args.log_level {
        config.log_level = level;
    }
    config.log_json |= args.json;
    config.realtime |= args.realtime;
    let config = config.validate().context("invalid configuration")?;

    // Create logger
    if config.log_json {
        tracing_subscriber::fmt()
            .json()
            .with_max_level(config.log_level)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_max_level(config.log_level)
            .init();
    }

    // Assemble the arcade
    let store = FileStore::open(&config.data);
    info!(path = %store.path().display(), game = %config.game, seed = config.seed, "opening arcade");
    let economy = Economy::new(store);
    let mut rng = GameRng::new(config.seed);
    let staking = LocalStaking::new(config.reward_bps, config.fail_rate, rng.fork());
    let cabinet = Cabinet::new(config.game, rng)
        .with_options(config.options)
        .redraw_each_round(config.redraw_target);
    let mut runner = Runner::new(&config, economy, staking, cabinet);

    // Stop cleanly on ctrl-c
    let (run, handle) = abortable(runner.run());
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            handle.abort();
        }
    });
    let summary = match run.await {
        Ok(result) => result.context("run failed")?,
        Err(Aborted) => {
            warn!("interrupted");
            return Ok(());
        }
    };

    println!(
        "{}",
        serde_json::to_string_pretty(&summary).context("failed to encode summary")?
    );
    Ok(())
}
