//! `skirmish`: trains learning units over seeded episodes and inspects the
//! value tables they leave behind.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use serde::de::DeserializeOwned;
use skirmish_core::{
    ActionKind, Battle, BattleConfig, FileQTableStore, QTableKey, QTableStore, Scenario, State,
    StepOutcome,
};
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser)]
#[command(name = "skirmish", author, version, about, long_about = None)]
struct Cli {
    /// Log every decision
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run training episodes and persist the learned tables
    Train(TrainArgs),
    /// Print the visited rows of a persisted table
    Show(ShowArgs),
}

#[derive(Args)]
struct TrainArgs {
    /// Scenario TOML; the built-in skirmish when omitted
    #[arg(long)]
    scenario: Option<PathBuf>,
    /// Run configuration TOML; defaults when omitted
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(short, long, default_value_t = 100)]
    episodes: u64,
    /// Seed of the first episode; episode `n` uses `seed + n`
    #[arg(short, long, default_value_t = 42)]
    seed: u64,
    #[arg(long, default_value = "tables")]
    tables: PathBuf,
    /// Write a JSON summary of the run here
    #[arg(long)]
    summary: Option<PathBuf>,
}

#[derive(Args)]
struct ShowArgs {
    #[arg(long, default_value = "tables")]
    tables: PathBuf,
    #[arg(short, long)]
    unit: String,
    #[arg(long, default_value = "5")]
    version: String,
    #[arg(long, default_value = "default")]
    run: String,
    #[arg(long, default_value_t = 0.1)]
    alpha: f64,
    #[arg(long, default_value_t = 0.6)]
    gamma: f64,
}

#[derive(Debug, Default, PartialEq, Serialize)]
struct TrainingSummary {
    episodes: u64,
    blue_wins: u64,
    red_wins: u64,
    total_turns: u64,
}

impl TrainingSummary {
    fn record(&mut self, outcome: StepOutcome, turn: u32) {
        self.episodes += 1;
        self.total_turns += u64::from(turn);
        match outcome {
            StepOutcome::BlueWins => self.blue_wins += 1,
            StepOutcome::RedWins => self.red_wins += 1,
            StepOutcome::Continue => {}
        }
    }

    fn blue_win_rate(&self) -> f64 {
        if self.episodes == 0 { 0.0 } else { self.blue_wins as f64 / self.episodes as f64 }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose { EnvFilter::new("debug") } else { EnvFilter::new("info") }
    });
    fmt().with_env_filter(filter).with_target(false).init();

    match cli.command {
        Command::Train(args) => train(&args),
        Command::Show(args) => show(&args),
    }
}

fn read_toml<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("Failed to parse {}", path.display()))
}

fn train(args: &TrainArgs) -> Result<()> {
    let scenario = match &args.scenario {
        Some(path) => read_toml(path)?,
        None => Scenario::skirmish(),
    };
    let config: BattleConfig = match &args.config {
        Some(path) => read_toml(path)?,
        None => BattleConfig::default(),
    };

    let summary = run_episodes(&scenario, &config, &args.tables, args.seed, args.episodes)?;
    println!(
        "{} episodes: Blue {} / Red {} (Blue win rate {:.3}), {} turns total",
        summary.episodes,
        summary.blue_wins,
        summary.red_wins,
        summary.blue_win_rate(),
        summary.total_turns
    );

    if let Some(path) = &args.summary {
        let json = serde_json::to_string_pretty(&summary)
            .with_context(|| "Failed to serialize training summary")?;
        fs::write(path, json)
            .with_context(|| format!("Failed to write summary to {}", path.display()))?;
    }
    Ok(())
}

fn run_episodes(
    scenario: &Scenario,
    config: &BattleConfig,
    tables: &Path,
    seed: u64,
    episodes: u64,
) -> Result<TrainingSummary> {
    tracing::info!(episodes, seed, tables = %tables.display(), "training started");
    let mut summary = TrainingSummary::default();
    for episode in 0..episodes {
        let episode_seed = seed.wrapping_add(episode);
        let store = FileQTableStore::new(tables);
        let mut battle =
            Battle::from_scenario(scenario, config.clone(), Box::new(store), episode_seed)
                .with_context(|| format!("Failed to set up episode {episode}"))?;
        let outcome = battle
            .run_to_end()
            .with_context(|| format!("Episode {episode} (seed {episode_seed}) failed"))?;
        println!(
            "episode {episode:>5} seed {episode_seed:>20} result {:>2} turns {:>3}",
            outcome.signal(),
            battle.turn()
        );
        summary.record(outcome, battle.turn());
    }
    Ok(summary)
}

fn show(args: &ShowArgs) -> Result<()> {
    let key = QTableKey {
        unit_name: args.unit.clone(),
        version: args.version.clone(),
        run_name: args.run.clone(),
        alpha: args.alpha,
        gamma: args.gamma,
    };
    let store = FileQTableStore::new(&args.tables);
    if !store.path_for(&key).exists() {
        anyhow::bail!("No table at {}", store.path_for(&key).display());
    }
    let table =
        store.load(&key).with_context(|| format!("Failed to load table {}", key.file_name()))?;

    println!("threats health {:>10} {:>10} {:>10}", "wait", "item", "attack");
    for threats in 0..10 {
        for health in 0..10 {
            let row = table.row(State::new(threats, health));
            if row.iter().all(|value| *value == 0.0) {
                continue;
            }
            println!(
                "{threats:>7} {health:>6} {:>10.4} {:>10.4} {:>10.4}",
                row[ActionKind::Wait.index()],
                row[ActionKind::Item.index()],
                row[ActionKind::Attack.index()]
            );
        }
    }
    Ok(())
}
