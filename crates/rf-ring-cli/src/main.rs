//! Ring game command line
//!
//! Usage:
//!   rf-ring play                - Run an automated session
//!   rf-ring config              - Print the default configuration
//!   rf-ring validate <path>     - Check a configuration file

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use rf_ring_lab::{GameConfig, GameStateMachine, RandomSpinSource, SpinTiming, TimingProfile};

#[derive(Parser)]
#[command(name = "rf-ring", about = "Ring multiplier game core")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an automated session against the random reel
    Play {
        /// Number of bets to place
        #[arg(short, long, default_value_t = 100)]
        rounds: u32,
        /// Stake per bet
        #[arg(short, long, default_value_t = 1.0)]
        bet: f64,
        /// Cash out once the multiplier reaches this value
        #[arg(short, long, default_value_t = 2.0)]
        target: f64,
        /// RNG seed for a reproducible session
        #[arg(short, long)]
        seed: Option<u64>,
        /// Reel animation timing
        #[arg(short, long, value_enum, default_value = "studio")]
        profile: Profile,
        /// Configuration file (JSON or YAML)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Print the default configuration
    Config {
        /// Output format
        #[arg(short, long, value_enum, default_value = "json")]
        format: Format,
    },
    /// Load and validate a configuration file
    Validate {
        /// Path to a .json, .yaml or .yml file
        path: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Profile {
    Normal,
    Turbo,
    Studio,
}

impl From<Profile> for TimingProfile {
    fn from(profile: Profile) -> Self {
        match profile {
            Profile::Normal => TimingProfile::Normal,
            Profile::Turbo => TimingProfile::Turbo,
            Profile::Studio => TimingProfile::Studio,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Yaml,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Play {
            rounds,
            bet,
            target,
            seed,
            profile,
            config,
        } => play(rounds, bet, target, seed, profile, config.as_deref()).await,
        Commands::Config { format } => print_config(format),
        Commands::Validate { path } => validate(&path),
    }
}

async fn play(
    rounds: u32,
    bet: f64,
    target: f64,
    seed: Option<u64>,
    profile: Profile,
    config_path: Option<&Path>,
) -> Result<()> {
    if target.is_nan() || target <= 0.0 {
        bail!("--target must be positive, got {}", target);
    }

    let mut config = match config_path {
        Some(path) => GameConfig::load(path)
            .with_context(|| format!("Failed to load {}", path.display()))?,
        None => GameConfig::default(),
    };
    config.timing = SpinTiming::from_profile(profile.into());

    let mut source = RandomSpinSource::from_config(&config)?;
    if let Some(seed) = seed {
        source = source.seeded(seed);
    }
    let machine = GameStateMachine::new(config, source)?;

    let mut played = 0;
    for _ in 0..rounds {
        if !machine.place_bet(bet) {
            log::info!("[Play] Stopping after {} rounds: bet refused", played);
            break;
        }
        played += 1;
        machine.settle().await;

        if machine.current_multiplier() >= target {
            machine.cashout();
        }
    }

    // Bank whatever is left on the rings
    if machine.can_cash_out() {
        machine.cashout();
    }

    let stats = machine.stats();
    let summary = serde_json::json!({
        "rounds_requested": rounds,
        "rounds_played": played,
        "seed": seed,
        "balance": machine.balance(),
        "net": stats.net(),
        "rtp": stats.rtp(),
        "stats": stats,
        "history": machine.history(),
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn print_config(format: Format) -> Result<()> {
    let config = GameConfig::default();
    let text = match format {
        Format::Json => config.to_json()?,
        Format::Yaml => config.to_yaml()?,
    };
    println!("{}", text);
    Ok(())
}

fn validate(path: &Path) -> Result<()> {
    let config = GameConfig::load(path)
        .with_context(|| format!("Invalid configuration {}", path.display()))?;

    println!(
        "{}: OK ({} rings, void symbol {}, starting balance {:.2})",
        path.display(),
        config.rings.len(),
        config.void_symbol.symbol,
        config.starting_balance
    );
    for ring in &config.rings {
        if let Some(index) = ring.first_decrease() {
            println!(
                "  warning: ring {} ladder decreases at segment {}",
                ring.symbol, index
            );
        }
    }
    Ok(())
}
