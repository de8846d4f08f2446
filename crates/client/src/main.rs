//! Tower-scout simulation binary.
//!
//! Main entry point for running the scouting agent against a scenario.
//!
//! # Architecture
//!
//! This binary is the composition root that assembles:
//! 1. Configuration (environment, `.env`, CLI flags, optional TOML file)
//! 2. Runtime (episodes and board persistence)
//! 3. Simulated world loaded from a RON scenario
//!
//! Each episode prints one JSON summary line to stdout; logs go to stderr
//! and to a per-session file.
//!
//! # Examples
//!
//! ```bash
//! # One episode with default tuning
//! cargo run -p scout-client -- crates/client/scenarios/outpost.ron
//!
//! # Five episodes that learn from each other
//! cargo run -p scout-client -- crates/client/scenarios/outpost.ron -n 5 --persistent
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use scout_client::run_episode;
use scout_content::{ConfigLoader, ScenarioLoader};
use scout_runtime::{Runtime, RuntimeConfig};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Run the tower-scouting agent against a simulated scenario.
#[derive(Parser, Debug)]
#[command(name = "scout", version)]
struct Args {
    /// Scenario file (RON)
    scenario: PathBuf,

    /// Agent tuning file (TOML); defaults apply to missing keys
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of consecutive episodes to run
    #[arg(short = 'n', long, default_value_t = 1)]
    episodes: u32,

    /// Base seed; episode `i` uses `seed + i` (overrides SCOUT_SEED)
    #[arg(long)]
    seed: Option<u64>,

    /// Load and save boards between episodes (overrides SCOUT_PERSISTENT)
    #[arg(long)]
    persistent: bool,

    /// Directory for saved boards (overrides SCOUT_SAVE_DIR)
    #[arg(long)]
    save_dir: Option<PathBuf>,

    /// Log the final board of each episode
    #[arg(long)]
    show_board: bool,
}

fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let args = Args::parse();
    let _guard = setup_logging()?;

    let mut config = RuntimeConfig::from_env();
    if let Some(path) = &args.config {
        config.scout = ConfigLoader::load(path)?;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if args.persistent {
        config.persistent = true;
    }
    if let Some(dir) = args.save_dir.clone() {
        config.save_dir = Some(dir);
    }

    let scenario = ScenarioLoader::load(&args.scenario)?;
    tracing::info!(
        "Loaded scenario {} ({}x{}, {} units)",
        scenario.name,
        scenario.dimensions.width,
        scenario.dimensions.height,
        scenario.units.len()
    );

    let base_seed = config.seed;
    let mut runtime = Runtime::new(config).context("Failed to start runtime")?;

    for index in 0..args.episodes {
        runtime.reseed(base_seed.wrapping_add(u64::from(index)));
        let summary = run_episode(&runtime, &scenario)
            .with_context(|| format!("Episode {} failed", index + 1))?;
        println!("{}", serde_json::to_string(&summary)?);
    }

    if args.show_board && runtime.config().persistent {
        let starts: Vec<_> = scenario.starting_positions().collect();
        let episode = runtime.start_episode(scenario.dimensions, &starts)?;
        tracing::info!("Learned board[{}]:\n{}", episode.key(), episode.grid());
    }

    Ok(())
}

/// Setup logging to both stderr and file.
///
/// The returned guard flushes the file writer when dropped.
fn setup_logging() -> Result<tracing_appender::non_blocking::WorkerGuard> {
    use std::time::{SystemTime, UNIX_EPOCH};

    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or_default();
    let session_id = format!("session_{}", timestamp);

    // Create session-specific log directory
    let session_log_dir = log_dir().join(&session_id);
    std::fs::create_dir_all(&session_log_dir)?;

    // Setup file appender
    let file_appender = tracing_appender::rolling::never(&session_log_dir, "scout.log");
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    // Create env filter
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::INFO.into());

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false);
    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stderr_layer)
        .init();

    tracing::info!("Logging initialized: session={}", session_id);
    tracing::info!("Log file: {}/scout.log", session_log_dir.display());

    Ok(guard)
}

/// Get the platform-specific log directory.
///
/// - Linux: `~/.cache/tower-scout/logs` (or `$XDG_CACHE_HOME/tower-scout/logs`)
/// - macOS: `~/Library/Caches/tower-scout/logs`
/// - Fallback: `/tmp/tower-scout/logs`
fn log_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", "tower-scout")
        .map(|dirs| dirs.cache_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("/tmp/tower-scout"))
        .join("logs")
}
