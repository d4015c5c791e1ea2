use std::fs::{self, File};
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use scoreboard::services::config_loader::{LogConfig, ScoreboardConfig, load_scoreboard_config};
use scoreboard::services::contest_processor::ContestSystem;
use scoreboard::services::session::run_session;
use scoreboard::services::snapshot::write_standings_snapshot;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Replays a contest command script and prints the scoreboard replies.
#[derive(Parser, Debug)]
#[command(name = "scoreboard", version)]
struct Cli {
    /// Command script to read; stdin when omitted.
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// TOML config; `scoreboard.toml` in the working directory is used when present.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Write the final standings as JSON here, overriding the config.
    #[arg(long, value_name = "FILE")]
    snapshot: Option<PathBuf>,
}

fn init_tracing(log: &LogConfig) -> Option<WorkerGuard> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let console_layer = log.console.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(io::stderr)
            .with_target(true)
    });

    let mut file_guard = None;
    let file_layer = if log.directory.is_empty() {
        None
    } else {
        let _ = fs::create_dir_all(&log.directory);
        let file_appender = tracing_appender::rolling::daily(&log.directory, &log.file_name);
        let (file_writer, guard) = tracing_appender::non_blocking(file_appender);
        file_guard = Some(guard);
        Some(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(file_writer)
                .with_target(true),
        )
    };

    let init_result = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init();

    if let Err(err) = init_result {
        eprintln!("tracing init failed: {err}");
        return None;
    }

    file_guard
}

fn run(cli: Cli, config: ScoreboardConfig) -> Result<()> {
    let snapshot_path = cli.snapshot.or_else(|| config.snapshot_path.clone());
    let mut system = ContestSystem::new(config);

    let input: Box<dyn BufRead> = match &cli.input {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open input '{}'", path.display()))?;
            Box::new(BufReader::new(file))
        }
        None => Box::new(io::stdin().lock()),
    };

    let stdout = io::stdout();
    let summary = run_session(&mut system, input, stdout.lock())?;
    if !summary.ended {
        info!("Input ended without END");
    }

    if let Some(path) = snapshot_path {
        write_standings_snapshot(&path, &system.standings())?;
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_scoreboard_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err:#}");
            return ExitCode::FAILURE;
        }
    };

    let _log_guard = init_tracing(&config.log);
    match &config.source {
        Some(path) => info!("Loaded config from {}", path.display()),
        None => info!("No config file found, using defaults"),
    }
    info!("Starting scoreboard, penalty per wrong attempt {}", config.penalty_per_wrong_attempt);

    match run(cli, config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            eprintln!("{err:#}");
            ExitCode::FAILURE
        }
    }
}
