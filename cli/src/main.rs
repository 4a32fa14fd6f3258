//! Command-line caller of the paste lifecycle manager.

mod commands;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use paste_core::PasteCore;
use paste_core::types::{AppConfig, Config};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Store text and hand out short ids that expire by time or by view count.
#[derive(Parser, Debug)]
#[command(name = "paste")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory holding the database and config.toml.
    #[arg(long, global = true, default_value = "paste-data")]
    data_dir: PathBuf,

    /// Configuration file path. Defaults to `<data-dir>/config.toml`.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error). Overrides RUST_LOG.
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Store a new paste and print its id.
    Create(commands::CreateArgs),
    /// Consume one view of a paste and print it as JSON.
    View(commands::ViewArgs),
    /// Print the stored record without consuming a view.
    Inspect(commands::InspectArgs),
    /// Delete pastes whose TTL has elapsed.
    Sweep(commands::SweepArgs),
    /// Check that the store is reachable.
    Ping,
}

fn init_tracing(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();
}

fn load_config(cli: &Cli) -> Result<AppConfig> {
    let path = cli
        .config
        .clone()
        .unwrap_or_else(|| AppConfig::path(&cli.data_dir));

    let config = AppConfig::load(&path)
        .with_context(|| format!("failed to load config from {}", path.display()))?;

    let errors = config.validate();
    if errors.is_empty() {
        return Ok(config);
    }
    for error in &errors {
        tracing::warn!(%error, "invalid config value, using default");
    }
    Ok(config.with_defaults_for_invalid())
}

fn run(cli: Cli) -> Result<ExitCode> {
    let app_config = load_config(&cli)?;

    let core = PasteCore::open(Config {
        base_path: cli.data_dir.clone(),
        id_length: app_config.ids.length,
    })
    .with_context(|| format!("failed to open store in {}", cli.data_dir.display()))?;

    match cli.command {
        Commands::Create(args) => commands::create(&core, args),
        Commands::View(args) => commands::view(&core, args),
        Commands::Inspect(args) => commands::inspect(&core, args),
        Commands::Sweep(args) => commands::sweep(&core, args, &app_config),
        Commands::Ping => commands::ping(&core),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref());

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
