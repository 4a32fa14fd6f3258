//! Subcommand implementations.

use anyhow::{Context, Result, bail};
use clap::Args;
use paste_core::types::{AppConfig, PasteRequest, SweepConfig, Timestamp};
use paste_core::{PasteCore, PasteError};
use std::io::Read;
use std::process::ExitCode;
use tracing::info;

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Paste content. Read from stdin when omitted.
    text: Option<String>,

    /// Seconds until the paste expires.
    #[arg(long)]
    ttl: Option<i64>,

    /// Number of times the paste may be viewed.
    #[arg(long)]
    max_views: Option<i64>,
}

#[derive(Args, Debug)]
pub struct ViewArgs {
    id: String,
}

#[derive(Args, Debug)]
pub struct InspectArgs {
    id: String,
}

#[derive(Args, Debug)]
pub struct SweepArgs {
    /// Only sweep if the configured interval has elapsed since the last sweep.
    #[arg(long)]
    if_due: bool,
}

pub fn create(core: &PasteCore, args: CreateArgs) -> Result<ExitCode> {
    let content = match args.text {
        Some(text) => text,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read paste from stdin")?;
            buf
        }
    };

    // Limits go through the same validation as any other caller's request.
    let request = PasteRequest {
        content: content.into(),
        ttl_seconds: args.ttl.into(),
        max_views: args.max_views.into(),
    };

    match core.create(request, Timestamp::now()) {
        Ok(id) => {
            println!("{id}");
            Ok(ExitCode::SUCCESS)
        }
        Err(
            e @ (PasteError::InvalidContent | PasteError::InvalidTtl | PasteError::InvalidMaxViews),
        ) => {
            eprintln!("invalid paste: {e}");
            Ok(ExitCode::from(2))
        }
        Err(e) => Err(e).context("failed to create paste"),
    }
}

pub fn view(core: &PasteCore, args: ViewArgs) -> Result<ExitCode> {
    match core.access(&args.id, Timestamp::now()) {
        Ok(view) => {
            println!("{}", serde_json::to_string_pretty(&view)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(PasteError::NotFound) => {
            eprintln!("not found");
            Ok(ExitCode::FAILURE)
        }
        Err(e) => Err(e).context("failed to read paste"),
    }
}

pub fn inspect(core: &PasteCore, args: InspectArgs) -> Result<ExitCode> {
    let Some(record) = core.peek(&args.id)? else {
        eprintln!("not found");
        return Ok(ExitCode::FAILURE);
    };
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(ExitCode::SUCCESS)
}

pub fn sweep(core: &PasteCore, args: SweepArgs, config: &AppConfig) -> Result<ExitCode> {
    let now = Timestamp::now();

    let outcome = if args.if_due {
        let sweep_config = SweepConfig::from(&config.maintenance);
        match core.maintenance(now, sweep_config.interval)? {
            Some(outcome) => outcome,
            None => {
                info!("sweep not due yet");
                return Ok(ExitCode::SUCCESS);
            }
        }
    } else {
        core.sweep(now)?
    };

    println!("removed {} expired paste(s)", outcome.removed.len());
    Ok(ExitCode::SUCCESS)
}

pub fn ping(core: &PasteCore) -> Result<ExitCode> {
    if let Err(e) = core.ping() {
        bail!("store unreachable: {e}");
    }
    println!("ok");
    Ok(ExitCode::SUCCESS)
}
