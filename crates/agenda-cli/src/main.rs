//! `agenda` — turn a Portuguese sentence into a calendar event.
//!
//! ```text
//! $ agenda --now 2024-01-10T15:00:00Z "reunião com João amanhã às 15h"
//! {"title":"Reunião com João","start":"2024-01-11T15:00:00-03:00",...}
//! ```
//!
//! The event is printed as JSON on stdout. A sentence that is not an event
//! prints `{"error": <code>, "message": ...}` and exits with status 2. Bad
//! arguments or configuration exit with status 1.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use agenda_core::{AnchorContext, ParseError, ParseOptions, Parser, DEFAULT_TIMEZONE};
use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::Parser as _;
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(clap::Parser)]
#[command(name = "agenda", version, about = "Extract a calendar event from a Portuguese sentence")]
struct Cli {
    /// The sentence to parse. Read from stdin when omitted.
    text: Vec<String>,

    /// Instant the message was received (RFC 3339). Defaults to the current time.
    #[arg(long)]
    now: Option<DateTime<Utc>>,

    /// IANA timezone the sentence refers to.
    #[arg(long, default_value = DEFAULT_TIMEZONE)]
    timezone: String,

    /// Schedule time-only messages ("reunião às 15h") on the anchor's date.
    #[arg(long)]
    time_only_today: bool,

    /// JSON file with parser options (extra categories, time-only behavior).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Pretty-print the JSON output.
    #[arg(long)]
    pretty: bool,
}

#[derive(Serialize)]
struct Rejection {
    error: &'static str,
    message: String,
}

impl From<ParseError> for Rejection {
    fn from(err: ParseError) -> Self {
        Self {
            error: err.code(),
            message: err.to_string(),
        }
    }
}

fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut options = match &cli.config {
        Some(path) => load_options(path)?,
        None => ParseOptions::default(),
    };
    if cli.time_only_today {
        options.time_only_uses_anchor_date = true;
    }
    let parser = Parser::new(options).context("Invalid parser configuration")?;

    let now = cli.now.unwrap_or_else(Utc::now);
    let anchor = AnchorContext::new(now, &cli.timezone)?;
    let text = read_text(&cli.text)?;
    debug!(%now, timezone = %cli.timezone, "parsing sentence");

    match parser.parse(&text, &anchor) {
        Ok(event) => {
            print_json(&event, cli.pretty)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            print_json(&Rejection::from(err), cli.pretty)?;
            Ok(ExitCode::from(2))
        }
    }
}

fn load_options(path: &Path) -> Result<ParseOptions> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Failed to parse config {}", path.display()))
}

fn read_text(args: &[String]) -> Result<String> {
    if !args.is_empty() {
        return Ok(args.join(" "));
    }
    let mut text = String::new();
    std::io::stdin()
        .read_to_string(&mut text)
        .context("Failed to read sentence from stdin")?;
    let text = text.trim_end_matches(['\n', '\r']).to_string();
    if text.trim().is_empty() {
        bail!("No sentence given: pass it as an argument or on stdin");
    }
    Ok(text)
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{json}");
    Ok(())
}
