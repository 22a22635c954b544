//! # PyCoders
//!
//! A terminal reader for the PyCoders Weekly newsletter archive. It fetches
//! issue pages, pulls the curated links out of each section and prints them.
//!
//! ## Modes
//!
//! - **browse**: start at the latest issue and keep walking back, printing one
//!   section per issue (`pycoders browse projects`)
//! - **issue**: print every section of one issue (`pycoders issue 612`)
//! - **search**: scan every issue for links mentioning a phrase, ten issues at
//!   a time (`pycoders search asyncio`)
//!
//! ## Architecture
//!
//! 1. **CLI**: parse the mode and its argument into a [`cli::Command`]
//! 2. **Fetching**: [`fetcher::IssueFetcher`] downloads and parses issue pages
//! 3. **Extraction**: [`sections::extract`] collects a section's content links
//! 4. **Output**: [`render`] formats links for the terminal

use std::error::Error as StdError;
use std::io;
use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, error, info};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod error;
mod fetcher;
mod models;
mod modes;
mod render;
mod sections;

use cli::{Cli, Command};
use error::Error;
use fetcher::{HttpSource, IssueFetcher};
use modes::Reader;
use sections::SectionRules;

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn StdError>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_writer(io::stderr)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let command = match args.command() {
        Ok(command) => command,
        Err(e) => return Ok(report(&e)),
    };
    let settings = args.settings();

    let rules = SectionRules::new()?;
    let fetcher = IssueFetcher::new(HttpSource::new()?, settings.base_url.clone())?;
    let reader = Reader::new(fetcher, rules, settings);

    match run(&reader, command).await {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(e) => Ok(report(&e)),
    }
}

async fn run(reader: &Reader<HttpSource>, command: Command) -> Result<(), Error> {
    let mut out = io::stdout().lock();
    match command {
        Command::Browse { category } => {
            info!(%category, "Browsing issues");
            reader.browse(category, &mut out).await?;
        }
        Command::Issue { id } => {
            info!(issue = id, "Reading issue");
            reader.single_issue(id, &mut out).await?;
        }
        Command::Search { phrase } => {
            info!(%phrase, "Searching issues");
            reader.search(&phrase, &mut out).await?;
        }
    }
    Ok(())
}

fn report(e: &Error) -> ExitCode {
    if e.is_usage() {
        debug!(error = %e, "Rejected command line");
    } else {
        error!(error = %e, "Command failed");
    }
    eprintln!("{e}");
    ExitCode::FAILURE
}
