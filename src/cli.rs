//! Command-line interface.
//!
//! The surface is `pycoders <mode> [arg]`: clap collects the mode and its
//! positional arguments, and [`Command::from_args`] turns them into a checked
//! [`Command`].
//!
//! # Examples
//!
//! ```sh
//! # Walk back through the archive, showing each issue's projects
//! pycoders browse projects
//!
//! # Everything in one issue
//! pycoders issue 612
//!
//! # Every link mentioning "asyncio", newest issues first
//! pycoders search asyncio
//! ```

use std::time::Duration;

use clap::Parser;
use url::Url;

use crate::config::{self, Settings};
use crate::error::{Error, Result};
use crate::models::{Category, IssueId};

const MODES: [&str; 3] = ["browse", "issue", "search"];

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// One of: browse, issue, search
    pub mode: String,

    /// browse: [projects|articles|discussions|jobs]; issue: <id>; search: <phrase>
    pub args: Vec<String>,

    /// Archive root
    #[arg(long, default_value = config::BASE_URL, value_parser = parse_url)]
    pub base_url: Url,

    /// Seconds to wait between issues while browsing
    #[arg(long, default_value_t = config::POLL_DELAY.as_secs())]
    pub delay_secs: u64,

    /// Issues fetched concurrently while searching
    #[arg(long, default_value_t = config::SEARCH_BATCH_SIZE)]
    pub batch_size: usize,

    /// Stop browsing after this many issues
    #[arg(long)]
    pub limit: Option<usize>,
}

fn parse_url(raw: &str) -> std::result::Result<Url, String> {
    config::parse_base_url(raw).map_err(|e| e.to_string())
}

impl Cli {
    pub fn settings(&self) -> Settings {
        Settings {
            base_url: self.base_url.clone(),
            oldest_issue: config::OLDEST_ISSUE,
            poll_delay: Duration::from_secs(self.delay_secs),
            batch_size: self.batch_size.max(1),
            browse_limit: self.limit,
        }
    }

    pub fn command(&self) -> Result<Command> {
        Command::from_args(&self.mode, &self.args)
    }
}

/// A validated mode with its argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Browse { category: Category },
    Issue { id: IssueId },
    Search { phrase: String },
}

impl Command {
    pub fn from_args(mode: &str, args: &[String]) -> Result<Command> {
        let mode = match MODES.iter().find(|m| **m == mode) {
            Some(mode) => *mode,
            None => {
                return Err(Error::InvalidMode {
                    given: mode.to_string(),
                    available: MODES.join(","),
                });
            }
        };

        if args.len() > 1 {
            return Err(Error::TooManyArguments {
                mode,
                count: args.len(),
            });
        }
        let arg = args.first().map(String::as_str);

        match mode {
            "browse" => Ok(Command::Browse {
                category: Category::resolve(arg),
            }),
            "issue" => {
                let raw = arg.ok_or(Error::MissingArgument {
                    mode,
                    what: "an issue number",
                })?;
                let id = raw
                    .trim()
                    .parse::<IssueId>()
                    .map_err(|_| Error::InvalidIssueId(raw.to_string()))?;
                Ok(Command::Issue { id })
            }
            _ => match arg.filter(|phrase| !phrase.trim().is_empty()) {
                Some(phrase) => Ok(Command::Search {
                    phrase: phrase.to_string(),
                }),
                None => Err(Error::MissingArgument {
                    mode,
                    what: "a phrase",
                }),
            },
        }
    }
}
