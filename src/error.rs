//! Error taxonomy for the reader.
//!
//! Usage errors are reported and turn into a non-zero exit status. Discovery
//! failures are fatal for the modes that need the latest issue id. A page that
//! answers with a non-success status is *not* an error: it is carried as data
//! on [`crate::models::Issue`] and each mode decides what to do with it.

use thiserror::Error;

use crate::models::IssueId;

/// Everything that can go wrong while reading the archive.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid option: {given}. Available options: {available}")]
    InvalidMode { given: String, available: String },

    #[error("Missing argument: `{mode}` requires {what}")]
    MissingArgument {
        mode: &'static str,
        what: &'static str,
    },

    #[error("Too many arguments for `{mode}`: expected at most one, got {count}")]
    TooManyArguments { mode: &'static str, count: usize },

    #[error("Invalid issue number: {0:?} is not a positive integer")]
    InvalidIssueId(String),

    #[error("Issue #{id} is not available: the oldest supported issue is #{oldest}")]
    IssueTooOld { id: IssueId, oldest: IssueId },

    #[error("Could not determine the latest issue: {0}")]
    Discovery(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Invalid selector: {0}")]
    Selector(String),

    #[error("Failed to write output: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True for mistakes in the command line rather than in the archive.
    pub fn is_usage(&self) -> bool {
        matches!(
            self,
            Error::InvalidMode { .. }
                | Error::MissingArgument { .. }
                | Error::TooManyArguments { .. }
                | Error::InvalidIssueId(_)
                | Error::IssueTooOld { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
