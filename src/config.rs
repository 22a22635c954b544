//! Runtime settings and the archive's built-in constants.
//!
//! There is no configuration file: every setting has a default here and may be
//! overridden from the command line (see [`crate::cli::Cli`]).

use std::time::Duration;

use url::Url;

use crate::error::Result;
use crate::models::IssueId;

/// Landing page of the newsletter archive.
pub const BASE_URL: &str = "https://pycoders.com/";

/// Oldest issue whose page layout the extractor understands.
pub const OLDEST_ISSUE: IssueId = 339;

/// Number of issues fetched concurrently by the search mode.
pub const SEARCH_BATCH_SIZE: usize = 10;

/// Pause between two rendered issues in browse mode.
pub const POLL_DELAY: Duration = Duration::from_secs(5);

/// Settings shared by every mode, built from the command line.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Archive root; always ends with `/` so `issues/{id}` joins under it.
    pub base_url: Url,
    pub oldest_issue: IssueId,
    pub poll_delay: Duration,
    pub batch_size: usize,
    /// Stop browsing after this many issues. `None` browses until interrupted.
    pub browse_limit: Option<usize>,
}

/// Parse an archive root, appending the trailing slash `Url::join` needs to
/// keep the last path segment.
pub fn parse_base_url(raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw)?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
