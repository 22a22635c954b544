//! Issue retrieval from the newsletter archive.
//!
//! # Architecture
//!
//! - [`PageSource`]: trait for "GET a URL, hand back status and body"
//! - [`HttpSource`]: the `reqwest` implementation used at runtime
//! - [`IssueFetcher`]: resolves issue numbers to parsed [`Issue`] pages and
//!   discovers the latest issue from the landing page
//!
//! # URL Pattern
//!
//! The landing page lives at `{base_url}` and issues at
//! `{base_url}issues/{id}`, e.g. `https://pycoders.com/issues/612`.

use regex::Regex;
use reqwest::{Client, StatusCode};
use scraper::{Html, Selector};
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::error::{Error, Result};
use crate::models::{Issue, IssueId};

const LATEST_PATTERN: &str = "latest";

/// A fetched page. Non-success statuses are returned, not raised.
#[derive(Debug, Clone)]
pub struct Page {
    pub status: StatusCode,
    pub body: String,
}

/// Anything that can fetch a page by URL.
///
/// Only transport failures are errors; a 404 comes back as a [`Page`].
pub trait PageSource {
    async fn get(&self, url: &Url) -> Result<Page>;
}

/// [`PageSource`] backed by a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
}

impl HttpSource {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

impl PageSource for HttpSource {
    #[instrument(level = "debug", skip_all, fields(%url))]
    async fn get(&self, url: &Url) -> Result<Page> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        let body = response.text().await?;
        debug!(%status, bytes = body.len(), "Fetched page");
        Ok(Page { status, body })
    }
}

/// Fetches issues and discovers the newest one.
#[derive(Debug)]
pub struct IssueFetcher<S> {
    source: S,
    base_url: Url,
    latest_pattern: Regex,
    anchor_selector: Selector,
}

impl<S: PageSource> IssueFetcher<S> {
    pub fn new(source: S, base_url: Url) -> Result<Self> {
        Ok(Self {
            source,
            base_url,
            latest_pattern: Regex::new(LATEST_PATTERN)?,
            anchor_selector: Selector::parse("a[href]")
                .map_err(|e| Error::Selector(e.to_string()))?,
        })
    }

    #[cfg(test)]
    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn issue_url(&self, id: IssueId) -> Result<Url> {
        Ok(self.base_url.join(&format!("issues/{id}"))?)
    }

    /// Fetch one issue with a single request.
    ///
    /// The page is parsed only on success; check [`Issue::is_available`].
    #[instrument(level = "info", skip(self))]
    pub async fn fetch_issue(&self, id: IssueId) -> Result<Issue> {
        let url = self.issue_url(id)?;
        let page = self.source.get(&url).await?;

        if !page.status.is_success() {
            warn!(%url, status = %page.status, "Issue unavailable");
            return Ok(Issue {
                id,
                status: page.status,
                document: None,
            });
        }

        let document = Html::parse_document(&page.body);
        debug!(%url, bytes = page.body.len(), "Parsed issue page");
        Ok(Issue {
            id,
            status: page.status,
            document: Some(document),
        })
    }

    /// Read the newest issue number off the landing page's "latest" link.
    #[instrument(level = "info", skip(self))]
    pub async fn latest_issue_number(&self) -> Result<IssueId> {
        let page = self.source.get(&self.base_url).await?;
        if !page.status.is_success() {
            return Err(Error::Discovery(format!(
                "landing page {} answered {}",
                self.base_url, page.status
            )));
        }

        let document = Html::parse_document(&page.body);
        let href = document
            .select(&self.anchor_selector)
            .find(|a| self.latest_pattern.is_match(&a.text().collect::<String>()))
            .and_then(|a| a.value().attr("href"))
            .ok_or_else(|| Error::Discovery("no link to the latest issue".to_string()))?;

        let id = parse_trailing_id(href)?;
        info!(latest = id, href, "Found latest issue");
        Ok(id)
    }
}

/// Parse the last path segment of `href` as an issue number.
fn parse_trailing_id(href: &str) -> Result<IssueId> {
    let segment = href.trim_end_matches('/').rsplit('/').next().unwrap_or_default();
    segment
        .parse::<IssueId>()
        .map_err(|_| Error::Discovery(format!("{href:?} does not end with an issue number")))
}
