//! The three ways of reading the archive.
//!
//! | Mode | Method | Network pattern |
//! |------|--------|-----------------|
//! | browse | [`Reader::browse`] | latest issue, then one at a time going back, with a pause |
//! | issue | [`Reader::single_issue`] | exactly one issue page |
//! | search | [`Reader::search`] | every issue from latest to oldest, in concurrent batches |
//!
//! Output goes to any [`Write`] so the controllers can be exercised against a
//! buffer; `main` hands them a locked stdout.

use std::io::Write;

use futures::stream::{self, StreamExt};
use itertools::Itertools;
use scraper::Html;
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};

use crate::config::Settings;
use crate::error::{Error, Result};
use crate::fetcher::{IssueFetcher, PageSource};
use crate::models::{Category, IssueId, Link};
use crate::render;
use crate::sections::{SectionRules, extract, search_links};

/// What a bounded browse session went through.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BrowseSummary {
    pub visited: Vec<IssueId>,
    pub rendered: Vec<IssueId>,
}

/// Totals for one search run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SearchSummary {
    pub batches: usize,
    pub scanned: usize,
    pub skipped: usize,
    pub matches: usize,
}

/// Drives the modes over one fetcher, one rule set and one set of settings.
#[derive(Debug)]
pub struct Reader<S> {
    fetcher: IssueFetcher<S>,
    rules: SectionRules,
    settings: Settings,
}

impl<S: PageSource> Reader<S> {
    pub fn new(fetcher: IssueFetcher<S>, rules: SectionRules, settings: Settings) -> Self {
        Self {
            fetcher,
            rules,
            settings,
        }
    }

    #[cfg(test)]
    pub fn fetcher(&self) -> &IssueFetcher<S> {
        &self.fetcher
    }

    /// Walk back from the latest issue, printing `category` for every issue
    /// that is available.
    ///
    /// Unavailable issues are skipped without a pause. Transport failures end
    /// the session. Without a browse limit this only returns on error or
    /// once the oldest supported issue has been visited; older issues are
    /// never requested.
    #[instrument(level = "info", skip(self, out))]
    pub async fn browse<W: Write>(
        &self,
        category: Category,
        out: &mut W,
    ) -> Result<BrowseSummary> {
        let latest = self.fetcher.latest_issue_number().await?;
        writeln!(out, "{}", render::latest(latest))?;

        let oldest = self.settings.oldest_issue;
        let mut summary = BrowseSummary::default();
        let mut issue = latest;
        loop {
            if issue < oldest
                || self
                    .settings
                    .browse_limit
                    .is_some_and(|limit| summary.visited.len() >= limit)
            {
                break;
            }

            writeln!(out, "{}", render::fetching(issue))?;
            let fetched = self.fetcher.fetch_issue(issue).await?;
            summary.visited.push(fetched.id);

            match fetched.document.as_ref().filter(|_| fetched.is_available()) {
                Some(document) => {
                    self.write_section(out, document, category)?;
                    summary.rendered.push(fetched.id);
                    sleep(self.settings.poll_delay).await;
                }
                None => debug!(
                    issue = fetched.id,
                    status = %fetched.status,
                    "Skipping unavailable issue"
                ),
            }

            match issue.checked_sub(1) {
                Some(next) if next > 0 => issue = next,
                _ => break,
            }
        }

        info!(
            visited = summary.visited.len(),
            rendered = summary.rendered.len(),
            "Browse finished"
        );
        Ok(summary)
    }

    /// Print every category of one issue.
    ///
    /// Issues older than the supported range are refused before any request.
    /// An issue that cannot be fetched is reported, not treated as an error.
    #[instrument(level = "info", skip(self, out))]
    pub async fn single_issue<W: Write>(&self, id: IssueId, out: &mut W) -> Result<()> {
        let oldest = self.settings.oldest_issue;
        if id < oldest {
            return Err(Error::IssueTooOld { id, oldest });
        }

        writeln!(out, "{}", render::fetching(id))?;
        let issue = match self.fetcher.fetch_issue(id).await {
            Ok(issue) => issue,
            Err(e) => {
                warn!(issue = id, error = %e, "Issue fetch failed");
                writeln!(out, "{}", render::unavailable(id, &e))?;
                return Ok(());
            }
        };

        let Some(document) = issue.document.as_ref().filter(|_| issue.is_available()) else {
            writeln!(out, "{}", render::unavailable(issue.id, issue.status))?;
            return Ok(());
        };

        for category in Category::ALL {
            self.write_section(out, document, category)?;
        }
        Ok(())
    }

    /// Look for `phrase` in the link texts of every issue from the latest
    /// down to the oldest.
    ///
    /// Issues are fetched `batch_size` at a time; hits are printed as each
    /// issue completes, so order within a batch is not fixed. A batch is fully
    /// drained before the next one starts. Failed issues are skipped.
    #[instrument(level = "info", skip(self, out))]
    pub async fn search<W: Write>(&self, phrase: &str, out: &mut W) -> Result<SearchSummary> {
        if phrase.trim().is_empty() {
            return Err(Error::MissingArgument {
                mode: "search",
                what: "a phrase",
            });
        }

        let latest = self.fetcher.latest_issue_number().await?;
        writeln!(out, "{}", render::latest(latest))?;

        let oldest = self.settings.oldest_issue;
        let batch_size = self.settings.batch_size.max(1);
        let mut summary = SearchSummary::default();

        let batches = (oldest..=latest).rev().chunks(batch_size);
        for batch in &batches {
            let ids: Vec<IssueId> = batch.collect();
            summary.batches += 1;
            debug!(batch = summary.batches, first = ids[0], size = ids.len(), "Searching batch");

            let mut scans = stream::iter(ids.iter().copied())
                .map(|id| async move { (id, self.scan_issue(id, phrase).await) })
                .buffer_unordered(ids.len());

            while let Some((id, scan)) = scans.next().await {
                match scan {
                    Ok(Some(links)) => {
                        summary.scanned += 1;
                        summary.matches += links.len();
                        for link in &links {
                            writeln!(out, "{}", render::search_hit(id, link))?;
                        }
                    }
                    Ok(None) => {
                        summary.skipped += 1;
                        debug!(issue = id, "Issue unavailable; skipped");
                    }
                    Err(e) => {
                        summary.skipped += 1;
                        debug!(issue = id, error = %e, "Issue fetch failed; skipped");
                    }
                }
            }
        }

        info!(
            batches = summary.batches,
            scanned = summary.scanned,
            skipped = summary.skipped,
            matches = summary.matches,
            "Search finished"
        );
        Ok(summary)
    }

    /// Matching links of one issue, or `None` when it is unavailable.
    async fn scan_issue(&self, id: IssueId, phrase: &str) -> Result<Option<Vec<Link>>> {
        let issue = self.fetcher.fetch_issue(id).await?;
        Ok(issue
            .document
            .as_ref()
            .filter(|_| issue.is_available())
            .map(|document| search_links(document, phrase, &self.rules)))
    }

    fn write_section<W: Write>(
        &self,
        out: &mut W,
        document: &Html,
        category: Category,
    ) -> Result<()> {
        writeln!(out, "{}", render::category_header(category))?;
        for link in extract(document, category, &self.rules) {
            writeln!(out, "{}", render::render(&link))?;
        }
        Ok(())
    }
}
