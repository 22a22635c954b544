//! Terminal formatting for links and status lines.

use std::fmt::Display;

use crossterm::style::Stylize;

use crate::models::{Category, IssueId, Link};

/// One terminal line for `link`: events get an `EVENT` tag and lose their
/// marker.
pub fn render(link: &Link) -> String {
    match link.event_title() {
        Some(title) => format!(
            "{} {}  {}",
            "EVENT".magenta().bold(),
            title.blue(),
            link.url.as_str().green()
        ),
        None => format!("{}  {}", link.title.as_str().blue(), link.url.as_str().green()),
    }
}

pub fn category_header(category: Category) -> String {
    format!("[{}]", category.label()).bold().to_string()
}

pub fn search_hit(issue: IssueId, link: &Link) -> String {
    format!("{} {}", format!("#{issue}").yellow(), render(link))
}

pub fn fetching(issue: IssueId) -> String {
    format!("Fetching issue: #{issue}").yellow().to_string()
}

pub fn latest(issue: IssueId) -> String {
    format!("Found latest issue: {issue}").yellow().to_string()
}

pub fn unavailable(issue: IssueId, reason: impl Display) -> String {
    format!("Issue #{issue} is not available ({reason})")
        .red()
        .to_string()
}
