//! Data models for issues, categories and links.
//!
//! - [`Issue`]: one fetched issue page, parsed only when it was available
//! - [`Category`]: the sections of an issue page the reader knows about
//! - [`Link`]: a title/URL pair pulled out of a section

use std::fmt;

use reqwest::StatusCode;
use scraper::Html;

/// Issue numbers increase by one per published edition.
pub type IssueId = u32;

/// Prefix the newsletter puts in front of event listings.
pub const EVENT_MARKER: char = '⋅';

/// A fetched issue page.
///
/// The document is only parsed when the archive answered with a success
/// status; callers check [`Issue::is_available`] before reading it.
#[derive(Debug)]
pub struct Issue {
    pub id: IssueId,
    pub status: StatusCode,
    pub document: Option<Html>,
}

impl Issue {
    pub fn is_available(&self) -> bool {
        self.status.is_success() && self.document.is_some()
    }
}

/// A section of an issue page.
///
/// `Preview` is the unnamed block of links that comes before the first
/// heading; every other variant is introduced by its own heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Preview,
    Projects,
    Articles,
    Jobs,
    Discussions,
}

impl Category {
    /// Rendering order used when a whole issue is printed.
    pub const ALL: [Category; 5] = [
        Category::Preview,
        Category::Projects,
        Category::Articles,
        Category::Jobs,
        Category::Discussions,
    ];

    /// Map a command-line argument to a category. Anything unknown, or no
    /// argument at all, means the preview.
    pub fn resolve(name: Option<&str>) -> Category {
        match name.map(|n| n.trim().to_ascii_lowercase()).as_deref() {
            Some("projects") => Category::Projects,
            Some("articles") => Category::Articles,
            Some("jobs") => Category::Jobs,
            Some("discussions") => Category::Discussions,
            _ => Category::Preview,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Category::Preview => "preview",
            Category::Projects => "projects",
            Category::Articles => "articles",
            Category::Jobs => "jobs",
            Category::Discussions => "discussions",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::Preview => "Preview",
            Category::Projects => "Projects",
            Category::Articles => "Articles",
            Category::Jobs => "Jobs",
            Category::Discussions => "Discussions",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A link listed in an issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub title: String,
    pub url: String,
}

impl Link {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
        }
    }

    /// For event listings, the title without the event marker and the
    /// whitespace around it.
    pub fn event_title(&self) -> Option<&str> {
        self.title
            .trim_start()
            .strip_prefix(EVENT_MARKER)
            .map(str::trim)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_resolve_known_names() {
        assert_eq!(Category::resolve(Some("projects")), Category::Projects);
        assert_eq!(Category::resolve(Some("Articles")), Category::Articles);
        assert_eq!(Category::resolve(Some("jobs")), Category::Jobs);
        assert_eq!(Category::resolve(Some("discussions")), Category::Discussions);
    }

    #[test]
    fn test_category_resolve_falls_back_to_preview() {
        assert_eq!(Category::resolve(None), Category::Preview);
        assert_eq!(Category::resolve(Some("events")), Category::Preview);
        assert_eq!(Category::resolve(Some("")), Category::Preview);
    }

    #[test]
    fn test_category_order() {
        let names: Vec<_> = Category::ALL.iter().map(|c| c.name()).collect();
        assert_eq!(
            names,
            vec!["preview", "projects", "articles", "jobs", "discussions"]
        );
    }

    #[test]
    fn test_event_title_strips_marker_and_whitespace() {
        let link = Link::new("⋅ Python Conf ", "https://pycoders.com/link/1/web");
        assert_eq!(link.event_title(), Some("Python Conf"));
    }

    #[test]
    fn test_plain_link_is_not_event() {
        let link = Link::new("Python 3.13 Released", "https://pycoders.com/link/2/web");
        assert_eq!(link.event_title(), None);
    }

    #[test]
    fn test_issue_without_document_is_unavailable() {
        let issue = Issue {
            id: 400,
            status: StatusCode::NOT_FOUND,
            document: None,
        };
        assert!(!issue.is_available());
    }
}
