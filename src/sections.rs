//! Section extraction for issue pages.
//!
//! Issue pages are loosely structured: a run of preview links, then one `<h2>`
//! per section followed by that section's links, with navigation and footer
//! links mixed in. Extraction works in two steps:
//!
//! 1. The document is flattened into an [`Outline`]: headings and anchors in
//!    document order, each anchor tagged with its nearest preceding heading.
//! 2. A category picks its boundary heading and collects the anchors that
//!    belong to it, keeping only genuine content links (link-like `href` and
//!    one of the accepted colours in `style`).
//!
//! Everything here is a pure function over a borrowed [`Html`].

use regex::{Regex, RegexBuilder};
use scraper::{Html, Selector};
use tracing::{debug, instrument};

use crate::error::{Error, Result};
use crate::models::{Category, Link};

const HEADING_TAG: &str = "h2";
const OUTLINE_SELECTOR: &str = "h2, a";
const LINK_HREF_PATTERN: &str = "link";
const PRIMARY_COLOR: &str = "#AA0000";
const SECONDARY_COLOR: &str = "#1155CC";

const CATEGORY_PATTERNS: [(Category, &str); 4] = [
    (Category::Projects, "project"),
    (Category::Articles, "article"),
    (Category::Jobs, "job"),
    (Category::Discussions, "discussion"),
];

/// The category table and content-link filter.
///
/// Built once at startup and handed to [`extract`] by reference.
#[derive(Debug, Clone)]
pub struct SectionRules {
    outline_selector: Selector,
    heading_tag: &'static str,
    categories: Vec<(Category, Regex)>,
    href_pattern: Regex,
    /// Lowercased colour tokens; a content link carries at least one.
    colors: Vec<String>,
}

impl SectionRules {
    /// Rules for the PyCoders Weekly issue layout.
    pub fn new() -> Result<Self> {
        let outline_selector =
            Selector::parse(OUTLINE_SELECTOR).map_err(|e| Error::Selector(e.to_string()))?;

        let categories = CATEGORY_PATTERNS
            .iter()
            .map(|&(category, pattern)| case_insensitive(pattern).map(|re| (category, re)))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            outline_selector,
            heading_tag: HEADING_TAG,
            categories,
            href_pattern: Regex::new(LINK_HREF_PATTERN)?,
            colors: vec![
                PRIMARY_COLOR.to_lowercase(),
                SECONDARY_COLOR.to_lowercase(),
            ],
        })
    }

    /// Heading pattern for a named category; `None` for the preview.
    pub fn pattern(&self, category: Category) -> Option<&Regex> {
        self.categories
            .iter()
            .find(|(c, _)| *c == category)
            .map(|(_, re)| re)
    }

    /// True when an anchor's attributes mark it as newsletter content rather
    /// than navigation or decoration.
    pub fn is_content_link(&self, href: Option<&str>, style: Option<&str>) -> bool {
        let Some(href) = href else {
            return false;
        };
        if !self.href_pattern.is_match(href) {
            return false;
        }
        let style = style.unwrap_or_default().to_lowercase();
        self.colors.iter().any(|color| style.contains(color.as_str()))
    }
}

fn case_insensitive(pattern: &str) -> Result<Regex> {
    Ok(RegexBuilder::new(pattern).case_insensitive(true).build()?)
}

/// An anchor as seen by the extractor.
#[derive(Debug, Clone)]
pub struct Anchor {
    pub text: String,
    pub href: Option<String>,
    pub style: Option<String>,
    /// Index into [`Outline::headings`] of the nearest preceding heading.
    pub heading: Option<usize>,
}

/// Headings and anchors of a document, in document order.
#[derive(Debug, Clone, Default)]
pub struct Outline {
    pub headings: Vec<String>,
    pub anchors: Vec<Anchor>,
}

impl Outline {
    /// Flatten `document` into headings and anchors.
    ///
    /// An anchor nested inside a heading belongs to that heading.
    pub fn build(document: &Html, rules: &SectionRules) -> Self {
        let mut outline = Outline::default();

        for element in document.select(&rules.outline_selector) {
            let text = normalize_text(element.text());
            if element.value().name() == rules.heading_tag {
                outline.headings.push(text);
                continue;
            }
            outline.anchors.push(Anchor {
                text,
                href: element.value().attr("href").map(str::to_string),
                style: element.value().attr("style").map(str::to_string),
                heading: outline.headings.len().checked_sub(1),
            });
        }

        outline
    }

    /// Index of the heading that opens `category`'s section.
    ///
    /// For the preview this is the first heading of the page: the preview is
    /// everything that precedes it.
    pub fn boundary(&self, category: Category, rules: &SectionRules) -> Option<usize> {
        match rules.pattern(category) {
            Some(pattern) => self.headings.iter().position(|h| pattern.is_match(h)),
            None if self.headings.is_empty() => None,
            None => Some(0),
        }
    }

    /// Anchors that fall inside `category`'s section, before filtering.
    pub fn section_anchors(&self, category: Category, rules: &SectionRules) -> Vec<&Anchor> {
        let Some(boundary) = self.boundary(category, rules) else {
            return Vec::new();
        };

        if category == Category::Preview {
            // Scanning back from the first heading never crosses another one.
            return self
                .anchors
                .iter()
                .take_while(|anchor| anchor.heading.is_none())
                .collect();
        }

        self.anchors
            .iter()
            .skip_while(|anchor| anchor.heading.is_none_or(|h| h < boundary))
            .take_while(|anchor| anchor.heading == Some(boundary))
            .collect()
    }
}

fn normalize_text<'a>(chunks: impl Iterator<Item = &'a str>) -> String {
    chunks
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Links listed under `category` in `document`, in document order.
///
/// A page without the category's heading yields no links.
#[instrument(level = "debug", skip_all, fields(%category))]
pub fn extract(document: &Html, category: Category, rules: &SectionRules) -> Vec<Link> {
    let outline = Outline::build(document, rules);
    let links: Vec<Link> = outline
        .section_anchors(category, rules)
        .into_iter()
        .filter(|anchor| rules.is_content_link(anchor.href.as_deref(), anchor.style.as_deref()))
        .filter_map(|anchor| {
            anchor
                .href
                .as_ref()
                .map(|href| Link::new(anchor.text.clone(), href.clone()))
        })
        .collect();

    debug!(
        headings = outline.headings.len(),
        anchors = outline.anchors.len(),
        count = links.len(),
        "Extracted section links"
    );
    links
}

/// Every link in `document` whose text contains `phrase`, ignoring case.
///
/// The whole page is scanned: no section scoping and no colour filter.
pub fn search_links(document: &Html, phrase: &str, rules: &SectionRules) -> Vec<Link> {
    let needle = phrase.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }

    Outline::build(document, rules)
        .anchors
        .into_iter()
        .filter(|anchor| anchor.text.to_lowercase().contains(&needle))
        .filter_map(|anchor| anchor.href.map(|href| Link::new(anchor.text, href)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const ISSUE_PAGE: &str = r##"
    <html><body>
      <a href="https://pycoders.com/">PyCoders Weekly</a>
      <p><a href="https://pycoders.com/link/100/web" style="color: #AA0000;">Preview One</a></p>
      <p><a href="https://pycoders.com/link/101/web" style="COLOR: #1155cc">Preview Two</a></p>
      <p><a href="https://pycoders.com/link/102/web" style="color: #999999">Sponsor Banner</a></p>

      <h2>Articles &amp; Tutorials</h2>
      <p><a href="https://pycoders.com/link/200/web" style="color:#aa0000">Understanding
         Async   Python</a></p>
      <p><a href="https://pycoders.com/link/201/web" style="color:#AA0000">Typing Tips</a></p>
      <p><a href="https://example.com/about" style="color:#AA0000">Not A Tracked Link</a></p>

      <h2>Discussions</h2>
      <p><a href="https://pycoders.com/link/300/web" style="color:#AA0000">Why Python?</a></p>

      <h2>Python Jobs</h2>
      <p><a href="https://pycoders.com/link/400/web" style="color:#AA0000">Senior Python Dev</a></p>

      <h2>Events</h2>
      <p><a href="https://pycoders.com/link/500/web" style="color:#AA0000">⋅ PyCon US</a></p>

      <h2>Projects &amp; Code</h2>
      <p><a href="https://pycoders.com/link/600/web" style="color:#AA0000">httpx</a></p>
      <p><a href="https://pycoders.com/link/601/web" style="color:#AA0000">rich</a></p>
      <a href="https://pycoders.com/unsubscribe">Unsubscribe</a>
    </body></html>
    "##;

    fn titles(links: &[Link]) -> Vec<&str> {
        links.iter().map(|l| l.title.as_str()).collect()
    }

    fn rules() -> SectionRules {
        SectionRules::new().unwrap()
    }

    #[test]
    fn test_preview_takes_links_before_first_heading() {
        let doc = Html::parse_document(ISSUE_PAGE);
        let links = extract(&doc, Category::Preview, &rules());
        assert_eq!(titles(&links), vec!["Preview One", "Preview Two"]);
    }

    #[test]
    fn test_named_section_stops_at_next_heading() {
        let doc = Html::parse_document(ISSUE_PAGE);
        let links = extract(&doc, Category::Articles, &rules());
        assert_eq!(titles(&links), vec!["Understanding Async Python", "Typing Tips"]);
        assert_eq!(links[0].url, "https://pycoders.com/link/200/web");
    }

    #[test]
    fn test_each_named_category() {
        let doc = Html::parse_document(ISSUE_PAGE);
        let rules = rules();
        assert_eq!(
            titles(&extract(&doc, Category::Discussions, &rules)),
            vec!["Why Python?"]
        );
        assert_eq!(
            titles(&extract(&doc, Category::Jobs, &rules)),
            vec!["Senior Python Dev"]
        );
        assert_eq!(
            titles(&extract(&doc, Category::Projects, &rules)),
            vec!["httpx", "rich"]
        );
    }

    #[test]
    fn test_links_without_accepted_color_are_dropped() {
        let doc = Html::parse_document(ISSUE_PAGE);
        let rules = rules();
        for category in Category::ALL {
            let links = extract(&doc, category, &rules);
            assert!(links.iter().all(|l| l.title != "Sponsor Banner"));
            assert!(links.iter().all(|l| l.title != "Unsubscribe"));
        }
    }

    #[test]
    fn test_missing_heading_yields_nothing() {
        let doc = Html::parse_document(
            r#"<h2>Articles</h2><a href="/link/1" style="color:#AA0000">A</a>"#,
        );
        assert!(extract(&doc, Category::Projects, &rules()).is_empty());
    }

    #[test]
    fn test_preview_without_any_heading_yields_nothing() {
        let doc = Html::parse_document(r#"<a href="/link/1" style="color:#AA0000">A</a>"#);
        assert!(extract(&doc, Category::Preview, &rules()).is_empty());
    }

    #[test]
    fn test_empty_section_between_headings() {
        let doc = Html::parse_document(
            r#"<h2>Projects</h2><h2>Articles</h2><a href="/link/1" style="color:#AA0000">A</a>"#,
        );
        assert!(extract(&doc, Category::Projects, &rules()).is_empty());
        assert_eq!(
            titles(&extract(&doc, Category::Articles, &rules())),
            vec!["A"]
        );
    }

    #[test]
    fn test_extract_is_idempotent() {
        let doc = Html::parse_document(ISSUE_PAGE);
        let rules = rules();
        for category in Category::ALL {
            assert_eq!(
                extract(&doc, category, &rules),
                extract(&doc, category, &rules)
            );
        }
    }

    #[test]
    fn test_outline_assigns_nearest_heading() {
        let doc = Html::parse_document(ISSUE_PAGE);
        let outline = Outline::build(&doc, &rules());
        assert_eq!(outline.headings.len(), 5);
        assert_eq!(outline.headings[0], "Articles & Tutorials");
        assert_eq!(outline.anchors[0].heading, None);
        let typing = outline
            .anchors
            .iter()
            .find(|a| a.text == "Typing Tips")
            .unwrap();
        assert_eq!(typing.heading, Some(0));
    }

    #[test]
    fn test_anchor_inside_heading_belongs_to_that_heading() {
        let doc = Html::parse_document(
            r#"<a href="/link/1" style="color:#AA0000">pre</a>
            <h2><a href="/link/9" style="color:#AA0000">Projects</a></h2>
            <a href="/link/2" style="color:#AA0000">p1</a>"#,
        );
        let rules = rules();
        assert_eq!(titles(&extract(&doc, Category::Preview, &rules)), vec!["pre"]);
        assert_eq!(
            titles(&extract(&doc, Category::Projects, &rules)),
            vec!["Projects", "p1"]
        );
    }

    #[test]
    fn test_is_content_link() {
        let rules = rules();
        let link = Some("https://pycoders.com/link/1/web");
        assert!(rules.is_content_link(link, Some("color: #aa0000")));
        assert!(rules.is_content_link(Some("/link/1"), Some("color: #1155CC; font-weight: bold")));
        assert!(!rules.is_content_link(link, None));
        assert!(!rules.is_content_link(Some("/LINK/1"), Some("color: #AA0000")));
        let issue_page = Some("https://pycoders.com/issues/1");
        assert!(!rules.is_content_link(issue_page, Some("color: #AA0000")));
        assert!(!rules.is_content_link(None, Some("color: #AA0000")));
    }

    #[test]
    fn test_search_scans_whole_document_ignoring_style() {
        let doc = Html::parse_document(ISSUE_PAGE);
        let links = search_links(&doc, "PYTHON", &rules());
        assert_eq!(
            titles(&links),
            vec![
                "Understanding Async Python",
                "Why Python?",
                "Senior Python Dev",
            ]
        );
    }

    #[test]
    fn test_search_matches_unstyled_links() {
        let doc = Html::parse_document(ISSUE_PAGE);
        let links = search_links(&doc, "unsubscribe", &rules());
        assert_eq!(links, vec![Link::new("Unsubscribe", "https://pycoders.com/unsubscribe")]);
    }

    #[test]
    fn test_search_with_blank_phrase_matches_nothing() {
        let doc = Html::parse_document(ISSUE_PAGE);
        assert!(search_links(&doc, "  ", &rules()).is_empty());
    }
}
