//! Content extraction from raw page markup
//!
//! Every field is extracted by an independent scan over the document, and
//! every field except the title is optional. A page whose content container
//! cannot be found still yields a record with the content fields absent.

mod images;
mod text;

pub use images::{gather_image_candidates, pick_best_from_srcset, srcset_urls, ImageCandidate};
pub use text::{
    collapse_whitespace, decode_entities, excerpt, sanitize_html, strip_tags, to_plain_text,
    EXCERPT_CHARS,
};

use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use url::Url;

/// Content-container selectors, in priority order
const CONTENT_SELECTORS: &[&str] = &[
    "div#mw-content-text",
    "div.mw-parser-output",
    r#"div[id^="wiki-content"]"#,
    "article",
    r#"div[class*="wiki"]"#,
];

/// Infobox selectors, in priority order
const INFOBOX_SELECTORS: &[&str] = &[
    r#"aside[class*="infobox"]"#,
    r#"table[class*="infobox"], table[class*="wiki_table"]"#,
];

/// A heading inside the main content block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heading {
    /// 1 through 6
    pub level: u8,
    pub text: String,
}

/// Structured content extracted from one page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedPage {
    /// `<title>` text, or the page URL when there is none
    pub title: String,
    pub description: Option<String>,
    pub h1: Option<String>,
    /// Raw href values, fragment-only references excluded
    pub links: Vec<String>,
    pub images: Vec<ImageCandidate>,
    pub excerpt: Option<String>,
    /// Sanitized main-content markup
    pub content_html: Option<String>,
    pub content_text: Option<String>,
    pub headings: Vec<Heading>,
    pub infobox_html: Option<String>,
    pub categories: Vec<String>,
}

/// Extracts structured content from page markup
///
/// # Arguments
///
/// * `html` - The raw page markup
/// * `page_url` - The page's own URL, used as the title fallback
///
/// # Example
///
/// ```
/// use url::Url;
/// use wiki_harvest::extract::extract_page;
///
/// let url = Url::parse("https://wiki.example/Malenia").unwrap();
/// let html = r#"<html><head><title>Malenia</title></head>
///     <body><div id="mw-content-text"><h2>Strategy</h2><p>Dodge.</p></div></body></html>"#;
/// let page = extract_page(html, &url);
/// assert_eq!(page.title, "Malenia");
/// assert_eq!(page.content_text.as_deref(), Some("Strategy Dodge."));
/// ```
pub fn extract_page(html: &str, page_url: &Url) -> ExtractedPage {
    let document = Html::parse_document(html);

    let title = first_text(&document, "title").unwrap_or_else(|| page_url.to_string());
    let description = first_attr(&document, r#"meta[name="description"]"#, "content");
    let h1 = first_text(&document, "h1");
    let links = extract_links(&document);
    let images = gather_image_candidates(&document, html);

    let content_html = extract_main_block(&document).map(|block| sanitize_html(&block));
    let content_text = content_html.as_deref().map(to_plain_text);
    let excerpt = content_text.as_deref().map(text::excerpt);
    let headings = content_html
        .as_deref()
        .map(collect_headings)
        .unwrap_or_default();

    let infobox_html = extract_infobox(&document);
    let categories = collect_categories(&document);

    ExtractedPage {
        title,
        description,
        h1,
        links,
        images,
        excerpt,
        content_html,
        content_text,
        headings,
        infobox_html,
        categories,
    }
}

/// Returns the collapsed text of the first element matching a selector
fn first_text(document: &Html, css: &str) -> Option<String> {
    let selector = Selector::parse(css).ok()?;
    document
        .select(&selector)
        .next()
        .map(element_text)
        .filter(|s| !s.is_empty())
}

fn first_attr(document: &Html, css: &str, attr: &str) -> Option<String> {
    let selector = Selector::parse(css).ok()?;
    document
        .select(&selector)
        .find_map(|element| element.value().attr(attr))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn element_text(element: ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<String>())
}

/// Collects every anchor href, skipping empty and fragment-only references
fn extract_links(document: &Html) -> Vec<String> {
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .map(str::trim)
        .filter(|href| !href.is_empty() && !href.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// Returns the inner markup of the first known content container
fn extract_main_block(document: &Html) -> Option<String> {
    CONTENT_SELECTORS.iter().find_map(|css| {
        let selector = Selector::parse(css).ok()?;
        document.select(&selector).next().map(|el| el.inner_html())
    })
}

/// Returns the raw markup of the first known infobox
fn extract_infobox(document: &Html) -> Option<String> {
    INFOBOX_SELECTORS.iter().find_map(|css| {
        let selector = Selector::parse(css).ok()?;
        document.select(&selector).next().map(|el| el.html())
    })
}

/// Collects `<h1>`–`<h6>` headings of a content block in document order
fn collect_headings(content_html: &str) -> Vec<Heading> {
    let fragment = Html::parse_fragment(content_html);
    let Ok(selector) = Selector::parse("h1, h2, h3, h4, h5, h6") else {
        return Vec::new();
    };

    fragment
        .select(&selector)
        .filter_map(|element| {
            let level = element.value().name().strip_prefix('h')?.parse().ok()?;
            let text = element_text(element);
            (!text.is_empty()).then_some(Heading { level, text })
        })
        .collect()
}

/// Collects category names from the category-links box and meta keywords
fn collect_categories(document: &Html) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut categories = Vec::new();
    let mut push = |name: String| {
        if !name.is_empty() && seen.insert(name.clone()) {
            categories.push(name);
        }
    };

    if let Ok(selector) = Selector::parse("#catlinks a") {
        for element in document.select(&selector) {
            push(element_text(element));
        }
    }

    if let Some(keywords) = first_attr(document, r#"meta[name="keywords"]"#, "content") {
        for keyword in keywords.split(',') {
            push(keyword.trim().to_string());
        }
    }

    categories
}
