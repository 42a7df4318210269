//! Image candidate discovery
//!
//! Candidates come from `<img>` tags (with lazy-load and `srcset` fallbacks),
//! Open Graph metadata, image link hints, and CSS `url(...)` references.

use regex::Regex;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::LazyLock;

static CSS_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)url\(\s*(?:"([^"]+)"|'([^']+)'|([^'")\s]+))\s*\)"#)
        .expect("css url regex is valid")
});

/// Lazy-load attributes consulted after `src`, in priority order
const LAZY_SRC_ATTRS: &[&str] = &["data-src", "data-original", "data-cfsrc"];

/// A raw image reference found on a page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageCandidate {
    /// The reference exactly as written in the markup
    pub url: String,

    /// Alt text of the originating `<img>` tag, if any
    pub alt: Option<String>,
}

/// Collects deduplicated image candidates in discovery order
pub fn gather_image_candidates(document: &Html, raw_html: &str) -> Vec<ImageCandidate> {
    let mut collector = CandidateCollector::default();

    if let Ok(img_selector) = Selector::parse("img") {
        for element in document.select(&img_selector) {
            let attrs = element.value();
            let alt = non_empty(attrs.attr("alt")).map(str::to_string);

            let direct = std::iter::once("src")
                .chain(LAZY_SRC_ATTRS.iter().copied())
                .find_map(|name| non_empty(attrs.attr(name)))
                .map(str::to_string);

            let best = direct.or_else(|| {
                non_empty(attrs.attr("srcset"))
                    .or_else(|| non_empty(attrs.attr("data-srcset")))
                    .and_then(pick_best_from_srcset)
            });

            if let Some(url) = best {
                collector.push(url, alt);
            }
        }
    }

    if let Ok(og_selector) =
        Selector::parse(r#"meta[property="og:image"], meta[property="og:image:secure_url"]"#)
    {
        for element in document.select(&og_selector) {
            if let Some(content) = non_empty(element.value().attr("content")) {
                collector.push(content.to_string(), None);
            }
        }
    }

    if let Ok(link_selector) = Selector::parse(r#"link[rel="image_src"], link[rel="preload"]"#) {
        for element in document.select(&link_selector) {
            if let Some(href) = non_empty(element.value().attr("href")) {
                collector.push(href.to_string(), None);
            }
        }
    }

    for caps in CSS_URL_RE.captures_iter(raw_html) {
        if let Some(m) = caps.get(1).or_else(|| caps.get(2)).or_else(|| caps.get(3)) {
            collector.push(m.as_str().to_string(), None);
        }
    }

    collector.candidates
}

/// Picks the highest-resolution entry of a `srcset` list
///
/// Each entry's width or density descriptor is parsed numerically (`2x` → 2,
/// `640w` → 640, missing → 0). The maximum wins; ties keep the earlier entry.
///
/// # Examples
///
/// ```
/// use wiki_harvest::extract::pick_best_from_srcset;
///
/// assert_eq!(pick_best_from_srcset("a.png 1x, b.png 2x"), Some("b.png".to_string()));
/// assert_eq!(pick_best_from_srcset(""), None);
/// ```
pub fn pick_best_from_srcset(srcset: &str) -> Option<String> {
    let mut best: Option<(&str, f64)> = None;

    for entry in srcset.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let mut parts = entry.split_whitespace();
        let Some(url) = parts.next() else {
            continue;
        };
        let score = parts.next().map(descriptor_score).unwrap_or(0.0);

        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((url, score)),
        }
    }

    best.map(|(url, _)| url.to_string())
}

/// Returns every URL listed in a `srcset`, in order
pub fn srcset_urls(srcset: &str) -> Vec<&str> {
    srcset
        .split(',')
        .filter_map(|entry| entry.split_whitespace().next())
        .collect()
}

fn descriptor_score(descriptor: &str) -> f64 {
    let numeric: String = descriptor
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    numeric.parse().unwrap_or(0.0)
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[derive(Default)]
struct CandidateCollector {
    seen: HashSet<String>,
    candidates: Vec<ImageCandidate>,
}

impl CandidateCollector {
    fn push(&mut self, url: String, alt: Option<String>) {
        if self.seen.insert(url.clone()) {
            self.candidates.push(ImageCandidate { url, alt });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gather(html: &str) -> Vec<ImageCandidate> {
        let document = Html::parse_document(html);
        gather_image_candidates(&document, html)
    }

    #[test]
    fn test_srcset_picks_highest_density() {
        let found = gather(r#"<img srcset="a.png 1x, b.png 2x">"#);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].url, "b.png");
    }

    #[test]
    fn test_srcset_width_descriptors() {
        assert_eq!(
            pick_best_from_srcset("small.jpg 320w, large.jpg 1280w, mid.jpg 640w"),
            Some("large.jpg".to_string())
        );
    }

    #[test]
    fn test_srcset_ties_keep_first() {
        assert_eq!(
            pick_best_from_srcset("first.png 2x, second.png 2x"),
            Some("first.png".to_string())
        );
        assert_eq!(
            pick_best_from_srcset("first.png, second.png"),
            Some("first.png".to_string())
        );
    }

    #[test]
    fn test_src_wins_over_lazy_and_srcset() {
        let found = gather(r#"<img src="a.png" data-src="b.png" srcset="c.png 2x">"#);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].url, "a.png");
    }

    #[test]
    fn test_lazy_attributes_in_priority_order() {
        let found = gather(r#"<img data-original="o.png" data-src="d.png">"#);
        assert_eq!(found[0].url, "d.png");

        let found = gather(r#"<img data-cfsrc="cf.png">"#);
        assert_eq!(found[0].url, "cf.png");
    }

    #[test]
    fn test_data_srcset_fallback() {
        let found = gather(r#"<img data-srcset="x.png 100w, y.png 200w">"#);
        assert_eq!(found[0].url, "y.png");
    }

    #[test]
    fn test_alt_text_retained() {
        let found = gather(r#"<img src="m.png" alt="Malenia portrait">"#);
        assert_eq!(found[0].alt.as_deref(), Some("Malenia portrait"));
    }

    #[test]
    fn test_supplementary_sources() {
        let html = r#"<html><head>
            <meta property="og:image" content="https://wiki.example/og.png">
            <link rel="image_src" href="/hint.png">
            </head><body>
            <div style="background-image: url('/bg.jpg')"></div>
            </body></html>"#;
        let urls: Vec<String> = gather(html).into_iter().map(|c| c.url).collect();
        assert_eq!(urls, vec!["https://wiki.example/og.png", "/hint.png", "/bg.jpg"]);
    }

    #[test]
    fn test_css_url_quoting_variants() {
        let html = r#"<style>.a{background:url("/q.png")} .b{background:url(/u.png)}</style>"#;
        let urls: Vec<String> = gather(html).into_iter().map(|c| c.url).collect();
        assert_eq!(urls, vec!["/q.png", "/u.png"]);
    }

    #[test]
    fn test_deduplicated_by_raw_string() {
        let html = r#"<img src="/a.png" alt="first"><img src="/a.png" alt="second">
            <meta property="og:image" content="/a.png">"#;
        let found = gather(html);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].alt.as_deref(), Some("first"));
    }

    #[test]
    fn test_img_without_any_source_ignored() {
        assert!(gather(r#"<img alt="nothing">"#).is_empty());
    }

    #[test]
    fn test_srcset_urls() {
        assert_eq!(srcset_urls("a.png 1x, b.png 2x"), vec!["a.png", "b.png"]);
    }
}
