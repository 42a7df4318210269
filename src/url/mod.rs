//! URL handling module for Wiki-Harvest
//!
//! This module provides URL normalization, reference resolution, slug
//! derivation, host scoping and the image-host allowlist.

mod domain;
mod matcher;
mod normalize;

pub use domain::{extract_domain, host_key, root_domain};
pub use matcher::{is_banned_namespace, matches_host_suffix, ImageHostPolicy};
pub use normalize::{
    absolutize, decode_component, normalize_url, slugify, url_to_slug, HOME_SLUG,
};

use url::Url;

/// Decides whether a discovered link belongs to the crawl's scope
///
/// A link is in scope iff it is on the start host and its last path segment
/// is not in a banned namespace. Robots rules are evaluated separately at
/// dequeue time.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use wiki_harvest::url::is_crawlable;
///
/// let link = Url::parse("https://wiki.example/Ranni").unwrap();
/// assert!(is_crawlable(&link, "wiki.example", &["Special:".to_string()]));
///
/// let link = Url::parse("https://wiki.example/Special:Random").unwrap();
/// assert!(!is_crawlable(&link, "wiki.example", &["Special:".to_string()]));
/// ```
pub fn is_crawlable(url: &Url, start_host: &str, banned_namespaces: &[String]) -> bool {
    match host_key(url) {
        Some(host) if host == start_host => !is_banned_namespace(url, banned_namespaces),
        _ => false,
    }
}
