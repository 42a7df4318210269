use crate::url::domain::{extract_domain, host_key, root_domain};
use crate::url::normalize::decode_component;
use url::Url;

/// Checks if a host equals a domain or is one of its subdomains
///
/// # Examples
///
/// ```
/// use wiki_harvest::url::matches_host_suffix;
///
/// assert!(matches_host_suffix("wp.com", "wp.com"));
/// assert!(matches_host_suffix("wp.com", "i0.wp.com"));
/// assert!(!matches_host_suffix("wp.com", "notwp.com"));
/// ```
pub fn matches_host_suffix(domain: &str, host: &str) -> bool {
    host == domain || host.ends_with(&format!(".{}", domain))
}

/// Checks whether the last path segment of a URL starts with a banned namespace
///
/// The segment is percent-decoded first, so `Special%3ARandom` is caught too.
pub fn is_banned_namespace(url: &Url, banned: &[String]) -> bool {
    let path = decode_component(url.path());
    let last = path.rsplit('/').next().unwrap_or("");
    banned.iter().any(|prefix| last.starts_with(prefix.as_str()))
}

/// Decides which hosts images may be downloaded from
///
/// An image host is accepted iff it is the crawl's start host, shares the
/// start host's root domain, or is (a subdomain of) a configured asset host.
#[derive(Debug, Clone)]
pub struct ImageHostPolicy {
    start_host: String,
    start_root: String,
    extra_hosts: Vec<String>,
}

impl ImageHostPolicy {
    /// Creates a policy anchored on the crawl's start URL
    pub fn new(start_url: &Url, extra_hosts: &[String]) -> Self {
        let start_host = host_key(start_url).unwrap_or_default();
        let start_root = root_domain(&extract_domain(start_url).unwrap_or_default());
        Self {
            start_host,
            start_root,
            extra_hosts: extra_hosts.iter().map(|h| h.to_lowercase()).collect(),
        }
    }

    /// Returns true if an image at this URL may be downloaded
    pub fn allows(&self, url: &Url) -> bool {
        let (Some(key), Some(domain)) = (host_key(url), extract_domain(url)) else {
            return false;
        };

        if key == self.start_host {
            return true;
        }

        if root_domain(&domain) == self.start_root {
            return true;
        }

        self.extra_hosts
            .iter()
            .any(|extra| matches_host_suffix(extra, &domain))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn banned() -> Vec<String> {
        vec!["Special:".to_string(), "File:".to_string()]
    }

    fn policy() -> ImageHostPolicy {
        let start = Url::parse("https://eldenring.wiki.gg/").unwrap();
        ImageHostPolicy::new(&start, &["imgur.com".to_string(), "wp.com".to_string()])
    }

    #[test]
    fn test_exact_suffix_match() {
        assert!(matches_host_suffix("imgur.com", "imgur.com"));
        assert!(matches_host_suffix("imgur.com", "i.imgur.com"));
        assert!(!matches_host_suffix("imgur.com", "imgur.com.evil.net"));
    }

    #[test]
    fn test_banned_namespace() {
        let url = Url::parse("https://wiki.example/Special:Random").unwrap();
        assert!(is_banned_namespace(&url, &banned()));

        let url = Url::parse("https://wiki.example/wiki/File:Map.png").unwrap();
        assert!(is_banned_namespace(&url, &banned()));
    }

    #[test]
    fn test_banned_namespace_encoded() {
        let url = Url::parse("https://wiki.example/Special%3ARandom").unwrap();
        assert!(is_banned_namespace(&url, &banned()));
    }

    #[test]
    fn test_content_page_not_banned() {
        let url = Url::parse("https://wiki.example/wiki/Malenia").unwrap();
        assert!(!is_banned_namespace(&url, &banned()));
    }

    #[test]
    fn test_namespace_only_checked_on_last_segment() {
        let url = Url::parse("https://wiki.example/Special:Pages/Malenia").unwrap();
        assert!(!is_banned_namespace(&url, &banned()));
    }

    #[test]
    fn test_policy_accepts_start_host() {
        let url = Url::parse("https://eldenring.wiki.gg/images/a.png").unwrap();
        assert!(policy().allows(&url));
    }

    #[test]
    fn test_policy_accepts_same_root() {
        let url = Url::parse("https://static.wiki.gg/a.png").unwrap();
        assert!(policy().allows(&url));
    }

    #[test]
    fn test_policy_accepts_extra_hosts() {
        let url = Url::parse("https://i.imgur.com/a.png").unwrap();
        assert!(policy().allows(&url));

        let url = Url::parse("https://i2.wp.com/a.png").unwrap();
        assert!(policy().allows(&url));
    }

    #[test]
    fn test_policy_rejects_foreign_hosts() {
        let url = Url::parse("https://tracker.ads.example/pixel.gif").unwrap();
        assert!(!policy().allows(&url));
    }
}
