use crate::UrlError;
use url::Url;

/// Schemes that never resolve to a fetchable resource
const REJECTED_SCHEMES: &[&str] = &["javascript:", "mailto:", "tel:", "data:"];

/// Normalizes a URL for frontier bookkeeping
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed
/// 2. Reject schemes other than HTTP and HTTPS
/// 3. Require a host
/// 4. Remove fragment (everything after #)
///
/// The path is kept verbatim: wiki titles are case-sensitive, so two URLs
/// differing only in path case are distinct pages.
///
/// # Examples
///
/// ```
/// use wiki_harvest::url::normalize_url;
///
/// let url = normalize_url("https://wiki.example/Malenia#Strategy").unwrap();
/// assert_eq!(url.as_str(), "https://wiki.example/Malenia");
/// ```
pub fn normalize_url(url_str: &str) -> Result<Url, UrlError> {
    let mut url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingDomain);
    }

    url.set_fragment(None);

    Ok(url)
}

/// Resolves a raw href/src against the URL of the page it was found on
///
/// Returns None if the reference should be excluded:
/// - empty references
/// - javascript:, mailto:, tel: schemes and data: URIs
/// - references that cannot be joined onto the base
/// - non-HTTP(S) results or results without a host
///
/// # Examples
///
/// ```
/// use url::Url;
/// use wiki_harvest::url::absolutize;
///
/// let base = Url::parse("https://wiki.example/wiki/Malenia").unwrap();
/// let abs = absolutize("//static.wiki.gg/a.png", &base).unwrap();
/// assert_eq!(abs.as_str(), "https://static.wiki.gg/a.png");
/// assert!(absolutize("javascript:void(0)", &base).is_none());
/// ```
pub fn absolutize(href: &str, base: &Url) -> Option<Url> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }

    let lower = href.to_ascii_lowercase();
    if REJECTED_SCHEMES.iter().any(|s| lower.starts_with(s)) {
        return None;
    }

    let resolved = base.join(href).ok()?;
    if resolved.scheme() != "http" && resolved.scheme() != "https" {
        return None;
    }
    resolved.host_str()?;

    Some(resolved)
}

/// Slug of the site root and of paths with no alphanumeric content
pub const HOME_SLUG: &str = "home";

/// Derives the page slug from a URL path
///
/// Leading and trailing slashes are dropped, a path without alphanumerics
/// becomes [`HOME_SLUG`], and every run of non-alphanumeric characters
/// collapses into a single dash.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use wiki_harvest::url::url_to_slug;
///
/// let url = Url::parse("https://wiki.example/Home").unwrap();
/// assert_eq!(url_to_slug(&url), "home");
///
/// let url = Url::parse("https://wiki.example/wiki/Malenia,_Blade_of_Miquella").unwrap();
/// assert_eq!(url_to_slug(&url), "wiki-malenia-blade-of-miquella");
/// ```
pub fn url_to_slug(url: &Url) -> String {
    let slug = slugify(url.path());
    if slug.is_empty() {
        HOME_SLUG.to_string()
    } else {
        slug
    }
}

/// Lower-cases and collapses every non-`[a-z0-9]` run into one dash
pub fn slugify(raw: &str) -> String {
    let mut slug = String::with_capacity(raw.len());
    let mut pending_dash = false;

    for c in raw.chars().flat_map(|c| c.to_lowercase()) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }

    slug
}

/// Percent-decodes a URL component, falling back to the raw text on invalid UTF-8
pub fn decode_component(raw: &str) -> String {
    urlencoding::decode(raw)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| raw.to_string())
}
