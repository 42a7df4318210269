use url::Url;

/// Extracts the domain from a URL
///
/// This function retrieves the host portion of a URL and converts it to lowercase.
/// If the URL has no host (which shouldn't happen for valid HTTP(S) URLs), it returns None.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use wiki_harvest::url::extract_domain;
///
/// let url = Url::parse("https://WIKI.example/Home").unwrap();
/// assert_eq!(extract_domain(&url), Some("wiki.example".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Returns the host of a URL together with its explicit port, if any
///
/// Two URLs belong to the same crawl scope iff their host keys are equal,
/// so `wiki.example:8080` and `wiki.example` are different hosts.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use wiki_harvest::url::host_key;
///
/// let url = Url::parse("http://127.0.0.1:8080/Home").unwrap();
/// assert_eq!(host_key(&url), Some("127.0.0.1:8080".to_string()));
///
/// let url = Url::parse("https://wiki.example:443/Home").unwrap();
/// assert_eq!(host_key(&url), Some("wiki.example".to_string()));
/// ```
pub fn host_key(url: &Url) -> Option<String> {
    let domain = extract_domain(url)?;
    match url.port() {
        Some(port) => Some(format!("{}:{}", domain, port)),
        None => Some(domain),
    }
}

/// Approximates the registrable root domain of a host: its last two labels
///
/// Hosts with two or fewer labels are returned unchanged (lower-cased).
///
/// # Examples
///
/// ```
/// use wiki_harvest::url::root_domain;
///
/// assert_eq!(root_domain("static.wiki.gg"), "wiki.gg");
/// assert_eq!(root_domain("wiki.gg"), "wiki.gg");
/// ```
pub fn root_domain(host: &str) -> String {
    let labels: Vec<&str> = host.split('.').filter(|l| !l.is_empty()).collect();
    if labels.len() <= 2 {
        return host.to_lowercase();
    }
    labels[labels.len() - 2..].join(".").to_lowercase()
}
