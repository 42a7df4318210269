//! Robots.txt parser implementation
//!
//! Only the wildcard (`User-agent: *`) group is honored, and within it only
//! `Disallow` rules. `Allow` lines are recognized but not applied.

/// Disallowed path prefixes for the wildcard user agent
///
/// Built once per crawl host and immutable thereafter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RobotsPolicy {
    disallow: Vec<String>,
}

impl RobotsPolicy {
    /// Creates a permissive policy that allows everything
    ///
    /// This is the outcome whenever robots.txt cannot be fetched.
    pub fn allow_all() -> Self {
        Self::default()
    }

    /// Parses raw robots.txt content
    ///
    /// # Parsing Rules
    ///
    /// - Blank lines and `#` comments are skipped
    /// - Each `User-agent` line starts or continues a group; the group is the
    ///   wildcard group iff the value is exactly `*`
    /// - Inside the wildcard group non-empty `Disallow` values are collected
    ///   in order
    /// - Directive names are case-insensitive
    pub fn from_content(content: &str) -> Self {
        let mut disallow = Vec::new();
        let mut in_wildcard = false;

        for line in content.lines() {
            let trimmed = line.trim();

            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let Some((key, value)) = trimmed.split_once(':') else {
                continue;
            };
            let key = key.trim().to_lowercase();
            let value = strip_comment(value).trim();

            match key.as_str() {
                "user-agent" => {
                    in_wildcard = value == "*";
                }
                "disallow" if in_wildcard => {
                    if !value.is_empty() {
                        disallow.push(value.to_string());
                    }
                }
                "allow" if in_wildcard => {
                    tracing::trace!("Ignoring robots.txt Allow rule: {}", value);
                }
                _ => {}
            }
        }

        Self { disallow }
    }

    /// Checks if a URL path is allowed
    ///
    /// A path is allowed iff it does not start with any disallowed prefix.
    /// Matching is a literal prefix comparison; `*` and `$` carry no meaning.
    pub fn is_allowed(&self, path: &str) -> bool {
        !self
            .disallow
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
    }

    /// Returns the collected disallow prefixes in file order
    pub fn disallowed(&self) -> &[String] {
        &self.disallow
    }
}

fn strip_comment(value: &str) -> &str {
    match value.find('#') {
        Some(idx) => &value[..idx],
        None => value,
    }
}
