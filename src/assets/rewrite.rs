//! Content rewriting onto localized image paths
//!
//! Start tags are located with a pattern scan and only the tags that carry a
//! mapped image reference are re-rendered; everything else is passed through
//! byte for byte. Rewriting never fails.

use crate::extract::{decode_entities, srcset_urls};
use crate::url::absolutize;
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::LazyLock;
use url::Url;

static START_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<([a-zA-Z][a-zA-Z0-9-]*)(\s[^<>]*)?>").expect("start tag regex is valid")
});
static ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([^\s"'<>/=]+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+)))?"#)
        .expect("attribute regex is valid")
});
static STYLE_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)url\(\s*(?:"([^"]+)"|'([^']+)'|([^'")\s]+))\s*\)"#)
        .expect("style url regex is valid")
});

/// Lazy-load and responsive alternatives dropped once an `<img>` is localized
const STALE_IMG_ATTRS: &[&str] = &["srcset", "data-src", "data-srcset", "data-original", "data-cfsrc"];

/// Rewrites image references in content markup to local paths
///
/// Handles `<img>` (`src`, lazy-load attributes and `srcset`), inline `style`
/// `url(...)` references, `<link rel="image_src|preload">`, Open Graph image
/// meta tags and `<source srcset>` (dropped once any entry is local).
///
/// # Arguments
///
/// * `html` - Sanitized content markup
/// * `base` - URL of the page the markup came from
/// * `mapping` - Absolute remote URL → local path
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
/// use url::Url;
/// use wiki_harvest::assets::rewrite_content_html;
///
/// let base = Url::parse("https://x/p").unwrap();
/// let mapping = HashMap::from([("https://x/a.png".to_string(), "images/p/a.jpg".to_string())]);
/// let html = r#"<img src="https://x/a.png" srcset="https://x/a.png 2x" data-src="https://x/a.png">"#;
/// assert_eq!(rewrite_content_html(html, &base, &mapping), r#"<img src="images/p/a.jpg">"#);
/// ```
pub fn rewrite_content_html(html: &str, base: &Url, mapping: &HashMap<String, String>) -> String {
    if mapping.is_empty() {
        return html.to_string();
    }

    START_TAG_RE
        .replace_all(html, |caps: &Captures| {
            let original = &caps[0];
            let Some(mut tag) = Tag::parse(caps) else {
                return original.to_string();
            };

            let resolve = |raw: &str| lookup(raw, base, mapping);
            let mut changed = match tag.name.as_str() {
                "img" => rewrite_img(&mut tag, &resolve),
                "source" => {
                    let local_entry = tag
                        .value("srcset")
                        .is_some_and(|set| srcset_urls(&set).into_iter().any(|u| resolve(u).is_some()));
                    if local_entry {
                        return String::new();
                    }
                    false
                }
                "link" if is_image_link(&tag) => rewrite_attr(&mut tag, "href", &resolve),
                "meta" if is_og_image(&tag) => rewrite_attr(&mut tag, "content", &resolve),
                _ => false,
            };

            changed |= rewrite_style(&mut tag, &resolve);

            if changed {
                tag.render()
            } else {
                original.to_string()
            }
        })
        .into_owned()
}

/// Resolves a raw attribute value to its local path, if mapped
fn lookup<'m>(raw: &str, base: &Url, mapping: &'m HashMap<String, String>) -> Option<&'m str> {
    let decoded = decode_entities(raw);
    let absolute = absolutize(&decoded, base)?;
    mapping.get(absolute.as_str()).map(String::as_str)
}

fn rewrite_img<'m>(tag: &mut Tag, resolve: &impl Fn(&str) -> Option<&'m str>) -> bool {
    let mut candidates = Vec::new();
    if let Some(src) = tag.value("src") {
        candidates.push(src);
    }
    if let Some(lazy) = ["data-src", "data-original", "data-cfsrc"]
        .iter()
        .find_map(|name| tag.value(name))
    {
        candidates.push(lazy);
    }
    if let Some(set) = tag.value("srcset").or_else(|| tag.value("data-srcset")) {
        candidates.extend(srcset_urls(&set).into_iter().map(str::to_string));
    }

    let Some(local) = candidates.iter().find_map(|c| resolve(c.as_str())) else {
        return false;
    };

    tag.set("src", local);
    for name in STALE_IMG_ATTRS {
        tag.remove(name);
    }
    true
}

fn rewrite_attr<'m>(tag: &mut Tag, name: &str, resolve: &impl Fn(&str) -> Option<&'m str>) -> bool {
    match tag.value(name).and_then(|raw| resolve(raw.as_str())) {
        Some(local) => {
            tag.set(name, local);
            true
        }
        None => false,
    }
}

/// Rewrites `url(...)` references inside an inline style
fn rewrite_style<'m>(tag: &mut Tag, resolve: &impl Fn(&str) -> Option<&'m str>) -> bool {
    let Some(style) = tag.value("style") else {
        return false;
    };
    let style = decode_entities(&style);

    let mut changed = false;
    let rewritten = STYLE_URL_RE.replace_all(&style, |caps: &Captures| {
        let reference = caps
            .get(1)
            .or_else(|| caps.get(2))
            .or_else(|| caps.get(3))
            .map(|m| m.as_str())
            .unwrap_or("");
        match resolve(reference) {
            Some(local) => {
                changed = true;
                format!("url({})", local)
            }
            None => caps[0].to_string(),
        }
    });

    if changed {
        let rewritten = rewritten.into_owned();
        tag.set("style", &rewritten);
    }
    changed
}

fn is_image_link(tag: &Tag) -> bool {
    tag.value("rel")
        .is_some_and(|rel| rel.eq_ignore_ascii_case("image_src") || rel.eq_ignore_ascii_case("preload"))
}

fn is_og_image(tag: &Tag) -> bool {
    tag.value("property").is_some_and(|p| {
        p.eq_ignore_ascii_case("og:image") || p.eq_ignore_ascii_case("og:image:secure_url")
    })
}

/// An attribute value, either as found in the markup or newly assigned
#[derive(Debug, Clone)]
enum AttrValue {
    /// Absent value (`<img hidden>`)
    Bare,
    /// Raw text plus the quote character it was written with, if any
    Raw(String, Option<char>),
    /// Unescaped text to be escaped on render
    New(String),
}

/// A parsed start tag
#[derive(Debug)]
struct Tag {
    name: String,
    attrs: Vec<(String, AttrValue)>,
    self_closing: bool,
}

impl Tag {
    fn parse(caps: &Captures) -> Option<Self> {
        let name = caps.get(1)?.as_str().to_ascii_lowercase();
        let mut body = caps.get(2).map(|m| m.as_str()).unwrap_or("").trim_end();

        let self_closing = body.ends_with('/');
        if self_closing {
            body = &body[..body.len() - 1];
        }

        let attrs = ATTR_RE
            .captures_iter(body)
            .map(|a| {
                let attr_name = a[1].to_ascii_lowercase();
                let value = if let Some(v) = a.get(2) {
                    AttrValue::Raw(v.as_str().to_string(), Some('"'))
                } else if let Some(v) = a.get(3) {
                    AttrValue::Raw(v.as_str().to_string(), Some('\''))
                } else if let Some(v) = a.get(4) {
                    AttrValue::Raw(v.as_str().to_string(), None)
                } else {
                    AttrValue::Bare
                };
                (attr_name, value)
            })
            .collect();

        Some(Self {
            name,
            attrs,
            self_closing,
        })
    }

    /// Returns the raw (still entity-encoded) value of an attribute
    fn value(&self, name: &str) -> Option<String> {
        self.attrs.iter().find(|(n, _)| n == name).and_then(|(_, v)| match v {
            AttrValue::Bare => None,
            AttrValue::Raw(raw, _) => Some(raw.clone()),
            AttrValue::New(text) => Some(text.clone()),
        })
    }

    fn set(&mut self, name: &str, value: &str) {
        let value = AttrValue::New(value.to_string());
        match self.attrs.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => slot.1 = value,
            None => self.attrs.insert(0, (name.to_string(), value)),
        }
    }

    fn remove(&mut self, name: &str) {
        self.attrs.retain(|(n, _)| n != name);
    }

    fn render(&self) -> String {
        let mut out = format!("<{}", self.name);
        for (name, value) in &self.attrs {
            out.push(' ');
            out.push_str(name);
            match value {
                AttrValue::Bare => {}
                AttrValue::Raw(raw, Some(q)) => {
                    out.push('=');
                    out.push(*q);
                    out.push_str(raw);
                    out.push(*q);
                }
                AttrValue::Raw(raw, None) => {
                    out.push_str("=\"");
                    out.push_str(raw);
                    out.push('"');
                }
                AttrValue::New(text) => {
                    out.push_str("=\"");
                    out.push_str(&text.replace('&', "&amp;").replace('"', "&quot;"));
                    out.push('"');
                }
            }
        }
        if self.self_closing {
            out.push_str(" /");
        }
        out.push('>');
        out
    }
}
