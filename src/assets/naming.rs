//! Local file naming for downloaded images
//!
//! Names are derived from the image URL's last path segment so that files on
//! disk stay legible (`moonveil_katana.png` rather than `img-17.png`).

use crate::url::decode_component;
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

static SIZE_SUFFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)[_-](?:\d{2,4}px|\d+x\d+)$").expect("size suffix regex is valid")
});
static DENSITY_SUFFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)@\d+x$").expect("density suffix regex is valid"));
static SIZE_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:\d+px|\d+x\d+)$").expect("size token regex is valid"));

/// Generic site and content terms that never make a name more specific
const STOP_WORDS: &[&str] = &[
    "elden", "ring", "eldenring", "shadow", "of", "the", "erdtree", "dlc", "wiki", "guide",
    "file", "image", "images", "icon", "icons", "thumb", "thumbnail", "weapons", "weapon",
    "armor", "armors", "classes", "class", "skills", "skill", "incantations", "incantation",
    "sorceries", "sorcery", "shields", "shield", "helms", "helm", "boss", "map", "maps",
];

/// Maximum number of tokens kept in a derived name
const MAX_TOKENS: usize = 4;

/// Maximum length of a derived name in characters
const MAX_NAME_LEN: usize = 80;

/// Extension used when neither the content type nor the URL gives one
pub const FALLBACK_EXTENSION: &str = ".img";

/// Derives a legible base file name (no extension) for an image
///
/// # Steps
///
/// 1. Take the percent-decoded last path segment and strip its extension
/// 2. Strip a trailing size suffix (`_350px`, `-64x64`) or density suffix (`@2x`)
/// 3. Split into lower-case alphanumeric tokens
/// 4. Drop stop-words, size tokens, tokens of the page slug, and tokens
///    without a letter or shorter than two characters
/// 5. Join the first four survivors with `_`
///
/// If nothing survives, the first token containing a letter is used. Returns
/// None when no usable name can be derived; callers fall back to
/// [`fallback_base_name`].
///
/// # Examples
///
/// ```
/// use url::Url;
/// use wiki_harvest::assets::derive_image_base_name;
///
/// let url = Url::parse("https://wiki.example/images/Elden_Ring_Moonveil_Katana_350px.png").unwrap();
/// assert_eq!(derive_image_base_name(&url, "home").as_deref(), Some("moonveil_katana"));
/// ```
pub fn derive_image_base_name(url: &Url, page_slug: &str) -> Option<String> {
    let segment = url
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .unwrap_or("");
    let file = decode_component(segment);

    let stem = match file.rfind('.') {
        Some(dot) if dot > 0 => &file[..dot],
        _ => file.as_str(),
    };
    let stem = SIZE_SUFFIX_RE.replace(stem, "");
    let stem = DENSITY_SUFFIX_RE.replace(&stem, "");

    let lowered = stem.to_lowercase();
    let tokens: Vec<&str> = lowered
        .split(|c: char| !(c.is_ascii_lowercase() || c.is_ascii_digit()))
        .filter(|t| !t.is_empty())
        .collect();

    let page_tokens: Vec<&str> = page_slug
        .split(|c: char| !(c.is_ascii_lowercase() || c.is_ascii_digit()))
        .filter(|t| !t.is_empty())
        .collect();

    let picked: Vec<&str> = tokens
        .iter()
        .copied()
        .filter(|t| {
            !STOP_WORDS.contains(t)
                && !SIZE_TOKEN_RE.is_match(t)
                && !page_tokens.contains(t)
                && has_letter(t)
                && t.len() >= 2
        })
        .take(MAX_TOKENS)
        .collect();

    let name = if picked.is_empty() {
        tokens.iter().copied().find(|t| has_letter(t)).unwrap_or("").to_string()
    } else {
        picked.join("_")
    };

    let mut name = sanitize_file_name(&name);
    if name.len() < 2 {
        return None;
    }
    name.truncate(MAX_NAME_LEN);
    Some(name)
}

/// Base name for an image whose URL yields nothing usable
///
/// The first unnamed image of a page takes the page slug; later ones are
/// suffixed with their 1-based position.
pub fn fallback_base_name(page_slug: &str, index: usize) -> String {
    if index <= 1 {
        page_slug.to_string()
    } else {
        format!("{}-{}", page_slug, index)
    }
}

/// Restricts a name to `[a-z0-9._-]`, trimming dashes at both ends
pub fn sanitize_file_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_dash = false;

    for c in name.chars().flat_map(|c| c.to_lowercase()) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '.' | '_' | '-') {
            if pending_dash {
                out.push('-');
                pending_dash = false;
            }
            out.push(c);
        } else {
            pending_dash = true;
        }
    }

    out.trim_matches('-').to_string()
}

/// Maps an image content type to a file extension
///
/// Unknown types fall back to the URL's own extension, then to
/// [`FALLBACK_EXTENSION`].
///
/// # Examples
///
/// ```
/// use url::Url;
/// use wiki_harvest::assets::extension_for;
///
/// let url = Url::parse("https://wiki.example/a.bmp").unwrap();
/// assert_eq!(extension_for("image/jpeg", &url), ".jpg");
/// assert_eq!(extension_for("image/x-unknown", &url), ".bmp");
/// ```
pub fn extension_for(content_type: &str, url: &Url) -> String {
    content_type_to_ext(content_type)
        .map(str::to_string)
        .or_else(|| url_extension(url))
        .unwrap_or_else(|| FALLBACK_EXTENSION.to_string())
}

fn content_type_to_ext(content_type: &str) -> Option<&'static str> {
    let ct = content_type.to_ascii_lowercase();
    if ct.contains("jpeg") {
        Some(".jpg")
    } else if ct.contains("png") {
        Some(".png")
    } else if ct.contains("gif") {
        Some(".gif")
    } else if ct.contains("webp") {
        Some(".webp")
    } else if ct.contains("svg") {
        Some(".svg")
    } else {
        None
    }
}

fn url_extension(url: &Url) -> Option<String> {
    let segment = url.path_segments()?.next_back()?;
    let dot = segment.rfind('.')?;
    let ext = sanitize_file_name(&segment[dot + 1..]);
    (dot > 0 && !ext.is_empty()).then(|| format!(".{}", ext))
}

fn has_letter(token: &str) -> bool {
    token.chars().any(|c| c.is_ascii_lowercase())
}
