//! Page classification into the content taxonomy
//!
//! Classification is a first-match scan over ordered keyword groups; earlier
//! groups win when keywords overlap (a "Boss Weapons" page is a boss page).

use crate::url::decode_component;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Taxonomy tag describing a page's subject
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PageType {
    Boss,
    Weapon,
    Armor,
    Shield,
    Talisman,
    SpiritAsh,
    Sorcery,
    Incantation,
    SiteOfGrace,
    Region,
    Location,
    Npc,
    Other,
}

impl PageType {
    /// Returns the tag as written in page records and `by-type.json`
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Boss => "boss",
            Self::Weapon => "weapon",
            Self::Armor => "armor",
            Self::Shield => "shield",
            Self::Talisman => "talisman",
            Self::SpiritAsh => "spirit-ash",
            Self::Sorcery => "sorcery",
            Self::Incantation => "incantation",
            Self::SiteOfGrace => "site-of-grace",
            Self::Region => "region",
            Self::Location => "location",
            Self::Npc => "npc",
            Self::Other => "other",
        }
    }

    /// Parses a tag string; unknown tags yield None
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::all().into_iter().find(|t| t.as_str() == tag)
    }

    /// Every tag in taxonomy order
    fn all() -> Vec<Self> {
        vec![
            Self::Boss,
            Self::Weapon,
            Self::Armor,
            Self::Shield,
            Self::Talisman,
            Self::SpiritAsh,
            Self::Sorcery,
            Self::Incantation,
            Self::SiteOfGrace,
            Self::Region,
            Self::Location,
            Self::Npc,
            Self::Other,
        ]
    }
}

impl Default for PageType {
    fn default() -> Self {
        Self::Other
    }
}

impl fmt::Display for PageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Keyword groups used during a live crawl, in precedence order
const CRAWL_RULES: &[(PageType, &[&str])] = &[
    (PageType::Boss, &["boss", "bosses"]),
    (PageType::Weapon, &["weapons", "weapon"]),
    (
        PageType::Armor,
        &["armor", "armors", "helm", "chest armor", "gauntlets", "greaves"],
    ),
    (PageType::Shield, &["shield", "shields"]),
    (PageType::Talisman, &["talisman", "talismans"]),
    (PageType::SpiritAsh, &["spirit ash", "spirit ashes"]),
    (PageType::Sorcery, &["sorcery", "sorceries"]),
    (PageType::Incantation, &["incantation", "incantations"]),
    (PageType::SiteOfGrace, &["site of grace", "grace"]),
    (PageType::Region, &["region", "regions"]),
    (
        PageType::Location,
        &["location", "locations", "area", "areas"],
    ),
    (PageType::Npc, &["npc"]),
];

/// Keyword groups used when rebuilding indexes from stored records
///
/// Matched against a normalized `title slug` string, so multi-word keywords
/// are written with spaces.
const OFFLINE_RULES: &[(PageType, &[&str])] = &[
    (PageType::Boss, &["boss", "bosses"]),
    (PageType::Weapon, &["weapon", "weapons", "arme", "armes"]),
    (
        PageType::Armor,
        &["armor", "armure", "helm", "gauntlets", "greaves", "chest armor"],
    ),
    (PageType::Shield, &["shield", "bouclier"]),
    (PageType::Talisman, &["talisman"]),
    (PageType::Sorcery, &["spells", "sorcery", "sorceries"]),
    (PageType::Incantation, &["incantation", "incantations"]),
    (
        PageType::SiteOfGrace,
        &["grace", "site of grace", "sites of grace", "gr3ce"],
    ),
    (
        PageType::Region,
        &["region", "limgrave", "liurnia", "caelid", "altus"],
    ),
    (PageType::Location, &["location", "locations"]),
    (PageType::Npc, &["npc"]),
];

fn first_match(text: &str, rules: &[(PageType, &[&str])]) -> PageType {
    rules
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| text.contains(k)))
        .map(|(tag, _)| *tag)
        .unwrap_or(PageType::Other)
}

/// Classifies a crawled page from its categories, title and URL path
///
/// The three inputs are lower-cased (the path percent-decoded first) and
/// concatenated; the first keyword group with any substring hit wins.
///
/// # Examples
///
/// ```
/// use wiki_harvest::classify::{classify_page, PageType};
///
/// let categories = vec!["Bosses".to_string()];
/// assert_eq!(classify_page(&categories, "MALENIA", "/Malenia"), PageType::Boss);
/// assert_eq!(classify_page(&[], "Home", "/"), PageType::Other);
/// ```
pub fn classify_page(categories: &[String], title: &str, path: &str) -> PageType {
    let text = format!(
        "{} {} {}",
        categories.join(" ").to_lowercase(),
        title.to_lowercase(),
        decode_component(path).to_lowercase()
    );
    first_match(&text, CRAWL_RULES)
}

/// Classifies a stored page that carries no tag, from its title and slug
pub fn classify_local(title: &str, slug: &str) -> PageType {
    let text = format!("{} {}", normalize_words(title), normalize_words(slug));
    first_match(&text, OFFLINE_RULES)
}

/// Lower-cases and replaces every non-alphanumeric run with a single space
fn normalize_words(s: &str) -> String {
    s.to_lowercase()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cats(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_bosses_category_is_boss_regardless_of_title_case() {
        let categories = cats(&["Bosses"]);
        assert_eq!(
            classify_page(&categories, "Malenia Blade of Miquella", "/Malenia"),
            PageType::Boss
        );
        assert_eq!(
            classify_page(&categories, "MALENIA BLADE OF MIQUELLA", "/Malenia"),
            PageType::Boss
        );
    }

    #[test]
    fn test_deterministic() {
        let categories = cats(&["Katanas", "Weapons"]);
        let first = classify_page(&categories, "Moonveil", "/Moonveil");
        for _ in 0..10 {
            assert_eq!(classify_page(&categories, "Moonveil", "/Moonveil"), first);
        }
        assert_eq!(first, PageType::Weapon);
    }

    #[test]
    fn test_earlier_groups_take_precedence() {
        assert_eq!(
            classify_page(&cats(&["Boss Weapons"]), "x", "/x"),
            PageType::Boss
        );
        assert_eq!(
            classify_page(&cats(&["Shields", "Weapons"]), "x", "/x"),
            PageType::Weapon
        );
    }

    #[test]
    fn test_path_is_decoded() {
        assert_eq!(
            classify_page(&[], "Lobby", "/Spirit%20Ashes"),
            PageType::SpiritAsh
        );
    }

    #[test]
    fn test_title_only() {
        assert_eq!(
            classify_page(&[], "Sites of Grace", "/wiki/Page"),
            PageType::SiteOfGrace
        );
        assert_eq!(classify_page(&[], "Limgrave Region", "/p"), PageType::Region);
        assert_eq!(classify_page(&[], "Ranni (NPC)", "/p"), PageType::Npc);
    }

    #[test]
    fn test_default_other() {
        assert_eq!(classify_page(&[], "Patch Notes", "/Patch_Notes"), PageType::Other);
    }

    #[test]
    fn test_classify_local_uses_slug() {
        assert_eq!(classify_local("Untitled", "caelid"), PageType::Region);
        assert_eq!(classify_local("Armes", "armes"), PageType::Weapon);
        assert_eq!(classify_local("Chest-Armor", "x"), PageType::Armor);
        assert_eq!(classify_local("Home", "home"), PageType::Other);
    }

    #[test]
    fn test_tag_strings() {
        assert_eq!(PageType::SpiritAsh.as_str(), "spirit-ash");
        assert_eq!(PageType::from_tag("site-of-grace"), Some(PageType::SiteOfGrace));
        assert_eq!(PageType::from_tag("unknown"), None);
    }

    #[test]
    fn test_serde_uses_tag_strings() {
        let json = serde_json::to_string(&PageType::SiteOfGrace).unwrap();
        assert_eq!(json, "\"site-of-grace\"");
        let parsed: PageType = serde_json::from_str("\"spirit-ash\"").unwrap();
        assert_eq!(parsed, PageType::SpiritAsh);
    }
}
