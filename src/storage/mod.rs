//! Storage module for persisting crawl output
//!
//! This module handles every on-disk artifact of a run:
//! - One JSON record per page under `pages/`
//! - Downloaded images under `images/<page-slug>/`
//! - The `manifest.json` remote URL → local path map
//! - The `index.json` and `by-type.json` indexes

mod fs;
mod traits;

pub use fs::FsStorage;
pub use traits::{Storage, StorageError, StorageResult};

use crate::classify::PageType;
use crate::extract::Heading;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Remote image URL → local path relative to the output root
pub type Manifest = BTreeMap<String, String>;

/// One image reference of a page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRef {
    /// Absolute remote URL
    pub url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,

    /// Set when the download succeeded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_path: Option<String>,
}

/// The durable record of one processed page, stored as `pages/<slug>.json`
///
/// Readers must tolerate absent optional fields and prefer
/// `contentHtmlLocal` over `contentHtml` when both are present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PageRecord {
    pub url: String,
    pub slug: String,
    pub title: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub h1: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,

    /// Sanitized main content with remote image references
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_html: Option<String>,

    /// Sanitized main content with images pointing at local files
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_html_local: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_text: Option<String>,

    pub headings: Vec<Heading>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub infobox_html: Option<String>,

    pub categories: Vec<String>,

    /// Absent in records written by older tools; unknown tags read as absent
    #[serde(
        deserialize_with = "lenient_page_type",
        skip_serializing_if = "Option::is_none"
    )]
    pub page_type: Option<PageType>,

    pub images: Vec<ImageRef>,
}

impl PageRecord {
    /// Returns the local path of the first successfully downloaded image
    pub fn primary_image(&self) -> Option<&str> {
        self.images.iter().find_map(|img| img.local_path.as_deref())
    }
}

/// Summary projection of a page record used by both indexes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexEntry {
    pub slug: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    pub title: String,

    #[serde(default, deserialize_with = "page_type_or_other")]
    pub page_type: PageType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_image: Option<String>,
}

impl IndexEntry {
    /// Projects a page record with a known classification tag
    pub fn from_record(record: &PageRecord, page_type: PageType) -> Self {
        Self {
            slug: record.slug.clone(),
            url: (!record.url.is_empty()).then(|| record.url.clone()),
            title: record.title.clone(),
            page_type,
            primary_image: record.primary_image().map(str::to_string),
        }
    }
}

/// Reads a stored classification tag, treating unknown tags as absent
fn lenient_page_type<'de, D>(deserializer: D) -> Result<Option<PageType>, D::Error>
where
    D: Deserializer<'de>,
{
    let tag = Option::<String>::deserialize(deserializer)?;
    Ok(tag.as_deref().and_then(PageType::from_tag))
}

fn page_type_or_other<'de, D>(deserializer: D) -> Result<PageType, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_page_type(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> PageRecord {
        PageRecord {
            url: "https://wiki.example/Malenia".to_string(),
            slug: "malenia".to_string(),
            title: "Malenia".to_string(),
            page_type: Some(PageType::Boss),
            images: vec![
                ImageRef {
                    url: "https://wiki.example/broken.png".to_string(),
                    alt: None,
                    local_path: None,
                },
                ImageRef {
                    url: "https://wiki.example/malenia.png".to_string(),
                    alt: Some("Malenia".to_string()),
                    local_path: Some("images/malenia/portrait.png".to_string()),
                },
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_page_record_uses_camel_case_and_skips_absent_fields() {
        let mut page = record();
        page.content_html_local = Some("<p>x</p>".to_string());
        let json = serde_json::to_value(&page).unwrap();

        assert_eq!(json["contentHtmlLocal"], "<p>x</p>");
        assert_eq!(json["pageType"], "boss");
        assert_eq!(json["images"][1]["localPath"], "images/malenia/portrait.png");
        assert!(json.get("description").is_none());
        assert!(json.get("infoboxHtml").is_none());
        assert!(json["images"][0].get("localPath").is_none());
    }

    #[test]
    fn test_page_record_tolerates_missing_fields() {
        let page: PageRecord = serde_json::from_str(r#"{"title": "Bare"}"#).unwrap();
        assert_eq!(page.title, "Bare");
        assert!(page.slug.is_empty());
        assert!(page.images.is_empty());
        assert!(page.page_type.is_none());
    }

    #[test]
    fn test_primary_image_is_first_local_path() {
        assert_eq!(record().primary_image(), Some("images/malenia/portrait.png"));
    }

    #[test]
    fn test_index_entry_projection() {
        let entry = IndexEntry::from_record(&record(), PageType::Boss);
        assert_eq!(entry.slug, "malenia");
        assert_eq!(entry.page_type, PageType::Boss);
        assert_eq!(
            entry.primary_image.as_deref(),
            Some("images/malenia/portrait.png")
        );

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["primaryImage"], "images/malenia/portrait.png");
        assert_eq!(json["pageType"], "boss");
    }

    #[test]
    fn test_unknown_page_type_reads_as_absent() {
        let page: PageRecord =
            serde_json::from_str(r#"{"slug": "godrick", "title": "Godrick", "pageType": "legacy-boss"}"#)
                .unwrap();
        assert_eq!(page.slug, "godrick");
        assert!(page.page_type.is_none());

        let page: PageRecord = serde_json::from_str(r#"{"pageType": null}"#).unwrap();
        assert!(page.page_type.is_none());
    }

    #[test]
    fn test_index_entry_unknown_page_type_is_other() {
        let entries: Vec<IndexEntry> = serde_json::from_str(
            r#"[{"slug": "godrick", "title": "Godrick", "pageType": "legacy-boss"},
                {"slug": "ranni", "title": "Ranni", "pageType": "npc"},
                {"slug": "bare", "title": "Bare"}]"#,
        )
        .unwrap();
        let types: Vec<PageType> = entries.iter().map(|e| e.page_type).collect();
        assert_eq!(types, vec![PageType::Other, PageType::Npc, PageType::Other]);
    }
}
