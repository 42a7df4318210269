//! Storage traits and error types
//!
//! This module defines the trait interface for output backends and
//! associated error types.

use crate::storage::{IndexEntry, Manifest, PageRecord};
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors that can occur during storage operations
///
/// Every variant is fatal to a crawl run.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for output backend implementations
///
/// This trait defines every write and read the crawler and the offline
/// index rebuild need. Loading helpers are lenient: a missing or unreadable
/// manifest or index is treated as empty.
pub trait Storage {
    // ===== Layout =====

    /// Creates the output directory tree
    fn prepare(&mut self) -> StorageResult<()>;

    // ===== Pages =====

    /// Writes one page record, keyed by its slug
    ///
    /// An existing record with the same slug is overwritten.
    fn save_page(&mut self, record: &PageRecord) -> StorageResult<()>;

    /// Reads every stored page record
    ///
    /// Records that cannot be parsed are skipped with a warning.
    fn load_pages(&self) -> StorageResult<Vec<PageRecord>>;

    // ===== Images =====

    /// Writes image bytes into the page's image directory
    ///
    /// # Arguments
    ///
    /// * `page_slug` - Slug of the page the image belongs to
    /// * `base_name` - File name without extension
    /// * `extension` - Extension including the leading dot
    /// * `bytes` - Image content
    ///
    /// # Returns
    ///
    /// The path of the written file relative to the output root, using `/`
    /// separators. When `base_name` is already taken a `-2`, `-3`, ... suffix
    /// is appended.
    fn save_image(
        &mut self,
        page_slug: &str,
        base_name: &str,
        extension: &str,
        bytes: &[u8],
    ) -> StorageResult<String>;

    // ===== Manifest =====

    /// Loads the remote URL → local path manifest
    fn load_manifest(&self) -> StorageResult<Manifest>;

    /// Rewrites the manifest
    fn save_manifest(&mut self, manifest: &Manifest) -> StorageResult<()>;

    // ===== Indexes =====

    /// Loads the title-sorted index written by a previous run
    fn load_index(&self) -> StorageResult<Vec<IndexEntry>>;

    /// Rewrites both the title-sorted index and the type-grouped index
    fn save_indexes(
        &mut self,
        index: &[IndexEntry],
        by_type: &BTreeMap<String, Vec<IndexEntry>>,
    ) -> StorageResult<()>;
}
