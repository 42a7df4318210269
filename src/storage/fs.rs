//! Filesystem storage implementation
//!
//! This module provides a JSON-on-disk implementation of the Storage trait.
//! The layout under the output root is:
//!
//! ```text
//! manifest.json
//! index.json
//! by-type.json
//! pages/<slug>.json
//! images/<page-slug>/<name><ext>
//! ```

use crate::storage::traits::{Storage, StorageResult};
use crate::storage::{IndexEntry, Manifest, PageRecord};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

const MANIFEST_FILE: &str = "manifest.json";
const INDEX_FILE: &str = "index.json";
const BY_TYPE_FILE: &str = "by-type.json";
const PAGES_DIR: &str = "pages";
const IMAGES_DIR: &str = "images";

/// Filesystem storage backend rooted at an output directory
#[derive(Debug, Clone)]
pub struct FsStorage {
    root: PathBuf,
}

impl FsStorage {
    /// Creates a storage handle; nothing is touched on disk until
    /// [`Storage::prepare`] or a write
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the output root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the directory holding page records
    pub fn pages_dir(&self) -> PathBuf {
        self.root.join(PAGES_DIR)
    }

    /// Returns the path a page record with this slug is stored at
    pub fn page_path(&self, slug: &str) -> PathBuf {
        self.pages_dir().join(format!("{}.json", slug))
    }

    fn write_json<T: Serialize + ?Sized>(&self, path: &Path, value: &T) -> StorageResult<()> {
        let json = serde_json::to_string_pretty(value)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Reads a JSON file, treating a missing or unparseable file as absent
    fn read_json_lenient<T: DeserializeOwned>(&self, path: &Path) -> Option<T> {
        let content = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!("Cannot read {}: {}", path.display(), e);
                return None;
            }
        };

        match serde_json::from_str(&content) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("Ignoring unparseable {}: {}", path.display(), e);
                None
            }
        }
    }
}

impl Storage for FsStorage {
    fn prepare(&mut self) -> StorageResult<()> {
        fs::create_dir_all(self.pages_dir())?;
        fs::create_dir_all(self.root.join(IMAGES_DIR))?;
        Ok(())
    }

    fn save_page(&mut self, record: &PageRecord) -> StorageResult<()> {
        fs::create_dir_all(self.pages_dir())?;
        let path = self.page_path(&record.slug);
        self.write_json(&path, record)?;
        tracing::debug!("Wrote {}", path.display());
        Ok(())
    }

    fn load_pages(&self) -> StorageResult<Vec<PageRecord>> {
        let mut files: Vec<PathBuf> = fs::read_dir(self.pages_dir())?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
            })
            .collect();
        files.sort();

        let mut records = Vec::with_capacity(files.len());
        for path in files {
            let Some(mut record) = self.read_json_lenient::<PageRecord>(&path) else {
                tracing::warn!("Skipping page record {}", path.display());
                continue;
            };

            if record.slug.is_empty() {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    record.slug = stem.to_string();
                }
            }
            if record.title.is_empty() {
                record.title = record.slug.clone();
            }
            records.push(record);
        }

        Ok(records)
    }

    fn save_image(
        &mut self,
        page_slug: &str,
        base_name: &str,
        extension: &str,
        bytes: &[u8],
    ) -> StorageResult<String> {
        let dir = self.root.join(IMAGES_DIR).join(page_slug);
        fs::create_dir_all(&dir)?;

        let mut counter = 1u32;
        loop {
            let name = if counter == 1 {
                format!("{}{}", base_name, extension)
            } else {
                format!("{}-{}{}", base_name, counter, extension)
            };

            // create_new fails when the name is already taken
            match OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(dir.join(&name))
            {
                Ok(mut file) => {
                    file.write_all(bytes)?;
                    return Ok(format!("{}/{}/{}", IMAGES_DIR, page_slug, name));
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => counter += 1,
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn load_manifest(&self) -> StorageResult<Manifest> {
        Ok(self
            .read_json_lenient(&self.root.join(MANIFEST_FILE))
            .unwrap_or_default())
    }

    fn save_manifest(&mut self, manifest: &Manifest) -> StorageResult<()> {
        fs::create_dir_all(&self.root)?;
        self.write_json(&self.root.join(MANIFEST_FILE), manifest)
    }

    fn load_index(&self) -> StorageResult<Vec<IndexEntry>> {
        Ok(self
            .read_json_lenient(&self.root.join(INDEX_FILE))
            .unwrap_or_default())
    }

    fn save_indexes(
        &mut self,
        index: &[IndexEntry],
        by_type: &BTreeMap<String, Vec<IndexEntry>>,
    ) -> StorageResult<()> {
        fs::create_dir_all(&self.root)?;
        self.write_json(&self.root.join(INDEX_FILE), index)?;
        self.write_json(&self.root.join(BY_TYPE_FILE), by_type)
    }
}
