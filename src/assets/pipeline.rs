//! Image download pipeline
//!
//! Turns a page's image candidates into downloaded files and image
//! references. Candidates are processed one at a time, in extraction order,
//! with a pacing gap between downloads that spans page boundaries.

use crate::assets::naming::{derive_image_base_name, extension_for, fallback_base_name};
use crate::config::Config;
use crate::crawler::fetch_image;
use crate::extract::ImageCandidate;
use crate::state::Pacer;
use crate::storage::{ImageRef, Manifest, Storage, StorageResult};
use crate::url::{absolutize, ImageHostPolicy};
use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;
use url::Url;

/// Per-page image counters
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ImageStats {
    /// Candidates extracted from the page
    pub found: u32,
    /// Candidates on an allowed host
    pub allowed: u32,
    /// Allowed candidates rejected by the include filter
    pub filtered: u32,
    /// Download attempts
    pub attempted: u32,
    /// Successful downloads
    pub downloaded: u32,
}

impl ImageStats {
    /// Adds another page's counters to these
    pub fn accumulate(&mut self, other: &ImageStats) {
        self.found += other.found;
        self.allowed += other.allowed;
        self.filtered += other.filtered;
        self.attempted += other.attempted;
        self.downloaded += other.downloaded;
    }
}

/// Outcome of running the pipeline over one page
#[derive(Debug, Default, Clone)]
pub struct PageImages {
    /// One reference per attempted candidate, in order
    pub refs: Vec<ImageRef>,
    /// Absolute remote URL → local path for this page's downloads
    pub mapping: HashMap<String, String>,
    pub stats: ImageStats,
}

/// The image asset pipeline of one crawl run
///
/// Owns the run-wide download budget, the download pacer and the manifest.
pub struct ImagePipeline {
    client: Client,
    host_policy: ImageHostPolicy,
    include: Vec<String>,
    max_images: u32,
    attempted_total: u32,
    timeout: Duration,
    pacer: Pacer,
    manifest: Manifest,
}

impl ImagePipeline {
    /// Creates a pipeline for a crawl starting at `start_url`
    ///
    /// # Arguments
    ///
    /// * `client` - Shared HTTP client
    /// * `config` - Run configuration (image section and request timeout)
    /// * `start_url` - The crawl's start URL, anchoring the host allowlist
    /// * `manifest` - Manifest loaded from a previous run, or empty
    pub fn new(client: Client, config: &Config, start_url: &Url, manifest: Manifest) -> Self {
        Self {
            client,
            host_policy: ImageHostPolicy::new(start_url, &config.images.extra_hosts),
            include: config
                .images
                .include
                .iter()
                .map(|k| k.to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
            max_images: config.images.max_images,
            attempted_total: 0,
            timeout: Duration::from_secs(config.crawler.request_timeout_secs),
            pacer: Pacer::from_millis(config.images.delay_ms),
            manifest,
        }
    }

    /// Returns the manifest accumulated so far
    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Returns the number of download attempts made in this run
    pub fn attempted_total(&self) -> u32 {
        self.attempted_total
    }

    /// Returns true once the run-wide download budget is spent
    pub fn limit_reached(&self) -> bool {
        self.attempted_total >= self.max_images
    }

    /// Checks a resolved candidate against the include filter
    fn passes_include_filter(&self, url: &Url, alt: Option<&str>) -> bool {
        if self.include.is_empty() {
            return true;
        }
        let url_lower = url.as_str().to_lowercase();
        let alt_lower = alt.unwrap_or("").to_lowercase();
        self.include
            .iter()
            .any(|k| url_lower.contains(k.as_str()) || alt_lower.contains(k.as_str()))
    }

    /// Downloads and stores the images of one page
    ///
    /// Network and content-type failures are logged and leave the reference
    /// without a local path. Filesystem failures are returned.
    ///
    /// # Arguments
    ///
    /// * `storage` - Where image files are written
    /// * `page_url` - URL of the page, used for resolution and as referer
    /// * `page_slug` - Slug of the page, naming its image directory
    /// * `candidates` - Candidates in extraction order
    pub async fn process_page<S: Storage>(
        &mut self,
        storage: &mut S,
        page_url: &Url,
        page_slug: &str,
        candidates: &[ImageCandidate],
    ) -> StorageResult<PageImages> {
        let mut out = PageImages::default();

        for candidate in candidates {
            out.stats.found += 1;

            let Some(url) = absolutize(&candidate.url, page_url) else {
                continue;
            };
            if !self.host_policy.allows(&url) {
                tracing::trace!("Image host not allowed: {}", url);
                continue;
            }
            out.stats.allowed += 1;

            if !self.passes_include_filter(&url, candidate.alt.as_deref()) {
                out.stats.filtered += 1;
                continue;
            }

            if let Some(local) = out.mapping.get(url.as_str()) {
                out.refs.push(ImageRef {
                    url: url.to_string(),
                    alt: candidate.alt.clone(),
                    local_path: Some(local.clone()),
                });
                continue;
            }

            if self.limit_reached() {
                tracing::debug!(
                    "Image budget of {} reached, skipping remaining images",
                    self.max_images
                );
                break;
            }

            self.pacer.wait().await;
            self.attempted_total += 1;
            out.stats.attempted += 1;

            let fetched = fetch_image(&self.client, &url, page_url, self.timeout).await;
            self.pacer.complete();

            let local_path = match fetched {
                Ok(image) => {
                    let extension = extension_for(&image.content_type, &url);
                    let base_name = derive_image_base_name(&url, page_slug).unwrap_or_else(|| {
                        fallback_base_name(page_slug, out.stats.attempted as usize)
                    });
                    let local = storage.save_image(page_slug, &base_name, &extension, &image.bytes)?;
                    tracing::debug!("[img] {} -> {}", url, local);

                    self.manifest.insert(url.to_string(), local.clone());
                    out.mapping.insert(url.to_string(), local.clone());
                    out.stats.downloaded += 1;
                    Some(local)
                }
                Err(e) => {
                    tracing::warn!("Image skipped: {}", e);
                    None
                }
            };

            out.refs.push(ImageRef {
                url: url.to_string(),
                alt: candidate.alt.clone(),
                local_path,
            });
        }

        tracing::debug!(
            "[images] found:{} allowed:{} filtered:{} attempted:{} downloaded:{}",
            out.stats.found,
            out.stats.allowed,
            out.stats.filtered,
            out.stats.attempted,
            out.stats.downloaded
        );

        Ok(out)
    }
}
