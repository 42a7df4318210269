//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the control loop of a harvest run:
//! - Preparing the output tree and loading earlier manifest/index data
//! - Driving the scheduler from the start URL to an empty frontier or the budget
//! - Running every fetched page through extraction, images, rewrite and classification
//! - Persisting page records, then the manifest and both indexes at the end

use crate::assets::{rewrite_content_html, ImagePipeline};
use crate::classify::classify_page;
use crate::config::Config;
use crate::crawler::fetcher::{build_http_client, fetch_page};
use crate::crawler::scheduler::Scheduler;
use crate::extract::extract_page;
use crate::output::{write_indexes, CrawlStatistics, IndexBuilder};
use crate::robots::fetch_robots;
use crate::storage::{FsStorage, IndexEntry, PageRecord, Storage};
use crate::url::{normalize_url, url_to_slug};
use crate::Result;
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Main crawler coordinator structure
///
/// Owns every piece of mutable run state; nothing is shared.
pub struct Coordinator<S: Storage = FsStorage> {
    client: Client,
    storage: S,
    scheduler: Scheduler,
    images: ImagePipeline,
    index: IndexBuilder,
    stats: CrawlStatistics,
    timeout: Duration,
}

impl Coordinator<FsStorage> {
    /// Creates a coordinator writing to the configured output directory
    ///
    /// # Arguments
    ///
    /// * `config` - The validated run configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run; robots.txt has been fetched
    /// * `Err(HarvestError)` - Bad start URL, client construction or storage failure
    pub async fn new(config: Config) -> Result<Self> {
        let storage = FsStorage::new(&config.output.directory);
        Self::with_storage(config, storage).await
    }
}

impl<S: Storage> Coordinator<S> {
    /// Creates a coordinator over an explicit storage backend
    ///
    /// The manifest and index left by a previous run are loaded so that
    /// pages not revisited in this run survive the final index rewrite.
    pub async fn with_storage(config: Config, storage: S) -> Result<Self> {
        let start_url = normalize_url(&config.crawler.start_url)?;
        let client = build_http_client(&config.user_agent)?;
        let timeout = Duration::from_secs(config.crawler.request_timeout_secs);

        let robots = fetch_robots(&client, &start_url, timeout).await;

        let manifest = storage.load_manifest()?;
        let previous_index = storage.load_index()?;
        tracing::debug!(
            "Loaded {} manifest entries and {} index entries from earlier runs",
            manifest.len(),
            previous_index.len()
        );

        let scheduler = Scheduler::new(start_url.clone(), &config.crawler, robots);
        let images = ImagePipeline::new(client.clone(), &config, &start_url, manifest);

        Ok(Self {
            client,
            storage,
            scheduler,
            images,
            index: IndexBuilder::from_existing(previous_index),
            stats: CrawlStatistics::start(&config.output.directory),
            timeout,
        })
    }

    /// Runs the main crawl loop to completion
    ///
    /// Page-level failures are logged and skipped. Only filesystem failures
    /// abort the run.
    ///
    /// # Returns
    ///
    /// The run statistics, with the finish time stamped
    pub async fn run(mut self) -> Result<CrawlStatistics> {
        self.storage.prepare()?;
        self.scheduler.start()?;

        tracing::info!(
            "Starting crawl (budget {} pages, phase {})",
            self.scheduler.max_pages(),
            self.scheduler.phase()
        );

        while let Some(url) = self.scheduler.next_url() {
            self.scheduler.wait_turn().await;
            let outcome = self.process_page(&url).await;
            self.scheduler.end_visit();

            if let Err(e) = outcome {
                if e.is_fatal() {
                    tracing::error!("Aborting crawl at {}: {}", url, e);
                    return Err(e);
                }
                tracing::warn!("Skipping {}: {}", url, e);
                self.stats.pages_failed += 1;
            }
        }

        if self.scheduler.is_empty() {
            tracing::info!("Frontier exhausted");
        } else {
            tracing::info!(
                "Page budget reached, {} URLs left in frontier",
                self.scheduler.frontier_size()
            );
        }
        self.scheduler.finish()?;

        self.storage.save_manifest(self.images.manifest())?;
        self.stats.index_entries = write_indexes(&mut self.storage, self.index.sorted())?;
        self.stats.skipped = self.scheduler.skips();
        self.stats.finish();

        tracing::info!(
            "Crawl completed: {} pages processed, {} failed, {} images downloaded",
            self.stats.pages_processed,
            self.stats.pages_failed,
            self.stats.images.downloaded
        );

        Ok(self.stats)
    }

    /// Processes a single page
    ///
    /// This method:
    /// 1. Fetches the page (failures here are skippable)
    /// 2. Extracts structured content
    /// 3. Downloads the page's images and rewrites its content
    /// 4. Classifies and persists the page record
    /// 5. Enqueues in-scope outbound links
    async fn process_page(&mut self, url: &Url) -> Result<()> {
        let page = fetch_page(&self.client, url, self.timeout).await?;

        let n = self.scheduler.record_processed();
        tracing::info!("[{}/{}] {}", n, self.scheduler.max_pages(), url.path());

        let extracted = extract_page(&page.body, url);
        let slug = url_to_slug(url);

        let images = self
            .images
            .process_page(&mut self.storage, url, &slug, &extracted.images)
            .await?;
        self.stats.images.accumulate(&images.stats);

        let content_html_local = extracted
            .content_html
            .as_deref()
            .map(|html| rewrite_content_html(html, url, &images.mapping));

        let page_type = classify_page(&extracted.categories, &extracted.title, url.path());

        let record = PageRecord {
            url: url.to_string(),
            slug,
            title: extracted.title,
            description: extracted.description,
            h1: extracted.h1,
            excerpt: extracted.excerpt,
            content_html: extracted.content_html,
            content_html_local,
            content_text: extracted.content_text,
            headings: extracted.headings,
            infobox_html: extracted.infobox_html,
            categories: extracted.categories,
            page_type: Some(page_type),
            images: images.refs,
        };

        self.storage.save_page(&record)?;
        self.index.insert(IndexEntry::from_record(&record, page_type));
        self.storage.save_manifest(self.images.manifest())?;
        self.stats.pages_processed += 1;

        let added = self.scheduler.enqueue_links(&extracted.links, url);
        self.stats.links_enqueued += added as u64;
        tracing::debug!(
            "{} ({}): {} new links, frontier {}",
            record.slug,
            page_type,
            added,
            self.scheduler.frontier_size()
        );

        Ok(())
    }
}
