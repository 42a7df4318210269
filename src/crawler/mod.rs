//! Crawler module for page fetching and crawl orchestration
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching of pages and images with deadlines and type checks
//! - The FIFO frontier with dedup, scope and robots checks
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod scheduler;

pub use coordinator::Coordinator;
pub use fetcher::{
    build_http_client, fetch_image, fetch_page, FetchError, FetchedImage, FetchedPage,
    IMAGE_ACCEPT,
};
pub use scheduler::{Scheduler, SkipCounts, SkipReason};

use crate::config::Config;
use crate::output::CrawlStatistics;
use crate::Result;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Fetch robots.txt for the start host
/// 2. Load the manifest and index left by earlier runs
/// 3. Visit pages breadth-first until the frontier empties or the budget is spent
/// 4. Write the manifest and both indexes
///
/// # Arguments
///
/// * `config` - The validated run configuration
///
/// # Returns
///
/// * `Ok(CrawlStatistics)` - Crawl completed
/// * `Err(HarvestError)` - Startup failed or a filesystem write failed
pub async fn crawl(config: Config) -> Result<CrawlStatistics> {
    Coordinator::new(config).await?.run().await
}
