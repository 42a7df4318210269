//! Run statistics and the final summary
//!
//! This module provides the counters a crawl run accumulates and the
//! formatted summary printed when it ends.

use crate::assets::ImageStats;
use crate::crawler::SkipCounts;
use chrono::{DateTime, Utc};
use std::path::PathBuf;

/// Crawl statistics summary
#[derive(Debug, Clone)]
pub struct CrawlStatistics {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,

    /// Pages fetched and persisted
    pub pages_processed: u32,

    /// Pages whose fetch failed (timeout, status, content type)
    pub pages_failed: u32,

    /// Dequeued URLs skipped by policy or deduplication
    pub skipped: SkipCounts,

    /// Links newly added to the frontier
    pub links_enqueued: u64,

    /// Image counters summed over every page
    pub images: ImageStats,

    /// Entries written to `index.json`, including earlier runs' pages
    pub index_entries: usize,

    pub output_dir: PathBuf,
}

impl CrawlStatistics {
    /// Starts a statistics record stamped with the current time
    pub fn start(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            pages_processed: 0,
            pages_failed: 0,
            skipped: SkipCounts::default(),
            links_enqueued: 0,
            images: ImageStats::default(),
            index_entries: 0,
            output_dir: output_dir.into(),
        }
    }

    /// Stamps the finish time
    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Returns the run duration in seconds, once finished
    pub fn duration_seconds(&self) -> Option<i64> {
        self.finished_at
            .map(|finished| (finished - self.started_at).num_seconds())
    }
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Run:");
    println!("  Started:  {}", stats.started_at.to_rfc3339());
    if let Some(finished) = stats.finished_at {
        println!("  Finished: {}", finished.to_rfc3339());
    }
    if let Some(secs) = stats.duration_seconds() {
        println!("  Duration: {}s", secs);
    }
    println!();

    println!("Pages:");
    println!("  Processed: {}", stats.pages_processed);
    println!("  Failed: {}", stats.pages_failed);
    println!(
        "  Skipped: {} robots, {} off-host, {} already visited",
        stats.skipped.robots, stats.skipped.off_host, stats.skipped.visited
    );
    println!("  Links enqueued: {}", stats.links_enqueued);
    println!();

    println!("Images:");
    println!("  Found: {}", stats.images.found);
    println!("  Allowed: {}", stats.images.allowed);
    println!("  Filtered: {}", stats.images.filtered);
    println!(
        "  Downloaded: {} / {} attempted",
        stats.images.downloaded, stats.images.attempted
    );
    println!();

    println!("Output:");
    println!("  Directory: {}", stats.output_dir.display());
    println!("  Index entries: {}", stats.index_entries);
}
