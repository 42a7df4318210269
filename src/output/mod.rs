//! Output module for the derived indexes and the run summary
//!
//! This module handles:
//! - Building `index.json` and `by-type.json` from crawled pages
//! - Rebuilding both indexes offline from stored page records
//! - Recording run statistics and printing the final summary

mod index;
pub mod stats;

pub use index::{group_by_type, rebuild_index, sort_entries, write_indexes, IndexBuilder};
pub use stats::{print_statistics, CrawlStatistics};
