//! Wiki-Harvest: a polite offline content harvester for wiki sites
//!
//! This crate walks a wiki breadth-first, respecting robots.txt and pacing
//! constraints, extracts structured page content, localizes images, classifies
//! pages into a content taxonomy and persists a queryable on-disk index.

pub mod assets;
pub mod classify;
pub mod config;
pub mod crawler;
pub mod extract;
pub mod output;
pub mod robots;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Wiki-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] crawler::FetchError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid phase transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::CrawlPhase,
        to: state::CrawlPhase,
    },
}

impl HarvestError {
    /// Returns true if the error must abort the whole run
    ///
    /// Only filesystem failures are fatal: once output cannot be written the
    /// integrity of the artifact tree is no longer guaranteed.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Storage(_) | Self::Io(_))
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,
}

/// Result type alias for Wiki-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

// Re-export commonly used types
pub use classify::{classify_page, PageType};
pub use config::Config;
pub use crawler::{crawl, Coordinator};
pub use state::CrawlPhase;
pub use storage::{FsStorage, IndexEntry, PageRecord};
