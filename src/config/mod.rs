//! Configuration module for Wiki-Harvest
//!
//! This module handles loading, parsing, and validating TOML configuration files,
//! and layering command-line overrides on top of them.
//!
//! # Example
//!
//! ```no_run
//! use wiki_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Crawler will process at most {} pages", config.crawler.max_pages);
//! ```

mod parser;
mod types;
mod validation;

pub use types::{
    Config, CrawlerConfig, ImagesConfig, OutputConfig, UserAgentConfig,
    DEFAULT_BANNED_NAMESPACES, DEFAULT_EXTRA_IMAGE_HOSTS, DEFAULT_OUTPUT_DIR, DEFAULT_START_URL,
};

pub use parser::{
    apply_overrides, compute_config_hash, load_config, load_config_with_hash,
    parse_keyword_list, Overrides,
};
pub use validation::{validate, MIN_IMAGE_DELAY_MS, MIN_PAGE_DELAY_MS};
