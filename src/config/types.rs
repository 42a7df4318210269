use serde::Deserialize;

/// Default wiki origin crawled when no start URL is given
pub const DEFAULT_START_URL: &str = "https://eldenring.wiki.gg/";

/// Default output directory, relative to the working directory
pub const DEFAULT_OUTPUT_DIR: &str = "packages/web/public/wiki";

/// MediaWiki namespaces that never hold article content
pub const DEFAULT_BANNED_NAMESPACES: &[&str] = &[
    "File:",
    "Fichier:",
    "Special:",
    "User:",
    "Talk:",
    "Template:",
    "Module:",
    "Help:",
    "Project:",
    "Media:",
    "MediaWiki:",
];

/// Known asset-hosting domains whose images may be downloaded
pub const DEFAULT_EXTRA_IMAGE_HOSTS: &[&str] = &[
    "i.imgur.com",
    "imgur.com",
    "wp.com",
    "i0.wp.com",
    "i1.wp.com",
    "i2.wp.com",
    "static.wiki.gg",
    "images.wiki.gg",
    "media.wiki.gg",
];

/// Main configuration structure for Wiki-Harvest
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub images: ImagesConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// The single seed URL; its host bounds the crawl
    pub start_url: String,

    /// Maximum number of pages processed in one run
    pub max_pages: u32,

    /// Minimum time between two page visits (milliseconds)
    pub page_delay_ms: u64,

    /// Deadline for a single HTTP retrieval (seconds)
    pub request_timeout_secs: u64,

    /// Last-segment prefixes of links that are never enqueued
    pub banned_namespaces: Vec<String>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            start_url: DEFAULT_START_URL.to_string(),
            max_pages: 40,
            page_delay_ms: 1200,
            request_timeout_secs: 20,
            banned_namespaces: DEFAULT_BANNED_NAMESPACES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Image download configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ImagesConfig {
    /// Maximum number of image downloads attempted during the whole run
    pub max_images: u32,

    /// Optional keyword filter matched against image URL or alt text
    pub include: Vec<String>,

    /// Minimum time between two image downloads (milliseconds)
    pub delay_ms: u64,

    /// Asset hosts accepted in addition to the crawl's own domain (suffix match)
    pub extra_hosts: Vec<String>,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            max_images: 150,
            include: Vec::new(),
            delay_ms: 300,
            extra_hosts: DEFAULT_EXTRA_IMAGE_HOSTS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct UserAgentConfig {
    /// Name of the crawler
    pub crawler_name: String,

    /// Version of the crawler
    pub crawler_version: String,

    /// URL with information about the crawler
    pub contact_url: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "eldenring-checklist-scraper".to_string(),
            crawler_version: "0.1".to_string(),
            contact_url: "https://localhost".to_string(),
        }
    }
}

impl UserAgentConfig {
    /// Formats the identifying header sent on every request
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{})",
            self.crawler_name, self.crawler_version, self.contact_url
        )
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Root directory receiving pages, images, manifest and indexes
    pub directory: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: DEFAULT_OUTPUT_DIR.to_string(),
        }
    }
}
