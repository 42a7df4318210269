use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Command-line values that take precedence over the configuration file
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub start_url: Option<String>,
    pub max_pages: Option<u32>,
    pub output_dir: Option<String>,
    /// Comma-separated keyword list
    pub image_include: Option<String>,
    pub max_images: Option<u32>,
}

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    validate(&config)?;
    Ok(config)
}

/// Computes a SHA-256 hash of the configuration file content
///
/// Logged at startup so two runs with different settings can be told apart.
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    Ok(hex::encode(result))
}

/// Loads a configuration and returns both the config and its hash
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}

/// Applies command-line overrides on top of a base configuration and re-validates
pub fn apply_overrides(mut config: Config, overrides: Overrides) -> Result<Config, ConfigError> {
    if let Some(start_url) = overrides.start_url {
        config.crawler.start_url = start_url;
    }
    if let Some(max_pages) = overrides.max_pages {
        config.crawler.max_pages = max_pages;
    }
    if let Some(dir) = overrides.output_dir {
        config.output.directory = dir;
    }
    if let Some(include) = overrides.image_include {
        config.images.include = parse_keyword_list(&include);
    }
    if let Some(max_images) = overrides.max_images {
        config.images.max_images = max_images;
    }

    validate(&config)?;
    Ok(config)
}

/// Splits a comma-separated keyword list, trimming and lower-casing each entry
///
/// Empty entries are dropped, so `""` yields an empty (accept-all) filter.
pub fn parse_keyword_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_valid_config() {
        let config_content = r#"
[crawler]
start-url = "https://wiki.example/Home"
max-pages = 5
page-delay-ms = 500

[images]
max-images = 10
include = ["malenia"]

[user-agent]
crawler-name = "TestCrawler"
crawler-version = "1.0"
contact-url = "https://example.com/about"

[output]
directory = "./out"
"#;

        let file = create_temp_config(config_content);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.crawler.start_url, "https://wiki.example/Home");
        assert_eq!(config.crawler.max_pages, 5);
        assert_eq!(config.crawler.page_delay_ms, 500);
        assert_eq!(config.images.max_images, 10);
        assert_eq!(config.images.include, vec!["malenia".to_string()]);
        assert_eq!(config.user_agent.crawler_name, "TestCrawler");
        assert_eq!(config.output.directory, "./out");
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let file = create_temp_config("");
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.crawler.start_url, "https://eldenring.wiki.gg/");
        assert_eq!(config.crawler.max_pages, 40);
        assert_eq!(config.images.max_images, 150);
        assert!(config.images.include.is_empty());
        assert!(config
            .crawler
            .banned_namespaces
            .contains(&"Special:".to_string()));
    }

    #[test]
    fn test_load_config_with_invalid_path() {
        let result = load_config(Path::new("/nonexistent/config.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_with_invalid_toml() {
        let file = create_temp_config("this is not valid TOML {{{");
        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_config_with_validation_error() {
        let config_content = r#"
[crawler]
page-delay-ms = 0
"#;

        let file = create_temp_config(config_content);
        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_compute_config_hash() {
        let file = create_temp_config("test content");

        let hash1 = compute_config_hash(file.path()).unwrap();
        let hash2 = compute_config_hash(file.path()).unwrap();

        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64);
    }

    #[test]
    fn test_different_content_different_hash() {
        let file1 = create_temp_config("content 1");
        let file2 = create_temp_config("content 2");

        let hash1 = compute_config_hash(file1.path()).unwrap();
        let hash2 = compute_config_hash(file2.path()).unwrap();

        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_apply_overrides() {
        let overrides = Overrides {
            start_url: Some("https://wiki.example/Start".to_string()),
            max_pages: Some(3),
            output_dir: Some("/tmp/wiki".to_string()),
            image_include: Some(" Malenia, ,RANNI ".to_string()),
            max_images: Some(7),
        };

        let config = apply_overrides(Config::default(), overrides).unwrap();

        assert_eq!(config.crawler.start_url, "https://wiki.example/Start");
        assert_eq!(config.crawler.max_pages, 3);
        assert_eq!(config.output.directory, "/tmp/wiki");
        assert_eq!(config.images.include, vec!["malenia", "ranni"]);
        assert_eq!(config.images.max_images, 7);
    }

    #[test]
    fn test_apply_overrides_rejects_bad_start_url() {
        let overrides = Overrides {
            start_url: Some("ftp://wiki.example/".to_string()),
            ..Default::default()
        };

        let result = apply_overrides(Config::default(), overrides);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_keyword_list_empty() {
        assert!(parse_keyword_list("").is_empty());
        assert!(parse_keyword_list(" , ,").is_empty());
    }
}
