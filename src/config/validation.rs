use crate::config::types::{Config, CrawlerConfig, ImagesConfig, OutputConfig, UserAgentConfig};
use crate::ConfigError;
use url::Url;

/// Lowest page pacing accepted from configuration (milliseconds)
pub const MIN_PAGE_DELAY_MS: u64 = 100;

/// Lowest image pacing accepted from configuration (milliseconds)
pub const MIN_IMAGE_DELAY_MS: u64 = 50;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_images_config(&config.images)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.start_url).map_err(|e| {
        ConfigError::InvalidUrl(format!("Invalid start URL '{}': {}", config.start_url, e))
    })?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "Start URL '{}' must use HTTP or HTTPS",
            config.start_url
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "Start URL '{}' has no host",
            config.start_url
        )));
    }

    if config.max_pages < 1 {
        return Err(ConfigError::Validation(
            "max_pages must be >= 1, got 0".to_string(),
        ));
    }

    if config.page_delay_ms < MIN_PAGE_DELAY_MS {
        return Err(ConfigError::Validation(format!(
            "page_delay_ms must be >= {}ms, got {}ms",
            MIN_PAGE_DELAY_MS, config.page_delay_ms
        )));
    }

    if config.request_timeout_secs < 1 || config.request_timeout_secs > 300 {
        return Err(ConfigError::Validation(format!(
            "request_timeout_secs must be between 1 and 300, got {}",
            config.request_timeout_secs
        )));
    }

    Ok(())
}

/// Validates image download configuration
fn validate_images_config(config: &ImagesConfig) -> Result<(), ConfigError> {
    if config.delay_ms < MIN_IMAGE_DELAY_MS {
        return Err(ConfigError::Validation(format!(
            "image delay_ms must be >= {}ms, got {}ms",
            MIN_IMAGE_DELAY_MS, config.delay_ms
        )));
    }

    for host in &config.extra_hosts {
        if host.is_empty() || host.contains('/') {
            return Err(ConfigError::Validation(format!(
                "extra image host must be a bare host name, got '{}'",
                host
            )));
        }
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.directory.trim().is_empty() {
        return Err(ConfigError::Validation(
            "output directory cannot be empty".to_string(),
        ));
    }

    Ok(())
}
