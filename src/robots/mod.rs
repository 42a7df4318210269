//! Robots.txt handling module
//!
//! This module provides functionality for fetching and parsing the robots.txt
//! policy of the crawl host.

mod parser;

pub use parser::RobotsPolicy;

use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Fetches robots.txt for the origin of a URL
///
/// Any failure (network error, timeout, non-success status, unreadable body)
/// yields an allow-all policy; the crawl then proceeds unrestricted.
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `origin` - Any URL on the crawl host
/// * `timeout` - Deadline for the retrieval
pub async fn fetch_robots(client: &Client, origin: &Url, timeout: Duration) -> RobotsPolicy {
    let robots_url = match origin.join("/robots.txt") {
        Ok(u) => u,
        Err(e) => {
            tracing::warn!("Cannot build robots.txt URL for {}: {}", origin, e);
            return RobotsPolicy::allow_all();
        }
    };

    let request = async {
        let response = client.get(robots_url.clone()).send().await?;
        if !response.status().is_success() {
            return Ok(None);
        }
        response.text().await.map(Some)
    };

    match tokio::time::timeout(timeout, request).await {
        Ok(Ok(Some(body))) => {
            let policy = RobotsPolicy::from_content(&body);
            tracing::info!(
                "Loaded robots.txt from {} ({} disallow rules)",
                robots_url,
                policy.disallowed().len()
            );
            policy
        }
        Ok(Ok(None)) => {
            tracing::info!("No robots.txt at {}, crawling unrestricted", robots_url);
            RobotsPolicy::allow_all()
        }
        Ok(Err(e)) => {
            tracing::warn!("Failed to fetch {}: {}", robots_url, e);
            RobotsPolicy::allow_all()
        }
        Err(_) => {
            tracing::warn!("Timed out fetching {}", robots_url);
            RobotsPolicy::allow_all()
        }
    }
}

/// Checks if a URL is allowed by a robots policy
pub fn is_allowed(robots: &RobotsPolicy, url: &Url) -> bool {
    robots.is_allowed(url.path())
}
