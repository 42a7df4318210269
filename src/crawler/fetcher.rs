//! HTTP fetcher implementation
//!
//! This module handles every network retrieval of a run:
//! - Building the HTTP client with the identifying user agent
//! - Page GETs validated against an HTML content type
//! - Image GETs sent with referer and accept headers, validated against `image/*`
//!
//! Each call is a single bounded attempt; there is no retry policy.

use crate::config::UserAgentConfig;
use reqwest::header::{ACCEPT, CONTENT_TYPE, REFERER};
use reqwest::{Client, Response};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Accept header sent with image downloads
pub const IMAGE_ACCEPT: &str = "image/avif,image/webp,image/apng,image/*,*/*;q=0.8";

/// A failed retrieval; callers log it and skip the resource
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request to {url} timed out")]
    Timeout { url: String },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("{url} has unexpected content type '{content_type}'")]
    ContentType { url: String, content_type: String },

    #[error("Request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl FetchError {
    fn from_reqwest(url: &Url, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout {
                url: url.to_string(),
            }
        } else {
            Self::Http {
                url: url.to_string(),
                source: err,
            }
        }
    }
}

/// A fetched HTML page
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// HTTP status code
    pub status_code: u16,
    /// Content-Type header value
    pub content_type: String,
    /// Page body
    pub body: String,
}

/// A fetched image
#[derive(Debug, Clone)]
pub struct FetchedImage {
    /// Content-Type header value, always `image/...`
    pub content_type: String,
    /// Raw image bytes
    pub bytes: Vec<u8>,
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The user agent configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use wiki_harvest::config::UserAgentConfig;
/// use wiki_harvest::crawler::build_http_client;
///
/// let client = build_http_client(&UserAgentConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches an HTML page
///
/// Succeeds only for a success status with a `text/html` content type.
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `url` - The page to fetch
/// * `timeout` - Deadline covering the whole request, body included
pub async fn fetch_page(
    client: &Client,
    url: &Url,
    timeout: Duration,
) -> Result<FetchedPage, FetchError> {
    let response = client
        .get(url.clone())
        .timeout(timeout)
        .send()
        .await
        .map_err(|e| FetchError::from_reqwest(url, e))?;

    let (status_code, content_type) = check_response(url, &response, |ct| ct.contains("text/html"))?;

    let body = response
        .text()
        .await
        .map_err(|e| FetchError::from_reqwest(url, e))?;

    Ok(FetchedPage {
        status_code,
        content_type,
        body,
    })
}

/// Downloads an image
///
/// The originating page is sent as referer. Succeeds only for a success
/// status with an `image/*` content type.
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `url` - The image to download
/// * `referer` - URL of the page the image was found on
/// * `timeout` - Deadline covering the whole request, body included
pub async fn fetch_image(
    client: &Client,
    url: &Url,
    referer: &Url,
    timeout: Duration,
) -> Result<FetchedImage, FetchError> {
    let response = client
        .get(url.clone())
        .header(REFERER, referer.as_str())
        .header(ACCEPT, IMAGE_ACCEPT)
        .timeout(timeout)
        .send()
        .await
        .map_err(|e| FetchError::from_reqwest(url, e))?;

    let (_, content_type) = check_response(url, &response, |ct| ct.starts_with("image/"))?;

    let bytes = response
        .bytes()
        .await
        .map_err(|e| FetchError::from_reqwest(url, e))?;

    Ok(FetchedImage {
        content_type,
        bytes: bytes.to_vec(),
    })
}

/// Validates status and content type, returning both
fn check_response(
    url: &Url,
    response: &Response,
    accepts: impl Fn(&str) -> bool,
) -> Result<(u16, String), FetchError> {
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_ascii_lowercase();

    if !accepts(&content_type) {
        return Err(FetchError::ContentType {
            url: url.to_string(),
            content_type,
        });
    }

    Ok((status.as_u16(), content_type))
}
