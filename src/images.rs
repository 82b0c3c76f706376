//! Image search providers.
//!
//! - **[`DisabledImageSearch`]**: always returns no images; used when
//!   `images.provider = "disabled"`.
//! - **[`UnsplashSearch`]**: calls Unsplash's `GET /search/photos` and keeps
//!   the `urls.regular` link of the first three results.
//!
//! Image results are decoration on an advisory, so callers treat any error
//! from a provider as "no images" rather than failing the request.
//!
//! # Retry Strategy
//!
//! `images.max_retries` (default 0) bounds extra attempts:
//! - HTTP 429 and 5xx → retry
//! - other non-success statuses → fail immediately
//! - network errors → retry
//! - backoff: 1s, 2s, 4s, ... (capped at 2^5)

use std::time::Duration;

use anyhow::{bail, Context};
use async_trait::async_trait;
use tracing::debug;

use crate::config::ImagesConfig;
use crate::error::{Error, Result};

/// Number of image URLs kept from a provider response.
pub const MAX_IMAGES: usize = 3;

#[async_trait]
pub trait ImageSearch: Send + Sync {
    /// Returns the provider name (e.g. `"unsplash"`).
    fn provider_name(&self) -> &str;

    /// Image URLs for `query`, at most [`MAX_IMAGES`].
    async fn search(&self, query: &str) -> Result<Vec<String>>;
}

pub struct DisabledImageSearch;

#[async_trait]
impl ImageSearch for DisabledImageSearch {
    fn provider_name(&self) -> &str {
        "disabled"
    }

    async fn search(&self, _query: &str) -> Result<Vec<String>> {
        Ok(Vec::new())
    }
}

pub struct UnsplashSearch {
    client: reqwest::Client,
    url: String,
    access_key: String,
    max_retries: u32,
}

impl UnsplashSearch {
    pub fn new(config: &ImagesConfig) -> anyhow::Result<Self> {
        let access_key = config
            .resolved_access_key()
            .context("Unsplash access key not configured")?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build Unsplash HTTP client")?;

        Ok(Self {
            client,
            url: config.url.trim_end_matches('/').to_string(),
            access_key,
            max_retries: config.max_retries,
        })
    }
}

#[async_trait]
impl ImageSearch for UnsplashSearch {
    fn provider_name(&self) -> &str {
        "unsplash"
    }

    async fn search(&self, query: &str) -> Result<Vec<String>> {
        let mut last_err = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = Duration::from_secs(1 << (attempt - 1).min(5));
                debug!(attempt, ?delay, "retrying Unsplash search");
                tokio::time::sleep(delay).await;
            }

            let resp = self
                .client
                .get(format!("{}/search/photos", self.url))
                .query(&[("query", query), ("client_id", self.access_key.as_str())])
                .send()
                .await;

            match resp {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        let json: serde_json::Value = response.json().await.map_err(|e| {
                            Error::SearchProvider(format!("invalid Unsplash response: {}", e))
                        })?;
                        return parse_unsplash_response(&json);
                    }

                    if status.as_u16() == 429 || status.is_server_error() {
                        last_err = Some(Error::SearchProvider(format!(
                            "Unsplash API error {}",
                            status
                        )));
                        continue;
                    }

                    return Err(Error::SearchProvider(format!(
                        "Unsplash API error {}",
                        status
                    )));
                }
                Err(e) => {
                    last_err = Some(Error::SearchProvider(format!(
                        "Unsplash connection error: {}",
                        e
                    )));
                    continue;
                }
            }
        }

        Err(last_err
            .unwrap_or_else(|| Error::SearchProvider("Unsplash search failed after retries".into())))
    }
}

/// Extract `results[..3].urls.regular` from an Unsplash search response.
fn parse_unsplash_response(json: &serde_json::Value) -> Result<Vec<String>> {
    let results = json
        .get("results")
        .and_then(|r| r.as_array())
        .ok_or_else(|| Error::SearchProvider("Invalid Unsplash response: missing results".into()))?;

    let urls = results
        .iter()
        .take(MAX_IMAGES)
        .filter_map(|item| {
            item.get("urls")
                .and_then(|u| u.get("regular"))
                .and_then(|r| r.as_str())
                .map(|s| s.to_string())
        })
        .collect();

    Ok(urls)
}

/// Create the configured [`ImageSearch`] provider.
///
/// | Config Value | Provider |
/// |-------------|----------|
/// | `"disabled"` | [`DisabledImageSearch`] |
/// | `"unsplash"` | [`UnsplashSearch`] |
pub fn create_image_search(config: &ImagesConfig) -> anyhow::Result<Box<dyn ImageSearch>> {
    match config.provider.as_str() {
        "disabled" => Ok(Box::new(DisabledImageSearch)),
        "unsplash" => Ok(Box::new(UnsplashSearch::new(config)?)),
        other => bail!("Unknown image provider: {}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_keeps_first_three() {
        let json = json!({
            "total": 5,
            "results": [
                { "urls": { "regular": "https://img/1" } },
                { "urls": { "regular": "https://img/2" } },
                { "urls": { "regular": "https://img/3" } },
                { "urls": { "regular": "https://img/4" } },
                { "urls": { "regular": "https://img/5" } }
            ]
        });
        let urls = parse_unsplash_response(&json).unwrap();
        assert_eq!(urls, vec!["https://img/1", "https://img/2", "https://img/3"]);
    }

    #[test]
    fn test_parse_empty_results() {
        let urls = parse_unsplash_response(&json!({ "results": [] })).unwrap();
        assert!(urls.is_empty());
    }

    #[test]
    fn test_parse_missing_results() {
        assert!(parse_unsplash_response(&json!({ "errors": ["OAuth error"] })).is_err());
    }

    #[tokio::test]
    async fn test_disabled_returns_nothing() {
        let provider = create_image_search(&ImagesConfig::default()).unwrap();
        assert_eq!(provider.provider_name(), "disabled");
        assert!(provider.search("Corn farming").await.unwrap().is_empty());
    }

    #[test]
    fn test_unknown_provider_is_config_error() {
        let config = ImagesConfig {
            provider: "bing".to_string(),
            ..ImagesConfig::default()
        };
        let err = create_image_search(&config).err().unwrap();
        assert!(err.to_string().contains("Unknown image provider: bing"));
        assert!(err.downcast_ref::<Error>().is_none());
    }
}
