use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{info, warn};

/// Raw homepage as returned by the server.
#[derive(Debug, Clone)]
pub struct Page {
    pub url: String,
    pub html: String,
    pub status: Option<u16>,
}

pub struct Fetcher {
    client: reqwest::Client,
}

impl Fetcher {
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self { client })
    }

    /// Single GET, no retries. Any HTTP status counts as fetched; only
    /// transport failures (timeout, DNS, refused, unreadable body) are errors.
    pub async fn fetch(&self, url: &str) -> Result<Page, reqwest::Error> {
        info!("Fetching {}", url);
        let response = self.client.get(url).send().await.inspect_err(|e| {
            warn!("Fetch failed for {}: {}", url, e);
        })?;

        let status = response.status().as_u16();
        let html = response.text().await.inspect_err(|e| {
            warn!("Failed to read body of {}: {}", url, e);
        })?;

        info!(status, bytes = html.len(), "Fetched {}", url);
        Ok(Page {
            url: url.to_string(),
            html,
            status: Some(status),
        })
    }
}
