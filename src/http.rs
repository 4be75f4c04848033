use reqwest::{Client, ClientBuilder};
use std::time::Duration;
use crate::config::Config;
use crate::error::{AppError, Result};

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// One pooled client shared by the listers and the transcript fetcher.
pub fn build_client(config: &Config) -> Result<Client> {
    ClientBuilder::new()
        .timeout(config.http_timeout)
        .connect_timeout(config.http_timeout.min(Duration::from_secs(5)))
        .pool_max_idle_per_host(10)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| AppError::ConfigError(format!("Failed to build HTTP client: {}", e)))
}

/// GET a URL and return the body, treating non-2xx statuses as errors.
pub async fn fetch_text(client: &Client, url: &str) -> reqwest::Result<String> {
    client.get(url).send().await?.error_for_status()?.text().await
}
