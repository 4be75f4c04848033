use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;
use crate::error::{AppError, Result};

pub const DEFAULT_CHANNEL_ID: &str = "UCXe0rNb7t4_FKtH92-lJOqw";
pub const DEFAULT_YOUTUBE_BASE_URL: &str = "https://www.youtube.com";
pub const DEFAULT_YOUTUBE_API_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";
pub const DEFAULT_FEED_MAX_ITEMS: usize = 20;
pub const MAX_PLAYLIST_PAGE_SIZE: u32 = 50;

/// Which source answers `GET /videos`. Exactly one is active per deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingBackend {
    /// Public channel Atom feed, capped and newest first.
    Feed,
    /// YouTube Data API `playlistItems`, paged to exhaustion.
    Playlist,
}

impl ListingBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListingBackend::Feed => "feed",
            ListingBackend::Playlist => "playlist",
        }
    }
}

impl fmt::Display for ListingBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ListingBackend {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "feed" | "rss" => Ok(ListingBackend::Feed),
            "playlist" | "api" => Ok(ListingBackend::Playlist),
            other => Err(AppError::ConfigError(format!(
                "Invalid LISTING_BACKEND '{}': expected 'feed' or 'playlist'",
                other
            ))),
        }
    }
}

#[derive(Clone)]
pub struct Config {
    pub server_addr: SocketAddr,
    pub listing_backend: ListingBackend,
    pub channel_id: String,
    pub playlist_id: String,
    pub youtube_api_key: Option<String>,
    pub feed_max_items_default: usize,
    pub playlist_page_size: u32,
    pub http_timeout: Duration,
    pub youtube_base_url: String,
    pub youtube_api_base_url: String,
}

impl Config {
    pub fn load() -> Result<Self> {
        // Load environment variables from .env file if it exists
        dotenv::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        // Load server configuration with defaults
        let host = var("HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port = var("PORT").unwrap_or_else(|| "3000".to_string());
        let port = port.parse::<u16>().map_err(|e| AppError::ConfigError(format!("Invalid port: {}", e)))?;
        let ip = IpAddr::from_str(&host).map_err(|e| AppError::ConfigError(format!("Invalid host address: {}", e)))?;

        let listing_backend = match var("LISTING_BACKEND") {
            Some(value) => value.parse()?,
            None => ListingBackend::Feed,
        };

        let channel_id = var("CHANNEL_ID").unwrap_or_else(|| DEFAULT_CHANNEL_ID.to_string());
        let playlist_id = var("PLAYLIST_ID").unwrap_or_else(|| uploads_playlist_id(&channel_id));
        let youtube_api_key = var("YOUTUBE_API_KEY");

        if listing_backend == ListingBackend::Playlist && youtube_api_key.is_none() {
            return Err(AppError::ConfigError(
                "YOUTUBE_API_KEY must be set when LISTING_BACKEND=playlist".to_string(),
            ));
        }

        let feed_max_items_default = match var("FEED_MAX_ITEMS_DEFAULT") {
            Some(value) => value
                .parse::<usize>()
                .map_err(|e| AppError::ConfigError(format!("Invalid FEED_MAX_ITEMS_DEFAULT: {}", e)))?,
            None => DEFAULT_FEED_MAX_ITEMS,
        };

        let playlist_page_size = match var("PLAYLIST_PAGE_SIZE") {
            Some(value) => value
                .parse::<u32>()
                .map_err(|e| AppError::ConfigError(format!("Invalid PLAYLIST_PAGE_SIZE: {}", e)))?,
            None => MAX_PLAYLIST_PAGE_SIZE,
        }
        .clamp(1, MAX_PLAYLIST_PAGE_SIZE);

        let http_timeout = match var("HTTP_TIMEOUT_SECS") {
            Some(value) => value
                .parse::<u64>()
                .map_err(|e| AppError::ConfigError(format!("Invalid HTTP_TIMEOUT_SECS: {}", e)))?,
            None => 10,
        };
        if http_timeout == 0 {
            return Err(AppError::ConfigError("HTTP_TIMEOUT_SECS must be positive".to_string()));
        }

        let youtube_base_url = var("YOUTUBE_BASE_URL")
            .unwrap_or_else(|| DEFAULT_YOUTUBE_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let youtube_api_base_url = var("YOUTUBE_API_BASE_URL")
            .unwrap_or_else(|| DEFAULT_YOUTUBE_API_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Config {
            server_addr: SocketAddr::new(ip, port),
            listing_backend,
            channel_id,
            playlist_id,
            youtube_api_key,
            feed_max_items_default,
            playlist_page_size,
            http_timeout: Duration::from_secs(http_timeout),
            youtube_base_url,
            youtube_api_base_url,
        })
    }
}

/// Every channel `UC…` has an uploads playlist `UU…` with the same suffix.
pub fn uploads_playlist_id(channel_id: &str) -> String {
    match channel_id.strip_prefix("UC") {
        Some(rest) => format!("UU{}", rest),
        None => channel_id.to_string(),
    }
}
