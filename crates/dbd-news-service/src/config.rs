use anyhow::{Context, Result, ensure};
use dotenvy::dotenv;
use std::env;
use std::time::Duration;

use crate::pipeline::{DEFAULT_RETENTION_DAYS, MAX_RETENTION_DAYS};

pub const DEFAULT_YOUTUBE_CHANNEL_ID: &str = "UCaSgsFdGbwjfdawl3rOXiwQ";
pub const DEFAULT_YOUTUBE_API_BASE_URL: &str = "https://www.googleapis.com";
pub const DEFAULT_STEAM_FEED_URL: &str = "https://store.steampowered.com/feeds/news/app/381210/";
pub const DEFAULT_WEBSITE_BASE_URL: &str = "https://deadbydaylight.com";
pub const DEFAULT_WEBSITE_SITEMAP_URL: &str = "https://deadbydaylight.com/sitemap/";

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub youtube_api_key: Option<String>,
    pub youtube_channel_id: String,
    pub youtube_api_base_url: String,
    pub steam_feed_url: String,
    pub website_base_url: String,
    pub website_sitemap_url: String,
    pub retention_days: i64,
    pub scrape_on_startup: bool,
    pub http_timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let or = |key: &str, default: &str| var(key).unwrap_or_else(|| default.to_string());

        let retention_days: i64 = or("RETENTION_DAYS", &DEFAULT_RETENTION_DAYS.to_string())
            .parse()
            .context("RETENTION_DAYS must be a whole number of days")?;
        ensure!(
            (1..=MAX_RETENTION_DAYS).contains(&retention_days),
            "RETENTION_DAYS must be between 1 and {MAX_RETENTION_DAYS}"
        );

        Ok(Self {
            database_url: var("DATABASE_URL").context("DATABASE_URL must be set")?,
            port: or("PORT", "3000")
                .parse()
                .context("PORT must be a valid number")?,
            youtube_api_key: var("YOUTUBE_API_KEY"),
            youtube_channel_id: or("YOUTUBE_CHANNEL_ID", DEFAULT_YOUTUBE_CHANNEL_ID),
            youtube_api_base_url: or("YOUTUBE_API_BASE_URL", DEFAULT_YOUTUBE_API_BASE_URL),
            steam_feed_url: or("STEAM_FEED_URL", DEFAULT_STEAM_FEED_URL),
            website_base_url: or("WEBSITE_BASE_URL", DEFAULT_WEBSITE_BASE_URL),
            website_sitemap_url: or("WEBSITE_SITEMAP_URL", DEFAULT_WEBSITE_SITEMAP_URL),
            retention_days,
            scrape_on_startup: parse_bool(&or("SCRAPE_ON_STARTUP", "false"))
                .context("SCRAPE_ON_STARTUP must be true or false")?,
            http_timeout: Duration::from_secs(
                or("HTTP_TIMEOUT_SECS", "30")
                    .parse()
                    .context("HTTP_TIMEOUT_SECS must be a valid number")?,
            ),
        })
    }

    pub fn retention(&self) -> chrono::Duration {
        chrono::Duration::days(self.retention_days)
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
