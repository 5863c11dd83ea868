//! Source adapters.
//!
//! Each adapter fetches from one external platform and maps the result onto
//! [`NewsCandidate`]. Adapters never persist and never fail past their own
//! boundary: a source-level fault becomes an empty [`FetchOutcome`] carrying a
//! single [`FetchFailure`], while a bad entry is recorded and skipped.
//!
//! | Source | Module | Method |
//! |--------|--------|--------|
//! | YouTube | [`youtube`] | Data API v3 search |
//! | Steam | [`steam`] | RSS feed |
//! | Official website | [`website`] | Sitemap + article pages |
//! | Twitter | [`twitter`] | Static placeholder posts |

use async_trait::async_trait;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

use crate::config::Config;
use crate::models::NewsCandidate;

pub mod extract;
pub mod steam;
pub mod twitter;
pub mod website;
pub mod youtube;

pub use steam::SteamSource;
pub use twitter::TwitterSource;
pub use website::WebsiteSource;
pub use youtube::YouTubeSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    YouTube,
    Steam,
    Website,
    Twitter,
}

impl SourceKind {
    pub const ALL: [SourceKind; 4] = [
        SourceKind::YouTube,
        SourceKind::Steam,
        SourceKind::Website,
        SourceKind::Twitter,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SourceKind::YouTube => "youtube",
            SourceKind::Steam => "steam",
            SourceKind::Website => "website",
            SourceKind::Twitter => "twitter",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Error, Debug, PartialEq)]
#[error("Unknown source: {0} (expected youtube, steam, website or twitter)")]
pub struct UnknownSource(pub String);

impl FromStr for SourceKind {
    type Err = UnknownSource;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SourceKind::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownSource(s.to_string()))
    }
}

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    Parse(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// A diagnostic for something an adapter could not turn into a candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchFailure {
    /// The feed, page or entry that failed.
    pub target: String,
    pub reason: String,
}

impl FetchFailure {
    pub fn new(target: impl Into<String>, reason: impl ToString) -> Self {
        Self {
            target: target.into(),
            reason: reason.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchOutcome {
    pub items: Vec<NewsCandidate>,
    pub failures: Vec<FetchFailure>,
}

impl FetchOutcome {
    pub fn failed(target: impl Into<String>, reason: impl ToString) -> Self {
        Self {
            items: Vec::new(),
            failures: vec![FetchFailure::new(target, reason)],
        }
    }
}

#[async_trait]
pub trait NewsSource: Send + Sync {
    fn kind(&self) -> SourceKind;

    async fn fetch(&self) -> FetchOutcome;
}

pub fn http_client(timeout: Duration) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("dbd-news/", env!("CARGO_PKG_VERSION")))
        .build()
}

/// Build the adapters for `kinds` from configuration, sharing one HTTP client.
pub fn build_sources(
    config: &Config,
    kinds: &[SourceKind],
) -> Result<Vec<Box<dyn NewsSource>>, reqwest::Error> {
    let client = http_client(config.http_timeout)?;

    Ok(kinds
        .iter()
        .map(|kind| -> Box<dyn NewsSource> {
            match kind {
                SourceKind::YouTube => Box::new(YouTubeSource::new(
                    client.clone(),
                    config.youtube_api_base_url.clone(),
                    config.youtube_api_key.clone(),
                    config.youtube_channel_id.clone(),
                )),
                SourceKind::Steam => Box::new(SteamSource::new(
                    client.clone(),
                    config.steam_feed_url.clone(),
                )),
                SourceKind::Website => Box::new(WebsiteSource::new(
                    client.clone(),
                    config.website_base_url.clone(),
                    config.website_sitemap_url.clone(),
                )),
                SourceKind::Twitter => Box::new(TwitterSource),
            }
        })
        .collect())
}
