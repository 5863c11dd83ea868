//! Latest uploads from the official channel via the YouTube Data API v3.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::{error, info, instrument, warn};

use super::extract::{Strategy, first_non_empty};
use super::{FetchFailure, FetchOutcome, NewsSource, SourceError, SourceKind};
use crate::models::{ContentType, NewsCandidate, Source};

const MAX_RESULTS: u32 = 5;

pub struct YouTubeSource {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    channel_id: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: VideoId,
    snippet: Snippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoId {
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snippet {
    title: String,
    #[serde(default)]
    description: String,
    published_at: DateTime<Utc>,
    #[serde(default)]
    thumbnails: Thumbnails,
}

#[derive(Debug, Default, Deserialize)]
struct Thumbnails {
    high: Option<Thumbnail>,
    medium: Option<Thumbnail>,
    default: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    url: String,
}

const THUMBNAIL_STRATEGIES: &[Strategy<Thumbnails>] = &[
    |t| t.high.as_ref().map(|t| t.url.clone()),
    |t| t.medium.as_ref().map(|t| t.url.clone()),
    |t| t.default.as_ref().map(|t| t.url.clone()),
];

impl YouTubeSource {
    pub fn new(
        client: Client,
        base_url: String,
        api_key: Option<String>,
        channel_id: String,
    ) -> Self {
        Self {
            client,
            base_url,
            api_key,
            channel_id,
        }
    }

    async fn search(&self) -> Result<SearchResponse, SourceError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| SourceError::Config("YOUTUBE_API_KEY is not set".to_string()))?;

        let url = format!("{}/youtube/v3/search", self.base_url.trim_end_matches('/'));
        let max_results = MAX_RESULTS.to_string();
        let response = self
            .client
            .get(&url)
            .query(&[
                ("key", api_key),
                ("channelId", self.channel_id.as_str()),
                ("part", "snippet,id"),
                ("type", "video"),
                ("order", "date"),
                ("maxResults", max_results.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?;

        Ok(response.json().await?)
    }
}

fn to_candidate(item: SearchItem) -> Result<NewsCandidate, FetchFailure> {
    let video_id = item
        .id
        .video_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| FetchFailure::new(item.snippet.title.clone(), "search result has no videoId"))?;

    Ok(NewsCandidate {
        image_url: first_non_empty(&item.snippet.thumbnails, THUMBNAIL_STRATEGIES),
        title: item.snippet.title,
        content: item.snippet.description,
        url: format!("https://www.youtube.com/watch?v={video_id}"),
        source: Source::YouTube,
        content_type: ContentType::Video,
        code: None,
        published_at: item.snippet.published_at,
    })
}

#[async_trait]
impl NewsSource for YouTubeSource {
    fn kind(&self) -> SourceKind {
        SourceKind::YouTube
    }

    #[instrument(skip_all, fields(channel_id = %self.channel_id))]
    async fn fetch(&self) -> FetchOutcome {
        let response = match self.search().await {
            Ok(response) => response,
            Err(err) => {
                error!(error = %err, "YouTube scrape failed");
                return FetchOutcome::failed("youtube search", err);
            }
        };

        let mut outcome = FetchOutcome::default();
        for item in response.items {
            match to_candidate(item) {
                Ok(candidate) => outcome.items.push(candidate),
                Err(failure) => {
                    warn!(target_item = %failure.target, reason = %failure.reason, "Skipping YouTube result");
                    outcome.failures.push(failure);
                }
            }
        }

        info!(count = outcome.items.len(), "Scraped YouTube videos");
        outcome
    }
}
