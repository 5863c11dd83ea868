//! Placeholder posts from the official Twitter account until API access exists.

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use tracing::info;

use super::{FetchOutcome, NewsSource, SourceKind};
use crate::models::{ContentType, NewsCandidate, Source};

pub struct TwitterSource;

fn posted_at(year: i32, month: u32, day: u32, hour: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, min, 0)
        .single()
        .unwrap_or_default()
}

fn placeholder_posts() -> Vec<NewsCandidate> {
    vec![
        NewsCandidate {
            title: "New Rift Coming!".to_string(),
            content: "Check out the new Tome and cosmetics.".to_string(),
            url: "https://twitter.com/DeadByBHVR/status/1234567890".to_string(),
            image_url: None,
            source: Source::Twitter,
            content_type: ContentType::Post,
            code: None,
            published_at: posted_at(2025, 10, 21, 14, 30),
        },
        NewsCandidate {
            title: "Promo Code Drop!".to_string(),
            content: "Use code SCARYSURVIVOR for 200k BP!".to_string(),
            url: "https://twitter.com/DeadByBHVR/status/9876543210".to_string(),
            image_url: None,
            source: Source::Twitter,
            content_type: ContentType::Code,
            code: Some("SCARYSURVIVOR".to_string()),
            published_at: posted_at(2025, 10, 20, 17, 45),
        },
    ]
}

#[async_trait]
impl NewsSource for TwitterSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Twitter
    }

    async fn fetch(&self) -> FetchOutcome {
        let items = placeholder_posts();
        info!(count = items.len(), "Scraped Twitter posts");
        FetchOutcome {
            items,
            failures: Vec::new(),
        }
    }
}
