//! Steam news for the game, read from the store RSS feed.
//!
//! Feed descriptions are BBCode-rendered HTML. They are flattened to text with
//! `**Header**` paragraphs and `- item` bullets so patch notes stay readable.

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use scraper::{ElementRef, Html, Node};
use std::sync::LazyLock;
use tracing::{error, info, instrument, warn};

use super::extract::parse_timestamp;
use super::{FetchFailure, FetchOutcome, NewsSource, SourceError, SourceKind};
use crate::classifier::classify;
use crate::models::{NewsCandidate, Source};

const MAX_ITEMS: usize = 5;

static MISSING_SPACE_AFTER_PERIOD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.([A-Z0-9])").expect("valid regex"));
static CONTENT_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^Content\s*").expect("valid regex"));
static MISSING_PERIOD_BEFORE_THE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([a-z])The\s+([A-Z][a-z]+)").expect("valid regex"));
static BLANK_LINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n[ \t\r]*\n").expect("valid regex"));
static TRAILING_SPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t\r]+\n").expect("valid regex"));
static EXCESS_NEWLINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("valid regex"));

pub struct SteamSource {
    client: Client,
    feed_url: String,
}

impl SteamSource {
    pub fn new(client: Client, feed_url: String) -> Self {
        Self { client, feed_url }
    }

    async fn fetch_channel(&self) -> Result<rss::Channel, SourceError> {
        let body = self
            .client
            .get(&self.feed_url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;

        rss::Channel::read_from(&body[..]).map_err(|e| SourceError::Parse(e.to_string()))
    }
}

fn to_candidate(item: &rss::Item) -> Result<NewsCandidate, FetchFailure> {
    let title = item.title().unwrap_or_default().trim().to_string();
    let url = item.link().unwrap_or_default().trim().to_string();
    let target = if url.is_empty() { title.clone() } else { url.clone() };

    let published_at = item
        .pub_date()
        .and_then(parse_timestamp)
        .ok_or_else(|| FetchFailure::new(target, "missing or invalid pubDate"))?;

    let content_type = classify(&title, &Source::Steam);

    Ok(NewsCandidate {
        content: format_description(item.description().unwrap_or_default()),
        image_url: item.enclosure().map(|e| e.url().to_string()),
        title,
        url,
        source: Source::Steam,
        content_type,
        code: None,
        published_at,
    })
}

/// Flatten a Steam description to plain text, keeping headers and bullets.
pub fn format_description(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let mut text = String::new();
    render_children(fragment.root_element(), &mut text);

    let text = MISSING_SPACE_AFTER_PERIOD.replace_all(&text, ". $1");
    let text = CONTENT_PREFIX.replace(&text, "");
    let text = MISSING_PERIOD_BEFORE_THE.replace_all(&text, "$1. The $2");
    let text = BLANK_LINES.replace_all(&text, "\n\n");
    let text = TRAILING_SPACE.replace_all(&text, "\n");
    let text = EXCESS_NEWLINES.replace_all(&text, "\n\n");
    text.trim().to_string()
}

fn render_children(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(_) => {
                if let Some(child) = ElementRef::wrap(child) {
                    render_element(child, out);
                }
            }
            _ => {}
        }
    }
}

fn render_element(element: ElementRef<'_>, out: &mut String) {
    let el = element.value();
    let inner_text = || element.text().collect::<String>().trim().to_string();

    if el.classes().any(|c| c == "bb_h2" || c == "bb_h3") {
        out.push_str(&format!("**{}**\n\n", inner_text()));
        return;
    }

    match el.name() {
        "li" => out.push_str(&format!("- {}\n", inner_text())),
        "br" => out.push('\n'),
        "p" | "div" | "ul" | "ol" => {
            render_children(element, out);
            out.push('\n');
        }
        "h1" | "h2" | "h3" | "b" | "strong" => {
            out.push_str(&format!("**{}**\n\n", inner_text()));
        }
        _ => render_children(element, out),
    }
}

#[async_trait]
impl NewsSource for SteamSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Steam
    }

    #[instrument(skip_all, fields(feed_url = %self.feed_url))]
    async fn fetch(&self) -> FetchOutcome {
        let channel = match self.fetch_channel().await {
            Ok(channel) => channel,
            Err(err) => {
                error!(error = %err, "Steam scrape failed");
                return FetchOutcome::failed(self.feed_url.clone(), err);
            }
        };

        let mut outcome = FetchOutcome::default();
        for item in channel.items().iter().take(MAX_ITEMS) {
            match to_candidate(item) {
                Ok(candidate) => outcome.items.push(candidate),
                Err(failure) => {
                    warn!(target_item = %failure.target, reason = %failure.reason, "Skipping Steam item");
                    outcome.failures.push(failure);
                }
            }
        }

        info!(count = outcome.items.len(), "Scraped Steam posts");
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ContentType;
    use chrono::{TimeZone, Utc};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn feed(items: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Dead by Daylight</title>
    <link>https://store.steampowered.com/news/app/381210</link>
    <description>News</description>
    {items}
  </channel>
</rss>"#
        )
    }

    fn item(n: usize, title: &str, pub_date: &str) -> String {
        format!(
            r#"<item>
      <title>{title}</title>
      <link>https://store.steampowered.com/news/app/381210/view/{n}</link>
      <description><![CDATA[<div class="bb_h2">Features</div><ul><li>New Killer</li><li>New Map</li></ul>]]></description>
      <pubDate>{pub_date}</pubDate>
      <enclosure url="https://cdn.steam.com/{n}.jpg" length="0" type="image/jpeg"/>
    </item>"#
        )
    }

    #[test]
    fn test_format_description_keeps_headers_and_bullets() {
        let html = r#"<div class="bb_h2">Patch Notes</div><ul><li>Fixed a bug.</li><li>Improved lighting</li></ul><p>Thanks.See you soon</p>"#;
        let text = format_description(html);
        assert_eq!(
            text,
            "**Patch Notes**\n\n- Fixed a bug.\n- Improved lighting\n\nThanks. See you soon"
        );
    }

    #[test]
    fn test_format_description_cleanups() {
        assert_eq!(
            format_description("Content The update is live"),
            "The update is live"
        );
        assert_eq!(
            format_description("fixes and moreThe Trickster returns"),
            "fixes and more. The Trickster returns"
        );
    }

    #[tokio::test]
    async fn test_fetch_parses_feed() {
        let server = MockServer::start().await;
        let body = feed(&format!(
            "{}{}",
            item(1, "Patch Notes 8.2.0", "Tue, 21 Oct 2025 14:30:00 +0000"),
            item(2, "Community Spotlight", "Mon, 20 Oct 2025 09:00:00 +0000"),
        ));

        Mock::given(method("GET"))
            .and(path("/feeds/news/app/381210/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&server)
            .await;

        let source = SteamSource::new(
            Client::new(),
            format!("{}/feeds/news/app/381210/", server.uri()),
        );
        let outcome = source.fetch().await;

        assert!(outcome.failures.is_empty());
        assert_eq!(outcome.items.len(), 2);

        let patch = &outcome.items[0];
        assert_eq!(patch.title, "Patch Notes 8.2.0");
        assert_eq!(patch.content_type, ContentType::Patch);
        assert_eq!(patch.source, Source::Steam);
        assert_eq!(
            patch.url,
            "https://store.steampowered.com/news/app/381210/view/1"
        );
        assert_eq!(
            patch.image_url.as_deref(),
            Some("https://cdn.steam.com/1.jpg")
        );
        assert_eq!(
            patch.published_at,
            Utc.with_ymd_and_hms(2025, 10, 21, 14, 30, 0).unwrap()
        );
        assert_eq!(patch.content, "**Features**\n\n- New Killer\n- New Map");

        assert_eq!(outcome.items[1].content_type, ContentType::Text);
    }

    #[tokio::test]
    async fn test_fetch_takes_five_and_reports_bad_dates() {
        let server = MockServer::start().await;
        let mut items: Vec<String> = (0..6)
            .map(|n| item(n, &format!("Post {n}"), "Mon, 20 Oct 2025 09:00:00 +0000"))
            .collect();
        items[1] = item(1, "Undated", "sometime");

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(feed(&items.concat())))
            .mount(&server)
            .await;

        let outcome = SteamSource::new(Client::new(), server.uri()).fetch().await;

        assert_eq!(outcome.items.len(), 4);
        assert_eq!(outcome.failures.len(), 1);
        assert!(outcome.failures[0].target.ends_with("/view/1"));
    }

    #[tokio::test]
    async fn test_malformed_feed_returns_empty_outcome() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>not a feed</html>"))
            .mount(&server)
            .await;

        let outcome = SteamSource::new(Client::new(), server.uri()).fetch().await;

        assert!(outcome.items.is_empty());
        assert_eq!(outcome.failures.len(), 1);
    }
}
