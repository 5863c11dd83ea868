//! Articles from the official website, discovered through its sitemap.
//!
//! The sitemap is served either as XML (`urlset/url/loc`) or as an HTML page
//! of links; in the HTML case every link containing `/news/` is taken. The
//! first few unique article URLs are then fetched one by one and their fields
//! pulled out with ordered extraction strategies (JSON-LD first, then markup).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use itertools::Itertools;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use scraper::{Html, Selector};
use serde::Deserialize;
use serde_json::Value;
use std::sync::LazyLock;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

use super::extract::{Strategy, first_non_empty, first_parsed, parse_timestamp};
use super::{FetchFailure, FetchOutcome, NewsSource, SourceError, SourceKind};
use crate::classifier::classify;
use crate::models::{NewsCandidate, Source};

const MAX_ARTICLES: usize = 5;
const UNTITLED: &str = "Untitled";

macro_rules! selector {
    ($name:ident, $css:expr) => {
        static $name: LazyLock<Selector> =
            LazyLock::new(|| Selector::parse($css).expect("valid selector"));
    };
}

selector!(LINKS, "a[href]");
selector!(JSON_LD, r#"script[type="application/ld+json"]"#);
selector!(H1, "h1");
selector!(OG_TITLE, r#"meta[property="og:title"]"#);
selector!(TIME, "time[datetime]");
selector!(PUBLISHED_TIME, r#"meta[property="article:published_time"]"#);
selector!(OG_IMAGE, r#"meta[property="og:image"]"#);
selector!(DESCRIPTION, r#"meta[name="description"]"#);
selector!(PARAGRAPH, "p");

#[derive(Debug, Deserialize)]
struct UrlSet {
    #[serde(rename = "url", default)]
    urls: Vec<UrlEntry>,
}

#[derive(Debug, Deserialize)]
struct UrlEntry {
    loc: String,
}

/// A parsed article page and its JSON-LD article object, if any.
struct ArticlePage {
    document: Html,
    json_ld: Option<Value>,
}

impl ArticlePage {
    fn parse(html: &str) -> Self {
        let document = Html::parse_document(html);
        let json_ld = document
            .select(&JSON_LD)
            .next()
            .and_then(|script| serde_json::from_str::<Value>(&script.text().collect::<String>()).ok())
            .map(article_object);
        Self { document, json_ld }
    }

    fn json_ld_str(&self, key: &str) -> Option<String> {
        self.json_ld.as_ref()?.get(key)?.as_str().map(str::to_string)
    }

    fn first_text(&self, selector: &Selector) -> Option<String> {
        self.document
            .select(selector)
            .next()
            .map(|el| el.text().collect::<String>())
    }

    fn first_attr(&self, selector: &Selector, attr: &str) -> Option<String> {
        self.document
            .select(selector)
            .next()
            .and_then(|el| el.value().attr(attr))
            .map(str::to_string)
    }
}

/// JSON-LD may be a bare object, an array, or an `@graph`; pick the article.
fn article_object(value: Value) -> Value {
    let candidates = match &value {
        Value::Array(items) => Some(items.clone()),
        Value::Object(map) => map.get("@graph").and_then(Value::as_array).cloned(),
        _ => None,
    };

    candidates
        .and_then(|items| items.into_iter().find(|item| item.get("headline").is_some()))
        .unwrap_or(value)
}

fn json_ld_image(page: &ArticlePage) -> Option<String> {
    let image = page.json_ld.as_ref()?.get("image")?;
    let image = match image {
        Value::Array(items) => items.first()?,
        other => other,
    };
    match image {
        Value::String(url) => Some(url.clone()),
        Value::Object(map) => map.get("url")?.as_str().map(str::to_string),
        _ => None,
    }
}

const TITLE_STRATEGIES: &[Strategy<ArticlePage>] = &[
    |p| p.json_ld_str("headline"),
    |p| p.first_text(&H1),
    |p| p.first_attr(&OG_TITLE, "content"),
];

const PUBLISHED_STRATEGIES: &[Strategy<ArticlePage>] = &[
    |p| p.json_ld_str("datePublished"),
    |p| p.first_attr(&TIME, "datetime"),
    |p| p.first_attr(&PUBLISHED_TIME, "content"),
];

const IMAGE_STRATEGIES: &[Strategy<ArticlePage>] = &[
    json_ld_image,
    |p| p.first_attr(&OG_IMAGE, "content"),
];

const CONTENT_STRATEGIES: &[Strategy<ArticlePage>] = &[
    |p| p.first_attr(&DESCRIPTION, "content"),
    |p| p.json_ld_str("description"),
    |p| p.first_text(&PARAGRAPH),
];

/// Map an article page onto a candidate. `None` for the static "Latest News" page.
fn parse_article(url: &str, html: &str, fetched_at: DateTime<Utc>) -> Option<NewsCandidate> {
    let page = ArticlePage::parse(html);

    let title = first_non_empty(&page, TITLE_STRATEGIES).unwrap_or_else(|| UNTITLED.to_string());
    if title.eq_ignore_ascii_case("latest news") {
        debug!(%url, "Skipping static page");
        return None;
    }

    let published_at = first_parsed(&page, PUBLISHED_STRATEGIES, parse_timestamp)
        .unwrap_or_else(|| {
            warn!(%url, "No parseable publish date, using fetch time");
            fetched_at
        });

    Some(NewsCandidate {
        content_type: classify(&title, &Source::Website),
        content: first_non_empty(&page, CONTENT_STRATEGIES).unwrap_or_default(),
        image_url: first_non_empty(&page, IMAGE_STRATEGIES),
        title,
        url: url.to_string(),
        source: Source::Website,
        code: None,
        published_at,
    })
}

fn is_xml(content_type: Option<&str>, body: &str) -> bool {
    content_type.is_some_and(|ct| ct.contains("xml")) || body.trim_start().starts_with("<?xml")
}

fn parse_xml_sitemap(body: &str) -> Result<Vec<String>, SourceError> {
    let urlset: UrlSet =
        quick_xml::de::from_str(body).map_err(|e| SourceError::Parse(e.to_string()))?;
    Ok(urlset
        .urls
        .into_iter()
        .map(|entry| entry.loc.trim().to_string())
        .collect())
}

fn parse_html_sitemap(body: &str, base: &Url) -> Vec<String> {
    let document = Html::parse_document(body);
    document
        .select(&LINKS)
        .filter_map(|a| a.value().attr("href"))
        .filter(|href| href.contains("/news/"))
        .filter_map(|href| base.join(href).ok())
        .map(String::from)
        .collect()
}

/// Article URLs from a sitemap body, de-duplicated in order and capped.
fn article_urls(
    content_type: Option<&str>,
    body: &str,
    base: &Url,
) -> Result<Vec<String>, SourceError> {
    let urls = if is_xml(content_type, body) {
        parse_xml_sitemap(body)?
    } else {
        parse_html_sitemap(body, base)
    };

    Ok(urls
        .into_iter()
        .filter(|url| !url.is_empty())
        .unique()
        .take(MAX_ARTICLES)
        .collect())
}

pub struct WebsiteSource {
    client: Client,
    base_url: String,
    sitemap_url: String,
}

impl WebsiteSource {
    pub fn new(client: Client, base_url: String, sitemap_url: String) -> Self {
        Self {
            client,
            base_url,
            sitemap_url,
        }
    }

    async fn index_articles(&self) -> Result<Vec<String>, SourceError> {
        let base = Url::parse(&self.base_url)
            .map_err(|e| SourceError::Config(format!("invalid website base URL: {e}")))?;

        let response = self
            .client
            .get(&self.sitemap_url)
            .send()
            .await?
            .error_for_status()?;
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.text().await?;

        article_urls(content_type.as_deref(), &body, &base)
    }

    async fn fetch_page(&self, url: &str) -> Result<String, SourceError> {
        Ok(self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?)
    }
}

#[async_trait]
impl NewsSource for WebsiteSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Website
    }

    #[instrument(skip_all, fields(sitemap_url = %self.sitemap_url))]
    async fn fetch(&self) -> FetchOutcome {
        let urls = match self.index_articles().await {
            Ok(urls) => urls,
            Err(err) => {
                error!(error = %err, "Website scrape failed");
                return FetchOutcome::failed(self.sitemap_url.clone(), err);
            }
        };
        info!(count = urls.len(), "Found article URLs");

        let mut outcome = FetchOutcome::default();
        for url in urls {
            let html = match self.fetch_page(&url).await {
                Ok(html) => html,
                Err(err) => {
                    warn!(%url, error = %err, "Failed to scrape article");
                    outcome.failures.push(FetchFailure::new(url, err));
                    continue;
                }
            };

            if let Some(candidate) = parse_article(&url, &html, Utc::now()) {
                debug!(title = %candidate.title, "Scraped article");
                outcome.items.push(candidate);
            }
        }

        info!(count = outcome.items.len(), "Scraped website articles");
        outcome
    }
}
