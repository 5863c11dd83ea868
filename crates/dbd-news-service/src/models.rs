use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Serialize, Serializer};
use thiserror::Error;

/// A persisted news item as stored in `news_items`.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Serialize)]
#[diesel(table_name = crate::schema::news_items)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct NewsItem {
    pub id: String,
    pub title: String,
    pub content: String,
    pub url: String,
    pub image_url: Option<String>,
    pub source: String,
    pub content_type: String,
    pub code: Option<String>,
    #[serde(serialize_with = "serialize_utc")]
    pub published_at: NaiveDateTime,
    #[serde(serialize_with = "serialize_utc")]
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::news_items)]
pub struct NewNewsItem {
    pub id: String,
    pub title: String,
    pub content: String,
    pub url: String,
    pub image_url: Option<String>,
    pub source: String,
    pub content_type: String,
    pub code: Option<String>,
    pub published_at: NaiveDateTime,
}

impl NewNewsItem {
    /// Build the row for a validated candidate. `url` is the canonical form
    /// produced by [`crate::validation::normalize_url`].
    pub fn from_candidate(candidate: &NewsCandidate, url: String) -> Self {
        NewNewsItem {
            id: uuid::Uuid::new_v4().to_string(),
            title: candidate.title.clone(),
            content: candidate.content.clone(),
            url,
            image_url: candidate.image_url.clone(),
            source: candidate.source.to_string(),
            content_type: candidate.content_type.to_string(),
            code: candidate.code.clone(),
            published_at: candidate.published_at.naive_utc(),
        }
    }
}

/// A normalized item produced by a source adapter, not yet persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewsCandidate {
    pub title: String,
    pub content: String,
    pub url: String,
    pub image_url: Option<String>,
    pub source: Source,
    pub content_type: ContentType,
    pub code: Option<String>,
    pub published_at: DateTime<Utc>,
}

/// Origin platform of a news item.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Source {
    YouTube,
    Steam,
    Website,
    Twitter,
    /// Manually entered posts from platforms without an adapter (e.g. "Facebook").
    Other(String),
}

impl Source {
    pub fn as_str(&self) -> &str {
        match self {
            Source::YouTube => "YouTube",
            Source::Steam => "Steam",
            Source::Website => "DeadByDaylight Website",
            Source::Twitter => "Twitter",
            Source::Other(name) => name,
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Source {
    fn from(value: &str) -> Self {
        match value {
            "YouTube" => Source::YouTube,
            "Steam" => Source::Steam,
            "DeadByDaylight Website" | "Website" => Source::Website,
            "Twitter" => Source::Twitter,
            other => Source::Other(other.to_string()),
        }
    }
}

impl FromStr for Source {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Source::from(s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentType {
    Video,
    Text,
    Patch,
    Event,
    General,
    Code,
    Post,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Video => "video",
            ContentType::Text => "text",
            ContentType::Patch => "patch",
            ContentType::Event => "event",
            ContentType::General => "general",
            ContentType::Code => "code",
            ContentType::Post => "post",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, PartialEq)]
#[error("Unknown content type: {0}")]
pub struct UnknownContentType(pub String);

impl FromStr for ContentType {
    type Err = UnknownContentType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "video" => Ok(ContentType::Video),
            "text" => Ok(ContentType::Text),
            "patch" => Ok(ContentType::Patch),
            "event" => Ok(ContentType::Event),
            "general" => Ok(ContentType::General),
            "code" => Ok(ContentType::Code),
            "post" => Ok(ContentType::Post),
            _ => Err(UnknownContentType(s.to_string())),
        }
    }
}

fn serialize_utc<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&value.and_utc().to_rfc3339())
}
