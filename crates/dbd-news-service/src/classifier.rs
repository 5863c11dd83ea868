//! Keyword-based content type detection.

use crate::models::{ContentType, Source};

const PATCH_KEYWORDS: &[&str] = &["patch", "update", "hotfix", "release notes"];

const EVENT_KEYWORDS: &[&str] = &[
    "event",
    "haunted by daylight",
    "lunar new year",
    "anniversary",
    "2v8",
    "2 v 8",
    "game mode",
    "limited-time-mode",
    "limited time mode",
    "the void realm",
    "void realm",
    "festival",
    "celebration",
    "holiday",
];

/// Derive a content type from a title and its source.
///
/// Matching is a case-insensitive substring search. Steam titles map to
/// `patch` or `text`, website titles to `event` or `general`, and every
/// other source to `text`.
pub fn classify(title: &str, source: &Source) -> ContentType {
    let lower = title.to_lowercase();
    let mentions_any = |keywords: &[&str]| keywords.iter().any(|k| lower.contains(k));

    match source {
        Source::Steam if mentions_any(PATCH_KEYWORDS) => ContentType::Patch,
        Source::Steam => ContentType::Text,
        Source::Website if mentions_any(EVENT_KEYWORDS) => ContentType::Event,
        Source::Website => ContentType::General,
        _ => ContentType::Text,
    }
}
