//! Ingestion pipeline: freshness filter, URL dedupe and insert-if-absent.
//!
//! Items are processed strictly in order. An item older than the retention
//! window is skipped; everything else is validated and written with an
//! insert that is a no-op when the URL already exists. A failure on one item
//! is recorded and never aborts the batch, so re-running a batch converges on
//! the same store contents.

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, error, info, instrument, warn};

use crate::models::{NewNewsItem, NewsCandidate};
use crate::repositories::{InsertOutcome, NewsRepository};
use crate::validation::validate_candidate;

pub const DEFAULT_RETENTION_DAYS: i64 = 30;
/// Upper bound accepted from configuration and the CLI (about a century).
pub const MAX_RETENTION_DAYS: i64 = 36_500;

/// An item dropped by the freshness filter.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedItem {
    pub title: String,
    pub published_at: DateTime<Utc>,
}

/// An item that could not be persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestFailure {
    pub url: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct IngestReport {
    pub inserted: usize,
    pub already_present: usize,
    pub skipped: Vec<SkippedItem>,
    pub failures: Vec<IngestFailure>,
}

impl IngestReport {
    /// Items that reached the store: new rows plus verified no-op conflicts.
    pub fn saved_count(&self) -> usize {
        self.inserted + self.already_present
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }
}

#[derive(Clone)]
pub struct Ingestor<R: NewsRepository> {
    repo: R,
    retention: Duration,
}

impl<R: NewsRepository> Ingestor<R> {
    pub fn new(repo: R) -> Self {
        Self::with_retention(repo, Duration::days(DEFAULT_RETENTION_DAYS))
    }

    pub fn with_retention(repo: R, retention: Duration) -> Self {
        Self { repo, retention }
    }

    pub fn retention(&self) -> Duration {
        self.retention
    }

    pub async fn ingest(&self, items: &[NewsCandidate]) -> IngestReport {
        self.ingest_at(items, Utc::now()).await
    }

    #[instrument(skip_all, fields(batch = items.len()))]
    pub async fn ingest_at(&self, items: &[NewsCandidate], now: DateTime<Utc>) -> IngestReport {
        // A window reaching past the earliest representable time has no cutoff.
        let cutoff = now.checked_sub_signed(self.retention);
        let mut report = IngestReport::default();

        for item in items {
            if cutoff.is_some_and(|cutoff| item.published_at < cutoff) {
                debug!(
                    title = %item.title,
                    published_at = %item.published_at.format("%a %b %d %Y"),
                    "Skipping old item"
                );
                report.skipped.push(SkippedItem {
                    title: item.title.clone(),
                    published_at: item.published_at,
                });
                continue;
            }

            let url = match validate_candidate(item) {
                Ok(url) => url,
                Err(err) => {
                    warn!(url = %item.url, error = %err, "Rejected invalid item");
                    report.failures.push(IngestFailure {
                        url: item.url.clone(),
                        reason: err.to_string(),
                    });
                    continue;
                }
            };

            let row = NewNewsItem::from_candidate(item, url);
            match self.repo.insert_if_absent(&row).await {
                Ok(InsertOutcome::Inserted) => {
                    debug!(url = %row.url, id = %row.id, "Saved new item");
                    report.inserted += 1;
                }
                Ok(InsertOutcome::AlreadyExists) => {
                    debug!(url = %row.url, "Item already stored");
                    report.already_present += 1;
                }
                Err(err) => {
                    error!(url = %row.url, error = %err, "Failed to save item");
                    report.failures.push(IngestFailure {
                        url: row.url,
                        reason: err.to_string(),
                    });
                }
            }
        }

        info!(
            saved = report.inserted,
            existing = report.already_present,
            skipped = report.skipped_count(),
            failed = report.failures.len(),
            "Ingested batch"
        );

        report
    }
}
