use futures::future::join_all;
use tracing::{info, instrument, warn};

use crate::pipeline::{IngestReport, Ingestor};
use crate::repositories::NewsRepository;
use crate::sources::{FetchFailure, NewsSource, SourceKind};

/// What one source produced and what the pipeline did with it.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceRun {
    pub kind: SourceKind,
    pub fetched: usize,
    pub fetch_failures: Vec<FetchFailure>,
    pub report: IngestReport,
}

/// Fetch every source concurrently, then ingest each batch in turn.
///
/// A slow or failing source only delays or empties its own batch.
#[instrument(skip_all, fields(sources = sources.len()))]
pub async fn run_sources<R: NewsRepository>(
    sources: &[Box<dyn NewsSource>],
    ingestor: &Ingestor<R>,
) -> Vec<SourceRun> {
    let outcomes = join_all(sources.iter().map(|source| async move {
        info!(source = %source.kind(), "Running scraper");
        (source.kind(), source.fetch().await)
    }))
    .await;

    let mut runs = Vec::with_capacity(outcomes.len());
    for (kind, outcome) in outcomes {
        for failure in &outcome.failures {
            warn!(source = %kind, target_item = %failure.target, reason = %failure.reason, "Fetch failure");
        }

        let report = ingestor.ingest(&outcome.items).await;
        info!(
            source = %kind,
            fetched = outcome.items.len(),
            saved = report.inserted,
            skipped = report.skipped_count(),
            "Scraper complete"
        );

        runs.push(SourceRun {
            kind,
            fetched: outcome.items.len(),
            fetch_failures: outcome.failures,
            report,
        });
    }

    runs
}
