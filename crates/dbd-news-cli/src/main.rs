use anyhow::{Context, Result, bail};
use chrono::{DateTime, Duration, Utc};
use clap::{Parser, Subcommand};
use dbd_news_service::{
    config::Config,
    db::Database,
    models::{ContentType, NewsCandidate, Source},
    pipeline::{Ingestor, MAX_RETENTION_DAYS},
    repositories::NewsRepository,
    scrape::run_sources,
    sources::{SourceKind, UnknownSource, build_sources, extract::parse_timestamp},
};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "dbd-news")]
#[command(about = "Batch jobs for the Dead by Daylight news store")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch news from one source (or all) and ingest it
    Scrape {
        /// youtube, steam, website, twitter or all
        #[arg(value_parser = parse_target)]
        target: ScrapeTarget,
    },
    /// Delete items published more than N days ago
    Cleanup {
        /// Retention in days; defaults to RETENTION_DAYS
        #[arg(long, value_parser = clap::value_parser!(i64).range(1..=MAX_RETENTION_DAYS))]
        days: Option<i64>,
    },
    /// Ingest a single post by hand
    AddPost {
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
        #[arg(long)]
        url: String,
        /// Origin tag, e.g. Twitter or "DeadByDaylight Website"
        #[arg(long)]
        source: String,
        #[arg(long)]
        content_type: ContentType,
        /// RFC 3339 or YYYY-MM-DD[THH:MM:SS] (UTC)
        #[arg(long, value_parser = parse_published_at)]
        published_at: DateTime<Utc>,
        #[arg(long)]
        image_url: Option<String>,
        #[arg(long)]
        code: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum ScrapeTarget {
    All,
    Only(SourceKind),
}

impl ScrapeTarget {
    fn kinds(self) -> Vec<SourceKind> {
        match self {
            ScrapeTarget::All => SourceKind::ALL.to_vec(),
            ScrapeTarget::Only(kind) => vec![kind],
        }
    }
}

fn parse_target(value: &str) -> Result<ScrapeTarget, UnknownSource> {
    if value.eq_ignore_ascii_case("all") {
        return Ok(ScrapeTarget::All);
    }
    value.parse().map(ScrapeTarget::Only)
}

fn parse_published_at(value: &str) -> Result<DateTime<Utc>, String> {
    parse_timestamp(value).ok_or_else(|| format!("invalid timestamp: {value}"))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("dbd_news_service=info".parse()?)
                .add_directive("dbd_news=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    let database = Database::connect(&config.database_url)
        .with_context(|| format!("Failed to connect to {}", config.database_url))?;

    let result = match cli.command {
        Commands::Scrape { target } => scrape(&config, &database, target).await,
        Commands::Cleanup { days } => {
            let days = days.unwrap_or(config.retention_days);
            cleanup(&database, Duration::days(days), Utc::now())
                .await
                .map(|_| ())
        }
        Commands::AddPost {
            title,
            content,
            url,
            source,
            content_type,
            published_at,
            image_url,
            code,
        } => {
            let candidate = NewsCandidate {
                title,
                content,
                url,
                image_url,
                source: Source::from(source.as_str()),
                content_type,
                code,
                published_at,
            };
            add_post(&database, config.retention(), candidate).await
        }
    };

    database.close();
    result
}

async fn scrape(config: &Config, database: &Database, target: ScrapeTarget) -> Result<()> {
    let sources = build_sources(config, &target.kinds()).context("Failed to build HTTP client")?;
    let ingestor = Ingestor::with_retention(database.repository(), config.retention());

    let runs = run_sources(&sources, &ingestor).await;
    for run in &runs {
        println!(
            "{}: fetched {}, saved {}, already present {}, skipped {}, failed {}",
            run.kind,
            run.fetched,
            run.report.inserted,
            run.report.already_present,
            run.report.skipped_count(),
            run.fetch_failures.len() + run.report.failures.len(),
        );
    }

    Ok(())
}

/// Delete everything published before `now - retention`. Returns the number removed.
async fn cleanup(database: &Database, retention: Duration, now: DateTime<Utc>) -> Result<usize> {
    let Some(cutoff) = now.checked_sub_signed(retention) else {
        bail!("Retention of {} days reaches past the earliest supported date", retention.num_days());
    };
    let deleted = database
        .repository()
        .delete_published_before(cutoff.naive_utc())
        .await?;

    info!(deleted, cutoff = %cutoff, "Retention sweep complete");
    println!("Deleted {deleted} items published before {}", cutoff.to_rfc3339());
    Ok(deleted)
}

async fn add_post(database: &Database, retention: Duration, candidate: NewsCandidate) -> Result<()> {
    let ingestor = Ingestor::with_retention(database.repository(), retention);
    let report = ingestor.ingest(std::slice::from_ref(&candidate)).await;

    if let Some(failure) = report.failures.first() {
        bail!("Failed to save {}: {}", failure.url, failure.reason);
    }
    if report.skipped_count() > 0 {
        warn!(url = %candidate.url, "Post is older than the retention window");
        bail!(
            "Post published at {} is older than {} days; not saved",
            candidate.published_at.to_rfc3339(),
            retention.num_days()
        );
    }
    if report.already_present > 0 {
        println!("Post already exists: {}", candidate.url);
    } else {
        println!("Saved post: {}", candidate.title);
    }

    Ok(())
}
