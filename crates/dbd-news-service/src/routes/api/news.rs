use axum::{
    Router,
    extract::{Path, Query, State},
    response::Json as ResponseJson,
    routing::get,
};
use serde::Deserialize;
use tracing::{debug, info, instrument};

use crate::AppState;
use crate::errors::ApiError;
use crate::models::NewsItem;
use crate::query::ListNewsQuery;

#[derive(Debug, Deserialize)]
struct ListNewsRequest {
    source: Option<String>,
    #[serde(rename = "type")]
    content_type: Option<String>,
    page: Option<u32>,
    limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct LimitRequest {
    limit: Option<u32>,
}

/// `/latest` takes any `limit`; zero or non-numeric values fall back to the default.
#[derive(Debug, Deserialize)]
struct LatestRequest {
    limit: Option<String>,
}

impl LatestRequest {
    fn limit(&self) -> Option<u32> {
        self.limit
            .as_deref()
            .and_then(|raw| raw.trim().parse::<u32>().ok())
            .filter(|&limit| limit > 0)
    }
}

fn reject_zero(name: &str, value: Option<u32>) -> Result<(), ApiError> {
    if value == Some(0) {
        return Err(ApiError::BadRequest(format!(
            "{name} must be greater than 0"
        )));
    }
    Ok(())
}

#[instrument(skip_all, fields(source = ?query.source, content_type = ?query.content_type, page = query.page, limit = query.limit))]
async fn list_news<S: AppState>(
    State(state): State<S>,
    Query(query): Query<ListNewsRequest>,
) -> Result<ResponseJson<Vec<NewsItem>>, ApiError> {
    reject_zero("Page", query.page)?;
    reject_zero("Limit", query.limit)?;

    let items = state
        .news_query()
        .list(&ListNewsQuery {
            source: query.source,
            content_type: query.content_type,
            page: query.page,
            limit: query.limit,
        })
        .await?;

    info!(returned_count = items.len(), "Listed news");
    Ok(ResponseJson(items))
}

#[instrument(skip_all, fields(limit = ?query.limit))]
async fn latest_news<S: AppState>(
    State(state): State<S>,
    Query(query): Query<LatestRequest>,
) -> Result<ResponseJson<Vec<NewsItem>>, ApiError> {
    let items = state.news_query().latest(query.limit()).await?;
    debug!(returned_count = items.len(), "Fetched latest news");
    Ok(ResponseJson(items))
}

#[instrument(skip_all, fields(source = %source, limit = query.limit))]
async fn news_by_source<S: AppState>(
    State(state): State<S>,
    Path(source): Path<String>,
    Query(query): Query<LimitRequest>,
) -> Result<ResponseJson<Vec<NewsItem>>, ApiError> {
    reject_zero("Limit", query.limit)?;

    let items = state.news_query().by_source(&source, query.limit).await?;
    debug!(returned_count = items.len(), "Fetched news by source");
    Ok(ResponseJson(items))
}

#[instrument(skip_all, fields(id = %id))]
async fn news_by_id<S: AppState>(
    State(state): State<S>,
    Path(id): Path<String>,
) -> Result<ResponseJson<NewsItem>, ApiError> {
    let item = state.news_query().by_id(&id).await?;
    debug!("Fetched news item");
    Ok(ResponseJson(item))
}

pub fn create_news_router<S: AppState>() -> Router<S> {
    Router::new()
        .route("/", get(list_news::<S>))
        .route("/latest", get(latest_news::<S>))
        .route("/source/{source}", get(news_by_source::<S>))
        .route("/{id}", get(news_by_id::<S>))
}
