//! Read-side operations over the store. Every listing is newest first.

use thiserror::Error;

use crate::errors::StoreError;
use crate::models::NewsItem;
use crate::repositories::{ListNewsParams, NewsRepository};

pub const DEFAULT_PAGE_LIMIT: u32 = 10;
pub const DEFAULT_LATEST_LIMIT: u32 = 5;
pub const DEFAULT_SOURCE_LIMIT: u32 = 10;
pub const MAX_LIMIT: u32 = 100;

#[derive(Error, Debug)]
pub enum QueryError {
    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, Default)]
pub struct ListNewsQuery {
    pub source: Option<String>,
    pub content_type: Option<String>,
    /// 1-based
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Clone)]
pub struct NewsQuery<R: NewsRepository> {
    repo: R,
}

impl<R: NewsRepository> NewsQuery<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// The `page`-th slice of the filtered listing. An empty page is not an error.
    pub async fn list(&self, query: &ListNewsQuery) -> Result<Vec<NewsItem>, QueryError> {
        let limit = clamp_limit(query.limit, DEFAULT_PAGE_LIMIT);
        let page = query.page.unwrap_or(1).max(1);
        let offset = (page - 1).saturating_mul(limit);

        let params = ListNewsParams {
            source: query.source.clone().filter(|s| !s.is_empty()),
            content_type: query.content_type.clone().filter(|t| !t.is_empty()),
            limit,
            offset,
        };
        Ok(self.repo.list(&params).await?)
    }

    pub async fn latest(&self, limit: Option<u32>) -> Result<Vec<NewsItem>, QueryError> {
        let params = ListNewsParams {
            limit: clamp_limit(limit, DEFAULT_LATEST_LIMIT),
            ..Default::default()
        };
        Ok(self.repo.list(&params).await?)
    }

    pub async fn by_source(
        &self,
        source: &str,
        limit: Option<u32>,
    ) -> Result<Vec<NewsItem>, QueryError> {
        let params = ListNewsParams {
            source: Some(source.to_string()),
            limit: clamp_limit(limit, DEFAULT_SOURCE_LIMIT),
            ..Default::default()
        };
        let items = self.repo.list(&params).await?;
        if items.is_empty() {
            return Err(QueryError::NotFound(format!(
                "No news found for source: {source}"
            )));
        }
        Ok(items)
    }

    pub async fn by_id(&self, id: &str) -> Result<NewsItem, QueryError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| QueryError::NotFound("News item not found".to_string()))
    }
}

fn clamp_limit(limit: Option<u32>, default: u32) -> u32 {
    limit.unwrap_or(default).clamp(1, MAX_LIMIT)
}
