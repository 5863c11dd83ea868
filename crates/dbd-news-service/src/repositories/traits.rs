use crate::errors::StoreError;
use crate::models::{NewNewsItem, NewsItem};
use async_trait::async_trait;
use chrono::NaiveDateTime;

#[derive(Debug, Clone, Default)]
pub struct ListNewsParams {
    pub source: Option<String>,
    pub content_type: Option<String>,
    pub limit: u32,
    pub offset: u32,
}

/// Result of an insert-if-absent keyed by URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    /// A row with the same URL exists; nothing was written.
    AlreadyExists,
}

#[async_trait]
pub trait NewsRepository: Clone + Send + Sync + 'static {
    async fn insert_if_absent(&self, item: &NewNewsItem) -> Result<InsertOutcome, StoreError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<NewsItem>, StoreError>;
    async fn find_by_url(&self, url: &str) -> Result<Option<NewsItem>, StoreError>;
    /// Newest first by `published_at`.
    async fn list(&self, params: &ListNewsParams) -> Result<Vec<NewsItem>, StoreError>;
    async fn delete_published_before(&self, cutoff: NaiveDateTime) -> Result<usize, StoreError>;
    async fn count(&self) -> Result<i64, StoreError>;
}
