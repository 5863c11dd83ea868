use axum::Router;

pub mod classifier;
pub mod config;
pub mod db;
pub mod errors;
pub mod models;
pub mod pipeline;
pub mod query;
pub mod repositories;
pub mod routes;
pub mod schema;
pub mod scrape;
pub mod shutdown;
pub mod sources;
pub mod validation;

use query::NewsQuery;
use repositories::{NewsRepository, SqliteNewsRepository};

/// Application state trait for dependency injection
pub trait AppState: Clone + Send + Sync + 'static {
    type NewsRepo: NewsRepository;

    fn news_repo(&self) -> &Self::NewsRepo;

    fn news_query(&self) -> NewsQuery<Self::NewsRepo> {
        NewsQuery::new(self.news_repo().clone())
    }
}

#[derive(Clone)]
pub struct DefaultAppState {
    news_repo: SqliteNewsRepository,
}

impl DefaultAppState {
    pub fn new(news_repo: SqliteNewsRepository) -> Self {
        Self { news_repo }
    }
}

impl AppState for DefaultAppState {
    type NewsRepo = SqliteNewsRepository;

    fn news_repo(&self) -> &Self::NewsRepo {
        &self.news_repo
    }
}

pub fn create_app(state: DefaultAppState) -> Router {
    routes::create_router().with_state(state)
}
