use super::traits::{InsertOutcome, ListNewsParams, NewsRepository};
use crate::errors::StoreError;
use crate::models::{NewNewsItem, NewsItem};
use crate::schema::news_items;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use diesel::prelude::*;
use diesel::sqlite::{Sqlite, SqliteConnection};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Clone)]
pub struct SqliteNewsRepository {
    db: Arc<Mutex<SqliteConnection>>,
}

impl SqliteNewsRepository {
    pub fn new(db: Arc<Mutex<SqliteConnection>>) -> Self {
        Self { db }
    }

    fn conn(&self) -> Result<MutexGuard<'_, SqliteConnection>, StoreError> {
        self.db.lock().map_err(|_| StoreError::LockPoisoned)
    }
}

#[async_trait]
impl NewsRepository for SqliteNewsRepository {
    async fn insert_if_absent(&self, item: &NewNewsItem) -> Result<InsertOutcome, StoreError> {
        let mut conn = self.conn()?;
        let inserted = diesel::insert_into(news_items::table)
            .values(item)
            .on_conflict(news_items::url)
            .do_nothing()
            .execute(&mut *conn)?;

        Ok(if inserted == 0 {
            InsertOutcome::AlreadyExists
        } else {
            InsertOutcome::Inserted
        })
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<NewsItem>, StoreError> {
        let mut conn = self.conn()?;
        let result = news_items::table
            .find(id)
            .first::<NewsItem>(&mut *conn)
            .optional()?;
        Ok(result)
    }

    async fn find_by_url(&self, url: &str) -> Result<Option<NewsItem>, StoreError> {
        let mut conn = self.conn()?;
        let result = news_items::table
            .filter(news_items::url.eq(url))
            .first::<NewsItem>(&mut *conn)
            .optional()?;
        Ok(result)
    }

    async fn list(&self, params: &ListNewsParams) -> Result<Vec<NewsItem>, StoreError> {
        let mut query: news_items::BoxedQuery<'static, Sqlite> = news_items::table.into_boxed();

        if let Some(source) = &params.source {
            query = query.filter(news_items::source.eq(source.clone()));
        }

        if let Some(content_type) = &params.content_type {
            query = query.filter(news_items::content_type.eq(content_type.clone()));
        }

        let mut conn = self.conn()?;
        let items = query
            .order(news_items::published_at.desc())
            .then_order_by(news_items::id.asc())
            .limit(i64::from(params.limit))
            .offset(i64::from(params.offset))
            .load::<NewsItem>(&mut *conn)?;
        Ok(items)
    }

    async fn delete_published_before(&self, cutoff: NaiveDateTime) -> Result<usize, StoreError> {
        let mut conn = self.conn()?;
        let deleted =
            diesel::delete(news_items::table.filter(news_items::published_at.lt(cutoff)))
                .execute(&mut *conn)?;
        Ok(deleted)
    }

    async fn count(&self) -> Result<i64, StoreError> {
        let mut conn = self.conn()?;
        let count = news_items::table.count().get_result(&mut *conn)?;
        Ok(count)
    }
}
