#![allow(dead_code)]

use chrono::{DateTime, Utc};
use dbd_news_service::db::Database;
use dbd_news_service::models::{ContentType, NewsCandidate, Source};

pub fn establish_test_database() -> Database {
    Database::in_memory().expect("Failed to create in-memory database")
}

pub fn candidate(url: &str, source: Source, published_at: DateTime<Utc>) -> NewsCandidate {
    NewsCandidate {
        title: format!("News for {url}"),
        content: "Body".to_string(),
        url: url.to_string(),
        image_url: None,
        content_type: match source {
            Source::YouTube => ContentType::Video,
            _ => ContentType::Text,
        },
        source,
        code: None,
        published_at,
    }
}

pub mod server_utils {
    use super::*;
    use axum_test::TestServer;
    use dbd_news_service::{DefaultAppState, routes};

    pub fn create_test_server() -> (TestServer, Database) {
        let database = establish_test_database();

        let state = DefaultAppState::new(database.repository());
        let app = routes::create_router().with_state(state);

        let server = TestServer::new(app).unwrap();
        (server, database)
    }
}

pub mod test_utils {
    use super::*;
    use dbd_news_service::models::{NewNewsItem, NewsItem};
    use dbd_news_service::schema::news_items;
    use diesel::prelude::*;

    pub fn count_news_items(database: &Database) -> i64 {
        let conn = database.connection();
        let mut conn = conn.lock().unwrap();
        news_items::table
            .count()
            .get_result(&mut *conn)
            .expect("Failed to count news items")
    }

    pub fn get_news_item_by_url(database: &Database, url: &str) -> Option<NewsItem> {
        let conn = database.connection();
        let mut conn = conn.lock().unwrap();
        news_items::table
            .filter(news_items::url.eq(url))
            .first::<NewsItem>(&mut *conn)
            .optional()
            .expect("Failed to query news item by URL")
    }

    /// Insert a row directly, bypassing validation and the freshness filter.
    pub fn insert_news_item(database: &Database, candidate: &NewsCandidate) -> NewsItem {
        {
            let conn = database.connection();
            let mut conn = conn.lock().unwrap();
            let row = NewNewsItem::from_candidate(candidate, candidate.url.clone());
            diesel::insert_into(news_items::table)
                .values(&row)
                .execute(&mut *conn)
                .expect("Failed to insert news item");
        }

        get_news_item_by_url(database, &candidate.url).expect("inserted row should exist")
    }
}
