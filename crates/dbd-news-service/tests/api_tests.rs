use anyhow::Result;
use axum::http::StatusCode;
use chrono::{Duration, TimeZone, Utc};
use dbd_news_service::models::{NewsCandidate, Source};
use serde_json::Value;

mod common;

use common::server_utils::create_test_server;
use common::{candidate, test_utils};

fn seed(database: &dbd_news_service::db::Database, items: &[NewsCandidate]) {
    for item in items {
        test_utils::insert_news_item(database, item);
    }
}

fn hours_ago(hours: i64) -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 10, 21, 12, 0, 0).unwrap() - Duration::hours(hours)
}

fn urls(body: &Value) -> Vec<String> {
    body.as_array()
        .unwrap()
        .iter()
        .map(|item| item["url"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_root_and_health() -> Result<()> {
    let (server, _db) = create_test_server();

    let response = server.get("/").await;
    response.assert_status_ok();
    assert_eq!(response.text(), "DBD News API is running. Try /api/news");

    let response = server.get("/health").await;
    response.assert_status_ok();
    assert_eq!(response.text(), "OK");

    Ok(())
}

#[tokio::test]
async fn test_list_news_empty_database() -> Result<()> {
    let (server, _db) = create_test_server();

    let response = server.get("/api/news").await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body.as_array().unwrap().len(), 0);

    Ok(())
}

#[tokio::test]
async fn test_list_news_newest_first_with_camel_case_fields() -> Result<()> {
    let (server, db) = create_test_server();

    let mut video = candidate("https://www.youtube.com/watch?v=abc", Source::YouTube, hours_ago(1));
    video.image_url = Some("https://i.ytimg.com/vi/abc/hqdefault.jpg".to_string());
    seed(
        &db,
        &[
            candidate("https://store.steampowered.com/news/1", Source::Steam, hours_ago(5)),
            video,
            candidate("https://deadbydaylight.com/news/a", Source::Website, hours_ago(3)),
        ],
    );

    let response = server.get("/api/news").await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(
        urls(&body),
        vec![
            "https://www.youtube.com/watch?v=abc",
            "https://deadbydaylight.com/news/a",
            "https://store.steampowered.com/news/1",
        ]
    );

    let newest = &body[0];
    assert_eq!(newest["source"], "YouTube");
    assert_eq!(newest["contentType"], "video");
    assert_eq!(newest["imageUrl"], "https://i.ytimg.com/vi/abc/hqdefault.jpg");
    assert_eq!(newest["publishedAt"], "2025-10-21T11:00:00+00:00");
    assert!(newest["createdAt"].is_string());
    assert!(newest["id"].is_string());
    assert!(newest["code"].is_null());

    Ok(())
}

#[tokio::test]
async fn test_list_news_filters_by_source_and_type() -> Result<()> {
    let (server, db) = create_test_server();

    let mut patch = candidate("https://store.steampowered.com/news/patch", Source::Steam, hours_ago(2));
    patch.content_type = dbd_news_service::models::ContentType::Patch;
    seed(
        &db,
        &[
            patch,
            candidate("https://store.steampowered.com/news/text", Source::Steam, hours_ago(1)),
            candidate("https://www.youtube.com/watch?v=1", Source::YouTube, hours_ago(1)),
        ],
    );

    let response = server.get("/api/news?source=Steam").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body.as_array().unwrap().len(), 2);

    let response = server.get("/api/news?source=Steam&type=patch").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(
        urls(&body),
        vec!["https://store.steampowered.com/news/patch"]
    );

    let response = server.get("/api/news?type=event").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert!(body.as_array().unwrap().is_empty());

    Ok(())
}

#[tokio::test]
async fn test_list_news_pagination() -> Result<()> {
    let (server, db) = create_test_server();

    let items: Vec<_> = (0..25)
        .map(|i| {
            candidate(
                &format!("https://example.com/news/{i:02}"),
                Source::Steam,
                hours_ago(i),
            )
        })
        .collect();
    seed(&db, &items);

    // Default page size is 10
    let response = server.get("/api/news").await;
    let body: Value = response.json();
    assert_eq!(body.as_array().unwrap().len(), 10);

    let response = server.get("/api/news?page=2&limit=10").await;
    response.assert_status_ok();
    let body: Value = response.json();
    let expected: Vec<String> = (10..20)
        .map(|i| format!("https://example.com/news/{i:02}"))
        .collect();
    assert_eq!(urls(&body), expected);

    let response = server.get("/api/news?page=3&limit=10").await;
    let body: Value = response.json();
    assert_eq!(body.as_array().unwrap().len(), 5);

    let response = server.get("/api/news?page=9").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert!(body.as_array().unwrap().is_empty());

    Ok(())
}

#[tokio::test]
async fn test_list_news_rejects_invalid_paging() -> Result<()> {
    let (server, _db) = create_test_server();

    for uri in [
        "/api/news?page=0",
        "/api/news?limit=0",
        "/api/news?page=abc",
        "/api/news?limit=-1",
    ] {
        let response = server.get(uri).await;
        assert_eq!(
            response.status_code(),
            StatusCode::BAD_REQUEST,
            "expected 400 for {uri}"
        );
    }

    let response = server.get("/api/news?limit=0").await;
    let body: Value = response.json();
    assert_eq!(body["error"], "Limit must be greater than 0");

    Ok(())
}

#[tokio::test]
async fn test_latest_news_defaults_to_five() -> Result<()> {
    let (server, db) = create_test_server();

    let items: Vec<_> = (0..8)
        .map(|i| {
            candidate(
                &format!("https://example.com/latest/{i}"),
                Source::Website,
                hours_ago(i),
            )
        })
        .collect();
    seed(&db, &items);

    let response = server.get("/api/news/latest").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body.as_array().unwrap().len(), 5);
    assert_eq!(body[0]["url"], "https://example.com/latest/0");

    let response = server.get("/api/news/latest?limit=2").await;
    let body: Value = response.json();
    assert_eq!(body.as_array().unwrap().len(), 2);

    Ok(())
}

#[tokio::test]
async fn test_latest_news_falls_back_on_zero_or_garbage_limit() -> Result<()> {
    let (server, db) = create_test_server();

    let items: Vec<_> = (0..8)
        .map(|i| {
            candidate(
                &format!("https://example.com/fallback/{i}"),
                Source::Steam,
                hours_ago(i),
            )
        })
        .collect();
    seed(&db, &items);

    for query in ["limit=0", "limit=abc", "limit=-3", "limit="] {
        let response = server.get(&format!("/api/news/latest?{query}")).await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body.as_array().unwrap().len(), 5, "query: {query}");
    }

    Ok(())
}

#[tokio::test]
async fn test_news_by_source() -> Result<()> {
    let (server, db) = create_test_server();

    seed(
        &db,
        &[
            candidate("https://www.youtube.com/watch?v=1", Source::YouTube, hours_ago(2)),
            candidate("https://www.youtube.com/watch?v=2", Source::YouTube, hours_ago(1)),
            candidate("https://example.com/other", Source::Steam, hours_ago(1)),
        ],
    );

    let response = server.get("/api/news/source/YouTube").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(
        urls(&body),
        vec![
            "https://www.youtube.com/watch?v=2",
            "https://www.youtube.com/watch?v=1",
        ]
    );

    let response = server.get("/api/news/source/YouTube?limit=1").await;
    let body: Value = response.json();
    assert_eq!(body.as_array().unwrap().len(), 1);

    Ok(())
}

#[tokio::test]
async fn test_news_by_source_with_space_in_name() -> Result<()> {
    let (server, db) = create_test_server();

    seed(
        &db,
        &[candidate("https://deadbydaylight.com/news/x", Source::Website, hours_ago(1))],
    );

    let response = server.get("/api/news/source/DeadByDaylight%20Website").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body[0]["source"], "DeadByDaylight Website");

    Ok(())
}

#[tokio::test]
async fn test_news_by_unknown_source_is_not_found() -> Result<()> {
    let (server, _db) = create_test_server();

    let response = server.get("/api/news/source/NoSuchSource").await;
    response.assert_status(StatusCode::NOT_FOUND);

    let body: Value = response.json();
    assert_eq!(body["error"], "No news found for source: NoSuchSource");

    Ok(())
}

#[tokio::test]
async fn test_news_by_id() -> Result<()> {
    let (server, db) = create_test_server();

    let mut code_drop = candidate("https://twitter.com/DeadByBHVR/status/1", Source::Twitter, hours_ago(1));
    code_drop.content_type = dbd_news_service::models::ContentType::Code;
    code_drop.code = Some("SCARYSURVIVOR".to_string());
    let stored = test_utils::insert_news_item(&db, &code_drop);

    let response = server.get(&format!("/api/news/{}", stored.id)).await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["id"], stored.id.as_str());
    assert_eq!(body["contentType"], "code");
    assert_eq!(body["code"], "SCARYSURVIVOR");

    Ok(())
}

#[tokio::test]
async fn test_news_by_id_not_found() -> Result<()> {
    let (server, _db) = create_test_server();

    let response = server.get("/api/news/nonexistent").await;
    response.assert_status(StatusCode::NOT_FOUND);

    let body: Value = response.json();
    assert_eq!(body["error"], "News item not found");

    Ok(())
}

#[tokio::test]
async fn test_latest_is_not_treated_as_id() -> Result<()> {
    let (server, _db) = create_test_server();

    let response = server.get("/api/news/latest").await;
    response.assert_status_ok();

    Ok(())
}
