//! 新闻 API 集成测试

use axum::http::{Method, StatusCode};
use news_api::models::Role;
use serde_json::json;

mod common;
use common::TestApp;

#[tokio::test]
async fn test_create_and_get_news() {
    let app = TestApp::new();
    let tokens = app.login_as("ed@b.com", Role::Editor).await;

    let (status, created) = app
        .request(
            Method::POST,
            "/api/news",
            Some(&tokens.access_token),
            Some(json!({"title": "Hello", "description": "World"})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["title"], "Hello");

    let id = created["id"].as_i64().unwrap();
    let (status, fetched) = app
        .request(Method::GET, &format!("/api/news/{}", id), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["description"], "World");
}

#[tokio::test]
async fn test_create_news_requires_auth() {
    let app = TestApp::new();

    let (status, _) = app
        .request(
            Method::POST,
            "/api/news",
            None,
            Some(json!({"title": "Hello", "description": "World"})),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(app.news.len(), 0);
}

#[tokio::test]
async fn test_create_news_validation() {
    let app = TestApp::new();
    let tokens = app.login_as("ed@b.com", Role::Editor).await;

    let (status, _) = app
        .request(
            Method::POST,
            "/api/news",
            Some(&tokens.access_token),
            Some(json!({"title": "", "description": "World"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .request(
            Method::POST,
            "/api/news",
            Some(&tokens.access_token),
            Some(json!({"title": "a".repeat(300), "description": "World"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_news() {
    let app = TestApp::new();
    let tokens = app.login_as("ed@b.com", Role::Editor).await;

    let (_, created) = app
        .request(
            Method::POST,
            "/api/news",
            Some(&tokens.access_token),
            Some(json!({"title": "Hello", "description": "World"})),
        )
        .await;
    let id = created["id"].as_i64().unwrap();

    let (status, updated) = app
        .request(
            Method::PUT,
            &format!("/api/news/{}", id),
            Some(&tokens.access_token),
            Some(json!({"description": "Everyone"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["title"], "Hello");
    assert_eq!(updated["description"], "Everyone");

    let (status, _) = app
        .request(
            Method::PUT,
            "/api/news/9999",
            Some(&tokens.access_token),
            Some(json!({"title": "x"})),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_news_admin_only() {
    let app = TestApp::new();
    let editor = app.login_as("ed@b.com", Role::Editor).await;
    let admin = app.login_as("admin@b.com", Role::Admin).await;

    let (_, created) = app
        .request(
            Method::POST,
            "/api/news",
            Some(&editor.access_token),
            Some(json!({"title": "Hello", "description": "World"})),
        )
        .await;
    let uri = format!("/api/news/{}", created["id"].as_i64().unwrap());

    let (status, _) = app
        .request(Method::DELETE, &uri, Some(&editor.access_token), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .request(Method::DELETE, &uri, Some(&admin.access_token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "deleted");

    let (status, _) = app.request(Method::GET, &uri, None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_get_news_invalid_id() {
    let app = TestApp::new();

    let (status, _) = app.request(Method::GET, "/api/news/0", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.request(Method::GET, "/api/news/404", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_news() {
    let app = TestApp::new();
    let tokens = app.login_as("ed@b.com", Role::Editor).await;

    for title in ["Rust 1.80", "Rust 1.81", "Go 1.23"] {
        let (status, _) = app
            .request(
                Method::POST,
                "/api/news",
                Some(&tokens.access_token),
                Some(json!({"title": title, "description": "release notes"})),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = app.request(Method::GET, "/api/news", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 3);
    assert_eq!(body["news"][0]["title"], "Go 1.23");

    let (status, body) = app
        .request(Method::GET, "/api/news?search=rust&limit=1", None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["news"][0]["title"], "Rust 1.81");
}

#[tokio::test]
async fn test_list_news_ignores_malformed_query_numbers() {
    let app = TestApp::new();
    let ed = app.login_as("ed@b.com", Role::Editor).await;
    let admin = app.login_as("admin@b.com", Role::Admin).await;

    for (tokens, title) in [(&ed, "From editor"), (&admin, "From admin")] {
        let (status, _) = app
            .request(
                Method::POST,
                "/api/news",
                Some(&tokens.access_token),
                Some(json!({"title": title, "description": "body"})),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = app
        .request(Method::GET, "/api/news?limit=abc&offset=xyz", None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);

    // 无法解析的 author_id 不作为过滤条件
    let (status, body) = app
        .request(Method::GET, "/api/news?author_id=x", None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);
}

#[tokio::test]
async fn test_non_numeric_news_id_is_json_bad_request() {
    let app = TestApp::new();
    let tokens = app.login_as("admin@b.com", Role::Admin).await;

    let (status, body) = app.request(Method::GET, "/api/news/abc", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], 400);
    assert!(body["error"]["request_id"].is_string());

    let (status, body) = app
        .request(
            Method::PUT,
            "/api/news/abc",
            Some(&tokens.access_token),
            Some(json!({"title": "x"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], 400);

    let (status, body) = app
        .request(Method::DELETE, "/api/news/abc", Some(&tokens.access_token), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], 400);
}
