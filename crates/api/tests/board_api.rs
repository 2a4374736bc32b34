//! Library, team messages, pro-tips and the assistant chat log.

mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{body_json, build_test_app, data, delete, get, post_empty, post_json};

// -- library --

#[tokio::test]
async fn library_items_filter_by_category() {
    let app = build_test_app().await;
    for (title, category) in [("Clay bar how-to", "paint"), ("Leather care", "interior")] {
        let response = post_json(
            &app,
            "/api/v1/library",
            json!({
                "title": title,
                "media": "video",
                "url": "https://videos.example.com/clip.mp4",
                "category": category,
                "author": "Sam"
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let paint = data(get(&app, "/api/v1/library?category=paint").await).await;
    assert_eq!(paint.as_array().unwrap().len(), 1);
    assert_eq!(paint[0]["title"], "Clay bar how-to");
    assert_eq!(paint[0]["media"], "video");

    let all = data(get(&app, "/api/v1/library").await).await;
    assert_eq!(all.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn library_item_needs_valid_url() {
    let app = build_test_app().await;
    let response = post_json(
        &app,
        "/api/v1/library",
        json!({"title": "Broken", "media": "image", "url": "not a url", "author": "Sam"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn comments_follow_their_item() {
    let app = build_test_app().await;
    let item = data(
        post_json(
            &app,
            "/api/v1/library",
            json!({
                "title": "Before and after",
                "media": "image",
                "url": "https://img.example.com/a.jpg",
                "author": "Sam"
            }),
        )
        .await,
    )
    .await;
    let id = item["id"].as_str().unwrap();
    let comments_uri = format!("/api/v1/library/{id}/comments");

    let response = post_json(&app, &comments_uri, json!({"author": "Alex", "text": "Great shine"})).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let comments = data(get(&app, &comments_uri).await).await;
    assert_eq!(comments.as_array().unwrap().len(), 1);
    assert_eq!(comments[0]["text"], "Great shine");

    assert_eq!(delete(&app, &format!("/api/v1/library/{id}")).await.status(), StatusCode::OK);
    assert_eq!(get(&app, &comments_uri).await.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn comment_on_unknown_item_is_404() {
    let app = build_test_app().await;
    let response = post_json(
        &app,
        &format!("/api/v1/library/{}/comments", uuid::Uuid::new_v4()),
        json!({"author": "Alex", "text": "hello"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// -- messages --

#[tokio::test]
async fn messages_list_in_posting_order() {
    let app = build_test_app().await;
    for body in ["Opening at 8", "Bay 2 is free"] {
        let response = post_json(&app, "/api/v1/messages", json!({"author": "Sam", "body": body})).await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let messages = data(get(&app, "/api/v1/messages").await).await;
    assert_eq!(messages[0]["body"], "Opening at 8");
    assert_eq!(messages[1]["body"], "Bay 2 is free");
}

#[tokio::test]
async fn empty_message_is_400() {
    let app = build_test_app().await;
    let response = post_json(&app, "/api/v1/messages", json!({"author": "Sam", "body": "  "})).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// -- pro-tips --

#[tokio::test]
async fn pro_tip_lifecycle() {
    let app = build_test_app().await;
    let response = post_json(&app, "/api/v1/pro-tips", json!({"text": "Two-bucket wash"})).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let tip = data(response).await;
    let id = tip["id"].as_str().unwrap();

    let tips = data(get(&app, "/api/v1/pro-tips").await).await;
    assert_eq!(tips.as_array().unwrap().len(), 1);

    let uri = format!("/api/v1/pro-tips/{id}");
    assert_eq!(delete(&app, &uri).await.status(), StatusCode::NO_CONTENT);
    assert_eq!(delete(&app, &uri).await.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn pro_tips_work_with_remote_offline() {
    let app = build_test_app().await;
    app.remote.set_online(false);

    let response = post_json(&app, "/api/v1/pro-tips", json!({"text": "Dress tires last"})).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let tips = data(get(&app, "/api/v1/pro-tips").await).await;
    assert_eq!(tips[0]["text"], "Dress tires last");
}

#[tokio::test]
async fn empty_pro_tip_is_400() {
    let app = build_test_app().await;
    let response = post_json(&app, "/api/v1/pro-tips", json!({"text": ""})).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// -- assistant --

#[tokio::test]
async fn chat_log_appends_and_clears() {
    let app = build_test_app().await;
    app.remote.set_online(false);
    for (role, text) in [("user", "Best wax for black paint?"), ("assistant", "A carnauba blend.")] {
        let response = post_json(
            &app,
            "/api/v1/assistant/chat",
            json!({"role": role, "text": text}),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let log = data(get(&app, "/api/v1/assistant/chat").await).await;
    assert_eq!(log[0]["role"], "user");
    assert_eq!(log[1]["text"], "A carnauba blend.");

    let cleared = data(delete(&app, "/api/v1/assistant/chat").await).await;
    assert_eq!(cleared["cleared"], 2);
    let log = data(get(&app, "/api/v1/assistant/chat").await).await;
    assert!(log.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn blank_chat_entry_is_400() {
    let app = build_test_app().await;
    let response = post_json(
        &app,
        "/api/v1/assistant/chat",
        json!({"role": "user", "text": "  "}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn tool_usage_counts_and_sorts() {
    let app = build_test_app().await;
    post_empty(&app, "/api/v1/assistant/tools/paint-gauge").await;
    post_empty(&app, "/api/v1/assistant/tools/quote").await;
    let response = post_empty(&app, "/api/v1/assistant/tools/Quote").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(data(response).await["count"], 2);

    let usage = data(get(&app, "/api/v1/assistant/tools").await).await;
    assert_eq!(usage[0]["tool"], "quote");
    assert_eq!(usage[1]["tool"], "paint-gauge");
}
