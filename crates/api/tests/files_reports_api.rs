mod common;

use axum::http::StatusCode;
use serde_json::json;

use detailhq_core::files::MAX_UPLOAD_BYTES;

use common::{body_bytes, body_json, build_test_app, data, get, post_bytes, post_empty, post_json};

// -- reports --

#[tokio::test]
async fn task_report_is_archived_as_pdf() {
    let app = build_test_app().await;
    post_json(&app, "/api/v1/tasks", json!({"title": "Polish hood", "due_date": "2030-01-02"})).await;

    let response = post_empty(&app, "/api/v1/reports/tasks").await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let record = data(response).await;
    assert_eq!(record["path"], "reports/tasks");
    assert_eq!(record["content_type"], "application/pdf");

    let id = record["id"].as_str().unwrap();
    let response = get(&app, &format!("/api/v1/files/{id}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "application/pdf");
    assert!(response.headers()["content-disposition"]
        .to_str()
        .unwrap()
        .starts_with("attachment"));
    let bytes = body_bytes(response).await;
    assert!(bytes.starts_with(b"%PDF"));
    assert_eq!(bytes.len() as u64, record["size"].as_u64().unwrap());
}

#[tokio::test]
async fn customer_report_for_unknown_id_is_404() {
    let app = build_test_app().await;
    let response = post_empty(
        &app,
        &format!("/api/v1/reports/customers/{}", uuid::Uuid::new_v4()),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn reports_are_listed_by_path() {
    let app = build_test_app().await;
    let customer = data(post_json(&app, "/api/v1/customers", json!({"name": "Rita"})).await).await;
    let id = customer["id"].as_str().unwrap();

    let response = post_empty(&app, &format!("/api/v1/reports/customers/{id}")).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let response = post_empty(&app, "/api/v1/reports/coupons").await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let reports = data(get(&app, "/api/v1/files?path=reports").await).await;
    assert_eq!(reports.as_array().unwrap().len(), 2);

    let customers = data(get(&app, "/api/v1/files?path=reports/customers").await).await;
    assert_eq!(customers.as_array().unwrap().len(), 1);
    assert_eq!(customers[0]["path"], "reports/customers");
}

#[tokio::test]
async fn unknown_file_is_404() {
    let app = build_test_app().await;
    let response = get(&app, &format!("/api/v1/files/{}", uuid::Uuid::new_v4())).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// -- uploads --

#[tokio::test]
async fn image_upload_is_stored() {
    let app = build_test_app().await;
    let response = post_bytes(
        &app,
        "/api/v1/files?name=hood.png&path=customers/media",
        "image/png",
        vec![0x89, b'P', b'N', b'G'],
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let record = data(response).await;
    assert_eq!(record["name"], "hood.png");
    assert_eq!(record["size"], 4);
    assert_eq!(record["path"], "customers/media");

    let listed = data(get(&app, "/api/v1/files?path=customers").await).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn non_media_upload_is_415() {
    let app = build_test_app().await;
    let response = post_bytes(
        &app,
        "/api/v1/files?name=notes.txt",
        "text/plain",
        b"hello".to_vec(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(body_json(response).await["code"], "UNSUPPORTED_FILE");
}

#[tokio::test]
async fn oversized_upload_is_413() {
    let app = build_test_app().await;
    let response = post_bytes(
        &app,
        "/api/v1/files?name=huge.mp4",
        "video/mp4",
        vec![0u8; MAX_UPLOAD_BYTES as usize + 1],
    )
    .await;
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body_json(response).await["code"], "FILE_TOO_LARGE");
}

#[tokio::test]
async fn empty_upload_is_rejected() {
    let app = build_test_app().await;
    let response = post_bytes(&app, "/api/v1/files?name=empty.png", "image/png", Vec::new()).await;
    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

#[tokio::test]
async fn control_characters_in_name_are_400() {
    let app = build_test_app().await;
    let response = post_bytes(
        &app,
        "/api/v1/files?name=before%0Aafter.jpg&path=media",
        "image/jpeg",
        vec![0xFF, 0xD8],
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn non_ascii_name_downloads_with_encoded_filename() {
    let app = build_test_app().await;
    let response = post_bytes(
        &app,
        "/api/v1/files?name=caf%C3%A9.png&path=media",
        "image/png",
        vec![1, 2, 3],
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let id = data(response).await["id"].as_str().unwrap().to_string();

    let response = get(&app, &format!("/api/v1/files/{id}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let disposition = response.headers()["content-disposition"].to_str().unwrap().to_string();
    assert!(disposition.contains("filename*=UTF-8''caf%C3%A9.png"));
}

#[tokio::test]
async fn uploads_cannot_target_reports() {
    let app = build_test_app().await;
    let response = post_bytes(
        &app,
        "/api/v1/files?name=fake.png&path=reports/tasks",
        "image/png",
        vec![1, 2, 3],
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let reports = data(get(&app, "/api/v1/files?path=reports").await).await;
    assert!(reports.as_array().unwrap().is_empty());
}
