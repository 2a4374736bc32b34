mod common;

use axum::http::StatusCode;
use serde_json::{json, Value};

use common::{body_json, build_test_app, data, get, post_json, put_json, TestApp};

async fn create(app: &TestApp, body: Value) -> Value {
    let response = post_json(app, "/api/v1/coupons", body).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    data(response).await
}

#[tokio::test]
async fn code_is_normalized_and_unique() {
    let app = build_test_app().await;
    let coupon = create(
        &app,
        json!({"code": " spring10 ", "value": {"kind": "percent", "value": 10}, "uses_left": 5}),
    )
    .await;
    assert_eq!(coupon["code"], "SPRING10");
    assert_eq!(coupon["active"], true);

    let response = post_json(
        &app,
        "/api/v1/coupons",
        json!({"code": "Spring10", "value": {"kind": "amount", "value": 5}, "uses_left": 1}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["code"], "CONFLICT");
}

#[tokio::test]
async fn invalid_values_are_400() {
    let app = build_test_app().await;
    for value in [
        json!({"kind": "percent", "value": 150}),
        json!({"kind": "amount", "value": 0}),
    ] {
        let response = post_json(
            &app,
            "/api/v1/coupons",
            json!({"code": "BAD", "value": value, "uses_left": 1}),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn list_returns_table_rows() {
    let app = build_test_app().await;
    create(
        &app,
        json!({"code": "TENOFF", "value": {"kind": "percent", "value": 10}, "uses_left": 3}),
    )
    .await;
    create(
        &app,
        json!({"code": "AMT", "value": {"kind": "amount", "value": 12.5}, "uses_left": 1, "active": false}),
    )
    .await;

    let rows = data(get(&app, "/api/v1/coupons").await).await;
    assert_eq!(rows[0]["code"], "AMT");
    assert_eq!(rows[0]["type"], "Amount");
    assert_eq!(rows[0]["value"], "12.5");
    assert_eq!(rows[0]["status"], "Inactive");
    assert_eq!(rows[1]["code"], "TENOFF");
    assert_eq!(rows[1]["type"], "Percent");
    assert_eq!(rows[1]["value"], "10");
    assert_eq!(rows[1]["uses_left"], 3);
    assert_eq!(rows[1]["status"], "Active");
}

#[tokio::test]
async fn redeem_until_exhausted() {
    let app = build_test_app().await;
    let coupon = create(
        &app,
        json!({"code": "TWICE", "value": {"kind": "percent", "value": 20}, "uses_left": 2}),
    )
    .await;
    let uri = format!("/api/v1/coupons/{}/redeem", coupon["id"].as_str().unwrap());

    let first = data(post_json(&app, &uri, json!({"price": 100.0})).await).await;
    assert_eq!(first["discounted_price"], 80.0);
    assert_eq!(first["uses_left"], 1);

    let second = data(post_json(&app, &uri, json!({"price": 50.0})).await).await;
    assert_eq!(second["uses_left"], 0);

    let response = post_json(&app, &uri, json!({"price": 50.0})).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn inactive_coupon_cannot_be_redeemed() {
    let app = build_test_app().await;
    let coupon = create(
        &app,
        json!({"code": "OFF", "value": {"kind": "amount", "value": 5}, "uses_left": 9}),
    )
    .await;
    let id = coupon["id"].as_str().unwrap();

    let response = put_json(
        &app,
        &format!("/api/v1/coupons/{id}"),
        json!({"code": "OFF", "value": {"kind": "amount", "value": 5}, "uses_left": 9, "active": false}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = post_json(
        &app,
        &format!("/api/v1/coupons/{id}/redeem"),
        json!({"price": 30.0}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn amount_discount_floors_at_zero() {
    let app = build_test_app().await;
    let coupon = create(
        &app,
        json!({"code": "BIG", "value": {"kind": "amount", "value": 50}, "uses_left": 1}),
    )
    .await;
    let uri = format!("/api/v1/coupons/{}/redeem", coupon["id"].as_str().unwrap());
    let redemption = data(post_json(&app, &uri, json!({"price": 20.0})).await).await;
    assert_eq!(redemption["discounted_price"], 0.0);
}
