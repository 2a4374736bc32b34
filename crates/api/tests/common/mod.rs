#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use detailhq_api::config::{LogFormat, ServerConfig};
use detailhq_api::router::build_app_router;
use detailhq_api::state::AppState;
use detailhq_events::ChangeBus;
use detailhq_report::MemoryArchive;
use detailhq_store::{FallbackPolicy, LocalCache, MemoryCache, MemoryRemote, Stores};

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        database_url: None,
        db_acquire_timeout_secs: 5,
        cache_dir: ".detailhq-test/cache".into(),
        archive_dir: ".detailhq-test/files".into(),
        log_format: LogFormat::Text,
    }
}

/// The router plus handles on the in-memory backends behind it, so tests
/// can take the remote offline or inspect what reached it.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub remote: Arc<MemoryRemote>,
    pub cache: Arc<MemoryCache>,
    pub bus: Arc<ChangeBus>,
}

/// Full application over a fresh in-memory remote, cache and archive.
pub async fn build_test_app() -> TestApp {
    build_test_app_with(Arc::new(MemoryCache::new()), |_| {}).await
}

/// Like [`build_test_app`], with a caller-provided cache and a hook that
/// runs against the remote before the stores load.
pub async fn build_test_app_with(
    cache: Arc<MemoryCache>,
    prepare: impl FnOnce(&MemoryRemote),
) -> TestApp {
    let bus = Arc::new(ChangeBus::default());
    let remote = Arc::new(MemoryRemote::new().with_bus(Arc::clone(&bus)));
    prepare(&remote);

    let local: Arc<dyn LocalCache> = cache.clone();
    let stores = Arc::new(Stores::new(
        remote.as_ref(),
        local,
        FallbackPolicy::default(),
    ));
    stores.load_all().await.unwrap();

    let config = test_config();
    let state = AppState {
        config: Arc::new(config.clone()),
        stores,
        bus: Arc::clone(&bus),
        archive: Arc::new(MemoryArchive::new()),
        pool: None,
    };

    TestApp {
        router: build_app_router(state.clone(), &config),
        state,
        remote,
        cache,
        bus,
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

/// Send one request, with an optional JSON body, through `router`.
pub async fn request(
    router: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> Response<Body> {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    router.clone().oneshot(request).await.unwrap()
}

pub async fn send(app: &TestApp, method: Method, uri: &str, body: Option<Value>) -> Response<Body> {
    request(&app.router, method, uri, body).await
}

pub async fn get(app: &TestApp, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None).await
}

pub async fn post_json(app: &TestApp, uri: &str, body: Value) -> Response<Body> {
    send(app, Method::POST, uri, Some(body)).await
}

pub async fn post_empty(app: &TestApp, uri: &str) -> Response<Body> {
    send(app, Method::POST, uri, None).await
}

pub async fn put_json(app: &TestApp, uri: &str, body: Value) -> Response<Body> {
    send(app, Method::PUT, uri, Some(body)).await
}

pub async fn patch(app: &TestApp, uri: &str) -> Response<Body> {
    send(app, Method::PATCH, uri, None).await
}

pub async fn delete(app: &TestApp, uri: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, None).await
}

/// POST raw bytes with the given content type.
pub async fn post_bytes(
    app: &TestApp,
    uri: &str,
    content_type: &str,
    bytes: Vec<u8>,
) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", content_type)
        .body(Body::from(bytes))
        .unwrap();
    app.router.clone().oneshot(request).await.unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

/// The `data` field of a JSON response.
pub async fn data(response: Response<Body>) -> Value {
    body_json(response).await["data"].clone()
}
