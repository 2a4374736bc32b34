use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use detailhq_api::background::{schema, ChangeRouter};
use detailhq_api::config::{LogFormat, ServerConfig};
use detailhq_api::router::build_app_router;
use detailhq_api::state::AppState;
use detailhq_db::{PgChangeListener, PgRemote};
use detailhq_events::ChangeBus;
use detailhq_report::{DiskArchive, FileArchive};
use detailhq_store::{FallbackPolicy, FileCache, LocalCache, MemoryRemote, Stores};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Configuration ---
    let config = ServerConfig::from_env()?;
    init_tracing(config.log_format);
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Local tiers ---
    let cache: Arc<dyn LocalCache> = Arc::new(
        FileCache::open(&config.cache_dir)
            .await
            .with_context(|| format!("Failed to open cache dir {}", config.cache_dir.display()))?,
    );
    let archive: Arc<dyn FileArchive> = Arc::new(
        DiskArchive::open(&config.archive_dir)
            .await
            .with_context(|| {
                format!("Failed to open archive dir {}", config.archive_dir.display())
            })?,
    );

    // --- Event bus ---
    let bus = Arc::new(ChangeBus::default());
    let cancel = CancellationToken::new();

    // --- Remote tier ---
    let (stores, pool, listener_handle) = match config.database_url.as_deref() {
        Some(url) => {
            let pool = detailhq_db::create_pool(
                url,
                Duration::from_secs(config.db_acquire_timeout_secs),
            )
            .context("Invalid DATABASE_URL")?;
            tracing::info!("Database connection pool created");

            let stores = Stores::new(
                &PgRemote::new(pool.clone()),
                Arc::clone(&cache),
                FallbackPolicy::default(),
            );
            let listener = PgChangeListener::new(pool.clone(), Arc::clone(&bus));
            let listener_cancel = cancel.clone();
            let handle = tokio::spawn(async move {
                if let Err(e) = listener.run(listener_cancel).await {
                    tracing::error!(error = %e, "Change listener exited");
                }
            });
            (stores, Some(pool), Some(handle))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using the in-memory remote");
            let remote = MemoryRemote::new().with_bus(Arc::clone(&bus));
            let stores = Stores::new(&remote, Arc::clone(&cache), FallbackPolicy::default());
            (stores, None, None)
        }
    };
    let stores = Arc::new(stores);

    // --- Database readiness ---
    let schema_handle = match &pool {
        Some(pool) => match schema::prepare(pool).await {
            Ok(()) => {
                tracing::info!("Database migrations applied");
                None
            }
            Err(e) => {
                tracing::warn!(
                    error = ?e,
                    "Database unavailable at startup, serving from the local cache"
                );
                Some(tokio::spawn(schema::retry_until_ready(
                    pool.clone(),
                    Arc::clone(&stores),
                    cancel.clone(),
                )))
            }
        },
        None => None,
    };

    stores
        .load_all()
        .await
        .context("Initial store load failed")?;
    tracing::info!("Stores loaded");

    // --- Change router ---
    let router_handle = tokio::spawn(
        ChangeRouter::new(Arc::clone(&stores)).run(bus.subscribe(), cancel.clone()),
    );

    // --- App state ---
    let state = AppState {
        config: Arc::new(config.clone()),
        stores,
        bus: Arc::clone(&bus),
        archive,
        pool,
    };
    let app = build_app_router(state, &config);

    // --- Start server ---
    let host = config
        .host
        .parse::<std::net::IpAddr>()
        .with_context(|| format!("Invalid HOST address '{}'", config.host))?;
    let addr = SocketAddr::new(host, config.port);
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    cancel.cancel();
    let _ = tokio::time::timeout(Duration::from_secs(5), router_handle).await;
    for handle in [listener_handle, schema_handle].into_iter().flatten() {
        let _ = tokio::time::timeout(Duration::from_secs(5), handle).await;
    }
    tracing::info!("Graceful shutdown complete");
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "detailhq_api=debug,detailhq_store=debug,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

/// Wait for SIGINT or SIGTERM (on Unix) to initiate graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
