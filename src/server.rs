use anyhow::Result;
use arc_swap::ArcSwap;
use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, patch, post},
    Router,
};
use std::{net::SocketAddr, path::PathBuf, sync::Arc};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use crate::{
    auth,
    config::Config,
    handlers::{self, AppState},
    metrics,
    signals::setup_signal_handlers,
    storage::ShipmentStore,
};

/// Start the Packfy gateway server
///
/// This function:
/// 1. Initializes metrics
/// 2. Opens the shipment database and runs migrations
/// 3. Sets up signal handlers for graceful shutdown and config reload
/// 4. Creates the Axum application
/// 5. Serves requests with graceful shutdown support
pub async fn start_server(config: Config, config_path: PathBuf) -> Result<()> {
    info!("Initializing Prometheus metrics...");
    let metrics_handle = Arc::new(metrics::init_metrics());

    info!("Opening shipment database at {}", config.storage.database_url);
    let store = Arc::new(ShipmentStore::connect(&config.storage.database_url).await?);

    // Wrap config in ArcSwap for atomic reload support
    let config_swap = Arc::new(ArcSwap::from_pointee(config.clone()));

    // Setup signal handlers (SIGTERM, SIGINT for shutdown; SIGHUP for reload)
    let (shutdown_tx, signal_handle) = setup_signal_handlers(config_swap.clone(), config_path);
    let mut shutdown_rx = shutdown_tx.subscribe();

    let app_state = AppState {
        config: config_swap.clone(),
        store,
    };

    // Build the Axum router
    let app = create_router(config_swap, app_state, metrics_handle);

    // Create socket address
    let addr = SocketAddr::from((
        config.server.host.parse::<std::net::IpAddr>()?,
        config.server.port,
    ));

    info!("Starting Packfy gateway on {}", addr);
    info!(
        "Configuration: {} API keys, {} tenants, exchange rate {} CUP/USD",
        config.api_keys.len(),
        config.tenants.len(),
        config.pricing.exchange_rate
    );

    // Bind to address
    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Serve with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.recv().await;
            info!("Shutdown signal received, draining connections...");
        })
        .await?;

    signal_handle.await?;
    info!("Server stopped gracefully");

    Ok(())
}

/// Create the Axum router with all routes and middleware
pub fn create_router(
    config: Arc<ArcSwap<Config>>,
    app_state: AppState,
    metrics_handle: Arc<metrics_exporter_prometheus::PrometheusHandle>,
) -> Router {
    let metrics_enabled = config.load().metrics.enabled;

    // Tenant-scoped routes behind bearer-key auth
    let auth_routes = Router::new()
        .route(
            "/api/v1/shipments",
            post(handlers::shipments::create_shipment).get(handlers::shipments::list_shipments),
        )
        .route(
            "/api/v1/shipments/:tracking_number",
            get(handlers::shipments::get_shipment),
        )
        .route(
            "/api/v1/shipments/:tracking_number/status",
            patch(handlers::shipments::update_status),
        )
        .layer(middleware::from_fn_with_state(
            config.clone(),
            auth::auth_middleware,
        ))
        .with_state(app_state.clone());

    // Public endpoints: quoting and tracking require no account
    let public_routes = Router::new()
        .route("/api/v1/quotes", post(handlers::quotes::create_quote))
        .route(
            "/api/v1/tracking/:tracking_number",
            get(handlers::tracking::track_shipment),
        )
        .with_state(app_state);

    let mut app = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check));

    if metrics_enabled {
        app = app.route(
            "/metrics",
            get(handlers::metrics_handler::metrics).with_state(metrics_handle),
        );
    }

    app.merge(public_routes)
        .merge(auth_routes)
        // Quote and shipment bodies are tiny; anything bigger is abuse
        .layer(DefaultBodyLimit::max(64 * 1024))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    #[tokio::test]
    async fn test_create_router() {
        let config = crate::config::tests::create_test_config();
        let config_swap = Arc::new(ArcSwap::from_pointee(config));

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(":memory:")
            .await
            .unwrap();
        let store = ShipmentStore::with_pool(pool);
        store.run_migrations().await.unwrap();

        let app_state = AppState {
            config: config_swap.clone(),
            store: Arc::new(store),
        };

        let recorder = metrics_exporter_prometheus::PrometheusBuilder::new().build_recorder();
        let metrics_handle = Arc::new(recorder.handle());

        let _app = create_router(config_swap, app_state, metrics_handle);
        // Router created successfully - no panic
    }
}
