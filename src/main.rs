//! Battmon Backend
//!
//! REST backend for the battery fleet dashboard: device/battery CRUD with
//! SQLite persistence plus derived alert and statistics views.

mod alerts;
mod api;
mod config;
mod db;
mod errors;
mod models;
mod stats;

use std::sync::Arc;

use axum::{
    routing::{delete, get, patch, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::Config;
use db::Repository;

/// Application state shared across all handlers.
///
/// The store is an explicitly owned instance created at startup; nothing is
/// process-global.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub config: Arc<Config>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env();

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Battmon Backend");
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("Bind address: {}", config.bind_addr);
    tracing::info!(
        "Alert thresholds: low {}%, critical {}%, service life {} days ({})",
        config.thresholds.low_capacity,
        config.thresholds.critical_capacity,
        config.thresholds.service_life_limit,
        config.thresholds.service_life_semantics.as_str()
    );

    if config.thresholds.critical_capacity >= config.thresholds.low_capacity {
        tracing::warn!(
            "Critical capacity threshold ({}) is not below the low-capacity threshold ({})",
            config.thresholds.critical_capacity,
            config.thresholds.low_capacity
        );
    }

    // Initialize database
    let pool = db::init_database(&config.db_path).await?;
    let repo = Arc::new(Repository::new(pool, config.max_batteries_per_device));

    // Create application state
    let state = AppState {
        repo,
        config: Arc::new(config.clone()),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration for the browser dashboard
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // The dashboard calls collection routes with a trailing slash, so both
    // spellings are registered.
    let api_routes = Router::new()
        // Devices
        .route("/devices", get(api::list_devices).post(api::create_device))
        .route("/devices/", get(api::list_devices).post(api::create_device))
        .route("/devices/{id}", get(api::get_device))
        .route("/devices/{id}", patch(api::update_device))
        .route("/devices/{id}", delete(api::delete_device))
        .route(
            "/devices/{id}/batteries",
            post(api::create_device_battery).get(api::list_device_batteries),
        )
        .route(
            "/devices/{id}/batteries/{battery_id}",
            delete(api::delete_device_battery),
        )
        // Batteries
        .route("/batteries", get(api::list_batteries))
        .route("/batteries/", get(api::list_batteries))
        .route("/batteries/{id}", get(api::get_battery))
        .route("/batteries/{id}", patch(api::update_battery))
        .route("/batteries/{id}", delete(api::delete_battery))
        .route(
            "/batteries/{id}/reassign/{device_id}",
            post(api::reassign_battery),
        )
        // Derived views
        .route("/batteries/alerts/low_capacity", get(api::low_capacity_alerts))
        .route(
            "/batteries/alerts/need_replacment",
            get(api::need_replacement_alerts),
        )
        .route("/batteries/stats/summary", get(api::battery_stats));

    // Health check
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
