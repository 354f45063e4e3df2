//! Lemongrass - restaurant online-ordering service.
//!
//! This binary serves the ordering API on port 3000.
//!
//! # Architecture
//!
//! - Axum web framework
//! - Session-backed cart (tower-sessions, in-memory store)
//! - `PostgreSQL` for order records (optional: absent means demo mode)
//! - Mollie for payment sessions (optional: absent means test mode)
//! - Menu dataset loaded once at startup, immutable for the process
//!
//! # Operation modes
//!
//! With both `DATABASE_URL` and `MOLLIE_API_KEY` set, an order is
//! persisted as pending, a payment session is opened, and the webhook
//! moves the order to paid or cancelled. Without them the same flow runs
//! minus the missing collaborator, for local development.

#![cfg_attr(not(test), forbid(unsafe_code))]
// The same modules compile as both the library and this binary; items only
// reachable through the library target would otherwise warn here.
#![allow(dead_code)]

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

mod config;
mod db;
mod error;
mod menu;
mod middleware;
mod routes;
mod services;
mod state;

use config::SiteConfig;
use menu::Menu;
use sentry::integrations::tracing as sentry_tracing;
use state::AppState;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &SiteConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    // Load configuration from environment (needed for Sentry init)
    let config = SiteConfig::from_env().expect("Failed to load configuration");

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);

    // Initialize tracing with EnvFilter and Sentry integration
    // Defaults to info level for our crate if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "lemongrass_site=info,tower_http=debug".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    // Initialize database connection pool, unless running in demo mode
    let pool = match config.database_url.as_ref() {
        Some(url) => {
            let pool = db::create_pool(url)
                .await
                .expect("Failed to create database pool");
            tracing::info!("Database pool created");
            Some(pool)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, running in demo mode (no persistence)");
            None
        }
    };

    // NOTE: Migrations are NOT run automatically on startup.
    // Run them explicitly via: sqlx migrate run --source crates/site/migrations

    // Load the menu dataset once; it is immutable for the process lifetime
    let menu = Menu::load(&config.menu_path).expect("Failed to load menu dataset");
    tracing::info!(items = menu.item_count(), "Menu loaded");

    if config.mollie_api_key.is_none() {
        tracing::warn!("MOLLIE_API_KEY not set, running in test mode (no payment)");
    }

    // Build application state
    let state = AppState::new(config.clone(), pool, menu)
        .expect("Failed to initialize application state");

    // Create session layer (carries the cart)
    let session_layer = middleware::create_session_layer(state.config());

    // Build router
    let app = Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes::routes())
        .layer(session_layer)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction());

    // Start server
    let addr = config.socket_addr();
    tracing::info!("site listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Verifies database connectivity before returning OK; in demo mode there
/// is no database to check, so readiness equals liveness.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.pool() {
        Some(pool) => match sqlx::query("SELECT 1").fetch_one(pool).await {
            Ok(_) => StatusCode::OK,
            Err(_) => StatusCode::SERVICE_UNAVAILABLE,
        },
        None => StatusCode::OK,
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
