//! EventPro REST API
//!
//! HTTP layer over the content store, built with Axum.
//!
//! # Endpoints
//!
//! ## Public
//! - `GET /api/v1/content` - Reconciled site document
//! - `GET /api/v1/testimonials` - Approved testimonials
//! - `POST /api/v1/reviews` - Submit a review for moderation
//! - `GET /api/v1/albums/:id` - A gallery album
//!
//! ## Admin (Bearer session token)
//! - `POST /api/v1/admin/login`, `POST /api/v1/admin/logout`, `GET /api/v1/admin/status`
//! - `PUT /api/v1/admin/content` - Replace the document
//! - Hero, sections, testimonials, albums, highlights (see [`routes::admin`])
//! - `POST /api/v1/admin/sync/force` - Drop the local copy
//!
//! ## Health
//! - `GET /health/live` - Liveness probe
//! - `GET /health/ready` - Readiness probe
//! - `GET /health` - Full health status
//!
//! ## WebSocket
//! - `GET /ws` - Content change notifications
//!
//! # Example
//!
//! ```rust,ignore
//! use eventpro::admin::AdminGate;
//! use eventpro::api::{serve, AppState};
//! use eventpro::config::Config;
//! use eventpro::content::{ContentStore, LocalStore};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load_default();
//!     let local = LocalStore::new(config.storage.data_path(), config.storage.local_quota_bytes);
//!     let store = Arc::new(ContentStore::local_only(local));
//!     let gate = AdminGate::new(&config.admin.password, config.admin.session_ttl());
//!
//!     serve(AppState::new(store, gate, config.api.clone()), &config.api).await?;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod dto;
pub mod error;
pub mod routes;
pub mod state;

pub use auth::AdminSession;
pub use error::{ApiError, ApiResult};
pub use state::AppState;

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ApiConfig;
use crate::websocket::websocket_handler;

/// Request bodies may carry whole documents with embedded images
const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

/// Build the API router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let admin_routes = Router::new()
        .route("/login", post(routes::admin::login))
        .route("/logout", post(routes::admin::logout))
        .route("/status", get(routes::admin::status))
        .route("/content", put(routes::admin::replace_content))
        // Hero and sections
        .route("/hero/stats", put(routes::admin::set_stats))
        .route("/hero/slides", post(routes::admin::add_slide))
        .route("/hero/slides/:index", delete(routes::admin::remove_slide))
        .route("/certification", put(routes::admin::set_certification))
        .route("/about", put(routes::admin::update_about))
        .route("/contact", put(routes::admin::update_contact))
        .route("/footer", put(routes::admin::update_footer))
        // Testimonials
        .route(
            "/testimonials",
            get(routes::admin::list_testimonials).post(routes::admin::add_testimonial),
        )
        .route(
            "/testimonials/:index/approve",
            post(routes::admin::approve_testimonial),
        )
        .route(
            "/testimonials/:index",
            delete(routes::admin::remove_testimonial),
        )
        // Gallery
        .route("/albums", post(routes::admin::create_album))
        .route("/albums/:id", delete(routes::admin::remove_album))
        .route("/albums/:id/images", post(routes::admin::add_album_image))
        .route(
            "/albums/:id/images/:index",
            delete(routes::admin::remove_album_image),
        )
        .route("/gallery/recent", post(routes::admin::add_recent))
        .route(
            "/gallery/recent/:index",
            delete(routes::admin::remove_recent),
        )
        .route("/gallery/reset", post(routes::admin::reset_gallery))
        // Sync
        .route("/sync/force", post(routes::admin::force_sync));

    let api_routes = Router::new()
        .route("/content", get(routes::content::get_content))
        .route("/testimonials", get(routes::content::list_testimonials))
        .route("/albums/:id", get(routes::content::get_album))
        .route("/reviews", post(routes::reviews::submit_review))
        .nest("/admin", admin_routes)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES));

    let health_routes = Router::new()
        .route("/live", get(routes::health::liveness))
        .route("/ready", get(routes::health::readiness))
        .route("/", get(routes::health::full_health));

    let cors = cors_layer(&state.config);
    let timeout = Duration::from_secs(state.config.request_timeout_secs);
    let shared_state = Arc::new(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .nest("/health", health_routes)
        .layer(TimeoutLayer::new(timeout))
        .route("/ws", get(websocket_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(shared_state)
}

/// Any origin unless `cors_origins` lists specific ones
fn cors_layer(config: &ApiConfig) -> CorsLayer {
    if config.cors_origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::permissive().allow_origin(AllowOrigin::list(origins))
}

/// Start the API server
pub async fn serve(state: AppState, config: &ApiConfig) -> Result<(), ApiError> {
    let router = build_router(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("EventPro API listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("EventPro API shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
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
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
