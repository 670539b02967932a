//! HTTP surface of the relay.
//!
//! One `Router` carries both the JSON API (`/health`, `/stats`, `/api/...`)
//! and the public image and preview routes (`/i/{name}`, `/e/{name}`).

mod error;
mod handlers;
mod preview;
mod state;

pub use state::AppState;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Build the full route tree over the given state.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/stats", get(handlers::stats))
        .route("/api/emotes", get(handlers::list_emotes))
        .route("/api/emotes/{name}", get(handlers::get_emote))
        .route("/api/refresh", post(handlers::refresh))
        .route("/i/{name}", get(handlers::image))
        .route("/e/{name}", get(handlers::preview_page))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind the listener and serve until the process is stopped.
pub async fn run(state: AppState, addr: &str) -> anyhow::Result<()> {
    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on http://{}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}
