//! emoterelay - 7TV emote relay server
//!
//! Resolves emote names against configured 7TV emote sets and re-serves
//! the emote images with CDN-friendly headers.
//!
//! ## Architecture
//!
//! - `config` - Environment configuration
//! - `cache` - TTL cache backing name lookups
//! - `emotes` - Upstream client, normalization, and the registry
//! - `server` - HTTP surface (JSON API, image passthrough, previews)

mod cache;
mod config;
mod emotes;
mod server;

use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use config::Config;
use emotes::{EmoteRegistry, ImageResolver, SevenTvClient};
use server::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file first (before anything else)
    dotenvy::dotenv().ok();

    // Initialize logging with sensible defaults
    // If RUST_LOG is not set, default to "info" level for our crate
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("emoterelay=info,tower_http=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .init();

    info!("Starting emoterelay...");

    // Load configuration
    let config = Arc::new(Config::from_env());
    info!("Configuration loaded successfully");
    info!(
        "Serving {} emote set(s) from {}",
        config.emote_sets.len(),
        config.api_base
    );

    // One upstream client feeds both the registry and the image resolver
    let client = Arc::new(SevenTvClient::new(
        &config.api_base,
        &config.cdn_base,
        config.upstream_timeout,
    )?);

    let registry = Arc::new(EmoteRegistry::new(
        client.clone(),
        config.emote_sets.clone(),
        config.cache_ttl,
    ));
    let resolver = Arc::new(ImageResolver::new(client));

    // Initial load. An empty registry is survivable; POST /api/refresh can
    // fill it once upstream recovers.
    let loaded = registry.load_all().await;
    if loaded.is_empty() {
        warn!("Initial load produced no emotes");
    }

    let state = AppState::new(config.clone(), registry, resolver);
    server::run(state, &config.bind_addr()).await
}
