//! Request handlers.

use anyhow::anyhow;
use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::emotes::{Emote, ImageFormat, ImageSize};

use super::error::ApiError;
use super::preview;
use super::state::AppState;

/// A day of client-side caching. Emote ids never change upstream, so the
/// bytes behind an id are effectively immutable.
const IMAGE_CACHE_CONTROL: &str = "public, max-age=86400";

/// Summary emote representation served by the list endpoint.
#[derive(Debug, Serialize)]
pub struct EmoteView {
    pub id: String,
    pub name: String,
    pub owner: String,
    pub animated: bool,
}

impl From<&Emote> for EmoteView {
    fn from(emote: &Emote) -> Self {
        Self {
            id: emote.id.clone(),
            name: emote.name.clone(),
            owner: emote.owner.clone(),
            animated: emote.animated,
        }
    }
}

/// Full emote representation served by the detail endpoint.
#[derive(Debug, Serialize)]
pub struct EmoteDetail {
    pub id: String,
    pub name: String,
    pub owner: String,
    pub animated: bool,
    /// Sorted for stable output; the underlying set is unordered.
    pub tags: Vec<String>,
    pub mime: Option<String>,
}

impl From<&Emote> for EmoteDetail {
    fn from(emote: &Emote) -> Self {
        let mut tags: Vec<String> = emote.tags.iter().cloned().collect();
        tags.sort();
        Self {
            id: emote.id.clone(),
            name: emote.name.clone(),
            owner: emote.owner.clone(),
            animated: emote.animated,
            tags,
            mime: emote.mime.clone(),
        }
    }
}

/// Liveness probe.
pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// Service identity plus registry counters.
pub async fn stats(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "registry": state.registry.stats(),
    }))
}

/// Every emote currently in the registry.
pub async fn list_emotes(State(state): State<AppState>) -> Json<Vec<EmoteView>> {
    let all = state.registry.all();
    Json(all.iter().map(EmoteView::from).collect())
}

/// One emote by name, case-insensitively, with the full record.
pub async fn get_emote(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<EmoteDetail>, ApiError> {
    let emote = find_or_404(&state, &name)?;
    Ok(Json(EmoteDetail::from(&emote)))
}

/// Drop every cached lookup and reload all configured sets.
pub async fn refresh(State(state): State<AppState>) -> Json<serde_json::Value> {
    let loaded = state.registry.refresh().await;
    info!("Manual refresh loaded {} emotes", loaded.len());
    Json(json!({ "loaded": loaded.len() }))
}

#[derive(Debug, Default, Deserialize)]
pub struct ImageQuery {
    #[serde(default)]
    pub size: ImageSize,
    #[serde(default)]
    pub format: ImageFormat,
}

/// Image passthrough: resolve the name, fetch the bytes upstream, re-serve
/// them with cache headers. An invalid `size`/`format` never reaches this
/// handler; the query extractor rejects it with a 400 first.
pub async fn image(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<ImageQuery>,
) -> Result<Response, ApiError> {
    let emote = find_or_404(&state, &name)?;
    let (bytes, content_type) = state
        .resolver
        .resolve(&emote.id, query.size, query.format)
        .await
        .map_err(ApiError::bad_gateway)?;

    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (header::CACHE_CONTROL, IMAGE_CACHE_CONTROL),
        ],
        bytes,
    )
        .into_response())
}

/// OpenGraph preview page for one emote.
pub async fn preview_page(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Html<String>, ApiError> {
    let emote = find_or_404(&state, &name)?;
    Ok(Html(preview::render(&emote, &state.config.cdn_base)))
}

fn find_or_404(state: &AppState, name: &str) -> Result<Emote, ApiError> {
    state
        .registry
        .find(name)
        .ok_or_else(|| ApiError::not_found(anyhow!("no emote named '{}'", name)))
}
