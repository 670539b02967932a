//! Shared server state.

use std::sync::Arc;

use crate::config::Config;
use crate::emotes::{EmoteRegistry, ImageResolver};

/// State handed to every handler through `axum::extract::State`.
///
/// Cloning is cheap; everything inside is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub registry: Arc<EmoteRegistry>,
    pub resolver: Arc<ImageResolver>,
}

impl AppState {
    pub fn new(config: Arc<Config>, registry: Arc<EmoteRegistry>, resolver: Arc<ImageResolver>) -> Self {
        Self {
            config,
            registry,
            resolver,
        }
    }
}
