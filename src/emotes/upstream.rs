//! Upstream client: emote-set metadata and CDN image bytes.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use super::image::{ImageFormat, ImageSize, image_url};

/// Failure talking to the upstream service.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: StatusCode },

    #[error("unexpected response shape from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Owner block of a raw emote record.
#[derive(Clone, Debug, Deserialize)]
pub struct RawOwner {
    #[serde(default)]
    pub username: String,
}

/// Nested image metadata of a raw emote record.
#[derive(Clone, Debug, Deserialize)]
pub struct RawEmoteData {
    #[serde(default)]
    pub animated: bool,
    pub mime: Option<String>,
}

/// One emote record as returned by the emote-set endpoint.
///
/// `id` and `name` default to empty rather than being required, so a single
/// bare record is dropped by the normalizer instead of failing the decode of
/// the whole set.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RawEmote {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub owner: Option<RawOwner>,
    pub tags: Option<Vec<String>>,
    pub data: Option<RawEmoteData>,
}

/// Body of the emote-set endpoint.
#[derive(Debug, Deserialize)]
pub struct RawEmoteSet {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub emotes: Vec<RawEmote>,
}

/// Network seam between the registry/resolver and the emote service.
///
/// Both operations surface failures; absorbing a failed set fetch into an
/// empty contribution is the registry's call, not the client's.
#[async_trait]
pub trait EmoteSource: Send + Sync {
    /// Fetch every raw record of one emote set.
    async fn fetch_set(&self, set_id: &str) -> Result<Vec<RawEmote>, UpstreamError>;

    /// Fetch the rendered image bytes for one emote.
    async fn fetch_image(
        &self,
        emote_id: &str,
        size: ImageSize,
        format: ImageFormat,
    ) -> Result<Bytes, UpstreamError>;
}

/// Client against the 7TV HTTP API and CDN.
pub struct SevenTvClient {
    http: reqwest::Client,
    api_base: String,
    cdn_base: String,
}

impl SevenTvClient {
    /// Build a client with a per-request timeout.
    pub fn new(api_base: &str, cdn_base: &str, timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("emoterelay/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            api_base: api_base.to_string(),
            cdn_base: cdn_base.to_string(),
        })
    }

    fn set_url(&self, set_id: &str) -> String {
        format!("{}/emote-sets/{}", self.api_base, set_id)
    }

    /// Single GET with a success-status check.
    async fn get(&self, url: &str) -> Result<reqwest::Response, UpstreamError> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|source| UpstreamError::Request {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Status {
                url: url.to_string(),
                status,
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl EmoteSource for SevenTvClient {
    async fn fetch_set(&self, set_id: &str) -> Result<Vec<RawEmote>, UpstreamError> {
        let url = self.set_url(set_id);

        let set: RawEmoteSet =
            self.get(&url)
                .await?
                .json()
                .await
                .map_err(|source| UpstreamError::Decode {
                    url: url.clone(),
                    source,
                })?;

        debug!("Fetched {} emotes from set {} ('{}')", set.emotes.len(), set_id, set.name);
        Ok(set.emotes)
    }

    async fn fetch_image(
        &self,
        emote_id: &str,
        size: ImageSize,
        format: ImageFormat,
    ) -> Result<Bytes, UpstreamError> {
        let url = image_url(&self.cdn_base, emote_id, size, format);

        let bytes = self
            .get(&url)
            .await?
            .bytes()
            .await
            .map_err(|source| UpstreamError::Request {
                url: url.clone(),
                source,
            })?;

        debug!("Fetched {} image bytes for emote {}", bytes.len(), emote_id);
        Ok(bytes)
    }
}
