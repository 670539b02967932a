//! Emote domain: upstream fetching, normalization, and the registry.
//!
//! Data flows in one direction: the [`upstream`] client pulls raw 7TV
//! records, [`normalize`] turns them into clean [`Emote`] values (or drops
//! them), and the [`EmoteRegistry`] merges every configured set into one
//! list that the HTTP surface reads. [`image`] builds CDN paths and proxies
//! the actual bytes.

pub mod image;
pub mod model;
pub mod normalize;
pub mod registry;
pub mod upstream;

pub use image::{ImageFormat, ImageResolver, ImageSize};
pub use model::Emote;
pub use registry::{EmoteRegistry, RegistryStats};
pub use upstream::{EmoteSource, SevenTvClient, UpstreamError};
