//! Canonical emote representation.

use std::collections::HashSet;

/// Owner recorded when the upstream record names no uploader.
pub const UNKNOWN_OWNER: &str = "unknown";

/// A single named emote as known to this process.
///
/// Values are immutable once built: a refresh produces new instances rather
/// than mutating loaded ones. The normalizer guarantees `id` and `name` are
/// non-empty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Emote {
    /// Opaque identifier assigned by the upstream service; used to build
    /// CDN image URLs.
    pub id: String,
    /// Display name and public lookup key. Not unique across sets; the
    /// later set wins on collision during a load.
    pub name: String,
    /// Display name of the uploading account, or [`UNKNOWN_OWNER`].
    pub owner: String,
    /// Free-text labels, unordered. Left out of list responses.
    pub tags: HashSet<String>,
    /// Whether upstream reports the emote as animated.
    pub animated: bool,
    /// Upstream-reported MIME type, informational only; image format
    /// selection is caller-driven.
    pub mime: Option<String>,
}
