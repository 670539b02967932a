//! Validation and mapping of raw upstream records into [`Emote`]s.

use tracing::debug;

use super::model::{Emote, UNKNOWN_OWNER};
use super::upstream::RawEmote;

/// Map one raw upstream record into the canonical shape.
///
/// Returns `None` when the record has a missing or empty id or name; a
/// malformed record is dropped on its own, never fatal to the load that
/// carried it.
pub fn normalize(raw: RawEmote) -> Option<Emote> {
    if raw.id.trim().is_empty() || raw.name.trim().is_empty() {
        debug!("Dropping malformed emote record (id '{}', name '{}')", raw.id, raw.name);
        return None;
    }

    let owner = raw
        .owner
        .map(|o| o.username)
        .filter(|username| !username.is_empty())
        .unwrap_or_else(|| UNKNOWN_OWNER.to_string());

    let (animated, mime) = match raw.data {
        Some(data) => (data.animated, data.mime),
        None => (false, None),
    };

    Some(Emote {
        id: raw.id,
        name: raw.name,
        owner,
        tags: raw.tags.unwrap_or_default().into_iter().collect(),
        animated,
        mime,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emotes::upstream::{RawEmoteData, RawOwner};

    fn raw(id: &str, name: &str) -> RawEmote {
        RawEmote {
            id: id.to_string(),
            name: name.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_full_record_maps_every_field() {
        let emote = normalize(RawEmote {
            owner: Some(RawOwner {
                username: "dankuser".to_string(),
            }),
            tags: Some(vec!["pepe".to_string(), "dank".to_string()]),
            data: Some(RawEmoteData {
                animated: true,
                mime: Some("image/webp".to_string()),
            }),
            ..raw("e1", "FeelsDankMan")
        })
        .unwrap();

        assert_eq!(emote.id, "e1");
        assert_eq!(emote.name, "FeelsDankMan");
        assert_eq!(emote.owner, "dankuser");
        assert!(emote.animated);
        assert_eq!(emote.mime.as_deref(), Some("image/webp"));
        assert!(emote.tags.contains("pepe"));
        assert!(emote.tags.contains("dank"));
    }

    #[test]
    fn test_missing_id_or_name_is_dropped() {
        assert!(normalize(raw("", "HasName")).is_none());
        assert!(normalize(raw("e1", "")).is_none());
        assert!(normalize(raw("   ", "HasName")).is_none());
        assert!(normalize(raw("e1", "  \t")).is_none());
    }

    #[test]
    fn test_defaults_for_absent_blocks() {
        let emote = normalize(raw("e1", "Plain")).unwrap();

        assert_eq!(emote.owner, UNKNOWN_OWNER);
        assert!(!emote.animated);
        assert!(emote.mime.is_none());
        assert!(emote.tags.is_empty());
    }

    #[test]
    fn test_empty_owner_username_falls_back_to_sentinel() {
        let emote = normalize(RawEmote {
            owner: Some(RawOwner {
                username: String::new(),
            }),
            ..raw("e1", "Orphan")
        })
        .unwrap();

        assert_eq!(emote.owner, UNKNOWN_OWNER);
    }

    #[test]
    fn test_duplicate_tags_collapse() {
        let emote = normalize(RawEmote {
            tags: Some(vec!["a".to_string(), "a".to_string(), "b".to_string()]),
            ..raw("e1", "Tagged")
        })
        .unwrap();

        assert_eq!(emote.tags.len(), 2);
    }
}
