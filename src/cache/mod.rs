//! Cache module - TTL-bounded lookup caching.
//!
//! The registry's name index is an accelerator, not a source of truth, so
//! expiry is deliberately explicit: each entry stores its insertion time and
//! a read compares it against a fixed TTL. A miss (absent or expired) always
//! falls back to the authoritative emote list.

mod store;

pub use store::TtlCache;
