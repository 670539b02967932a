//! Configuration module for the emote relay.
//!
//! Loads configuration from environment variables. Every variable is
//! optional; unset ones fall back to defaults that talk to the public
//! 7TV API.

use std::env;
use std::time::Duration;

use url::Url;

/// Default 7TV REST API base.
pub const DEFAULT_API_BASE: &str = "https://7tv.io/v3";
/// Default 7TV CDN base for emote images.
pub const DEFAULT_CDN_BASE: &str = "https://cdn.7tv.app/emote";

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    // Upstream
    /// 7TV emote set ids to serve (comma-separated in `EMOTE_SETS`).
    /// May be empty; the registry then serves nothing and logs a warning.
    pub emote_sets: Vec<String>,
    /// REST API base, no trailing slash.
    pub api_base: String,
    /// CDN base for emote images, no trailing slash.
    pub cdn_base: String,
    /// Per-request timeout against the API and CDN.
    pub upstream_timeout: Duration,

    // Serving
    /// How long a cached name lookup stays valid.
    pub cache_ttl: Duration,
    pub bind_host: String,
    pub port: u16,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Panics
    /// Panics if a variable is set to a value that cannot be parsed or
    /// validated.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            emote_sets: parse_set_list(&env::var("EMOTE_SETS").unwrap_or_default()),
            api_base: parse_base_url(
                "SEVENTV_API_BASE",
                env::var("SEVENTV_API_BASE").ok(),
                DEFAULT_API_BASE,
            ),
            cdn_base: parse_base_url(
                "SEVENTV_CDN_BASE",
                env::var("SEVENTV_CDN_BASE").ok(),
                DEFAULT_CDN_BASE,
            ),
            upstream_timeout: parse_secs(
                "UPSTREAM_TIMEOUT_SECS",
                env::var("UPSTREAM_TIMEOUT_SECS").ok(),
                10,
            ),
            cache_ttl: parse_secs("CACHE_TTL_SECS", env::var("CACHE_TTL_SECS").ok(), 3600),
            bind_host: env::var("BIND_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parse_port(env::var("PORT").ok()),
        }
    }

    /// Address string for the HTTP listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_host, self.port)
    }
}

/// Parse a comma-separated id list, dropping empty entries.
fn parse_set_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse a whole number of seconds, falling back to `default_secs` when unset.
fn parse_secs(name: &str, raw: Option<String>, default_secs: u64) -> Duration {
    match raw {
        Some(value) => {
            let secs = value.trim().parse().unwrap_or_else(|_| {
                panic!("{} must be a whole number of seconds, got '{}'", name, value)
            });
            Duration::from_secs(secs)
        }
        None => Duration::from_secs(default_secs),
    }
}

fn parse_port(raw: Option<String>) -> u16 {
    match raw {
        Some(value) => value
            .trim()
            .parse()
            .unwrap_or_else(|_| panic!("PORT must be a port number, got '{}'", value)),
        None => 3000,
    }
}

/// Validate a base URL override and trim any trailing slash.
fn parse_base_url(name: &str, raw: Option<String>, default: &str) -> String {
    match raw {
        Some(value) => {
            let trimmed = value.trim().trim_end_matches('/').to_string();
            if let Err(err) = Url::parse(&trimmed) {
                panic!("{} is not a valid URL ({}): '{}'", name, err, value);
            }
            trimmed
        }
        None => default.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_list_trims_and_drops_empties() {
        assert_eq!(parse_set_list("a, b,,c "), ["a", "b", "c"]);
        assert_eq!(parse_set_list(""), Vec::<String>::new());
        assert_eq!(parse_set_list("  ,  "), Vec::<String>::new());
    }

    #[test]
    fn test_secs_defaults_when_unset() {
        assert_eq!(parse_secs("X", None, 3600), Duration::from_secs(3600));
    }

    #[test]
    fn test_secs_parses_override() {
        assert_eq!(
            parse_secs("X", Some("90".to_string()), 3600),
            Duration::from_secs(90)
        );
    }

    #[test]
    #[should_panic(expected = "whole number of seconds")]
    fn test_secs_rejects_junk() {
        parse_secs("CACHE_TTL_SECS", Some("soon".to_string()), 3600);
    }

    #[test]
    fn test_port_defaults_and_parses() {
        assert_eq!(parse_port(None), 3000);
        assert_eq!(parse_port(Some("8080".to_string())), 8080);
    }

    #[test]
    #[should_panic(expected = "port number")]
    fn test_port_rejects_junk() {
        parse_port(Some("eighty".to_string()));
    }

    #[test]
    fn test_base_url_defaults_when_unset() {
        assert_eq!(
            parse_base_url("SEVENTV_API_BASE", None, DEFAULT_API_BASE),
            "https://7tv.io/v3"
        );
    }

    #[test]
    fn test_base_url_trims_trailing_slash() {
        assert_eq!(
            parse_base_url(
                "SEVENTV_CDN_BASE",
                Some("https://cdn.example.com/emote/".to_string()),
                DEFAULT_CDN_BASE,
            ),
            "https://cdn.example.com/emote"
        );
    }

    #[test]
    #[should_panic(expected = "not a valid URL")]
    fn test_base_url_rejects_junk() {
        parse_base_url("SEVENTV_API_BASE", Some("not a url".to_string()), DEFAULT_API_BASE);
    }
}
