//! Configuration Module
//!
//! Handles loading and managing proxy configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Default upstream catalog API
pub const DEFAULT_UPSTREAM_BASE_URL: &str = "https://dummyjson.com";

// == TTL Table ==
/// Cache lifetime per endpoint class, in seconds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TtlTable {
    /// `GET /collection`
    pub listing: u64,
    /// `GET /collection/search`
    pub search: u64,
    /// `GET /collection/groups`
    pub groups: u64,
    /// `GET /collection/groups/:name`
    pub group_listing: u64,
    /// `GET /collection/:id`
    pub item: u64,
}

impl Default for TtlTable {
    fn default() -> Self {
        Self {
            listing: 5 * 60,
            search: 2 * 60,
            groups: 30 * 60,
            group_listing: 10 * 60,
            item: 10 * 60,
        }
    }
}

impl TtlTable {
    /// Loads the table from environment variables, falling back per field.
    ///
    /// # Environment Variables
    /// - `LISTING_TTL`, `SEARCH_TTL`, `GROUPS_TTL`, `GROUP_LISTING_TTL`, `ITEM_TTL`
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            listing: env_or("LISTING_TTL", defaults.listing),
            search: env_or("SEARCH_TTL", defaults.search),
            groups: env_or("GROUPS_TTL", defaults.groups),
            group_listing: env_or("GROUP_LISTING_TTL", defaults.group_listing),
            item: env_or("ITEM_TTL", defaults.item),
        }
    }
}

/// Proxy configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Root URL of the upstream catalog API
    pub upstream_base_url: String,
    /// Upstream collection path segment, e.g. `products`
    pub upstream_collection: String,
    /// Upstream request timeout in seconds
    pub upstream_timeout: u64,
    /// User-Agent sent upstream
    pub user_agent: String,
    /// Background sweep interval in seconds
    pub cleanup_interval: u64,
    /// Cache lifetimes per endpoint class
    pub ttl: TtlTable,
    /// Requests allowed per client within one window
    pub rate_limit_max: usize,
    /// Rolling rate limit window in seconds
    pub rate_limit_window: u64,
    /// Allowed CORS origins; empty allows any
    pub cors_origins: Vec<String>,
    /// Prefetch frequently used resources at startup
    pub warm_cache: bool,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 5000)
    /// - `UPSTREAM_BASE_URL` - catalog API root (default: https://dummyjson.com)
    /// - `UPSTREAM_COLLECTION` - upstream collection segment (default: products)
    /// - `UPSTREAM_TIMEOUT_SECS` - upstream timeout (default: 10)
    /// - `UPSTREAM_USER_AGENT` - identifying User-Agent
    /// - `CLEANUP_INTERVAL` - sweep frequency in seconds (default: 300)
    /// - `RATE_LIMIT_MAX` - requests per window (default: 100)
    /// - `RATE_LIMIT_WINDOW_SECS` - window length (default: 900)
    /// - `CORS_ORIGINS` - comma-separated origins (default: any)
    /// - `WARM_CACHE` - prefetch at startup (default: false)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: env_or("SERVER_PORT", defaults.server_port),
            upstream_base_url: env::var("UPSTREAM_BASE_URL")
                .unwrap_or(defaults.upstream_base_url),
            upstream_collection: env::var("UPSTREAM_COLLECTION")
                .unwrap_or(defaults.upstream_collection),
            upstream_timeout: env_or("UPSTREAM_TIMEOUT_SECS", defaults.upstream_timeout),
            user_agent: env::var("UPSTREAM_USER_AGENT").unwrap_or(defaults.user_agent),
            cleanup_interval: env_positive("CLEANUP_INTERVAL", defaults.cleanup_interval),
            ttl: TtlTable::from_env(),
            rate_limit_max: env_or("RATE_LIMIT_MAX", defaults.rate_limit_max),
            rate_limit_window: env_or("RATE_LIMIT_WINDOW_SECS", defaults.rate_limit_window),
            cors_origins: env::var("CORS_ORIGINS")
                .map(|v| parse_list(&v))
                .unwrap_or_default(),
            warm_cache: env_or("WARM_CACHE", defaults.warm_cache),
        }
    }

    /// Upstream timeout as a Duration.
    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout)
    }

    /// Rate limit window as a Duration.
    pub fn rate_limit_window(&self) -> Duration {
        Duration::from_secs(self.rate_limit_window)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 5000,
            upstream_base_url: DEFAULT_UPSTREAM_BASE_URL.to_string(),
            upstream_collection: "products".to_string(),
            upstream_timeout: 10,
            user_agent: format!("catalog-proxy/{}", env!("CARGO_PKG_VERSION")),
            cleanup_interval: 5 * 60,
            ttl: TtlTable::default(),
            rate_limit_max: 100,
            rate_limit_window: 15 * 60,
            cors_origins: Vec::new(),
            warm_cache: false,
        }
    }
}

/// Reads and parses an environment variable, keeping `default` when unset or invalid.
fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Like [`env_or`], but zero also keeps `default`.
fn env_positive(name: &str, default: u64) -> u64 {
    match env_or(name, default) {
        0 => default,
        value => value,
    }
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
