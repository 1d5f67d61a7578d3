//! Response DTOs for the catalog proxy
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::cache::CacheStats;
use crate::error::ErrorKind;

/// Envelope key holding non-object payloads
pub const DATA_FIELD: &str = "data";
/// Envelope metadata key: whether the payload came from the cache
pub const CACHED_FIELD: &str = "_cached";
/// Envelope metadata key: the resolved cache key
pub const CACHE_KEY_FIELD: &str = "_cache_key";
/// Envelope metadata key: fetch time in ms since the Unix epoch (fresh fetches only)
pub const TIMESTAMP_FIELD: &str = "_timestamp";

// == Proxy Envelope ==
/// Upstream payload plus cache metadata, as returned for every proxied request.
///
/// Object payloads are flattened so the metadata sits beside the upstream
/// fields; anything else is nested under `data`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProxyEnvelope {
    #[serde(flatten)]
    pub payload: Map<String, Value>,
    #[serde(rename = "_cached")]
    pub cached: bool,
    #[serde(rename = "_cache_key")]
    pub cache_key: String,
    #[serde(rename = "_timestamp", skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl ProxyEnvelope {
    /// Envelope for a payload served from the cache.
    pub fn hit(payload: Value, cache_key: impl Into<String>) -> Self {
        Self::build(payload, true, cache_key.into(), None)
    }

    /// Envelope for a payload just fetched from upstream.
    pub fn miss(payload: Value, cache_key: impl Into<String>) -> Self {
        let now = chrono::Utc::now().timestamp_millis();
        Self::build(payload, false, cache_key.into(), Some(now))
    }

    fn build(payload: Value, cached: bool, cache_key: String, timestamp: Option<i64>) -> Self {
        let mut payload = match payload {
            Value::Object(map) => map,
            other => {
                let mut map = Map::new();
                map.insert(DATA_FIELD.to_string(), other);
                map
            }
        };
        // Upstream fields must not shadow the metadata.
        for field in [CACHED_FIELD, CACHE_KEY_FIELD, TIMESTAMP_FIELD] {
            payload.remove(field);
        }

        Self {
            payload,
            cached,
            cache_key,
            timestamp,
        }
    }
}

/// Response body for DELETE /cache/:key
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    /// Success message
    pub message: String,
    /// The key that was deleted
    pub key: String,
}

impl DeleteResponse {
    /// Creates a new DeleteResponse
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Cache entry '{}' deleted successfully", key),
            key,
        }
    }
}

/// Response body for POST /cache/clear
#[derive(Debug, Clone, Serialize)]
pub struct ClearResponse {
    /// Success message
    pub message: String,
    /// Number of entries dropped
    pub cleared: usize,
}

impl ClearResponse {
    /// Creates a new ClearResponse
    pub fn new(cleared: usize) -> Self {
        Self {
            message: "Cache cleared successfully".to_string(),
            cleared,
        }
    }
}

/// Process memory usage in megabytes, when the platform exposes it.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MemoryUsage {
    pub resident_mb: Option<f64>,
    pub virtual_mb: Option<f64>,
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
    /// Seconds since the server started
    pub uptime_seconds: f64,
    pub memory: MemoryUsage,
    pub cache: CacheStats,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy(uptime_seconds: f64, memory: MemoryUsage, cache: CacheStats) -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            uptime_seconds,
            memory,
            cache,
        }
    }
}

/// Error envelope for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error kind
    pub error: ErrorKind,
    /// Error message describing what went wrong
    pub message: String,
    /// Time the error was produced, RFC 3339
    pub timestamp: String,
    /// Upstream status, for upstream rejections
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    /// Seconds until the client may retry, for rate limiting
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after: Option<u64>,
}

impl ErrorResponse {
    /// Creates a new ErrorResponse
    pub fn new(error: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            error,
            message: message.into(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            status: None,
            retry_after: None,
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_retry_after(mut self, secs: u64) -> Self {
        self.retry_after = Some(secs);
        self
    }
}
