//! Upstream Outcome
//!
//! Result of a single upstream call, before it is mapped to a client response.

use serde_json::Value;

use crate::error::ProxyError;

// == Upstream Outcome ==
/// Every way an upstream call can end. Only `Success` may be cached.
#[derive(Debug, Clone, PartialEq)]
pub enum UpstreamOutcome {
    /// 2xx with a decodable JSON body
    Success { status_code: u16, body: Value },
    /// No complete response within the fixed timeout
    Timeout,
    /// Non-success status; body is JSON when decodable, else the raw text
    UpstreamError { status_code: u16, body: Value },
    /// Connection, DNS or decoding failure
    TransportFailure { reason: String },
}

impl UpstreamOutcome {
    /// Returns true only for `Success`.
    pub fn is_success(&self) -> bool {
        matches!(self, UpstreamOutcome::Success { .. })
    }

    // == Into Result ==
    /// Splits the outcome into the cacheable body or a taxonomy error.
    ///
    /// `resource` names the upstream path in error messages.
    pub fn into_result(self, resource: &str) -> Result<Value, ProxyError> {
        match self {
            UpstreamOutcome::Success { body, .. } => Ok(body),
            UpstreamOutcome::Timeout => Err(ProxyError::UpstreamTimeout(resource.to_string())),
            UpstreamOutcome::UpstreamError { status_code: 404, body } => {
                Err(ProxyError::NotFound(error_message(&body).unwrap_or_else(|| {
                    format!("Resource '{}' not found", resource)
                })))
            }
            UpstreamOutcome::UpstreamError { status_code, body } => {
                Err(ProxyError::UpstreamRejection {
                    status: status_code,
                    message: error_message(&body)
                        .unwrap_or_else(|| "API request failed".to_string()),
                })
            }
            UpstreamOutcome::TransportFailure { reason } => {
                Err(ProxyError::TransportFailure(reason))
            }
        }
    }
}

/// Pulls a human readable message from an upstream error body.
fn error_message(body: &Value) -> Option<String> {
    match body {
        Value::Object(map) => map
            .get("message")
            .and_then(Value::as_str)
            .map(String::from),
        Value::String(text) if !text.trim().is_empty() => Some(text.trim().to_string()),
        _ => None,
    }
}
