//! Upstream Client
//!
//! Single outbound call to the catalog API with a fixed timeout and identifying
//! headers. No retries happen here.

use std::collections::BTreeMap;
use std::time::Duration;

use anyhow::{bail, Context};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::Client;
use serde_json::Value;
use tracing::{info, warn};
use url::Url;

use super::UpstreamOutcome;

// == Upstream Client ==
/// HTTP client for the catalog API. Cheap to clone; clones share one pool.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    http: Client,
    base_url: Url,
}

impl UpstreamClient {
    // == Constructor ==
    /// Builds a client rooted at `base_url`.
    ///
    /// Every request carries `user_agent` and `Accept: application/json` and is
    /// abandoned after `timeout`.
    pub fn new(base_url: &str, timeout: Duration, user_agent: &str) -> anyhow::Result<Self> {
        let base_url = Url::parse(base_url)
            .with_context(|| format!("invalid upstream base URL '{}'", base_url))?;
        if base_url.cannot_be_a_base() {
            bail!("upstream base URL '{}' cannot carry a path", base_url);
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .default_headers(headers)
            .build()
            .context("failed to build upstream HTTP client")?;

        Ok(Self { http, base_url })
    }

    // == Resolve ==
    /// Appends percent-encoded path segments to the base URL.
    pub fn resolve(&self, segments: &[String]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    // == Fetch ==
    /// Performs `GET {base_url}/{segments}?{query}` and classifies the result.
    ///
    /// Never fails: ordinary HTTP errors become `UpstreamError`, elapsed
    /// timeouts become `Timeout`, everything else is a `TransportFailure`.
    pub async fn fetch(
        &self,
        segments: &[String],
        query: &BTreeMap<String, String>,
    ) -> UpstreamOutcome {
        let url = self.resolve(segments);
        info!("Fetching upstream: {}", url);

        let response = match self.http.get(url.clone()).query(query).send().await {
            Ok(response) => response,
            Err(err) => return classify_error(&url, err),
        };

        let status = response.status();
        let bytes = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(err) => return classify_error(&url, err),
        };

        if status.is_success() {
            match serde_json::from_slice::<Value>(&bytes) {
                Ok(body) => UpstreamOutcome::Success {
                    status_code: status.as_u16(),
                    body,
                },
                Err(err) => {
                    warn!("Upstream returned malformed JSON from {}: {}", url, err);
                    UpstreamOutcome::TransportFailure {
                        reason: format!("malformed upstream payload: {}", err),
                    }
                }
            }
        } else {
            warn!("Upstream {} responded with {}", url, status);
            let body = serde_json::from_slice::<Value>(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
            UpstreamOutcome::UpstreamError {
                status_code: status.as_u16(),
                body,
            }
        }
    }
}

fn classify_error(url: &Url, err: reqwest::Error) -> UpstreamOutcome {
    if err.is_timeout() {
        warn!("Upstream request to {} timed out", url);
        UpstreamOutcome::Timeout
    } else {
        warn!("Upstream request to {} failed: {}", url, err);
        UpstreamOutcome::TransportFailure {
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer, timeout: Duration) -> UpstreamClient {
        UpstreamClient::new(&server.uri(), timeout, "catalog-proxy/test").unwrap()
    }

    fn segments(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|p| p.to_string()).collect()
    }

    fn no_query() -> BTreeMap<String, String> {
        BTreeMap::new()
    }

    #[tokio::test]
    async fn test_fetch_success_sends_identifying_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/products"))
            .and(query_param("limit", "10"))
            .and(header("user-agent", "catalog-proxy/test"))
            .and(header("accept", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"products": []})))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, Duration::from_secs(2));
        let query = BTreeMap::from([("limit".to_string(), "10".to_string())]);
        let outcome = client.fetch(&segments(&["products"]), &query).await;

        assert_eq!(
            outcome,
            UpstreamOutcome::Success {
                status_code: 200,
                body: json!({"products": []})
            }
        );
    }

    #[tokio::test]
    async fn test_fetch_error_status_is_not_a_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/products/999"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(json!({"message": "not found"})),
            )
            .mount(&server)
            .await;

        let outcome = client_for(&server, Duration::from_secs(2))
            .fetch(&segments(&["products", "999"]), &no_query())
            .await;

        assert_eq!(
            outcome,
            UpstreamOutcome::UpstreamError {
                status_code: 404,
                body: json!({"message": "not found"})
            }
        );
    }

    #[tokio::test]
    async fn test_fetch_plain_text_error_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&server)
            .await;

        let outcome = client_for(&server, Duration::from_secs(2))
            .fetch(&segments(&["products"]), &no_query())
            .await;

        assert_eq!(
            outcome,
            UpstreamOutcome::UpstreamError {
                status_code: 502,
                body: json!("bad gateway")
            }
        );
    }

    #[tokio::test]
    async fn test_fetch_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({}))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let outcome = client_for(&server, Duration::from_millis(100))
            .fetch(&segments(&["products"]), &no_query())
            .await;

        assert_eq!(outcome, UpstreamOutcome::Timeout);
    }

    #[tokio::test]
    async fn test_fetch_malformed_payload() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let outcome = client_for(&server, Duration::from_secs(2))
            .fetch(&segments(&["products"]), &no_query())
            .await;

        assert!(matches!(outcome, UpstreamOutcome::TransportFailure { .. }));
    }

    #[tokio::test]
    async fn test_fetch_connection_refused() {
        let client =
            UpstreamClient::new("http://127.0.0.1:1", Duration::from_secs(2), "test").unwrap();

        let outcome = client.fetch(&segments(&["products"]), &no_query()).await;

        assert!(matches!(outcome, UpstreamOutcome::TransportFailure { .. }));
    }

    #[test]
    fn test_resolve_encodes_segments() {
        let client =
            UpstreamClient::new("https://dummyjson.com/", Duration::from_secs(1), "test").unwrap();
        let url = client.resolve(&segments(&["products", "category", "home decoration"]));
        assert_eq!(
            url.as_str(),
            "https://dummyjson.com/products/category/home%20decoration"
        );
    }

    #[test]
    fn test_resolve_keeps_base_path() {
        let client =
            UpstreamClient::new("http://localhost:9000/api", Duration::from_secs(1), "test")
                .unwrap();
        let url = client.resolve(&segments(&["products", "1"]));
        assert_eq!(url.as_str(), "http://localhost:9000/api/products/1");
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        assert!(UpstreamClient::new("not a url", Duration::from_secs(1), "test").is_err());
    }
}
