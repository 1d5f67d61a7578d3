//! Proxy Orchestrator
//!
//! Per-request flow: derive key, check cache, on miss call upstream and store
//! the successful payload.

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::cache::{RequestDescriptor, SharedCache};
use crate::config::{Config, TtlTable};
use crate::error::{ProxyError, Result};
use crate::models::ProxyEnvelope;
use crate::upstream::UpstreamClient;

use super::Endpoint;

// == Proxy Orchestrator ==
/// Ties the cache store to the upstream client.
///
/// Cloning is cheap: the store is shared and the HTTP client pools connections.
#[derive(Debug, Clone)]
pub struct ProxyOrchestrator {
    cache: SharedCache,
    upstream: UpstreamClient,
    collection: String,
    ttl: TtlTable,
}

impl ProxyOrchestrator {
    // == Constructor ==
    pub fn new(
        cache: SharedCache,
        upstream: UpstreamClient,
        collection: impl Into<String>,
        ttl: TtlTable,
    ) -> Self {
        Self {
            cache,
            upstream,
            collection: collection.into(),
            ttl,
        }
    }

    /// Builds the upstream client from configuration and wires it to `cache`.
    pub fn from_config(config: &Config, cache: SharedCache) -> anyhow::Result<Self> {
        let upstream = UpstreamClient::new(
            &config.upstream_base_url,
            config.upstream_timeout(),
            &config.user_agent,
        )?;
        Ok(Self::new(
            cache,
            upstream,
            config.upstream_collection.clone(),
            config.ttl.clone(),
        ))
    }

    /// The store this orchestrator reads and populates.
    pub fn cache(&self) -> &SharedCache {
        &self.cache
    }

    // == Handle ==
    /// Serves one proxied request.
    ///
    /// A hit never touches upstream. A miss fetches upstream and caches the
    /// body only on success; failures are returned and nothing is stored.
    pub async fn handle(
        &self,
        endpoint: Endpoint,
        query: BTreeMap<String, String>,
    ) -> Result<ProxyEnvelope> {
        let descriptor = RequestDescriptor::new(endpoint.inbound_path(), query);
        let cache_key = descriptor.cache_key();

        let cached = self.cache.write().await.get(&cache_key);
        if let Some(payload) = cached {
            return Ok(ProxyEnvelope::hit(payload, cache_key));
        }

        // Detached so a disconnecting client cannot cancel the fetch; the
        // result still lands in the cache for later requests.
        let this = self.clone();
        let key = cache_key.clone();
        let payload = tokio::spawn(async move {
            this.fetch_and_store(&endpoint, &descriptor, key).await
        })
        .await
        .map_err(|err| ProxyError::Internal(format!("upstream task failed: {}", err)))??;

        Ok(ProxyEnvelope::miss(payload, cache_key))
    }

    async fn fetch_and_store(
        &self,
        endpoint: &Endpoint,
        descriptor: &RequestDescriptor,
        cache_key: String,
    ) -> Result<Value> {
        let segments = endpoint.upstream_segments(&self.collection);
        let resource = format!("/{}", segments.join("/"));

        let payload = self
            .upstream
            .fetch(&segments, &descriptor.query)
            .await
            .into_result(&resource)?;

        debug!("Caching upstream payload for {}", cache_key);
        self.cache
            .write()
            .await
            .set(cache_key, payload.clone(), endpoint.ttl(&self.ttl));
        Ok(payload)
    }

    // == Warm ==
    /// Prefetches the group list and the first listing page.
    ///
    /// Returns how many resources were cached; failures are logged and skipped.
    pub async fn warm(&self) -> usize {
        let first_page = BTreeMap::from([
            ("limit".to_string(), "20".to_string()),
            ("skip".to_string(), "0".to_string()),
        ]);
        let targets = [
            (Endpoint::Groups, BTreeMap::new()),
            (Endpoint::Listing, first_page),
        ];

        let mut warmed = 0;
        for (endpoint, query) in targets {
            let descriptor = RequestDescriptor::new(endpoint.inbound_path(), query);
            let key = descriptor.cache_key();
            match self.fetch_and_store(&endpoint, &descriptor, key.clone()).await {
                Ok(_) => warmed += 1,
                Err(err) => warn!("Cache warming failed for {}: {}", key, err),
            }
        }

        info!("Cache warmed: {} resources prefetched", warmed);
        warmed
    }
}
