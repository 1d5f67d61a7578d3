//! Cache Key Module
//!
//! Derives the canonical cache key for an inbound request.

use std::collections::BTreeMap;

use url::form_urlencoded;

// == Request Descriptor ==
/// Identity of an inbound proxied request: resource path plus query parameters.
///
/// Parameters live in a `BTreeMap`, so iteration is always sorted by name no
/// matter in which order the client sent them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestDescriptor {
    /// Inbound resource path, e.g. `/collection/groups`
    pub path: String,
    /// Query parameters, unique by name
    pub query: BTreeMap<String, String>,
}

impl RequestDescriptor {
    // == Constructor ==
    /// Creates a descriptor for `path` with the given query parameters.
    pub fn new(path: impl Into<String>, query: BTreeMap<String, String>) -> Self {
        Self {
            path: path.into(),
            query,
        }
    }

    // == Cache Key ==
    /// Returns the canonical cache key for this request.
    pub fn cache_key(&self) -> String {
        derive_key(&self.path, &self.query)
    }
}

// == Derive Key ==
/// Builds `path?name=value&name=value` with parameters sorted by name.
///
/// Names and values are form-urlencoded, so a value holding `&` or `=` can never
/// render like a different parameter set. An empty query yields the bare path.
pub fn derive_key(path: &str, query: &BTreeMap<String, String>) -> String {
    if query.is_empty() {
        return path.to_string();
    }

    let query_string = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(query.iter())
        .finish();

    format!("{}?{}", path, query_string)
}
