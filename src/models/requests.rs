//! Request validation for proxied catalog routes
//!
//! Query parameters are forwarded untouched; only the search term is required.

use std::collections::BTreeMap;

/// Name of the search term parameter
pub const SEARCH_PARAM: &str = "q";

// == Search Validation ==
/// Validates the query of a search request.
///
/// Returns an error message if validation fails, None if valid. A missing,
/// empty or whitespace-only `q` is rejected.
pub fn validate_search(query: &BTreeMap<String, String>) -> Option<String> {
    match query.get(SEARCH_PARAM) {
        Some(term) if !term.trim().is_empty() => None,
        _ => Some("Search query parameter 'q' is required".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_missing_term_rejected() {
        assert!(validate_search(&query(&[("limit", "10")])).is_some());
    }

    #[test]
    fn test_blank_term_rejected() {
        assert!(validate_search(&query(&[("q", "")])).is_some());
        assert!(validate_search(&query(&[("q", "   ")])).is_some());
    }

    #[test]
    fn test_valid_term_accepted() {
        assert!(validate_search(&query(&[("q", "phone"), ("limit", "5")])).is_none());
    }
}
