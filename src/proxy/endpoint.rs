//! Proxied endpoints
//!
//! Maps each inbound catalog route to its upstream resource and TTL class.

use std::time::Duration;

use url::form_urlencoded;

use crate::config::TtlTable;

/// Inbound prefix of every proxied route
pub const COLLECTION_PREFIX: &str = "/collection";

/// Static segments under the prefix; an item id may not take these names.
pub const RESERVED_SEGMENTS: [&str; 2] = ["search", "groups"];

// == Endpoint ==
/// One proxied catalog route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// `GET /collection`
    Listing,
    /// `GET /collection/search`
    Search,
    /// `GET /collection/groups`
    Groups,
    /// `GET /collection/groups/:name`
    GroupListing(String),
    /// `GET /collection/:id`
    Item(String),
}

impl Endpoint {
    /// Item route for `id`, or `None` when the id names a static route.
    ///
    /// `/collection/%67roups` decodes to `groups` and would otherwise share the
    /// key of the group list.
    pub fn item(id: impl Into<String>) -> Option<Self> {
        let id = id.into();
        if RESERVED_SEGMENTS.contains(&id.as_str()) {
            return None;
        }
        Some(Endpoint::Item(id))
    }

    // == Inbound Path ==
    /// Canonical request path, used as the cache key prefix.
    ///
    /// Path parameters are percent-encoded, so the result never contains a
    /// `?` or an extra `/` taken from a decoded id or group name.
    pub fn inbound_path(&self) -> String {
        match self {
            Endpoint::Listing => COLLECTION_PREFIX.to_string(),
            Endpoint::Search => format!("{}/search", COLLECTION_PREFIX),
            Endpoint::Groups => format!("{}/groups", COLLECTION_PREFIX),
            Endpoint::GroupListing(name) => {
                format!("{}/groups/{}", COLLECTION_PREFIX, encode_segment(name))
            }
            Endpoint::Item(id) => format!("{}/{}", COLLECTION_PREFIX, encode_segment(id)),
        }
    }

    // == Upstream Segments ==
    /// Path segments of the upstream resource under `collection`.
    ///
    /// With `collection = "products"`: `/products`, `/products/search`,
    /// `/products/categories`, `/products/category/{name}`, `/products/{id}`.
    pub fn upstream_segments(&self, collection: &str) -> Vec<String> {
        let mut segments = vec![collection.to_string()];
        match self {
            Endpoint::Listing => {}
            Endpoint::Search => segments.push("search".to_string()),
            Endpoint::Groups => segments.push("categories".to_string()),
            Endpoint::GroupListing(name) => {
                segments.push("category".to_string());
                segments.push(name.clone());
            }
            Endpoint::Item(id) => segments.push(id.clone()),
        }
        segments
    }

    // == TTL ==
    /// Cache lifetime for this endpoint class.
    pub fn ttl(&self, table: &TtlTable) -> Duration {
        let secs = match self {
            Endpoint::Listing => table.listing,
            Endpoint::Search => table.search,
            Endpoint::Groups => table.groups,
            Endpoint::GroupListing(_) => table.group_listing,
            Endpoint::Item(_) => table.item,
        };
        Duration::from_secs(secs)
    }
}

/// Percent-encodes one path segment; spaces become `%20`.
fn encode_segment(segment: &str) -> String {
    // A literal `+` is emitted as `%2B`, so every `+` left here was a space.
    form_urlencoded::byte_serialize(segment.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inbound_paths() {
        assert_eq!(Endpoint::Listing.inbound_path(), "/collection");
        assert_eq!(Endpoint::Search.inbound_path(), "/collection/search");
        assert_eq!(Endpoint::Groups.inbound_path(), "/collection/groups");
        assert_eq!(
            Endpoint::GroupListing("laptops".into()).inbound_path(),
            "/collection/groups/laptops"
        );
        assert_eq!(Endpoint::Item("7".into()).inbound_path(), "/collection/7");
    }

    #[test]
    fn test_path_parameters_are_encoded() {
        assert_eq!(
            Endpoint::Item("1?limit=5".into()).inbound_path(),
            "/collection/1%3Flimit%3D5"
        );
        assert_eq!(
            Endpoint::Item("a&b".into()).inbound_path(),
            "/collection/a%26b"
        );
        assert_eq!(
            Endpoint::Item("groups/x".into()).inbound_path(),
            "/collection/groups%2Fx"
        );
        assert_eq!(
            Endpoint::GroupListing("smart phones".into()).inbound_path(),
            "/collection/groups/smart%20phones"
        );
        assert_eq!(
            Endpoint::GroupListing("a+b".into()).inbound_path(),
            "/collection/groups/a%2Bb"
        );
    }

    #[test]
    fn test_decoded_parameters_do_not_collide_with_other_routes() {
        use crate::cache::derive_key;
        use std::collections::BTreeMap;

        let query = BTreeMap::from([("limit".to_string(), "5".to_string())]);
        let encoded_id = derive_key(
            &Endpoint::Item("1?limit=5".into()).inbound_path(),
            &BTreeMap::new(),
        );
        let real_query = derive_key(&Endpoint::Item("1".into()).inbound_path(), &query);
        assert_ne!(encoded_id, real_query);

        assert_ne!(
            Endpoint::Item("groups/x".into()).inbound_path(),
            Endpoint::GroupListing("x".into()).inbound_path()
        );
        assert_ne!(
            Endpoint::GroupListing("a b".into()).inbound_path(),
            Endpoint::GroupListing("a+b".into()).inbound_path()
        );
    }

    #[test]
    fn test_reserved_item_ids_rejected() {
        assert!(Endpoint::item("groups").is_none());
        assert!(Endpoint::item("search").is_none());
        assert_eq!(Endpoint::item("7"), Some(Endpoint::Item("7".into())));
    }

    #[test]
    fn test_upstream_segments() {
        assert_eq!(Endpoint::Listing.upstream_segments("products"), vec!["products"]);
        assert_eq!(
            Endpoint::Groups.upstream_segments("products"),
            vec!["products", "categories"]
        );
        assert_eq!(
            Endpoint::GroupListing("laptops".into()).upstream_segments("products"),
            vec!["products", "category", "laptops"]
        );
        assert_eq!(
            Endpoint::Item("7".into()).upstream_segments("products"),
            vec!["products", "7"]
        );
    }

    #[test]
    fn test_ttl_classes() {
        let table = TtlTable::default();
        assert_eq!(Endpoint::Listing.ttl(&table), Duration::from_secs(300));
        assert_eq!(Endpoint::Search.ttl(&table), Duration::from_secs(120));
        assert_eq!(Endpoint::Groups.ttl(&table), Duration::from_secs(1800));
        assert_eq!(
            Endpoint::GroupListing("x".into()).ttl(&table),
            Duration::from_secs(600)
        );
        assert_eq!(Endpoint::Item("1".into()).ttl(&table), Duration::from_secs(600));
    }
}
