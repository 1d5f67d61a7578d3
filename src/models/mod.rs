//! Request and Response models for the catalog proxy
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! validating requests and serializing HTTP response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{validate_search, SEARCH_PARAM};
pub use responses::{
    ClearResponse, DeleteResponse, ErrorResponse, HealthResponse, MemoryUsage, ProxyEnvelope,
};
