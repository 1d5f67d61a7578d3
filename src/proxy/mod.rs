//! Proxy Module
//!
//! Request orchestration between the inbound routes, the cache and the upstream API.

mod endpoint;
mod orchestrator;

pub use endpoint::{Endpoint, COLLECTION_PREFIX};
pub use orchestrator::ProxyOrchestrator;
