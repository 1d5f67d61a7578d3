//! Upstream Module
//!
//! HTTP access to the third-party catalog API and classification of its results.

mod client;
mod outcome;

pub use client::UpstreamClient;
pub use outcome::UpstreamOutcome;
