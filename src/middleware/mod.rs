//! Middleware Module
//!
//! Request filters applied in front of the proxied routes.

pub mod rate_limit;

pub use rate_limit::{rate_limit, RateLimiter};
