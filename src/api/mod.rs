//! API Module
//!
//! HTTP handlers and routing for the catalog proxy.
//!
//! # Endpoints
//! - `GET /collection`, `/collection/search`, `/collection/groups`,
//!   `/collection/groups/:name`, `/collection/:id` - Cached upstream reads
//! - `GET /health` - Health check endpoint
//! - `GET /cache/stats` - Cache statistics
//! - `POST /cache/clear` - Drop all entries
//! - `DELETE /cache/:key` - Invalidate one entry

pub mod admin;
pub mod handlers;
pub mod routes;

pub use admin::*;
pub use handlers::*;
pub use routes::create_router;
