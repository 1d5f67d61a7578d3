//! Per-client rate limiting
//!
//! Keyed GCRA limiter per client address. Requests beyond the quota get the
//! `rate_limited` envelope without touching the cache or upstream.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use governor::{
    clock::{Clock, DefaultClock},
    DefaultKeyedRateLimiter, Quota,
};
use tracing::warn;

use crate::error::ProxyError;

// == Rate Limiter ==
/// At most `max_requests` per client in a burst, refilled evenly over `window`.
pub struct RateLimiter {
    limiter: DefaultKeyedRateLimiter<IpAddr>,
    clock: DefaultClock,
}

impl RateLimiter {
    // == Constructor ==
    /// Zero values are clamped to one request and one second.
    pub fn new(max_requests: usize, window: Duration) -> Self {
        let burst = NonZeroU32::new(u32::try_from(max_requests).unwrap_or(u32::MAX))
            .unwrap_or(NonZeroU32::MIN);
        let period = window / burst.get();
        let quota = Quota::with_period(period)
            .unwrap_or_else(|| Quota::per_second(burst))
            .allow_burst(burst);

        Self {
            limiter: DefaultKeyedRateLimiter::keyed(quota),
            clock: DefaultClock::default(),
        }
    }

    // == Check ==
    /// Records a request from `client`, or returns how long it must wait.
    ///
    /// Rejected requests consume nothing from the quota.
    pub fn check(&self, client: IpAddr) -> Result<(), Duration> {
        self.limiter
            .check_key(&client)
            .map_err(|not_until| not_until.wait_time_from(self.clock.now()))
    }

    // == Prune ==
    /// Forgets clients whose quota has fully refilled. Returns how many were dropped.
    pub fn prune(&self) -> usize {
        let before = self.limiter.len();
        self.limiter.retain_recent();
        before.saturating_sub(self.limiter.len())
    }

    /// Number of clients currently tracked.
    pub fn tracked_clients(&self) -> usize {
        self.limiter.len()
    }
}

// == Middleware ==
/// axum middleware enforcing the limiter on the wrapped routes.
///
/// The client is identified by its socket address; requests served without
/// connection info share one bucket.
pub async fn rate_limit(
    State(limiter): State<Arc<RateLimiter>>,
    request: Request,
    next: Next,
) -> Result<Response, ProxyError> {
    let client = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));

    if let Err(wait) = limiter.check(client) {
        warn!("Rate limit exceeded for {}", client);
        return Err(ProxyError::RateLimited {
            retry_after_secs: retry_after_secs(wait),
        });
    }

    Ok(next.run(request).await)
}

/// Whole seconds to wait, rounded up and never zero.
fn retry_after_secs(wait: Duration) -> u64 {
    let secs = wait.as_secs() + u64::from(wait.subsec_nanos() > 0);
    secs.max(1)
}
