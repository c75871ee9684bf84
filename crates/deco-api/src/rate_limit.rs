//! Fixed-window request limits keyed by caller IP.

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use tokio::sync::RwLock;
use tracing::warn;

use crate::error::ApiError;

/// Windows are pruned once the table grows past this many callers.
const PRUNE_THRESHOLD: usize = 10_000;

#[derive(Debug, Clone, Copy)]
pub struct RateLimitConfig {
    pub max_requests: u32,
    pub window: Duration,
}

impl RateLimitConfig {
    pub fn per_minute(max_requests: u32) -> Self {
        Self {
            max_requests,
            window: Duration::from_secs(60),
        }
    }
}

#[derive(Debug)]
struct Window {
    count: u32,
    started: Instant,
}

/// One limiter per route. Cloning shares the window table.
#[derive(Clone)]
pub struct RateLimiter {
    config: RateLimitConfig,
    trust_proxy_headers: bool,
    windows: Arc<RwLock<HashMap<IpAddr, Window>>>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            trust_proxy_headers: false,
            windows: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Key callers by `X-Forwarded-For` / `X-Real-IP` instead of the socket
    /// peer. Only safe when every request arrives through a proxy that
    /// overwrites those headers.
    pub fn trusting_proxy_headers(mut self, trust: bool) -> Self {
        self.trust_proxy_headers = trust;
        self
    }

    /// Count a request from `ip`; false once the caller is over the limit.
    pub async fn check(&self, ip: IpAddr) -> bool {
        let now = Instant::now();
        let mut windows = self.windows.write().await;

        if windows.len() > PRUNE_THRESHOLD {
            let span = self.config.window;
            windows.retain(|_, w| now.duration_since(w.started) < span);
        }

        let entry = windows.entry(ip).or_insert(Window {
            count: 0,
            started: now,
        });

        if now.duration_since(entry.started) >= self.config.window {
            entry.count = 0;
            entry.started = now;
        }

        if entry.count < self.config.max_requests {
            entry.count += 1;
            true
        } else {
            false
        }
    }
}

/// Middleware for `axum::middleware::from_fn_with_state`.
pub async fn enforce(
    State(limiter): State<RateLimiter>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let ip = client_ip(&req, limiter.trust_proxy_headers);
    if !limiter.check(ip).await {
        warn!("Rate limit exceeded for {} on {}", ip, req.uri().path());
        return Err(ApiError::TooManyRequests);
    }
    Ok(next.run(req).await)
}

/// Caller address: the socket peer, falling back to loopback. With
/// `trust_proxy_headers`, the first `X-Forwarded-For` hop and then `X-Real-IP`
/// take precedence over the peer.
fn client_ip(req: &Request, trust_proxy_headers: bool) -> IpAddr {
    let header_ip = |name: &str| {
        req.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .and_then(|v| v.trim().parse::<IpAddr>().ok())
    };

    let forwarded = if trust_proxy_headers {
        header_ip("x-forwarded-for").or_else(|| header_ip("x-real-ip"))
    } else {
        None
    };

    forwarded
        .or_else(|| {
            req.extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip())
        })
        .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http;

    fn ip(last: u8) -> IpAddr {
        IpAddr::V4(Ipv4Addr::new(10, 0, 0, last))
    }

    #[tokio::test]
    async fn allows_up_to_limit_then_rejects() {
        let limiter = RateLimiter::new(RateLimitConfig::per_minute(3));
        for _ in 0..3 {
            assert!(limiter.check(ip(1)).await);
        }
        assert!(!limiter.check(ip(1)).await);
        assert!(!limiter.check(ip(1)).await);
    }

    #[tokio::test]
    async fn callers_are_counted_separately() {
        let limiter = RateLimiter::new(RateLimitConfig::per_minute(1));
        assert!(limiter.check(ip(1)).await);
        assert!(!limiter.check(ip(1)).await);
        assert!(limiter.check(ip(2)).await);
    }

    #[tokio::test]
    async fn window_expiry_restores_access() {
        let limiter = RateLimiter::new(RateLimitConfig {
            max_requests: 1,
            window: Duration::from_millis(50),
        });
        assert!(limiter.check(ip(1)).await);
        assert!(!limiter.check(ip(1)).await);

        tokio::time::sleep(Duration::from_millis(80)).await;
        assert!(limiter.check(ip(1)).await);
    }

    fn forwarded_request(peer: &str) -> Request {
        let mut req = http::Request::builder()
            .header("x-forwarded-for", "203.0.113.7, 10.0.0.1")
            .header("x-real-ip", "198.51.100.2")
            .body(Body::empty())
            .unwrap();
        let peer: SocketAddr = peer.parse().unwrap();
        req.extensions_mut().insert(ConnectInfo(peer));
        req
    }

    #[test]
    fn client_ip_ignores_proxy_headers_by_default() {
        let req = forwarded_request("192.0.2.9:4000");
        assert_eq!(client_ip(&req, false), "192.0.2.9".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn client_ip_uses_proxy_headers_when_trusted() {
        let req = forwarded_request("192.0.2.9:4000");
        assert_eq!(client_ip(&req, true), "203.0.113.7".parse::<IpAddr>().unwrap());

        let mut req = http::Request::builder()
            .header("x-real-ip", "198.51.100.2")
            .body(Body::empty())
            .unwrap();
        assert_eq!(client_ip(&req, true), "198.51.100.2".parse::<IpAddr>().unwrap());

        // unparseable headers fall through to the peer
        req.headers_mut().insert("x-real-ip", "not-an-ip".parse().unwrap());
        req.extensions_mut().insert(ConnectInfo("192.0.2.9:4000".parse::<SocketAddr>().unwrap()));
        assert_eq!(client_ip(&req, true), "192.0.2.9".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn client_ip_falls_back_to_peer_then_loopback() {
        let mut req = http::Request::builder().body(Body::empty()).unwrap();
        assert_eq!(client_ip(&req, false), IpAddr::V4(Ipv4Addr::LOCALHOST));

        let peer: SocketAddr = "192.0.2.9:4000".parse().unwrap();
        req.extensions_mut().insert(ConnectInfo(peer));
        assert_eq!(client_ip(&req, false), peer.ip());
    }
}
