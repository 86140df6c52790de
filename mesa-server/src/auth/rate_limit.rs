//! Per-IP rate limiting for login and registration

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use dashmap::DashMap;
use tokio::time::Instant;

use crate::core::ServerState;
use crate::security_log;
use crate::{AppError, ErrorCode};

const WINDOW: Duration = Duration::from_secs(60);

struct IpEntry {
    count: u32,
    window_start: Instant,
}

/// Fixed one-minute window per (route, IP)
#[derive(Clone, Default)]
pub struct RateLimiter {
    entries: Arc<DashMap<(&'static str, String), IpEntry>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` if the request is allowed
    pub fn check(&self, route: &'static str, ip: &str, max_requests: u32) -> bool {
        let now = Instant::now();
        let mut entry = self
            .entries
            .entry((route, ip.to_owned()))
            .or_insert_with(|| IpEntry {
                count: 0,
                window_start: now,
            });

        if now.duration_since(entry.window_start) >= WINDOW {
            entry.count = 0;
            entry.window_start = now;
        }

        entry.count += 1;
        entry.count <= max_requests
    }

    /// Drop entries whose window expired
    pub fn cleanup(&self) {
        let now = Instant::now();
        self.entries
            .retain(|_, entry| now.duration_since(entry.window_start) < WINDOW);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Client IP: first `X-Forwarded-For` entry, then the peer address
pub fn extract_ip(request: &Request) -> String {
    if let Some(forwarded) = request.headers().get("x-forwarded-for")
        && let Ok(val) = forwarded.to_str()
        && let Some(first) = val.split(',').next()
    {
        let ip = first.trim();
        if !ip.is_empty() {
            return ip.to_owned();
        }
    }

    request
        .extensions()
        .get::<axum::extract::ConnectInfo<std::net::SocketAddr>>()
        .map(|ci| ci.0.ip().to_string())
        .unwrap_or_else(|| "unknown".to_owned())
}

async fn limit(
    state: &ServerState,
    route: &'static str,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let ip = extract_ip(&request);
    if !state
        .rate_limiter
        .check(route, &ip, state.config.auth_rate_limit_per_minute)
    {
        security_log!("WARN", "rate_limited", route = route, ip = ip);
        return Err(AppError::new(ErrorCode::TooManyRequests));
    }
    Ok(next.run(request).await)
}

/// Rate limit for `POST /api/auth/login`
pub async fn login_rate_limit(
    State(state): State<ServerState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    limit(&state, "login", request, next).await
}

/// Rate limit for `POST /api/auth/register`
pub async fn register_rate_limit(
    State(state): State<ServerState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    limit(&state, "register", request, next).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocks_after_limit() {
        let limiter = RateLimiter::new();
        for _ in 0..3 {
            assert!(limiter.check("login", "10.0.0.1", 3));
        }
        assert!(!limiter.check("login", "10.0.0.1", 3));
        // other IPs and routes have their own windows
        assert!(limiter.check("login", "10.0.0.2", 3));
        assert!(limiter.check("register", "10.0.0.1", 3));
        assert_eq!(limiter.len(), 3);
    }

    #[test]
    fn forwarded_for_takes_first_hop() {
        let req = Request::builder()
            .header("x-forwarded-for", "203.0.113.7, 10.0.0.1")
            .body(axum::body::Body::empty())
            .unwrap();
        assert_eq!(extract_ip(&req), "203.0.113.7");

        let req = Request::builder().body(axum::body::Body::empty()).unwrap();
        assert_eq!(extract_ip(&req), "unknown");
    }
}
