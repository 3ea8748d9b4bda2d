//! Rate limiting for check-in (per user) and staff unlock (per IP) routes

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use shared::error::AppError;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::Instant;

use super::UserIdentity;

struct BucketEntry {
    count: u32,
    window_start: Instant,
}

#[derive(Clone)]
pub struct RateLimiter {
    /// route name -> (bucket key -> entry)
    inner: Arc<Mutex<HashMap<&'static str, HashMap<String, BucketEntry>>>>,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

impl RateLimiter {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Returns `true` if the request is allowed, `false` if rate-limited.
    async fn check(
        &self,
        route: &'static str,
        key: &str,
        max_requests: u32,
        window_secs: u64,
    ) -> bool {
        let mut map = self.inner.lock().await;
        let route_map = map.entry(route).or_default();
        let now = Instant::now();

        let entry = route_map.entry(key.to_owned()).or_insert_with(|| BucketEntry {
            count: 0,
            window_start: now,
        });

        // Reset window if expired
        if now.duration_since(entry.window_start).as_secs() >= window_secs {
            entry.count = 0;
            entry.window_start = now;
        }

        entry.count += 1;
        entry.count <= max_requests
    }

    /// Remove entries older than 5 minutes
    pub async fn cleanup(&self) {
        let mut map = self.inner.lock().await;
        let cutoff = std::time::Duration::from_secs(300);
        let now = Instant::now();

        for route_map in map.values_mut() {
            route_map.retain(|_, entry| now.duration_since(entry.window_start) < cutoff);
        }

        // Remove empty route maps
        map.retain(|_, route_map| !route_map.is_empty());
    }
}

/// Extract client IP: peer address, or the first X-Forwarded-For entry
/// when running behind a trusted proxy.
fn extract_ip(request: &Request, trust_forwarded: bool) -> String {
    if trust_forwarded
        && let Some(forwarded) = request.headers().get("x-forwarded-for")
        && let Ok(val) = forwarded.to_str()
    {
        // X-Forwarded-For can be comma-separated; first entry is the original client
        if let Some(first) = val.split(',').next() {
            let ip = first.trim();
            if !ip.is_empty() {
                return ip.to_owned();
            }
        }
    }

    // Fallback: peer address from extensions (ConnectInfo)
    request
        .extensions()
        .get::<axum::extract::ConnectInfo<std::net::SocketAddr>>()
        .map(|ci| ci.0.ip().to_string())
        .unwrap_or_else(|| "unknown".to_owned())
}

/// Check-in attempts per user per window
const CHECKIN_LIMIT: u32 = 10;
/// Unlock link attempts per IP per window
const UNLOCK_LIMIT: u32 = 10;
const WINDOW_SECS: u64 = 60;

async fn limit(
    state: &crate::state::AppState,
    route: &'static str,
    key: String,
    max_requests: u32,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if !state
        .rate_limiter
        .check(route, &key, max_requests, WINDOW_SECS)
        .await
    {
        tracing::info!(route, key = %key, "Rate limited");
        return Err(AppError::rate_limited());
    }
    Ok(next.run(request).await)
}

/// Rate limit middleware for check-in: 10 requests/minute per user.
///
/// Runs inside `user_auth_middleware`, which supplies the identity.
pub async fn checkin_rate_limit(
    State(state): State<crate::state::AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let key = match request.extensions().get::<UserIdentity>() {
        Some(identity) => format!("user:{}", identity.user_id),
        None => format!("ip:{}", extract_ip(&request, state.trust_forwarded_for)),
    };
    limit(&state, "checkin", key, CHECKIN_LIMIT, request, next).await
}

/// Rate limit middleware for staff unlock: 10 requests/minute per IP
pub async fn unlock_rate_limit(
    State(state): State<crate::state::AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let key = extract_ip(&request, state.trust_forwarded_for);
    limit(&state, "unlock", key, UNLOCK_LIMIT, request, next).await
}
