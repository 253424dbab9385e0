use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::Router;
use axum::body::Body;
use axum::extract::{ConnectInfo, DefaultBodyLimit, State};
use axum::http::{Request, StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use subtle::ConstantTimeEq;
use tokio::sync::Mutex;
use tower_http::limit::RequestBodyLimitLayer;

use super::handlers::{
    ask_handler, create_session_handler, delete_session_handler, document_handler,
    health_handler,
};
use super::server::AppState;

const MAX_TRACKED_CLIENTS: usize = 10_000;
const RATE_WINDOW: Duration = Duration::from_secs(60);

/// Fixed-window request counter per client IP.
#[derive(Clone)]
struct RateLimiter {
    per_window: u32,
    windows: Arc<Mutex<HashMap<IpAddr, (u32, Instant)>>>,
}

impl RateLimiter {
    fn new(per_window: u32) -> Self {
        Self {
            per_window,
            windows: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Count one request from `ip`; `false` once the window's budget is spent.
    async fn admit(&self, ip: IpAddr, now: Instant) -> bool {
        if self.per_window == 0 {
            return true;
        }
        let mut windows = self.windows.lock().await;
        if windows.len() >= MAX_TRACKED_CLIENTS && !windows.contains_key(&ip) {
            windows.retain(|_, (_, started)| now.duration_since(*started) < RATE_WINDOW);
        }

        let (count, started) = windows.entry(ip).or_insert((0, now));
        if now.duration_since(*started) >= RATE_WINDOW {
            *count = 0;
            *started = now;
        }
        *count += 1;
        *count <= self.per_window
    }
}

/// Compare a presented bearer token with the expected one via fixed-length
/// digests.
fn bearer_matches(expected: &str, authorization: Option<&str>) -> bool {
    let presented = authorization
        .and_then(|v| v.strip_prefix("Bearer "))
        .unwrap_or_default();
    let presented = blake3::hash(presented.as_bytes());
    let expected = blake3::hash(expected.as_bytes());
    presented.as_bytes().ct_eq(expected.as_bytes()).into()
}

pub(crate) fn build_router(
    state: AppState,
    auth_token: Option<String>,
    rate_limit: u32,
    max_body_size: usize,
) -> Router {
    let auth_token: Option<Arc<str>> = auth_token.map(Into::into);

    let protected = Router::new()
        .route("/sessions", post(create_session_handler))
        .route("/sessions/{id}", delete(delete_session_handler))
        .route("/sessions/{id}/document", post(document_handler))
        .route("/sessions/{id}/ask", post(ask_handler))
        .layer(middleware::from_fn_with_state(
            RateLimiter::new(rate_limit),
            rate_limit_middleware,
        ))
        .layer(middleware::from_fn_with_state(auth_token, auth_middleware))
        .layer(DefaultBodyLimit::max(max_body_size))
        .layer(RequestBodyLimitLayer::new(max_body_size));

    Router::new()
        .route("/health", get(health_handler))
        .merge(protected)
        .with_state(state)
}

async fn auth_middleware(
    State(token): State<Option<Arc<str>>>,
    req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(expected) = token.as_deref() {
        let authorization = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok());
        if !bearer_matches(expected, authorization) {
            return StatusCode::UNAUTHORIZED.into_response();
        }
    }
    next.run(req).await
}

async fn rate_limit_middleware(
    State(limiter): State<RateLimiter>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let ip = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED), |ci| ci.0.ip());

    if !limiter.admit(ip, Instant::now()).await {
        tracing::debug!(%ip, "rate limit exceeded");
        return StatusCode::TOO_MANY_REQUESTS.into_response();
    }
    next.run(req).await
}
