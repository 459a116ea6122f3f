use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::api::ApiError;

/// Newtype wrapping a request ID string, stored as a request extension.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

#[derive(Debug, Clone)]
struct RateLimitWindow {
    started_at: Instant,
    count: usize,
}

/// Fixed-window limiter shared by the form submission routes.
#[derive(Debug, Clone)]
pub struct RateLimitState {
    max_requests: usize,
    window: Duration,
    state: Arc<Mutex<RateLimitWindow>>,
}

impl RateLimitState {
    #[must_use]
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            state: Arc::new(Mutex::new(RateLimitWindow {
                started_at: Instant::now(),
                count: 0,
            })),
        }
    }

    #[must_use]
    pub fn per_minute(max_requests: usize) -> Self {
        Self::new(max_requests, Duration::from_secs(60))
    }
}

/// Axum middleware that extracts or generates a request ID.
///
/// If the incoming request has an `x-request-id` header, that value is used.
/// Otherwise a new `UUIDv4` is generated. The ID is:
/// - Inserted into request extensions as [`RequestId`]
/// - Set on the response as the `x-request-id` header
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = req
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.trim().is_empty())
        .map_or_else(|| Uuid::new_v4().to_string(), String::from);

    req.extensions_mut().insert(RequestId(id.clone()));

    let mut res = next.run(req).await;

    if let Ok(val) = HeaderValue::from_str(&id) {
        res.headers_mut().insert("x-request-id", val);
    }

    res
}

/// Middleware enforcing a fixed request-per-window limit. Must run inside
/// [`request_id`] so rejections carry the request id.
pub async fn enforce_rate_limit(
    State(rate_limit): State<RateLimitState>,
    req: Request,
    next: Next,
) -> Response {
    let mut window = rate_limit.state.lock().await;
    let elapsed = window.started_at.elapsed();

    if elapsed >= rate_limit.window {
        window.started_at = Instant::now();
        window.count = 0;
    }

    if window.count >= rate_limit.max_requests {
        let retry_after = rate_limit
            .window
            .saturating_sub(window.started_at.elapsed())
            .as_secs()
            .max(1);
        drop(window);
        tracing::warn!(path = %req.uri().path(), retry_after, "form rate limit exceeded");

        let req_id = req
            .extensions()
            .get::<RequestId>()
            .map(|id| id.0.clone())
            .unwrap_or_default();
        let mut res = ApiError::new(
            req_id,
            "rate_limited",
            "too many submissions; please wait a minute and try again",
        )
        .into_response();
        res.headers_mut()
            .insert(header::RETRY_AFTER, HeaderValue::from(retry_after));
        return res;
    }

    window.count += 1;
    drop(window);

    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::StatusCode, routing::post, Router};
    use tower::ServiceExt;

    fn limited_router(rate_limit: RateLimitState) -> Router {
        Router::new()
            .route("/submit", post(|| async { "ok" }))
            .layer(axum::middleware::from_fn_with_state(
                rate_limit,
                enforce_rate_limit,
            ))
            .layer(axum::middleware::from_fn(request_id))
    }

    fn submit() -> Request {
        Request::builder()
            .method("POST")
            .uri("/submit")
            .body(Body::empty())
            .expect("request")
    }

    #[tokio::test]
    async fn requests_past_the_limit_are_rejected() {
        let app = limited_router(RateLimitState::per_minute(2));

        for _ in 0..2 {
            let response = app.clone().oneshot(submit()).await.expect("response");
            assert_eq!(response.status(), StatusCode::OK);
        }
        let response = app.oneshot(submit()).await.expect("response");
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        let retry_after: u64 = response
            .headers()
            .get(header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok())
            .expect("retry-after");
        assert!((1..=60).contains(&retry_after));
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn window_resets_after_it_elapses() {
        let app = limited_router(RateLimitState::new(1, Duration::ZERO));

        for _ in 0..3 {
            let response = app.clone().oneshot(submit()).await.expect("response");
            assert_eq!(response.status(), StatusCode::OK);
        }
    }

    #[tokio::test]
    async fn request_id_is_echoed_or_generated() {
        let app = limited_router(RateLimitState::per_minute(10));

        let mut req = submit();
        req.headers_mut()
            .insert("x-request-id", HeaderValue::from_static("req-42"));
        let response = app.clone().oneshot(req).await.expect("response");
        assert_eq!(
            response.headers().get("x-request-id").and_then(|v| v.to_str().ok()),
            Some("req-42")
        );

        let response = app.oneshot(submit()).await.expect("response");
        let generated = response
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .expect("generated id");
        assert!(Uuid::parse_str(generated).is_ok());
    }
}
