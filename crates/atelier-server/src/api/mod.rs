mod configurator;
mod enquiries;
mod rings;
mod stones;
mod uploads;

use std::sync::Arc;

use atelier_cms::{CmsClient, CmsError, ImageUrlBuilder};
use atelier_core::enquiry::MAX_ATTACHMENTS;
use atelier_core::{
    MailRouting, RingShape, SiteConfig, StoneRecord, UploadLimits, ValidationError,
};
use atelier_mail::{MailClient, MailError};
use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderName, HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};

use crate::middleware::{enforce_rate_limit, request_id, RateLimitState, RequestId};

/// JSON bodies other than uploads stay small.
const FORM_BODY_LIMIT: usize = 64 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub cms: CmsClient,
    pub mail: MailClient,
    pub images: ImageUrlBuilder,
    pub site: Arc<SiteConfig>,
    pub routing: Arc<MailRouting>,
    pub whatsapp_number: Arc<str>,
    pub upload_limits: UploadLimits,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl<T: Serialize> ApiResponse<T> {
    pub(super) fn new(request_id: String, data: T) -> Json<Self> {
        Json(Self {
            data,
            meta: ResponseMeta::new(request_id),
        })
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
                field: None,
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" | "stone_unavailable" => StatusCode::NOT_FOUND,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "rate_limited" => StatusCode::TOO_MANY_REQUESTS,
            "catalog_unavailable" | "mail_failed" => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

pub(super) fn validation_error(request_id: String, error: &ValidationError) -> ApiError {
    let mut api_error = ApiError::new(request_id, "validation_error", error.message.clone());
    api_error.error.field = Some(error.field.to_string());
    api_error
}

pub(super) fn map_cms_error(request_id: String, error: &CmsError) -> ApiError {
    tracing::error!(error = %error, "catalog fetch failed");
    ApiError::new(
        request_id,
        "catalog_unavailable",
        "the catalog could not be loaded; please reload the page",
    )
}

pub(super) fn map_mail_error(request_id: String, error: &MailError) -> ApiError {
    tracing::error!(error = %error, "mail send failed");
    ApiError::new(
        request_id,
        "mail_failed",
        "your message could not be sent; please try again in a moment",
    )
}

pub(super) fn stone_unavailable(request_id: String, key: &str) -> ApiError {
    tracing::debug!(key, "stone not found or no longer available");
    ApiError::new(
        request_id,
        "stone_unavailable",
        "this stone is no longer available",
    )
}

/// Fetches a stone that can still be sold. Missing and sold stones are both
/// `stone_unavailable`.
pub(super) async fn fetch_available_stone(
    state: &AppState,
    req_id: &str,
    key: &str,
) -> Result<StoneRecord, ApiError> {
    state
        .cms
        .fetch_stone(key)
        .await
        .map_err(|e| map_cms_error(req_id.to_string(), &e))?
        .filter(|stone| stone.available)
        .ok_or_else(|| stone_unavailable(req_id.to_string(), key))
}

/// Looks a ring setting up in the site config; unknown ids fail on `field`.
pub(super) fn find_ring(
    state: &AppState,
    req_id: &str,
    field: &'static str,
    id: &str,
) -> Result<RingShape, ApiError> {
    state.site.ring(id).cloned().ok_or_else(|| {
        validation_error(
            req_id.to_string(),
            &ValidationError {
                field,
                message: format!("unknown ring setting '{id}'"),
            },
        )
    })
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static("x-request-id"),
            HeaderName::from_static("x-filename"),
        ])
}

/// Base64 inflates by a third; leave room for the rest of the form.
fn custom_request_body_limit(limits: &UploadLimits) -> usize {
    limits
        .max_bytes
        .saturating_mul(MAX_ATTACHMENTS)
        .saturating_mul(4)
        / 3
        + FORM_BODY_LIMIT
}

fn submission_router(state: &AppState, rate_limit: RateLimitState) -> Router<AppState> {
    Router::new()
        .route("/api/v1/configurator", post(configurator::apply_action))
        .route("/api/v1/enquiries/stone", post(enquiries::submit_stone))
        .route(
            "/api/v1/enquiries/configurator",
            post(enquiries::submit_configurator),
        )
        .route("/api/v1/contact", post(enquiries::submit_contact))
        .layer(DefaultBodyLimit::max(FORM_BODY_LIMIT))
        .route(
            "/api/v1/enquiries/custom",
            post(enquiries::submit_custom).layer(DefaultBodyLimit::max(
                custom_request_body_limit(&state.upload_limits),
            )),
        )
        .route(
            "/api/v1/uploads",
            post(uploads::upload).layer(DefaultBodyLimit::max(
                state.upload_limits.max_bytes.saturating_add(1),
            )),
        )
        .layer(
            ServiceBuilder::new()
                .layer(SetResponseHeaderLayer::overriding(
                    header::CACHE_CONTROL,
                    HeaderValue::from_static("no-store"),
                ))
                .layer(axum::middleware::from_fn_with_state(
                    rate_limit,
                    enforce_rate_limit,
                )),
        )
}

pub fn build_app(state: AppState, rate_limit: RateLimitState) -> Router {
    let catalog_routes = Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/stones", get(stones::list_stones))
        .route("/api/v1/stones/{id}", get(stones::get_stone))
        .route("/api/v1/rings", get(rings::list_rings));

    Router::new()
        .merge(catalog_routes)
        .merge(submission_router(&state, rate_limit))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(Extension(req_id): Extension<RequestId>) -> impl IntoResponse {
    ApiResponse::new(req_id.0, HealthData { status: "ok" })
}
