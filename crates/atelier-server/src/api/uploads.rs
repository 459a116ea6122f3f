use atelier_core::{encode_upload, UploadedFile, ValidationError};
use axum::{
    body::Bytes,
    extract::State,
    http::{header::CONTENT_TYPE, HeaderMap},
    Extension, Json,
};
use percent_encoding::percent_decode_str;

use crate::middleware::RequestId;

use super::{validation_error, ApiError, ApiResponse, AppState};

const FILENAME_HEADER: &str = "x-filename";

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Accepts one raw file body and returns it as a data URL for the custom
/// request form. The `x-filename` header may be percent-encoded.
pub(super) async fn upload(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<ApiResponse<UploadedFile>>, ApiError> {
    let content_type = header_str(&headers, CONTENT_TYPE.as_str()).unwrap_or_default();
    let filename = header_str(&headers, FILENAME_HEADER)
        .map_or_else(|| "upload".into(), |raw| percent_decode_str(raw).decode_utf8_lossy());

    let file = encode_upload(&body, &filename, content_type, &state.upload_limits).map_err(|e| {
        tracing::debug!(error = %e, %filename, "upload rejected");
        validation_error(
            req_id.0.clone(),
            &ValidationError {
                field: "file",
                message: e.to_string(),
            },
        )
    })?;

    Ok(ApiResponse::new(req_id.0, file))
}
