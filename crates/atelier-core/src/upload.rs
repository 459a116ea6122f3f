//! Reference-image uploads for custom jewelry requests.
//!
//! Files are turned into `data:` URLs and handed straight back to the
//! browser, which submits them with the request form. Nothing is stored.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::CoreError;

pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub const ALLOWED_CONTENT_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/webp",
    "image/heic",
    "application/pdf",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadLimits {
    pub max_bytes: usize,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
    pub data_url: String,
    pub filename: String,
    pub content_type: String,
    pub size: usize,
}

/// A mail attachment, base64 content plus declared MIME type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub filename: String,
    pub content_type: String,
    /// Standard base64 of the file bytes.
    pub content: String,
}

impl Attachment {
    /// Parses a `data:{mime};base64,{payload}` URL produced by
    /// [`encode_upload`], applying the same checks as the upload route.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidDataUrl`] when the URL is not a base64
    /// data URL or the payload does not decode, and
    /// [`CoreError::UploadRejected`] when the decoded file is empty, above
    /// `limits.max_bytes`, or of a type outside [`ALLOWED_CONTENT_TYPES`].
    pub fn from_data_url(
        filename: &str,
        data_url: &str,
        limits: &UploadLimits,
    ) -> Result<Self, CoreError> {
        let rest = data_url
            .strip_prefix("data:")
            .ok_or_else(|| CoreError::InvalidDataUrl("missing data: prefix".to_string()))?;
        let (meta, payload) = rest
            .split_once(',')
            .ok_or_else(|| CoreError::InvalidDataUrl("missing payload separator".to_string()))?;
        let content_type = meta
            .strip_suffix(";base64")
            .ok_or_else(|| CoreError::InvalidDataUrl("payload is not base64".to_string()))?;
        if content_type.is_empty() {
            return Err(CoreError::InvalidDataUrl("missing content type".to_string()));
        }
        let bytes = STANDARD
            .decode(payload)
            .map_err(|e| CoreError::InvalidDataUrl(e.to_string()))?;
        let content_type = check_file(bytes.len(), content_type, limits)?;

        Ok(Self {
            filename: sanitize_filename(filename),
            content_type,
            content: payload.to_string(),
        })
    }
}

/// Size and type checks shared by uploads and resubmitted data URLs.
/// Returns the normalized content type.
fn check_file(size: usize, content_type: &str, limits: &UploadLimits) -> Result<String, CoreError> {
    if size == 0 {
        return Err(CoreError::UploadRejected("file is empty".to_string()));
    }
    if size > limits.max_bytes {
        return Err(CoreError::UploadRejected(format!(
            "file is {size} bytes; the limit is {} bytes",
            limits.max_bytes
        )));
    }

    let content_type = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_lowercase();
    if !ALLOWED_CONTENT_TYPES.contains(&content_type.as_str()) {
        return Err(CoreError::UploadRejected(format!(
            "unsupported file type '{content_type}'"
        )));
    }
    Ok(content_type)
}

/// Keeps the last path segment and drops control characters, so a
/// client-supplied name is safe to echo into mail headers.
fn sanitize_filename(raw: &str) -> String {
    let name = raw.rsplit(['/', '\\']).next().unwrap_or(raw);
    let cleaned: String = name.chars().filter(|c| !c.is_control()).collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned.to_string()
    }
}

/// Encodes an uploaded file as a data URL.
///
/// # Errors
///
/// Returns [`CoreError::UploadRejected`] for empty files, files above
/// `limits.max_bytes`, or content types outside [`ALLOWED_CONTENT_TYPES`].
pub fn encode_upload(
    bytes: &[u8],
    filename: &str,
    content_type: &str,
    limits: &UploadLimits,
) -> Result<UploadedFile, CoreError> {
    let content_type = check_file(bytes.len(), content_type, limits)?;

    Ok(UploadedFile {
        data_url: format!("data:{content_type};base64,{}", STANDARD.encode(bytes)),
        filename: sanitize_filename(filename),
        content_type,
        size: bytes.len(),
    })
}
