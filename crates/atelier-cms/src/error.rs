use thiserror::Error;

#[derive(Debug, Error)]
pub enum CmsError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("rate limited by content store (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("invalid content store base URL \"{base}\": {reason}")]
    InvalidBaseUrl { base: String, reason: String },

    #[error("rejected stone document {document_id}: {reason}")]
    Normalization { document_id: String, reason: String },
}
