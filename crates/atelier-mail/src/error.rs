use thiserror::Error;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("rate limited by mail provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    /// Provider rejected the message, e.g. unverified sender domain.
    #[error("mail provider rejected the message ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },
}
