//! HTTP client for the transactional mail provider.

use std::time::Duration;

use atelier_core::OutboundMail;
use reqwest::Client;

use crate::error::MailError;
use crate::types::{ProviderErrorBody, SendEmailRequest, SendEmailResponse};

const DEFAULT_BASE_URL: &str = "https://api.resend.com";

/// Sends [`OutboundMail`] through the provider's REST API.
///
/// One request per message. A failed send is reported to the caller and not
/// retried; the visitor sees the error and can resubmit.
#[derive(Debug, Clone)]
pub struct MailClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl MailClient {
    /// # Errors
    ///
    /// Returns [`MailError::Http`] if the underlying `reqwest::Client` cannot
    /// be constructed.
    pub fn new(api_key: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, MailError> {
        Self::with_base_url(api_key, timeout_secs, user_agent, DEFAULT_BASE_URL)
    }

    /// Same as [`MailClient::new`] but against `base_url`, used for tests and
    /// self-hosted relays.
    ///
    /// # Errors
    ///
    /// Returns [`MailError::Http`] if the underlying `reqwest::Client` cannot
    /// be constructed.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        user_agent: &str,
        base_url: &str,
    ) -> Result<Self, MailError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client,
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Sends one message and returns the provider's message id.
    ///
    /// # Errors
    ///
    /// - [`MailError::RateLimited`] on HTTP 429.
    /// - [`MailError::Rejected`] on 400, 403 or 422 with the provider's
    ///   message.
    /// - [`MailError::UnexpectedStatus`] on any other non-2xx status.
    /// - [`MailError::Http`] on network or TLS failure.
    /// - [`MailError::Deserialize`] if the success body has no id.
    pub async fn send(&self, mail: OutboundMail) -> Result<String, MailError> {
        let url = format!("{}/emails", self.base_url);
        let subject = mail.subject.clone();
        let attachment_count = mail.attachments.len();
        let request = SendEmailRequest::from(mail);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(60);
            return Err(MailError::RateLimited { retry_after_secs });
        }

        if matches!(status.as_u16(), 400 | 403 | 422) {
            let body = response.text().await.unwrap_or_default();
            let parsed: ProviderErrorBody = serde_json::from_str(&body).unwrap_or_default();
            let message = parsed
                .message
                .or(parsed.name)
                .unwrap_or_else(|| status.to_string());
            return Err(MailError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        if !status.is_success() {
            return Err(MailError::UnexpectedStatus {
                status: status.as_u16(),
                url,
            });
        }

        let body = response.text().await?;
        let sent: SendEmailResponse =
            serde_json::from_str(&body).map_err(|e| MailError::Deserialize {
                context: format!("send response from {url}"),
                source: e,
            })?;

        tracing::info!(id = %sent.id, subject = %subject, attachment_count, "mail sent");
        Ok(sent.id)
    }
}
