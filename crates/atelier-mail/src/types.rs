//! Wire types for the mail provider's `POST /emails` endpoint.

use atelier_core::{Attachment, OutboundMail};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SendEmailRequest {
    pub from: String,
    pub to: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,
    pub subject: String,
    pub text: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<AttachmentPayload>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AttachmentPayload {
    pub filename: String,
    /// Base64 file content.
    pub content: String,
    pub content_type: String,
}

impl From<Attachment> for AttachmentPayload {
    fn from(a: Attachment) -> Self {
        Self {
            filename: a.filename,
            content: a.content,
            content_type: a.content_type,
        }
    }
}

impl From<OutboundMail> for SendEmailRequest {
    fn from(mail: OutboundMail) -> Self {
        Self {
            from: mail.from,
            to: mail.to,
            reply_to: mail.reply_to,
            subject: mail.subject,
            text: mail.text,
            attachments: mail.attachments.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SendEmailResponse {
    pub id: String,
}

/// Error body returned with 4xx responses.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ProviderErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}
