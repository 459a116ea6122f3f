//! Customer enquiry forms and the mail they turn into.
//!
//! Every form is validated before anything leaves the process; a failed
//! check names the offending field so the UI can show it inline.

use std::fmt::Write as _;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::configurator::Configurator;
use crate::upload::Attachment;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid regex"));

/// Caps attachments per custom request.
pub const MAX_ATTACHMENTS: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn required(field: &'static str) -> Self {
        Self {
            field,
            message: "this field is required".to_string(),
        }
    }
}

/// Where enquiry mail goes and who it comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailRouting {
    /// Site sender identity, e.g. `"Atelier <enquiries@example.com>"`.
    pub from: String,
    /// Business inbox.
    pub to: String,
}

/// Provider-agnostic outbound message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundMail {
    pub from: String,
    pub to: Vec<String>,
    pub reply_to: Option<String>,
    pub subject: String,
    pub text: String,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

fn require(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::required(field))
    } else {
        Ok(())
    }
}

fn require_email(value: &str) -> Result<(), ValidationError> {
    require("email", value)?;
    if EMAIL_RE.is_match(value.trim()) {
        Ok(())
    } else {
        Err(ValidationError {
            field: "email",
            message: "enter a valid email address".to_string(),
        })
    }
}

fn present(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}

/// Shared "who is asking" lines.
fn contact_block(name: &str, email: &str, phone: Option<&String>) -> String {
    let mut block = format!("Name: {}\nEmail: {}\n", name.trim(), email.trim());
    if let Some(phone) = present(phone) {
        let _ = writeln!(block, "Phone: {phone}");
    }
    block
}

fn mail(routing: &MailRouting, email: &str, subject: String, text: String) -> OutboundMail {
    OutboundMail {
        from: routing.from.clone(),
        to: vec![routing.to.clone()],
        reply_to: Some(email.trim().to_string()),
        subject,
        text,
        attachments: Vec::new(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    pub message: String,
}

impl ContactForm {
    /// # Errors
    ///
    /// Returns the first missing or malformed field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("name", &self.name)?;
        require_email(&self.email)?;
        require("message", &self.message)
    }

    #[must_use]
    pub fn into_mail(self, routing: &MailRouting) -> OutboundMail {
        let subject = match present(self.subject.as_ref()) {
            Some(subject) => format!("Contact: {subject}"),
            None => format!("Contact from {}", self.name.trim()),
        };
        let mut text = contact_block(&self.name, &self.email, self.phone.as_ref());
        let _ = write!(text, "\n{}", self.message.trim());
        mail(routing, &self.email, subject, text)
    }
}

/// Enquiry about a stone already in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoneEnquiry {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub stone_id: String,
    pub stone_name: String,
    #[serde(default)]
    pub message: Option<String>,
}

impl StoneEnquiry {
    /// # Errors
    ///
    /// Returns the first missing or malformed field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("name", &self.name)?;
        require_email(&self.email)?;
        require("stone_id", &self.stone_id)?;
        require("stone_name", &self.stone_name)
    }

    #[must_use]
    pub fn into_mail(self, routing: &MailRouting) -> OutboundMail {
        let subject = format!("Stone enquiry: {}", self.stone_name.trim());
        let mut text = contact_block(&self.name, &self.email, self.phone.as_ref());
        let _ = write!(
            text,
            "\nStone: {}\nReference: {}\n",
            self.stone_name.trim(),
            self.stone_id.trim()
        );
        if let Some(message) = present(self.message.as_ref()) {
            let _ = write!(text, "\n{message}");
        }
        mail(routing, &self.email, subject, text)
    }
}

/// Commission request for a bespoke piece, optionally with reference images.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomJewelryRequest {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    /// e.g. `"Engagement ring"`, `"Pendant"`.
    pub jewelry_type: String,
    #[serde(default)]
    pub metal: Option<String>,
    #[serde(default)]
    pub budget: Option<String>,
    pub description: String,
    /// Filled server-side from checked uploads, never from the request body.
    #[serde(default, skip_deserializing)]
    pub attachments: Vec<Attachment>,
}

impl CustomJewelryRequest {
    /// # Errors
    ///
    /// Returns the first missing or malformed field, or an error on
    /// `attachments` when more than [`MAX_ATTACHMENTS`] are supplied.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("name", &self.name)?;
        require_email(&self.email)?;
        require("jewelry_type", &self.jewelry_type)?;
        require("description", &self.description)?;
        if self.attachments.len() > MAX_ATTACHMENTS {
            return Err(ValidationError {
                field: "attachments",
                message: format!("at most {MAX_ATTACHMENTS} files can be attached"),
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn into_mail(self, routing: &MailRouting) -> OutboundMail {
        let subject = format!("Custom jewelry request: {}", self.jewelry_type.trim());
        let mut text = contact_block(&self.name, &self.email, self.phone.as_ref());
        let _ = writeln!(text, "\nPiece: {}", self.jewelry_type.trim());
        if let Some(metal) = present(self.metal.as_ref()) {
            let _ = writeln!(text, "Metal: {metal}");
        }
        if let Some(budget) = present(self.budget.as_ref()) {
            let _ = writeln!(text, "Budget: {budget}");
        }
        let _ = write!(text, "\n{}", self.description.trim());
        if !self.attachments.is_empty() {
            let _ = write!(text, "\n\nAttachments: {}", self.attachments.len());
        }

        let mut outbound = mail(routing, &self.email, subject, text);
        outbound.attachments = self.attachments;
        outbound
    }
}

/// Enquiry sent from the last configurator step. `selection` is built
/// server-side from catalog records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfiguratorEnquiry {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
    pub selection: Configurator,
}

impl ConfiguratorEnquiry {
    /// # Errors
    ///
    /// Returns the first missing or malformed field; `selection` fails when
    /// no stone or no ring has been chosen.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.validate_contact()?;
        if self.selection.summary_message().is_none() {
            return Err(ValidationError {
                field: "selection",
                message: "choose a stone and a setting first".to_string(),
            });
        }
        Ok(())
    }

    /// Checks only the customer fields, for use before the selection is
    /// resolved.
    ///
    /// # Errors
    ///
    /// Returns the first missing or malformed field.
    pub fn validate_contact(&self) -> Result<(), ValidationError> {
        require("name", &self.name)?;
        require_email(&self.email)
    }

    #[must_use]
    pub fn into_mail(self, routing: &MailRouting) -> OutboundMail {
        let stone_name = self
            .selection
            .selected_stone
            .as_ref()
            .map_or("custom ring", |s| s.name.as_str());
        let subject = format!("Ring configurator: {stone_name}");
        let mut text = contact_block(&self.name, &self.email, self.phone.as_ref());
        if let Some(summary) = self.selection.summary_message() {
            let _ = write!(text, "\n{summary}");
        }
        if let Some(note) = present(self.note.as_ref()) {
            let _ = write!(text, "\n\nNote: {note}");
        }
        mail(routing, &self.email, subject, text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configurator::{RingShape, StoneChoice};

    fn routing() -> MailRouting {
        MailRouting {
            from: "Atelier <enquiries@example.com>".into(),
            to: "owner@example.com".into(),
        }
    }

    fn contact() -> ContactForm {
        ContactForm {
            name: "Ada".into(),
            email: "ada@example.com".into(),
            phone: None,
            subject: None,
            message: "Do you ship to Canada?".into(),
        }
    }

    #[test]
    fn contact_form_requires_fields() {
        assert!(contact().validate().is_ok());

        let mut form = contact();
        form.name = "  ".into();
        assert_eq!(form.validate().map_err(|e| e.field), Err("name"));

        let mut form = contact();
        form.message = String::new();
        assert_eq!(form.validate().map_err(|e| e.field), Err("message"));
    }

    #[test]
    fn email_must_be_well_formed() {
        for bad in ["", "ada", "ada@", "ada@example", "a da@example.com"] {
            let mut form = contact();
            form.email = bad.into();
            assert_eq!(form.validate().map_err(|e| e.field), Err("email"), "{bad:?}");
        }
    }

    #[test]
    fn contact_mail_routes_to_inbox_and_replies_to_customer() {
        let mut form = contact();
        form.phone = Some("+1 555 0100".into());
        let mail = form.into_mail(&routing());
        assert_eq!(mail.to, vec!["owner@example.com"]);
        assert_eq!(mail.reply_to.as_deref(), Some("ada@example.com"));
        assert_eq!(mail.subject, "Contact from Ada");
        assert!(mail.text.contains("Phone: +1 555 0100"));
        assert!(mail.text.ends_with("Do you ship to Canada?"));
    }

    #[test]
    fn contact_mail_omits_blank_phone() {
        let mut form = contact();
        form.phone = Some("   ".into());
        form.subject = Some("Shipping".into());
        let mail = form.into_mail(&routing());
        assert!(!mail.text.contains("Phone"));
        assert_eq!(mail.subject, "Contact: Shipping");
    }

    #[test]
    fn stone_enquiry_mail() {
        let enquiry = StoneEnquiry {
            name: "Ada".into(),
            email: "ada@example.com".into(),
            phone: None,
            stone_id: "doc-1".into(),
            stone_name: "Ceylon Blue Sapphire".into(),
            message: None,
        };
        assert!(enquiry.validate().is_ok());
        let mail = enquiry.into_mail(&routing());
        assert_eq!(mail.subject, "Stone enquiry: Ceylon Blue Sapphire");
        assert!(mail.text.contains("Reference: doc-1"));
    }

    #[test]
    fn stone_enquiry_requires_stone() {
        let enquiry = StoneEnquiry {
            name: "Ada".into(),
            email: "ada@example.com".into(),
            phone: None,
            stone_id: String::new(),
            stone_name: "Ruby".into(),
            message: None,
        };
        assert_eq!(enquiry.validate().map_err(|e| e.field), Err("stone_id"));
    }

    fn custom_request(attachments: usize) -> CustomJewelryRequest {
        CustomJewelryRequest {
            name: "Ada".into(),
            email: "ada@example.com".into(),
            phone: None,
            jewelry_type: "Pendant".into(),
            metal: Some("Yellow Gold".into()),
            budget: None,
            description: "A teardrop pendant".into(),
            attachments: (0..attachments)
                .map(|i| Attachment {
                    filename: format!("ref-{i}.png"),
                    content_type: "image/png".into(),
                    content: "aGVsbG8=".into(),
                })
                .collect(),
        }
    }

    #[test]
    fn custom_request_carries_attachments() {
        let request = custom_request(2);
        assert!(request.validate().is_ok());
        let mail = request.into_mail(&routing());
        assert_eq!(mail.attachments.len(), 2);
        assert!(mail.text.contains("Metal: Yellow Gold"));
        assert!(!mail.text.contains("Budget"));
        assert!(mail.text.contains("Attachments: 2"));
    }

    #[test]
    fn custom_request_ignores_attachments_in_body() {
        let request: CustomJewelryRequest = serde_json::from_value(serde_json::json!({
            "name": "Ada",
            "email": "ada@example.com",
            "jewelry_type": "Pendant",
            "description": "A teardrop pendant",
            "attachments": [{
                "filename": "evil.exe",
                "content_type": "application/x-msdownload",
                "content": "%%%not base64%%%"
            }]
        }))
        .expect("deserialize");
        assert!(request.attachments.is_empty());
        assert!(request.into_mail(&routing()).attachments.is_empty());
    }

    #[test]
    fn custom_request_limits_attachments() {
        let request = custom_request(MAX_ATTACHMENTS + 1);
        assert_eq!(request.validate().map_err(|e| e.field), Err("attachments"));
    }

    #[test]
    fn configurator_enquiry_requires_complete_selection() {
        let mut enquiry = ConfiguratorEnquiry {
            name: "Ada".into(),
            email: "ada@example.com".into(),
            phone: None,
            note: Some("Size 6".into()),
            selection: Configurator::new(),
        };
        assert_eq!(enquiry.validate().map_err(|e| e.field), Err("selection"));
        assert!(enquiry.validate_contact().is_ok());

        enquiry.selection = Configurator::new()
            .select_stone(StoneChoice {
                id: "s".into(),
                name: "Padparadscha".into(),
                origin: None,
                carat: Some(1.1),
                price_display: "Price on request".into(),
                image: None,
            })
            .select_ring(RingShape {
                id: "solitaire".into(),
                label: "Solitaire".into(),
                description: None,
                images: std::collections::BTreeMap::new(),
            });
        assert!(enquiry.validate().is_ok());

        let mail = enquiry.into_mail(&routing());
        assert_eq!(mail.subject, "Ring configurator: Padparadscha");
        assert!(mail.text.contains("Setting: Solitaire"));
        assert!(mail.text.ends_with("Note: Size 6"));
    }

    #[test]
    fn validation_error_display_names_field() {
        let err = ValidationError::required("email");
        assert_eq!(err.to_string(), "email: this field is required");
    }
}
