pub mod client;
pub mod error;
pub mod types;

pub use client::MailClient;
pub use error::MailError;
pub use types::{SendEmailRequest, SendEmailResponse};
