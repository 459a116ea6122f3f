use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub site_config_path: PathBuf,
    pub cms_project_id: String,
    pub cms_dataset: String,
    pub cms_api_version: String,
    /// Query API origin, e.g. `https://abc123.api.sanity.io`.
    pub cms_api_base: String,
    /// Image CDN origin used by the image URL transform.
    pub cms_cdn_base: String,
    pub cms_token: Option<String>,
    pub mail_api_key: String,
    pub mail_api_base: String,
    /// Sender identity for outbound mail, e.g. `"Atelier <hello@example.com>"`.
    pub mail_from: String,
    /// Business inbox that receives enquiries.
    pub mail_to: String,
    pub whatsapp_number: String,
    pub http_timeout_secs: u64,
    pub http_user_agent: String,
    pub upload_max_bytes: usize,
    pub form_rate_limit_per_minute: usize,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("site_config_path", &self.site_config_path)
            .field("cms_project_id", &self.cms_project_id)
            .field("cms_dataset", &self.cms_dataset)
            .field("cms_api_version", &self.cms_api_version)
            .field("cms_api_base", &self.cms_api_base)
            .field("cms_cdn_base", &self.cms_cdn_base)
            .field("cms_token", &self.cms_token.as_ref().map(|_| "[redacted]"))
            .field("mail_api_key", &"[redacted]")
            .field("mail_api_base", &self.mail_api_base)
            .field("mail_from", &self.mail_from)
            .field("mail_to", &self.mail_to)
            .field("whatsapp_number", &self.whatsapp_number)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("http_user_agent", &self.http_user_agent)
            .field("upload_max_bytes", &self.upload_max_bytes)
            .field(
                "form_rate_limit_per_minute",
                &self.form_rate_limit_per_minute,
            )
            .finish()
    }
}
