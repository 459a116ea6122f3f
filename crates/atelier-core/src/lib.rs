pub mod app_config;
pub mod category;
pub mod config;
pub mod configurator;
pub mod enquiry;
pub mod facets;
pub mod filter;
pub mod site;
pub mod stone;
pub mod upload;
pub mod whatsapp;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use category::CategoryGroup;
pub use config::{load_app_config, load_app_config_from_env};
pub use configurator::{Configurator, ConfiguratorAction, Metal, RingShape, Step, StoneChoice};
pub use enquiry::{
    ConfiguratorEnquiry, ContactForm, CustomJewelryRequest, MailRouting, OutboundMail,
    StoneEnquiry, ValidationError,
};
pub use facets::{count_facets, derive_facets, FacetCounts, FacetDefaults, Facets};
pub use filter::{apply_filter, facet_key, matches, FilterAction, FilterState, MAX_MIN_CARAT};
pub use site::{load_site_config, SiteConfig};
pub use stone::{PriceDisplay, StoneRecord};
pub use upload::{encode_upload, Attachment, UploadLimits, UploadedFile};
pub use whatsapp::{stone_enquiry_message, whatsapp_link};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read site config {path}: {source}")]
    SiteFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse site config: {0}")]
    SiteFileParse(#[from] serde_yaml::Error),

    #[error("site config validation failed: {0}")]
    Validation(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("invalid metal: {0}")]
    InvalidMetal(String),

    #[error("invalid step: {0}")]
    InvalidStep(u8),

    #[error("invalid configurator state: {0}")]
    InvalidState(String),

    #[error("invalid data URL: {0}")]
    InvalidDataUrl(String),

    #[error("upload rejected: {0}")]
    UploadRejected(String),
}
