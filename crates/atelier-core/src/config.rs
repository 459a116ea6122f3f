use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Kept separate from the process environment so tests can drive it from a
/// plain `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let cms_project_id = require("ATELIER_CMS_PROJECT_ID")?;
    let mail_api_key = require("ATELIER_MAIL_API_KEY")?;

    let env = parse_environment(&or_default("ATELIER_ENV", "development"));

    let bind_addr = parse_addr("ATELIER_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("ATELIER_LOG_LEVEL", "info");
    let site_config_path =
        PathBuf::from(or_default("ATELIER_SITE_CONFIG_PATH", "./config/site.yaml"));

    let cms_dataset = or_default("ATELIER_CMS_DATASET", "production");
    let cms_api_version = or_default("ATELIER_CMS_API_VERSION", "2024-01-01");
    let cms_api_base = or_default(
        "ATELIER_CMS_API_BASE",
        &format!("https://{cms_project_id}.api.sanity.io"),
    );
    let cms_cdn_base = or_default("ATELIER_CMS_CDN_BASE", "https://cdn.sanity.io");
    let cms_token = lookup("ATELIER_CMS_TOKEN")
        .ok()
        .filter(|t| !t.trim().is_empty());

    let mail_api_base = or_default("ATELIER_MAIL_API_BASE", "https://api.resend.com");
    let mail_from = or_default("ATELIER_MAIL_FROM", "Atelier <enquiries@example.com>");
    let mail_to = or_default("ATELIER_MAIL_TO", "enquiries@example.com");
    let whatsapp_number = or_default("ATELIER_WHATSAPP_NUMBER", "+94 77 000 0000");
    if !whatsapp_number.chars().any(|c| c.is_ascii_digit()) {
        return Err(ConfigError::InvalidEnvVar {
            var: "ATELIER_WHATSAPP_NUMBER".to_string(),
            reason: "phone number must contain digits".to_string(),
        });
    }

    let http_timeout_secs = parse_u64("ATELIER_HTTP_TIMEOUT_SECS", "15")?;
    let http_user_agent = or_default("ATELIER_HTTP_USER_AGENT", "atelier/0.1 (site-backend)");
    let upload_max_bytes = parse_usize("ATELIER_UPLOAD_MAX_BYTES", "10485760")?;
    let form_rate_limit_per_minute = parse_usize("ATELIER_FORM_RATE_LIMIT_PER_MINUTE", "30")?;

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        site_config_path,
        cms_project_id,
        cms_dataset,
        cms_api_version,
        cms_api_base,
        cms_cdn_base,
        cms_token,
        mail_api_key,
        mail_api_base,
        mail_from,
        mail_to,
        whatsapp_number,
        http_timeout_secs,
        http_user_agent,
        upload_max_bytes,
        form_rate_limit_per_minute,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
