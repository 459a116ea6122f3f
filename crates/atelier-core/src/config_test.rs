use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

/// Returns a map with all required env vars populated.
fn full_env<'a>() -> HashMap<&'a str, &'a str> {
    let mut m = HashMap::new();
    m.insert("ATELIER_CMS_PROJECT_ID", "abc123");
    m.insert("ATELIER_MAIL_API_KEY", "re_test_key");
    m
}

#[test]
fn parse_environment_variants() {
    assert_eq!(parse_environment("development"), Environment::Development);
    assert_eq!(parse_environment("test"), Environment::Test);
    assert_eq!(parse_environment("production"), Environment::Production);
    assert_eq!(parse_environment("staging"), Environment::Development);
}

#[test]
fn build_app_config_fails_without_project_id() {
    let map: HashMap<&str, &str> = HashMap::new();
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "ATELIER_CMS_PROJECT_ID"),
        "expected MissingEnvVar(ATELIER_CMS_PROJECT_ID), got: {result:?}"
    );
}

#[test]
fn build_app_config_fails_without_mail_api_key() {
    let mut map: HashMap<&str, &str> = HashMap::new();
    map.insert("ATELIER_CMS_PROJECT_ID", "abc123");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "ATELIER_MAIL_API_KEY"),
        "expected MissingEnvVar(ATELIER_MAIL_API_KEY), got: {result:?}"
    );
}

#[test]
fn blank_required_var_counts_as_missing() {
    let mut map = full_env();
    map.insert("ATELIER_MAIL_API_KEY", "   ");
    let result = build_app_config(lookup_from_map(&map));
    assert!(matches!(result, Err(ConfigError::MissingEnvVar(_))));
}

#[test]
fn build_app_config_succeeds_with_defaults() {
    let map = full_env();
    let cfg = build_app_config(lookup_from_map(&map)).expect("config");
    assert_eq!(cfg.env, Environment::Development);
    assert_eq!(cfg.bind_addr.to_string(), "0.0.0.0:3000");
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.cms_dataset, "production");
    assert_eq!(cfg.cms_api_version, "2024-01-01");
    assert_eq!(cfg.cms_api_base, "https://abc123.api.sanity.io");
    assert_eq!(cfg.cms_cdn_base, "https://cdn.sanity.io");
    assert!(cfg.cms_token.is_none());
    assert_eq!(cfg.mail_api_base, "https://api.resend.com");
    assert_eq!(cfg.http_timeout_secs, 15);
    assert_eq!(cfg.upload_max_bytes, 10 * 1024 * 1024);
    assert_eq!(cfg.form_rate_limit_per_minute, 30);
}

#[test]
fn build_app_config_fails_with_invalid_bind_addr() {
    let mut map = full_env();
    map.insert("ATELIER_BIND_ADDR", "not-a-socket-addr");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "ATELIER_BIND_ADDR"),
        "expected InvalidEnvVar(ATELIER_BIND_ADDR), got: {result:?}"
    );
}

#[test]
fn http_timeout_override_and_invalid() {
    let mut map = full_env();
    map.insert("ATELIER_HTTP_TIMEOUT_SECS", "40");
    let cfg = build_app_config(lookup_from_map(&map)).expect("config");
    assert_eq!(cfg.http_timeout_secs, 40);

    map.insert("ATELIER_HTTP_TIMEOUT_SECS", "soon");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "ATELIER_HTTP_TIMEOUT_SECS")
    );
}

#[test]
fn upload_max_bytes_invalid() {
    let mut map = full_env();
    map.insert("ATELIER_UPLOAD_MAX_BYTES", "-1");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "ATELIER_UPLOAD_MAX_BYTES")
    );
}

#[test]
fn whatsapp_number_without_digits_is_rejected() {
    let mut map = full_env();
    map.insert("ATELIER_WHATSAPP_NUMBER", "call us");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "ATELIER_WHATSAPP_NUMBER")
    );
}

#[test]
fn cms_api_base_override_wins_over_project_default() {
    let mut map = full_env();
    map.insert("ATELIER_CMS_API_BASE", "http://127.0.0.1:9999");
    map.insert("ATELIER_CMS_TOKEN", "sk-token");
    let cfg = build_app_config(lookup_from_map(&map)).expect("config");
    assert_eq!(cfg.cms_api_base, "http://127.0.0.1:9999");
    assert_eq!(cfg.cms_token.as_deref(), Some("sk-token"));
}

#[test]
fn debug_output_redacts_secrets() {
    let mut map = full_env();
    map.insert("ATELIER_CMS_TOKEN", "sk-secret-token");
    let cfg = build_app_config(lookup_from_map(&map)).expect("config");
    let rendered = format!("{cfg:?}");
    assert!(!rendered.contains("sk-secret-token"));
    assert!(!rendered.contains("re_test_key"));
    assert!(rendered.contains("[redacted]"));
}
