//! HTTP client for the content store's GROQ query endpoint.

use std::collections::HashSet;
use std::time::Duration;

use atelier_core::category::{find_group, primary_values, OTHER_GROUP};
use atelier_core::{facet_key, AppConfig, CategoryGroup, StoneRecord};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;

use crate::error::CmsError;
use crate::normalize::{normalize_stone, normalize_stones};
use crate::types::{QueryResponse, RawStoneDocument, STONE_PROJECTION};

fn category_keys(categories: &[String]) -> HashSet<String> {
    categories.iter().map(|c| facet_key(c)).collect()
}

fn in_categories(stone: &StoneRecord, keys: &HashSet<String>) -> bool {
    stone
        .category
        .as_deref()
        .is_some_and(|category| keys.contains(&facet_key(category)))
}

/// Connection settings for [`CmsClient`].
#[derive(Debug, Clone)]
pub struct CmsSettings {
    /// Query API origin, e.g. `https://abc123.api.sanity.io`.
    pub api_base: String,
    pub dataset: String,
    /// Dated API version without the `v` prefix, e.g. `2024-01-01`.
    pub api_version: String,
    pub token: Option<String>,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl CmsSettings {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            api_base: config.cms_api_base.clone(),
            dataset: config.cms_dataset.clone(),
            api_version: config.cms_api_version.clone(),
            token: config.cms_token.clone(),
            timeout_secs: config.http_timeout_secs,
            user_agent: config.http_user_agent.clone(),
        }
    }
}

/// Read-only catalog source backed by the content store.
///
/// Every call issues one query; nothing is cached and failed requests are
/// not retried. Callers surface the failure and let the visitor reload.
#[derive(Debug, Clone)]
pub struct CmsClient {
    client: Client,
    query_url: Url,
    token: Option<String>,
}

impl CmsClient {
    /// # Errors
    ///
    /// Returns [`CmsError::Http`] if the underlying `reqwest::Client` cannot
    /// be constructed, or [`CmsError::InvalidBaseUrl`] if `api_base` does not
    /// parse.
    pub fn new(settings: &CmsSettings) -> Result<Self, CmsError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(&settings.user_agent)
            .build()?;

        let raw = format!(
            "{}/v{}/data/query/{}",
            settings.api_base.trim_end_matches('/'),
            settings.api_version.trim_start_matches('v'),
            settings.dataset
        );
        let query_url = Url::parse(&raw).map_err(|e| CmsError::InvalidBaseUrl {
            base: settings.api_base.clone(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            query_url,
            token: settings.token.clone(),
        })
    }

    /// Fetches every stone flagged as available.
    ///
    /// # Errors
    ///
    /// See [`CmsClient::query`].
    pub async fn fetch_available_stones(&self) -> Result<Vec<StoneRecord>, CmsError> {
        let groq = format!(
            r#"*[_type == "stone" && available == true] | order(_createdAt desc) {STONE_PROJECTION}"#
        );
        let raw: Vec<RawStoneDocument> = self.query(&groq, &[]).await?;
        Ok(normalize_stones(raw))
    }

    /// Fetches available stones whose category is one of `categories`.
    ///
    /// Categories are compared with [`facet_key`], the rule
    /// [`CategoryGroup::contains`] uses, so stray casing or padding upstream
    /// does not move a stone between pages. The content store cannot trim
    /// in a query, so the split happens here.
    ///
    /// # Errors
    ///
    /// See [`CmsClient::query`].
    pub async fn fetch_stones_in_categories(
        &self,
        categories: &[String],
    ) -> Result<Vec<StoneRecord>, CmsError> {
        let keys = category_keys(categories);
        let mut stones = self.fetch_available_stones().await?;
        stones.retain(|stone| in_categories(stone, &keys));
        Ok(stones)
    }

    /// Fetches available stones outside every category in `excluded`, the
    /// catalog's "other" page. Stones without a category land here.
    ///
    /// # Errors
    ///
    /// See [`CmsClient::query`].
    pub async fn fetch_stones_outside_categories(
        &self,
        excluded: &[String],
    ) -> Result<Vec<StoneRecord>, CmsError> {
        let keys = category_keys(excluded);
        let mut stones = self.fetch_available_stones().await?;
        stones.retain(|stone| !in_categories(stone, &keys));
        Ok(stones)
    }

    /// Fetches one catalog page: everything when `group` is `None`, the
    /// catch-all page for `"other"`, otherwise the named group.
    ///
    /// Returns `Ok(None)` when `group` names no known group.
    ///
    /// # Errors
    ///
    /// See [`CmsClient::query`].
    pub async fn fetch_catalog_page(
        &self,
        groups: &[CategoryGroup],
        group: Option<&str>,
    ) -> Result<Option<Vec<StoneRecord>>, CmsError> {
        let stones = match group {
            None => self.fetch_available_stones().await?,
            Some(slug) if slug.eq_ignore_ascii_case(OTHER_GROUP) => {
                self.fetch_stones_outside_categories(&primary_values(groups))
                    .await?
            }
            Some(slug) => match find_group(groups, slug) {
                Some(found) => self.fetch_stones_in_categories(&found.query_values()).await?,
                None => return Ok(None),
            },
        };
        Ok(Some(stones))
    }

    /// Fetches one stone by document id or slug.
    ///
    /// Returns `Ok(None)` when no document matches or the match is rejected
    /// during normalization.
    ///
    /// # Errors
    ///
    /// See [`CmsClient::query`].
    pub async fn fetch_stone(&self, key: &str) -> Result<Option<StoneRecord>, CmsError> {
        let groq = format!(
            r#"*[_type == "stone" && (_id == $key || slug.current == $key)][0] {STONE_PROJECTION}"#
        );
        let raw: Option<RawStoneDocument> =
            self.query(&groq, &[("key", serde_json::json!(key))]).await?;

        Ok(raw.and_then(|doc| match normalize_stone(doc) {
            Ok(stone) => Some(stone),
            Err(e) => {
                tracing::warn!(error = %e, key, "stone document rejected");
                None
            }
        }))
    }

    /// Runs a GROQ query and decodes the `result` field.
    ///
    /// Parameters are JSON-encoded into `$name` query-string pairs.
    ///
    /// # Errors
    ///
    /// - [`CmsError::RateLimited`] on HTTP 429.
    /// - [`CmsError::UnexpectedStatus`] on any other non-2xx status.
    /// - [`CmsError::Http`] on network or TLS failure.
    /// - [`CmsError::Deserialize`] if the body does not match `T`.
    pub async fn query<T: DeserializeOwned>(
        &self,
        groq: &str,
        params: &[(&str, serde_json::Value)],
    ) -> Result<T, CmsError> {
        let mut url = self.query_url.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("query", groq);
            for (name, value) in params {
                pairs.append_pair(&format!("${name}"), &value.to_string());
            }
        }

        let mut request = self
            .client
            .get(url.clone())
            .header(reqwest::header::ACCEPT, "application/json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(60);
            return Err(CmsError::RateLimited { retry_after_secs });
        }

        if !status.is_success() {
            return Err(CmsError::UnexpectedStatus {
                status: status.as_u16(),
                url: self.query_url.to_string(),
            });
        }

        let body = response.text().await?;
        let parsed = serde_json::from_str::<QueryResponse<T>>(&body).map_err(|e| {
            CmsError::Deserialize {
                context: format!("query response from {}", self.query_url),
                source: e,
            }
        })?;

        if let Some(ms) = parsed.ms {
            tracing::debug!(ms, "content store query finished");
        }
        Ok(parsed.result)
    }
}
