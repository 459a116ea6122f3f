//! Response types for the content store's query endpoint.
//!
//! ## Observed document shape
//!
//! Editors fill stones in through the studio, so almost every field can be
//! missing on a draft-turned-published document:
//!
//! - `carat` is normally a number but older documents carry strings such as
//!   `"3.2"` or `"3.2 ct"`. Both are modeled as raw JSON and parsed during
//!   normalization.
//! - `price` is a number, a numeric string (`"12,000"`), or absent. Absent
//!   means "price on request".
//! - `images` is projected to a flat list of asset references; entries can
//!   be `null` when an upload was removed without deleting the array slot.
//! - `category` / `origin` may be empty strings.

use serde::Deserialize;

/// Envelope returned by `GET /v{version}/data/query/{dataset}`.
#[derive(Debug, Deserialize)]
pub struct QueryResponse<T> {
    pub result: T,
    /// Server-side query time in milliseconds.
    #[serde(default)]
    pub ms: Option<u64>,
}

/// A stone document as projected by [`STONE_PROJECTION`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawStoneDocument {
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub origin: Option<String>,
    #[serde(default)]
    pub carat: Option<serde_json::Value>,
    #[serde(default)]
    pub price: Option<serde_json::Value>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub images: Option<Vec<Option<String>>>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub available: Option<bool>,
}

/// Projection applied to every stone query so the response matches
/// [`RawStoneDocument`].
pub const STONE_PROJECTION: &str = r#"{
  _id,
  name,
  "slug": slug.current,
  category,
  origin,
  carat,
  price,
  currency,
  "images": images[].asset._ref,
  description,
  available
}"#;
