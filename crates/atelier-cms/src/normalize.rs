//! Conversion from raw content-store documents to [`StoneRecord`].
//!
//! Documents without an id or a name are rejected. Every other malformed
//! field degrades to "absent" so one bad entry never hides the catalog.

use std::str::FromStr;

use atelier_core::stone::DEFAULT_CURRENCY;
use atelier_core::StoneRecord;
use rust_decimal::Decimal;

use crate::error::CmsError;
use crate::types::RawStoneDocument;

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parses `3.2`, `"3.2"` or `"3.2 ct"`. Non-positive or non-finite values
/// are treated as missing.
fn parse_carat(value: Option<&serde_json::Value>) -> Option<f64> {
    let carat = match value? {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => {
            let trimmed = s.trim().trim_end_matches("ct").trim_end_matches("CT").trim();
            trimmed.parse::<f64>().ok()
        }
        _ => None,
    }?;
    (carat.is_finite() && carat > 0.0).then_some(carat)
}

/// Parses `12000`, `"12000"` or `"12,000.50"`. Negative values are treated
/// as missing, which reads as "price on request".
fn parse_price(value: Option<&serde_json::Value>) -> Option<Decimal> {
    let price = match value? {
        serde_json::Value::Number(n) => Decimal::from_str(&n.to_string())
            .or_else(|_| Decimal::from_scientific(&n.to_string()))
            .ok(),
        serde_json::Value::String(s) => Decimal::from_str(&s.trim().replace(',', "")).ok(),
        _ => None,
    }?;
    (!price.is_sign_negative()).then_some(price)
}

/// Normalizes a raw [`RawStoneDocument`] into a [`StoneRecord`].
///
/// # Errors
///
/// Returns [`CmsError::Normalization`] if the document has no id or no name.
pub fn normalize_stone(raw: RawStoneDocument) -> Result<StoneRecord, CmsError> {
    let Some(id) = non_blank(raw.id) else {
        return Err(CmsError::Normalization {
            document_id: "<missing>".to_string(),
            reason: "document has no _id".into(),
        });
    };
    let Some(name) = non_blank(raw.name) else {
        return Err(CmsError::Normalization {
            document_id: id,
            reason: "stone has no name".into(),
        });
    };

    let carat = parse_carat(raw.carat.as_ref());
    if carat.is_none() && raw.carat.as_ref().is_some_and(|v| !v.is_null()) {
        tracing::debug!(document_id = %id, carat = ?raw.carat, "ignoring unparseable carat");
    }

    let images = raw
        .images
        .unwrap_or_default()
        .into_iter()
        .filter_map(non_blank)
        .collect();

    Ok(StoneRecord {
        id,
        name,
        slug: non_blank(raw.slug),
        category: non_blank(raw.category),
        origin: non_blank(raw.origin),
        carat,
        price: parse_price(raw.price.as_ref()),
        currency: non_blank(raw.currency)
            .map_or_else(|| DEFAULT_CURRENCY.to_string(), |c| c.to_uppercase()),
        images,
        description: non_blank(raw.description),
        available: raw.available.unwrap_or(true),
    })
}

/// Normalizes a batch, skipping (and logging) rejected documents.
#[must_use]
pub fn normalize_stones(raw: Vec<RawStoneDocument>) -> Vec<StoneRecord> {
    raw.into_iter()
        .filter_map(|doc| match normalize_stone(doc) {
            Ok(stone) => Some(stone),
            Err(e) => {
                tracing::warn!(error = %e, "skipping stone document");
                None
            }
        })
        .collect()
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
