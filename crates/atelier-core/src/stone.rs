use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub const DEFAULT_CURRENCY: &str = "USD";

/// A gemstone listed in the catalog, already validated at the content-store
/// boundary.
///
/// Records are read-only snapshots of whatever the content store returned
/// for the current request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoneRecord {
    /// Content-store document id, opaque to the site.
    pub id: String,
    pub name: String,
    /// URL slug, when the editor set one.
    pub slug: Option<String>,
    /// Stone family as typed by editors, e.g. `"Blue Sapphire"`.
    pub category: Option<String>,
    /// Mining origin, e.g. `"Sri Lanka"`. Surfaced in the UI as "location".
    pub origin: Option<String>,
    pub carat: Option<f64>,
    /// Published price. `None` means "price on request".
    pub price: Option<Decimal>,
    /// ISO 4217 code for `price`.
    pub currency: String,
    /// Image asset references in display order; the first is the cover.
    pub images: Vec<String>,
    pub description: Option<String>,
    pub available: bool,
}

impl StoneRecord {
    /// Creates an available record with only identity fields set.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            slug: None,
            category: None,
            origin: None,
            carat: None,
            price: None,
            currency: DEFAULT_CURRENCY.to_string(),
            images: Vec::new(),
            description: None,
            available: true,
        }
    }

    #[must_use]
    pub fn cover_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }

    #[must_use]
    pub fn price_display(&self) -> PriceDisplay {
        match self.price {
            Some(amount) => PriceDisplay::Amount {
                currency: self.currency.clone(),
                amount,
            },
            None => PriceDisplay::OnRequest,
        }
    }

    /// Returns `true` when `key` equals the record id or its slug.
    #[must_use]
    pub fn is_identified_by(&self, key: &str) -> bool {
        self.id == key || self.slug.as_deref() == Some(key)
    }
}

/// Human-facing price label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PriceDisplay {
    Amount { currency: String, amount: Decimal },
    OnRequest,
}

impl std::fmt::Display for PriceDisplay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PriceDisplay::Amount { currency, amount } => {
                write!(f, "{currency} {}", format_amount(*amount))
            }
            PriceDisplay::OnRequest => write!(f, "Price on request"),
        }
    }
}

/// Formats an amount with thousands separators, keeping cents only when
/// they are non-zero: `12000` -> `12,000`, `1250.5` -> `1,250.50`.
fn format_amount(amount: Decimal) -> String {
    let fixed = format!("{:.2}", amount.round_dp(2));
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let (sign, digits) = match whole.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", whole),
    };

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if cents == "00" {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped}.{cents}")
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn price(raw: &str) -> Decimal {
        Decimal::from_str(raw).expect("decimal")
    }

    #[test]
    fn price_display_groups_thousands() {
        let mut stone = StoneRecord::new("s1", "Ceylon Blue Sapphire");
        stone.price = Some(price("12000"));
        assert_eq!(stone.price_display().to_string(), "USD 12,000");
    }

    #[test]
    fn price_display_keeps_non_zero_cents() {
        let mut stone = StoneRecord::new("s1", "Padparadscha");
        stone.price = Some(price("1250.5"));
        assert_eq!(stone.price_display().to_string(), "USD 1,250.50");
    }

    #[test]
    fn price_display_small_and_million_amounts() {
        assert_eq!(format_amount(price("950")), "950");
        assert_eq!(format_amount(price("1000000")), "1,000,000");
        assert_eq!(format_amount(price("999.999")), "1,000");
    }

    #[test]
    fn missing_price_is_on_request() {
        let stone = StoneRecord::new("s1", "Star Ruby");
        assert_eq!(stone.price_display(), PriceDisplay::OnRequest);
        assert_eq!(stone.price_display().to_string(), "Price on request");
    }

    #[test]
    fn price_display_uses_record_currency() {
        let mut stone = StoneRecord::new("s1", "Spinel");
        stone.price = Some(price("4800"));
        stone.currency = "LKR".to_string();
        assert_eq!(stone.price_display().to_string(), "LKR 4,800");
    }

    #[test]
    fn cover_image_is_first_reference() {
        let mut stone = StoneRecord::new("s1", "Spinel");
        assert!(stone.cover_image().is_none());
        stone.images = vec!["image-a-10x10-jpg".into(), "image-b-10x10-jpg".into()];
        assert_eq!(stone.cover_image(), Some("image-a-10x10-jpg"));
    }

    #[test]
    fn identified_by_id_or_slug() {
        let mut stone = StoneRecord::new("doc-1", "Spinel");
        stone.slug = Some("pink-spinel".into());
        assert!(stone.is_identified_by("doc-1"));
        assert!(stone.is_identified_by("pink-spinel"));
        assert!(!stone.is_identified_by("ruby"));
    }

    #[test]
    fn serde_roundtrip_keeps_price_as_string() {
        let mut stone = StoneRecord::new("s1", "Ruby");
        stone.price = Some(price("1500.25"));
        let json = serde_json::to_value(&stone).expect("serialize");
        assert_eq!(json["price"], "1500.25");
        let back: StoneRecord = serde_json::from_value(json).expect("deserialize");
        assert_eq!(back, stone);
    }
}
