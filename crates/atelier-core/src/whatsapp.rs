//! Pre-filled `wa.me` links.

use std::fmt::Write as _;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::stone::StoneRecord;

/// Characters left as-is by JavaScript's `encodeURIComponent`.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Builds `https://wa.me/{digits}?text={message}`.
///
/// Everything but ASCII digits is dropped from `phone`, so `+94 77-123 4567`
/// and `94771234567` produce the same link.
#[must_use]
pub fn whatsapp_link(phone: &str, message: &str) -> String {
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
    format!(
        "https://wa.me/{digits}?text={}",
        utf8_percent_encode(message, COMPONENT)
    )
}

/// Message used by the "Enquire on WhatsApp" button on a stone page.
#[must_use]
pub fn stone_enquiry_message(stone: &StoneRecord) -> String {
    let mut message = format!("Hello, I am interested in the {}", stone.name);
    if let Some(carat) = stone.carat {
        let _ = write!(message, " ({carat} ct)");
    }
    if let Some(origin) = stone.origin.as_deref().filter(|o| !o.trim().is_empty()) {
        let _ = write!(message, " from {origin}");
    }
    let _ = write!(
        message,
        ".\nPrice: {}\nReference: {}",
        stone.price_display(),
        stone.id
    );
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_non_digits_from_phone() {
        let url = whatsapp_link("+94 (77) 123-4567", "hi");
        assert_eq!(url, "https://wa.me/94771234567?text=hi");
    }

    #[test]
    fn encodes_like_encode_uri_component() {
        let url = whatsapp_link("1", "Ruby & Spinel: 2.5ct (oval)!\nThanks ~*'");
        assert_eq!(
            url,
            "https://wa.me/1?text=Ruby%20%26%20Spinel%3A%202.5ct%20(oval)!%0AThanks%20~*'"
        );
    }

    #[test]
    fn encodes_non_ascii_as_utf8() {
        let url = whatsapp_link("1", "pavé");
        assert_eq!(url, "https://wa.me/1?text=pav%C3%A9");
    }

    #[test]
    fn stone_message_with_all_fields() {
        let mut stone = StoneRecord::new("doc-1", "Ceylon Blue Sapphire");
        stone.carat = Some(3.2);
        stone.origin = Some("Sri Lanka".into());
        stone.price = Some(rust_decimal::Decimal::new(12_000, 0));
        let message = stone_enquiry_message(&stone);
        assert_eq!(
            message,
            "Hello, I am interested in the Ceylon Blue Sapphire (3.2 ct) from Sri Lanka.\nPrice: USD 12,000\nReference: doc-1"
        );
    }

    #[test]
    fn stone_message_without_optional_fields() {
        let stone = StoneRecord::new("doc-2", "Star Ruby");
        let message = stone_enquiry_message(&stone);
        assert!(!message.contains("()"));
        assert!(!message.contains(" from "));
        assert!(message.contains("Price on request"));
    }
}
