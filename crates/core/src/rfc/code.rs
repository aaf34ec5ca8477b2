//! Sequential catalog codes: `RFC001`, `RFC002`, ...
//!
//! Codes are unique per hotel and product type. Soft-deleted products keep
//! their code, and the next code is always derived from the highest number
//! ever issued, so a deleted code is never handed out again.

use crate::rfc::product::ProductType;

/// Format a code from its type prefix and number (zero-padded to 3 digits).
pub fn format_code(product_type: ProductType, number: u32) -> String {
    format!("{}{:03}", product_type.as_str(), number)
}

/// Extract the numeric suffix of a code of the given type.
///
/// Returns `None` for codes of another type or without a numeric suffix.
pub fn parse_code_number(product_type: ProductType, code: &str) -> Option<u32> {
    let digits = code.strip_prefix(product_type.as_str())?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Highest numeric suffix among `codes`, or 0 when none parse.
pub fn max_code_number<'a>(product_type: ProductType, codes: impl IntoIterator<Item = &'a str>) -> u32 {
    codes
        .into_iter()
        .filter_map(|code| parse_code_number(product_type, code))
        .max()
        .unwrap_or(0)
}

/// Issues codes for one pass.
///
/// Seeded once from the persisted maximum (tombstones included), then each
/// call chains from the previously issued code.
#[derive(Debug, Clone)]
pub struct CodeSequence {
    product_type: ProductType,
    last: u32,
}

impl CodeSequence {
    /// Start after the highest number already issued.
    pub fn after(product_type: ProductType, max_issued: u32) -> Self {
        Self {
            product_type,
            last: max_issued,
        }
    }

    /// Resume from a code issued earlier in the same pass.
    pub fn resume(product_type: ProductType, last_code: &str) -> Self {
        Self::after(
            product_type,
            parse_code_number(product_type, last_code).unwrap_or(0),
        )
    }

    /// Issue the next code.
    pub fn next_code(&mut self) -> String {
        self.last += 1;
        format_code(self.product_type, self.last)
    }

    /// The most recently issued number (or the seed if none was issued).
    pub fn last_number(&self) -> u32 {
        self.last
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_pads_to_three_digits() {
        assert_eq!(format_code(ProductType::Rfc, 7), "RFC007");
        assert_eq!(format_code(ProductType::Mrfc, 42), "MRFC042");
        assert_eq!(format_code(ProductType::Rfc, 1234), "RFC1234");
    }

    #[test]
    fn parse_only_accepts_matching_prefix() {
        assert_eq!(parse_code_number(ProductType::Rfc, "RFC012"), Some(12));
        assert_eq!(parse_code_number(ProductType::Rfc, "MRFC012"), None);
        assert_eq!(parse_code_number(ProductType::Rfc, "RFC"), None);
        assert_eq!(parse_code_number(ProductType::Rfc, "RFC01A"), None);
    }

    #[test]
    fn deleted_codes_are_never_reused() {
        // RFC002 is soft-deleted but still counted by the max lookup.
        let codes = ["RFC001", "RFC003", "RFC002"];
        let mut seq = CodeSequence::after(ProductType::Rfc, max_code_number(ProductType::Rfc, codes));
        assert_eq!(seq.next_code(), "RFC004");
    }

    #[test]
    fn sequence_is_contiguous_within_a_pass() {
        let mut seq = CodeSequence::after(ProductType::Rfc, 9);
        assert_eq!(seq.next_code(), "RFC010");
        assert_eq!(seq.next_code(), "RFC011");
        assert_eq!(seq.last_number(), 11);
    }

    #[test]
    fn resume_increments_the_last_issued_code() {
        let mut seq = CodeSequence::resume(ProductType::Rfc, "RFC041");
        assert_eq!(seq.next_code(), "RFC042");
    }

    #[test]
    fn first_code_for_empty_hotel() {
        let mut seq = CodeSequence::after(ProductType::Rfc, max_code_number(ProductType::Rfc, []));
        assert_eq!(seq.next_code(), "RFC001");
    }
}
