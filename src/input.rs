//! Normalization of raw numeric entry.
//!
//! Blank, unparseable, negative or non-finite input becomes zero and amounts
//! above [`MAX_AMOUNT`] are capped. Nothing here reports an error; bad numbers
//! are absorbed at the point of entry.

use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};

/// Largest unit price or shipping cost accepted. Keeps every invoice total far
/// below `Decimal::MAX`, so `total == subtotal + shipping` cannot saturate.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

pub fn parse_quantity(raw: &str) -> u32 {
    let trimmed = raw.trim();
    if let Ok(n) = trimmed.parse::<i64>() {
        return n.clamp(0, i64::from(u32::MAX)) as u32;
    }
    // "2.7" keeps its integer part, like a browser number field would.
    match parse_decimal(trimmed) {
        Some(d) if d > Decimal::ZERO => d.trunc().to_u32().unwrap_or(u32::MAX),
        _ => 0,
    }
}

/// Whether the quantity editor should accept `raw`: blank, or a whole number ≥ 1.
pub fn is_valid_quantity_entry(raw: &str) -> bool {
    let trimmed = raw.trim();
    trimmed.is_empty() || trimmed.parse::<u32>().is_ok_and(|n| n >= 1)
}

pub fn parse_amount(raw: &str) -> Decimal {
    parse_decimal(raw.trim()).map_or(Decimal::ZERO, clamp_amount)
}

pub fn amount_from_f64(value: f64) -> Decimal {
    if !value.is_finite() {
        return Decimal::ZERO;
    }
    Decimal::from_f64(value).map_or(Decimal::ZERO, clamp_amount)
}

pub fn clamp_amount(amount: Decimal) -> Decimal {
    amount.clamp(Decimal::ZERO, MAX_AMOUNT)
}

fn parse_decimal(raw: &str) -> Option<Decimal> {
    let cleaned: String = raw
        .trim_start_matches('$')
        .chars()
        .filter(|c| *c != ',')
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    Decimal::from_str(&cleaned)
        .or_else(|_| Decimal::from_scientific(&cleaned))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity("3"), 3);
        assert_eq!(parse_quantity(" 12 "), 12);
        assert_eq!(parse_quantity(""), 0);
        assert_eq!(parse_quantity("abc"), 0);
        assert_eq!(parse_quantity("-4"), 0);
        assert_eq!(parse_quantity("2.7"), 2);
        assert_eq!(parse_quantity("99999999999"), u32::MAX);
    }

    #[test]
    fn test_quantity_entry_validation() {
        assert!(is_valid_quantity_entry(""));
        assert!(is_valid_quantity_entry("1"));
        assert!(is_valid_quantity_entry(" 40 "));
        assert!(!is_valid_quantity_entry("0"));
        assert!(!is_valid_quantity_entry("-1"));
        assert!(!is_valid_quantity_entry("1.5"));
        assert!(!is_valid_quantity_entry("lots"));
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("10.00"), dec!(10.00));
        assert_eq!(parse_amount("$1,250.5"), dec!(1250.5));
        assert_eq!(parse_amount(""), Decimal::ZERO);
        assert_eq!(parse_amount("NaN"), Decimal::ZERO);
        assert_eq!(parse_amount("free"), Decimal::ZERO);
        assert_eq!(parse_amount("-5"), Decimal::ZERO);
        assert_eq!(parse_amount("1e2"), dec!(100));
    }

    #[test]
    fn test_amounts_are_capped() {
        assert_eq!(MAX_AMOUNT, dec!(1000000000));
        assert_eq!(parse_amount("999999999999"), MAX_AMOUNT);
        assert_eq!(parse_amount("79228162514264337593543950335"), MAX_AMOUNT);
        assert_eq!(amount_from_f64(1e20), MAX_AMOUNT);
        assert_eq!(clamp_amount(Decimal::MAX), MAX_AMOUNT);
        assert_eq!(clamp_amount(dec!(12.34)), dec!(12.34));
    }

    #[test]
    fn test_amount_from_f64() {
        assert_eq!(amount_from_f64(5.0), dec!(5));
        assert_eq!(amount_from_f64(0.1), dec!(0.1));
        assert_eq!(amount_from_f64(f64::NAN), Decimal::ZERO);
        assert_eq!(amount_from_f64(f64::INFINITY), Decimal::ZERO);
        assert_eq!(amount_from_f64(-3.5), Decimal::ZERO);
    }
}
