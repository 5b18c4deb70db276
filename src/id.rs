use chrono::Utc;
use rand::Rng;
use uuid::Uuid;

pub const DEFAULT_PREFIX: &str = "INV";

/// Human-distinguishable invoice id: `PREFIX-<last 6 digits of epoch millis>-<4 random digits>`.
///
/// Not collision-proof; two invoices created in the same millisecond can share an id.
pub fn generate_invoice_id(prefix: &str) -> String {
    let millis = Utc::now().timestamp_millis();
    let random = rand::rng().random_range(0..10_000);
    invoice_id_from_parts(prefix, millis, random)
}

pub fn invoice_id_from_parts(prefix: &str, millis: i64, random: u32) -> String {
    format!("{}-{:06}-{:04}", prefix, millis.rem_euclid(1_000_000), random % 10_000)
}

pub fn generate_product_id() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use regex::Regex;

    #[test]
    fn test_invoice_id_format() {
        let re = Regex::new(r"^INV-\d{6}-\d{4}$").unwrap();
        for _ in 0..50 {
            let id = generate_invoice_id(DEFAULT_PREFIX);
            assert!(re.is_match(&id), "unexpected id {id}");
        }
    }

    #[test]
    fn test_invoice_id_uses_trailing_millis_digits() {
        assert_eq!(invoice_id_from_parts("INV", 1_760_812_345_678, 42), "INV-345678-0042");
        assert_eq!(invoice_id_from_parts("NF", 12, 9999), "NF-000012-9999");
    }

    #[test]
    fn test_product_ids_are_unique() {
        let a = generate_product_id();
        let b = generate_product_id();
        assert_ne!(a, b);
    }
}
