use chrono::{DateTime, Local};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::id::generate_product_id;
use crate::input::clamp_amount;

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct ClientInfo {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    pub fabric_type: String,
    pub color: String,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub total: Decimal, // derived: quantity * unit_price
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: String,
    pub date: DateTime<Local>,
    pub products: Vec<Product>, // never empty
    pub client_info: ClientInfo,
    pub shipping_cost: Decimal,
    pub logo_url: Option<String>, // data URI
    pub subtotal: Decimal,        // derived
    pub total: Decimal,           // derived
}

/// Field changes for one line item. `None` leaves the field as it is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub fabric_type: Option<String>,
    pub color: Option<String>,
    pub quantity: Option<u32>,
    pub unit_price: Option<Decimal>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientInfoPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

impl Product {
    pub fn blank() -> Self {
        Self {
            id: generate_product_id(),
            name: String::new(),
            fabric_type: String::new(),
            color: String::new(),
            quantity: 1,
            unit_price: Decimal::ZERO,
            total: Decimal::ZERO,
        }
    }

    pub fn apply(&mut self, patch: ProductPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(fabric_type) = patch.fabric_type {
            self.fabric_type = fabric_type;
        }
        if let Some(color) = patch.color {
            self.color = color;
        }
        if let Some(quantity) = patch.quantity {
            self.quantity = quantity;
        }
        if let Some(unit_price) = patch.unit_price {
            self.unit_price = clamp_amount(unit_price);
        }
    }

    pub fn line_total(&self) -> Decimal {
        Decimal::from(self.quantity)
            .checked_mul(clamp_amount(self.unit_price))
            .unwrap_or(Decimal::MAX)
    }
}

impl ClientInfo {
    pub fn apply(&mut self, patch: ClientInfoPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(email) = patch.email {
            self.email = email;
        }
        if let Some(phone) = patch.phone {
            self.phone = phone;
        }
        if let Some(address) = patch.address {
            self.address = address;
        }
    }
}

impl Invoice {
    /// A fresh invoice: one blank line item, blank client, no shipping, no logo.
    pub fn new(id: String, date: DateTime<Local>) -> Self {
        let mut invoice = Self {
            id,
            date,
            products: vec![Product::blank()],
            client_info: ClientInfo::default(),
            shipping_cost: Decimal::ZERO,
            logo_url: None,
            subtotal: Decimal::ZERO,
            total: Decimal::ZERO,
        };
        invoice.recompute();
        invoice
    }

    pub fn product(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// Refresh every derived field from the current inputs. Idempotent.
    pub fn recompute(&mut self) {
        for product in &mut self.products {
            product.total = product.line_total();
        }
        self.subtotal = self
            .products
            .iter()
            .fold(Decimal::ZERO, |sum, p| sum.checked_add(p.total).unwrap_or(Decimal::MAX));
        self.total = self
            .subtotal
            .checked_add(clamp_amount(self.shipping_cost))
            .unwrap_or(Decimal::MAX);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::MAX_AMOUNT;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn invoice() -> Invoice {
        Invoice::new("INV-000001-0001".to_string(), Local::now())
    }

    #[test]
    fn test_new_invoice_has_one_blank_product() {
        let inv = invoice();
        assert_eq!(inv.products.len(), 1);
        let p = &inv.products[0];
        assert_eq!(p.quantity, 1);
        assert_eq!(p.unit_price, Decimal::ZERO);
        assert!(p.name.is_empty() && p.fabric_type.is_empty() && p.color.is_empty());
        assert_eq!(inv.client_info, ClientInfo::default());
        assert_eq!(inv.logo_url, None);
        assert_eq!(inv.subtotal, Decimal::ZERO);
        assert_eq!(inv.total, Decimal::ZERO);
    }

    #[test]
    fn test_recompute_single_line_with_shipping() {
        let mut inv = invoice();
        inv.products[0].quantity = 3;
        inv.products[0].unit_price = dec!(10.00);
        inv.recompute();
        assert_eq!(inv.products[0].total, dec!(30.00));

        inv.shipping_cost = dec!(5.00);
        inv.recompute();
        assert_eq!(inv.subtotal, dec!(30.00));
        assert_eq!(inv.total, dec!(35.00));
    }

    #[test]
    fn test_recompute_two_lines_no_shipping() {
        let mut inv = invoice();
        inv.products[0].quantity = 2;
        inv.products[0].unit_price = dec!(5.00);
        let mut second = Product::blank();
        second.unit_price = dec!(20.00);
        inv.products.push(second);
        inv.recompute();
        assert_eq!(inv.subtotal, dec!(30.00));
        assert_eq!(inv.total, dec!(30.00));
    }

    #[test]
    fn test_recompute_overwrites_stale_totals() {
        let mut inv = invoice();
        inv.products[0].total = dec!(999);
        inv.subtotal = dec!(999);
        inv.total = dec!(999);
        inv.recompute();
        assert_eq!(inv.products[0].total, Decimal::ZERO);
        assert_eq!(inv.total, Decimal::ZERO);
    }

    #[test]
    fn test_recompute_is_idempotent() {
        let mut inv = invoice();
        inv.products[0].quantity = 7;
        inv.products[0].unit_price = dec!(1.15);
        inv.shipping_cost = dec!(2.5);
        inv.recompute();
        let once = inv.clone();
        inv.recompute();
        inv.recompute();
        assert_eq!(inv, once);
    }

    #[test]
    fn test_negative_inputs_count_as_zero() {
        let mut inv = invoice();
        inv.products[0].quantity = 4;
        inv.products[0].unit_price = dec!(-3);
        inv.shipping_cost = dec!(-10);
        inv.recompute();
        assert_eq!(inv.products[0].total, Decimal::ZERO);
        assert_eq!(inv.subtotal, Decimal::ZERO);
        assert_eq!(inv.total, Decimal::ZERO);
    }

    #[test]
    fn test_huge_prices_keep_total_equal_to_subtotal_plus_shipping() {
        let mut inv = invoice();
        inv.products[0].quantity = 2;
        inv.products[0].apply(ProductPatch {
            unit_price: Some(Decimal::MAX),
            ..Default::default()
        });
        inv.shipping_cost = dec!(1);
        inv.recompute();
        assert_eq!(inv.products[0].unit_price, MAX_AMOUNT);
        assert_eq!(inv.subtotal, MAX_AMOUNT * dec!(2));
        assert_eq!(inv.total, inv.subtotal + dec!(1));

        // a stored price that skipped the patch is capped when totalled
        inv.products[0].unit_price = Decimal::MAX;
        inv.shipping_cost = Decimal::MAX;
        inv.recompute();
        assert_eq!(inv.subtotal, MAX_AMOUNT * dec!(2));
        assert_eq!(inv.total, inv.subtotal + MAX_AMOUNT);
    }

    #[test]
    fn test_product_patch_only_touches_given_fields() {
        let mut p = Product::blank();
        p.name = "Scarf".to_string();
        p.apply(ProductPatch {
            color: Some("Teal".to_string()),
            unit_price: Some(dec!(-1)),
            ..Default::default()
        });
        assert_eq!(p.name, "Scarf");
        assert_eq!(p.color, "Teal");
        assert_eq!(p.quantity, 1);
        assert_eq!(p.unit_price, Decimal::ZERO);
    }

    #[test]
    fn test_client_patch_merges() {
        let mut c = ClientInfo {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            ..Default::default()
        };
        c.apply(ClientInfoPatch {
            phone: Some("555-0100".to_string()),
            ..Default::default()
        });
        assert_eq!(c.name, "Ada");
        assert_eq!(c.email, "ada@example.com");
        assert_eq!(c.phone, "555-0100");
        assert_eq!(c.address, "");
    }

    #[test]
    fn test_serializes_with_camel_case_keys() {
        let inv = invoice();
        let json = serde_json::to_value(&inv).unwrap();
        assert!(json.get("clientInfo").is_some());
        assert!(json.get("shippingCost").is_some());
        assert_eq!(json["products"][0]["unitPrice"], "0");
    }
}
