//! The editing session's invoice, owned in one place.
//!
//! Editors receive `&mut InvoiceStore`. Every mutation runs inside `transact`,
//! which recomputes derived totals afterwards.

use chrono::Local;
use rust_decimal::Decimal;
use tracing::debug;

use crate::id::{DEFAULT_PREFIX, generate_invoice_id};
use crate::input::clamp_amount;
use crate::model::{ClientInfoPatch, Invoice, Product, ProductPatch};

#[derive(Debug, Clone)]
pub struct InvoiceStore {
    invoice: Invoice,
    id_prefix: String,
}

impl Default for InvoiceStore {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX)
    }
}

impl InvoiceStore {
    pub fn new(id_prefix: impl Into<String>) -> Self {
        let id_prefix = id_prefix.into();
        let invoice = fresh_invoice(&id_prefix);
        Self { invoice, id_prefix }
    }

    pub fn invoice(&self) -> &Invoice {
        &self.invoice
    }

    fn transact<R>(&mut self, edit: impl FnOnce(&mut Invoice) -> R) -> R {
        let result = edit(&mut self.invoice);
        self.invoice.recompute();
        result
    }

    /// Append a blank line item and return its id.
    pub fn add_product(&mut self) -> String {
        let product = Product::blank();
        let id = product.id.clone();
        self.transact(|inv| inv.products.push(product));
        debug!(product = %id, "added line item");
        id
    }

    /// Returns `false` when no line item has this id.
    pub fn update_product(&mut self, id: &str, patch: ProductPatch) -> bool {
        let found = self.transact(|inv| match inv.products.iter_mut().find(|p| p.id == id) {
            Some(product) => {
                product.apply(patch);
                true
            }
            None => false,
        });
        debug!(product = %id, found, "updated line item");
        found
    }

    /// Removes the line item unless it is the last one left.
    pub fn remove_product(&mut self, id: &str) -> bool {
        let removed = self.transact(|inv| {
            if inv.products.len() <= 1 {
                return false;
            }
            let before = inv.products.len();
            inv.products.retain(|p| p.id != id);
            inv.products.len() != before
        });
        debug!(product = %id, removed, "remove line item");
        removed
    }

    pub fn update_client_info(&mut self, patch: ClientInfoPatch) {
        self.transact(|inv| inv.client_info.apply(patch));
    }

    pub fn update_shipping_cost(&mut self, amount: Decimal) {
        self.transact(|inv| inv.shipping_cost = clamp_amount(amount));
        debug!(shipping = %self.invoice.shipping_cost, "updated shipping");
    }

    pub fn update_logo(&mut self, logo_url: Option<String>) {
        self.transact(|inv| inv.logo_url = logo_url);
    }

    /// Discard the current invoice and start over with a new id and date.
    pub fn reset(&mut self) {
        let previous = std::mem::replace(&mut self.invoice, fresh_invoice(&self.id_prefix));
        debug!(previous = %previous.id, current = %self.invoice.id, "reset invoice");
    }
}

fn fresh_invoice(prefix: &str) -> Invoice {
    Invoice::new(generate_invoice_id(prefix), Local::now())
}
