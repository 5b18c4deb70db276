//! Preview rendering.
//!
//! [`InvoiceView`] is a read-only projection of an [`Invoice`] with blank fields
//! replaced by placeholder text and money/dates formatted for display. It feeds
//! both the terminal preview and the Typst document handed to the exporter.

use std::collections::HashMap;
use std::fmt::Write as _;

use comfy_table::{Attribute, Cell, CellAlignment, Table};
use serde::Serialize;
use tera::{Context, Tera, Value};
use tracing::warn;

use crate::config::Settings;
use crate::error::RenderError;
use crate::format::{format_currency, format_date};
use crate::logo::{DecodedLogo, decode_data_uri, read_logo};
use crate::model::{Invoice, Product};

const TEMPLATE_NAME: &str = "invoice.typ";
const TEMPLATE: &str = include_str!("../templates/invoice.typ.tera");

pub const PLACEHOLDER_CLIENT_NAME: &str = "Client Name";
pub const PLACEHOLDER_CLIENT_EMAIL: &str = "client@example.com";
pub const PLACEHOLDER_CLIENT_PHONE: &str = "(555) 123-4567";
pub const PLACEHOLDER_CLIENT_ADDRESS: &str = "Client Address";
pub const PLACEHOLDER_PRODUCT_NAME: &str = "Product Name";
pub const PLACEHOLDER_DETAILS: &str = "No details";

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct ClientView {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct LineView {
    pub name: String,
    pub details: String,
    pub quantity: u32,
    pub unit_price: String,
    pub total: String,
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct InvoiceView {
    pub id: String,
    pub date: String,
    pub has_logo: bool,
    pub client: ClientView,
    pub items: Vec<LineView>,
    pub subtotal: String,
    pub shipping: String,
    pub total: String,
    pub footer_note: String,
}

impl InvoiceView {
    pub fn new(invoice: &Invoice, footer_note: &str) -> Self {
        let client = &invoice.client_info;
        Self {
            id: invoice.id.clone(),
            date: format_date(&invoice.date),
            has_logo: invoice.logo_url.is_some(),
            client: ClientView {
                name: or_placeholder(&client.name, PLACEHOLDER_CLIENT_NAME),
                email: or_placeholder(&client.email, PLACEHOLDER_CLIENT_EMAIL),
                phone: or_placeholder(&client.phone, PLACEHOLDER_CLIENT_PHONE),
                address: or_placeholder(&client.address, PLACEHOLDER_CLIENT_ADDRESS),
            },
            items: invoice.products.iter().map(LineView::from).collect(),
            subtotal: format_currency(invoice.subtotal),
            shipping: format_currency(invoice.shipping_cost),
            total: format_currency(invoice.total),
            footer_note: footer_note.to_string(),
        }
    }
}

impl From<&Product> for LineView {
    fn from(product: &Product) -> Self {
        Self {
            name: or_placeholder(&product.name, PLACEHOLDER_PRODUCT_NAME),
            details: details(&product.fabric_type, &product.color),
            quantity: product.quantity,
            unit_price: format_currency(product.unit_price),
            total: format_currency(product.total),
        }
    }
}

fn or_placeholder(value: &str, placeholder: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() { placeholder.to_string() } else { trimmed.to_string() }
}

fn details(fabric_type: &str, color: &str) -> String {
    match (fabric_type.trim(), color.trim()) {
        ("", "") => PLACEHOLDER_DETAILS.to_string(),
        (fabric, "") => fabric.to_string(),
        ("", color) => color.to_string(),
        (fabric, color) => format!("{fabric}, {color}"),
    }
}

// ==========================================
// Terminal preview
// ==========================================

pub fn terminal_preview(view: &InvoiceView) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "🧾 {}    {}", view.id, view.date);
    let _ = writeln!(out, "   Logo: {}", if view.has_logo { "custom image" } else { "default" });
    let _ = writeln!(out);
    let _ = writeln!(out, "Bill To");
    for line in [&view.client.name, &view.client.email, &view.client.phone, &view.client.address] {
        let _ = writeln!(out, "  {line}");
    }
    let _ = writeln!(out);

    let mut table = Table::new();
    table.set_header(vec![
        Cell::new("Product"),
        Cell::new("Details"),
        Cell::new("Qty").set_alignment(CellAlignment::Right),
        Cell::new("Unit Price").set_alignment(CellAlignment::Right),
        Cell::new("Total").set_alignment(CellAlignment::Right),
    ]);
    for item in &view.items {
        table.add_row(vec![
            Cell::new(&item.name),
            Cell::new(&item.details),
            Cell::new(item.quantity).set_alignment(CellAlignment::Right),
            Cell::new(&item.unit_price).set_alignment(CellAlignment::Right),
            Cell::new(&item.total).set_alignment(CellAlignment::Right),
        ]);
    }
    table.add_row(vec![Cell::new(""), Cell::new(""), Cell::new(""), Cell::new("Subtotal:"), right(&view.subtotal)]);
    table.add_row(vec![Cell::new(""), Cell::new(""), Cell::new(""), Cell::new("Shipping:"), right(&view.shipping)]);
    table.add_row(vec![
        Cell::new(""),
        Cell::new(""),
        Cell::new(""),
        Cell::new("Total:").add_attribute(Attribute::Bold),
        right(&view.total).add_attribute(Attribute::Bold),
    ]);
    let _ = writeln!(out, "{table}");
    let _ = writeln!(out);
    let _ = write!(out, "{}", view.footer_note);
    out
}

fn right(text: &str) -> Cell {
    Cell::new(text).set_alignment(CellAlignment::Right)
}

// ==========================================
// Typst document
// ==========================================

/// A file the Typst source references, staged next to it at export time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Everything the exporter needs, detached from the live invoice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedInvoice {
    pub id: String,
    pub source: String,
    pub assets: Vec<Asset>,
}

pub fn render_document(invoice: &Invoice, settings: &Settings) -> Result<RenderedInvoice, RenderError> {
    let view = InvoiceView::new(invoice, &settings.footer_note);

    let logo = match &invoice.logo_url {
        Some(uri) => Some(decode_data_uri(uri)?),
        None => default_logo(settings),
    };
    let mut assets = Vec::new();
    let logo_file = match logo {
        Some(logo) => {
            let file_name = format!("logo.{}", logo.extension()?);
            assets.push(Asset {
                file_name: file_name.clone(),
                bytes: logo.bytes,
            });
            Some(file_name)
        }
        None => None,
    };

    let mut tera = Tera::default();
    tera.add_raw_template(TEMPLATE_NAME, TEMPLATE)?;
    tera.register_filter("typst_str", typst_str_filter);

    let mut context = Context::new();
    context.insert("invoice", &view);
    context.insert("logo_file", &logo_file);
    context.insert("company_name", &settings.company_name);
    let source = tera.render(TEMPLATE_NAME, &context)?;

    Ok(RenderedInvoice {
        id: invoice.id.clone(),
        source,
        assets,
    })
}

fn default_logo(settings: &Settings) -> Option<DecodedLogo> {
    let path = settings.default_logo_path()?;
    match read_logo(&path) {
        Ok(logo) => Some(logo),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "default logo unavailable, using company name");
            None
        }
    }
}

fn typst_str_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let text = match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    };
    Ok(Value::String(typst_string_literal(&text)))
}

/// Quote `text` as a Typst string literal so user input is never read as markup.
pub fn typst_string_literal(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => {}
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
