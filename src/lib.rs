//! # noblefit-invoice
//!
//! Build an invoice for a client, watch the totals follow every edit, preview
//! it in the terminal and export it to PDF through Typst.
//!
//! The [`store::InvoiceStore`] owns the invoice being edited and keeps its
//! derived totals current; [`render`] projects it for display; [`export`]
//! turns the rendered document into a file.

pub mod config;
pub mod error;
pub mod export;
pub mod format;
pub mod id;
pub mod input;
pub mod logo;
pub mod model;
pub mod render;
pub mod store;

pub use error::{ConfigError, ExportError, LogoError, RenderError};
pub use model::{ClientInfo, ClientInfoPatch, Invoice, Product, ProductPatch};
pub use store::InvoiceStore;
