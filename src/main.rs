use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;

use clap::{Parser, Subcommand};
use inquire::validator::Validation;
use inquire::{Confirm, CustomUserError, InquireError, Select, Text};
use rust_decimal::Decimal;
use tracing::{error, warn};

use noblefit_invoice::config::{self, Settings};
use noblefit_invoice::export::{ExportFormat, Exporter};
use noblefit_invoice::format::format_currency;
use noblefit_invoice::model::{ClientInfoPatch, Invoice, ProductPatch};
use noblefit_invoice::{input, logo, render, InvoiceStore};

// ==========================================
// Constants
// ==========================================
const LOGO_FROM_PATH: &str = "⌨️  Type or drop a file path";
const LOGO_FROM_PICKER: &str = "📂 Browse...";
const RESET_PROMPT: &str = "Are you sure you want to create a new invoice? This will reset all current data.";

// ==========================================
// CLI
// ==========================================

#[derive(Parser)]
#[command(name = "noblefit-invoice", version, about = "Create invoices and export them as PDF")]
struct Cli {
    /// Write exported files here instead of the configured directory
    #[arg(long, value_name = "DIR", global = true)]
    output_dir: Option<PathBuf>,

    /// Don't open exported files
    #[arg(long, global = true)]
    no_open: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start editing a new invoice (default)
    Edit,
    /// Configure output directory and branding
    Config,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    EditClient,
    AddItem,
    EditItem,
    RemoveItem,
    SetShipping,
    SetLogo,
    ClearLogo,
    Preview,
    ShowJson,
    ExportPdf,
    ExportPng,
    NewInvoice,
    Quit,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Action::EditClient => "👤 Edit client (Bill To)",
            Action::AddItem => "➕ Add item",
            Action::EditItem => "✏️  Edit item",
            Action::RemoveItem => "🗑️  Remove item",
            Action::SetShipping => "🚚 Set shipping cost",
            Action::SetLogo => "🖼️  Set logo",
            Action::ClearLogo => "🧹 Clear logo",
            Action::Preview => "👀 Preview",
            Action::ShowJson => "🧾 Show as JSON",
            Action::ExportPdf => "📄 Download PDF",
            Action::ExportPng => "🖨️  Export PNG",
            Action::NewInvoice => "✨ New invoice",
            Action::Quit => "🚪 Quit",
        };
        f.write_str(label)
    }
}

struct ItemChoice {
    id: String,
    label: String,
}

impl fmt::Display for ItemChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

// ==========================================
// Main Function
// ==========================================

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse();

    let mut settings = match config::load() {
        Ok(settings) => settings,
        Err(e) => {
            warn!(error = %e, "falling back to default settings");
            eprintln!("⚠️  {e} (using defaults)");
            Settings::default()
        }
    };
    if let Some(dir) = &cli.output_dir {
        settings.output_dir = dir.to_string_lossy().into_owned();
    }

    match cli.command.unwrap_or(Commands::Edit) {
        Commands::Edit => run_session(&settings, !cli.no_open).await,
        Commands::Config => match setup_config_wizard(settings) {
            Ok(_) => {}
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => {
                println!("Cancelled, settings unchanged.");
            }
            Err(e) => eprintln!("❌ {e}"),
        },
    }
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "noblefit_invoice=warn".into());
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

// ==========================================
// 1. Editing Session
// ==========================================

async fn run_session(settings: &Settings, open_exports: bool) {
    let mut store = InvoiceStore::new(settings.id_prefix.clone());
    println!("🧾 Started invoice {}", store.invoice().id);

    loop {
        print_status(store.invoice());

        let action = match Select::new("What next?", menu_for(store.invoice()))
            .with_page_size(13)
            .prompt()
        {
            Ok(action) => action,
            Err(InquireError::OperationCanceled) => continue,
            Err(InquireError::OperationInterrupted) => break,
            Err(e) => {
                error!(error = %e, "menu prompt failed");
                eprintln!("❌ {e}");
                break;
            }
        };

        let result = match action {
            Action::EditClient => edit_client(&mut store),
            Action::AddItem => add_item(&mut store),
            Action::EditItem => edit_item(&mut store),
            Action::RemoveItem => remove_item(&mut store),
            Action::SetShipping => set_shipping(&mut store),
            Action::SetLogo => set_logo(&mut store),
            Action::ClearLogo => {
                store.update_logo(None);
                println!("🧹 Logo cleared.");
                Ok(())
            }
            Action::Preview => {
                preview(store.invoice(), settings);
                Ok(())
            }
            Action::ShowJson => {
                show_json(store.invoice());
                Ok(())
            }
            Action::ExportPdf => {
                export(store.invoice(), settings, ExportFormat::Pdf, open_exports).await;
                Ok(())
            }
            Action::ExportPng => {
                export(store.invoice(), settings, ExportFormat::Png, open_exports).await;
                Ok(())
            }
            Action::NewInvoice => new_invoice(&mut store),
            Action::Quit => break,
        };

        match result {
            Ok(()) => {}
            Err(InquireError::OperationCanceled) => println!("↩️  Cancelled."),
            Err(InquireError::OperationInterrupted) => break,
            Err(e) => {
                error!(error = %e, "prompt failed");
                eprintln!("❌ {e}");
                break;
            }
        }
    }
    println!("👋 Bye.");
}

fn menu_for(invoice: &Invoice) -> Vec<Action> {
    let mut actions = vec![Action::EditClient, Action::AddItem, Action::EditItem];
    if invoice.products.len() > 1 {
        actions.push(Action::RemoveItem);
    }
    actions.extend([Action::SetShipping, Action::SetLogo]);
    if invoice.logo_url.is_some() {
        actions.push(Action::ClearLogo);
    }
    actions.extend([
        Action::Preview,
        Action::ShowJson,
        Action::ExportPdf,
        Action::ExportPng,
        Action::NewInvoice,
        Action::Quit,
    ]);
    actions
}

fn print_status(invoice: &Invoice) {
    let items = invoice.products.len();
    println!(
        "\n🧾 {} | {} item{} | Subtotal {} | Shipping {} | Total {}",
        invoice.id,
        items,
        if items == 1 { "" } else { "s" },
        format_currency(invoice.subtotal),
        format_currency(invoice.shipping_cost),
        format_currency(invoice.total),
    );
}

// ==========================================
// 2. Client & Product Editors
// ==========================================

fn edit_client(store: &mut InvoiceStore) -> Result<(), InquireError> {
    println!("\n--- Bill To ---");
    let current = store.invoice().client_info.clone();

    let name = Text::new("Client Name:")
        .with_initial_value(&current.name)
        .with_placeholder("Enter client name")
        .prompt()?;
    let email = Text::new("Email:")
        .with_initial_value(&current.email)
        .with_placeholder("client@example.com")
        .prompt()?;
    let phone = Text::new("Phone:")
        .with_initial_value(&current.phone)
        .with_placeholder("(555) 123-4567")
        .prompt()?;
    let address = Text::new("Address:")
        .with_initial_value(&current.address)
        .with_placeholder("Enter client address")
        .prompt()?;

    store.update_client_info(ClientInfoPatch {
        name: Some(name),
        email: Some(email),
        phone: Some(phone),
        address: Some(address),
    });
    println!("✅ Client updated.");
    Ok(())
}

fn add_item(store: &mut InvoiceStore) -> Result<(), InquireError> {
    let id = store.add_product();
    println!("\n--- New Item #{} ---", store.invoice().products.len());
    edit_item_fields(store, &id)
}

fn edit_item(store: &mut InvoiceStore) -> Result<(), InquireError> {
    let choice = Select::new("Which item?", item_choices(store.invoice())).prompt()?;
    edit_item_fields(store, &choice.id)
}

fn remove_item(store: &mut InvoiceStore) -> Result<(), InquireError> {
    if store.invoice().products.len() <= 1 {
        println!("⚠️  An invoice needs at least one item.");
        return Ok(());
    }
    let choice = Select::new("Remove which item?", item_choices(store.invoice())).prompt()?;
    if store.remove_product(&choice.id) {
        println!("🗑️  Removed {}.", choice.label);
    }
    Ok(())
}

fn item_choices(invoice: &Invoice) -> Vec<ItemChoice> {
    invoice
        .products
        .iter()
        .enumerate()
        .map(|(i, p)| ItemChoice {
            id: p.id.clone(),
            label: format!(
                "{}. {} ({} × {} = {})",
                i + 1,
                if p.name.trim().is_empty() { render::PLACEHOLDER_PRODUCT_NAME } else { p.name.trim() },
                p.quantity,
                format_currency(p.unit_price),
                format_currency(p.total),
            ),
        })
        .collect()
}

fn edit_item_fields(store: &mut InvoiceStore, id: &str) -> Result<(), InquireError> {
    let Some(current) = store.invoice().product(id).cloned() else {
        return Ok(());
    };

    let name = Text::new("Product Name:")
        .with_initial_value(&current.name)
        .with_placeholder("Enter product name")
        .prompt()?;
    let fabric_type = Text::new("Fabric Type:")
        .with_initial_value(&current.fabric_type)
        .with_placeholder("Cotton, Silk, etc.")
        .prompt()?;
    let color = Text::new("Color:")
        .with_initial_value(&current.color)
        .with_placeholder("Red, Blue, etc.")
        .prompt()?;

    let quantity_initial = if current.quantity == 0 { String::new() } else { current.quantity.to_string() };
    let quantity = Text::new("Quantity:")
        .with_initial_value(&quantity_initial)
        .with_placeholder("Qty")
        .with_validator(validate_quantity)
        .prompt()?;

    let price_initial = amount_field(current.unit_price);
    let unit_price = Text::new("Unit Price ($):")
        .with_initial_value(&price_initial)
        .with_placeholder("0.00")
        .prompt()?;

    store.update_product(
        id,
        ProductPatch {
            name: Some(name),
            fabric_type: Some(fabric_type),
            color: Some(color),
            quantity: Some(input::parse_quantity(&quantity)),
            unit_price: Some(input::parse_amount(&unit_price)),
        },
    );
    if let Some(product) = store.invoice().product(id) {
        println!("✅ Line total: {}", format_currency(product.total));
    }
    Ok(())
}

fn validate_quantity(raw: &str) -> Result<Validation, CustomUserError> {
    if input::is_valid_quantity_entry(raw) {
        Ok(Validation::Valid)
    } else {
        Ok(Validation::Invalid("Enter a whole number of at least 1 (blank counts as 0)".into()))
    }
}

fn set_shipping(store: &mut InvoiceStore) -> Result<(), InquireError> {
    let initial = amount_field(store.invoice().shipping_cost);
    let raw = Text::new("Shipping Cost ($):")
        .with_initial_value(&initial)
        .with_placeholder("0.00")
        .prompt()?;
    store.update_shipping_cost(input::parse_amount(&raw));
    println!("✅ Shipping: {}", format_currency(store.invoice().shipping_cost));
    Ok(())
}

// Zero shows as an empty field so the placeholder is visible.
fn amount_field(amount: Decimal) -> String {
    if amount.is_zero() { String::new() } else { amount.normalize().to_string() }
}

// ==========================================
// 3. Logo Input
// ==========================================

fn set_logo(store: &mut InvoiceStore) -> Result<(), InquireError> {
    let source = Select::new("Logo source:", vec![LOGO_FROM_PATH, LOGO_FROM_PICKER]).prompt()?;

    let path = if source == LOGO_FROM_PICKER {
        match rfd::FileDialog::new()
            .set_title("Select Company Logo")
            .add_filter("Images", &["png", "jpg", "jpeg", "gif", "svg", "webp"])
            .pick_file()
        {
            Some(path) => path,
            None => {
                println!("❌ No file selected.");
                return Ok(());
            }
        }
    } else {
        let raw = Text::new("Image path:")
            .with_help_message("Drag an image onto the terminal, then press Enter")
            .prompt()?;
        logo::clean_dropped_path(&raw)
    };

    match logo::load_logo(&path) {
        Ok(uri) => {
            store.update_logo(Some(uri));
            println!("✅ Logo set from {}", path.display());
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "logo rejected");
            println!("❌ {e}");
        }
    }
    Ok(())
}

// ==========================================
// 4. Preview & Export
// ==========================================

fn preview(invoice: &Invoice, settings: &Settings) {
    let view = render::InvoiceView::new(invoice, &settings.footer_note);
    println!("\n{}\n", render::terminal_preview(&view));
}

fn show_json(invoice: &Invoice) {
    match serde_json::to_string_pretty(invoice) {
        Ok(json) => println!("{json}"),
        Err(e) => println!("❌ {e}"),
    }
}

async fn export(invoice: &Invoice, settings: &Settings, format: ExportFormat, open_after: bool) {
    let document = match render::render_document(invoice, settings) {
        Ok(document) => document,
        Err(e) => {
            warn!(invoice = %invoice.id, error = %e, "render failed");
            println!("❌ Could not render invoice: {e}");
            return;
        }
    };

    let exporter = Exporter::from_settings(settings).with_format(format);
    println!("\n🔨 Compiling {format}...");
    let task = tokio::spawn(async move { exporter.export(document).await });

    match task.await {
        Ok(Ok(path)) => {
            println!("✅ {format} Generated: {}", path.display());
            if open_after {
                open_file(&path);
            }
        }
        Ok(Err(e)) => {
            warn!(invoice = %invoice.id, error = %e, "export failed");
            println!("❌ Export failed: {e}");
        }
        Err(e) => {
            error!(invoice = %invoice.id, error = %e, "export task did not complete");
            println!("❌ Export failed: {e}");
        }
    }
}

fn new_invoice(store: &mut InvoiceStore) -> Result<(), InquireError> {
    let confirmed = Confirm::new(RESET_PROMPT).with_default(false).prompt()?;
    if confirmed {
        store.reset();
        println!("✨ Started invoice {}", store.invoice().id);
    }
    Ok(())
}

fn open_file(path: &Path) {
    #[cfg(target_os = "macos")]
    Command::new("open").arg(path).spawn().ok();

    #[cfg(target_os = "windows")]
    Command::new("explorer").arg(path).spawn().ok();

    #[cfg(target_os = "linux")]
    Command::new("xdg-open").arg(path).spawn().ok();
}

// ==========================================
// 5. Config
// ==========================================

fn setup_config_wizard(current: Settings) -> Result<Settings, InquireError> {
    println!("\n⚙️  --- Configuration Setup ---");

    println!("📂 Opening folder picker...");
    let picked_path = rfd::FileDialog::new()
        .set_title("Select Output Directory")
        .pick_folder();

    let output_dir = if let Some(path) = picked_path {
        path.to_string_lossy().to_string()
    } else {
        println!("❌ No folder selected. Falling back to manual input.");
        Text::new("Output Directory:").with_default(&current.output_dir).prompt()?
    };

    let company_name = Text::new("Company Name (shown when there is no logo):")
        .with_default(&current.company_name)
        .prompt()?;
    let id_prefix = Text::new("Invoice ID Prefix:").with_default(&current.id_prefix).prompt()?;
    let footer_note = Text::new("Footer Note:").with_default(&current.footer_note).prompt()?;
    let default_logo = Text::new("Default Logo Path (Optional, press Enter to skip):")
        .with_initial_value(current.default_logo.as_deref().unwrap_or(""))
        .prompt()?;
    let default_logo = if default_logo.trim().is_empty() {
        None
    } else {
        Some(logo::clean_dropped_path(&default_logo).to_string_lossy().into_owned())
    };

    let settings = Settings {
        output_dir,
        company_name,
        id_prefix: id_prefix.trim().to_string(),
        footer_note,
        default_logo,
        ..current
    };

    match config::config_path().and_then(|path| config::save_to(&path, &settings).map(|()| path)) {
        Ok(path) => println!("✅ Settings saved to {}", path.display()),
        Err(e) => eprintln!("❌ {e}"),
    }
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    #[test]
    fn test_menu_hides_remove_for_single_item() {
        let mut store = InvoiceStore::default();
        assert!(!menu_for(store.invoice()).contains(&Action::RemoveItem));
        store.add_product();
        assert!(menu_for(store.invoice()).contains(&Action::RemoveItem));
    }

    #[test]
    fn test_menu_offers_clear_logo_only_with_logo() {
        let mut store = InvoiceStore::default();
        assert!(!menu_for(store.invoice()).contains(&Action::ClearLogo));
        store.update_logo(Some("data:image/png;base64,AAAA".to_string()));
        assert!(menu_for(store.invoice()).contains(&Action::ClearLogo));
        assert_eq!(menu_for(store.invoice()).last(), Some(&Action::Quit));
    }

    #[test]
    fn test_amount_field() {
        assert_eq!(amount_field(Decimal::ZERO), "");
        assert_eq!(amount_field(dec!(12.50)), "12.5");
    }

    #[test]
    fn test_item_choices_label_blank_names() {
        let store = InvoiceStore::default();
        let choices = item_choices(store.invoice());
        assert_eq!(choices.len(), 1);
        assert_eq!(choices[0].label, "1. Product Name (1 × $0.00 = $0.00)");
    }

    #[test]
    fn test_quantity_validator() {
        assert!(matches!(validate_quantity("2"), Ok(Validation::Valid)));
        assert!(matches!(validate_quantity(""), Ok(Validation::Valid)));
        assert!(matches!(validate_quantity("0"), Ok(Validation::Invalid(_))));
    }
}
