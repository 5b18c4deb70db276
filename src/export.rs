//! Export adapter: compiles a rendered invoice to a page document with Typst.
//!
//! The export works on an owned [`RenderedInvoice`] snapshot, so the editing
//! session can keep its invoice untouched while `typst` runs. Sources are
//! staged in a private directory under the build root and removed once the
//! compile finishes, whether it succeeded or not.

use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::process::Command;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::Settings;
use crate::error::ExportError;
use crate::render::RenderedInvoice;

const POINTS_PER_INCH: u32 = 72;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Pdf,
    Png,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Png => "png",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension().to_uppercase())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportOptions {
    pub format: ExportFormat,
    /// Raster scale; PNG output uses `72 * scale` pixels per inch.
    pub scale: u32,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            format: ExportFormat::Pdf,
            scale: 2,
        }
    }
}

impl ExportOptions {
    pub fn ppi(&self) -> u32 {
        POINTS_PER_INCH * self.scale.max(1)
    }
}

/// `invoice-<id>.pdf`
pub fn export_file_name(invoice_id: &str, format: ExportFormat) -> String {
    format!("invoice-{}.{}", invoice_id, format.extension())
}

#[derive(Debug, Clone)]
pub struct Exporter {
    typst_bin: PathBuf,
    output_dir: PathBuf,
    build_root: PathBuf,
    options: ExportOptions,
}

impl Exporter {
    pub fn new(typst_bin: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            typst_bin: typst_bin.into(),
            output_dir: output_dir.into(),
            build_root: std::env::temp_dir(),
            options: ExportOptions::default(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(&settings.typst_bin, settings.output_dir()).with_options(ExportOptions {
            scale: settings.scale,
            ..ExportOptions::default()
        })
    }

    pub fn with_options(mut self, options: ExportOptions) -> Self {
        self.options = options;
        self
    }

    /// Where per-export staging directories are created. Defaults to the system temp dir.
    pub fn with_build_root(mut self, build_root: impl Into<PathBuf>) -> Self {
        self.build_root = build_root.into();
        self
    }

    pub fn with_format(mut self, format: ExportFormat) -> Self {
        self.options.format = format;
        self
    }

    pub fn output_path(&self, invoice_id: &str) -> PathBuf {
        self.output_dir.join(export_file_name(invoice_id, self.options.format))
    }

    fn build_dir(&self, invoice_id: &str) -> PathBuf {
        self.build_root
            .join(format!("noblefit-{}-{}", invoice_id, Uuid::new_v4().simple()))
    }

    /// Stage the Typst source and its assets, then compile. Returns the written file.
    pub async fn export(&self, document: RenderedInvoice) -> Result<PathBuf, ExportError> {
        let build_dir = self.build_dir(&document.id);
        let output_path = self.output_path(&document.id);
        let result = match self.stage(&build_dir, &document).await {
            Ok(source_path) => self.compile(&source_path, &output_path).await,
            Err(e) => Err(e),
        };

        match fs::remove_dir_all(&build_dir).await {
            Ok(()) => debug!(dir = %build_dir.display(), "removed staged sources"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => warn!(dir = %build_dir.display(), error = %e, "could not remove staged sources"),
        }

        result?;
        info!(invoice = %document.id, path = %output_path.display(), "exported invoice");
        Ok(output_path)
    }

    async fn stage(&self, build_dir: &Path, document: &RenderedInvoice) -> Result<PathBuf, ExportError> {
        fs::create_dir_all(build_dir).await?;
        let source_path = build_dir.join(format!("invoice-{}.typ", document.id));
        fs::write(&source_path, &document.source).await?;
        for asset in &document.assets {
            fs::write(build_dir.join(&asset.file_name), &asset.bytes).await?;
        }
        debug!(dir = %build_dir.display(), assets = document.assets.len(), "staged typst sources");
        Ok(source_path)
    }

    async fn compile(&self, source_path: &Path, output_path: &Path) -> Result<(), ExportError> {
        fs::create_dir_all(&self.output_dir).await?;

        let mut command = Command::new(&self.typst_bin);
        command.arg("compile").arg(source_path).arg(output_path);
        if self.options.format == ExportFormat::Png {
            command
                .arg("--format")
                .arg("png")
                .arg("--ppi")
                .arg(self.options.ppi().to_string());
        }

        let output = command.output().await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => ExportError::TypstUnavailable(self.typst_bin.clone()),
            _ => ExportError::Io(e),
        })?;
        if !output.status.success() {
            return Err(ExportError::CompileFailed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }
}
