//! Error types for configuration, logo input, rendering and export.
//!
//! None of these are fatal to an editing session: the CLI reports them and
//! returns to the menu.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine a configuration directory for this platform")]
    NoConfigDir,

    #[error("failed to read or write settings at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("settings file {path} is not valid TOML: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[derive(Debug, Error)]
pub enum LogoError {
    #[error("logo file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("{} does not look like an image ({mime})", path.display())]
    NotAnImage { path: PathBuf, mime: String },

    #[error("failed to read logo: {0}")]
    Io(#[from] std::io::Error),

    #[error("logo reference is not a base64 data URI")]
    MalformedDataUri,

    #[error("logo data is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("unsupported logo format for export: {0}")]
    UnsupportedFormat(String),
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("template error: {0}")]
    Template(#[from] tera::Error),

    #[error(transparent)]
    Logo(#[from] LogoError),
}

/// Why an export did not produce a document.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("'{}' is not installed or not on PATH (install typst to export)", .0.display())]
    TypstUnavailable(PathBuf),

    #[error("typst exited with {status}: {stderr}")]
    CompileFailed { status: String, stderr: String },

    #[error("I/O error during export: {0}")]
    Io(#[from] std::io::Error),
}
