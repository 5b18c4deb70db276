//! User settings, stored as `settings.toml` in the platform config directory.

use std::fs;
use std::path::{Path, PathBuf};

use directories::{BaseDirs, ProjectDirs};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ConfigError;
use crate::id::DEFAULT_PREFIX;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Where exported invoices are written. `~` expands to the home directory.
    pub output_dir: String,
    pub typst_bin: String,
    pub id_prefix: String,
    /// Shown in the document header when there is no logo.
    pub company_name: String,
    pub footer_note: String,
    pub default_logo: Option<String>,
    /// Raster scale for PNG export (pixels per point / 72).
    pub scale: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            output_dir: "~/Documents/Invoices".to_string(),
            typst_bin: "typst".to_string(),
            id_prefix: DEFAULT_PREFIX.to_string(),
            company_name: "NobleFit".to_string(),
            footer_note: "Thank you for your business!".to_string(),
            default_logo: None,
            scale: 2,
        }
    }
}

impl Settings {
    pub fn output_dir(&self) -> PathBuf {
        expand_home_dir(&self.output_dir)
    }

    pub fn default_logo_path(&self) -> Option<PathBuf> {
        self.default_logo
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .map(expand_home_dir)
    }
}

pub fn config_path() -> Result<PathBuf, ConfigError> {
    let dirs = ProjectDirs::from("com", "noblefit", "invoice").ok_or(ConfigError::NoConfigDir)?;
    Ok(dirs.config_dir().join("settings.toml"))
}

/// Load settings, writing the defaults on first run.
pub fn load() -> Result<Settings, ConfigError> {
    let path = config_path()?;
    if path.exists() {
        return load_from(&path);
    }
    info!(path = %path.display(), "initializing default settings");
    let settings = Settings::default();
    save_to(&path, &settings)?;
    Ok(settings)
}

pub fn load_from(path: &Path) -> Result<Settings, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

pub fn save_to(path: &Path, settings: &Settings) -> Result<(), ConfigError> {
    let io_err = |source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    let toml_str = toml::to_string_pretty(settings)?;
    fs::write(path, toml_str).map_err(io_err)
}

pub fn expand_home_dir(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix('~') {
        if let Some(base_dirs) = BaseDirs::new() {
            return base_dirs.home_dir().join(rest.trim_start_matches(['/', '\\']));
        }
    }
    PathBuf::from(path)
}
