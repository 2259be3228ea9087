//! Locations and loading of the files the overlay reads and writes

use anyhow::{bail, Context, Result};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::constants::paths;

/// Resolved file locations for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPaths {
    /// Raw map/POI dataset
    pub data: PathBuf,
    /// Style/metadata dataset
    pub style: PathBuf,
    /// Persisted user configuration
    pub config: PathBuf,
}

impl DataPaths {
    /// Default directory: `<local data dir>/hunt-overlay`
    pub fn default_dir() -> PathBuf {
        let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(paths::APP_DIR);
        path
    }

    pub fn in_dir(dir: &Path) -> Self {
        Self {
            data: dir.join(paths::DATA_FILE),
            style: dir.join(paths::STYLE_FILE),
            config: dir.join(paths::CONFIG_FILE),
        }
    }

    /// Defaults from `dir` (or the default directory), with per-file overrides
    pub fn resolve(
        dir: Option<PathBuf>,
        data: Option<PathBuf>,
        style: Option<PathBuf>,
        config: Option<PathBuf>,
    ) -> Self {
        let base = Self::in_dir(&dir.unwrap_or_else(Self::default_dir));
        Self {
            data: data.unwrap_or(base.data),
            style: style.unwrap_or(base.style),
            config: config.unwrap_or(base.config),
        }
    }
}

/// Read and parse a required JSON input file; absence is a fatal startup error
pub fn load_required_json(path: &Path, what: &str) -> Result<Value> {
    if !path.is_file() {
        bail!("Missing {what} file at {}", path.display());
    }
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {what} file {}", path.display()))?;
    let value = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse {what} file {} as JSON", path.display()))?;
    info!(path = %path.display(), what = what, "Loaded input file");
    Ok(value)
}
