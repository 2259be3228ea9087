//! Config store: persisted settings merged over defaults, written back on change
//!
//! Loading never fails. A missing, unreadable or malformed file yields the
//! defaults, and each malformed field falls back to its default on its own.
//! Saving returns an explicit `Result` so callers decide whether to care.

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::settings::Config;
use crate::style::TypeSpecs;

#[derive(Debug)]
pub struct ConfigStore {
    pub config: Config,
    /// Where `persist` writes; `None` keeps everything in memory
    path: Option<PathBuf>,
}

impl ConfigStore {
    /// Load from `path`, merging over defaults derived from `specs`
    pub fn load(path: PathBuf, specs: &TypeSpecs) -> Self {
        let config = merge(read_persisted(&path), specs);
        info!(
            path = %path.display(),
            map = %config.settings.selected_map,
            scale = config.settings.global_scale,
            "Loaded overlay config"
        );
        Self { config, path: Some(path) }
    }

    /// Defaults only, never written anywhere
    #[cfg(test)]
    pub fn in_memory(specs: &TypeSpecs) -> Self {
        Self {
            config: merge(Value::Object(Map::new()), specs),
            path: None,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Serialize the full config to disk
    pub fn persist(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory {}", parent.display()))?;
        }
        let contents = serde_json::to_string_pretty(&self.config)
            .context("Failed to serialize config to JSON")?;
        fs::write(path, contents)
            .with_context(|| format!("Failed to write config file to {}", path.display()))?;
        debug!(path = %path.display(), "Saved config");
        Ok(())
    }
}

/// Missing or broken files are treated as an empty object
fn read_persisted(path: &Path) -> Value {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) => {
            info!(path = %path.display(), error = %e, "No readable config file, using defaults");
            return Value::Object(Map::new());
        }
    };
    match serde_json::from_str::<Value>(&contents) {
        Ok(value) => value,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Config file is not valid JSON, using defaults");
            Value::Object(Map::new())
        }
    }
}

/// Decode a persisted document over the built-in defaults
///
/// Field-level fallbacks happen during decoding; what is left is giving each
/// category without a stored color the style's default fill.
pub fn merge(persisted: Value, specs: &TypeSpecs) -> Config {
    let mut config = Config::deserialize(persisted).unwrap_or_else(|e| {
        warn!(error = %e, "Persisted config is not a JSON object, using defaults");
        Config::default()
    });
    config.settings.fill_type_defaults(specs);
    config
}
