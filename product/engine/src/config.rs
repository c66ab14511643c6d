use crate::paths::AppPaths;
use crate::{EngineError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    /// Explicit BBDown executable; bypasses the bundled/PATH lookup.
    pub bbdown_path: Option<String>,
    /// Drop `?query` and `#fragment` from pasted video URLs.
    pub strip_url_query: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            bbdown_path: None,
            strip_url_query: true,
        }
    }
}

impl Preferences {
    pub fn bbdown_cmd(&self, paths: &AppPaths) -> PathBuf {
        match self.bbdown_path.as_deref().map(str::trim) {
            Some(p) if !p.is_empty() => PathBuf::from(p),
            _ => paths.bbdown_cmd(),
        }
    }
}

pub fn load_preferences(paths: &AppPaths) -> Result<Preferences> {
    let path = paths.preferences_path();
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no preferences file, using defaults");
        return Ok(Preferences::default());
    }
    let bytes = std::fs::read(&path)?;
    let parsed: Preferences =
        serde_json::from_slice(&bytes).map_err(|e| EngineError::InvalidConfig {
            path: path.clone(),
            message: e.to_string(),
        })?;
    Ok(parsed)
}

pub fn save_preferences(paths: &AppPaths, prefs: &Preferences) -> Result<()> {
    let path = paths.preferences_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(prefs)?;
    std::fs::write(&path, format!("{json}\n"))?;
    tracing::debug!(path = %path.display(), "saved preferences");
    Ok(())
}
