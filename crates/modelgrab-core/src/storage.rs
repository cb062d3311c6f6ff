//! Storage layer: per-account output directory and settings file

use crate::error::FetchError;
use modelgrab_types::{CatalogEntry, Settings};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Name of the raw catalog dump written into every account directory
pub const METADATA_FILE: &str = "models_metadata.json";

/// Per-account output directory
#[derive(Clone, Debug)]
pub struct Storage {
    dir: PathBuf,
}

impl Storage {
    /// Create the directory (and its parents) if needed
    pub async fn new(dir: PathBuf) -> Result<Self, FetchError> {
        fs::create_dir_all(&dir).await?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn metadata_path(&self) -> PathBuf {
        self.dir.join(METADATA_FILE)
    }

    /// Write the full catalog, as received, to [`METADATA_FILE`]
    pub async fn save_metadata(&self, entries: &[CatalogEntry]) -> Result<PathBuf, FetchError> {
        let path = self.metadata_path();
        let content = serde_json::to_string_pretty(entries)?;
        fs::write(&path, content).await?;
        info!("Saved metadata to: {}", path.display());
        Ok(path)
    }
}

// ============================================================================
// Settings (JSON file under the user config directory)
// ============================================================================

/// `<config_dir>/modelgrab/settings.json`, when the platform has a config dir
pub fn default_settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("modelgrab").join("settings.json"))
}

/// Load settings, falling back to defaults when the file does not exist
pub async fn load_settings(path: &Path) -> Result<Settings, FetchError> {
    if !fs::try_exists(path).await? {
        debug!("No settings file at {}, using defaults", path.display());
        return Ok(Settings::default());
    }

    let content = fs::read_to_string(path).await?;
    let settings = serde_json::from_str(&content)?;
    debug!("Loaded settings from {}", path.display());
    Ok(settings)
}

pub async fn save_settings(path: &Path, settings: &Settings) -> Result<(), FetchError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }
    let content = serde_json::to_string_pretty(settings)?;
    fs::write(path, content).await?;
    Ok(())
}
