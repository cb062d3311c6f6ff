//! Shared types for modelgrab
//!
//! This crate contains the data structures shared between the core
//! library and the CLI: the catalog records returned by the hosting
//! platform, per-item outcomes, run summaries, events and settings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::PathBuf;
use std::time::Duration;

/// License tokens accepted when none are configured
pub const DEFAULT_LICENSES: [&str; 4] = ["cc0", "by", "free standard", "standard"];

/// Label used when an entry carries no license information
pub const UNKNOWN_LICENSE: &str = "unknown";

// ============================================================================
// Catalog Types
// ============================================================================

/// One asset record as returned by the listing endpoint.
///
/// Only the fields the downloader needs are typed; everything else the
/// server sends is kept in `extra` so the record can be written back out
/// unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub uid: String,
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(rename = "isDownloadable", default)]
    pub is_downloadable: bool,
    #[serde(default)]
    pub license: Option<License>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_name() -> String {
    "unknown".to_string()
}

impl CatalogEntry {
    pub fn new(uid: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            name: name.into(),
            is_downloadable: false,
            license: None,
            extra: Map::new(),
        }
    }

    pub fn with_license(mut self, label: impl Into<String>) -> Self {
        self.license = Some(License {
            label: Some(label.into()),
            extra: Map::new(),
        });
        self
    }

    pub fn downloadable(mut self, is_downloadable: bool) -> Self {
        self.is_downloadable = is_downloadable;
        self
    }

    /// The license label, or [`UNKNOWN_LICENSE`] when the server sent none
    pub fn license_label(&self) -> &str {
        self.license
            .as_ref()
            .and_then(|l| l.label.as_deref())
            .unwrap_or(UNKNOWN_LICENSE)
    }
}

/// License descriptor attached to a catalog entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct License {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A single page of the listing endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogPage {
    #[serde(default)]
    pub results: Vec<CatalogEntry>,
    /// Absolute URL of the next page, absent on the last one
    #[serde(default)]
    pub next: Option<String>,
}

// ============================================================================
// Download Resolution Types
// ============================================================================

/// Response of the per-asset download endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DownloadResolution {
    #[serde(default)]
    pub source: Option<DownloadSource>,
    #[serde(default)]
    pub gltf: Option<DownloadSource>,
}

impl DownloadResolution {
    /// Direct payload location, preferring the original source archive
    pub fn location(&self) -> Option<&str> {
        self.source
            .as_ref()
            .and_then(|s| s.url.as_deref())
            .or_else(|| self.gltf.as_ref().and_then(|g| g.url.as_deref()))
    }
}

/// One candidate payload location
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DownloadSource {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub expires: Option<u64>,
}

// ============================================================================
// Outcome Types
// ============================================================================

/// What happened to a single catalog entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ItemOutcome {
    /// Payload transferred during this run
    Downloaded { path: PathBuf, bytes: u64 },
    /// Destination already existed, nothing was transferred
    AlreadyPresent { path: PathBuf, bytes: u64 },
    /// License did not match the filter
    SkippedLicense { label: String },
    Failed { reason: String },
}

impl ItemOutcome {
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            ItemOutcome::Downloaded { .. } | ItemOutcome::AlreadyPresent { .. }
        )
    }
}

/// Run-level tally of item outcomes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub successful: u32,
    pub failed: u32,
    pub skipped_license: u32,
    pub total: u32,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl RunSummary {
    pub fn new(total: usize) -> Self {
        Self {
            successful: 0,
            failed: 0,
            skipped_license: 0,
            total: total as u32,
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    pub fn record(&mut self, outcome: &ItemOutcome) {
        match outcome {
            ItemOutcome::Downloaded { .. } | ItemOutcome::AlreadyPresent { .. } => {
                self.successful += 1
            }
            ItemOutcome::SkippedLicense { .. } => self.skipped_license += 1,
            ItemOutcome::Failed { .. } => self.failed += 1,
        }
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }
}

// ============================================================================
// Event Types
// ============================================================================

/// Events emitted by the core while a run progresses
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum RunEvent {
    CatalogStarted {
        username: String,
    },
    PageFetched {
        count: usize,
        total: usize,
    },
    CatalogFetchFailed {
        status: u16,
        body: String,
    },
    CatalogFinished {
        total: usize,
    },
    MetadataSaved {
        path: PathBuf,
    },
    ItemStarted {
        index: usize,
        total: usize,
        uid: String,
        name: String,
        license: String,
        downloadable: bool,
    },
    ItemProgress {
        uid: String,
        downloaded: u64,
        total: Option<u64>,
    },
    ItemFinished {
        uid: String,
        outcome: ItemOutcome,
    },
    RunFinished {
        summary: RunSummary,
    },
}

// ============================================================================
// Settings Types
// ============================================================================

/// Application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Base URL of the hosting platform's REST API
    pub api_base_url: String,
    /// Entries requested per listing page
    pub page_size: u32,
    /// Pause after each listing page, in milliseconds
    pub page_delay_ms: u64,
    /// Pause after each item that hit the network, in milliseconds
    pub item_delay_ms: u64,
    /// Pause after an item found already on disk, in milliseconds
    pub existing_delay_ms: u64,
    pub resolve_timeout_secs: u64,
    pub transfer_timeout_secs: u64,
    pub user_agent: String,
    pub default_output_dir: PathBuf,
    /// Accepted license tokens
    pub licenses: Vec<String>,
}

impl Settings {
    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }

    pub fn item_delay(&self) -> Duration {
        Duration::from_millis(self.item_delay_ms)
    }

    pub fn existing_delay(&self) -> Duration {
        Duration::from_millis(self.existing_delay_ms)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.sketchfab.com/v3".to_string(),
            page_size: 100,
            page_delay_ms: 200,
            item_delay_ms: 300,
            existing_delay_ms: 100,
            resolve_timeout_secs: 10,
            transfer_timeout_secs: 30,
            user_agent: format!("modelgrab/{}", env!("CARGO_PKG_VERSION")),
            default_output_dir: PathBuf::from("downloads"),
            licenses: DEFAULT_LICENSES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_catalog_entry_keeps_unknown_fields() {
        let raw = json!({
            "uid": "abc123",
            "name": "Robot",
            "isDownloadable": true,
            "license": { "label": "CC Attribution", "slug": "by" },
            "viewCount": 42,
            "thumbnails": { "images": [] }
        });

        let entry: CatalogEntry = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(entry.uid, "abc123");
        assert!(entry.is_downloadable);
        assert_eq!(entry.license_label(), "CC Attribution");
        assert_eq!(entry.extra.get("viewCount"), Some(&json!(42)));

        assert_eq!(serde_json::to_value(&entry).unwrap(), raw);
    }

    #[test]
    fn test_catalog_entry_defaults() {
        let entry: CatalogEntry = serde_json::from_value(json!({ "uid": "x" })).unwrap();
        assert_eq!(entry.name, "unknown");
        assert!(!entry.is_downloadable);
        assert_eq!(entry.license_label(), UNKNOWN_LICENSE);

        let entry: CatalogEntry =
            serde_json::from_value(json!({ "uid": "y", "license": null })).unwrap();
        assert_eq!(entry.license_label(), UNKNOWN_LICENSE);
    }

    #[test]
    fn test_resolution_prefers_source_over_gltf() {
        let both: DownloadResolution = serde_json::from_value(json!({
            "source": { "url": "https://cdn/a.zip", "size": 10 },
            "gltf": { "url": "https://cdn/a.gltf.zip" }
        }))
        .unwrap();
        assert_eq!(both.location(), Some("https://cdn/a.zip"));

        let gltf_only: DownloadResolution = serde_json::from_value(json!({
            "source": {},
            "gltf": { "url": "https://cdn/b.zip" }
        }))
        .unwrap();
        assert_eq!(gltf_only.location(), Some("https://cdn/b.zip"));

        let none: DownloadResolution = serde_json::from_value(json!({ "usdz": {} })).unwrap();
        assert_eq!(none.location(), None);
    }

    #[test]
    fn test_summary_tally() {
        let mut summary = RunSummary::new(4);
        summary.record(&ItemOutcome::Downloaded {
            path: PathBuf::from("a.zip"),
            bytes: 3,
        });
        summary.record(&ItemOutcome::AlreadyPresent {
            path: PathBuf::from("b.zip"),
            bytes: 3,
        });
        summary.record(&ItemOutcome::SkippedLicense {
            label: "CC-BY-NC".to_string(),
        });
        summary.record(&ItemOutcome::Failed {
            reason: "not downloadable".to_string(),
        });

        assert_eq!(summary.successful, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.skipped_license, 1);
        assert_eq!(summary.total, 4);
    }

    #[test]
    fn test_partial_settings_fill_defaults() {
        let settings: Settings =
            serde_json::from_value(json!({ "page_size": 24, "page_delay_ms": 0 })).unwrap();
        assert_eq!(settings.page_size, 24);
        assert_eq!(settings.page_delay(), Duration::ZERO);
        assert_eq!(settings.item_delay_ms, 300);
        assert_eq!(settings.licenses, DEFAULT_LICENSES.to_vec());
    }
}
