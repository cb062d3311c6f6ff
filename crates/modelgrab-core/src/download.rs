//! License-gated downloader
//!
//! Key behaviour:
//! - Entries are processed one at a time, in catalog order
//! - License and downloadability are checked before any request is made
//! - An existing destination file counts as success; nothing is transferred
//!   and its content is not compared against the remote copy
//! - Per-item failures are tallied and the loop moves on; only filesystem
//!   errors stop the run

use crate::client::ApiClient;
use crate::error::{FetchError, ItemError};
use crate::events::EventSink;
use crate::license::LicenseFilter;
use crate::naming::destination_filename;
use futures::StreamExt;
use modelgrab_types::{CatalogEntry, DownloadResolution, ItemOutcome, RunEvent, RunSummary};
use std::path::Path;
use std::time::{Duration, Instant};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};
use url::Url;

/// Minimum interval between progress events for one item
const PROGRESS_INTERVAL: Duration = Duration::from_millis(250);

pub struct Downloader {
    api: ApiClient,
    events: EventSink,
}

impl Downloader {
    pub fn new(api: ApiClient, events: EventSink) -> Self {
        Self { api, events }
    }

    /// Process every entry in order and tally the outcomes
    pub async fn run(
        &self,
        entries: &[CatalogEntry],
        filter: &LicenseFilter,
        dest_dir: &Path,
    ) -> Result<RunSummary, FetchError> {
        let mut summary = RunSummary::new(entries.len());

        for (index, entry) in entries.iter().enumerate() {
            self.emit(RunEvent::ItemStarted {
                index: index + 1,
                total: entries.len(),
                uid: entry.uid.clone(),
                name: entry.name.clone(),
                license: entry.license_label().to_string(),
                downloadable: entry.is_downloadable,
            });

            let outcome = match self.process_entry(entry, filter, dest_dir).await {
                Ok(outcome) => outcome,
                Err(ItemError::Io(e)) => return Err(FetchError::Io(e)),
                Err(e) => {
                    warn!("Model {} failed: {}", entry.uid, e);
                    ItemOutcome::Failed {
                        reason: e.to_string(),
                    }
                }
            };

            summary.record(&outcome);
            self.emit(RunEvent::ItemFinished {
                uid: entry.uid.clone(),
                outcome,
            });
        }

        summary.finish();
        Ok(summary)
    }

    /// Decide and carry out what happens to one entry
    pub async fn process_entry(
        &self,
        entry: &CatalogEntry,
        filter: &LicenseFilter,
        dest_dir: &Path,
    ) -> Result<ItemOutcome, ItemError> {
        let label = entry.license_label();
        if !filter.matches(label) {
            debug!("Model {} skipped, license {:?} not allowed", entry.uid, label);
            return Ok(ItemOutcome::SkippedLicense {
                label: label.to_string(),
            });
        }

        if !entry.is_downloadable {
            return Err(ItemError::NotDownloadable);
        }

        let result = self.fetch_entry(entry, dest_dir).await;

        let config = self.api.config();
        let pause = match &result {
            Ok(ItemOutcome::AlreadyPresent { .. }) => config.existing_delay,
            _ => config.item_delay,
        };
        tokio::time::sleep(pause).await;

        result
    }

    async fn fetch_entry(
        &self,
        entry: &CatalogEntry,
        dest_dir: &Path,
    ) -> Result<ItemOutcome, ItemError> {
        let location = self.resolve(&entry.uid).await?;
        let url = Url::parse(&location).map_err(|_| ItemError::InvalidUrl(location.clone()))?;

        let path = dest_dir.join(destination_filename(&entry.name, &entry.uid, &url));

        if let Ok(metadata) = tokio::fs::metadata(&path).await {
            info!("Model {} already exists at {}", entry.uid, path.display());
            return Ok(ItemOutcome::AlreadyPresent {
                path,
                bytes: metadata.len(),
            });
        }

        let bytes = self.transfer(&entry.uid, url, &path).await?;
        info!("Model {} saved to {} ({} bytes)", entry.uid, path.display(), bytes);

        Ok(ItemOutcome::Downloaded { path, bytes })
    }

    /// Ask the API where the payload of `uid` lives
    async fn resolve(&self, uid: &str) -> Result<String, ItemError> {
        let endpoint = self.api.download_endpoint(uid);
        debug!("Resolving download for {}: {}", uid, endpoint);

        let response = self
            .api
            .api_get(endpoint.as_str())
            .timeout(self.api.config().resolve_timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ItemError::ResolutionStatus(status.as_u16()));
        }

        let body = response.bytes().await?;
        let resolution: DownloadResolution = serde_json::from_slice(&body)
            .map_err(|e| ItemError::InvalidResolution(e.to_string()))?;

        resolution
            .location()
            .map(str::to_string)
            .ok_or(ItemError::NoDownloadUrl)
    }

    /// Stream the payload at `url` into `path`, returning the bytes written.
    ///
    /// A transfer that fails midway leaves the partial file behind.
    async fn transfer(&self, uid: &str, url: Url, path: &Path) -> Result<u64, ItemError> {
        let response = self.api.payload_get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ItemError::TransferStatus(status.as_u16()));
        }

        let total = response.content_length().filter(|len| *len > 0);
        let mut file = File::create(path).await?;
        let mut stream = response.bytes_stream();

        let mut downloaded: u64 = 0;
        let mut last_progress = Instant::now();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            downloaded += chunk.len() as u64;

            if total.is_some() && last_progress.elapsed() >= PROGRESS_INTERVAL {
                self.emit(RunEvent::ItemProgress {
                    uid: uid.to_string(),
                    downloaded,
                    total,
                });
                last_progress = Instant::now();
            }
        }

        file.flush().await?;

        if total.is_some() {
            self.emit(RunEvent::ItemProgress {
                uid: uid.to_string(),
                downloaded,
                total,
            });
        }

        Ok(downloaded)
    }

    fn emit(&self, event: RunEvent) {
        self.events.emit(event);
    }
}
