//! modelgrab core
//!
//! Fetches an account's catalog from the hosting platform, filters it by
//! license and downloads the permitted assets, one at a time.

mod catalog;
mod client;
mod config;
mod download;
mod error;
mod events;
mod license;
mod naming;
mod storage;

pub use catalog::*;
pub use client::*;
pub use config::*;
pub use download::*;
pub use error::*;
pub use events::*;
pub use license::*;
pub use naming::*;
pub use storage::*;

use modelgrab_types::{CatalogEntry, RunEvent, RunSummary};
use tokio::sync::mpsc;
use tracing::info;

/// The main modelgrab instance.
///
/// Owns the event sink the CLI listens on; every run builds its fetcher
/// and downloader from the [`RunConfig`] it is given.
pub struct ModelGrab {
    events: EventSink,
}

impl ModelGrab {
    pub fn new() -> Self {
        Self {
            events: EventSink::new(),
        }
    }

    /// Subscribe to run events; the receiver closes once this instance is
    /// dropped and no run is in flight
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<RunEvent> {
        self.events.subscribe()
    }

    /// Emit an event
    pub fn emit(&self, event: RunEvent) {
        self.events.emit(event);
    }

    /// Fetch the catalog of `username` without downloading anything
    pub async fn fetch_catalog(
        &self,
        client: ClientConfig,
        username: &str,
    ) -> Result<Vec<CatalogEntry>, FetchError> {
        let api = ApiClient::new(client)?;
        CatalogFetcher::new(api, self.events.clone())
            .fetch_all(username)
            .await
    }

    /// Fetch, record and download: the complete pipeline for one account.
    ///
    /// An empty catalog ends the run early with a zero summary and no
    /// metadata file.
    pub async fn run(&self, config: &RunConfig) -> Result<RunSummary, FetchError> {
        let api = ApiClient::new(config.client.clone())?;
        let storage = Storage::new(config.account_dir()).await?;

        let entries = CatalogFetcher::new(api.clone(), self.events.clone())
            .fetch_all(&config.username)
            .await?;

        if entries.is_empty() {
            info!("No models found for {}", config.username);
            let mut summary = RunSummary::new(0);
            summary.finish();
            self.emit(RunEvent::RunFinished {
                summary: summary.clone(),
            });
            return Ok(summary);
        }

        let metadata_path = storage.save_metadata(&entries).await?;
        self.emit(RunEvent::MetadataSaved {
            path: metadata_path,
        });

        info!(
            "Downloading {} models to {}",
            entries.len(),
            storage.dir().display()
        );
        let summary = Downloader::new(api, self.events.clone())
            .run(&entries, &config.licenses, storage.dir())
            .await?;

        self.emit(RunEvent::RunFinished {
            summary: summary.clone(),
        });

        Ok(summary)
    }
}

impl Default for ModelGrab {
    fn default() -> Self {
        Self::new()
    }
}
