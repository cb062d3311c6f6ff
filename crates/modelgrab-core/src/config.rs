//! Run configuration
//!
//! [`ClientConfig`] is the immutable bundle of API location, credential and
//! pacing that both the catalog fetcher and the downloader receive.
//! [`ConfigSource`] abstracts where the run inputs come from (flags,
//! environment, interactive prompts) so the core never talks to a terminal.

use crate::error::FetchError;
use crate::license::LicenseFilter;
use modelgrab_types::Settings;
use std::path::PathBuf;
use std::time::Duration;

/// Immutable HTTP client configuration shared by fetcher and downloader
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_base_url: String,
    /// Static API credential, sent as `Authorization: Token <credential>`
    pub api_token: Option<String>,
    pub page_size: u32,
    pub page_delay: Duration,
    pub item_delay: Duration,
    pub existing_delay: Duration,
    pub resolve_timeout: Duration,
    pub transfer_timeout: Duration,
    pub user_agent: String,
}

impl ClientConfig {
    pub fn from_settings(settings: &Settings, api_token: Option<String>) -> Self {
        Self {
            api_base_url: settings.api_base_url.trim_end_matches('/').to_string(),
            api_token: api_token.filter(|t| !t.trim().is_empty()),
            page_size: settings.page_size,
            page_delay: settings.page_delay(),
            item_delay: settings.item_delay(),
            existing_delay: settings.existing_delay(),
            resolve_timeout: Duration::from_secs(settings.resolve_timeout_secs),
            transfer_timeout: Duration::from_secs(settings.transfer_timeout_secs),
            user_agent: settings.user_agent.clone(),
        }
    }

    /// Value of the `Authorization` header, if a credential is configured
    pub fn authorization(&self) -> Option<String> {
        self.api_token.as_ref().map(|t| format!("Token {}", t))
    }
}

/// Provider of the per-run inputs
pub trait ConfigSource {
    /// API credential; `None` or empty means no credential was supplied
    fn api_token(&self) -> Result<Option<String>, FetchError>;

    /// Account handle whose catalog is fetched
    fn username(&self) -> Result<String, FetchError>;

    /// Output root; `None` falls back to the settings default
    fn output_dir(&self) -> Result<Option<PathBuf>, FetchError>;

    /// Accepted license tokens; `None` falls back to the settings default
    fn licenses(&self) -> Result<Option<Vec<String>>, FetchError> {
        Ok(None)
    }
}

/// Validated inputs of one download run
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub client: ClientConfig,
    pub username: String,
    pub output_root: PathBuf,
    pub licenses: LicenseFilter,
}

impl RunConfig {
    /// Per-account directory that receives metadata and payloads
    pub fn account_dir(&self) -> PathBuf {
        self.output_root.join(&self.username)
    }
}

/// Collect and validate run inputs.
///
/// The credential is asked for first and a missing one aborts before the
/// handle is requested, mirroring the order the interactive flow prompts in.
pub fn resolve_run_config(
    source: &dyn ConfigSource,
    settings: &Settings,
) -> Result<RunConfig, FetchError> {
    let api_token = source
        .api_token()?
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| FetchError::Config("API token is required".to_string()))?;

    let username = source.username()?.trim().to_string();
    if username.is_empty() {
        return Err(FetchError::Config("Username is required".to_string()));
    }

    let output_root = source
        .output_dir()?
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| settings.default_output_dir.clone());

    let licenses = match source.licenses()? {
        Some(tokens) if !tokens.is_empty() => LicenseFilter::new(tokens),
        _ => LicenseFilter::new(&settings.licenses),
    };

    Ok(RunConfig {
        client: ClientConfig::from_settings(settings, Some(api_token)),
        username,
        output_root,
        licenses,
    })
}
