//! HTTP access to the hosting platform's REST API

use crate::config::ClientConfig;
use crate::error::FetchError;
use reqwest::{Client, RequestBuilder};
use url::Url;

/// Thin wrapper around a `reqwest::Client` bound to one [`ClientConfig`].
///
/// Cloning is cheap; the underlying connection pool is shared.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base: Url,
    config: ClientConfig,
}

impl ApiClient {
    pub fn new(config: ClientConfig) -> Result<Self, FetchError> {
        let base = Url::parse(&config.api_base_url)
            .map_err(|_| FetchError::InvalidUrl(config.api_base_url.clone()))?;
        if base.cannot_be_a_base() {
            return Err(FetchError::InvalidUrl(config.api_base_url.clone()));
        }

        let http = Client::builder()
            .user_agent(config.user_agent.clone())
            .connect_timeout(config.transfer_timeout)
            .read_timeout(config.transfer_timeout)
            .build()?;

        Ok(Self { http, base, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Listing endpoint, `{base}/models`
    pub fn models_url(&self) -> Url {
        self.endpoint(&["models"])
    }

    /// Per-asset download resolution endpoint, `{base}/models/{uid}/download`
    pub fn download_endpoint(&self, uid: &str) -> Url {
        self.endpoint(&["models", uid, "download"])
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// GET against the API, carrying the credential when one is configured
    pub(crate) fn api_get(&self, url: &str) -> RequestBuilder {
        let request = self.http.get(url);
        match self.config.authorization() {
            Some(auth) => request.header(reqwest::header::AUTHORIZATION, auth),
            None => request,
        }
    }

    /// GET against a resolved payload location; never carries the credential
    pub(crate) fn payload_get(&self, url: Url) -> RequestBuilder {
        self.http.get(url)
    }
}
