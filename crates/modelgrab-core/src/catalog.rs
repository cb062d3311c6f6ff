//! Catalog fetcher
//!
//! Walks the paginated listing endpoint for one account and returns every
//! entry in server order. A failing page ends pagination early without an
//! error: whatever was collected so far is handed back to the caller.

use crate::client::ApiClient;
use crate::error::FetchError;
use crate::events::EventSink;
use modelgrab_types::{CatalogEntry, CatalogPage, RunEvent};
use tracing::{debug, info, warn};

pub struct CatalogFetcher {
    api: ApiClient,
    events: EventSink,
}

impl CatalogFetcher {
    pub fn new(api: ApiClient, events: EventSink) -> Self {
        Self { api, events }
    }

    /// Fetch every catalog entry of `username`
    pub async fn fetch_all(&self, username: &str) -> Result<Vec<CatalogEntry>, FetchError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(FetchError::Config("Username is required".to_string()));
        }

        info!("Fetching models for user: {}", username);
        self.emit(RunEvent::CatalogStarted {
            username: username.to_string(),
        });

        let config = self.api.config();
        let mut entries: Vec<CatalogEntry> = Vec::new();
        let mut request = self.api.api_get(self.api.models_url().as_str()).query(&[
            ("user", username.to_string()),
            ("count", config.page_size.to_string()),
        ]);

        loop {
            let response = request.send().await?;
            let status = response.status();

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                warn!(
                    "Error fetching models: {} ({} entries collected so far)",
                    status,
                    entries.len()
                );
                debug!("Listing error body: {}", body);
                self.emit(RunEvent::CatalogFetchFailed {
                    status: status.as_u16(),
                    body,
                });
                break;
            }

            let body = response.bytes().await?;
            let page: CatalogPage = serde_json::from_slice(&body)?;
            let count = page.results.len();
            entries.extend(page.results);

            info!("Found {} models (Total: {})", count, entries.len());
            self.emit(RunEvent::PageFetched {
                count,
                total: entries.len(),
            });

            tokio::time::sleep(config.page_delay).await;

            match page.next.filter(|next| !next.is_empty()) {
                Some(next) => request = self.api.api_get(&next),
                None => break,
            }
        }

        self.emit(RunEvent::CatalogFinished {
            total: entries.len(),
        });

        Ok(entries)
    }

    fn emit(&self, event: RunEvent) {
        self.events.emit(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use modelgrab_types::Settings;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param, query_param_is_missing};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fetcher(server: &MockServer, token: Option<&str>) -> CatalogFetcher {
        fetcher_with_events(server, token, EventSink::new())
    }

    fn fetcher_with_events(
        server: &MockServer,
        token: Option<&str>,
        events: EventSink,
    ) -> CatalogFetcher {
        let settings = Settings {
            api_base_url: format!("{}/v3", server.uri()),
            page_delay_ms: 0,
            ..Default::default()
        };
        let config = ClientConfig::from_settings(&settings, token.map(str::to_string));
        CatalogFetcher::new(ApiClient::new(config).unwrap(), events)
    }

    fn model(uid: &str) -> serde_json::Value {
        json!({
            "uid": uid,
            "name": format!("Model {uid}"),
            "isDownloadable": true,
            "license": { "label": "CC Attribution" }
        })
    }

    fn uids(entries: &[CatalogEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.uid.as_str()).collect()
    }

    #[tokio::test]
    async fn test_follows_next_until_absent() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v3/models"))
            .and(query_param("user", "artist"))
            .and(query_param("count", "100"))
            .and(query_param_is_missing("cursor"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [model("a"), model("b")],
                "next": format!("{}/v3/models?cursor=2", server.uri()),
            })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/v3/models"))
            .and(query_param("cursor", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [model("c")],
                "next": format!("{}/v3/models?cursor=3", server.uri()),
            })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/v3/models"))
            .and(query_param("cursor", "3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [model("d"), model("e")],
                "next": null,
            })))
            .expect(1)
            .mount(&server)
            .await;

        let entries = fetcher(&server, None).fetch_all("artist").await.unwrap();
        assert_eq!(uids(&entries), vec!["a", "b", "c", "d", "e"]);
    }

    #[tokio::test]
    async fn test_failed_page_returns_partial_catalog() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v3/models"))
            .and(query_param_is_missing("cursor"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [model("a"), model("b")],
                "next": format!("{}/v3/models?cursor=2", server.uri()),
            })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/v3/models"))
            .and(query_param("cursor", "2"))
            .respond_with(ResponseTemplate::new(503).set_body_string("try later"))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/v3/models"))
            .and(query_param("cursor", "3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [model("z")],
                "next": null,
            })))
            .expect(0)
            .mount(&server)
            .await;

        let mut sink = EventSink::new();
        let mut events = sink.subscribe();

        let entries = fetcher_with_events(&server, None, sink)
            .fetch_all("artist")
            .await
            .unwrap();
        assert_eq!(uids(&entries), vec!["a", "b"]);

        let mut saw_failure = false;
        while let Ok(event) = events.try_recv() {
            if let RunEvent::CatalogFetchFailed { status, body } = event {
                assert_eq!(status, 503);
                assert_eq!(body, "try later");
                saw_failure = true;
            }
        }
        assert!(saw_failure);
    }

    #[tokio::test]
    async fn test_first_page_failure_is_empty_catalog() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v3/models"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let entries = fetcher(&server, None).fetch_all("nobody").await.unwrap();
        assert!(entries.is_empty());
    }

    #[tokio::test]
    async fn test_sends_credential_when_configured() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v3/models"))
            .and(header("authorization", "Token s3cret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [model("a")]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let entries = fetcher(&server, Some("s3cret"))
            .fetch_all("artist")
            .await
            .unwrap();
        assert_eq!(uids(&entries), vec!["a"]);
    }

    #[tokio::test]
    async fn test_undecodable_page_is_an_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v3/models"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = fetcher(&server, None).fetch_all("artist").await.unwrap_err();
        assert!(matches!(err, FetchError::Serialization(_)));
    }

    #[tokio::test]
    async fn test_empty_username_rejected_without_request() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let err = fetcher(&server, None).fetch_all("  ").await.unwrap_err();
        assert!(matches!(err, FetchError::Config(_)));
    }
}
