use bytes::Bytes;
use reqwest::{Client, Url};
use thiserror::Error;

use crate::config::ScrapeConfig;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid scrape URI {uri:?}: {reason}")]
    InvalidUri { uri: String, reason: String },
    #[error("failed to build HTTP client")]
    Client(#[source] reqwest::Error),
    #[error("scrape request failed")]
    Transport(#[source] reqwest::Error),
}

/// Builds the request URL: `uri` plus one `match[]` pair per expression, in
/// order, after whatever query `uri` already carries.
pub fn scrape_url(uri: &str, match_expressions: &[String]) -> Result<Url, FetchError> {
    let invalid = |reason: String| FetchError::InvalidUri {
        uri: uri.to_string(),
        reason,
    };
    let mut url = Url::parse(uri).map_err(|e| invalid(e.to_string()))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(invalid(format!("unsupported scheme {:?}", url.scheme())));
    }
    if !match_expressions.is_empty() {
        let mut pairs = url.query_pairs_mut();
        for expression in match_expressions {
            pairs.append_pair("match[]", expression);
        }
    }
    Ok(url)
}

/// Fetches one exposition body from a configured endpoint.
#[derive(Debug)]
pub struct MetricScraper {
    client: Client,
    url: Url,
}

impl MetricScraper {
    pub fn new(config: &ScrapeConfig) -> Result<Self, FetchError> {
        let url = scrape_url(&config.uri, &config.match_expressions)?;
        if config.insecure_skip_verify {
            log::warn!("Server certificate verification is disabled for this run");
        }
        // Certificate relaxation applies to every request made by this client.
        let client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .danger_accept_invalid_certs(config.insecure_skip_verify)
            .timeout(config.timeout)
            .build()
            .map_err(FetchError::Client)?;
        Ok(MetricScraper { client, url })
    }

    /// Returns the full response body whatever the status code; a non-2xx
    /// answer is only logged.
    pub async fn scrape(&self) -> Result<Bytes, FetchError> {
        log::info!("Reading metrics from endpoint: {}", self.url);
        let response = self
            .client
            .get(self.url.clone())
            .send()
            .await
            .map_err(FetchError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            log::warn!("Endpoint answered {status}, parsing the body anyway");
        }
        let body = response.bytes().await.map_err(FetchError::Transport)?;
        log::debug!("Received {} bytes with status {status}", body.len());
        Ok(body)
    }
}
