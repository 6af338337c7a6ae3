//! HTTP client for the sync server.
//!
//! `POST /sync?device={owner}` uploads the device's records, `GET /pull`
//! downloads the full remote set.

use std::time::Duration;
use todosync_engine::{Error, Record, RemoteRecord, Result};

/// Default request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Client for the push and pull endpoints.
#[derive(Debug, Clone)]
pub struct SyncClient {
    http: reqwest::Client,
    base_url: String,
}

impl SyncClient {
    /// Create a client for the server at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(network_error)?;

        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Upload the complete record set of `owner`.
    pub async fn push(&self, owner: &str, records: &[Record]) -> Result<()> {
        let response = self
            .http
            .post(format!("{}/sync", self.base_url))
            .query(&[("device", owner)])
            .json(records)
            .send()
            .await
            .map_err(network_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::NetworkUnavailable(format!(
                "push rejected with status {}",
                status
            )));
        }

        tracing::debug!(owner = %owner, count = records.len(), "pushed records");
        Ok(())
    }

    /// Download every record the server holds.
    ///
    /// Entries are decoded leniently; validation happens in the reconciler.
    pub async fn pull(&self) -> Result<Vec<RemoteRecord>> {
        let response = self
            .http
            .get(format!("{}/pull", self.base_url))
            .send()
            .await
            .map_err(network_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::NetworkUnavailable(format!(
                "pull rejected with status {}",
                status
            )));
        }

        let body: serde_json::Value = response.json().await.map_err(network_error)?;
        let serde_json::Value::Array(entries) = body else {
            return Err(Error::NetworkUnavailable(
                "pull response is not a JSON array".into(),
            ));
        };

        tracing::debug!(count = entries.len(), "pulled records");
        Ok(entries.into_iter().map(RemoteRecord::from).collect())
    }
}

fn network_error(e: reqwest::Error) -> Error {
    tracing::warn!("Request failed: {}", e);
    Error::NetworkUnavailable(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_dropped() {
        let client = SyncClient::new("http://127.0.0.1:3000/").unwrap();
        assert_eq!(client.base_url(), "http://127.0.0.1:3000");
    }

    #[tokio::test]
    async fn unreachable_server_is_network_error() {
        // Port 9 (discard) is not expected to run an HTTP server
        let client = SyncClient::new("http://127.0.0.1:9").unwrap();

        let err = client.pull().await.unwrap_err();
        assert!(matches!(err, Error::NetworkUnavailable(_)));
    }
}
