//! HTTP client for the content store.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{classify_status, classify_transport, normalize_base_url, GatewayError};
use veritag_store::{ContentStore, Lookup, SourceError};
use veritag_types::ContentHash;

/// Default timeout for content store requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default connection timeout.
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Deserialize)]
struct PutResponse {
    hash: String,
}

/// Content store reached over HTTP.
#[derive(Clone)]
pub struct HttpContentStore {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl HttpContentStore {
    pub fn new(base_url: &str) -> Result<Self, GatewayError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, GatewayError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT.min(timeout))
            .build()
            .map_err(|e| GatewayError::Client(e.to_string()))?;
        Ok(Self {
            http,
            base_url: normalize_base_url(base_url)?,
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn blob_url(&self, hash: &ContentHash) -> String {
        format!("{}/content/{}", self.base_url, hash)
    }
}

#[async_trait]
impl ContentStore for HttpContentStore {
    async fn put(&self, blob: Vec<u8>) -> Result<ContentHash, SourceError> {
        let expected = ContentHash::of(&blob);
        let response = self
            .http
            .post(format!("{}/content", self.base_url))
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(blob)
            .send()
            .await
            .map_err(|e| classify_transport(e, self.timeout))?;

        if !response.status().is_success() {
            return Err(classify_status(response.status()));
        }

        let body: PutResponse = response
            .json()
            .await
            .map_err(|e| SourceError::Protocol(format!("invalid put response: {e}")))?;
        let stored = ContentHash::new(body.hash);
        if !stored.as_str().eq_ignore_ascii_case(expected.as_str()) {
            warn!(%stored, %expected, "content store returned a foreign address");
            return Err(SourceError::Protocol(format!(
                "store addressed blob as {stored}, expected {expected}"
            )));
        }
        Ok(stored)
    }

    async fn get(&self, hash: &ContentHash) -> Result<Lookup<Vec<u8>>, SourceError> {
        let url = self.blob_url(hash);
        debug!(%url, "fetching content");
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| classify_transport(e, self.timeout))?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(Lookup::NotFound),
            status if status.is_success() => {
                let bytes = response
                    .bytes()
                    .await
                    .map_err(|e| classify_transport(e, self.timeout))?;
                Ok(Lookup::Found(bytes.to_vec()))
            }
            status => Err(classify_status(status)),
        }
    }
}
