//! HTTP client for the product ledger gateway.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::error::{classify_status, classify_transport, normalize_base_url, GatewayError};
use veritag_store::{LedgerClient, LedgerFields, LedgerRecord, Lookup, SourceError};
use veritag_types::LedgerId;

/// Default timeout for ledger requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default connection timeout.
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Deserialize)]
struct RegisterResponse {
    id: LedgerId,
}

/// Ledger reached through its HTTP gateway.
#[derive(Clone)]
pub struct HttpLedgerClient {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl HttpLedgerClient {
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

    async fn fetch_record(&self, url: String) -> Result<Lookup<LedgerRecord>, SourceError> {
        debug!(%url, "ledger lookup");
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| classify_transport(e, self.timeout))?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(Lookup::NotFound),
            status if status.is_success() => {
                let record: LedgerRecord = response
                    .json()
                    .await
                    .map_err(|e| SourceError::Protocol(format!("invalid ledger record: {e}")))?;
                Ok(Lookup::Found(record))
            }
            status => Err(classify_status(status)),
        }
    }
}

#[async_trait]
impl LedgerClient for HttpLedgerClient {
    async fn register_record(&self, fields: LedgerFields) -> Result<LedgerId, SourceError> {
        let response = self
            .http
            .post(format!("{}/records", self.base_url))
            .json(&fields)
            .send()
            .await
            .map_err(|e| classify_transport(e, self.timeout))?;

        if !response.status().is_success() {
            return Err(classify_status(response.status()));
        }

        let body: RegisterResponse = response
            .json()
            .await
            .map_err(|e| SourceError::Protocol(format!("invalid register response: {e}")))?;
        Ok(body.id)
    }

    async fn lookup_by_id(&self, id: LedgerId) -> Result<Lookup<LedgerRecord>, SourceError> {
        self.fetch_record(format!("{}/records/{}", self.base_url, id))
            .await
    }

    async fn lookup_by_hash(&self, qr_hash: &str) -> Result<Lookup<LedgerRecord>, SourceError> {
        self.fetch_record(format!("{}/records/by-qr/{}", self.base_url, qr_hash))
            .await
    }
}
