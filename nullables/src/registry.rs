//! Nullable product registry and verification log.

use async_trait::async_trait;
use std::time::Duration;

use veritag_store::{
    Lookup, MemoryRegistry, ProductRegistry, SourceError, StoredVerification, VerificationLog,
};
use veritag_types::{
    Manufacturer, ManufacturerId, ProductId, ProductSnapshot, RecordId, Timestamp,
    VerificationRecord, VerificationSummary,
};

use crate::Fault;

/// A [`MemoryRegistry`] whose availability and latency are controllable.
///
/// The switch covers registry reads only; appends to the verification log
/// always succeed so tests can inspect what was recorded.
pub struct NullRegistry {
    inner: MemoryRegistry,
    fault: Fault,
}

impl NullRegistry {
    pub fn new() -> Self {
        Self {
            inner: MemoryRegistry::new(),
            fault: Fault::new(),
        }
    }

    pub fn insert_product(&self, product: ProductSnapshot) -> Result<(), SourceError> {
        self.inner.insert_product(product)
    }

    pub fn insert_manufacturer(&self, manufacturer: Manufacturer) -> Result<(), SourceError> {
        self.inner.insert_manufacturer(manufacturer)
    }

    pub fn record_count(&self) -> usize {
        self.inner.record_count().unwrap_or(0)
    }

    pub fn set_available(&self, available: bool) {
        self.fault.set_available(available);
    }

    pub fn set_latency(&self, latency: Duration) {
        self.fault.set_latency(latency);
    }

    pub fn calls(&self) -> u64 {
        self.fault.calls()
    }
}

impl Default for NullRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProductRegistry for NullRegistry {
    async fn find_by_id(&self, id: ProductId) -> Result<Lookup<ProductSnapshot>, SourceError> {
        self.fault.enter("registry").await?;
        self.inner.find_by_id(id).await
    }

    async fn find_manufacturer(
        &self,
        id: ManufacturerId,
    ) -> Result<Lookup<Manufacturer>, SourceError> {
        self.fault.enter("registry").await?;
        self.inner.find_manufacturer(id).await
    }

    async fn find_others_by_qr_hash(
        &self,
        qr_hash: &str,
        exclude: ProductId,
    ) -> Result<Vec<ProductId>, SourceError> {
        self.fault.enter("registry").await?;
        self.inner.find_others_by_qr_hash(qr_hash, exclude).await
    }

    async fn count_siblings_by_batch(
        &self,
        manufacturer: ManufacturerId,
        batch: &str,
        exclude: ProductId,
    ) -> Result<u64, SourceError> {
        self.fault.enter("registry").await?;
        self.inner
            .count_siblings_by_batch(manufacturer, batch, exclude)
            .await
    }

    async fn recent_verifications(
        &self,
        product: ProductId,
        since: Timestamp,
    ) -> Result<Vec<VerificationSummary>, SourceError> {
        self.fault.enter("registry").await?;
        self.inner.recent_verifications(product, since).await
    }
}

#[async_trait]
impl VerificationLog for NullRegistry {
    async fn append(&self, record: VerificationRecord) -> Result<RecordId, SourceError> {
        self.inner.append(record).await
    }

    async fn history(&self, product: ProductId) -> Result<Vec<StoredVerification>, SourceError> {
        self.fault.enter("registry").await?;
        self.inner.history(product).await
    }

    async fn find(&self, id: RecordId) -> Result<Lookup<StoredVerification>, SourceError> {
        self.fault.enter("registry").await?;
        self.inner.find(id).await
    }
}
