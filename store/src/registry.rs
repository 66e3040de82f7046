//! Product registry and verification log traits.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{Lookup, SourceError};
use veritag_types::{
    Manufacturer, ManufacturerId, ProductId, ProductSnapshot, RecordId, Timestamp,
    VerificationRecord, VerificationSummary,
};

/// Read-only view of the local product database.
#[async_trait]
pub trait ProductRegistry: Send + Sync {
    async fn find_by_id(&self, id: ProductId) -> Result<Lookup<ProductSnapshot>, SourceError>;

    async fn find_manufacturer(
        &self,
        id: ManufacturerId,
    ) -> Result<Lookup<Manufacturer>, SourceError>;

    /// Active products other than `exclude` bound to `qr_hash`, in id order.
    async fn find_others_by_qr_hash(
        &self,
        qr_hash: &str,
        exclude: ProductId,
    ) -> Result<Vec<ProductId>, SourceError>;

    /// Active products from `manufacturer` sharing `batch`, excluding `exclude`.
    async fn count_siblings_by_batch(
        &self,
        manufacturer: ManufacturerId,
        batch: &str,
        exclude: ProductId,
    ) -> Result<u64, SourceError>;

    /// Verification attempts for `product` at or after `since`.
    async fn recent_verifications(
        &self,
        product: ProductId,
        since: Timestamp,
    ) -> Result<Vec<VerificationSummary>, SourceError>;
}

/// A persisted verification record with its assigned id.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoredVerification {
    pub id: RecordId,
    pub record: VerificationRecord,
}

/// Append-only log of verification attempts.
#[async_trait]
pub trait VerificationLog: Send + Sync {
    /// Single atomic append. Records are never updated afterwards.
    async fn append(&self, record: VerificationRecord) -> Result<RecordId, SourceError>;

    async fn history(&self, product: ProductId) -> Result<Vec<StoredVerification>, SourceError>;

    async fn find(&self, id: RecordId) -> Result<Lookup<StoredVerification>, SourceError>;
}
