//! Ledger client trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{Lookup, SourceError};
use veritag_types::{LedgerId, ManufacturerId, ProductId, Timestamp};

/// The ledger's copy of a registered product.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerRecord {
    pub id: LedgerId,
    pub product_name: String,
    pub batch_number: String,
    pub manufacturer_id: ManufacturerId,
    pub qr_hash: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
    pub registered_at: Timestamp,
}

fn default_active() -> bool {
    true
}

/// Fields submitted when appending to the ledger.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LedgerFields {
    /// A new product registration.
    Product {
        product_id: ProductId,
        product_name: String,
        batch_number: String,
        manufacturer_id: ManufacturerId,
        qr_hash: String,
    },
    /// A completed verification, anchored against the product's ledger entry.
    Verification {
        product_ledger_id: LedgerId,
        qr_hash: String,
        location: Option<String>,
        is_authentic: bool,
        confidence: f64,
        verified_at: Timestamp,
    },
}

/// Append-only, externally verifiable product ledger.
///
/// `Ok(Lookup::NotFound)` means the ledger answered and has no such record;
/// `Err(_)` means it could not be asked.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    async fn register_record(&self, fields: LedgerFields) -> Result<LedgerId, SourceError>;

    async fn lookup_by_id(&self, id: LedgerId) -> Result<Lookup<LedgerRecord>, SourceError>;

    async fn lookup_by_hash(&self, qr_hash: &str) -> Result<Lookup<LedgerRecord>, SourceError>;
}
