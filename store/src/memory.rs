//! In-memory product registry and verification log.
//!
//! Backs the daemon when no external database is configured, seeded from a
//! JSON file. Thread-safe for use with tokio's multi-threaded runtime.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

use crate::registry::{ProductRegistry, StoredVerification, VerificationLog};
use crate::{Lookup, SourceError};
use veritag_types::{
    Manufacturer, ManufacturerId, ProductId, ProductSnapshot, RecordId, Timestamp,
    VerificationRecord, VerificationSummary,
};

/// Initial registry contents.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RegistrySeed {
    #[serde(default)]
    pub manufacturers: Vec<Manufacturer>,
    #[serde(default)]
    pub products: Vec<ProductSnapshot>,
}

#[derive(Default)]
struct RegistryState {
    products: BTreeMap<ProductId, ProductSnapshot>,
    manufacturers: BTreeMap<ManufacturerId, Manufacturer>,
    records: Vec<StoredVerification>,
}

pub struct MemoryRegistry {
    state: RwLock<RegistryState>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(RegistryState::default()),
        }
    }

    pub fn from_seed(seed: RegistrySeed) -> Self {
        let registry = Self::new();
        {
            let mut state = registry
                .state
                .write()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            for m in seed.manufacturers {
                state.manufacturers.insert(m.id, m);
            }
            for p in seed.products {
                state.products.insert(p.id, p);
            }
        }
        registry
    }

    /// Load a [`RegistrySeed`] from a JSON file.
    pub fn from_seed_file(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| SourceError::Backend(format!("read {}: {e}", path.display())))?;
        let seed: RegistrySeed = serde_json::from_str(&content)
            .map_err(|e| SourceError::Backend(format!("parse {}: {e}", path.display())))?;
        debug!(
            products = seed.products.len(),
            manufacturers = seed.manufacturers.len(),
            "loaded registry seed"
        );
        Ok(Self::from_seed(seed))
    }

    pub fn insert_product(&self, product: ProductSnapshot) -> Result<(), SourceError> {
        self.write()?.products.insert(product.id, product);
        Ok(())
    }

    pub fn insert_manufacturer(&self, manufacturer: Manufacturer) -> Result<(), SourceError> {
        self.write()?
            .manufacturers
            .insert(manufacturer.id, manufacturer);
        Ok(())
    }

    pub fn record_count(&self) -> Result<usize, SourceError> {
        Ok(self.read()?.records.len())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, RegistryState>, SourceError> {
        self.state
            .read()
            .map_err(|_| SourceError::Backend("registry lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, RegistryState>, SourceError> {
        self.state
            .write()
            .map_err(|_| SourceError::Backend("registry lock poisoned".into()))
    }
}

impl Default for MemoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProductRegistry for MemoryRegistry {
    async fn find_by_id(&self, id: ProductId) -> Result<Lookup<ProductSnapshot>, SourceError> {
        Ok(Lookup::from_option(self.read()?.products.get(&id).cloned()))
    }

    async fn find_manufacturer(
        &self,
        id: ManufacturerId,
    ) -> Result<Lookup<Manufacturer>, SourceError> {
        Ok(Lookup::from_option(
            self.read()?.manufacturers.get(&id).cloned(),
        ))
    }

    async fn find_others_by_qr_hash(
        &self,
        qr_hash: &str,
        exclude: ProductId,
    ) -> Result<Vec<ProductId>, SourceError> {
        Ok(self
            .read()?
            .products
            .values()
            .filter(|p| p.id != exclude && p.is_active)
            .filter(|p| p.qr_hash.eq_ignore_ascii_case(qr_hash))
            .map(|p| p.id)
            .collect())
    }

    async fn count_siblings_by_batch(
        &self,
        manufacturer: ManufacturerId,
        batch: &str,
        exclude: ProductId,
    ) -> Result<u64, SourceError> {
        Ok(self
            .read()?
            .products
            .values()
            .filter(|p| p.id != exclude && p.is_active)
            .filter(|p| p.manufacturer_id == manufacturer && p.batch_number == batch)
            .count() as u64)
    }

    async fn recent_verifications(
        &self,
        product: ProductId,
        since: Timestamp,
    ) -> Result<Vec<VerificationSummary>, SourceError> {
        Ok(self
            .read()?
            .records
            .iter()
            .filter(|s| s.record.product_id == product && s.record.verified_at >= since)
            .map(|s| s.record.summary())
            .collect())
    }
}

#[async_trait]
impl VerificationLog for MemoryRegistry {
    async fn append(&self, record: VerificationRecord) -> Result<RecordId, SourceError> {
        let mut state = self.write()?;
        let id = RecordId::new(state.records.len() as u64 + 1);
        state.records.push(StoredVerification { id, record });
        Ok(id)
    }

    async fn history(&self, product: ProductId) -> Result<Vec<StoredVerification>, SourceError> {
        Ok(self
            .read()?
            .records
            .iter()
            .filter(|s| s.record.product_id == product)
            .cloned()
            .collect())
    }

    async fn find(&self, id: RecordId) -> Result<Lookup<StoredVerification>, SourceError> {
        Ok(Lookup::from_option(
            self.read()?.records.iter().find(|s| s.id == id).cloned(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use veritag_types::{ProductCategory, RiskLevel, Verdict};

    fn product(id: u64, batch: &str, qr: &str) -> ProductSnapshot {
        ProductSnapshot {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            description: "desc".into(),
            manufacturing_date: Timestamp::new(1_700_000_000),
            batch_number: batch.into(),
            category: ProductCategory::Electronics,
            manufacturer_id: ManufacturerId::new(1),
            qr_hash: qr.into(),
            content_hash: None,
            ledger_id: None,
            is_active: true,
        }
    }

    fn record(product: u64, at: u64, authentic: bool) -> VerificationRecord {
        VerificationRecord {
            product_id: ProductId::new(product),
            verifier_id: None,
            location: None,
            notes: None,
            verified_at: Timestamp::new(at),
            verdict: Verdict::new(authentic, 0.9, RiskLevel::Low, vec!["ok".into()], false)
                .unwrap(),
            evidence: vec![],
            partial: false,
            ledger_anchored: false,
        }
    }

    #[tokio::test]
    async fn qr_and_batch_queries_exclude_self_and_inactive() {
        let registry = MemoryRegistry::new();
        registry.insert_product(product(1, "B1", "qr-a")).unwrap();
        registry.insert_product(product(2, "B1", "QR-A")).unwrap();
        let mut inactive = product(3, "B1", "qr-a");
        inactive.is_active = false;
        registry.insert_product(inactive).unwrap();

        let others = registry
            .find_others_by_qr_hash("qr-a", ProductId::new(1))
            .await
            .unwrap();
        assert_eq!(others, vec![ProductId::new(2)]);

        let siblings = registry
            .count_siblings_by_batch(ManufacturerId::new(1), "B1", ProductId::new(1))
            .await
            .unwrap();
        assert_eq!(siblings, 1);
    }

    #[tokio::test]
    async fn unknown_product_is_not_found() {
        let registry = MemoryRegistry::new();
        let found = registry.find_by_id(ProductId::new(42)).await.unwrap();
        assert_eq!(found, Lookup::NotFound);
    }

    #[tokio::test]
    async fn appended_records_feed_recent_verifications() {
        let registry = MemoryRegistry::new();
        let first = registry.append(record(1, 100, true)).await.unwrap();
        let second = registry.append(record(1, 500, false)).await.unwrap();
        registry.append(record(2, 500, true)).await.unwrap();
        assert_eq!(first, RecordId::new(1));
        assert_eq!(second, RecordId::new(2));

        let recent = registry
            .recent_verifications(ProductId::new(1), Timestamp::new(200))
            .await
            .unwrap();
        assert_eq!(recent.len(), 1);
        assert!(recent[0].flagged_counterfeit());

        let history = registry.history(ProductId::new(1)).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(registry.record_count().unwrap(), 3);
    }

    #[tokio::test]
    async fn find_returns_record_by_id() {
        let registry = MemoryRegistry::new();
        let id = registry.append(record(3, 100, false)).await.unwrap();

        match registry.find(id).await.unwrap() {
            Lookup::Found(stored) => {
                assert_eq!(stored.id, id);
                assert_eq!(stored.record.product_id, ProductId::new(3));
            }
            Lookup::NotFound => panic!("appended record not found"),
        }
        assert_eq!(
            registry.find(RecordId::new(99)).await.unwrap(),
            Lookup::NotFound
        );
    }

    #[test]
    fn seed_file_loads_products_and_manufacturers() {
        let seed = RegistrySeed {
            manufacturers: vec![Manufacturer {
                id: ManufacturerId::new(1),
                name: "Acme".into(),
                is_active: true,
                is_verified: true,
            }],
            products: vec![product(1, "B1", "qr")],
        };
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(serde_json::to_string(&seed).unwrap().as_bytes())
            .unwrap();

        let registry = MemoryRegistry::from_seed_file(file.path()).unwrap();
        let state = registry.read().unwrap();
        assert_eq!(state.products.len(), 1);
        assert_eq!(state.manufacturers.len(), 1);
    }

    #[test]
    fn missing_seed_file_is_a_backend_error() {
        let result = MemoryRegistry::from_seed_file("/nonexistent/seed.json");
        assert!(matches!(result, Err(SourceError::Backend(_))));
    }
}
