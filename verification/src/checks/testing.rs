//! Shared fixtures for check unit tests.

use std::ops::Deref;
use std::sync::Arc;

use veritag_nullables::{NullContentStore, NullLedger, NullRegistry};
use veritag_store::{LedgerRecord, ProductDocument};
use veritag_types::{
    LedgerId, Manufacturer, ManufacturerId, ProductCategory, ProductId, ProductSnapshot,
    ScanPayload, Timestamp, VerificationRequest,
};

use crate::check::{Collaborators, EvidenceContext};
use crate::policy::CheckPolicy;

pub(crate) const QR: &str = "abababababababababababababababababababababababababababababababab";

/// 2025-06-15, well after every fixture's manufacturing date.
pub(crate) const NOW: u64 = 1_750_000_000;

pub(crate) fn product(id: u64) -> ProductSnapshot {
    ProductSnapshot {
        id: ProductId::new(id),
        name: "Amoxicillin 500mg".into(),
        description: "Antibiotic capsules".into(),
        manufacturing_date: Timestamp::new(1_700_000_000),
        batch_number: format!("AMX-{id:04}"),
        category: ProductCategory::Pharmaceuticals,
        manufacturer_id: ManufacturerId::new(9),
        qr_hash: QR.into(),
        content_hash: None,
        ledger_id: None,
        is_active: true,
    }
}

pub(crate) struct TestContext {
    pub inner: EvidenceContext,
    pub registry: Arc<NullRegistry>,
    pub ledger: Arc<NullLedger>,
    pub content: Arc<NullContentStore>,
}

impl Deref for TestContext {
    type Target = EvidenceContext;

    fn deref(&self) -> &EvidenceContext {
        &self.inner
    }
}

/// A context in which every source agrees with `snapshot`.
pub(crate) fn context(claimed_qr: &str, mut snapshot: ProductSnapshot) -> TestContext {
    let registry = Arc::new(NullRegistry::new());
    let ledger = Arc::new(NullLedger::new());
    let content = Arc::new(NullContentStore::new());

    let ledger_id = LedgerId::new(100 + snapshot.id.get());
    ledger.insert(LedgerRecord {
        id: ledger_id,
        product_name: snapshot.name.clone(),
        batch_number: snapshot.batch_number.clone(),
        manufacturer_id: snapshot.manufacturer_id,
        qr_hash: snapshot.qr_hash.clone(),
        is_active: true,
        registered_at: snapshot.manufacturing_date,
    });
    snapshot.ledger_id = Some(ledger_id);

    let document = ProductDocument::from_snapshot(&snapshot).to_bytes().unwrap();
    snapshot.content_hash = Some(content.insert(document));

    registry
        .insert_manufacturer(Manufacturer {
            id: snapshot.manufacturer_id,
            name: "Acme Pharma".into(),
            is_active: true,
            is_verified: true,
        })
        .unwrap();
    registry.insert_product(snapshot.clone()).unwrap();

    let payload = ScanPayload::from_request(VerificationRequest {
        product_id: Some(snapshot.id.get()),
        claimed_qr_hash: claimed_qr.into(),
        ..Default::default()
    })
    .unwrap();

    TestContext {
        inner: EvidenceContext {
            payload,
            snapshot,
            sources: Collaborators {
                registry: registry.clone(),
                ledger: ledger.clone(),
                content: content.clone(),
            },
            now: Timestamp::new(NOW),
            policy: CheckPolicy::default(),
        },
        registry,
        ledger,
        content,
    }
}
