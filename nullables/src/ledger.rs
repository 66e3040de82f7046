//! Nullable ledger: records registrations instead of sending them.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Mutex;
use std::time::Duration;

use veritag_store::{LedgerClient, LedgerFields, LedgerRecord, Lookup, SourceError};
use veritag_types::LedgerId;

use crate::Fault;

/// First id handed out by [`NullLedger::register_record`].
const FIRST_REGISTERED_ID: u64 = 10_000;

/// An in-memory ledger whose availability and latency are controllable.
pub struct NullLedger {
    records: Mutex<BTreeMap<LedgerId, LedgerRecord>>,
    registered: Mutex<Vec<LedgerFields>>,
    fault: Fault,
}

impl NullLedger {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(BTreeMap::new()),
            registered: Mutex::new(Vec::new()),
            fault: Fault::new(),
        }
    }

    pub fn insert(&self, record: LedgerRecord) {
        self.records.lock().unwrap().insert(record.id, record);
    }

    /// Mark a record deactivated, as the ledger owner would.
    pub fn deactivate(&self, id: LedgerId) {
        if let Some(record) = self.records.lock().unwrap().get_mut(&id) {
            record.is_active = false;
        }
    }

    /// Every set of fields passed to `register_record` (for assertions).
    pub fn registered(&self) -> Vec<LedgerFields> {
        self.registered.lock().unwrap().clone()
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

impl Default for NullLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LedgerClient for NullLedger {
    async fn register_record(&self, fields: LedgerFields) -> Result<LedgerId, SourceError> {
        self.fault.enter("ledger").await?;
        let mut registered = self.registered.lock().unwrap();
        registered.push(fields);
        Ok(LedgerId::new(FIRST_REGISTERED_ID + registered.len() as u64 - 1))
    }

    async fn lookup_by_id(&self, id: LedgerId) -> Result<Lookup<LedgerRecord>, SourceError> {
        self.fault.enter("ledger").await?;
        Ok(Lookup::from_option(
            self.records.lock().unwrap().get(&id).cloned(),
        ))
    }

    async fn lookup_by_hash(&self, qr_hash: &str) -> Result<Lookup<LedgerRecord>, SourceError> {
        self.fault.enter("ledger").await?;
        Ok(Lookup::from_option(
            self.records
                .lock()
                .unwrap()
                .values()
                .find(|r| r.qr_hash.eq_ignore_ascii_case(qr_hash))
                .cloned(),
        ))
    }
}
