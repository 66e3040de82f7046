//! Stand-in for a collaborator that was never configured.

use async_trait::async_trait;

use crate::content::ContentStore;
use crate::ledger::{LedgerClient, LedgerFields, LedgerRecord};
use crate::{Lookup, SourceError};
use veritag_types::{ContentHash, LedgerId};

/// Answers every call with [`SourceError::Unavailable`], so evidence that
/// depends on a missing source is reported indeterminate rather than absent.
#[derive(Clone, Copy, Debug, Default)]
pub struct Unconfigured {
    source: &'static str,
}

impl Unconfigured {
    pub fn new(source: &'static str) -> Self {
        Self { source }
    }

    fn error(&self) -> SourceError {
        SourceError::Unavailable(format!("{} is not configured", self.source))
    }
}

#[async_trait]
impl LedgerClient for Unconfigured {
    async fn register_record(&self, _fields: LedgerFields) -> Result<LedgerId, SourceError> {
        Err(self.error())
    }

    async fn lookup_by_id(&self, _id: LedgerId) -> Result<Lookup<LedgerRecord>, SourceError> {
        Err(self.error())
    }

    async fn lookup_by_hash(&self, _qr_hash: &str) -> Result<Lookup<LedgerRecord>, SourceError> {
        Err(self.error())
    }
}

#[async_trait]
impl ContentStore for Unconfigured {
    async fn put(&self, _blob: Vec<u8>) -> Result<ContentHash, SourceError> {
        Err(self.error())
    }

    async fn get(&self, _hash: &ContentHash) -> Result<Lookup<Vec<u8>>, SourceError> {
        Err(self.error())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn every_call_is_unavailable() {
        let ledger = Unconfigured::new("ledger");
        let err = ledger.lookup_by_id(LedgerId::new(1)).await.unwrap_err();
        assert_eq!(
            err,
            SourceError::Unavailable("ledger is not configured".into())
        );
        assert!(ContentStore::get(&Unconfigured::new("content store"), &ContentHash::of(b"x"))
            .await
            .is_err());
    }
}
