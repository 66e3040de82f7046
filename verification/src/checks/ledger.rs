//! Ledger registration check.

use async_trait::async_trait;
use tracing::debug;

use veritag_store::Lookup;
use veritag_types::{digests_match, EvidenceResult};

use crate::check::{EvidenceCheck, EvidenceContext};

/// The product must be registered on the ledger under the same QR hash.
///
/// Looks up by ledger id when the registry holds one, otherwise by QR hash.
pub struct LedgerRegistrationCheck;

#[async_trait]
impl EvidenceCheck for LedgerRegistrationCheck {
    fn name(&self) -> &'static str {
        "ledger_registration"
    }

    async fn evaluate(&self, ctx: &EvidenceContext) -> EvidenceResult {
        let snapshot = &ctx.snapshot;
        let lookup = match snapshot.ledger_id {
            Some(id) => ctx.sources.ledger.lookup_by_id(id).await,
            None => ctx.sources.ledger.lookup_by_hash(&snapshot.qr_hash).await,
        };

        let record = match lookup {
            Ok(Lookup::Found(record)) => record,
            Ok(Lookup::NotFound) => {
                return EvidenceResult::proven_absent(
                    self.name(),
                    "product not registered on the ledger",
                )
            }
            Err(e) => {
                debug!(error = %e, product = %snapshot.id, "ledger unavailable");
                return EvidenceResult::unavailable(
                    self.name(),
                    "ledger unavailable - registration not verified",
                );
            }
        };

        if !digests_match(&record.qr_hash, &snapshot.qr_hash) {
            return EvidenceResult::proven_absent(
                self.name(),
                format!(
                    "ledger record {} carries a different QR code than the registry",
                    record.id
                ),
            );
        }
        if !record.is_active {
            return EvidenceResult::warning(
                self.name(),
                format!("ledger record {} is deactivated", record.id),
            );
        }
        EvidenceResult::pass(
            self.name(),
            format!("product registered on the ledger as record {}", record.id),
        )
    }
}
