//! Checks on the claimed QR hash.

use async_trait::async_trait;
use tracing::debug;

use veritag_types::{digests_match, is_hex_digest, EvidenceResult};

use crate::check::{EvidenceCheck, EvidenceContext};

/// The claimed QR hash must have the shape of a SHA-256 hex digest.
pub struct QrFormatCheck;

#[async_trait]
impl EvidenceCheck for QrFormatCheck {
    fn name(&self) -> &'static str {
        "qr_format"
    }

    async fn evaluate(&self, ctx: &EvidenceContext) -> EvidenceResult {
        if is_hex_digest(ctx.payload.claimed_qr_hash()) {
            EvidenceResult::pass(self.name(), "QR code format is valid")
        } else {
            EvidenceResult::malformed(
                self.name(),
                "QR code is not a 64-character hex digest",
            )
        }
    }
}

/// The claimed QR hash must equal the one assigned at registration.
///
/// A mismatch is the proven tamper signal.
pub struct QrMatchCheck;

#[async_trait]
impl EvidenceCheck for QrMatchCheck {
    fn name(&self) -> &'static str {
        "qr_match"
    }

    async fn evaluate(&self, ctx: &EvidenceContext) -> EvidenceResult {
        if digests_match(ctx.payload.claimed_qr_hash(), &ctx.snapshot.qr_hash) {
            EvidenceResult::pass(self.name(), "QR code matches the registered product")
        } else {
            EvidenceResult::decisive_mismatch(
                self.name(),
                "QR code mismatch - scanned code does not belong to this product",
            )
        }
    }
}

/// No other active product may carry the same QR hash.
pub struct QrUniquenessCheck;

#[async_trait]
impl EvidenceCheck for QrUniquenessCheck {
    fn name(&self) -> &'static str {
        "qr_uniqueness"
    }

    async fn evaluate(&self, ctx: &EvidenceContext) -> EvidenceResult {
        let snapshot = &ctx.snapshot;
        match ctx
            .sources
            .registry
            .find_others_by_qr_hash(&snapshot.qr_hash, snapshot.id)
            .await
        {
            Ok(others) => match others.first() {
                None => EvidenceResult::pass(self.name(), "QR code is unique"),
                Some(first) => EvidenceResult::proven_absent(
                    self.name(),
                    format!(
                        "QR code shared with {} other product(s), first is product {}",
                        others.len(),
                        first
                    ),
                ),
            },
            Err(e) => {
                debug!(error = %e, "registry unavailable for QR uniqueness");
                EvidenceResult::unavailable(
                    self.name(),
                    "product registry unavailable - QR uniqueness not evaluated",
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::testing::{context, product, QR};
    use veritag_types::{CheckOutcome, EvidenceClass};

    #[tokio::test]
    async fn format_rejects_short_and_non_hex_claims() {
        let ctx = context(&"zz".repeat(32), product(1));
        let r = QrFormatCheck.evaluate(&ctx).await;
        assert_eq!(r.class(), EvidenceClass::FormatViolation);
        assert!(!r.decisive());

        let ctx = context("abc123", product(1));
        assert_eq!(QrFormatCheck.evaluate(&ctx).await.outcome(), CheckOutcome::Fail);
    }

    #[tokio::test]
    async fn match_ignores_case_and_flags_mismatch_decisively() {
        let ctx = context(&QR.to_uppercase(), product(1));
        assert_eq!(QrMatchCheck.evaluate(&ctx).await.outcome(), CheckOutcome::Pass);

        let ctx = context(&"ef".repeat(32), product(1));
        let r = QrMatchCheck.evaluate(&ctx).await;
        assert!(r.is_decisive_failure());
        assert!(r.reason().contains("QR code mismatch"));
    }

    #[tokio::test]
    async fn uniqueness_reports_conflicting_products() {
        let ctx = context(QR, product(1));
        let mut twin = product(7);
        twin.batch_number = "OTHER".into();
        ctx.registry.insert_product(twin).unwrap();

        let r = QrUniquenessCheck.evaluate(&ctx).await;
        assert_eq!(r.class(), EvidenceClass::ProvenAbsent);
        assert!(r.reason().contains("product 7"), "{}", r.reason());
    }

    #[tokio::test]
    async fn uniqueness_is_indeterminate_when_registry_down() {
        let ctx = context(QR, product(1));
        ctx.registry.set_available(false);
        let r = QrUniquenessCheck.evaluate(&ctx).await;
        assert_eq!(r.outcome(), CheckOutcome::Indeterminate);
    }
}
