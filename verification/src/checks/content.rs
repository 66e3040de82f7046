//! Content store integrity check.

use async_trait::async_trait;
use tracing::debug;

use veritag_store::content::PRODUCT_DOCUMENT_KIND;
use veritag_store::{Lookup, ProductDocument};
use veritag_types::{digests_match, EvidenceResult};

use crate::check::{EvidenceCheck, EvidenceContext};

/// The product document in the content store must exist, hash to its address
/// and agree with the registry.
pub struct ContentIntegrityCheck;

#[async_trait]
impl EvidenceCheck for ContentIntegrityCheck {
    fn name(&self) -> &'static str {
        "content_integrity"
    }

    async fn evaluate(&self, ctx: &EvidenceContext) -> EvidenceResult {
        let Some(address) = ctx.snapshot.content_hash.as_ref() else {
            return EvidenceResult::unavailable(
                self.name(),
                "no content-store data available - limited verification",
            );
        };

        if let Some(claimed) = ctx.payload.claimed_content_hash() {
            if !digests_match(claimed.as_str(), address.as_str()) {
                return EvidenceResult::proven_absent(
                    self.name(),
                    "claimed content hash does not match the registered product data",
                );
            }
        }

        let blob = match ctx.sources.content.get(address).await {
            Ok(Lookup::Found(blob)) => blob,
            Ok(Lookup::NotFound) => {
                return EvidenceResult::proven_absent(
                    self.name(),
                    "product data not found in content store",
                )
            }
            Err(e) => {
                debug!(error = %e, %address, "content store unavailable");
                return EvidenceResult::unavailable(
                    self.name(),
                    "content store unavailable - limited verification",
                );
            }
        };

        if !address.addresses(&blob) {
            return EvidenceResult::proven_absent(
                self.name(),
                "content store data does not hash to its address",
            );
        }

        let document = match ProductDocument::from_bytes(&blob) {
            Ok(doc) if doc.kind == PRODUCT_DOCUMENT_KIND => doc,
            _ => {
                return EvidenceResult::proven_absent(
                    self.name(),
                    "content store data is not a product document",
                )
            }
        };

        let diverging = document.diverging_fields(&ctx.snapshot);
        if diverging.is_empty() {
            EvidenceResult::pass(self.name(), "content store data matches the registry")
        } else {
            EvidenceResult::proven_absent(
                self.name(),
                format!(
                    "content store data differs from the registry: {}",
                    diverging.join(", ")
                ),
            )
        }
    }
}
