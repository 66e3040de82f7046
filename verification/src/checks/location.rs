//! Scan location check.

use async_trait::async_trait;

use veritag_types::EvidenceResult;

use crate::check::{EvidenceCheck, EvidenceContext};

const SUSPICIOUS_MARKERS: [&str; 3] = ["unknown", "suspicious", "unverified"];

/// Flags scans reported from locations the scanner itself could not vouch for.
pub struct ScanLocationCheck;

#[async_trait]
impl EvidenceCheck for ScanLocationCheck {
    fn name(&self) -> &'static str {
        "scan_location"
    }

    async fn evaluate(&self, ctx: &EvidenceContext) -> EvidenceResult {
        let Some(location) = ctx.payload.location() else {
            return EvidenceResult::unavailable(self.name(), "no scan location reported");
        };
        let lowered = location.to_lowercase();
        if SUSPICIOUS_MARKERS.iter().any(|m| lowered.contains(m)) {
            EvidenceResult::warning(
                self.name(),
                format!("scan location {location:?} looks suspicious"),
            )
        } else {
            EvidenceResult::pass(self.name(), format!("scanned at {location}"))
        }
    }
}
