//! The default evidence checks.

mod content;
mod ledger;
mod location;
mod manufacturer;
mod pattern;
mod qr;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;

use crate::check::EvidenceCheck;

pub use content::ContentIntegrityCheck;
pub use ledger::LedgerRegistrationCheck;
pub use location::ScanLocationCheck;
pub use manufacturer::{ManufacturerTrustCheck, ManufacturingDateCheck, RecordCompletenessCheck};
pub use pattern::BatchPatternCheck;
pub use qr::{QrFormatCheck, QrMatchCheck, QrUniquenessCheck};

/// The standard check set, in report order.
pub fn default_checks() -> Vec<Arc<dyn EvidenceCheck>> {
    vec![
        Arc::new(QrFormatCheck),
        Arc::new(QrMatchCheck),
        Arc::new(QrUniquenessCheck),
        Arc::new(ContentIntegrityCheck),
        Arc::new(LedgerRegistrationCheck),
        Arc::new(BatchPatternCheck),
        Arc::new(ManufacturerTrustCheck),
        Arc::new(RecordCompletenessCheck),
        Arc::new(ManufacturingDateCheck),
        Arc::new(ScanLocationCheck),
    ]
}
