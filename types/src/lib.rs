//! Fundamental types for VeriTag.
//!
//! This crate defines the value types shared across every other crate in the
//! workspace: identifiers, digests, timestamps, the scan payload, product
//! snapshots, evidence results, verdicts and persisted verification records.
//!
//! Everything here is plain data. Values that the verification engine treats
//! as immutable (`ScanPayload`, `EvidenceResult`, `Verdict`) keep their fields
//! private and expose read accessors only.

pub mod error;
pub mod evidence;
pub mod hash;
pub mod product;
pub mod record;
pub mod scan;
pub mod time;
pub mod verdict;

pub use error::TypesError;
pub use evidence::{CheckOutcome, EvidenceClass, EvidenceResult};
pub use hash::{digests_match, is_hex_digest, ContentHash, DIGEST_HEX_LEN};
pub use product::{
    LedgerId, Manufacturer, ManufacturerId, ProductCategory, ProductId, ProductSnapshot,
};
pub use record::{RecordId, VerificationRecord, VerificationSummary};
pub use scan::{ScanPayload, VerificationRequest};
pub use time::Timestamp;
pub use verdict::{RiskLevel, Verdict};
