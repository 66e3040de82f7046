//! Persisted outcome of a verification attempt.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::evidence::EvidenceResult;
use crate::product::ProductId;
use crate::time::Timestamp;
use crate::verdict::Verdict;

/// Identifier assigned by the verification log on append.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(u64);

impl RecordId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One verification attempt, written exactly once after the verdict exists.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VerificationRecord {
    pub product_id: ProductId,
    pub verifier_id: Option<u64>,
    pub location: Option<String>,
    pub notes: Option<String>,
    pub verified_at: Timestamp,
    pub verdict: Verdict,
    pub evidence: Vec<EvidenceResult>,
    /// Some checks did not finish before the collection deadline.
    pub partial: bool,
    /// The attempt was also written to the ledger.
    pub ledger_anchored: bool,
}

impl VerificationRecord {
    pub fn summary(&self) -> VerificationSummary {
        VerificationSummary {
            verified_at: self.verified_at,
            is_authentic: self.verdict.is_authentic(),
            indeterminate: self.verdict.indeterminate(),
        }
    }
}

/// The slice of a past record that the pattern check reads.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationSummary {
    pub verified_at: Timestamp,
    pub is_authentic: bool,
    pub indeterminate: bool,
}

impl VerificationSummary {
    /// Whether this attempt concluded the product was counterfeit.
    pub fn flagged_counterfeit(&self) -> bool {
        !self.is_authentic && !self.indeterminate
    }
}
