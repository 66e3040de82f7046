//! Evidence produced by a single check.
//!
//! Every check maps whatever it observed onto exactly one [`EvidenceClass`].
//! The class fixes the outcome and decisiveness, so an `EvidenceResult` can
//! never claim to be decisive without being a proven mismatch.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckOutcome {
    Pass,
    Fail,
    Warn,
    Indeterminate,
}

impl CheckOutcome {
    /// Rank used to order reasons: most severe first.
    pub fn severity_rank(&self) -> u8 {
        match self {
            Self::Fail => 0,
            Self::Warn => 1,
            Self::Indeterminate => 2,
            Self::Pass => 3,
        }
    }
}

impl fmt::Display for CheckOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pass => "pass",
            Self::Fail => "fail",
            Self::Warn => "warn",
            Self::Indeterminate => "indeterminate",
        })
    }
}

/// The closed taxonomy the aggregator reasons about.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceClass {
    /// Source data agrees with the claim.
    Consistent,
    /// Proven tamper signal. Always counterfeit.
    DecisiveMismatch,
    /// Transport failure or timeout. Neutral.
    SourceUnavailable,
    /// A source affirmatively contradicts the claim (explicit not-found,
    /// diverging data, conflicting owner). Negative, not decisive.
    ProvenAbsent,
    /// Soft anomaly. Small confidence penalty.
    DataWarning,
    /// A claimed value does not have the expected shape. Negative, not decisive.
    FormatViolation,
}

impl EvidenceClass {
    pub fn outcome(&self) -> CheckOutcome {
        match self {
            Self::Consistent => CheckOutcome::Pass,
            Self::DecisiveMismatch | Self::ProvenAbsent | Self::FormatViolation => {
                CheckOutcome::Fail
            }
            Self::SourceUnavailable => CheckOutcome::Indeterminate,
            Self::DataWarning => CheckOutcome::Warn,
        }
    }

    pub fn is_decisive(&self) -> bool {
        matches!(self, Self::DecisiveMismatch)
    }
}

/// Result of one evidence check. Immutable after creation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceResult {
    check_name: String,
    outcome: CheckOutcome,
    class: EvidenceClass,
    reason: String,
    decisive: bool,
}

impl EvidenceResult {
    pub fn new(check_name: impl Into<String>, class: EvidenceClass, reason: impl Into<String>) -> Self {
        Self {
            check_name: check_name.into(),
            outcome: class.outcome(),
            class,
            reason: reason.into(),
            decisive: class.is_decisive(),
        }
    }

    pub fn pass(check_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(check_name, EvidenceClass::Consistent, reason)
    }

    pub fn decisive_mismatch(check_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(check_name, EvidenceClass::DecisiveMismatch, reason)
    }

    pub fn proven_absent(check_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(check_name, EvidenceClass::ProvenAbsent, reason)
    }

    pub fn warning(check_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(check_name, EvidenceClass::DataWarning, reason)
    }

    pub fn unavailable(check_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(check_name, EvidenceClass::SourceUnavailable, reason)
    }

    pub fn malformed(check_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(check_name, EvidenceClass::FormatViolation, reason)
    }

    pub fn check_name(&self) -> &str {
        &self.check_name
    }

    pub fn outcome(&self) -> CheckOutcome {
        self.outcome
    }

    pub fn class(&self) -> EvidenceClass {
        self.class
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn decisive(&self) -> bool {
        self.decisive
    }

    /// Whether this result is a decisive failure that overrides everything else.
    pub fn is_decisive_failure(&self) -> bool {
        self.decisive && self.outcome == CheckOutcome::Fail
    }
}
