//! The final authenticity determination.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::TypesError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        })
    }
}

/// Verdict of one verification attempt.
///
/// Built once by the aggregator and never mutated. `reasons` always holds at
/// least one line.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    is_authentic: bool,
    confidence: f64,
    risk_level: RiskLevel,
    reasons: Vec<String>,
    indeterminate: bool,
}

impl Verdict {
    pub fn new(
        is_authentic: bool,
        confidence: f64,
        risk_level: RiskLevel,
        reasons: Vec<String>,
        indeterminate: bool,
    ) -> Result<Self, TypesError> {
        if reasons.is_empty() {
            return Err(TypesError::EmptyReasons);
        }
        if !(0.0..=1.0).contains(&confidence) {
            return Err(TypesError::ConfidenceOutOfRange(confidence));
        }
        Ok(Self {
            is_authentic,
            confidence,
            risk_level,
            reasons,
            indeterminate,
        })
    }

    pub fn is_authentic(&self) -> bool {
        self.is_authentic
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    pub fn risk_level(&self) -> RiskLevel {
        self.risk_level
    }

    pub fn reasons(&self) -> &[String] {
        &self.reasons
    }

    /// True when no source could establish anything. The confidence is then
    /// meaningless and must not be read as "low risk".
    pub fn indeterminate(&self) -> bool {
        self.indeterminate
    }

    /// Advice for the person holding the product.
    pub fn recommendation(&self) -> &'static str {
        if self.indeterminate {
            return "Authenticity could not be established. Retry later or verify through official channels.";
        }
        if !self.is_authentic {
            return "Product appears to be counterfeit. Do not purchase or use.";
        }
        match self.risk_level {
            RiskLevel::High => {
                "High risk product. Exercise extreme caution and verify through official channels."
            }
            RiskLevel::Medium => "Medium risk product. Additional verification recommended.",
            RiskLevel::Low => "Low risk product. Appears authentic based on current analysis.",
        }
    }
}
