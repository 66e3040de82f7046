//! Folds an evidence list into a verdict.
//!
//! The fold is pure: the same evidence list always yields the same verdict.
//!
//! - Any decisive failure: counterfeit, confidence 0, high risk.
//! - No evidence beyond `Indeterminate`: indeterminate, never authentic.
//! - Otherwise `confidence = 1 - fails/determinate - 0.15 * warns/total`,
//!   authentic at 0.5 and above.

use veritag_types::{CheckOutcome, EvidenceResult, RiskLevel, Verdict};

use crate::error::VerificationError;

/// Confidence at or above which a product is considered authentic.
pub const AUTHENTIC_THRESHOLD: f64 = 0.5;

/// Penalty weight of a `Warn` result, scaled by the number of checks.
pub const WARN_PENALTY: f64 = 0.15;

/// Below this confidence the risk is high.
pub const HIGH_RISK_BELOW: f64 = 0.4;

/// Below this confidence the risk is medium.
pub const MEDIUM_RISK_BELOW: f64 = 0.7;

const NO_EVIDENCE_REASON: &str = "no evidence could be collected";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OutcomeTally {
    pub pass: usize,
    pub fail: usize,
    pub warn: usize,
    pub indeterminate: usize,
}

impl OutcomeTally {
    pub fn of(results: &[EvidenceResult]) -> Self {
        results.iter().fold(Self::default(), |mut tally, r| {
            match r.outcome() {
                CheckOutcome::Pass => tally.pass += 1,
                CheckOutcome::Fail => tally.fail += 1,
                CheckOutcome::Warn => tally.warn += 1,
                CheckOutcome::Indeterminate => tally.indeterminate += 1,
            }
            tally
        })
    }

    pub fn determinate(&self) -> usize {
        self.pass + self.fail + self.warn
    }

    pub fn total(&self) -> usize {
        self.determinate() + self.indeterminate
    }
}

/// Confidence for a tally with no decisive failure, or `None` when nothing
/// determinate was observed.
///
/// `1 - fail/(pass + fail + warn) - 0.15 * warn/total`, clamped to [0, 1].
///
/// Warns count in the denominator of the failure ratio. With at least one
/// Fail, an extra Warn therefore dilutes that ratio by more than its own
/// penalty and can raise confidence: {pass 1, fail 1} scores 0.5 while
/// {pass 1, fail 1, warn 1} scores about 0.617. This follows the published
/// formula and is intended. Confidence is still non-increasing in Fail, in
/// Warn when there are no Fails, and when a Warn becomes a Fail.
pub fn confidence(tally: &OutcomeTally) -> Option<f64> {
    let determinate = tally.determinate();
    if determinate == 0 {
        return None;
    }
    let negative_ratio = tally.fail as f64 / determinate as f64;
    let warn_penalty = WARN_PENALTY * tally.warn as f64 / tally.total() as f64;
    Some((1.0 - negative_ratio - warn_penalty).clamp(0.0, 1.0))
}

pub fn risk_level(confidence: f64) -> RiskLevel {
    if confidence < HIGH_RISK_BELOW {
        RiskLevel::High
    } else if confidence < MEDIUM_RISK_BELOW {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

/// Reasons with decisive failures first, then by severity, stable on check order.
fn ordered_reasons(results: &[EvidenceResult]) -> Vec<String> {
    let mut ordered: Vec<&EvidenceResult> = results.iter().collect();
    ordered.sort_by_key(|r| (!r.is_decisive_failure(), r.outcome().severity_rank()));
    ordered.into_iter().map(|r| r.reason().to_string()).collect()
}

pub fn aggregate(results: &[EvidenceResult]) -> Result<Verdict, VerificationError> {
    let mut reasons = ordered_reasons(results);
    if reasons.is_empty() {
        reasons.push(NO_EVIDENCE_REASON.to_string());
    }

    let verdict = if results.iter().any(EvidenceResult::is_decisive_failure) {
        Verdict::new(false, 0.0, RiskLevel::High, reasons, false)
    } else {
        match confidence(&OutcomeTally::of(results)) {
            None => Verdict::new(false, 0.0, RiskLevel::High, reasons, true),
            Some(confidence) => Verdict::new(
                confidence >= AUTHENTIC_THRESHOLD,
                confidence,
                risk_level(confidence),
                reasons,
                false,
            ),
        }
    };
    verdict.map_err(VerificationError::Verdict)
}
