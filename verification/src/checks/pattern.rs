//! Duplicate batch and verification pattern check.

use async_trait::async_trait;
use tracing::debug;

use veritag_types::{EvidenceResult, VerificationSummary};

use crate::check::{EvidenceCheck, EvidenceContext};
use crate::policy::CheckPolicy;

/// Flags shared batch numbers and unusual verification activity.
///
/// Only ever cautionary: a busy product is not a counterfeit product.
pub struct BatchPatternCheck;

#[async_trait]
impl EvidenceCheck for BatchPatternCheck {
    fn name(&self) -> &'static str {
        "batch_pattern"
    }

    async fn evaluate(&self, ctx: &EvidenceContext) -> EvidenceResult {
        let snapshot = &ctx.snapshot;
        let registry = &ctx.sources.registry;
        let since = ctx.now.days_before(ctx.policy.pattern_window_days);

        let (siblings, recent) = tokio::join!(
            registry.count_siblings_by_batch(
                snapshot.manufacturer_id,
                &snapshot.batch_number,
                snapshot.id,
            ),
            registry.recent_verifications(snapshot.id, since),
        );

        let (siblings, recent) = match (siblings, recent) {
            (Ok(s), Ok(r)) => (s, r),
            (Err(e), _) | (_, Err(e)) => {
                debug!(error = %e, "registry unavailable for pattern analysis");
                return EvidenceResult::unavailable(
                    self.name(),
                    "product registry unavailable - verification pattern not evaluated",
                );
            }
        };

        let findings = findings(&ctx.policy, siblings, &recent);
        if findings.is_empty() {
            EvidenceResult::pass(self.name(), "no unusual batch or verification pattern")
        } else {
            EvidenceResult::warning(self.name(), findings.join("; "))
        }
    }
}

fn findings(policy: &CheckPolicy, siblings: u64, recent: &[VerificationSummary]) -> Vec<String> {
    let mut findings = Vec::new();
    if siblings > policy.max_batch_siblings {
        findings.push(format!(
            "batch number shared with {siblings} other product(s)"
        ));
    }

    let attempts = recent.len() as u64;
    if attempts > policy.excessive_attempts {
        findings.push(format!(
            "{attempts} verification attempts in the last {} days",
            policy.pattern_window_days
        ));
    }

    if attempts > 0 {
        let flagged = recent.iter().filter(|s| s.flagged_counterfeit()).count();
        let ratio = flagged as f64 / attempts as f64;
        if ratio > policy.counterfeit_ratio_warn {
            findings.push(format!(
                "{flagged} of {attempts} recent verifications flagged as counterfeit"
            ));
        }
    }
    findings
}
