//! Manufacturer trust, record completeness and manufacturing date checks.

use async_trait::async_trait;
use tracing::debug;

use veritag_store::Lookup;
use veritag_types::EvidenceResult;

use crate::check::{EvidenceCheck, EvidenceContext};

/// The manufacturer must exist, be active and be verified.
pub struct ManufacturerTrustCheck;

#[async_trait]
impl EvidenceCheck for ManufacturerTrustCheck {
    fn name(&self) -> &'static str {
        "manufacturer_trust"
    }

    async fn evaluate(&self, ctx: &EvidenceContext) -> EvidenceResult {
        let id = ctx.snapshot.manufacturer_id;
        match ctx.sources.registry.find_manufacturer(id).await {
            Ok(Lookup::NotFound) => {
                EvidenceResult::proven_absent(self.name(), format!("manufacturer {id} not found"))
            }
            Ok(Lookup::Found(m)) if !m.is_active => EvidenceResult::proven_absent(
                self.name(),
                format!("manufacturer {} is inactive", m.name),
            ),
            Ok(Lookup::Found(m)) if !m.is_verified => EvidenceResult::warning(
                self.name(),
                format!("manufacturer {} is not verified", m.name),
            ),
            Ok(Lookup::Found(m)) => EvidenceResult::pass(
                self.name(),
                format!("manufacturer {} is active and verified", m.name),
            ),
            Err(e) => {
                debug!(error = %e, manufacturer = %id, "registry unavailable");
                EvidenceResult::unavailable(
                    self.name(),
                    "product registry unavailable - manufacturer not evaluated",
                )
            }
        }
    }
}

/// Required product fields must be filled in and the product still active.
pub struct RecordCompletenessCheck;

#[async_trait]
impl EvidenceCheck for RecordCompletenessCheck {
    fn name(&self) -> &'static str {
        "record_completeness"
    }

    async fn evaluate(&self, ctx: &EvidenceContext) -> EvidenceResult {
        let snapshot = &ctx.snapshot;
        let mut missing = Vec::new();
        if snapshot.name.trim().is_empty() {
            missing.push("name");
        }
        if snapshot.batch_number.trim().is_empty() {
            missing.push("batch number");
        }
        if !missing.is_empty() {
            return EvidenceResult::proven_absent(
                self.name(),
                format!("product record is missing {}", missing.join(" and ")),
            );
        }
        if !snapshot.is_active {
            return EvidenceResult::proven_absent(self.name(), "product has been deactivated");
        }

        let mut gaps = Vec::new();
        if snapshot.description.trim().is_empty() {
            gaps.push("description is empty".to_string());
        }
        if snapshot.batch_number.trim().chars().count() < ctx.policy.min_batch_len {
            gaps.push(format!("batch number {:?} is unusually short", snapshot.batch_number));
        }
        if gaps.is_empty() {
            EvidenceResult::pass(self.name(), "product record is complete")
        } else {
            EvidenceResult::warning(self.name(), format!("product record: {}", gaps.join("; ")))
        }
    }
}

/// The manufacturing date must be neither in the future nor implausibly old.
pub struct ManufacturingDateCheck;

#[async_trait]
impl EvidenceCheck for ManufacturingDateCheck {
    fn name(&self) -> &'static str {
        "manufacturing_date"
    }

    async fn evaluate(&self, ctx: &EvidenceContext) -> EvidenceResult {
        let made = ctx.snapshot.manufacturing_date;
        if made > ctx.now {
            return EvidenceResult::proven_absent(
                self.name(),
                "manufacturing date is in the future",
            );
        }
        let age = made.age_in_days(ctx.now);
        if age > ctx.policy.max_product_age_days {
            return EvidenceResult::warning(
                self.name(),
                format!("product is unusually old ({age} days)"),
            );
        }
        EvidenceResult::pass(self.name(), "manufacturing date is plausible")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::testing::{context, product, NOW, QR};
    use veritag_types::time::SECS_PER_DAY;
    use veritag_types::{CheckOutcome, Manufacturer, ManufacturerId, Timestamp};

    #[tokio::test]
    async fn manufacturer_states_map_onto_outcomes() {
        let ctx = context(QR, product(1));
        assert_eq!(
            ManufacturerTrustCheck.evaluate(&ctx).await.outcome(),
            CheckOutcome::Pass
        );

        let mut m = Manufacturer {
            id: ManufacturerId::new(9),
            name: "Acme Pharma".into(),
            is_active: true,
            is_verified: false,
        };
        ctx.registry.insert_manufacturer(m.clone()).unwrap();
        assert_eq!(
            ManufacturerTrustCheck.evaluate(&ctx).await.outcome(),
            CheckOutcome::Warn
        );

        m.is_active = false;
        ctx.registry.insert_manufacturer(m).unwrap();
        assert_eq!(
            ManufacturerTrustCheck.evaluate(&ctx).await.outcome(),
            CheckOutcome::Fail
        );
    }

    #[tokio::test]
    async fn unknown_manufacturer_fails() {
        let mut ctx = context(QR, product(1));
        ctx.inner.snapshot.manufacturer_id = ManufacturerId::new(404);
        let r = ManufacturerTrustCheck.evaluate(&ctx).await;
        assert_eq!(r.outcome(), CheckOutcome::Fail);
        assert!(r.reason().contains("not found"));
    }

    #[tokio::test]
    async fn completeness_fails_on_missing_fields_and_warns_on_gaps() {
        let mut ctx = context(QR, product(1));
        assert_eq!(
            RecordCompletenessCheck.evaluate(&ctx).await.outcome(),
            CheckOutcome::Pass
        );

        ctx.inner.snapshot.description.clear();
        ctx.inner.snapshot.batch_number = "A1".into();
        let r = RecordCompletenessCheck.evaluate(&ctx).await;
        assert_eq!(r.outcome(), CheckOutcome::Warn);
        assert!(r.reason().contains("description is empty"));
        assert!(r.reason().contains("unusually short"));

        ctx.inner.snapshot.name = "  ".into();
        let r = RecordCompletenessCheck.evaluate(&ctx).await;
        assert_eq!(r.outcome(), CheckOutcome::Fail);
        assert!(r.reason().contains("missing name"));
    }

    #[tokio::test]
    async fn deactivated_product_fails_completeness() {
        let mut ctx = context(QR, product(1));
        ctx.inner.snapshot.is_active = false;
        let r = RecordCompletenessCheck.evaluate(&ctx).await;
        assert_eq!(r.outcome(), CheckOutcome::Fail);
    }

    #[tokio::test]
    async fn manufacturing_date_bounds() {
        let mut ctx = context(QR, product(1));
        assert_eq!(
            ManufacturingDateCheck.evaluate(&ctx).await.outcome(),
            CheckOutcome::Pass
        );

        ctx.inner.snapshot.manufacturing_date = Timestamp::new(NOW + SECS_PER_DAY);
        assert_eq!(
            ManufacturingDateCheck.evaluate(&ctx).await.outcome(),
            CheckOutcome::Fail
        );

        ctx.inner.snapshot.manufacturing_date = Timestamp::new(NOW).days_before(4000);
        assert_eq!(
            ManufacturingDateCheck.evaluate(&ctx).await.outcome(),
            CheckOutcome::Warn
        );
    }
}
