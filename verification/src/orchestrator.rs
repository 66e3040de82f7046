//! Verification orchestrator: fans the checks out, joins them under a
//! deadline and scores the collected evidence.

use futures_util::stream::{FuturesUnordered, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::AbortHandle;
use tracing::{debug, info, info_span, warn, Instrument};

use veritag_store::{Clock, Lookup};
use veritag_types::{
    EvidenceResult, ProductSnapshot, ScanPayload, Timestamp, Verdict, VerificationRequest,
};

use crate::aggregator::aggregate;
use crate::check::{Collaborators, EvidenceCheck, EvidenceContext};
use crate::checks::default_checks;
use crate::error::VerificationError;
use crate::policy::{CheckPolicy, CollectionLimits};
use crate::state::{AttemptState, AttemptTracker};

/// Everything produced by one verification attempt.
#[derive(Clone, Debug)]
pub struct VerificationReport {
    pub payload: ScanPayload,
    /// `None` when the registry could not be reached.
    pub snapshot: Option<ProductSnapshot>,
    /// One result per check, in check order.
    pub evidence: Vec<EvidenceResult>,
    pub verdict: Verdict,
    /// Some checks were cut short by the deadline or a cancellation.
    pub partial: bool,
    /// The caller cancelled the attempt while checks were running.
    pub cancelled: bool,
    /// Checks that ran out of time, either their own or the deadline.
    pub timed_out: usize,
    pub evaluated_at: Timestamp,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Interruption {
    Deadline,
    Cancelled,
}

struct Collection {
    evidence: Vec<EvidenceResult>,
    interrupted: Option<Interruption>,
    partial: bool,
    timed_out: usize,
}

/// Result of one spawned check.
struct CheckRun {
    result: EvidenceResult,
    timed_out: bool,
}

/// Aborts the spawned checks when dropped, so a caller that stops polling
/// never leaves them running.
struct AbortOnDrop(Vec<AbortHandle>);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        for handle in &self.0 {
            handle.abort();
        }
    }
}

/// Runs the evidence checks for a scan and produces a [`VerificationReport`].
pub struct VerificationOrchestrator {
    sources: Collaborators,
    clock: Arc<dyn Clock>,
    checks: Vec<Arc<dyn EvidenceCheck>>,
    policy: CheckPolicy,
    limits: CollectionLimits,
}

impl VerificationOrchestrator {
    pub fn new(sources: Collaborators, clock: Arc<dyn Clock>) -> Self {
        Self {
            sources,
            clock,
            checks: default_checks(),
            policy: CheckPolicy::default(),
            limits: CollectionLimits::default(),
        }
    }

    pub fn with_checks(mut self, checks: Vec<Arc<dyn EvidenceCheck>>) -> Self {
        self.checks = checks;
        self
    }

    pub fn with_policy(mut self, policy: CheckPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_limits(mut self, limits: CollectionLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn sources(&self) -> &Collaborators {
        &self.sources
    }

    pub fn check_names(&self) -> Vec<&'static str> {
        self.checks.iter().map(|c| c.name()).collect()
    }

    pub fn limits(&self) -> CollectionLimits {
        self.limits
    }

    /// Verify a scan. Runs to completion unless the deadline cuts it short.
    pub async fn verify(
        &self,
        request: VerificationRequest,
    ) -> Result<VerificationReport, VerificationError> {
        self.run(request, None).await
    }

    /// Verify a scan, aborting in-flight checks when `cancel` fires.
    ///
    /// Evidence that resolved before the signal is kept and a verdict is still
    /// produced. A closed channel never cancels.
    pub async fn verify_with_cancel(
        &self,
        request: VerificationRequest,
        cancel: broadcast::Receiver<()>,
    ) -> Result<VerificationReport, VerificationError> {
        self.run(request, Some(cancel)).await
    }

    async fn run(
        &self,
        request: VerificationRequest,
        cancel: Option<broadcast::Receiver<()>>,
    ) -> Result<VerificationReport, VerificationError> {
        let payload =
            ScanPayload::from_request(request).map_err(VerificationError::InputMalformed)?;
        let span = info_span!("verification", product = %payload.product_id());
        self.score(payload, cancel).instrument(span).await
    }

    async fn score(
        &self,
        payload: ScanPayload,
        cancel: Option<broadcast::Receiver<()>>,
    ) -> Result<VerificationReport, VerificationError> {
        let mut tracker = AttemptTracker::new();
        let now = self.clock.now();

        let snapshot = match self.fetch_snapshot(&payload).await {
            Some(Lookup::Found(snapshot)) => Some(snapshot),
            Some(Lookup::NotFound) => {
                return Err(VerificationError::UnknownProduct(payload.product_id()))
            }
            None => None,
        };

        tracker.advance(AttemptState::CollectingEvidence)?;
        let collection = match &snapshot {
            Some(snapshot) => {
                let ctx = Arc::new(EvidenceContext {
                    payload: payload.clone(),
                    snapshot: snapshot.clone(),
                    sources: self.sources.clone(),
                    now,
                    policy: self.policy.clone(),
                });
                self.collect(ctx, cancel).await
            }
            None => self.registry_unavailable(),
        };

        if collection.partial {
            tracker.advance(AttemptState::PartiallyCollected)?;
        }
        let verdict = aggregate(&collection.evidence)?;
        tracker.advance(AttemptState::Scored)?;

        info!(
            authentic = verdict.is_authentic(),
            confidence = verdict.confidence(),
            risk = %verdict.risk_level(),
            indeterminate = verdict.indeterminate(),
            partial = collection.partial,
            "verification scored"
        );
        tracker.advance(AttemptState::Done)?;

        Ok(VerificationReport {
            payload,
            snapshot,
            evidence: collection.evidence,
            verdict,
            partial: tracker.was_partial(),
            cancelled: collection.interrupted == Some(Interruption::Cancelled),
            timed_out: collection.timed_out,
            evaluated_at: now,
        })
    }

    /// `None` when the registry could not answer in time.
    async fn fetch_snapshot(&self, payload: &ScanPayload) -> Option<Lookup<ProductSnapshot>> {
        let lookup = self.sources.registry.find_by_id(payload.product_id());
        match tokio::time::timeout(self.limits.check_timeout, lookup).await {
            Ok(Ok(found)) => Some(found),
            Ok(Err(e)) => {
                warn!(error = %e, "product registry unavailable");
                None
            }
            Err(_) => {
                warn!(timeout = ?self.limits.check_timeout, "product registry timed out");
                None
            }
        }
    }

    fn registry_unavailable(&self) -> Collection {
        let evidence = self
            .checks
            .iter()
            .map(|check| {
                let name = check.name();
                EvidenceResult::unavailable(
                    name,
                    format!("product registry unavailable - {name} not evaluated"),
                )
            })
            .collect();
        Collection {
            evidence,
            interrupted: None,
            partial: false,
            timed_out: 0,
        }
    }

    async fn collect(
        &self,
        ctx: Arc<EvidenceContext>,
        mut cancel: Option<broadcast::Receiver<()>>,
    ) -> Collection {
        let names = self.check_names();
        let mut slots: Vec<Option<EvidenceResult>> = vec![None; self.checks.len()];
        let mut aborts = AbortOnDrop(Vec::with_capacity(self.checks.len()));
        let mut pending = FuturesUnordered::new();

        for (index, check) in self.checks.iter().enumerate() {
            let check = Arc::clone(check);
            let ctx = Arc::clone(&ctx);
            let timeout = self.limits.check_timeout;
            let span = info_span!("check", name = check.name());
            let handle = tokio::spawn(
                async move { run_check(check.as_ref(), &ctx, timeout).await }.instrument(span),
            );
            aborts.0.push(handle.abort_handle());
            pending.push(async move { (index, handle.await) });
        }

        let deadline = tokio::time::sleep(self.limits.collection_deadline);
        tokio::pin!(deadline);
        let mut interrupted = None;
        let mut timed_out = 0;

        loop {
            tokio::select! {
                biased;
                next = pending.next() => match next {
                    Some((index, Ok(run))) => {
                        timed_out += usize::from(run.timed_out);
                        slots[index] = Some(run.result);
                    }
                    Some((index, Err(e))) => {
                        warn!(check = names[index], error = %e, "check task failed");
                        slots[index] = Some(EvidenceResult::unavailable(
                            names[index],
                            format!("{} failed to complete", names[index]),
                        ));
                    }
                    None => break,
                },
                _ = &mut deadline => {
                    interrupted = Some(Interruption::Deadline);
                    break;
                }
                _ = cancelled(&mut cancel) => {
                    interrupted = Some(Interruption::Cancelled);
                    break;
                }
            }
        }

        if let Some(reason) = interrupted {
            debug!(?reason, "collection interrupted, aborting in-flight checks");
        }
        drop(aborts);

        let partial = slots.iter().any(Option::is_none);
        if partial && interrupted == Some(Interruption::Deadline) {
            timed_out += slots.iter().filter(|s| s.is_none()).count();
        }
        let evidence = slots
            .into_iter()
            .zip(names)
            .map(|(slot, name)| {
                slot.unwrap_or_else(|| match interrupted {
                    Some(Interruption::Cancelled) => {
                        EvidenceResult::unavailable(name, format!("{name} cancelled"))
                    }
                    _ => EvidenceResult::unavailable(
                        name,
                        format!("{name} timed out before the collection deadline"),
                    ),
                })
            })
            .collect();

        Collection {
            evidence,
            interrupted,
            partial,
            timed_out,
        }
    }
}

async fn run_check(check: &dyn EvidenceCheck, ctx: &EvidenceContext, timeout: Duration) -> CheckRun {
    let name = check.name();
    match tokio::time::timeout(timeout, check.evaluate(ctx)).await {
        Ok(result) => {
            debug!(outcome = %result.outcome(), "check finished");
            CheckRun {
                result,
                timed_out: false,
            }
        }
        Err(_) => {
            warn!(?timeout, "check timed out");
            CheckRun {
                result: EvidenceResult::unavailable(
                    name,
                    format!("{name} timed out after {}ms", timeout.as_millis()),
                ),
                timed_out: true,
            }
        }
    }
}

/// Resolves when a cancellation signal arrives. Never resolves without a
/// receiver or once every sender is gone.
async fn cancelled(cancel: &mut Option<broadcast::Receiver<()>>) {
    if let Some(rx) = cancel {
        match rx.recv().await {
            Ok(()) | Err(RecvError::Lagged(_)) => return,
            Err(RecvError::Closed) => {}
        }
    }
    std::future::pending::<()>().await
}
