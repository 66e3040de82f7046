//! The verification service: orchestrates a scan, anchors the outcome on the
//! ledger, persists the record and reports metrics.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{error, info, warn, Instrument};

use veritag_store::{LedgerClient, LedgerFields, Lookup, StoredVerification, VerificationLog};
use veritag_types::{
    EvidenceResult, Manufacturer, ManufacturerId, ProductId, RecordId, RiskLevel, Timestamp,
    Verdict, VerificationRecord, VerificationRequest,
};
use veritag_verification::{VerificationError, VerificationOrchestrator, VerificationReport};

use crate::metrics::NodeMetrics;
use crate::tracing_spans::{ledger_anchor_span, product_analysis_span, verification_request_span};
use crate::NodeError;

/// Past attempts at or above this count are reported as high frequency.
const HIGH_FREQUENCY_ATTEMPTS: usize = 10;

/// How many of the newest records an analysis lists.
const ANALYSIS_HISTORY_LEN: usize = 10;

/// A verification request as submitted by a client.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct VerifyCommand {
    #[serde(flatten)]
    pub request: VerificationRequest,
    /// The user performing the scan, if authenticated.
    #[serde(default)]
    pub verifier_id: Option<u64>,
}

/// The answer returned to the client.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VerificationResponse {
    pub is_authentic: bool,
    pub confidence: f64,
    pub risk_level: RiskLevel,
    pub indeterminate: bool,
    pub reasons: Vec<String>,
    pub recommendation: String,
    pub evidence: Vec<EvidenceResult>,
    pub partial: bool,
    pub ledger_anchored: bool,
    /// `None` when the record could not be persisted.
    pub record_id: Option<RecordId>,
}

impl VerificationResponse {
    fn new(
        verdict: &Verdict,
        evidence: &[EvidenceResult],
        partial: bool,
        ledger_anchored: bool,
        record_id: Option<RecordId>,
    ) -> Self {
        Self {
            is_authentic: verdict.is_authentic(),
            confidence: verdict.confidence(),
            risk_level: verdict.risk_level(),
            indeterminate: verdict.indeterminate(),
            reasons: verdict.reasons().to_vec(),
            recommendation: verdict.recommendation().to_string(),
            evidence: evidence.to_vec(),
            partial,
            ledger_anchored,
            record_id,
        }
    }
}

/// Input of a dry-run analysis. Without a claimed QR hash the registry's own
/// code is checked.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AnalyzeCommand {
    #[serde(default)]
    pub claimed_qr_hash: Option<String>,
    #[serde(default)]
    pub claimed_content_hash: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationFrequency {
    Normal,
    High,
}

/// Counts over every recorded attempt for a product.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PatternStats {
    pub total: usize,
    pub authentic: usize,
    pub counterfeit: usize,
    pub indeterminate: usize,
    pub frequency: VerificationFrequency,
}

impl PatternStats {
    fn of(history: &[StoredVerification]) -> Self {
        let total = history.len();
        let indeterminate = history
            .iter()
            .filter(|s| s.record.verdict.indeterminate())
            .count();
        let authentic = history
            .iter()
            .filter(|s| s.record.verdict.is_authentic())
            .count();
        let frequency = if total < HIGH_FREQUENCY_ATTEMPTS {
            VerificationFrequency::Normal
        } else {
            VerificationFrequency::High
        };
        Self {
            total,
            authentic,
            counterfeit: total - authentic - indeterminate,
            indeterminate,
            frequency,
        }
    }
}

/// One line of the recent history in an analysis.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: RecordId,
    pub verified_at: Timestamp,
    pub is_authentic: bool,
    pub confidence: f64,
    pub location: Option<String>,
}

impl From<&StoredVerification> for HistoryEntry {
    fn from(stored: &StoredVerification) -> Self {
        Self {
            id: stored.id,
            verified_at: stored.record.verified_at,
            is_authentic: stored.record.verdict.is_authentic(),
            confidence: stored.record.verdict.confidence(),
            location: stored.record.location.clone(),
        }
    }
}

/// A verification run that is neither recorded nor anchored, together with
/// the product's recorded history.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProductAnalysis {
    pub product_id: ProductId,
    pub product_name: String,
    pub manufacturer_id: ManufacturerId,
    /// `None` when the manufacturer is unknown or the registry could not say.
    pub manufacturer: Option<Manufacturer>,
    pub detection: VerificationResponse,
    pub pattern: PatternStats,
    /// Newest first.
    pub recent_history: Vec<HistoryEntry>,
    pub analyzed_at: Timestamp,
}

/// Fires the attempt's cancellation when the caller stops waiting for it.
struct CancelOnDrop(broadcast::Sender<()>);

impl CancelOnDrop {
    fn fire(&self) {
        let _ = self.0.send(());
    }
}

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.fire();
    }
}

struct ServiceInner {
    orchestrator: VerificationOrchestrator,
    ledger: Arc<dyn LedgerClient>,
    log: Arc<dyn VerificationLog>,
    metrics: Arc<NodeMetrics>,
}

/// Cheap to clone; clones share the same collaborators and metrics.
#[derive(Clone)]
pub struct VerificationService {
    inner: Arc<ServiceInner>,
    anchor_on_ledger: bool,
}

impl VerificationService {
    pub fn new(
        orchestrator: VerificationOrchestrator,
        ledger: Arc<dyn LedgerClient>,
        log: Arc<dyn VerificationLog>,
        metrics: Arc<NodeMetrics>,
    ) -> Self {
        Self {
            inner: Arc::new(ServiceInner {
                orchestrator,
                ledger,
                log,
                metrics,
            }),
            anchor_on_ledger: true,
        }
    }

    pub fn with_ledger_anchoring(mut self, enabled: bool) -> Self {
        self.anchor_on_ledger = enabled;
        self
    }

    pub fn metrics(&self) -> &Arc<NodeMetrics> {
        &self.inner.metrics
    }

    /// Verify a scan and record the outcome.
    ///
    /// The attempt runs on its own task. If the caller drops the returned
    /// future, in-flight checks are cancelled and the partial outcome is
    /// still recorded.
    pub async fn verify(&self, command: VerifyCommand) -> Result<VerificationResponse, NodeError> {
        self.verify_inner(command, None).await
    }

    /// Like [`verify`](Self::verify), but in-flight checks also stop when
    /// `cancel` fires.
    pub async fn verify_with_cancel(
        &self,
        command: VerifyCommand,
        cancel: broadcast::Receiver<()>,
    ) -> Result<VerificationResponse, NodeError> {
        self.verify_inner(command, Some(cancel)).await
    }

    async fn verify_inner(
        &self,
        command: VerifyCommand,
        mut cancel: Option<broadcast::Receiver<()>>,
    ) -> Result<VerificationResponse, NodeError> {
        let span = verification_request_span(
            command.request.product_id.unwrap_or_default(),
            command.verifier_id,
        );
        let (cancel_tx, cancel_rx) = broadcast::channel(1);
        let guard = CancelOnDrop(cancel_tx);

        let inner = Arc::clone(&self.inner);
        let anchor = self.anchor_on_ledger;
        let mut attempt = tokio::spawn(
            async move { inner.process(command, cancel_rx, anchor).await }.instrument(span),
        );

        let joined = loop {
            tokio::select! {
                joined = &mut attempt => break joined,
                _ = cancelled(&mut cancel) => {
                    guard.fire();
                    cancel = None;
                }
            }
        };
        drop(guard);
        joined.map_err(|e| NodeError::Task(e.to_string()))?
    }

    /// Every recorded verification of `product`, oldest first.
    pub async fn history(&self, product: ProductId) -> Result<Vec<StoredVerification>, NodeError> {
        Ok(self.inner.log.history(product).await?)
    }

    /// A single recorded verification.
    pub async fn record(&self, id: RecordId) -> Result<Lookup<StoredVerification>, NodeError> {
        Ok(self.inner.log.find(id).await?)
    }

    /// Run every check against `product` without recording or anchoring the
    /// outcome, and summarise its recorded history.
    pub async fn analyze(
        &self,
        product: ProductId,
        command: AnalyzeCommand,
    ) -> Result<ProductAnalysis, NodeError> {
        self.inner
            .analyze(product, command)
            .instrument(product_analysis_span(product.get()))
            .await
    }
}

impl ServiceInner {
    async fn process(
        &self,
        command: VerifyCommand,
        cancel: broadcast::Receiver<()>,
        anchor_on_ledger: bool,
    ) -> Result<VerificationResponse, NodeError> {
        let started = Instant::now();
        let report = match self
            .orchestrator
            .verify_with_cancel(command.request, cancel)
            .await
        {
            Ok(report) => report,
            Err(e) => {
                if matches!(
                    e,
                    VerificationError::InputMalformed(_) | VerificationError::UnknownProduct(_)
                ) {
                    self.metrics.rejected.inc();
                }
                warn!(error = %e, "verification rejected");
                return Err(NodeError::Verification(e));
            }
        };

        let ledger_anchored = anchor_on_ledger && self.anchor(&report).await;
        let record = VerificationRecord {
            product_id: report.payload.product_id(),
            verifier_id: command.verifier_id,
            location: report.payload.location().map(str::to_string),
            notes: report.payload.notes().map(str::to_string),
            verified_at: report.evaluated_at,
            verdict: report.verdict,
            evidence: report.evidence,
            partial: report.partial,
            ledger_anchored,
        };

        let record_id = match self.log.append(record.clone()).await {
            Ok(id) => Some(id),
            Err(e) => {
                error!(error = %e, "failed to persist verification record");
                None
            }
        };

        self.metrics.observe_verdict(&record.verdict);
        if record.partial {
            self.metrics.partial_collections.inc();
        }
        self.metrics.check_timeouts.inc_by(report.timed_out as u64);
        self.metrics
            .verification_latency_ms
            .observe(started.elapsed().as_secs_f64() * 1000.0);

        info!(
            record = ?record_id.map(|id| id.get()),
            authentic = record.verdict.is_authentic(),
            anchored = ledger_anchored,
            cancelled = report.cancelled,
            "verification recorded"
        );
        Ok(VerificationResponse::new(
            &record.verdict,
            &record.evidence,
            record.partial,
            ledger_anchored,
            record_id,
        ))
    }

    /// Write the verdict to the ledger. Best effort: failure never changes
    /// the verdict.
    async fn anchor(&self, report: &VerificationReport) -> bool {
        if report.verdict.indeterminate() {
            return false;
        }
        let Some(product_ledger_id) = report.snapshot.as_ref().and_then(|s| s.ledger_id) else {
            return false;
        };
        let fields = LedgerFields::Verification {
            product_ledger_id,
            qr_hash: report.payload.claimed_qr_hash().to_string(),
            location: report.payload.location().map(str::to_string),
            is_authentic: report.verdict.is_authentic(),
            confidence: report.verdict.confidence(),
            verified_at: report.evaluated_at,
        };
        let product = report.payload.product_id().get();
        match self
            .ledger
            .register_record(fields)
            .instrument(ledger_anchor_span(product))
            .await
        {
            Ok(id) => {
                info!(ledger_id = %id, "verification anchored on ledger");
                true
            }
            Err(e) => {
                warn!(error = %e, "ledger anchoring failed");
                self.metrics.anchor_failures.inc();
                false
            }
        }
    }

    async fn analyze(
        &self,
        product: ProductId,
        command: AnalyzeCommand,
    ) -> Result<ProductAnalysis, NodeError> {
        let registry = &self.orchestrator.sources().registry;
        let snapshot = match registry.find_by_id(product).await? {
            Lookup::Found(snapshot) => snapshot,
            Lookup::NotFound => {
                return Err(NodeError::Verification(VerificationError::UnknownProduct(
                    product,
                )))
            }
        };

        let report = self
            .orchestrator
            .verify(VerificationRequest {
                product_id: Some(product.get()),
                claimed_qr_hash: command
                    .claimed_qr_hash
                    .unwrap_or_else(|| snapshot.qr_hash.clone()),
                claimed_content_hash: command.claimed_content_hash,
                location: command.location,
                notes: None,
            })
            .await?;

        let manufacturer = match registry.find_manufacturer(snapshot.manufacturer_id).await {
            Ok(Lookup::Found(manufacturer)) => Some(manufacturer),
            Ok(Lookup::NotFound) => None,
            Err(e) => {
                warn!(error = %e, "manufacturer lookup failed during analysis");
                None
            }
        };

        let history = self.log.history(product).await?;
        let recent_history = history
            .iter()
            .rev()
            .take(ANALYSIS_HISTORY_LEN)
            .map(HistoryEntry::from)
            .collect();

        info!(
            authentic = report.verdict.is_authentic(),
            recorded = history.len(),
            "product analysed"
        );
        Ok(ProductAnalysis {
            product_id: product,
            product_name: snapshot.name,
            manufacturer_id: snapshot.manufacturer_id,
            manufacturer,
            detection: VerificationResponse::new(
                &report.verdict,
                &report.evidence,
                report.partial,
                false,
                None,
            ),
            pattern: PatternStats::of(&history),
            recent_history,
            analyzed_at: report.evaluated_at,
        })
    }
}

/// Resolves when `cancel` fires. Never resolves without a receiver or once
/// every sender is gone.
async fn cancelled(cancel: &mut Option<broadcast::Receiver<()>>) {
    if let Some(rx) = cancel {
        match rx.recv().await {
            Ok(()) | Err(RecvError::Lagged(_)) => return,
            Err(RecvError::Closed) => {}
        }
    }
    std::future::pending::<()>().await
}
