//! The evidence check capability and the context every check reads.

use async_trait::async_trait;
use std::sync::Arc;

use veritag_store::{ContentStore, LedgerClient, ProductRegistry};
use veritag_types::{EvidenceResult, ProductSnapshot, ScanPayload, Timestamp};

use crate::policy::CheckPolicy;

/// Handles to the external sources a check may read.
#[derive(Clone)]
pub struct Collaborators {
    pub registry: Arc<dyn ProductRegistry>,
    pub ledger: Arc<dyn LedgerClient>,
    pub content: Arc<dyn ContentStore>,
}

/// Everything a check sees for one attempt. Shared read-only between checks.
pub struct EvidenceContext {
    pub payload: ScanPayload,
    pub snapshot: ProductSnapshot,
    pub sources: Collaborators,
    /// Evaluation time, fixed once per attempt.
    pub now: Timestamp,
    pub policy: CheckPolicy,
}

/// One independent evidence collector.
///
/// `evaluate` must map every collaborator failure onto an [`EvidenceResult`];
/// it never returns an error and never writes to a collaborator.
#[async_trait]
pub trait EvidenceCheck: Send + Sync {
    /// Stable name reported in the evidence list.
    fn name(&self) -> &'static str;

    async fn evaluate(&self, ctx: &EvidenceContext) -> EvidenceResult;
}
