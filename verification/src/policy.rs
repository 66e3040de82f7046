//! Thresholds and time bounds for evidence collection.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default per-check timeout.
pub const DEFAULT_CHECK_TIMEOUT: Duration = Duration::from_secs(2);

/// Default deadline for the whole fan-in.
pub const DEFAULT_COLLECTION_DEADLINE: Duration = Duration::from_secs(5);

/// Thresholds read by the individual checks.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckPolicy {
    /// Sibling products allowed to share a batch number before it is flagged.
    pub max_batch_siblings: u64,
    /// Verification attempts within the window before the rate is flagged.
    pub excessive_attempts: u64,
    /// Trailing window read by the pattern check.
    pub pattern_window_days: u64,
    /// Share of recent attempts judged counterfeit before it is flagged.
    pub counterfeit_ratio_warn: f64,
    /// Products older than this are flagged.
    pub max_product_age_days: u64,
    /// Batch numbers shorter than this are flagged.
    pub min_batch_len: usize,
}

impl Default for CheckPolicy {
    fn default() -> Self {
        Self {
            max_batch_siblings: 0,
            excessive_attempts: 20,
            pattern_window_days: 30,
            counterfeit_ratio_warn: 0.5,
            max_product_age_days: 3650,
            min_batch_len: 3,
        }
    }
}

/// Time bounds for one collection round.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CollectionLimits {
    /// Bound on each individual check.
    pub check_timeout: Duration,
    /// Bound on the whole fan-in. Checks still running are aborted.
    pub collection_deadline: Duration,
}

impl Default for CollectionLimits {
    fn default() -> Self {
        Self {
            check_timeout: DEFAULT_CHECK_TIMEOUT,
            collection_deadline: DEFAULT_COLLECTION_DEADLINE,
        }
    }
}
