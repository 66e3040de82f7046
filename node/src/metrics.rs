//! Prometheus metrics for the VeriTag node.
//!
//! Exposes counters and histograms covering verification requests, their
//! verdicts and evidence collection.  The [`NodeMetrics`] struct owns a
//! dedicated [`Registry`] that the HTTP `/metrics` endpoint encodes into the
//! Prometheus text exposition format.

use prometheus::{
    register_histogram_with_registry, register_int_counter_with_registry, Encoder, Histogram,
    HistogramOpts, IntCounter, Opts, Registry, TextEncoder,
};

use veritag_types::Verdict;

/// Central collection of all node-level Prometheus metrics.
pub struct NodeMetrics {
    /// The Prometheus registry that owns every metric below.
    pub registry: Registry,

    // ── Counters ────────────────────────────────────────────────────────
    /// Verification attempts that produced a verdict.
    pub verifications: IntCounter,
    /// Verdicts that found the product authentic.
    pub authentic: IntCounter,
    /// Verdicts that found the product counterfeit.
    pub counterfeit: IntCounter,
    /// Verdicts where nothing could be established.
    pub indeterminate: IntCounter,
    /// Attempts whose evidence collection was cut short.
    pub partial_collections: IntCounter,
    /// Individual checks that ran out of time.
    pub check_timeouts: IntCounter,
    /// Requests rejected before evidence collection.
    pub rejected: IntCounter,
    /// Verifications that could not be anchored on the ledger.
    pub anchor_failures: IntCounter,

    // ── Histograms ──────────────────────────────────────────────────────
    /// End-to-end verification latency, in milliseconds.
    pub verification_latency_ms: Histogram,
}

impl NodeMetrics {
    /// Create a fresh set of metrics, all registered under a new
    /// [`Registry`].
    pub fn new() -> Self {
        let registry = Registry::new();

        let verifications = register_int_counter_with_registry!(
            Opts::new(
                "veritag_verifications_total",
                "Verification attempts that produced a verdict"
            ),
            registry
        )
        .expect("failed to register verifications counter");

        let authentic = register_int_counter_with_registry!(
            Opts::new("veritag_verdicts_authentic_total", "Authentic verdicts"),
            registry
        )
        .expect("failed to register authentic counter");

        let counterfeit = register_int_counter_with_registry!(
            Opts::new("veritag_verdicts_counterfeit_total", "Counterfeit verdicts"),
            registry
        )
        .expect("failed to register counterfeit counter");

        let indeterminate = register_int_counter_with_registry!(
            Opts::new(
                "veritag_verdicts_indeterminate_total",
                "Verdicts where no source could establish anything"
            ),
            registry
        )
        .expect("failed to register indeterminate counter");

        let partial_collections = register_int_counter_with_registry!(
            Opts::new(
                "veritag_partial_collections_total",
                "Attempts whose evidence collection hit the deadline or was cancelled"
            ),
            registry
        )
        .expect("failed to register partial_collections counter");

        let check_timeouts = register_int_counter_with_registry!(
            Opts::new(
                "veritag_check_timeouts_total",
                "Evidence checks that ran out of time"
            ),
            registry
        )
        .expect("failed to register check_timeouts counter");

        let rejected = register_int_counter_with_registry!(
            Opts::new(
                "veritag_rejected_requests_total",
                "Requests rejected before evidence collection"
            ),
            registry
        )
        .expect("failed to register rejected counter");

        let anchor_failures = register_int_counter_with_registry!(
            Opts::new(
                "veritag_ledger_anchor_failures_total",
                "Verifications that could not be anchored on the ledger"
            ),
            registry
        )
        .expect("failed to register anchor_failures counter");

        // Exponential buckets covering 1 ms → ~16 s.
        let verification_latency_ms = register_histogram_with_registry!(
            HistogramOpts::new(
                "veritag_verification_latency_ms",
                "End-to-end verification latency in milliseconds"
            )
            .buckets(prometheus::exponential_buckets(1.0, 2.0, 15).unwrap()),
            registry
        )
        .expect("failed to register verification_latency_ms histogram");

        Self {
            registry,
            verifications,
            authentic,
            counterfeit,
            indeterminate,
            partial_collections,
            check_timeouts,
            rejected,
            anchor_failures,
            verification_latency_ms,
        }
    }

    /// Count a verdict under exactly one of authentic, counterfeit or indeterminate.
    pub fn observe_verdict(&self, verdict: &Verdict) {
        self.verifications.inc();
        if verdict.indeterminate() {
            self.indeterminate.inc();
        } else if verdict.is_authentic() {
            self.authentic.inc();
        } else {
            self.counterfeit.inc();
        }
    }

    /// Encode every metric in the Prometheus text format.
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

impl Default for NodeMetrics {
    fn default() -> Self {
        Self::new()
    }
}
