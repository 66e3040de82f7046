//! VeriTag node - the verification service and its ambient stack.
//!
//! The node wires the configured collaborators (ledger gateway, content
//! store, product registry) into the verification engine and:
//! - Records every finished attempt in the verification log
//! - Anchors verdicts on the ledger when configured
//! - Exposes Prometheus metrics
//! - Initialises structured logging and handles graceful shutdown

pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod node;
pub mod service;
pub mod shutdown;
pub mod tracing_spans;

pub use config::NodeConfig;
pub use error::NodeError;
pub use logging::{init_logging, LogFormat};
pub use metrics::NodeMetrics;
pub use node::VeritagNode;
pub use service::{
    AnalyzeCommand, HistoryEntry, PatternStats, ProductAnalysis, VerificationFrequency,
    VerificationResponse, VerificationService, VerifyCommand,
};
pub use shutdown::ShutdownController;
