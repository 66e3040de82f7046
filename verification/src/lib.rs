//! Multi-source product authenticity verification.
//!
//! A scan is checked against four independent sources: the ledger, the
//! content store, the product registry and past verification activity. Each
//! [`EvidenceCheck`] turns what it observed into one
//! [`EvidenceResult`](veritag_types::EvidenceResult); the aggregator folds the
//! list into a [`Verdict`](veritag_types::Verdict).
//!
//! An unreachable source is neither negative nor positive evidence. Only a
//! proven tamper signal (a QR code that does not belong to the product) can
//! declare a product counterfeit on its own.
//!
//! The [`VerificationOrchestrator`] runs every check as its own task, bounds
//! each by a timeout and the whole fan-in by a collection deadline, and always
//! produces a verdict from whatever evidence resolved.

pub mod aggregator;
pub mod check;
pub mod checks;
pub mod error;
pub mod orchestrator;
pub mod policy;
pub mod state;

pub use aggregator::{aggregate, OutcomeTally};
pub use check::{Collaborators, EvidenceCheck, EvidenceContext};
pub use checks::default_checks;
pub use error::VerificationError;
pub use orchestrator::{VerificationOrchestrator, VerificationReport};
pub use policy::{CheckPolicy, CollectionLimits};
pub use state::{AttemptState, AttemptTracker};
