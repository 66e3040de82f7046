//! Nullable infrastructure for deterministic testing.
//!
//! Every collaborator the verification engine reads (clock, ledger, content
//! store, product registry) is abstracted behind a trait in `veritag-store`.
//! This crate provides test-friendly implementations that:
//! - Return deterministic values
//! - Can be switched unavailable or slowed down programmatically
//! - Never touch the filesystem or network
//!
//! Usage: swap real implementations for nullables in tests.

pub mod clock;
pub mod content;
pub mod ledger;
pub mod registry;

pub use clock::NullClock;
pub use content::NullContentStore;
pub use ledger::NullLedger;
pub use registry::NullRegistry;

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use veritag_store::SourceError;

/// Availability switch and injected latency shared by every nullable source.
#[derive(Debug)]
pub(crate) struct Fault {
    available: AtomicBool,
    latency_ms: AtomicU64,
    calls: AtomicU64,
}

impl Fault {
    pub(crate) fn new() -> Self {
        Self {
            available: AtomicBool::new(true),
            latency_ms: AtomicU64::new(0),
            calls: AtomicU64::new(0),
        }
    }

    pub(crate) fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub(crate) fn set_latency(&self, latency: Duration) {
        self.latency_ms
            .store(latency.as_millis() as u64, Ordering::SeqCst);
    }

    pub(crate) fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }

    /// Apply latency, count the call and fail if switched off.
    pub(crate) async fn enter(&self, source: &str) -> Result<(), SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let latency = self.latency_ms.load(Ordering::SeqCst);
        if latency > 0 {
            tokio::time::sleep(Duration::from_millis(latency)).await;
        }
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(SourceError::Unavailable(format!("{source} switched off")))
        }
    }
}
