//! Collaborator traits for VeriTag.
//!
//! The verification engine talks to four external collaborators: the ledger,
//! the content store, the product registry and the verification log. Every
//! backend (HTTP gateways, in-memory, nullables for testing) implements these
//! traits and the rest of the codebase depends only on the traits.
//!
//! Every read distinguishes three outcomes: `Ok(Lookup::Found(_))`,
//! `Ok(Lookup::NotFound)` (the source explicitly disowns the key) and
//! `Err(SourceError)` (the source could not be asked). The last two must never
//! be collapsed.

pub mod clock;
pub mod content;
pub mod error;
pub mod ledger;
pub mod memory;
pub mod registry;
pub mod unconfigured;

pub use clock::{Clock, SystemClock};
pub use content::{ContentStore, ProductDocument};
pub use error::{Lookup, SourceError};
pub use ledger::{LedgerClient, LedgerFields, LedgerRecord};
pub use memory::{MemoryRegistry, RegistrySeed};
pub use registry::{ProductRegistry, StoredVerification, VerificationLog};
pub use unconfigured::Unconfigured;
