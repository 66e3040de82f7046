//! HTTP gateways to the external collaborators.
//!
//! - [`HttpContentStore`]: `POST {base}/content`, `GET {base}/content/{hash}`
//! - [`HttpLedgerClient`]: `POST {base}/records`, `GET {base}/records/{id}`,
//!   `GET {base}/records/by-qr/{hash}`
//!
//! Both map HTTP 404 onto [`Lookup::NotFound`](veritag_store::Lookup) and every
//! transport problem onto [`SourceError`](veritag_store::SourceError), so the
//! verification engine can tell "proven absent" apart from "can't tell".

pub mod content;
pub mod error;
pub mod ledger;

pub use content::HttpContentStore;
pub use error::GatewayError;
pub use ledger::HttpLedgerClient;
