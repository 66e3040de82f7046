//! HTTP API for the VeriTag node.
//!
//! Provides endpoints for:
//! - Submitting a scan for verification
//! - Reading a single record or the verification history of a product
//! - Dry-run analysis of a product
//! - Health checks
//! - Prometheus metrics

pub mod error;
pub mod handlers;
pub mod server;

pub use error::RpcError;
pub use server::{router, serve, ApiState, RpcServer};
