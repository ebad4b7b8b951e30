//! RDC HTTP API
//!
//! The transport layer over the submission store:
//!
//! - `/api/consent`, `/api/surveys`: create/read/update/delete, invoking the
//!   rdc-core validators and normalizer before any write
//! - `/api/health`: liveness probe
//! - everything else: the static client application, with unknown non-API
//!   paths falling back to its entry page (client-side routing)
//!
//! Bodies are parsed from raw bytes so a malformed payload is a named 400,
//! never a bare framework rejection. Validation errors never reach the
//! store; storage faults are logged here and surfaced as a generic 500.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
pub mod config;
mod reply;
mod routes;

// Re-exports
pub use config::ServerConfig;
pub use routes::routes;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
