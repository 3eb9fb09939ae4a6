//! Secure access gateway for the Folio hybrid media store.
//!
//! Remote objects sit in a private bucket. This crate turns their keys into
//! time-limited URLs through the server-side [`RemoteObjectGateway`], batching
//! large file sets so the remote is never flooded.
//!
//! [`RemoteObjectGateway`]: folio_storage::RemoteObjectGateway

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod gateway;

pub use config::GatewayConfig;
pub use gateway::SecureAccessGateway;
