//! Outbound adapters implementing the domain ports.
//!
//! - **memory**: in-process store for development and tests
//! - **persistence**: PostgreSQL repositories using Diesel
//! - **metrics**: Prometheus exporters (feature-gated)
//!
//! Adapters translate between domain types and storage representations and
//! enforce the atomic guards their ports describe.

pub mod memory;
#[cfg(feature = "metrics")]
pub mod metrics;
pub mod persistence;
