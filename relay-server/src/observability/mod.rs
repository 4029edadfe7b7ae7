//! Observability subsystem for relay
//!
//! Counters backing the structured logs.

pub mod metrics;

pub use metrics::Metrics;
