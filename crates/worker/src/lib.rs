//! Background worker that keeps every hotel's RFC catalog reconciled.
//!
//! The binary wires configuration, the database pool, the event bus and
//! [`ReconcileScheduler`] together; the pieces live here so they can be
//! tested without the process entry point.

pub mod config;
pub mod scheduler;

pub use config::WorkerConfig;
pub use scheduler::{ReconcileScheduler, SweepSummary};
