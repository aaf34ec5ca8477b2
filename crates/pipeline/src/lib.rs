//! RFC reconciliation pass orchestration.
//!
//! [`RfcReconciler`] runs one pass per hotel: it loads a snapshot inside a
//! single transaction, plans the pass with `roomcat_core`, applies the plan
//! through the repositories, resyncs cross-type mappings and average spaces,
//! commits, and only then notifies downstream availability and pricing
//! workers.

pub mod error;
pub mod executor;
pub mod loader;
pub mod mapping_sync;
pub mod notify;
pub mod reconciler;
pub mod report;
pub mod space_sync;

pub use error::ReconcileError;
pub use notify::InventoryNotifier;
pub use reconciler::RfcReconciler;
pub use report::PassReport;
