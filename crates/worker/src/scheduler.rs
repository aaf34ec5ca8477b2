//! Periodic reconciliation sweep.
//!
//! Each tick lists hotels that have room units flagged `changed` and runs
//! one pass per hotel, sequentially. A failed pass is logged and left for
//! the next sweep; the dirty flags it did not clear keep the hotel listed.

use std::sync::Arc;
use std::time::Duration;

use roomcat_db::repositories::RoomUnitRepo;
use roomcat_db::DbPool;
use roomcat_pipeline::RfcReconciler;
use tokio_util::sync::CancellationToken;

/// Outcome of one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepSummary {
    pub hotels: usize,
    pub reconciled: usize,
    pub failed: usize,
}

/// Background service that drives [`RfcReconciler`] for every dirty hotel.
pub struct ReconcileScheduler {
    pool: DbPool,
    reconciler: Arc<RfcReconciler>,
    interval: Duration,
    batch_hotels: i64,
}

impl ReconcileScheduler {
    pub fn new(
        pool: DbPool,
        reconciler: Arc<RfcReconciler>,
        interval: Duration,
        batch_hotels: i64,
    ) -> Self {
        Self {
            pool,
            reconciler,
            interval,
            batch_hotels,
        }
    }

    /// Run the sweep loop until `cancel` is triggered.
    ///
    /// A pass in progress when cancellation arrives is allowed to finish.
    pub async fn run(&self, cancel: CancellationToken) {
        tracing::info!(
            interval_secs = self.interval.as_secs(),
            batch_hotels = self.batch_hotels,
            "Reconcile scheduler started"
        );

        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Reconcile scheduler stopping");
                    break;
                }
                _ = interval.tick() => {
                    match self.sweep().await {
                        Ok(summary) if summary.hotels > 0 => {
                            tracing::info!(
                                hotels = summary.hotels,
                                reconciled = summary.reconciled,
                                failed = summary.failed,
                                "Reconcile sweep finished"
                            );
                        }
                        Ok(_) => tracing::debug!("Reconcile sweep: no dirty hotels"),
                        Err(e) => tracing::error!(error = %e, "Reconcile sweep failed"),
                    }
                }
            }
        }
    }

    /// Reconcile every hotel that currently has changed room units.
    pub async fn sweep(&self) -> Result<SweepSummary, sqlx::Error> {
        let hotels = RoomUnitRepo::list_hotels_with_changes(&self.pool, self.batch_hotels).await?;

        let mut summary = SweepSummary {
            hotels: hotels.len(),
            ..SweepSummary::default()
        };
        for hotel_id in hotels {
            // The reconciler logs failures with their phase.
            match self.reconciler.run_pass(hotel_id).await {
                Ok(_) => summary.reconciled += 1,
                Err(_) => summary.failed += 1,
            }
        }
        Ok(summary)
    }
}
