//! Pass orchestration.
//!
//! `Idle -> Loading -> Grouping -> Reconciling -> Mapping -> Aggregating ->
//! Notifying -> Idle`. Everything up to and including Aggregating runs in one
//! transaction; the transaction rolls back on drop if any step fails.
//! Notifying runs after commit.

use std::sync::Arc;

use chrono::Utc;
use roomcat_core::error::CoreError;
use roomcat_core::rfc::{plan_pass, NewRfcDefaults, PassPhase, PassPlan};
use roomcat_core::types::DbId;
use roomcat_db::repositories::{HotelFeatureRepo, HotelRepo};
use roomcat_db::DbPool;

use crate::error::{persistence, ReconcileError};
use crate::executor::apply_plan;
use crate::loader::load_snapshot;
use crate::mapping_sync::sync_mappings;
use crate::notify::{dispatch, InventoryNotifier};
use crate::report::PassReport;
use crate::space_sync::sync_average_spaces;

/// Runs RFC reconciliation passes for hotels.
///
/// At most one pass per hotel is in flight at a time: each pass takes a
/// transaction-scoped advisory lock on the hotel id before loading.
pub struct RfcReconciler {
    pool: DbPool,
    notifier: Arc<dyn InventoryNotifier>,
    defaults: NewRfcDefaults,
}

impl RfcReconciler {
    pub fn new(pool: DbPool, notifier: Arc<dyn InventoryNotifier>) -> Self {
        Self {
            pool,
            notifier,
            defaults: NewRfcDefaults::default(),
        }
    }

    /// Override the attributes given to newly created RFCs.
    pub fn with_defaults(mut self, defaults: NewRfcDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    /// Entry point for upstream jobs.
    ///
    /// Returns `true` when the pass changed anything, `false` when the
    /// catalog was already converged. Any error means nothing was committed.
    pub async fn reconcile_rfc_inventory(&self, hotel_id: DbId) -> Result<bool, ReconcileError> {
        let report = self.run_pass(hotel_id).await?;
        Ok(!report.is_noop())
    }

    /// Run one full pass for `hotel_id` and return its report.
    pub async fn run_pass(&self, hotel_id: DbId) -> Result<PassReport, ReconcileError> {
        match self.run_pass_inner(hotel_id).await {
            Ok(report) => Ok(report),
            Err(e) => {
                tracing::error!(
                    hotel_id,
                    error = %e,
                    cause = std::error::Error::source(&e).map(tracing::field::display),
                    phase = e.phase().map(|p| p.as_str()),
                    "RFC reconciliation pass failed"
                );
                Err(e)
            }
        }
    }

    async fn run_pass_inner(&self, hotel_id: DbId) -> Result<PassReport, ReconcileError> {
        let mut report = PassReport::new(hotel_id, Utc::now());
        tracing::info!(hotel_id, pass_id = %report.pass_id, "RFC reconciliation pass started");

        let phase = enter(hotel_id, PassPhase::Loading);
        HotelRepo::find_by_id(&self.pool, hotel_id)
            .await
            .map_err(persistence(phase))?
            .ok_or(CoreError::NotFound {
                entity: "hotel",
                id: hotel_id,
            })?;
        let mut tx = self.pool.begin().await.map_err(persistence(phase))?;
        HotelRepo::lock_for_reconcile(&mut tx, hotel_id)
            .await
            .map_err(persistence(phase))?;
        let snapshot = load_snapshot(&mut tx, hotel_id).await?;
        let standard_feature_ids: Vec<DbId> = HotelFeatureRepo::list_standard(&mut tx, hotel_id)
            .await
            .map_err(persistence(phase))?
            .into_iter()
            .map(|f| f.id)
            .collect();

        let phase = enter(hotel_id, phase.next());
        let plan = plan_pass(&snapshot)?;
        log_drift(&plan);
        for decision in &plan.decisions {
            tracing::info!(
                hotel_id,
                scenario = %decision.scenario.kind(),
                signature = %decision.signature,
                target = %decision.target,
                units = decision.unit_ids.len(),
                "Reconciled signature group"
            );
        }

        let phase = enter(hotel_id, phase.next());
        let applied = apply_plan(&mut tx, &plan, &self.defaults, &standard_feature_ids).await?;

        let phase = enter(hotel_id, phase.next());
        let mappings = sync_mappings(&mut tx, hotel_id).await?;

        let phase = enter(hotel_id, phase.next());
        let space_targets = applied.resolve_all(&plan.membership_changed)?;
        let spaces = sync_average_spaces(&mut tx, &space_targets).await?;

        tx.commit().await.map_err(persistence(phase))?;

        report.changed_units = snapshot.changed_units.len();
        report.groups = plan.decisions.len();
        report.scenarios = plan.scenario_counts();
        report.created_rfc_ids = applied.created.clone();
        report.retargeted_rfc_ids = plan.retargets.iter().map(|r| r.rfc_id).collect();
        report.deleted_rfc_ids = plan.deletions.clone();
        report.corrected_rfc_ids = plan.feature_syncs.iter().map(|s| s.rfc_id).collect();
        report.assignments_moved = plan.moves.len();
        report.cascade_rows_deleted = applied.cascade.dependent_rows();
        report.mappings_inserted = mappings.inserted;
        report.mappings_deleted = mappings.deleted;
        report.spaces_updated = spaces.len();
        report.availability_product_ids = applied.resolve_all(&plan.grown)?;
        report.pricing_product_ids =
            applied.resolve_all(plan.membership_changed.union(&plan.bundle_changed))?;
        report.conflicting_assignments = plan.conflicting_assignments.len();
        report.duplicate_signatures = plan.duplicate_signatures.len();
        report.multi_member_deletions = plan.multi_member_deletions.len();
        report.finished_at = Utc::now();

        enter(hotel_id, phase.next());
        dispatch(self.notifier.as_ref(), &report);

        tracing::info!(
            hotel_id,
            pass_id = %report.pass_id,
            changed_units = report.changed_units,
            groups = report.groups,
            created = report.created_rfc_ids.len(),
            retargeted = report.retargeted_rfc_ids.len(),
            deleted = report.deleted_rfc_ids.len(),
            moved = report.assignments_moved,
            mappings_inserted = report.mappings_inserted,
            mappings_deleted = report.mappings_deleted,
            spaces_updated = report.spaces_updated,
            duration_ms = report.duration_ms(),
            "RFC reconciliation pass completed"
        );
        Ok(report)
    }

    /// Plan a pass without writing anything.
    ///
    /// Loads the snapshot in a read-only transaction, plans it and rolls
    /// back. The dirty flags stay set and no notifications are sent.
    pub async fn preview(&self, hotel_id: DbId) -> Result<PassPlan, ReconcileError> {
        let phase = PassPhase::Loading;
        let mut tx = self.pool.begin().await.map_err(persistence(phase))?;
        sqlx::query("SET TRANSACTION READ ONLY")
            .execute(&mut *tx)
            .await
            .map_err(persistence(phase))?;

        let snapshot = load_snapshot(&mut tx, hotel_id).await?;
        tx.rollback().await.map_err(persistence(phase))?;

        let plan = plan_pass(&snapshot)?;
        tracing::debug!(
            hotel_id,
            groups = plan.decisions.len(),
            noop = plan.is_noop(),
            "Previewed RFC reconciliation pass"
        );
        Ok(plan)
    }
}

fn enter(hotel_id: DbId, phase: PassPhase) -> PassPhase {
    tracing::debug!(hotel_id, phase = phase.as_str(), "Entering pass phase");
    phase
}

fn log_drift(plan: &PassPlan) {
    for (signature, rfc_id) in &plan.duplicate_signatures {
        tracing::warn!(
            hotel_id = plan.hotel_id,
            room_product_id = rfc_id,
            signature = %signature,
            "Active RFC shares its signature with a lower-id RFC; ignoring it as a match"
        );
    }
    for (room_unit_id, rfc_id) in &plan.conflicting_assignments {
        tracing::warn!(
            hotel_id = plan.hotel_id,
            room_unit_id,
            room_product_id = rfc_id,
            "Room unit assigned to more than one active RFC; keeping the lowest id"
        );
    }
    for (rfc_id, members) in &plan.multi_member_deletions {
        tracing::warn!(
            hotel_id = plan.hotel_id,
            room_product_id = rfc_id,
            members_at_start = members,
            "RFC lost all of its members in one pass; deleting it"
        );
    }
}
