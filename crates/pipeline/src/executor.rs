//! Applies a [`PassPlan`] to the database on the pass connection.
//!
//! Writes happen in plan order: creations, retargets, retail-feature
//! corrections, assignment moves, cascade deletes, and finally the dirty
//! flag reset on the processed room units.

use roomcat_core::error::CoreError;
use roomcat_core::rfc::{NewRfcDefaults, PassPhase, PassPlan, ProductRef};
use roomcat_core::types::DbId;
use roomcat_db::models::room_product::CreateRoomProduct;
use roomcat_db::repositories::{
    AssignedUnitRepo, CascadeReport, RetailFeatureRepo, RoomProductRepo, RoomUnitRepo,
    StandardFeatureRepo,
};
use sqlx::PgConnection;

use crate::error::{persistence, ReconcileError};

const PHASE: PassPhase = PassPhase::Reconciling;

/// What applying a plan produced.
#[derive(Debug, Default)]
pub struct AppliedPlan {
    /// Ids of the RFCs created, indexed by [`ProductRef::New`] key.
    pub created: Vec<DbId>,
    pub cascade: CascadeReport,
    pub units_processed: u64,
}

impl AppliedPlan {
    /// Database id behind a plan reference.
    pub fn resolve(&self, product: ProductRef) -> Result<DbId, CoreError> {
        match product {
            ProductRef::Existing(id) => Ok(id),
            ProductRef::New(key) => self.created.get(key).copied().ok_or_else(|| {
                CoreError::Internal(format!("plan references unknown new RFC (key {key})"))
            }),
        }
    }

    /// Resolve a set of plan references, preserving order.
    pub fn resolve_all<'a>(
        &self,
        products: impl IntoIterator<Item = &'a ProductRef>,
    ) -> Result<Vec<DbId>, CoreError> {
        products.into_iter().map(|p| self.resolve(*p)).collect()
    }
}

/// Apply every catalog write of `plan`.
///
/// `standard_feature_ids` are linked to each newly created RFC.
pub async fn apply_plan(
    conn: &mut PgConnection,
    plan: &PassPlan,
    defaults: &NewRfcDefaults,
    standard_feature_ids: &[DbId],
) -> Result<AppliedPlan, ReconcileError> {
    let hotel_id = plan.hotel_id;
    let mut applied = AppliedPlan::default();

    for creation in &plan.creations {
        let input =
            CreateRoomProduct::rfc(hotel_id, &creation.code, &creation.signature, defaults);
        let product = RoomProductRepo::create(conn, &input)
            .await
            .map_err(persistence(PHASE))?;
        RetailFeatureRepo::insert_many(conn, hotel_id, product.id, &creation.features)
            .await
            .map_err(persistence(PHASE))?;
        StandardFeatureRepo::insert_many(conn, hotel_id, product.id, standard_feature_ids)
            .await
            .map_err(persistence(PHASE))?;

        tracing::info!(
            hotel_id,
            room_product_id = product.id,
            code = %product.code,
            signature = %creation.signature,
            "Created RFC"
        );
        applied.created.push(product.id);
    }

    for retarget in &plan.retargets {
        RetailFeatureRepo::delete_rate_adjustments(
            conn,
            retarget.rfc_id,
            &retarget.removed_feature_ids,
        )
        .await
        .map_err(persistence(PHASE))?;
        RetailFeatureRepo::replace_all(conn, hotel_id, retarget.rfc_id, &retarget.features)
            .await
            .map_err(persistence(PHASE))?;
        let updated =
            RoomProductRepo::update_feature_signature(conn, retarget.rfc_id, &retarget.signature)
                .await
                .map_err(persistence(PHASE))?;
        if !updated {
            return Err(CoreError::NotFound {
                entity: "room_product",
                id: retarget.rfc_id,
            }
            .into());
        }

        tracing::info!(
            hotel_id,
            room_product_id = retarget.rfc_id,
            previous_signature = retarget.previous_signature.as_deref().unwrap_or(""),
            signature = %retarget.signature,
            "Retargeted RFC"
        );
    }

    for sync in &plan.feature_syncs {
        RetailFeatureRepo::insert_many(conn, hotel_id, sync.rfc_id, &sync.inserts)
            .await
            .map_err(persistence(PHASE))?;
        RetailFeatureRepo::update_quantities(conn, sync.rfc_id, &sync.updates)
            .await
            .map_err(persistence(PHASE))?;
        RetailFeatureRepo::delete_features(conn, sync.rfc_id, &sync.removed_feature_ids)
            .await
            .map_err(persistence(PHASE))?;
        RetailFeatureRepo::delete_rate_adjustments(conn, sync.rfc_id, &sync.removed_feature_ids)
            .await
            .map_err(persistence(PHASE))?;

        tracing::debug!(
            hotel_id,
            room_product_id = sync.rfc_id,
            inserted = sync.inserts.len(),
            updated = sync.updates.len(),
            removed = sync.removed_feature_ids.len(),
            "Corrected RFC retail features"
        );
    }

    let mut detach = Vec::new();
    let mut attach = Vec::with_capacity(plan.moves.len());
    for mv in &plan.moves {
        if let Some(from) = mv.from {
            detach.push((mv.room_unit_id, applied.resolve(from)?));
        }
        attach.push((mv.room_unit_id, applied.resolve(mv.to)?));
    }
    AssignedUnitRepo::delete_many(conn, &detach)
        .await
        .map_err(persistence(PHASE))?;
    AssignedUnitRepo::insert_many(conn, hotel_id, &attach)
        .await
        .map_err(persistence(PHASE))?;

    if !plan.deletions.is_empty() {
        applied.cascade = RoomProductRepo::delete_cascade(conn, &plan.deletions)
            .await
            .map_err(persistence(PHASE))?;
        tracing::info!(
            hotel_id,
            room_product_ids = ?plan.deletions,
            dependent_rows = applied.cascade.dependent_rows(),
            "Deleted emptied RFCs"
        );
    }

    applied.units_processed = RoomUnitRepo::mark_processed(conn, &plan.unit_signatures)
        .await
        .map_err(persistence(PHASE))?;

    Ok(applied)
}
