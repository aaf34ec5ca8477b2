//! Loads the pre-pass snapshot the planner works from.

use std::collections::HashMap;

use roomcat_core::rfc::{
    max_code_number, CatalogFeature, ChangedUnit, FeatureCatalog, FeatureQuantity, PassPhase,
    PassSnapshot, ProductType, RfcRecord,
};
use roomcat_core::types::DbId;
use roomcat_db::repositories::{
    AssignedUnitRepo, HotelFeatureRepo, RetailFeatureRepo, RoomProductRepo, RoomUnitRepo,
};
use sqlx::PgConnection;

use crate::error::{persistence, ReconcileError};

const PHASE: PassPhase = PassPhase::Loading;

/// Read everything one pass needs for `hotel_id` on the pass connection.
pub async fn load_snapshot(
    conn: &mut PgConnection,
    hotel_id: DbId,
) -> Result<PassSnapshot, ReconcileError> {
    let catalog: Vec<CatalogFeature> = HotelFeatureRepo::list_active_retail(conn, hotel_id)
        .await
        .map_err(persistence(PHASE))?
        .into_iter()
        .map(CatalogFeature::from)
        .collect();

    let units = RoomUnitRepo::list_changed(conn, hotel_id)
        .await
        .map_err(persistence(PHASE))?;
    let unit_ids: Vec<DbId> = units.iter().map(|u| u.id).collect();
    let mut unit_features: HashMap<DbId, Vec<FeatureQuantity>> = HashMap::new();
    for row in RoomUnitRepo::list_features_for_units(conn, &unit_ids)
        .await
        .map_err(persistence(PHASE))?
    {
        unit_features
            .entry(row.room_unit_id)
            .or_default()
            .push(row.into());
    }
    let changed_units = unit_ids
        .iter()
        .map(|id| ChangedUnit {
            id: *id,
            features: unit_features.remove(id).unwrap_or_default(),
        })
        .collect();

    let products = RoomProductRepo::list_active_by_type(conn, hotel_id, ProductType::Rfc)
        .await
        .map_err(persistence(PHASE))?;
    let product_ids: Vec<DbId> = products.iter().map(|p| p.id).collect();
    let mut retail: HashMap<DbId, Vec<FeatureQuantity>> = HashMap::new();
    for row in RetailFeatureRepo::list_for_products(conn, &product_ids)
        .await
        .map_err(persistence(PHASE))?
    {
        retail.entry(row.room_product_id).or_default().push(row.into());
    }
    let rfcs = products
        .into_iter()
        .map(|p| RfcRecord {
            retail_features: retail.remove(&p.id).unwrap_or_default(),
            id: p.id,
            code: p.code,
            feature_signature: p.feature_signature,
        })
        .collect();

    let rfc_assignments = AssignedUnitRepo::list_for_active_type(conn, hotel_id, ProductType::Rfc)
        .await
        .map_err(persistence(PHASE))?;

    let codes = RoomProductRepo::list_codes_including_deleted(conn, hotel_id, ProductType::Rfc)
        .await
        .map_err(persistence(PHASE))?;

    Ok(PassSnapshot {
        hotel_id,
        catalog: FeatureCatalog::new(catalog),
        changed_units,
        rfcs,
        rfc_assignments,
        max_code_number: max_code_number(ProductType::Rfc, codes.iter().map(String::as_str)),
    })
}
