//! Repository for the `room_units` and `room_unit_retail_features` tables.

use roomcat_core::rfc::{FeatureQuantity, UnitSignature};
use roomcat_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::room_unit::{CreateRoomUnit, RoomUnit, RoomUnitFeature};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, hotel_id, room_number, space, feature_signature, changed, \
     deleted_at, created_at, updated_at";

/// Provides access to room units.
///
/// Creation and feature replacement exist for the property-management sync
/// and for fixtures; both leave the unit flagged `changed`.
pub struct RoomUnitRepo;

impl RoomUnitRepo {
    /// Insert a room unit and its feature rows in one transaction.
    pub async fn create(pool: &PgPool, input: &CreateRoomUnit) -> Result<RoomUnit, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO room_units (hotel_id, room_number, space, changed)
             VALUES ($1, $2, $3, true)
             RETURNING {COLUMNS}"
        );
        let unit = sqlx::query_as::<_, RoomUnit>(&query)
            .bind(input.hotel_id)
            .bind(&input.room_number)
            .bind(input.space)
            .fetch_one(&mut *tx)
            .await?;

        Self::insert_features(&mut tx, unit.hotel_id, unit.id, &input.features).await?;

        tx.commit().await?;
        Ok(unit)
    }

    /// Replace a unit's feature bundle and flag it for reconciliation.
    pub async fn replace_features(
        pool: &PgPool,
        id: DbId,
        features: &[FeatureQuantity],
    ) -> Result<Option<RoomUnit>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE room_units SET changed = true, updated_at = NOW()
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        let unit = sqlx::query_as::<_, RoomUnit>(&query)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

        if let Some(ref unit) = unit {
            sqlx::query("DELETE FROM room_unit_retail_features WHERE room_unit_id = $1")
                .bind(unit.id)
                .execute(&mut *tx)
                .await?;
            Self::insert_features(&mut tx, unit.hotel_id, unit.id, features).await?;
        }

        tx.commit().await?;
        Ok(unit)
    }

    /// Find a room unit by its internal ID. Excludes soft-deleted rows.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<RoomUnit>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM room_units WHERE id = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, RoomUnit>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Room units of a hotel flagged `changed`, ordered by id.
    pub async fn list_changed(
        conn: &mut PgConnection,
        hotel_id: DbId,
    ) -> Result<Vec<RoomUnit>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM room_units
             WHERE hotel_id = $1 AND changed = true AND deleted_at IS NULL
             ORDER BY id ASC"
        );
        sqlx::query_as::<_, RoomUnit>(&query)
            .bind(hotel_id)
            .fetch_all(&mut *conn)
            .await
    }

    /// Feature rows of the given units.
    pub async fn list_features_for_units(
        conn: &mut PgConnection,
        unit_ids: &[DbId],
    ) -> Result<Vec<RoomUnitFeature>, sqlx::Error> {
        sqlx::query_as::<_, RoomUnitFeature>(
            "SELECT room_unit_id, retail_feature_id, quantity
             FROM room_unit_retail_features
             WHERE room_unit_id = ANY($1)
             ORDER BY room_unit_id, retail_feature_id",
        )
        .bind(unit_ids)
        .fetch_all(&mut *conn)
        .await
    }

    /// Persist computed signatures and clear the dirty flag in one statement.
    ///
    /// Returns the number of units updated.
    pub async fn mark_processed(
        conn: &mut PgConnection,
        signatures: &[UnitSignature],
    ) -> Result<u64, sqlx::Error> {
        if signatures.is_empty() {
            return Ok(0);
        }
        let ids: Vec<DbId> = signatures.iter().map(|s| s.room_unit_id).collect();
        let values: Vec<String> = signatures.iter().map(|s| s.signature.clone()).collect();

        let result = sqlx::query(
            "UPDATE room_units u SET
                feature_signature = d.signature,
                changed = false,
                updated_at = NOW()
             FROM UNNEST($1::bigint[], $2::text[]) AS d(id, signature)
             WHERE u.id = d.id",
        )
        .bind(&ids)
        .bind(&values)
        .execute(&mut *conn)
        .await?;
        Ok(result.rows_affected())
    }

    /// Hotels that currently have at least one changed room unit.
    pub async fn list_hotels_with_changes(
        pool: &PgPool,
        limit: i64,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>(
            "SELECT hotel_id FROM room_units
             WHERE changed = true AND deleted_at IS NULL
             GROUP BY hotel_id
             ORDER BY MIN(updated_at) ASC
             LIMIT $1",
        )
        .bind(limit)
        .fetch_all(pool)
        .await
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    async fn insert_features(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        hotel_id: DbId,
        room_unit_id: DbId,
        features: &[FeatureQuantity],
    ) -> Result<(), sqlx::Error> {
        for feature in features {
            sqlx::query(
                "INSERT INTO room_unit_retail_features
                    (hotel_id, room_unit_id, retail_feature_id, quantity)
                 VALUES ($1, $2, $3, $4)",
            )
            .bind(hotel_id)
            .bind(room_unit_id)
            .bind(feature.feature_id)
            .bind(feature.quantity)
            .execute(&mut **tx)
            .await?;
        }
        Ok(())
    }
}
