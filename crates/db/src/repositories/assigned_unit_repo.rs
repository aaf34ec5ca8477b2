//! Repository for the `room_product_assigned_units` table.

use roomcat_core::rfc::ProductType;
use roomcat_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::assignment::{MemberSpace, RoomProductAssignedUnit, TypedAssignmentRow};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, hotel_id, room_product_id, room_unit_id, created_at";

/// Provides access to room-unit-to-product assignment edges.
pub struct AssignedUnitRepo;

impl AssignedUnitRepo {
    /// Assign a single unit to a product. Used for seeding cluster products.
    pub async fn create(
        pool: &PgPool,
        hotel_id: DbId,
        room_product_id: DbId,
        room_unit_id: DbId,
    ) -> Result<RoomProductAssignedUnit, sqlx::Error> {
        let query = format!(
            "INSERT INTO room_product_assigned_units (hotel_id, room_product_id, room_unit_id)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, RoomProductAssignedUnit>(&query)
            .bind(hotel_id)
            .bind(room_product_id)
            .bind(room_unit_id)
            .fetch_one(pool)
            .await
    }

    /// Unit ids assigned to one product, ascending.
    pub async fn list_members(pool: &PgPool, room_product_id: DbId) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>(
            "SELECT room_unit_id FROM room_product_assigned_units
             WHERE room_product_id = $1
             ORDER BY room_unit_id ASC",
        )
        .bind(room_product_id)
        .fetch_all(pool)
        .await
    }

    /// `(room_unit_id, room_product_id)` edges onto active products of one
    /// type, ordered by product then unit.
    pub async fn list_for_active_type(
        conn: &mut PgConnection,
        hotel_id: DbId,
        product_type: ProductType,
    ) -> Result<Vec<(DbId, DbId)>, sqlx::Error> {
        sqlx::query_as::<_, (DbId, DbId)>(
            "SELECT a.room_unit_id, a.room_product_id
             FROM room_product_assigned_units a
             JOIN room_products p ON p.id = a.room_product_id
             WHERE a.hotel_id = $1 AND p.product_type = $2 AND p.deleted_at IS NULL
             ORDER BY a.room_product_id ASC, a.room_unit_id ASC",
        )
        .bind(hotel_id)
        .bind(product_type.as_str())
        .fetch_all(&mut *conn)
        .await
    }

    /// Every edge onto an active product of the hotel, with the product type.
    pub async fn list_typed(
        conn: &mut PgConnection,
        hotel_id: DbId,
    ) -> Result<Vec<TypedAssignmentRow>, sqlx::Error> {
        sqlx::query_as::<_, TypedAssignmentRow>(
            "SELECT a.room_unit_id, a.room_product_id, p.product_type
             FROM room_product_assigned_units a
             JOIN room_products p ON p.id = a.room_product_id
             WHERE a.hotel_id = $1 AND p.deleted_at IS NULL
             ORDER BY a.room_unit_id ASC, a.room_product_id ASC",
        )
        .bind(hotel_id)
        .fetch_all(&mut *conn)
        .await
    }

    /// Insert `(room_unit_id, room_product_id)` edges, skipping ones that
    /// already exist. Returns the number inserted.
    pub async fn insert_many(
        conn: &mut PgConnection,
        hotel_id: DbId,
        edges: &[(DbId, DbId)],
    ) -> Result<u64, sqlx::Error> {
        if edges.is_empty() {
            return Ok(0);
        }
        let units: Vec<DbId> = edges.iter().map(|(unit, _)| *unit).collect();
        let products: Vec<DbId> = edges.iter().map(|(_, product)| *product).collect();

        let result = sqlx::query(
            "INSERT INTO room_product_assigned_units (hotel_id, room_unit_id, room_product_id)
             SELECT $1, d.room_unit_id, d.room_product_id
             FROM UNNEST($2::bigint[], $3::bigint[]) AS d(room_unit_id, room_product_id)
             ON CONFLICT (room_product_id, room_unit_id) DO NOTHING",
        )
        .bind(hotel_id)
        .bind(&units)
        .bind(&products)
        .execute(&mut *conn)
        .await?;
        Ok(result.rows_affected())
    }

    /// Delete `(room_unit_id, room_product_id)` edges. Returns the number removed.
    pub async fn delete_many(
        conn: &mut PgConnection,
        edges: &[(DbId, DbId)],
    ) -> Result<u64, sqlx::Error> {
        if edges.is_empty() {
            return Ok(0);
        }
        let units: Vec<DbId> = edges.iter().map(|(unit, _)| *unit).collect();
        let products: Vec<DbId> = edges.iter().map(|(_, product)| *product).collect();

        let result = sqlx::query(
            "DELETE FROM room_product_assigned_units a
             USING UNNEST($1::bigint[], $2::bigint[]) AS d(room_unit_id, room_product_id)
             WHERE a.room_unit_id = d.room_unit_id AND a.room_product_id = d.room_product_id",
        )
        .bind(&units)
        .bind(&products)
        .execute(&mut *conn)
        .await?;
        Ok(result.rows_affected())
    }

    /// Spaces of the live member units of the given products.
    pub async fn list_member_spaces(
        conn: &mut PgConnection,
        room_product_ids: &[DbId],
    ) -> Result<Vec<MemberSpace>, sqlx::Error> {
        sqlx::query_as::<_, MemberSpace>(
            "SELECT a.room_product_id, u.space
             FROM room_product_assigned_units a
             JOIN room_units u ON u.id = a.room_unit_id
             WHERE a.room_product_id = ANY($1) AND u.deleted_at IS NULL",
        )
        .bind(room_product_ids)
        .fetch_all(&mut *conn)
        .await
    }
}
