//! Repository for the `room_products` table, including the ordered cascade
//! delete of RFCs.

use roomcat_core::rfc::ProductType;
use roomcat_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::room_product::{CreateRoomProduct, RoomProduct};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, hotel_id, code, name, product_type, feature_signature, status, \
     allocation_setting, base_price_mode, distribution_channels, number_of_bedrooms, \
     average_space, deleted_at, created_at, updated_at";

/// Dependent rows removed before a product is tombstoned, in dependency
/// order. Every statement binds the product id array as `$1`.
const CASCADE_STEPS: &[(&str, &str)] = &[
    (
        "room_product_base_price_settings",
        "DELETE FROM room_product_base_price_settings WHERE room_product_id = ANY($1)",
    ),
    (
        "room_product_daily_availabilities",
        "DELETE FROM room_product_daily_availabilities WHERE room_product_id = ANY($1)",
    ),
    (
        "room_product_daily_selling_prices",
        "DELETE FROM room_product_daily_selling_prices WHERE room_product_id = ANY($1)",
    ),
    (
        "room_product_assigned_units",
        "DELETE FROM room_product_assigned_units WHERE room_product_id = ANY($1)",
    ),
    (
        "room_product_feature_rate_adjustments",
        "DELETE FROM room_product_feature_rate_adjustments WHERE room_product_id = ANY($1)",
    ),
    (
        "room_product_retail_features",
        "DELETE FROM room_product_retail_features WHERE room_product_id = ANY($1)",
    ),
    (
        "room_product_mappings",
        "DELETE FROM room_product_mappings
         WHERE room_product_id = ANY($1) OR related_room_product_id = ANY($1)",
    ),
    (
        "room_product_rate_plan_availability_adjustments",
        "DELETE FROM room_product_rate_plan_availability_adjustments
         WHERE room_product_rate_plan_id IN
            (SELECT id FROM room_product_rate_plans WHERE room_product_id = ANY($1))",
    ),
    (
        "room_product_rate_plan_extra_occupancy_rate_adjustments",
        "DELETE FROM room_product_rate_plan_extra_occupancy_rate_adjustments
         WHERE room_product_rate_plan_id IN
            (SELECT id FROM room_product_rate_plans WHERE room_product_id = ANY($1))",
    ),
    (
        "room_product_rate_plans",
        "DELETE FROM room_product_rate_plans WHERE room_product_id = ANY($1)",
    ),
    (
        "room_product_pricing_method_details",
        "DELETE FROM room_product_pricing_method_details WHERE room_product_id = ANY($1)",
    ),
    (
        "room_product_standard_features",
        "DELETE FROM room_product_standard_features WHERE room_product_id = ANY($1)",
    ),
];

/// Rows removed by [`RoomProductRepo::delete_cascade`].
#[derive(Debug, Clone, Default)]
pub struct CascadeReport {
    /// Products tombstoned.
    pub products: u64,
    /// Dependent rows deleted, per table, in execution order.
    pub dependents: Vec<(&'static str, u64)>,
}

impl CascadeReport {
    pub fn dependent_rows(&self) -> u64 {
        self.dependents.iter().map(|(_, n)| n).sum()
    }
}

/// Provides CRUD operations for room products.
pub struct RoomProductRepo;

impl RoomProductRepo {
    /// Insert a new room product, returning the created row.
    pub async fn create(
        conn: &mut PgConnection,
        input: &CreateRoomProduct,
    ) -> Result<RoomProduct, sqlx::Error> {
        let query = format!(
            "INSERT INTO room_products
                (hotel_id, code, name, product_type, feature_signature, status,
                 allocation_setting, base_price_mode, distribution_channels, number_of_bedrooms)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, RoomProduct>(&query)
            .bind(input.hotel_id)
            .bind(&input.code)
            .bind(&input.name)
            .bind(input.product_type.as_str())
            .bind(&input.feature_signature)
            .bind(&input.status)
            .bind(&input.allocation_setting)
            .bind(&input.base_price_mode)
            .bind(&input.distribution_channels)
            .bind(input.number_of_bedrooms)
            .fetch_one(&mut *conn)
            .await
    }

    /// Find a product by ID, including soft-deleted rows.
    pub async fn find_by_id_include_deleted(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<RoomProduct>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM room_products WHERE id = $1");
        sqlx::query_as::<_, RoomProduct>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Active products of one type for a hotel, ordered by id.
    pub async fn list_active_by_type(
        conn: &mut PgConnection,
        hotel_id: DbId,
        product_type: ProductType,
    ) -> Result<Vec<RoomProduct>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM room_products
             WHERE hotel_id = $1 AND product_type = $2 AND deleted_at IS NULL
             ORDER BY id ASC"
        );
        sqlx::query_as::<_, RoomProduct>(&query)
            .bind(hotel_id)
            .bind(product_type.as_str())
            .fetch_all(&mut *conn)
            .await
    }

    /// Every code ever issued for a type, tombstoned rows included.
    pub async fn list_codes_including_deleted(
        conn: &mut PgConnection,
        hotel_id: DbId,
        product_type: ProductType,
    ) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>(
            "SELECT code FROM room_products WHERE hotel_id = $1 AND product_type = $2",
        )
        .bind(hotel_id)
        .bind(product_type.as_str())
        .fetch_all(&mut *conn)
        .await
    }

    /// Retarget an RFC to a new signature. Returns `true` if a row changed.
    pub async fn update_feature_signature(
        conn: &mut PgConnection,
        id: DbId,
        signature: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE room_products SET feature_signature = $2, updated_at = NOW()
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .bind(signature)
        .execute(&mut *conn)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Current `average_space` of the given products.
    pub async fn list_average_spaces(
        conn: &mut PgConnection,
        ids: &[DbId],
    ) -> Result<Vec<(DbId, i32)>, sqlx::Error> {
        sqlx::query_as::<_, (DbId, i32)>(
            "SELECT id, average_space FROM room_products WHERE id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(&mut *conn)
        .await
    }

    /// Store recomputed average spaces. Returns the number of rows changed.
    pub async fn update_average_spaces(
        conn: &mut PgConnection,
        values: &[(DbId, i32)],
    ) -> Result<u64, sqlx::Error> {
        if values.is_empty() {
            return Ok(0);
        }
        let ids: Vec<DbId> = values.iter().map(|(id, _)| *id).collect();
        let spaces: Vec<i32> = values.iter().map(|(_, space)| *space).collect();

        let result = sqlx::query(
            "UPDATE room_products p SET average_space = d.average_space, updated_at = NOW()
             FROM UNNEST($1::bigint[], $2::int[]) AS d(id, average_space)
             WHERE p.id = d.id",
        )
        .bind(&ids)
        .bind(&spaces)
        .execute(&mut *conn)
        .await?;
        Ok(result.rows_affected())
    }

    /// Delete products together with every row that references them, then
    /// tombstone the products themselves.
    ///
    /// Runs [`CASCADE_STEPS`] in order on the caller's connection; callers
    /// run it inside the same transaction as the reassignments that emptied
    /// the products.
    pub async fn delete_cascade(
        conn: &mut PgConnection,
        ids: &[DbId],
    ) -> Result<CascadeReport, sqlx::Error> {
        let mut report = CascadeReport::default();
        if ids.is_empty() {
            return Ok(report);
        }

        for (table, statement) in CASCADE_STEPS {
            let result = sqlx::query(statement).bind(ids).execute(&mut *conn).await?;
            report.dependents.push((table, result.rows_affected()));
        }

        let result = sqlx::query(
            "UPDATE room_products SET status = 'DELETED', deleted_at = NOW(), updated_at = NOW()
             WHERE id = ANY($1) AND deleted_at IS NULL",
        )
        .bind(ids)
        .execute(&mut *conn)
        .await?;
        report.products = result.rows_affected();

        tracing::debug!(
            products = report.products,
            dependent_rows = report.dependent_rows(),
            "Cascade-deleted room products",
        );
        Ok(report)
    }
}
