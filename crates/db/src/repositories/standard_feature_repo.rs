//! Repository for `room_product_standard_features`.

use roomcat_core::types::DbId;
use sqlx::{PgConnection, PgPool};

/// Links hotel standard features to room products.
pub struct StandardFeatureRepo;

impl StandardFeatureRepo {
    /// Attach standard features to a product. Already-linked ones are skipped.
    pub async fn insert_many(
        conn: &mut PgConnection,
        hotel_id: DbId,
        room_product_id: DbId,
        standard_feature_ids: &[DbId],
    ) -> Result<u64, sqlx::Error> {
        if standard_feature_ids.is_empty() {
            return Ok(0);
        }
        let result = sqlx::query(
            "INSERT INTO room_product_standard_features
                (hotel_id, room_product_id, standard_feature_id)
             SELECT $1, $2, UNNEST($3::bigint[])
             ON CONFLICT (room_product_id, standard_feature_id) DO NOTHING",
        )
        .bind(hotel_id)
        .bind(room_product_id)
        .bind(standard_feature_ids)
        .execute(&mut *conn)
        .await?;
        Ok(result.rows_affected())
    }

    /// Standard feature ids linked to a product, ascending.
    pub async fn list_for_product(
        pool: &PgPool,
        room_product_id: DbId,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>(
            "SELECT standard_feature_id FROM room_product_standard_features
             WHERE room_product_id = $1
             ORDER BY standard_feature_id ASC",
        )
        .bind(room_product_id)
        .fetch_all(pool)
        .await
    }
}
