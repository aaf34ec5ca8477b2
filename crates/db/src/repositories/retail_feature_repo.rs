//! Repository for an RFC's retail-feature rows and the feature rate
//! adjustments that hang off them.

use roomcat_core::rfc::FeatureQuantity;
use roomcat_core::types::DbId;
use sqlx::PgConnection;

use crate::models::retail_feature::RoomProductRetailFeature;

/// Provides access to `room_product_retail_features`.
pub struct RetailFeatureRepo;

impl RetailFeatureRepo {
    /// Feature rows of the given products, ordered by product then feature.
    pub async fn list_for_products(
        conn: &mut PgConnection,
        room_product_ids: &[DbId],
    ) -> Result<Vec<RoomProductRetailFeature>, sqlx::Error> {
        sqlx::query_as::<_, RoomProductRetailFeature>(
            "SELECT id, hotel_id, room_product_id, retail_feature_id, quantity
             FROM room_product_retail_features
             WHERE room_product_id = ANY($1)
             ORDER BY room_product_id ASC, retail_feature_id ASC",
        )
        .bind(room_product_ids)
        .fetch_all(&mut *conn)
        .await
    }

    /// Insert feature rows for a product; existing rows take the new quantity.
    pub async fn insert_many(
        conn: &mut PgConnection,
        hotel_id: DbId,
        room_product_id: DbId,
        features: &[FeatureQuantity],
    ) -> Result<u64, sqlx::Error> {
        if features.is_empty() {
            return Ok(0);
        }
        let (feature_ids, quantities) = split(features);

        let result = sqlx::query(
            "INSERT INTO room_product_retail_features
                (hotel_id, room_product_id, retail_feature_id, quantity)
             SELECT $1, $2, d.retail_feature_id, d.quantity
             FROM UNNEST($3::bigint[], $4::int[]) AS d(retail_feature_id, quantity)
             ON CONFLICT (hotel_id, room_product_id, retail_feature_id)
             DO UPDATE SET quantity = EXCLUDED.quantity",
        )
        .bind(hotel_id)
        .bind(room_product_id)
        .bind(&feature_ids)
        .bind(&quantities)
        .execute(&mut *conn)
        .await?;
        Ok(result.rows_affected())
    }

    /// Change quantities of existing rows.
    pub async fn update_quantities(
        conn: &mut PgConnection,
        room_product_id: DbId,
        features: &[FeatureQuantity],
    ) -> Result<u64, sqlx::Error> {
        if features.is_empty() {
            return Ok(0);
        }
        let (feature_ids, quantities) = split(features);

        let result = sqlx::query(
            "UPDATE room_product_retail_features r SET quantity = d.quantity
             FROM UNNEST($2::bigint[], $3::int[]) AS d(retail_feature_id, quantity)
             WHERE r.room_product_id = $1 AND r.retail_feature_id = d.retail_feature_id",
        )
        .bind(room_product_id)
        .bind(&feature_ids)
        .bind(&quantities)
        .execute(&mut *conn)
        .await?;
        Ok(result.rows_affected())
    }

    /// Remove specific features from a product.
    pub async fn delete_features(
        conn: &mut PgConnection,
        room_product_id: DbId,
        retail_feature_ids: &[DbId],
    ) -> Result<u64, sqlx::Error> {
        if retail_feature_ids.is_empty() {
            return Ok(0);
        }
        let result = sqlx::query(
            "DELETE FROM room_product_retail_features
             WHERE room_product_id = $1 AND retail_feature_id = ANY($2)",
        )
        .bind(room_product_id)
        .bind(retail_feature_ids)
        .execute(&mut *conn)
        .await?;
        Ok(result.rows_affected())
    }

    /// Replace a product's whole feature bundle.
    pub async fn replace_all(
        conn: &mut PgConnection,
        hotel_id: DbId,
        room_product_id: DbId,
        features: &[FeatureQuantity],
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM room_product_retail_features WHERE room_product_id = $1")
            .bind(room_product_id)
            .execute(&mut *conn)
            .await?;
        Self::insert_many(conn, hotel_id, room_product_id, features).await?;
        Ok(())
    }

    /// Drop the rate adjustments a product held for features it no longer
    /// carries.
    pub async fn delete_rate_adjustments(
        conn: &mut PgConnection,
        room_product_id: DbId,
        retail_feature_ids: &[DbId],
    ) -> Result<u64, sqlx::Error> {
        if retail_feature_ids.is_empty() {
            return Ok(0);
        }
        let result = sqlx::query(
            "DELETE FROM room_product_feature_rate_adjustments
             WHERE room_product_id = $1 AND retail_feature_id = ANY($2)",
        )
        .bind(room_product_id)
        .bind(retail_feature_ids)
        .execute(&mut *conn)
        .await?;
        Ok(result.rows_affected())
    }
}

fn split(features: &[FeatureQuantity]) -> (Vec<DbId>, Vec<i32>) {
    features.iter().map(|f| (f.feature_id, f.quantity)).unzip()
}
