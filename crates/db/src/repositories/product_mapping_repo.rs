//! Repository for the derived `room_product_mappings` table.

use roomcat_core::rfc::MappingPair;
use roomcat_core::types::DbId;
use sqlx::PgConnection;

use crate::models::mapping::RoomProductMapping;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, hotel_id, room_product_id, related_room_product_id, created_at";

/// Provides access to cluster-to-RFC mapping rows.
pub struct ProductMappingRepo;

impl ProductMappingRepo {
    /// All mapping rows of a hotel.
    pub async fn list_for_hotel(
        conn: &mut PgConnection,
        hotel_id: DbId,
    ) -> Result<Vec<RoomProductMapping>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM room_product_mappings
             WHERE hotel_id = $1
             ORDER BY room_product_id ASC, related_room_product_id ASC"
        );
        sqlx::query_as::<_, RoomProductMapping>(&query)
            .bind(hotel_id)
            .fetch_all(&mut *conn)
            .await
    }

    /// Insert mapping pairs, ignoring ones already present.
    pub async fn insert_many(
        conn: &mut PgConnection,
        hotel_id: DbId,
        pairs: &[MappingPair],
    ) -> Result<u64, sqlx::Error> {
        if pairs.is_empty() {
            return Ok(0);
        }
        let (clusters, rfcs) = split(pairs);

        let result = sqlx::query(
            "INSERT INTO room_product_mappings (hotel_id, room_product_id, related_room_product_id)
             SELECT $1, d.cluster_id, d.rfc_id
             FROM UNNEST($2::bigint[], $3::bigint[]) AS d(cluster_id, rfc_id)
             ON CONFLICT (room_product_id, related_room_product_id) DO NOTHING",
        )
        .bind(hotel_id)
        .bind(&clusters)
        .bind(&rfcs)
        .execute(&mut *conn)
        .await?;
        Ok(result.rows_affected())
    }

    /// Delete mapping pairs.
    pub async fn delete_pairs(
        conn: &mut PgConnection,
        hotel_id: DbId,
        pairs: &[MappingPair],
    ) -> Result<u64, sqlx::Error> {
        if pairs.is_empty() {
            return Ok(0);
        }
        let (clusters, rfcs) = split(pairs);

        let result = sqlx::query(
            "DELETE FROM room_product_mappings m
             USING UNNEST($2::bigint[], $3::bigint[]) AS d(cluster_id, rfc_id)
             WHERE m.hotel_id = $1
               AND m.room_product_id = d.cluster_id
               AND m.related_room_product_id = d.rfc_id",
        )
        .bind(hotel_id)
        .bind(&clusters)
        .bind(&rfcs)
        .execute(&mut *conn)
        .await?;
        Ok(result.rows_affected())
    }
}

fn split(pairs: &[MappingPair]) -> (Vec<DbId>, Vec<DbId>) {
    pairs.iter().map(|p| (p.cluster_product_id, p.rfc_id)).unzip()
}
