//! Repository for the `hotel_retail_features` and `hotel_standard_features`
//! tables.

use roomcat_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::feature::{CreateHotelFeature, HotelRetailFeature, HotelStandardFeature};

const RETAIL_COLUMNS: &str = "id, hotel_id, code, name, is_active, created_at, updated_at";
const STANDARD_COLUMNS: &str = "id, hotel_id, code, name, created_at";

/// Provides access to a hotel's feature catalogs.
pub struct HotelFeatureRepo;

impl HotelFeatureRepo {
    /// Insert a new retail feature (active by default).
    pub async fn create_retail(
        pool: &PgPool,
        input: &CreateHotelFeature,
    ) -> Result<HotelRetailFeature, sqlx::Error> {
        let query = format!(
            "INSERT INTO hotel_retail_features (hotel_id, code, name)
             VALUES ($1, $2, $3)
             RETURNING {RETAIL_COLUMNS}"
        );
        sqlx::query_as::<_, HotelRetailFeature>(&query)
            .bind(input.hotel_id)
            .bind(&input.code)
            .bind(&input.name)
            .fetch_one(pool)
            .await
    }

    /// Deactivate a retail feature. Returns `true` if a row changed.
    pub async fn deactivate_retail(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE hotel_retail_features SET is_active = false, updated_at = NOW()
             WHERE id = $1 AND is_active = true",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Active retail features of a hotel in stable catalog order
    /// (creation time, then code).
    pub async fn list_active_retail(
        conn: &mut PgConnection,
        hotel_id: DbId,
    ) -> Result<Vec<HotelRetailFeature>, sqlx::Error> {
        let query = format!(
            "SELECT {RETAIL_COLUMNS} FROM hotel_retail_features
             WHERE hotel_id = $1 AND is_active = true
             ORDER BY created_at ASC, code ASC"
        );
        sqlx::query_as::<_, HotelRetailFeature>(&query)
            .bind(hotel_id)
            .fetch_all(&mut *conn)
            .await
    }

    /// Insert a new hotel-wide standard feature.
    pub async fn create_standard(
        pool: &PgPool,
        input: &CreateHotelFeature,
    ) -> Result<HotelStandardFeature, sqlx::Error> {
        let query = format!(
            "INSERT INTO hotel_standard_features (hotel_id, code, name)
             VALUES ($1, $2, $3)
             RETURNING {STANDARD_COLUMNS}"
        );
        sqlx::query_as::<_, HotelStandardFeature>(&query)
            .bind(input.hotel_id)
            .bind(&input.code)
            .bind(&input.name)
            .fetch_one(pool)
            .await
    }

    /// Standard features of a hotel, used to seed every new RFC.
    pub async fn list_standard(
        conn: &mut PgConnection,
        hotel_id: DbId,
    ) -> Result<Vec<HotelStandardFeature>, sqlx::Error> {
        let query = format!(
            "SELECT {STANDARD_COLUMNS} FROM hotel_standard_features
             WHERE hotel_id = $1
             ORDER BY created_at ASC, code ASC"
        );
        sqlx::query_as::<_, HotelStandardFeature>(&query)
            .bind(hotel_id)
            .fetch_all(&mut *conn)
            .await
    }
}
