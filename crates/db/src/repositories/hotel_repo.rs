//! Repository for the `hotels` table.

use roomcat_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::hotel::{CreateHotel, Hotel};

const COLUMNS: &str = "id, code, name, created_at, updated_at";

/// Provides CRUD operations for hotels plus the per-hotel pass lock.
pub struct HotelRepo;

impl HotelRepo {
    /// Insert a new hotel, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateHotel) -> Result<Hotel, sqlx::Error> {
        let query = format!(
            "INSERT INTO hotels (code, name) VALUES ($1, $2) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Hotel>(&query)
            .bind(&input.code)
            .bind(&input.name)
            .fetch_one(pool)
            .await
    }

    /// Find a hotel by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Hotel>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM hotels WHERE id = $1");
        sqlx::query_as::<_, Hotel>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Take the transaction-scoped advisory lock that serializes
    /// reconciliation passes for one hotel across processes.
    ///
    /// Released automatically on commit or rollback.
    pub async fn lock_for_reconcile(conn: &mut PgConnection, hotel_id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(hotel_id)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }
}
