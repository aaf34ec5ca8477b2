//! Scalar aliases shared by every roomcat crate.

/// Primary key of every catalog table (Postgres `BIGSERIAL`).
pub type DbId = i64;

/// `TIMESTAMPTZ` column value, always UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
