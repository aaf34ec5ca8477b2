//! Pure domain logic for the room catalog.
//!
//! Nothing in this crate touches the database. Callers load the data a
//! reconciliation pass needs into a [`rfc::PassSnapshot`], hand it to
//! [`rfc::plan_pass`], and apply the resulting [`rfc::PassPlan`] with
//! whatever storage they own.

pub mod diff;
pub mod error;
pub mod rfc;
pub mod types;
