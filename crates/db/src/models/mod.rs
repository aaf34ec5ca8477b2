//! Row models and DTOs, one module per table family.

pub mod assignment;
pub mod event;
pub mod feature;
pub mod hotel;
pub mod mapping;
pub mod retail_feature;
pub mod room_product;
pub mod room_unit;
