//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods. Reads and
//! fixtures used outside a pass accept `&PgPool`; everything the
//! reconciliation pass calls accepts `&mut PgConnection` so it can run inside
//! the pass transaction.

pub mod assigned_unit_repo;
pub mod hotel_feature_repo;
pub mod hotel_repo;
pub mod inventory_event_repo;
pub mod product_mapping_repo;
pub mod retail_feature_repo;
pub mod room_product_repo;
pub mod room_unit_repo;
pub mod standard_feature_repo;

pub use assigned_unit_repo::AssignedUnitRepo;
pub use hotel_feature_repo::HotelFeatureRepo;
pub use hotel_repo::HotelRepo;
pub use inventory_event_repo::InventoryEventRepo;
pub use product_mapping_repo::ProductMappingRepo;
pub use retail_feature_repo::RetailFeatureRepo;
pub use room_product_repo::{CascadeReport, RoomProductRepo};
pub use room_unit_repo::RoomUnitRepo;
pub use standard_feature_repo::StandardFeatureRepo;
