//! Inventory event bus.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`InventoryEvent`]: the event envelope published after a
//!   reconciliation pass commits.
//! - [`EventPersistence`]: background service that durably writes every
//!   event to the `inventory_events` table, where the availability and
//!   pricing workers pick them up.

pub mod bus;
pub mod persistence;

pub use bus::{event_types, EventBus, InventoryEvent};
pub use persistence::EventPersistence;
