//! Post-commit side effects.
//!
//! Notifications are fire-and-forget: they run after the pass transaction
//! commits and cannot roll it back. Downstream workers own retries.

use roomcat_core::types::DbId;
use roomcat_events::{event_types, EventBus, InventoryEvent};

use crate::report::PassReport;

/// Receiver of the side effects of a committed pass.
pub trait InventoryNotifier: Send + Sync {
    /// Ask the availability service to regenerate the given products.
    fn regenerate_availability(&self, hotel_id: DbId, room_product_ids: &[DbId]);

    /// Ask the pricing service to recalculate the given products.
    fn recalculate_pricing(&self, hotel_id: DbId, room_product_ids: &[DbId]);

    /// Announce the pass itself.
    fn pass_completed(&self, report: &PassReport);
}

impl InventoryNotifier for EventBus {
    fn regenerate_availability(&self, hotel_id: DbId, room_product_ids: &[DbId]) {
        self.publish(
            InventoryEvent::new(event_types::AVAILABILITY_REGENERATE, hotel_id)
                .with_source("hotel", hotel_id)
                .with_payload(serde_json::json!({ "room_product_ids": room_product_ids })),
        );
    }

    fn recalculate_pricing(&self, hotel_id: DbId, room_product_ids: &[DbId]) {
        self.publish(
            InventoryEvent::new(event_types::PRICING_RECALCULATE, hotel_id)
                .with_source("hotel", hotel_id)
                .with_payload(serde_json::json!({ "room_product_ids": room_product_ids })),
        );
    }

    fn pass_completed(&self, report: &PassReport) {
        let payload = match serde_json::to_value(report) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!(error = %e, hotel_id = report.hotel_id, "Failed to encode pass report");
                serde_json::Value::Object(Default::default())
            }
        };
        self.publish(
            InventoryEvent::new(event_types::PASS_COMPLETED, report.hotel_id)
                .with_source("hotel", report.hotel_id)
                .with_payload(payload),
        );
    }
}

/// Dispatch every side effect of `report`. Empty id lists are skipped and
/// a no-op pass publishes nothing.
pub fn dispatch(notifier: &dyn InventoryNotifier, report: &PassReport) {
    if report.is_noop() {
        return;
    }
    if !report.availability_product_ids.is_empty() {
        notifier.regenerate_availability(report.hotel_id, &report.availability_product_ids);
    }
    if !report.pricing_product_ids.is_empty() {
        notifier.recalculate_pricing(report.hotel_id, &report.pricing_product_ids);
    }
    notifier.pass_completed(report);
}
