use roomcat_db::models::hotel::CreateHotel;
use roomcat_db::repositories::{HotelRepo, InventoryEventRepo};
use roomcat_events::{event_types, EventBus, EventPersistence, InventoryEvent};
use sqlx::PgPool;

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_persist_writes_event_row(pool: PgPool) {
    let hotel = HotelRepo::create(
        &pool,
        &CreateHotel {
            code: "EV".to_string(),
            name: "Event Hotel".to_string(),
        },
    )
    .await
    .unwrap();

    let event = InventoryEvent::new(event_types::AVAILABILITY_REGENERATE, hotel.id)
        .with_source("hotel", hotel.id)
        .with_payload(serde_json::json!({"room_product_ids": [5]}));
    EventPersistence::persist(&pool, &event).await.unwrap();

    let rows =
        InventoryEventRepo::list_by_type(&pool, hotel.id, event_types::AVAILABILITY_REGENERATE)
            .await
            .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].source_entity_type.as_deref(), Some("hotel"));
    assert_eq!(rows[0].payload["room_product_ids"][0], 5);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_run_loop_drains_until_bus_dropped(pool: PgPool) {
    let hotel = HotelRepo::create(
        &pool,
        &CreateHotel {
            code: "EV2".to_string(),
            name: "Loop Hotel".to_string(),
        },
    )
    .await
    .unwrap();

    let bus = EventBus::default();
    let handle = tokio::spawn(EventPersistence::run(pool.clone(), bus.subscribe()));

    bus.publish(InventoryEvent::new(event_types::PASS_COMPLETED, hotel.id));
    bus.publish(InventoryEvent::new(event_types::PASS_COMPLETED, hotel.id));
    drop(bus);
    handle.await.unwrap();

    let rows = InventoryEventRepo::list_by_type(&pool, hotel.id, event_types::PASS_COMPLETED)
        .await
        .unwrap();
    assert_eq!(rows.len(), 2);
}
