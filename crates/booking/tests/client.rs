use std::{collections::HashMap, io, sync::Mutex};

use async_trait::async_trait;
use booking::{
    client::Client,
    gateway::{Gateway, GatewayError, GatewayResult, Resource},
    store::EntityStore,
    validate::ValidationError,
    RequestError,
};
use chrono::{DateTime, TimeZone, Utc};
use model::{
    location::Location,
    reservation::{ReservationDraft, MISSING_REFERENCE},
    room::Room,
    ExampleData, WithId,
};
use utility::id::Id;

/// A gateway whose backend is down: every verb fails with a transport
/// error, like a workstation without the API running.
struct Offline;

fn connection_refused() -> GatewayError {
    GatewayError::unavailable(io::Error::new(
        io::ErrorKind::ConnectionRefused,
        "connection refused",
    ))
}

#[async_trait]
impl Gateway for Offline {
    async fn fetch_all<R: Resource>(&self) -> GatewayResult<Vec<WithId<R>>> {
        Err(connection_refused())
    }

    async fn fetch<R: Resource>(&self, _id: Id<R>) -> GatewayResult<WithId<R>> {
        Err(connection_refused())
    }

    async fn create<R: Resource>(&self, _content: R) -> GatewayResult<WithId<R>> {
        Err(connection_refused())
    }

    async fn update<R: Resource>(&self, _record: WithId<R>) -> GatewayResult<WithId<R>> {
        Err(connection_refused())
    }

    async fn remove<R: Resource>(&self, _id: Id<R>) -> GatewayResult<()> {
        Err(connection_refused())
    }
}

/// An in-process stand-in for a reachable backend, keeping records as the
/// JSON documents it would serve.
#[derive(Default)]
struct RemoteBackend {
    collections: Mutex<HashMap<&'static str, Vec<serde_json::Value>>>,
}

impl RemoteBackend {
    fn decode<R: Resource>(value: serde_json::Value) -> GatewayResult<WithId<R>> {
        serde_json::from_value(value).map_err(GatewayError::unavailable)
    }
}

#[async_trait]
impl Gateway for RemoteBackend {
    async fn fetch_all<R: Resource>(&self) -> GatewayResult<Vec<WithId<R>>> {
        let rows = self
            .collections
            .lock()
            .unwrap()
            .get(R::PATH)
            .cloned()
            .unwrap_or_default();
        rows.into_iter().map(Self::decode).collect()
    }

    async fn fetch<R: Resource>(&self, id: Id<R>) -> GatewayResult<WithId<R>> {
        let row = self
            .collections
            .lock()
            .unwrap()
            .get(R::PATH)
            .and_then(|rows| rows.iter().find(|row| row["id"] == id.raw()).cloned());
        match row {
            Some(row) => Self::decode(row),
            None => Err(GatewayError::NotFound),
        }
    }

    async fn create<R: Resource>(&self, content: R) -> GatewayResult<WithId<R>> {
        let mut guard = self.collections.lock().unwrap();
        let rows = guard.entry(R::PATH).or_default();
        let id = rows
            .iter()
            .filter_map(|row| row["id"].as_i64())
            .max()
            .unwrap_or(0)
            + 1;
        let record = WithId::new(Id::new(id), content);
        rows.push(serde_json::to_value(&record).map_err(GatewayError::unavailable)?);
        Ok(record)
    }

    async fn update<R: Resource>(&self, record: WithId<R>) -> GatewayResult<WithId<R>> {
        let mut guard = self.collections.lock().unwrap();
        let rows = guard.entry(R::PATH).or_default();
        let value = serde_json::to_value(&record).map_err(GatewayError::unavailable)?;
        match rows.iter_mut().find(|row| row["id"] == record.id.raw()) {
            Some(row) => {
                *row = value;
                Ok(record)
            }
            None => Err(GatewayError::NotFound),
        }
    }

    async fn remove<R: Resource>(&self, id: Id<R>) -> GatewayResult<()> {
        let mut guard = self.collections.lock().unwrap();
        let rows = guard.entry(R::PATH).or_default();
        let count = rows.len();
        rows.retain(|row| row["id"] != id.raw());
        if rows.len() == count {
            Err(GatewayError::NotFound)
        } else {
            Ok(())
        }
    }
}

fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 10, hour, minute, 0).unwrap()
}

fn draft(
    location_id: i64,
    room_id: i64,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    responsible: &str,
) -> ReservationDraft {
    ReservationDraft {
        location_id: Some(Id::new(location_id)),
        room_id: Some(Id::new(room_id)),
        start,
        end,
        responsible: responsible.to_owned(),
        coffee_requested: false,
        coffee_quantity: None,
        coffee_description: None,
    }
}

#[tokio::test]
async fn offline_lists_come_from_the_local_store() {
    let client = Client::new(Offline, EntityStore::seeded());

    let locations = client.locations().await.unwrap();
    assert_eq!(locations.len(), 2);
    assert_eq!(locations[0].content.name, "Campus 1");

    let reservations = client.reservations().await.unwrap();
    assert_eq!(reservations.len(), 1);
}

#[tokio::test]
async fn offline_double_booking_is_rejected() {
    let client = Client::new(Offline, EntityStore::new());

    let campus = client
        .create_location(Location {
            name: "Campus 1".to_owned(),
            description: None,
        })
        .await
        .unwrap();
    let room = client
        .create_room(Room {
            name: "A101".to_owned(),
            capacity: 10,
            location_id: campus.id,
        })
        .await
        .unwrap();

    let alice = client
        .create_reservation(draft(campus.id.raw(), room.id.raw(), at(9, 0), at(10, 0), "Alice"))
        .await
        .unwrap();
    assert_eq!(alice.content.location_name, "Campus 1");
    assert_eq!(alice.content.room_name, "A101");

    let bob = client
        .create_reservation(draft(campus.id.raw(), room.id.raw(), at(9, 30), at(10, 30), "Bob"))
        .await;
    assert!(matches!(
        bob,
        Err(RequestError::Validation(ValidationError::RoomAlreadyBooked))
    ));

    // A reservation starting exactly when the first ends is allowed.
    let back_to_back = client
        .create_reservation(draft(campus.id.raw(), room.id.raw(), at(10, 0), at(11, 0), "Bob"))
        .await;
    assert!(back_to_back.is_ok());
}

#[tokio::test]
async fn offline_sequential_creates_assign_ids_from_one() {
    let client = Client::new(Offline, EntityStore::new());
    for expected in 1..=3 {
        let record = client
            .create_location(Location {
                name: format!("Campus {}", expected),
                description: None,
            })
            .await
            .unwrap();
        assert_eq!(record.id, Id::new(expected));
    }
}

#[tokio::test]
async fn offline_deletes_are_idempotent() {
    let client = Client::new(Offline, EntityStore::new());
    assert!(client.delete_reservation(Id::new(77)).await.is_ok());
    assert!(client.delete_reservation(Id::new(77)).await.is_ok());
}

#[tokio::test]
async fn coffee_fields_are_cleared_when_no_coffee_is_requested() {
    let client = Client::new(Offline, EntityStore::seeded());

    let candidate = ReservationDraft {
        coffee_requested: false,
        coffee_quantity: Some(5),
        coffee_description: Some("ignored".to_owned()),
        ..draft(1, 1, at(9, 0), at(10, 0), "Alice")
    };
    let record = client.create_reservation(candidate).await.unwrap();
    assert_eq!(record.content.coffee_quantity, None);
    assert_eq!(record.content.coffee_description, None);
}

#[tokio::test]
async fn unresolvable_references_fall_back_to_the_sentinel() {
    let client = Client::new(Offline, EntityStore::new());

    let record = client
        .create_reservation(draft(8, 9, at(9, 0), at(10, 0), "Alice"))
        .await
        .unwrap();
    assert_eq!(record.content.location_name, MISSING_REFERENCE);
    assert_eq!(record.content.room_name, MISSING_REFERENCE);
}

#[tokio::test]
async fn rejected_creates_leave_the_store_unchanged() {
    let client = Client::new(Offline, EntityStore::new());

    let result = client
        .create_reservation(draft(1, 1, at(10, 0), at(9, 0), "Alice"))
        .await;
    assert!(matches!(
        result,
        Err(RequestError::Validation(ValidationError::InvalidInterval))
    ));
    assert!(client.store().reservations.list().await.is_empty());
}

#[tokio::test]
async fn updates_ignore_their_own_slot_and_keep_created_at() {
    let client = Client::new(Offline, EntityStore::seeded());

    let created = client
        .create_reservation(draft(1, 1, at(9, 0), at(10, 0), "Alice"))
        .await
        .unwrap();

    let updated = client
        .update_reservation(created.id, draft(1, 1, at(9, 0), at(10, 30), "Alice"))
        .await
        .unwrap();
    assert_eq!(updated.content.end, at(10, 30));
    assert_eq!(updated.content.created_at, created.content.created_at);
}

#[tokio::test]
async fn updating_a_missing_reservation_reports_not_found() {
    let client = Client::new(Offline, EntityStore::new());
    let result = client
        .update_reservation(Id::new(9), draft(1, 1, at(9, 0), at(10, 0), "Alice"))
        .await;
    assert!(matches!(result, Err(RequestError::NotFound)));
}

#[tokio::test]
async fn rooms_filter_by_location_client_side() {
    let client = Client::new(Offline, EntityStore::seeded());

    let rooms = client.rooms_at_location(Id::new(1)).await.unwrap();
    assert_eq!(rooms.len(), 2);
    assert!(rooms.iter().all(|room| room.content.location_id == Id::new(1)));
}

#[tokio::test]
async fn room_overviews_show_the_sentinel_for_deleted_locations() {
    let client = Client::new(Offline, EntityStore::seeded());

    client.delete_location(Id::new(2)).await.unwrap();

    let overviews = client.room_overviews().await.unwrap();
    let auditorium = overviews
        .iter()
        .find(|overview| overview.room.content.name == "Auditorium")
        .unwrap();
    assert_eq!(auditorium.location_name, MISSING_REFERENCE);
}

#[tokio::test]
async fn online_writes_are_served_by_the_backend_only() {
    let backend = RemoteBackend::default();
    let campus = backend.create(Location::example_data()).await.unwrap();
    let room = backend.create(Room::example_data()).await.unwrap();

    let client = Client::new(backend, EntityStore::new());
    let record = client
        .create_reservation(draft(campus.id.raw(), room.id.raw(), at(9, 0), at(10, 0), "Alice"))
        .await
        .unwrap();

    // Names were resolved through the backend, and nothing touched the
    // fallback store.
    assert_eq!(record.content.location_name, "Campus 1");
    assert_eq!(record.content.room_name, "A101");
    assert!(client.store().reservations.list().await.is_empty());

    let reservations = client.reservations().await.unwrap();
    assert_eq!(reservations.len(), 1);
}

#[tokio::test]
async fn online_double_booking_is_rejected_against_the_backend() {
    let backend = RemoteBackend::default();
    let campus = backend.create(Location::example_data()).await.unwrap();
    let room = backend.create(Room::example_data()).await.unwrap();

    let client = Client::new(backend, EntityStore::new());
    client
        .create_reservation(draft(campus.id.raw(), room.id.raw(), at(9, 0), at(10, 0), "Alice"))
        .await
        .unwrap();

    let result = client
        .create_reservation(draft(campus.id.raw(), room.id.raw(), at(9, 30), at(10, 30), "Bob"))
        .await;
    assert!(matches!(
        result,
        Err(RequestError::Validation(ValidationError::RoomAlreadyBooked))
    ));
}

#[tokio::test]
async fn online_missing_records_surface_not_found() {
    let client = Client::new(RemoteBackend::default(), EntityStore::new());
    let result = client.reservation(Id::new(42)).await;
    assert!(matches!(result, Err(RequestError::NotFound)));
}

#[tokio::test]
async fn online_deletes_of_missing_records_still_succeed() {
    let client = Client::new(RemoteBackend::default(), EntityStore::new());
    assert!(client.delete_room(Id::new(5)).await.is_ok());
}
