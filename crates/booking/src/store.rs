use std::{error, fmt};

use chrono::{TimeZone, Utc};
use model::{location::Location, reservation::Reservation, room::Room, WithId};
use tokio::sync::RwLock;
use utility::id::{HasId, Id};

#[derive(Debug)]
pub enum StoreError {
    NotFound,
}

impl error::Error for StoreError {}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::NotFound => write!(f, "record not found in the local store"),
        }
    }
}

pub type StoreResult<O> = Result<O, StoreError>;

/// One in-memory collection of the fallback dataset. Every mutation runs
/// under the collection's write lock, so id assignment and the insert it
/// belongs to are a single atomic step. There are no transactions across
/// collections.
pub struct Collection<T>
where
    T: HasId<IdType = i64>,
{
    rows: RwLock<Vec<WithId<T>>>,
}

impl<T> Collection<T>
where
    T: HasId<IdType = i64> + Clone,
{
    fn new() -> Self {
        Self {
            rows: RwLock::new(Vec::new()),
        }
    }

    fn with_rows(rows: Vec<WithId<T>>) -> Self {
        Self {
            rows: RwLock::new(rows),
        }
    }

    pub async fn list(&self) -> Vec<WithId<T>> {
        self.rows.read().await.clone()
    }

    pub async fn find(&self, id: Id<T>) -> Option<WithId<T>> {
        self.rows.read().await.iter().find(|row| row.id == id).cloned()
    }

    /// Inserts with an id one greater than the current maximum, or `1` for
    /// an empty collection. Monotonic per process only, so not safe for
    /// multi-writer use; the store is a single-user, non-persistent
    /// fallback.
    pub async fn insert(&self, content: T) -> WithId<T> {
        let mut rows = self.rows.write().await;
        let id = rows.iter().map(|row| row.id.raw()).max().unwrap_or(0) + 1;
        let record = WithId::new(Id::new(id), content);
        rows.push(record.clone());
        record
    }

    pub async fn update(&self, id: Id<T>, content: T) -> StoreResult<WithId<T>> {
        let mut rows = self.rows.write().await;
        match rows.iter_mut().find(|row| row.id == id) {
            Some(row) => {
                row.content = content;
                Ok(row.clone())
            }
            None => Err(StoreError::NotFound),
        }
    }

    pub async fn remove(&self, id: Id<T>) -> StoreResult<()> {
        let mut rows = self.rows.write().await;
        let count = rows.len();
        rows.retain(|row| row.id != id);
        if rows.len() == count {
            Err(StoreError::NotFound)
        } else {
            Ok(())
        }
    }

    pub async fn clear(&self) {
        self.rows.write().await.clear();
    }
}

/// The local fallback dataset. It owns all records while the backend is
/// unreachable; once the backend answers again it degrades to a stale
/// shadow copy that is never merged back.
pub struct EntityStore {
    pub locations: Collection<Location>,
    pub rooms: Collection<Room>,
    pub reservations: Collection<Reservation>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self {
            locations: Collection::new(),
            rooms: Collection::new(),
            reservations: Collection::new(),
        }
    }

    /// A store pre-filled with the dataset a fresh offline session starts
    /// from, mirroring what the backend would normally serve.
    pub fn seeded() -> Self {
        let locations = vec![
            WithId::new(
                Id::new(1),
                Location {
                    name: "Campus 1".to_owned(),
                    description: Some("Main administrative building".to_owned()),
                },
            ),
            WithId::new(
                Id::new(2),
                Location {
                    name: "Campus 2".to_owned(),
                    description: None,
                },
            ),
        ];
        let rooms = vec![
            WithId::new(
                Id::new(1),
                Room {
                    name: "A101".to_owned(),
                    capacity: 10,
                    location_id: Id::new(1),
                },
            ),
            WithId::new(
                Id::new(2),
                Room {
                    name: "A102".to_owned(),
                    capacity: 4,
                    location_id: Id::new(1),
                },
            ),
            WithId::new(
                Id::new(3),
                Room {
                    name: "Auditorium".to_owned(),
                    capacity: 80,
                    location_id: Id::new(2),
                },
            ),
        ];
        let reservations = vec![WithId::new(
            Id::new(1),
            Reservation {
                location_id: Id::new(1),
                room_id: Id::new(2),
                location_name: "Campus 1".to_owned(),
                room_name: "A102".to_owned(),
                start: Utc.with_ymd_and_hms(2025, 1, 8, 14, 0, 0).unwrap(),
                end: Utc.with_ymd_and_hms(2025, 1, 8, 15, 0, 0).unwrap(),
                responsible: "Carla".to_owned(),
                coffee_requested: true,
                coffee_quantity: Some(4),
                coffee_description: Some("Espresso only".to_owned()),
                created_at: Utc.with_ymd_and_hms(2025, 1, 2, 9, 15, 0).unwrap(),
            },
        )];
        Self {
            locations: Collection::with_rows(locations),
            rooms: Collection::with_rows(rooms),
            reservations: Collection::with_rows(reservations),
        }
    }

    /// Clears every collection.
    pub async fn reset(&self) {
        self.locations.clear().await;
        self.rooms.clear().await;
        self.reservations.clear().await;
    }
}

impl Default for EntityStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use model::ExampleData;

    use super::*;

    #[tokio::test]
    async fn sequential_inserts_assign_ids_from_one() {
        let store = EntityStore::new();
        for expected in 1..=4 {
            let record = store.locations.insert(Location::example_data()).await;
            assert_eq!(record.id, Id::new(expected));
        }
    }

    #[tokio::test]
    async fn inserts_continue_from_the_maximum_id() {
        let store = EntityStore::new();
        let first = store.rooms.insert(Room::example_data()).await;
        let second = store.rooms.insert(Room::example_data()).await;
        store.rooms.remove(first.id).await.unwrap();

        let third = store.rooms.insert(Room::example_data()).await;
        assert_eq!(second.id, Id::new(2));
        assert_eq!(third.id, Id::new(3));
    }

    #[tokio::test]
    async fn update_of_a_missing_record_reports_not_found() {
        let store = EntityStore::new();
        let result = store.locations.update(Id::new(9), Location::example_data()).await;
        assert!(matches!(result, Err(StoreError::NotFound)));
    }

    #[tokio::test]
    async fn remove_of_a_missing_record_reports_not_found() {
        let store = EntityStore::new();
        let result = store.reservations.remove(Id::new(1)).await;
        assert!(matches!(result, Err(StoreError::NotFound)));
    }

    #[tokio::test]
    async fn reset_clears_the_seeded_dataset() {
        let store = EntityStore::seeded();
        assert!(!store.rooms.list().await.is_empty());

        store.reset().await;
        assert!(store.locations.list().await.is_empty());
        assert!(store.rooms.list().await.is_empty());
        assert!(store.reservations.list().await.is_empty());
    }
}
