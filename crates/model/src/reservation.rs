use chrono::{DateTime, TimeZone, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use utility::id::{HasId, Id};

use crate::{location::Location, room::Room, ExampleData};

/// Sentinel stored in the denormalized name fields when the referenced room
/// or location can not be resolved.
pub const MISSING_REFERENCE: &str = "-";

fn missing_reference() -> String {
    MISSING_REFERENCE.to_owned()
}

/// A booked time interval for a room. `location_name` and `room_name` are a
/// cache stamped at write time, not a live join: renaming or deleting the
/// referenced entities later leaves them stale.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    pub location_id: Id<Location>,
    pub room_id: Id<Room>,
    #[serde(default = "missing_reference")]
    pub location_name: String,
    #[serde(default = "missing_reference")]
    pub room_name: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub responsible: String,
    pub coffee_requested: bool,
    pub coffee_quantity: Option<u32>,
    pub coffee_description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl HasId for Reservation {
    type IdType = i64;
}

impl ExampleData for Reservation {
    fn example_data() -> Self {
        Self {
            location_id: Id::new(1),
            room_id: Id::new(1),
            location_name: "Campus 1".to_owned(),
            room_name: "A101".to_owned(),
            start: Utc.with_ymd_and_hms(2025, 1, 10, 9, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2025, 1, 10, 10, 0, 0).unwrap(),
            responsible: "Alice".to_owned(),
            coffee_requested: true,
            coffee_quantity: Some(8),
            coffee_description: Some("Coffee and water for the team".to_owned()),
            created_at: Utc.with_ymd_and_hms(2025, 1, 2, 14, 30, 0).unwrap(),
        }
    }
}

/// The client-submitted shape of a reservation. Ids arrive unchecked, the
/// coffee fields raw; the record fields (`created_at`, the cached names)
/// are stamped at write time after validation.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReservationDraft {
    pub location_id: Option<Id<Location>>,
    pub room_id: Option<Id<Room>>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub responsible: String,
    pub coffee_requested: bool,
    pub coffee_quantity: Option<u32>,
    pub coffee_description: Option<String>,
}

impl ExampleData for ReservationDraft {
    fn example_data() -> Self {
        Self {
            location_id: Some(Id::new(1)),
            room_id: Some(Id::new(1)),
            start: Utc.with_ymd_and_hms(2025, 1, 10, 9, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2025, 1, 10, 10, 0, 0).unwrap(),
            responsible: "Alice".to_owned(),
            coffee_requested: false,
            coffee_quantity: None,
            coffee_description: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::WithId;

    #[test]
    fn reservations_use_the_camel_case_wire_format() {
        let record = WithId::new(Id::new(1), Reservation::example_data());
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["locationId"], 1);
        assert_eq!(json["roomId"], 1);
        assert_eq!(json["roomName"], "A101");
        assert_eq!(json["coffeeRequested"], true);
        assert_eq!(json["start"], "2025-01-10T09:00:00Z");
    }

    #[test]
    fn missing_denormalized_names_default_to_the_sentinel() {
        let json = r#"{
            "id": 9,
            "locationId": 1,
            "roomId": 2,
            "start": "2025-01-10T09:00:00Z",
            "end": "2025-01-10T10:00:00Z",
            "responsible": "Alice",
            "coffeeRequested": false,
            "createdAt": "2025-01-02T14:30:00Z"
        }"#;
        let record: WithId<Reservation> = serde_json::from_str(json).unwrap();
        assert_eq!(record.content.location_name, MISSING_REFERENCE);
        assert_eq!(record.content.room_name, MISSING_REFERENCE);
        assert_eq!(record.content.coffee_quantity, None);
    }
}
