use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use utility::id::{HasId, Id};

use crate::{location::Location, ExampleData, WithId};

/// A bookable space with a seating capacity. The referenced location is not
/// foreign-key enforced; a room may outlive the location it points at.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub name: String,
    pub capacity: u32,
    pub location_id: Id<Location>,
}

impl HasId for Room {
    type IdType = i64;
}

impl ExampleData for Room {
    fn example_data() -> Self {
        Self {
            name: "A101".to_owned(),
            capacity: 10,
            location_id: Id::new(1),
        }
    }
}

/// A room joined with the display name of its location, the shape the room
/// list renders. Deleted locations show up as the sentinel, not an error.
#[derive(Debug, Clone, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoomOverview {
    #[serde(flatten)]
    pub room: WithId<Room>,
    pub location_name: String,
}
