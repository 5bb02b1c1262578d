use model::{
    location::Location,
    reservation::MISSING_REFERENCE,
    room::{Room, RoomOverview},
    WithId,
};

/// Display names resolved for a reservation at write time. The copy is a
/// cache: renaming the room or location afterwards leaves records stale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedNames {
    pub location_name: String,
    pub room_name: String,
}

/// Resolves the denormalized names from whatever the authoritative store
/// returned for the referenced entities. A missing reference resolves to
/// the sentinel instead of failing the write.
pub fn resolve_names(location: Option<&Location>, room: Option<&Room>) -> ResolvedNames {
    ResolvedNames {
        location_name: location
            .map(|location| location.name.clone())
            .unwrap_or_else(|| MISSING_REFERENCE.to_owned()),
        room_name: room
            .map(|room| room.name.clone())
            .unwrap_or_else(|| MISSING_REFERENCE.to_owned()),
    }
}

/// The location name a room should display, with the same sentinel policy
/// for rooms whose location no longer exists.
pub fn location_name_for_room(room: &Room, locations: &[WithId<Location>]) -> String {
    locations
        .iter()
        .find(|location| location.id == room.location_id)
        .map(|location| location.content.name.clone())
        .unwrap_or_else(|| MISSING_REFERENCE.to_owned())
}

/// Joins each room with its location name for the room list.
pub fn room_overviews(
    rooms: Vec<WithId<Room>>,
    locations: &[WithId<Location>],
) -> Vec<RoomOverview> {
    rooms
        .into_iter()
        .map(|room| {
            let location_name = location_name_for_room(&room.content, locations);
            RoomOverview {
                room,
                location_name,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use model::ExampleData;
    use utility::id::Id;

    use super::*;

    #[test]
    fn resolves_names_from_the_referenced_entities() {
        let location = Location::example_data();
        let room = Room::example_data();
        let names = resolve_names(Some(&location), Some(&room));
        assert_eq!(names.location_name, "Campus 1");
        assert_eq!(names.room_name, "A101");
    }

    #[test]
    fn missing_references_resolve_to_the_sentinel() {
        let room = Room::example_data();
        let names = resolve_names(None, Some(&room));
        assert_eq!(names.location_name, MISSING_REFERENCE);
        assert_eq!(names.room_name, "A101");

        let names = resolve_names(None, None);
        assert_eq!(names.room_name, MISSING_REFERENCE);
    }

    #[test]
    fn rooms_of_a_deleted_location_display_the_sentinel() {
        let locations = vec![WithId::new(Id::new(2), Location::example_data())];
        let room = Room {
            location_id: Id::new(1),
            ..Room::example_data()
        };
        assert_eq!(location_name_for_room(&room, &locations), MISSING_REFERENCE);
    }

    #[test]
    fn room_overviews_join_location_names() {
        let locations = vec![WithId::new(Id::new(1), Location::example_data())];
        let rooms = vec![WithId::new(Id::new(1), Room::example_data())];
        let overviews = room_overviews(rooms, &locations);
        assert_eq!(overviews.len(), 1);
        assert_eq!(overviews[0].location_name, "Campus 1");
    }
}
