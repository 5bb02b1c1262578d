use std::{error, fmt};

use model::{
    location::Location,
    reservation::{Reservation, ReservationDraft},
    room::Room,
    WithId,
};
use utility::id::Id;

/// Why a write was rejected before reaching any store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    MissingField(&'static str),
    InvalidInterval,
    RoomAlreadyBooked,
    InvalidCoffeeQuantity,
    InvalidCapacity,
}

impl error::Error for ValidationError {}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::MissingField(field) => {
                write!(f, "required field '{}' is missing or empty", field)
            }
            ValidationError::InvalidInterval => {
                write!(f, "reservation end must be after its start")
            }
            ValidationError::RoomAlreadyBooked => {
                write!(f, "the room is already booked in the requested time slot")
            }
            ValidationError::InvalidCoffeeQuantity => {
                write!(f, "coffee quantity must be a positive number")
            }
            ValidationError::InvalidCapacity => {
                write!(f, "room capacity must be a positive number")
            }
        }
    }
}

pub type ValidationResult = Result<(), ValidationError>;

/// Checks a reservation draft against the reservations currently known for
/// its room. `own_id` excludes the record itself from the conflict set when
/// updating. Intervals are half-open: a reservation ending exactly when
/// another starts does not conflict.
///
/// The `existing` slice must be read from the authoritative store
/// immediately before the call, so the overlap check never runs against
/// stale data.
pub fn validate_reservation(
    draft: &ReservationDraft,
    own_id: Option<Id<Reservation>>,
    existing: &[WithId<Reservation>],
) -> ValidationResult {
    if draft.location_id.is_none() {
        return Err(ValidationError::MissingField("locationId"));
    }
    let Some(room_id) = draft.room_id else {
        return Err(ValidationError::MissingField("roomId"));
    };
    if draft.responsible.trim().is_empty() {
        return Err(ValidationError::MissingField("responsible"));
    }
    if draft.end <= draft.start {
        return Err(ValidationError::InvalidInterval);
    }
    let conflict = existing.iter().any(|other| {
        other.content.room_id == room_id
            && Some(other.id) != own_id
            && draft.start < other.content.end
            && draft.end > other.content.start
    });
    if conflict {
        return Err(ValidationError::RoomAlreadyBooked);
    }
    if draft.coffee_requested && draft.coffee_quantity == Some(0) {
        return Err(ValidationError::InvalidCoffeeQuantity);
    }
    Ok(())
}

pub fn validate_location(location: &Location) -> ValidationResult {
    if location.name.trim().is_empty() {
        return Err(ValidationError::MissingField("name"));
    }
    Ok(())
}

pub fn validate_room(room: &Room) -> ValidationResult {
    if room.name.trim().is_empty() {
        return Err(ValidationError::MissingField("name"));
    }
    if room.capacity == 0 {
        return Err(ValidationError::InvalidCapacity);
    }
    Ok(())
}
