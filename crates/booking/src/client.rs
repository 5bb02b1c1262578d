use chrono::{DateTime, Utc};
use model::{
    location::Location,
    reservation::{Reservation, ReservationDraft},
    room::{Room, RoomOverview},
    WithId,
};
use utility::id::Id;

use crate::{
    denormalize::{self, ResolvedNames},
    gateway::{not_found_to_none, Gateway, GatewayError, Resource},
    store::{Collection, EntityStore, StoreError},
    validate::{self, ValidationError},
    RequestError, RequestResult,
};

/// Outcome of one remote attempt. The outer error is the transport failure
/// that triggers the fallback; the inner result is an answer the backend
/// actually served and is returned to the caller verbatim.
type RemoteAttempt<T> = Result<RequestResult<T>, GatewayError>;

/// The data-access layer the pages talk to. Every operation first tries
/// the remote backend; when it is unreachable the same operation runs
/// against the local [`EntityStore`] instead. Callers only ever observe a
/// CRUD result, never which side served it.
pub struct Client<G>
where
    G: Gateway,
{
    gateway: G,
    store: EntityStore,
}

impl<G> Client<G>
where
    G: Gateway,
{
    pub fn new(gateway: G, store: EntityStore) -> Self {
        Self { gateway, store }
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    async fn list_or_fallback<R>(&self, local: &Collection<R>) -> RequestResult<Vec<WithId<R>>>
    where
        R: Resource,
    {
        match self.gateway.fetch_all::<R>().await {
            Ok(records) => Ok(records),
            Err(why) => {
                log::warn!(
                    "backend unreachable, listing {} from the local store: {}",
                    R::PATH,
                    why
                );
                Ok(local.list().await)
            }
        }
    }

    async fn get_or_fallback<R>(
        &self,
        id: Id<R>,
        local: &Collection<R>,
    ) -> RequestResult<WithId<R>>
    where
        R: Resource,
    {
        match self.gateway.fetch(id).await {
            Ok(record) => Ok(record),
            Err(GatewayError::NotFound) => Err(RequestError::NotFound),
            Err(why) => {
                log::warn!(
                    "backend unreachable, reading {}/{} from the local store: {}",
                    R::PATH,
                    id,
                    why
                );
                local.find(id).await.ok_or(RequestError::NotFound)
            }
        }
    }

    async fn create_or_fallback<R>(
        &self,
        content: R,
        local: &Collection<R>,
    ) -> RequestResult<WithId<R>>
    where
        R: Resource,
    {
        match self.gateway.create(content.clone()).await {
            Ok(record) => Ok(record),
            Err(why) => {
                log::warn!(
                    "backend unreachable, creating the {} record locally: {}",
                    R::PATH,
                    why
                );
                Ok(local.insert(content).await)
            }
        }
    }

    async fn update_or_fallback<R>(
        &self,
        record: WithId<R>,
        local: &Collection<R>,
    ) -> RequestResult<WithId<R>>
    where
        R: Resource,
    {
        match self.gateway.update(record.clone()).await {
            Ok(updated) => Ok(updated),
            Err(GatewayError::NotFound) => Err(RequestError::NotFound),
            Err(why) => {
                log::warn!(
                    "backend unreachable, updating {}/{} locally: {}",
                    R::PATH,
                    record.id,
                    why
                );
                local
                    .update(record.id, record.content)
                    .await
                    .map_err(RequestError::from)
            }
        }
    }

    /// Deletes are idempotent: a record that is already gone, on either
    /// side, counts as deleted.
    async fn delete_or_fallback<R>(&self, id: Id<R>, local: &Collection<R>) -> RequestResult<()>
    where
        R: Resource,
    {
        match self.gateway.remove(id).await {
            Ok(()) => Ok(()),
            Err(GatewayError::NotFound) => Ok(()),
            Err(why) => {
                log::warn!(
                    "backend unreachable, deleting {}/{} locally: {}",
                    R::PATH,
                    id,
                    why
                );
                match local.remove(id).await {
                    Ok(()) | Err(StoreError::NotFound) => Ok(()),
                }
            }
        }
    }
}

/// locations
impl<G> Client<G>
where
    G: Gateway,
{
    pub async fn locations(&self) -> RequestResult<Vec<WithId<Location>>> {
        self.list_or_fallback(&self.store.locations).await
    }

    pub async fn location(&self, id: Id<Location>) -> RequestResult<WithId<Location>> {
        self.get_or_fallback(id, &self.store.locations).await
    }

    pub async fn create_location(&self, location: Location) -> RequestResult<WithId<Location>> {
        validate::validate_location(&location)?;
        self.create_or_fallback(location, &self.store.locations).await
    }

    pub async fn update_location(
        &self,
        id: Id<Location>,
        location: Location,
    ) -> RequestResult<WithId<Location>> {
        validate::validate_location(&location)?;
        self.update_or_fallback(WithId::new(id, location), &self.store.locations)
            .await
    }

    pub async fn delete_location(&self, id: Id<Location>) -> RequestResult<()> {
        self.delete_or_fallback(id, &self.store.locations).await
    }
}

/// rooms
impl<G> Client<G>
where
    G: Gateway,
{
    pub async fn rooms(&self) -> RequestResult<Vec<WithId<Room>>> {
        self.list_or_fallback(&self.store.rooms).await
    }

    /// The backend has no filter parameters; filtering rooms by location
    /// happens here.
    pub async fn rooms_at_location(
        &self,
        location_id: Id<Location>,
    ) -> RequestResult<Vec<WithId<Room>>> {
        let rooms = self.rooms().await?;
        Ok(rooms
            .into_iter()
            .filter(|room| room.content.location_id == location_id)
            .collect())
    }

    /// Rooms joined with their location names for the room list. Deleted
    /// locations show up as the sentinel, not an error.
    pub async fn room_overviews(&self) -> RequestResult<Vec<RoomOverview>> {
        let locations = self.locations().await?;
        let rooms = self.rooms().await?;
        Ok(denormalize::room_overviews(rooms, &locations))
    }

    pub async fn room(&self, id: Id<Room>) -> RequestResult<WithId<Room>> {
        self.get_or_fallback(id, &self.store.rooms).await
    }

    pub async fn create_room(&self, room: Room) -> RequestResult<WithId<Room>> {
        validate::validate_room(&room)?;
        self.create_or_fallback(room, &self.store.rooms).await
    }

    pub async fn update_room(&self, id: Id<Room>, room: Room) -> RequestResult<WithId<Room>> {
        validate::validate_room(&room)?;
        self.update_or_fallback(WithId::new(id, room), &self.store.rooms)
            .await
    }

    pub async fn delete_room(&self, id: Id<Room>) -> RequestResult<()> {
        self.delete_or_fallback(id, &self.store.rooms).await
    }
}

/// reservations
impl<G> Client<G>
where
    G: Gateway,
{
    pub async fn reservations(&self) -> RequestResult<Vec<WithId<Reservation>>> {
        self.list_or_fallback(&self.store.reservations).await
    }

    pub async fn reservation(&self, id: Id<Reservation>) -> RequestResult<WithId<Reservation>> {
        self.get_or_fallback(id, &self.store.reservations).await
    }

    pub async fn create_reservation(
        &self,
        draft: ReservationDraft,
    ) -> RequestResult<WithId<Reservation>> {
        match self.create_reservation_remote(&draft).await {
            Ok(served) => served,
            Err(why) => {
                log::warn!("backend unreachable, creating the reservation locally: {}", why);
                self.create_reservation_local(&draft).await
            }
        }
    }

    pub async fn update_reservation(
        &self,
        id: Id<Reservation>,
        draft: ReservationDraft,
    ) -> RequestResult<WithId<Reservation>> {
        match self.update_reservation_remote(id, &draft).await {
            Ok(served) => served,
            Err(why) => {
                log::warn!(
                    "backend unreachable, updating reservation {} locally: {}",
                    id,
                    why
                );
                self.update_reservation_local(id, &draft).await
            }
        }
    }

    pub async fn delete_reservation(&self, id: Id<Reservation>) -> RequestResult<()> {
        self.delete_or_fallback(id, &self.store.reservations).await
    }

    async fn create_reservation_remote(
        &self,
        draft: &ReservationDraft,
    ) -> RemoteAttempt<WithId<Reservation>> {
        // The backend's reservation list is read immediately before the
        // check, so the overlap test never runs against stale data.
        let existing = self.gateway.fetch_all::<Reservation>().await?;
        let (location_id, room_id) =
            match validate::validate_reservation(draft, None, &existing)
                .and_then(|()| checked_ids(draft))
            {
                Ok(ids) => ids,
                Err(why) => return Ok(Err(why.into())),
            };
        let names = self.resolve_names_remote(location_id, room_id).await?;
        let record = build_record(location_id, room_id, draft, names, Utc::now());
        let created = self.gateway.create(record).await?;
        Ok(Ok(created))
    }

    async fn create_reservation_local(
        &self,
        draft: &ReservationDraft,
    ) -> RequestResult<WithId<Reservation>> {
        let existing = self.store.reservations.list().await;
        validate::validate_reservation(draft, None, &existing)?;
        let (location_id, room_id) = checked_ids(draft)?;
        let names = self.resolve_names_local(location_id, room_id).await;
        let record = build_record(location_id, room_id, draft, names, Utc::now());
        Ok(self.store.reservations.insert(record).await)
    }

    async fn update_reservation_remote(
        &self,
        id: Id<Reservation>,
        draft: &ReservationDraft,
    ) -> RemoteAttempt<WithId<Reservation>> {
        let existing = self.gateway.fetch_all::<Reservation>().await?;
        let Some(current) = existing.iter().find(|record| record.id == id) else {
            return Ok(Err(RequestError::NotFound));
        };
        // `created_at` is set once at creation and survives every update.
        let created_at = current.content.created_at;
        let (location_id, room_id) =
            match validate::validate_reservation(draft, Some(id), &existing)
                .and_then(|()| checked_ids(draft))
            {
                Ok(ids) => ids,
                Err(why) => return Ok(Err(why.into())),
            };
        let names = self.resolve_names_remote(location_id, room_id).await?;
        let record = build_record(location_id, room_id, draft, names, created_at);
        match self.gateway.update(WithId::new(id, record)).await {
            Ok(updated) => Ok(Ok(updated)),
            Err(GatewayError::NotFound) => Ok(Err(RequestError::NotFound)),
            Err(why) => Err(why),
        }
    }

    async fn update_reservation_local(
        &self,
        id: Id<Reservation>,
        draft: &ReservationDraft,
    ) -> RequestResult<WithId<Reservation>> {
        let existing = self.store.reservations.list().await;
        let Some(current) = existing.iter().find(|record| record.id == id) else {
            return Err(RequestError::NotFound);
        };
        let created_at = current.content.created_at;
        validate::validate_reservation(draft, Some(id), &existing)?;
        let (location_id, room_id) = checked_ids(draft)?;
        let names = self.resolve_names_local(location_id, room_id).await;
        let record = build_record(location_id, room_id, draft, names, created_at);
        self.store
            .reservations
            .update(id, record)
            .await
            .map_err(RequestError::from)
    }

    /// Names resolve through the backend here, since it owns canonical
    /// state for a remote write.
    async fn resolve_names_remote(
        &self,
        location_id: Id<Location>,
        room_id: Id<Room>,
    ) -> Result<ResolvedNames, GatewayError> {
        let location = not_found_to_none(self.gateway.fetch::<Location>(location_id).await)?;
        let room = not_found_to_none(self.gateway.fetch::<Room>(room_id).await)?;
        Ok(denormalize::resolve_names(
            location.as_ref().map(|record| &record.content),
            room.as_ref().map(|record| &record.content),
        ))
    }

    async fn resolve_names_local(
        &self,
        location_id: Id<Location>,
        room_id: Id<Room>,
    ) -> ResolvedNames {
        let location = self.store.locations.find(location_id).await;
        let room = self.store.rooms.find(room_id).await;
        denormalize::resolve_names(
            location.as_ref().map(|record| &record.content),
            room.as_ref().map(|record| &record.content),
        )
    }
}

fn checked_ids(
    draft: &ReservationDraft,
) -> Result<(Id<Location>, Id<Room>), ValidationError> {
    match (draft.location_id, draft.room_id) {
        (Some(location_id), Some(room_id)) => Ok((location_id, room_id)),
        (None, _) => Err(ValidationError::MissingField("locationId")),
        (_, None) => Err(ValidationError::MissingField("roomId")),
    }
}

/// Builds the stored record from a validated draft. The coffee fields are
/// forced to `None` when no coffee was requested, whatever was submitted.
fn build_record(
    location_id: Id<Location>,
    room_id: Id<Room>,
    draft: &ReservationDraft,
    names: ResolvedNames,
    created_at: DateTime<Utc>,
) -> Reservation {
    Reservation {
        location_id,
        room_id,
        location_name: names.location_name,
        room_name: names.room_name,
        start: draft.start,
        end: draft.end,
        responsible: draft.responsible.clone(),
        coffee_requested: draft.coffee_requested,
        coffee_quantity: if draft.coffee_requested {
            draft.coffee_quantity
        } else {
            None
        },
        coffee_description: if draft.coffee_requested {
            draft.coffee_description.clone()
        } else {
            None
        },
        created_at,
    }
}
