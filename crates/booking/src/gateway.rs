use std::{error, fmt};

use async_trait::async_trait;
use model::{location::Location, reservation::Reservation, room::Room, WithId};
use serde::{de::DeserializeOwned, Serialize};
use utility::id::{HasId, Id};

/// Outcome of a single remote call. `NotFound` is a served answer from a
/// reachable backend; `Unavailable` is a transport failure and the trigger
/// for the local fallback.
#[derive(Debug)]
pub enum GatewayError {
    NotFound,
    Unavailable(Box<dyn error::Error + Send + Sync>),
}

impl GatewayError {
    pub fn unavailable<E: error::Error + Send + Sync + 'static>(why: E) -> Self {
        Self::Unavailable(Box::new(why))
    }
}

impl error::Error for GatewayError {}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatewayError::NotFound => write!(f, "record not found"),
            GatewayError::Unavailable(why) => write!(f, "backend unavailable: {}", why),
        }
    }
}

pub type GatewayResult<O> = Result<O, GatewayError>;

pub fn not_found_to_none<O>(result: GatewayResult<O>) -> GatewayResult<Option<O>> {
    if let Err(GatewayError::NotFound) = result {
        Ok(None)
    } else {
        result.map(Some)
    }
}

/// A REST resource: an entity content type together with the collection
/// path it lives under on the backend.
pub trait Resource:
    HasId<IdType = i64>
    + Serialize
    + DeserializeOwned
    + fmt::Debug
    + Clone
    + Send
    + Sync
    + 'static
{
    const PATH: &'static str;
}

impl Resource for Location {
    const PATH: &'static str = "locations";
}

impl Resource for Room {
    const PATH: &'static str = "rooms";
}

impl Resource for Reservation {
    const PATH: &'static str = "reservations";
}

/// CRUD verbs against the remote backend. One attempt per call, no
/// retries; a failed attempt is reported to the caller immediately. The
/// backend being absent is routine, not exceptional.
#[async_trait]
pub trait Gateway: Send + Sync {
    async fn fetch_all<R: Resource>(&self) -> GatewayResult<Vec<WithId<R>>>;

    async fn fetch<R: Resource>(&self, id: Id<R>) -> GatewayResult<WithId<R>>;

    async fn create<R: Resource>(&self, content: R) -> GatewayResult<WithId<R>>;

    async fn update<R: Resource>(&self, record: WithId<R>) -> GatewayResult<WithId<R>>;

    async fn remove<R: Resource>(&self, id: Id<R>) -> GatewayResult<()>;
}
