use std::fmt::Debug;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use utility::id::{HasId, Id};

pub mod location;
pub mod reservation;
pub mod room;

pub trait ExampleData {
    fn example_data() -> Self;
}

/// A record together with the id assigned by whichever store created it.
/// Serializes flat, so a `WithId<Room>` is `{"id": 3, "name": ..., ...}`
/// on the wire.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(bound(
    serialize = "V: Serialize, V::IdType: Serialize",
    deserialize = "V: Deserialize<'de>, V::IdType: Deserialize<'de>"
))]
#[schemars(bound = "V: JsonSchema, V::IdType: Serialize")]
pub struct WithId<V>
where
    V: HasId,
    V::IdType: Debug + Clone,
{
    pub id: Id<V>,
    #[serde(flatten)]
    pub content: V,
}

impl<V> WithId<V>
where
    V: HasId,
    V::IdType: Debug + Clone,
{
    pub fn new(id: Id<V>, content: V) -> Self {
        Self { id, content }
    }
}
