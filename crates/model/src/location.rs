use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use utility::id::HasId;

use crate::ExampleData;

/// A physical site grouping rooms, e.g. a campus or an office building.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub name: String,
    pub description: Option<String>,
}

impl HasId for Location {
    type IdType = i64;
}

impl ExampleData for Location {
    fn example_data() -> Self {
        Self {
            name: "Campus 1".to_owned(),
            description: Some("Main administrative building".to_owned()),
        }
    }
}
