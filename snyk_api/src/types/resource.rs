use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A JSON:API resource object with typed attributes.
///
/// `A` defaults to an untyped JSON value so collections can be walked without
/// a dedicated struct per resource kind.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Resource<A = Value> {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default = "Option::default", skip_serializing_if = "Option::is_none")]
    pub attributes: Option<A>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationships: Option<Value>,
}

/// A single-resource document: `{"data": ...}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct Document<T> {
    pub data: T,
}
