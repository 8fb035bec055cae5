//! Serde model of a saved graph document.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{error::MetagraphError, properties::NodeId};

/// One node of a graph document, with its subtree nested inline.
///
/// The same record describes every variant; `type_tag` decides which optional fields must be
/// present. Paths are `/`-separated: absolute for the root, relative to the parent otherwise.
/// Fields this crate does not know about are kept in `extra` and written back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawNode {
    pub id: NodeId,
    pub type_tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<NodeId>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub origin_ids: Vec<NodeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<RawNode>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directories: Option<Vec<RawNode>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metas: Option<Vec<RawNode>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RawNode {
    /// Deserialize a node from a raw JSON mapping, using `type_tag` as its variant.
    pub fn from_mapping(
        mut mapping: Map<String, Value>,
        type_tag: &str,
    ) -> Result<RawNode, MetagraphError> {
        mapping.insert("type_tag".to_string(), Value::String(type_tag.to_string()));
        Ok(serde_json::from_value(Value::Object(mapping))?)
    }

    /// Serialize back into a raw JSON mapping.
    pub fn to_mapping(&self) -> Result<Map<String, Value>, MetagraphError> {
        match serde_json::to_value(self)? {
            Value::Object(mapping) => Ok(mapping),
            other => Err(MetagraphError::Serialization(format!(
                "node serialized to a non-object value: {other}"
            ))),
        }
    }

    /// Number of nodes in this subtree, this node included.
    pub fn count(&self) -> usize {
        1 + [&self.files, &self.directories, &self.metas]
            .into_iter()
            .flatten()
            .flatten()
            .map(RawNode::count)
            .sum::<usize>()
    }
}
