use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use super::type_tag::type_tags;
use crate::constants::{Z_INDEX_MAX, Z_INDEX_MIN};
use crate::registry;

/// Whether a node is a station or a decoration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeCategory {
    Station,
    MiscNode,
}

type_tags! {
    /// Type tag selecting a node's payload and renderer
    pub enum NodeType {
        ShmetroBasic => "shmetro-basic",
        ShmetroBasic2020 => "shmetro-basic-2020",
        ShmetroInt => "shmetro-int",
        GzmtrBasic => "gzmtr-basic",
        GzmtrInt => "gzmtr-int",
        BjsubwayBasic => "bjsubway-basic",
        BjsubwayInt => "bjsubway-int",
        Mtr => "mtr",
        BerlinSBahn => "berlin-s-bahn",
        BerlinUBahn => "berlin-u-bahn",
        JrEastBasic => "jreast-basic",
        MrtBasic => "mrt-basic",
        Virtual => "virtual",
        Text => "text",
        ShmetroNumLineBadge => "shmetro-num-line-badge",
        GzmtrLineBadge => "gzmtr-line-badge",
        BerlinSBahnLineBadge => "berlin-s-bahn-line-badge",
        BerlinUBahnLineBadge => "berlin-u-bahn-line-badge",
        MrtLineBadge => "mrt-line-badge",
        JrEastLineBadge => "jreast-line-badge",
        Facilities => "facilities",
    }
}

impl NodeType {
    /// Category this type belongs to, `None` for unknown tags
    #[must_use]
    pub fn category(&self) -> Option<NodeCategory> {
        match self {
            NodeType::ShmetroBasic
            | NodeType::ShmetroBasic2020
            | NodeType::ShmetroInt
            | NodeType::GzmtrBasic
            | NodeType::GzmtrInt
            | NodeType::BjsubwayBasic
            | NodeType::BjsubwayInt
            | NodeType::Mtr
            | NodeType::BerlinSBahn
            | NodeType::BerlinUBahn
            | NodeType::JrEastBasic
            | NodeType::MrtBasic => Some(NodeCategory::Station),
            NodeType::Virtual
            | NodeType::Text
            | NodeType::ShmetroNumLineBadge
            | NodeType::GzmtrLineBadge
            | NodeType::BerlinSBahnLineBadge
            | NodeType::BerlinUBahnLineBadge
            | NodeType::MrtLineBadge
            | NodeType::JrEastLineBadge
            | NodeType::Facilities => Some(NodeCategory::MiscNode),
            NodeType::Other(_) => None,
        }
    }

    /// Known station types
    #[must_use]
    pub fn stations() -> Vec<NodeType> {
        Self::known()
            .into_iter()
            .filter(|t| t.category() == Some(NodeCategory::Station))
            .collect()
    }

    /// Known misc node types
    #[must_use]
    pub fn misc_nodes() -> Vec<NodeType> {
        Self::known()
            .into_iter()
            .filter(|t| t.category() == Some(NodeCategory::MiscNode))
            .collect()
    }
}

fn default_visible() -> bool {
    true
}

/// Attributes stored on every node
///
/// Besides the common fields, exactly one payload entry is kept, keyed by the
/// node's `type` tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeAttributes {
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default)]
    pub z_index: i32,
    pub x: f64,
    pub y: f64,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    #[serde(flatten)]
    payloads: Map<String, Value>,
}

impl NodeAttributes {
    /// Attributes for a freshly placed node of `node_type` with its default payload
    #[must_use]
    pub fn new(node_type: NodeType, x: f64, y: f64) -> Self {
        let mut attrs = Self {
            visible: true,
            z_index: 0,
            x,
            y,
            node_type,
            payloads: Map::new(),
        };
        attrs.reset_payload();
        attrs
    }

    #[must_use]
    pub fn position(&self) -> (f64, f64) {
        (self.x, self.y)
    }

    pub fn set_position(&mut self, x: f64, y: f64) {
        self.x = x;
        self.y = y;
    }

    /// Set the z-index, clamped to the allowed range
    pub fn set_z_index(&mut self, z_index: i32) {
        self.z_index = z_index.clamp(Z_INDEX_MIN, Z_INDEX_MAX);
    }

    /// Payload of the active type
    #[must_use]
    pub fn payload(&self) -> Option<&Value> {
        self.payloads.get(self.node_type.as_str())
    }

    /// Payload of the active type parsed into `T`
    #[must_use]
    pub fn payload_as<T: DeserializeOwned>(&self) -> Option<T> {
        self.payload().and_then(|value| serde_json::from_value(value.clone()).ok())
    }

    /// Replace the payload of the active type
    pub fn set_payload(&mut self, payload: Value) {
        self.payloads.clear();
        self.payloads.insert(self.node_type.as_str().to_string(), payload);
    }

    /// Switch to another type; the payload is replaced by the new type's default
    pub fn change_type(&mut self, node_type: NodeType) {
        self.node_type = node_type;
        self.reset_payload();
    }

    fn reset_payload(&mut self) {
        let default = registry::node_bundle(&self.node_type).default_payload();
        self.set_payload(default);
    }

    /// Re-establish the invariants after deserialising or merging: clamped
    /// z-index and exactly one payload matching `type`.
    pub fn normalize(&mut self) {
        self.set_z_index(self.z_index);
        let tag = self.node_type.as_str().to_string();
        match self.payloads.remove(&tag) {
            Some(payload) => {
                self.payloads.clear();
                self.payloads.insert(tag, payload);
            }
            None => self.reset_payload(),
        }
    }
}
