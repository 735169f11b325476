use indexmap::IndexMap;
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableDiGraph};
use serde::{Deserialize, Serialize};
use super::line::EdgeAttributes;
use super::node::NodeAttributes;

pub mod lines;
pub mod nodes;

use lines::Lines;
use nodes::Nodes;

/// Node weight: id plus attributes
#[derive(Debug, Clone, PartialEq)]
pub struct NodeEntry {
    pub id: String,
    pub attributes: NodeAttributes,
}

/// Edge weight: id plus attributes
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeEntry {
    pub id: String,
    pub attributes: EdgeAttributes,
}

/// The attributed diagram multigraph
///
/// Stations and misc nodes are petgraph nodes, lines are directed edges; both
/// are addressed by their string ids. Id maps keep insertion order, which is
/// also the export order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(into = "SerializedGraph", try_from = "SerializedGraph")]
pub struct MetroGraph {
    pub graph: StableDiGraph<NodeEntry, EdgeEntry>,
    node_to_index: IndexMap<String, NodeIndex>,
    line_to_index: IndexMap<String, EdgeIndex>,
}

/// Exported node record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedNode {
    pub key: String,
    pub attributes: NodeAttributes,
}

/// Exported line record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedEdge {
    pub key: String,
    pub source: String,
    pub target: String,
    pub attributes: EdgeAttributes,
}

/// Full node/edge/attribute set as exchanged with the outside world
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SerializedGraph {
    #[serde(default)]
    pub nodes: Vec<SerializedNode>,
    #[serde(default)]
    pub edges: Vec<SerializedEdge>,
}

/// How imported data combines with the current graph
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportMode {
    /// Discard the current graph first
    Replace,
    /// Keep the current graph; records with an existing key overwrite it
    Merge,
}

impl MetroGraph {
    #[must_use]
    pub fn new() -> Self {
        Self {
            graph: StableDiGraph::new(),
            node_to_index: IndexMap::new(),
            line_to_index: IndexMap::new(),
        }
    }

    #[must_use]
    pub fn node_index(&self, id: &str) -> Option<NodeIndex> {
        self.node_to_index.get(id).copied()
    }

    #[must_use]
    pub fn line_index(&self, id: &str) -> Option<EdgeIndex> {
        self.line_to_index.get(id).copied()
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.node_to_index.len()
    }

    #[must_use]
    pub fn line_count(&self) -> usize {
        self.line_to_index.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.node_to_index.is_empty() && self.line_to_index.is_empty()
    }

    pub(crate) fn node_entry_mut(&mut self, id: &str) -> Result<&mut NodeEntry, String> {
        let index = self.node_index(id).ok_or_else(|| format!("Unknown node: {id}"))?;
        self.graph
            .node_weight_mut(index)
            .ok_or_else(|| format!("Node index out of date: {id}"))
    }

    pub(crate) fn line_entry_mut(&mut self, id: &str) -> Result<&mut EdgeEntry, String> {
        let index = self.line_index(id).ok_or_else(|| format!("Unknown line: {id}"))?;
        self.graph
            .edge_weight_mut(index)
            .ok_or_else(|| format!("Line index out of date: {id}"))
    }

    pub(crate) fn register_node(&mut self, id: String, index: NodeIndex) {
        self.node_to_index.insert(id, index);
    }

    pub(crate) fn unregister_node(&mut self, id: &str) -> Option<NodeIndex> {
        self.node_to_index.shift_remove(id)
    }

    pub(crate) fn register_line(&mut self, id: String, index: EdgeIndex) {
        self.line_to_index.insert(id, index);
    }

    pub(crate) fn unregister_line(&mut self, id: &str) -> Option<EdgeIndex> {
        self.line_to_index.shift_remove(id)
    }

    /// Node ids in insertion order
    pub fn node_keys(&self) -> impl Iterator<Item = &str> {
        self.node_to_index.keys().map(String::as_str)
    }

    /// Line ids in insertion order
    pub fn line_keys(&self) -> impl Iterator<Item = &str> {
        self.line_to_index.keys().map(String::as_str)
    }

    /// Deterministic projection of the current graph
    #[must_use]
    pub fn export(&self) -> SerializedGraph {
        let nodes = self
            .node_to_index
            .iter()
            .filter_map(|(id, &index)| {
                self.graph.node_weight(index).map(|entry| SerializedNode {
                    key: id.clone(),
                    attributes: entry.attributes.clone(),
                })
            })
            .collect();

        let edges = self
            .line_to_index
            .iter()
            .filter_map(|(id, &index)| {
                let (source, target) = self.graph.edge_endpoints(index)?;
                let entry = self.graph.edge_weight(index)?;
                Some(SerializedEdge {
                    key: id.clone(),
                    source: self.graph.node_weight(source)?.id.clone(),
                    target: self.graph.node_weight(target)?.id.clone(),
                    attributes: entry.attributes.clone(),
                })
            })
            .collect();

        SerializedGraph { nodes, edges }
    }

    /// Load `data` into the graph.
    ///
    /// The import is atomic: it is applied to a copy and only swapped in when
    /// every record was accepted.
    ///
    /// # Errors
    ///
    /// Returns an error if a key has the wrong prefix, a node type does not
    /// match its id namespace, or a line references a node that does not exist.
    pub fn import(&mut self, data: SerializedGraph, mode: ImportMode) -> Result<(), String> {
        let mut next = match mode {
            ImportMode::Replace => MetroGraph::new(),
            ImportMode::Merge => self.clone(),
        };

        for node in data.nodes {
            let mut attributes = node.attributes;
            attributes.normalize();
            if next.has_node(&node.key) {
                nodes::check_node_category(&node.key, &attributes)?;
                next.node_entry_mut(&node.key)?.attributes = attributes;
            } else {
                next.add_node(node.key, attributes)?;
            }
        }

        for edge in data.edges {
            let mut attributes = edge.attributes;
            attributes.normalize();
            if next.extremities(&edge.key) == Some((edge.source.clone(), edge.target.clone())) {
                next.line_entry_mut(&edge.key)?.attributes = attributes;
                continue;
            }
            if next.has_line(&edge.key) {
                next.drop_line(&edge.key)?;
            }
            next.add_line(edge.key, &edge.source, &edge.target, attributes)?;
        }

        *self = next;
        Ok(())
    }
}

impl Default for MetroGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl From<MetroGraph> for SerializedGraph {
    fn from(graph: MetroGraph) -> Self {
        graph.export()
    }
}

impl TryFrom<SerializedGraph> for MetroGraph {
    type Error = String;

    fn try_from(data: SerializedGraph) -> Result<Self, Self::Error> {
        let mut graph = MetroGraph::new();
        graph.import(data, ImportMode::Replace)?;
        Ok(graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LinePathType, LineStyleType, NodeType};
    use serde_json::json;

    fn sample_graph() -> MetroGraph {
        let mut graph = MetroGraph::new();
        graph
            .add_node("stn_a".to_string(), NodeAttributes::new(NodeType::ShmetroBasic, 0.0, 0.0))
            .expect("add a");
        graph
            .add_node("stn_b".to_string(), NodeAttributes::new(NodeType::GzmtrBasic, 100.0, 0.0))
            .expect("add b");
        graph
            .add_node("misc_node_v".to_string(), NodeAttributes::new(NodeType::Virtual, 100.0, 100.0))
            .expect("add v");
        graph
            .add_line(
                "line_ab".to_string(),
                "stn_a",
                "stn_b",
                EdgeAttributes::new(LinePathType::Diagonal, LineStyleType::SingleColor),
            )
            .expect("add ab");
        graph
            .add_line(
                "line_bv".to_string(),
                "stn_b",
                "misc_node_v",
                EdgeAttributes::new(LinePathType::Simple, LineStyleType::ShmetroVirtualInt),
            )
            .expect("add bv");
        graph
    }

    #[test]
    fn test_export_is_in_insertion_order() {
        let exported = sample_graph().export();
        let keys: Vec<_> = exported.nodes.iter().map(|n| n.key.as_str()).collect();
        assert_eq!(keys, vec!["stn_a", "stn_b", "misc_node_v"]);
        assert_eq!(exported.edges[0].source, "stn_a");
        assert_eq!(exported.edges[0].target, "stn_b");
    }

    #[test]
    fn test_export_import_round_trip() {
        let exported = sample_graph().export();
        let json = serde_json::to_value(&exported).expect("serializes");

        let parsed: SerializedGraph = serde_json::from_value(json.clone()).expect("parses");
        let mut graph = MetroGraph::new();
        graph.import(parsed, ImportMode::Replace).expect("imports");

        assert_eq!(graph.export(), exported);
        assert_eq!(serde_json::to_value(graph.export()).expect("serializes"), json);
    }

    #[test]
    fn test_graph_serde_goes_through_export_format() {
        let graph = sample_graph();
        let text = serde_json::to_string(&graph).expect("serializes");
        let back: MetroGraph = serde_json::from_str(&text).expect("parses");
        assert_eq!(back.export(), graph.export());
    }

    #[test]
    fn test_import_rejects_missing_extremity_atomically() {
        let mut graph = sample_graph();
        let before = graph.export();

        let data: SerializedGraph = serde_json::from_value(json!({
            "nodes": [
                { "key": "stn_c", "attributes": { "x": 0, "y": 0, "type": "mtr" } }
            ],
            "edges": [
                { "key": "line_cx", "source": "stn_c", "target": "stn_missing",
                  "attributes": { "type": "simple", "style": "single-color" } }
            ]
        }))
        .expect("parses");

        assert!(graph.import(data, ImportMode::Merge).is_err());
        assert_eq!(graph.export(), before);
    }

    #[test]
    fn test_merge_import_overwrites_and_adds() {
        let mut graph = sample_graph();
        let data: SerializedGraph = serde_json::from_value(json!({
            "nodes": [
                { "key": "stn_a", "attributes": { "x": 5, "y": 5, "zIndex": 50, "type": "shmetro-basic" } },
                { "key": "stn_c", "attributes": { "x": 0, "y": 0, "type": "mtr" } }
            ]
        }))
        .expect("parses");

        graph.import(data, ImportMode::Merge).expect("imports");
        assert_eq!(graph.node_count(), 4);
        let a = graph.node_attributes("stn_a").expect("a exists");
        assert_eq!(a.position(), (5.0, 5.0));
        assert_eq!(a.z_index, 10);
        assert!(a.payload().is_some());
        assert_eq!(graph.line_count(), 2);
    }

    #[test]
    fn test_replace_import_discards_current() {
        let mut graph = sample_graph();
        graph.import(SerializedGraph::default(), ImportMode::Replace).expect("imports");
        assert!(graph.is_empty());
    }
}
