use indexmap::IndexSet;
use petgraph::stable_graph::NodeIndex;
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde_json::Value;
use super::{MetroGraph, NodeEntry};
use crate::models::id::node_category_of;
use crate::models::node::{NodeAttributes, NodeType};

/// The id prefix and the type tag must agree on the node's category.
/// Unknown type tags are accepted in either namespace.
pub(crate) fn check_node_category(id: &str, attributes: &NodeAttributes) -> Result<(), String> {
    let category = node_category_of(id).ok_or_else(|| format!("Not a node id: {id}"))?;
    match attributes.node_type.category() {
        Some(expected) if expected != category => Err(format!(
            "Node type {} does not belong in the namespace of {id}",
            attributes.node_type
        )),
        _ => Ok(()),
    }
}

/// Extension trait for node operations on `MetroGraph`
pub trait Nodes {
    /// Insert a node under `id`
    ///
    /// # Errors
    ///
    /// Returns an error if `id` already exists, has no station/misc-node prefix,
    /// or the node type belongs to the other namespace.
    fn add_node(&mut self, id: String, attributes: NodeAttributes) -> Result<NodeIndex, String>;

    fn has_node(&self, id: &str) -> bool;

    fn node_attributes(&self, id: &str) -> Option<&NodeAttributes>;

    fn get_node_position(&self, id: &str) -> Option<(f64, f64)>;

    /// Shallow-merge a JSON object into the node's attributes
    ///
    /// # Errors
    ///
    /// Returns an error if the node is unknown, `patch` is not an object, or the
    /// merged attributes are invalid.
    fn merge_node_attributes(&mut self, id: &str, patch: &Value) -> Result<(), String>;

    /// # Errors
    ///
    /// Returns an error if the node is unknown.
    fn set_node_position(&mut self, id: &str, x: f64, y: f64) -> Result<(), String>;

    /// Set the z-index, clamped to the allowed range
    ///
    /// # Errors
    ///
    /// Returns an error if the node is unknown.
    fn set_node_z_index(&mut self, id: &str, z_index: i32) -> Result<(), String>;

    /// # Errors
    ///
    /// Returns an error if the node is unknown.
    fn set_node_visible(&mut self, id: &str, visible: bool) -> Result<(), String>;

    /// Switch a node to another type of the same category, resetting its payload
    ///
    /// # Errors
    ///
    /// Returns an error if the node is unknown or `node_type` belongs to the
    /// other namespace.
    fn change_node_type(&mut self, id: &str, node_type: NodeType) -> Result<(), String>;

    /// # Errors
    ///
    /// Returns an error if the node is unknown.
    fn set_node_payload(&mut self, id: &str, payload: Value) -> Result<(), String>;

    /// Remove a node together with every line attached to it
    /// Returns the ids of the dropped lines
    ///
    /// # Errors
    ///
    /// Returns an error if the node is unknown.
    fn drop_node(&mut self, id: &str) -> Result<Vec<String>, String>;

    /// Ids of the nodes matching `predicate`, in insertion order
    fn filter_nodes<F>(&self, predicate: F) -> Vec<String>
    where
        F: Fn(&str, &NodeAttributes) -> bool;

    fn node_ids(&self) -> Vec<String>;
}

impl Nodes for MetroGraph {
    fn add_node(&mut self, id: String, mut attributes: NodeAttributes) -> Result<NodeIndex, String> {
        if self.has_node(&id) {
            return Err(format!("Node already exists: {id}"));
        }
        check_node_category(&id, &attributes)?;
        attributes.normalize();

        let index = self.graph.add_node(NodeEntry { id: id.clone(), attributes });
        self.register_node(id, index);
        Ok(index)
    }

    fn has_node(&self, id: &str) -> bool {
        self.node_index(id).is_some()
    }

    fn node_attributes(&self, id: &str) -> Option<&NodeAttributes> {
        self.node_index(id)
            .and_then(|index| self.graph.node_weight(index))
            .map(|entry| &entry.attributes)
    }

    fn get_node_position(&self, id: &str) -> Option<(f64, f64)> {
        self.node_attributes(id).map(NodeAttributes::position)
    }

    fn merge_node_attributes(&mut self, id: &str, patch: &Value) -> Result<(), String> {
        let Value::Object(fields) = patch else {
            return Err("Attribute patch must be an object".to_string());
        };
        let current = self
            .node_attributes(id)
            .ok_or_else(|| format!("Unknown node: {id}"))?;

        let mut merged = serde_json::to_value(current).map_err(|e| e.to_string())?;
        if let Value::Object(target) = &mut merged {
            for (key, value) in fields {
                target.insert(key.clone(), value.clone());
            }
        }
        let mut attributes: NodeAttributes = serde_json::from_value(merged).map_err(|e| e.to_string())?;
        attributes.normalize();
        check_node_category(id, &attributes)?;

        self.node_entry_mut(id)?.attributes = attributes;
        Ok(())
    }

    fn set_node_position(&mut self, id: &str, x: f64, y: f64) -> Result<(), String> {
        self.node_entry_mut(id)?.attributes.set_position(x, y);
        Ok(())
    }

    fn set_node_z_index(&mut self, id: &str, z_index: i32) -> Result<(), String> {
        self.node_entry_mut(id)?.attributes.set_z_index(z_index);
        Ok(())
    }

    fn set_node_visible(&mut self, id: &str, visible: bool) -> Result<(), String> {
        self.node_entry_mut(id)?.attributes.visible = visible;
        Ok(())
    }

    fn change_node_type(&mut self, id: &str, node_type: NodeType) -> Result<(), String> {
        let entry = self.node_entry_mut(id)?;
        if entry.attributes.node_type == node_type {
            return Ok(());
        }
        let mut attributes = entry.attributes.clone();
        attributes.change_type(node_type);
        check_node_category(id, &attributes)?;
        entry.attributes = attributes;
        Ok(())
    }

    fn set_node_payload(&mut self, id: &str, payload: Value) -> Result<(), String> {
        self.node_entry_mut(id)?.attributes.set_payload(payload);
        Ok(())
    }

    fn drop_node(&mut self, id: &str) -> Result<Vec<String>, String> {
        let index = self.node_index(id).ok_or_else(|| format!("Unknown node: {id}"))?;

        // self-loops show up in both directions
        let dropped: Vec<String> = self
            .graph
            .edges_directed(index, Direction::Outgoing)
            .chain(self.graph.edges_directed(index, Direction::Incoming))
            .map(|edge| edge.weight().id.clone())
            .collect::<IndexSet<_>>()
            .into_iter()
            .collect();
        for line in &dropped {
            self.unregister_line(line);
        }

        self.graph.remove_node(index);
        self.unregister_node(id);
        Ok(dropped)
    }

    fn filter_nodes<F>(&self, predicate: F) -> Vec<String>
    where
        F: Fn(&str, &NodeAttributes) -> bool,
    {
        self.node_keys()
            .filter(|id| self.node_attributes(id).is_some_and(|attrs| predicate(id, attrs)))
            .map(str::to_string)
            .collect()
    }

    fn node_ids(&self) -> Vec<String> {
        self.node_keys().map(str::to_string).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EdgeAttributes, LinePathType, LineStyleType, Lines};
    use serde_json::json;

    fn station(x: f64, y: f64) -> NodeAttributes {
        NodeAttributes::new(NodeType::ShmetroBasic, x, y)
    }

    #[test]
    fn test_add_node() {
        let mut graph = MetroGraph::new();
        graph.add_node("stn_a".to_string(), station(1.0, 2.0)).expect("added");

        assert!(graph.has_node("stn_a"));
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.get_node_position("stn_a"), Some((1.0, 2.0)));
    }

    #[test]
    fn test_add_node_rejects_duplicates_and_bad_ids() {
        let mut graph = MetroGraph::new();
        graph.add_node("stn_a".to_string(), station(0.0, 0.0)).expect("added");

        assert!(graph.add_node("stn_a".to_string(), station(0.0, 0.0)).is_err());
        assert!(graph.add_node("line_a".to_string(), station(0.0, 0.0)).is_err());
        // station type under a misc-node id
        assert!(graph.add_node("misc_node_a".to_string(), station(0.0, 0.0)).is_err());
        assert_eq!(graph.node_count(), 1);
    }

    #[test]
    fn test_unknown_type_accepted_in_either_namespace() {
        let mut graph = MetroGraph::new();
        let other = NodeAttributes::new(NodeType::Other("tokyo-metro-basic".to_string()), 0.0, 0.0);
        graph.add_node("stn_x".to_string(), other.clone()).expect("station namespace");
        graph.add_node("misc_node_x".to_string(), other).expect("misc namespace");
    }

    #[test]
    fn test_z_index_is_clamped() {
        let mut graph = MetroGraph::new();
        graph.add_node("stn_a".to_string(), station(0.0, 0.0)).expect("added");

        graph.set_node_z_index("stn_a", 15).expect("set");
        assert_eq!(graph.node_attributes("stn_a").map(|a| a.z_index), Some(10));
        graph.set_node_z_index("stn_a", -11).expect("set");
        assert_eq!(graph.node_attributes("stn_a").map(|a| a.z_index), Some(-10));
    }

    #[test]
    fn test_merge_node_attributes() {
        let mut graph = MetroGraph::new();
        graph.add_node("stn_a".to_string(), station(0.0, 0.0)).expect("added");

        graph
            .merge_node_attributes("stn_a", &json!({ "x": 40, "zIndex": 20, "visible": false }))
            .expect("merged");
        let attrs = graph.node_attributes("stn_a").expect("exists");
        assert_eq!(attrs.position(), (40.0, 0.0));
        assert_eq!(attrs.z_index, 10);
        assert!(!attrs.visible);
        assert_eq!(attrs.node_type, NodeType::ShmetroBasic);

        assert!(graph.merge_node_attributes("stn_a", &json!({ "type": "text" })).is_err());
        assert!(graph.merge_node_attributes("stn_a", &json!([1, 2])).is_err());
        assert!(graph.merge_node_attributes("stn_missing", &json!({})).is_err());
    }

    #[test]
    fn test_change_node_type_stays_in_category() {
        let mut graph = MetroGraph::new();
        graph.add_node("stn_a".to_string(), station(0.0, 0.0)).expect("added");

        graph.change_node_type("stn_a", NodeType::Mtr).expect("changed");
        assert_eq!(graph.node_attributes("stn_a").map(|a| a.node_type.clone()), Some(NodeType::Mtr));

        assert!(graph.change_node_type("stn_a", NodeType::Virtual).is_err());
        assert_eq!(graph.node_attributes("stn_a").map(|a| a.node_type.clone()), Some(NodeType::Mtr));
    }

    #[test]
    fn test_drop_node_removes_incident_lines() {
        let mut graph = MetroGraph::new();
        graph.add_node("stn_a".to_string(), station(0.0, 0.0)).expect("a");
        graph.add_node("stn_b".to_string(), station(100.0, 0.0)).expect("b");
        graph.add_node("stn_c".to_string(), station(200.0, 0.0)).expect("c");
        let attrs = EdgeAttributes::new(LinePathType::Simple, LineStyleType::SingleColor);
        graph.add_line("line_ab".to_string(), "stn_a", "stn_b", attrs.clone()).expect("ab");
        graph.add_line("line_ca".to_string(), "stn_c", "stn_a", attrs.clone()).expect("ca");
        graph.add_line("line_bc".to_string(), "stn_b", "stn_c", attrs).expect("bc");

        let mut dropped = graph.drop_node("stn_a").expect("dropped");
        dropped.sort();
        assert_eq!(dropped, vec!["line_ab".to_string(), "line_ca".to_string()]);
        assert!(!graph.has_node("stn_a"));
        assert_eq!(graph.line_ids(), vec!["line_bc".to_string()]);
        assert_eq!(graph.extremities("line_bc"), Some(("stn_b".to_string(), "stn_c".to_string())));
    }

    #[test]
    fn test_filter_nodes() {
        let mut graph = MetroGraph::new();
        graph.add_node("stn_a".to_string(), station(0.0, 0.0)).expect("a");
        graph.add_node("stn_b".to_string(), station(50.0, 0.0)).expect("b");
        graph
            .add_node("misc_node_c".to_string(), NodeAttributes::new(NodeType::Virtual, 80.0, 0.0))
            .expect("c");

        let right = graph.filter_nodes(|_, attrs| attrs.x > 10.0);
        assert_eq!(right, vec!["stn_b".to_string(), "misc_node_c".to_string()]);
        let stations = graph.filter_nodes(|id, _| id.starts_with("stn_"));
        assert_eq!(stations.len(), 2);
    }
}
