use indexmap::IndexSet;
use petgraph::stable_graph::EdgeIndex;
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde_json::Value;
use super::{EdgeEntry, MetroGraph};
use crate::logging::log;
use crate::models::id::is_line_id;
use crate::models::line::{EdgeAttributes, LineChange, LinePathType, LineStyleType};

/// Extension trait for line operations on `MetroGraph`
pub trait Lines {
    /// Insert a directed line from `source` to `target`
    ///
    /// # Errors
    ///
    /// Returns an error if `id` already exists, lacks the line prefix, or either
    /// extremity is missing.
    fn add_line(&mut self, id: String, source: &str, target: &str, attributes: EdgeAttributes) -> Result<EdgeIndex, String>;

    fn has_line(&self, id: &str) -> bool;

    fn line_attributes(&self, id: &str) -> Option<&EdgeAttributes>;

    /// (source id, target id)
    fn extremities(&self, id: &str) -> Option<(String, String)>;

    /// Shallow-merge a JSON object into the line's attributes
    ///
    /// # Errors
    ///
    /// Returns an error if the line is unknown, `patch` is not an object, or the
    /// merged attributes do not parse.
    fn merge_line_attributes(&mut self, id: &str, patch: &Value) -> Result<(), String>;

    /// # Errors
    ///
    /// Returns an error if the line is unknown.
    fn set_line_z_index(&mut self, id: &str, z_index: i32) -> Result<(), String>;

    /// # Errors
    ///
    /// Returns an error if the line is unknown.
    fn set_line_visible(&mut self, id: &str, visible: bool) -> Result<(), String>;

    /// # Errors
    ///
    /// Returns an error if the line is unknown.
    fn set_reconcile_id(&mut self, id: &str, reconcile_id: &str) -> Result<(), String>;

    /// # Errors
    ///
    /// Returns an error if the line is unknown.
    fn set_parallel_index(&mut self, id: &str, parallel_index: i32) -> Result<(), String>;

    /// # Errors
    ///
    /// Returns an error if the line is unknown.
    fn set_line_path_payload(&mut self, id: &str, payload: Value) -> Result<(), String>;

    /// # Errors
    ///
    /// Returns an error if the line is unknown.
    fn set_line_style_payload(&mut self, id: &str, payload: Value) -> Result<(), String>;

    /// Change the path type under the support matrix, see [`EdgeAttributes::change_path_type`]
    ///
    /// # Errors
    ///
    /// Returns an error if the line is unknown.
    fn set_line_path_type(&mut self, id: &str, path_type: LinePathType, force: bool) -> Result<LineChange, String>;

    /// Change the style under the support matrix, see [`EdgeAttributes::change_style`]
    ///
    /// # Errors
    ///
    /// Returns an error if the line is unknown.
    fn set_line_style(&mut self, id: &str, style: LineStyleType, force: bool) -> Result<LineChange, String>;

    /// # Errors
    ///
    /// Returns an error if the line is unknown.
    fn drop_line(&mut self, id: &str) -> Result<(), String>;

    /// Ids of the lines matching `predicate`, in insertion order
    fn filter_lines<F>(&self, predicate: F) -> Vec<String>
    where
        F: Fn(&str, &EdgeAttributes) -> bool;

    fn line_ids(&self) -> Vec<String>;

    /// Lines attached to a node, in either direction
    fn incident_lines(&self, node_id: &str) -> Vec<String>;

    /// Lines between two nodes, in either direction
    fn lines_between(&self, a: &str, b: &str) -> Vec<String>;

    /// Join the parallel bundle of a line and lay the bundle out again.
    ///
    /// The bundle is every line between the same two nodes with the same path
    /// type and a parallel index. The line gets the next free index, and every
    /// member's `offsetFrom`/`offsetTo` is rewritten so the lanes are centred
    /// on the straight route, `gap` apart.
    ///
    /// # Errors
    ///
    /// Returns an error if the line is unknown.
    fn make_parallel_index(&mut self, id: &str, gap: f64) -> Result<i32, String>;
}

impl Lines for MetroGraph {
    fn add_line(&mut self, id: String, source: &str, target: &str, mut attributes: EdgeAttributes) -> Result<EdgeIndex, String> {
        if !is_line_id(&id) {
            return Err(format!("Not a line id: {id}"));
        }
        if self.has_line(&id) {
            return Err(format!("Line already exists: {id}"));
        }
        let from = self.node_index(source).ok_or_else(|| format!("Unknown source node: {source}"))?;
        let to = self.node_index(target).ok_or_else(|| format!("Unknown target node: {target}"))?;
        attributes.normalize();

        let index = self.graph.add_edge(from, to, EdgeEntry { id: id.clone(), attributes });
        self.register_line(id, index);
        Ok(index)
    }

    fn has_line(&self, id: &str) -> bool {
        self.line_index(id).is_some()
    }

    fn line_attributes(&self, id: &str) -> Option<&EdgeAttributes> {
        self.line_index(id)
            .and_then(|index| self.graph.edge_weight(index))
            .map(|entry| &entry.attributes)
    }

    fn extremities(&self, id: &str) -> Option<(String, String)> {
        let (source, target) = self.graph.edge_endpoints(self.line_index(id)?)?;
        Some((
            self.graph.node_weight(source)?.id.clone(),
            self.graph.node_weight(target)?.id.clone(),
        ))
    }

    fn merge_line_attributes(&mut self, id: &str, patch: &Value) -> Result<(), String> {
        let Value::Object(fields) = patch else {
            return Err("Attribute patch must be an object".to_string());
        };
        let current = self
            .line_attributes(id)
            .ok_or_else(|| format!("Unknown line: {id}"))?;

        let mut merged = serde_json::to_value(current).map_err(|e| e.to_string())?;
        if let Value::Object(target) = &mut merged {
            for (key, value) in fields {
                target.insert(key.clone(), value.clone());
            }
        }
        let mut attributes: EdgeAttributes = serde_json::from_value(merged).map_err(|e| e.to_string())?;
        attributes.normalize();

        self.line_entry_mut(id)?.attributes = attributes;
        Ok(())
    }

    fn set_line_z_index(&mut self, id: &str, z_index: i32) -> Result<(), String> {
        self.line_entry_mut(id)?.attributes.set_z_index(z_index);
        Ok(())
    }

    fn set_line_visible(&mut self, id: &str, visible: bool) -> Result<(), String> {
        self.line_entry_mut(id)?.attributes.visible = visible;
        Ok(())
    }

    fn set_reconcile_id(&mut self, id: &str, reconcile_id: &str) -> Result<(), String> {
        self.line_entry_mut(id)?.attributes.reconcile_id = reconcile_id.to_string();
        Ok(())
    }

    fn set_parallel_index(&mut self, id: &str, parallel_index: i32) -> Result<(), String> {
        self.line_entry_mut(id)?.attributes.parallel_index = parallel_index.max(-1);
        Ok(())
    }

    fn set_line_path_payload(&mut self, id: &str, payload: Value) -> Result<(), String> {
        self.line_entry_mut(id)?.attributes.set_path_payload(payload);
        Ok(())
    }

    fn set_line_style_payload(&mut self, id: &str, payload: Value) -> Result<(), String> {
        self.line_entry_mut(id)?.attributes.set_style_payload(payload);
        Ok(())
    }

    fn set_line_path_type(&mut self, id: &str, path_type: LinePathType, force: bool) -> Result<LineChange, String> {
        Ok(self.line_entry_mut(id)?.attributes.change_path_type(path_type, force))
    }

    fn set_line_style(&mut self, id: &str, style: LineStyleType, force: bool) -> Result<LineChange, String> {
        Ok(self.line_entry_mut(id)?.attributes.change_style(style, force))
    }

    fn drop_line(&mut self, id: &str) -> Result<(), String> {
        let index = self.unregister_line(id).ok_or_else(|| format!("Unknown line: {id}"))?;
        self.graph.remove_edge(index);
        Ok(())
    }

    fn filter_lines<F>(&self, predicate: F) -> Vec<String>
    where
        F: Fn(&str, &EdgeAttributes) -> bool,
    {
        self.line_keys()
            .filter(|id| self.line_attributes(id).is_some_and(|attrs| predicate(id, attrs)))
            .map(str::to_string)
            .collect()
    }

    fn line_ids(&self) -> Vec<String> {
        self.line_keys().map(str::to_string).collect()
    }

    fn incident_lines(&self, node_id: &str) -> Vec<String> {
        let Some(index) = self.node_index(node_id) else {
            return Vec::new();
        };
        self.graph
            .edges_directed(index, Direction::Outgoing)
            .chain(self.graph.edges_directed(index, Direction::Incoming))
            .map(|edge| edge.weight().id.clone())
            .collect::<IndexSet<_>>()
            .into_iter()
            .collect()
    }

    fn lines_between(&self, a: &str, b: &str) -> Vec<String> {
        let (Some(a_index), Some(b_index)) = (self.node_index(a), self.node_index(b)) else {
            return Vec::new();
        };
        let mut lines: Vec<String> = self
            .graph
            .edges_directed(a_index, Direction::Outgoing)
            .filter(|edge| edge.target() == b_index)
            .map(|edge| edge.weight().id.clone())
            .collect();
        if a_index != b_index {
            lines.extend(
                self.graph
                    .edges_directed(b_index, Direction::Outgoing)
                    .filter(|edge| edge.target() == a_index)
                    .map(|edge| edge.weight().id.clone()),
            );
        }
        // stable order regardless of which direction was found first
        lines.sort_by_key(|id| self.line_index(id).map(EdgeIndex::index));
        lines
    }

    fn make_parallel_index(&mut self, id: &str, gap: f64) -> Result<i32, String> {
        let (source, target) = self.extremities(id).ok_or_else(|| format!("Unknown line: {id}"))?;
        let path_type = self
            .line_attributes(id)
            .map(|attrs| attrs.path_type.clone())
            .ok_or_else(|| format!("Unknown line: {id}"))?;

        let bundle: Vec<(String, i32)> = self
            .lines_between(&source, &target)
            .into_iter()
            .filter(|other| other != id)
            .filter_map(|other| {
                let attrs = self.line_attributes(&other)?;
                (attrs.path_type == path_type && attrs.parallel_index >= 0)
                    .then_some((other, attrs.parallel_index))
            })
            .collect();

        let next = bundle.iter().map(|(_, index)| index + 1).max().unwrap_or(0);
        self.set_parallel_index(id, next)?;

        let lanes = f64::from(next + 1);
        let canonical_source = if source <= target { &source } else { &target };
        let members = bundle
            .into_iter()
            .chain(std::iter::once((id.to_string(), next)));
        for (member, index) in members {
            let mut offset = (f64::from(index) - (lanes - 1.0) / 2.0) * gap;
            if self.extremities(&member).is_some_and(|(from, _)| &from != canonical_source) {
                offset = -offset;
            }
            self.line_entry_mut(&member)?.attributes.set_offsets(offset, offset);
        }

        log!("Line {} joined its parallel bundle at index {}", id, next);
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NodeAttributes, NodeType, Nodes};
    use serde_json::json;

    fn two_stations() -> MetroGraph {
        let mut graph = MetroGraph::new();
        graph
            .add_node("stn_a".to_string(), NodeAttributes::new(NodeType::ShmetroBasic, 0.0, 0.0))
            .expect("a");
        graph
            .add_node("stn_b".to_string(), NodeAttributes::new(NodeType::ShmetroBasic, 100.0, 0.0))
            .expect("b");
        graph
    }

    fn diagonal() -> EdgeAttributes {
        EdgeAttributes::new(LinePathType::Diagonal, LineStyleType::SingleColor)
    }

    #[test]
    fn test_add_line() {
        let mut graph = two_stations();
        graph.add_line("line_1".to_string(), "stn_a", "stn_b", diagonal()).expect("added");

        assert!(graph.has_line("line_1"));
        assert_eq!(graph.line_count(), 1);
        assert_eq!(graph.extremities("line_1"), Some(("stn_a".to_string(), "stn_b".to_string())));
    }

    #[test]
    fn test_add_line_validates_extremities_and_id() {
        let mut graph = two_stations();
        assert!(graph.add_line("line_1".to_string(), "stn_a", "stn_missing", diagonal()).is_err());
        assert!(graph.add_line("stn_c".to_string(), "stn_a", "stn_b", diagonal()).is_err());
        graph.add_line("line_1".to_string(), "stn_a", "stn_b", diagonal()).expect("added");
        assert!(graph.add_line("line_1".to_string(), "stn_b", "stn_a", diagonal()).is_err());
        assert_eq!(graph.line_count(), 1);
    }

    #[test]
    fn test_multigraph_lines_between() {
        let mut graph = two_stations();
        graph.add_line("line_1".to_string(), "stn_a", "stn_b", diagonal()).expect("1");
        graph.add_line("line_2".to_string(), "stn_b", "stn_a", diagonal()).expect("2");
        graph.add_line("line_3".to_string(), "stn_a", "stn_b", diagonal()).expect("3");

        assert_eq!(graph.lines_between("stn_a", "stn_b"), vec!["line_1", "line_2", "line_3"]);
        assert_eq!(graph.lines_between("stn_b", "stn_a"), vec!["line_1", "line_2", "line_3"]);
        assert_eq!(graph.incident_lines("stn_b").len(), 3);
    }

    #[test]
    fn test_set_line_style_needs_confirmation() {
        let mut graph = two_stations();
        graph.add_line("line_1".to_string(), "stn_a", "stn_b", diagonal()).expect("added");

        let outcome = graph
            .set_line_style("line_1", LineStyleType::GzmtrVirtualInt, false)
            .expect("known line");
        assert_eq!(outcome, LineChange::NeedsConfirmation);

        let outcome = graph
            .set_line_style("line_1", LineStyleType::GzmtrVirtualInt, true)
            .expect("known line");
        assert_eq!(outcome, LineChange::Reset);
        let attrs = graph.line_attributes("line_1").expect("exists");
        assert_eq!(attrs.path_type, LinePathType::Simple);
    }

    #[test]
    fn test_merge_line_attributes() {
        let mut graph = two_stations();
        graph.add_line("line_1".to_string(), "stn_a", "stn_b", diagonal()).expect("added");

        graph
            .merge_line_attributes("line_1", &json!({ "zIndex": -99, "reconcileId": "r1" }))
            .expect("merged");
        let attrs = graph.line_attributes("line_1").expect("exists");
        assert_eq!(attrs.z_index, -10);
        assert_eq!(attrs.reconcile_id, "r1");
        assert!(attrs.path_payload().is_some());
    }

    #[test]
    fn test_drop_line() {
        let mut graph = two_stations();
        graph.add_line("line_1".to_string(), "stn_a", "stn_b", diagonal()).expect("added");
        graph.drop_line("line_1").expect("dropped");

        assert!(!graph.has_line("line_1"));
        assert!(graph.has_node("stn_a"));
        assert!(graph.has_node("stn_b"));
        assert!(graph.drop_line("line_1").is_err());
    }

    #[test]
    fn test_make_parallel_index_centres_the_bundle() {
        let mut graph = two_stations();
        graph.add_line("line_1".to_string(), "stn_a", "stn_b", diagonal()).expect("1");
        graph.add_line("line_2".to_string(), "stn_b", "stn_a", diagonal()).expect("2");

        assert_eq!(graph.make_parallel_index("line_1", 5.0), Ok(0));
        let only = graph.line_attributes("line_1").expect("exists").path_attributes();
        assert_eq!(only.offset_from, 0.0);

        assert_eq!(graph.make_parallel_index("line_2", 5.0), Ok(1));
        let first = graph.line_attributes("line_1").expect("exists").path_attributes();
        let second = graph.line_attributes("line_2").expect("exists").path_attributes();
        assert_eq!(first.offset_from, -2.5);
        assert_eq!(first.offset_to, -2.5);
        // reversed direction flips the sign so both lanes stay on their own side
        assert_eq!(second.offset_from, -2.5);
        assert_eq!(graph.line_attributes("line_2").map(|a| a.parallel_index), Some(1));
    }

    #[test]
    fn test_make_parallel_index_ignores_other_path_types() {
        let mut graph = two_stations();
        graph.add_line("line_1".to_string(), "stn_a", "stn_b", diagonal()).expect("1");
        graph
            .add_line(
                "line_2".to_string(),
                "stn_a",
                "stn_b",
                EdgeAttributes::new(LinePathType::Perpendicular, LineStyleType::SingleColor),
            )
            .expect("2");

        assert_eq!(graph.make_parallel_index("line_1", 5.0), Ok(0));
        assert_eq!(graph.make_parallel_index("line_2", 5.0), Ok(0));
    }
}
