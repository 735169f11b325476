//! Copy, cut and paste of graph fragments.
//!
//! The clipboard carries the export shape (nodes and edges with attributes)
//! tagged with an application marker, so text from elsewhere is rejected
//! instead of half-inserted.

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use crate::constants::DUPLICATE_OFFSET;
use crate::geometry::Rect;
use crate::logging::{log, log_warn};
use crate::models::id::{generate_line_id, generate_node_id, generate_reconcile_id, node_category_of};
use crate::models::{ImportMode, MetroGraph, NodeCategory, SerializedEdge, SerializedGraph, SerializedNode};
use super::Editor;

/// Marker identifying clipboard text written by this editor
pub const CLIPBOARD_APP_TAG: &str = "metro-canvas";

/// Serialized subset of the graph as written to the system clipboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipboardPayload {
    pub app: String,
    #[serde(default)]
    pub nodes: Vec<SerializedNode>,
    #[serde(default)]
    pub edges: Vec<SerializedEdge>,
}

impl ClipboardPayload {
    /// Selected nodes plus every line whose extremities are both selected
    #[must_use]
    pub fn from_selection(graph: &MetroGraph, selection: &IndexSet<String>) -> Self {
        let exported = graph.export();
        let nodes: Vec<SerializedNode> = exported
            .nodes
            .into_iter()
            .filter(|node| selection.contains(&node.key))
            .collect();
        let edges = exported
            .edges
            .into_iter()
            .filter(|edge| selection.contains(&edge.source) && selection.contains(&edge.target))
            .collect();

        Self { app: CLIPBOARD_APP_TAG.to_string(), nodes, edges }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// # Errors
    ///
    /// Returns an error if the payload cannot be serialized
    pub fn to_json(&self) -> Result<String, String> {
        serde_json::to_string(self).map_err(|e| format!("Failed to serialize clipboard payload: {e}"))
    }

    /// Parse clipboard text
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not JSON of this shape or was not
    /// written by this editor
    pub fn parse(text: &str) -> Result<Self, String> {
        let payload: Self = serde_json::from_str(text)
            .map_err(|e| format!("Clipboard does not hold a graph fragment: {e}"))?;
        if payload.app != CLIPBOARD_APP_TAG {
            return Err(format!("Clipboard fragment comes from '{}'", payload.app));
        }
        Ok(payload)
    }

    /// Copy of the fragment with fresh ids, moved so its bounding-box centre
    /// lands on `center`
    ///
    /// Lines whose extremities are not part of the fragment are dropped.
    /// Non-empty reconcile ids are renamed consistently, so a copied chain
    /// forms its own group. The second value lists the new ids, nodes first.
    #[must_use]
    pub fn remap(&self, center: (f64, f64)) -> (SerializedGraph, Vec<String>) {
        let bounds = Rect::bounding(self.nodes.iter().map(|node| node.attributes.position()));
        let (dx, dy) = bounds.map_or((0.0, 0.0), |rect| {
            let (cx, cy) = rect.center();
            (center.0 - cx, center.1 - cy)
        });

        let mut id_map: IndexMap<&str, String> = IndexMap::new();
        let mut nodes = Vec::with_capacity(self.nodes.len());
        for node in &self.nodes {
            let category = node_category_of(&node.key)
                .or_else(|| node.attributes.node_type.category())
                .unwrap_or(NodeCategory::Station);
            let key = generate_node_id(category);
            let mut attributes = node.attributes.clone();
            attributes.set_position(attributes.x + dx, attributes.y + dy);
            id_map.insert(node.key.as_str(), key.clone());
            nodes.push(SerializedNode { key, attributes });
        }

        let mut groups: IndexMap<&str, String> = IndexMap::new();
        let mut edges = Vec::with_capacity(self.edges.len());
        for edge in &self.edges {
            let (Some(source), Some(target)) =
                (id_map.get(edge.source.as_str()), id_map.get(edge.target.as_str()))
            else {
                continue;
            };
            let mut attributes = edge.attributes.clone();
            if !attributes.reconcile_id.is_empty() {
                attributes.reconcile_id = groups
                    .entry(edge.attributes.reconcile_id.as_str())
                    .or_insert_with(generate_reconcile_id)
                    .clone();
            }
            edges.push(SerializedEdge {
                key: generate_line_id(),
                source: source.clone(),
                target: target.clone(),
                attributes,
            });
        }

        let ids = nodes
            .iter()
            .map(|node| node.key.clone())
            .chain(edges.iter().map(|edge| edge.key.clone()))
            .collect();
        (SerializedGraph { nodes, edges }, ids)
    }
}

impl Editor {
    /// Clipboard text for the current selection, `None` if no node is selected
    #[must_use]
    pub fn copy_selection(&self) -> Option<String> {
        let payload = ClipboardPayload::from_selection(&self.graph, &self.selection);
        if payload.is_empty() {
            return None;
        }
        match payload.to_json() {
            Ok(text) => Some(text),
            Err(e) => {
                log_warn!("Copy failed: {}", e);
                None
            }
        }
    }

    /// Like [`Editor::copy_selection`], then deletes the selection
    pub fn cut_selection(&mut self) -> Option<String> {
        let text = self.copy_selection()?;
        self.delete_selection();
        Some(text)
    }

    /// Insert clipboard text at the viewport centre and select it
    ///
    /// Returns `false`, leaving the graph untouched, if the text is not a
    /// fragment written by this editor.
    pub fn paste(&mut self, text: &str) -> bool {
        let payload = match ClipboardPayload::parse(text) {
            Ok(payload) => payload,
            Err(e) => {
                log_warn!("Paste ignored: {}", e);
                return false;
            }
        };
        if payload.is_empty() {
            return false;
        }

        let (fragment, ids) = payload.remap(self.viewport.center());
        let has_edges = !fragment.edges.is_empty();
        if let Err(e) = self.graph.import(fragment, ImportMode::Merge) {
            log_warn!("Paste ignored: {}", e);
            return false;
        }

        log!("Pasted {} entities", ids.len());
        self.selection = ids.into_iter().collect();
        self.commit(true, has_edges);
        true
    }

    /// Copy the selected nodes, and the lines between them, 50 units right and down
    pub fn duplicate_selection(&mut self) -> bool {
        let payload = ClipboardPayload::from_selection(&self.graph, &self.selection);
        let Some(bounds) = Rect::bounding(payload.nodes.iter().map(|node| node.attributes.position())) else {
            return false;
        };
        let (cx, cy) = bounds.center();
        let (fragment, ids) = payload.remap((cx + DUPLICATE_OFFSET, cy + DUPLICATE_OFFSET));
        let has_edges = !fragment.edges.is_empty();
        if let Err(e) = self.graph.import(fragment, ImportMode::Merge) {
            log_warn!("Duplicate failed: {}", e);
            return false;
        }
        self.selection = ids.into_iter().collect();
        self.commit(true, has_edges);
        true
    }
}

/// Async access to `navigator.clipboard`
#[cfg(target_arch = "wasm32")]
pub mod browser {
    use wasm_bindgen_futures::JsFuture;

    fn clipboard() -> Result<web_sys::Clipboard, String> {
        let window = web_sys::window().ok_or("No window")?;
        Ok(window.navigator().clipboard())
    }

    /// # Errors
    ///
    /// Returns an error if the browser refuses the write
    pub async fn write_text(text: &str) -> Result<(), String> {
        JsFuture::from(clipboard()?.write_text(text))
            .await
            .map_err(|_| "Clipboard write was rejected".to_string())?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error if the browser refuses the read or returns no text
    pub async fn read_text() -> Result<String, String> {
        let value = JsFuture::from(clipboard()?.read_text())
            .await
            .map_err(|_| "Clipboard read was rejected".to_string())?;
        value.as_string().ok_or_else(|| "Clipboard did not return text".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::reconcile::reconcile;
    use crate::models::{EdgeAttributes, LinePathType, LineStyleType, Lines, NodeAttributes, NodeType, Nodes, UserSettings};

    fn editor_with_pair() -> Editor {
        let mut graph = MetroGraph::new();
        graph
            .add_node("stn_a".to_string(), NodeAttributes::new(NodeType::ShmetroBasic, 0.0, 0.0))
            .expect("a");
        graph
            .add_node("stn_b".to_string(), NodeAttributes::new(NodeType::ShmetroBasic, 100.0, 0.0))
            .expect("b");
        graph
            .add_node("misc_node_t".to_string(), NodeAttributes::new(NodeType::Text, 50.0, 50.0))
            .expect("t");
        graph
            .add_line(
                "line_ab".to_string(),
                "stn_a",
                "stn_b",
                EdgeAttributes::new(LinePathType::Diagonal, LineStyleType::SingleColor),
            )
            .expect("ab");
        Editor::with_graph(graph, UserSettings::default())
    }

    #[test]
    fn test_copy_contains_inner_lines_only() {
        let mut editor = editor_with_pair();
        editor.select_ids(["stn_a", "misc_node_t"]);
        let payload = ClipboardPayload::parse(&editor.copy_selection().expect("copied")).expect("parses");
        assert_eq!(payload.nodes.len(), 2);
        assert!(payload.edges.is_empty());

        editor.select_ids(["stn_a", "stn_b"]);
        let payload = ClipboardPayload::parse(&editor.copy_selection().expect("copied")).expect("parses");
        assert_eq!(payload.edges.len(), 1);
    }

    #[test]
    fn test_paste_remaps_ids_and_centres_on_viewport() {
        let mut editor = editor_with_pair();
        editor.select_ids(["stn_a", "stn_b"]);
        let text = editor.copy_selection().expect("copied");

        assert!(editor.paste(&text));
        assert_eq!(editor.graph().node_count(), 5);
        assert_eq!(editor.graph().line_count(), 2);

        let pasted: Vec<&String> = editor.selection().iter().collect();
        assert_eq!(pasted.len(), 3);
        assert!(pasted.iter().all(|id| !["stn_a", "stn_b", "line_ab"].contains(&id.as_str())));
        assert!(pasted[0].starts_with("stn_") && pasted[2].starts_with("line_"));

        // default viewport centre is (640, 360); the pair spans 0..100 on y = 0
        let position = editor.graph().get_node_position(pasted[0]).expect("pasted node");
        assert_eq!(position, (590.0, 360.0));
        assert!(editor.can_undo());
    }

    #[test]
    fn test_pasted_chain_reconciles_on_its_own() {
        let mut graph = MetroGraph::new();
        for (id, x) in [("stn_a", 0.0), ("stn_b", 100.0), ("stn_c", 200.0)] {
            graph
                .add_node(id.to_string(), NodeAttributes::new(NodeType::ShmetroBasic, x, 0.0))
                .expect("added");
        }
        let mut attrs = EdgeAttributes::new(LinePathType::Simple, LineStyleType::SingleColor);
        attrs.reconcile_id = "r1".to_string();
        graph.add_line("line_1".to_string(), "stn_a", "stn_b", attrs.clone()).expect("1");
        graph.add_line("line_2".to_string(), "stn_b", "stn_c", attrs).expect("2");

        let mut editor = Editor::with_graph(graph, UserSettings::default());
        editor.select_all();
        let text = editor.copy_selection().expect("copied");
        assert!(editor.paste(&text));

        let result = reconcile(editor.graph());
        assert_eq!(result.chains.len(), 2);
        assert!(result.dangling.is_empty());
        assert!(result.chains.contains(&vec!["line_1".to_string(), "line_2".to_string()]));

        let copies: Vec<&String> = editor.selection().iter().filter(|id| id.starts_with("line_")).collect();
        let copied_group = editor.graph().line_attributes(copies[0]).expect("copy").reconcile_id.clone();
        assert_ne!(copied_group, "r1");
        assert!(!copied_group.is_empty());
        assert_eq!(editor.graph().line_attributes(copies[1]).expect("copy").reconcile_id, copied_group);
    }

    #[test]
    fn test_paste_drops_lines_with_missing_extremities() {
        let mut editor = editor_with_pair();
        let pair: IndexSet<String> = ["stn_a", "stn_b"].into_iter().map(String::from).collect();
        let mut payload = ClipboardPayload::from_selection(editor.graph(), &pair);
        payload.nodes.retain(|node| node.key == "stn_a");
        let text = payload.to_json().expect("serializes");

        assert!(editor.paste(&text));
        assert_eq!(editor.graph().line_count(), 1);
        assert_eq!(editor.selection().len(), 1);
    }

    #[test]
    fn test_malformed_paste_is_a_no_op() {
        let mut editor = editor_with_pair();
        let before = editor.graph().export();

        assert!(!editor.paste("not json at all"));
        assert!(!editor.paste(r#"{"app":"someone-else","nodes":[]}"#));
        assert!(!editor.paste(r#"{"app":"metro-canvas","nodes":[{"key":"stn_x"}]}"#));

        assert_eq!(editor.graph().export(), before);
        assert!(!editor.can_undo());
    }

    #[test]
    fn test_cut_removes_selection() {
        let mut editor = editor_with_pair();
        editor.select_ids(["stn_a"]);
        let text = editor.cut_selection().expect("cut");
        assert!(!editor.graph().has_node("stn_a"));
        assert!(!editor.graph().has_line("line_ab"));
        assert!(editor.selection().is_empty());
        assert!(editor.paste(&text));
        assert_eq!(editor.graph().node_count(), 3);
    }

    #[test]
    fn test_duplicate_offsets_by_fifty() {
        let mut editor = editor_with_pair();
        editor.select_ids(["stn_a", "stn_b"]);
        assert!(editor.duplicate_selection());

        let copies: Vec<String> = editor.selection().iter().cloned().collect();
        assert_eq!(copies.len(), 3);
        assert_eq!(editor.graph().get_node_position(&copies[0]), Some((50.0, 50.0)));
        assert_eq!(editor.graph().get_node_position(&copies[1]), Some((150.0, 50.0)));
        assert_eq!(
            editor.graph().extremities(&copies[2]),
            Some((copies[0].clone(), copies[1].clone()))
        );
    }
}
