use crate::logging::log_warn;
use crate::models::{MetroGraph, SerializedGraph};

/// Serialize the graph to the JSON export format
///
/// # Errors
/// Returns an error if JSON serialization fails
pub fn serialize_graph(graph: &MetroGraph) -> Result<String, String> {
    serde_json::to_string_pretty(&graph.export()).map_err(|e| format!("Failed to serialize graph: {e}"))
}

/// Parse exported JSON back into a graph
///
/// # Errors
/// Returns an error if the text is not valid export JSON or a record is
/// rejected by the graph store (bad id prefix, missing line extremity)
pub fn deserialize_graph(json: &str) -> Result<MetroGraph, String> {
    let data: SerializedGraph = serde_json::from_str(json)
        .map_err(|e| format!("Failed to parse graph: {e}"))
        .inspect_err(|e| {
            log_warn!("{}", e);
        })?;

    MetroGraph::try_from(data).inspect_err(|e| {
        log_warn!("Rejected graph import: {}", e);
    })
}

/// Create a download filename for an export
#[must_use]
pub fn create_export_filename(project_name: &str) -> String {
    let now = chrono::Utc::now();
    format!(
        "{}.{}.json",
        project_name.replace(['/', '\\', ':', '*', '?', '"', '<', '>', '|'], "_"),
        now.format("%Y-%m-%d-%H%M%S")
    )
}

/// Trigger a browser download of the export text
///
/// # Errors
/// Returns an error if blob creation, URL generation, or DOM manipulation fails
#[cfg(target_arch = "wasm32")]
pub fn trigger_download(json: &str, filename: &str) -> Result<(), String> {
    use wasm_bindgen::JsCast;

    let parts = js_sys::Array::new();
    parts.push(&wasm_bindgen::JsValue::from_str(json));

    let blob_options = web_sys::BlobPropertyBag::new();
    blob_options.set_type("application/json");

    let blob = web_sys::Blob::new_with_str_sequence_and_options(&parts, &blob_options)
        .map_err(|_| "Failed to create blob")?;

    let window = web_sys::window().ok_or("No window available")?;
    let url = web_sys::Url::create_object_url_with_blob(&blob)
        .map_err(|_| "Failed to create object URL")?;

    let document = window.document().ok_or("No document available")?;
    let anchor = document
        .create_element("a")
        .map_err(|_| "Failed to create anchor element")?
        .dyn_into::<web_sys::HtmlAnchorElement>()
        .map_err(|_| "Failed to cast to anchor element")?;

    anchor.set_href(&url);
    anchor.set_download(filename);
    anchor.click();

    let _ = web_sys::Url::revoke_object_url(&url);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EdgeAttributes, LinePathType, LineStyleType, Lines, NodeAttributes, NodeType, Nodes};

    fn sample() -> MetroGraph {
        let mut graph = MetroGraph::new();
        graph
            .add_node("stn_a".to_string(), NodeAttributes::new(NodeType::BerlinSBahn, 0.0, 0.0))
            .expect("a");
        graph
            .add_node("misc_node_badge".to_string(), NodeAttributes::new(NodeType::BerlinSBahnLineBadge, 20.0, -20.0))
            .expect("badge");
        graph
            .add_node("stn_b".to_string(), NodeAttributes::new(NodeType::BerlinSBahn, 80.0, 40.0))
            .expect("b");
        graph
            .add_line(
                "line_ab".to_string(),
                "stn_a",
                "stn_b",
                EdgeAttributes::new(LinePathType::RotatePerpendicular, LineStyleType::River),
            )
            .expect("ab");
        graph
    }

    #[test]
    fn test_serialize_deserialize_round_trip() {
        let graph = sample();
        let json = serialize_graph(&graph).expect("Failed to serialize");
        let restored = deserialize_graph(&json).expect("Failed to deserialize");

        assert_eq!(restored.export(), graph.export());
        let keys: Vec<&str> = restored.node_keys().collect();
        assert_eq!(keys, vec!["stn_a", "misc_node_badge", "stn_b"]);
    }

    #[test]
    fn test_deserialize_invalid_json() {
        let result = deserialize_graph("{ nodes: ");
        assert!(result.expect_err("Expected error").contains("Failed to parse graph"));
    }

    #[test]
    fn test_deserialize_rejects_dangling_edge() {
        let json = r#"{
            "nodes": [{ "key": "stn_a", "attributes": { "x": 0, "y": 0, "type": "mtr" } }],
            "edges": [{ "key": "line_x", "source": "stn_a", "target": "stn_gone",
                        "attributes": { "type": "simple", "style": "single-color" } }]
        }"#;
        assert!(deserialize_graph(json).is_err());
    }

    #[test]
    fn test_unknown_types_survive_round_trip() {
        let json = r#"{
            "nodes": [
                { "key": "stn_a", "attributes": { "x": 0, "y": 0, "type": "future-station", "future-station": { "k": 1 } } },
                { "key": "stn_b", "attributes": { "x": 9, "y": 0, "type": "mtr" } }
            ],
            "edges": [{ "key": "line_x", "source": "stn_a", "target": "stn_b",
                        "attributes": { "type": "zigzag", "style": "neon" } }]
        }"#;
        let graph = deserialize_graph(json).expect("unknown tags load");
        let attrs = graph.node_attributes("stn_a").expect("node kept");
        assert_eq!(attrs.node_type, NodeType::Other("future-station".to_string()));
        assert_eq!(attrs.payload(), Some(&serde_json::json!({ "k": 1 })));

        let again = deserialize_graph(&serialize_graph(&graph).expect("serializes")).expect("reloads");
        assert_eq!(again.export(), graph.export());
    }

    #[test]
    fn test_create_export_filename() {
        let filename = create_export_filename("Shanghai 2025");
        assert!(filename.starts_with("Shanghai 2025."));
        assert!(filename.ends_with(".json"));
        // name + "." + YYYY-MM-DD-HHMMSS + ".json"
        assert_eq!(filename.len(), "Shanghai 2025".len() + 1 + 17 + 5);
    }

    #[test]
    fn test_create_export_filename_sanitizes_invalid_chars() {
        let filename = create_export_filename("Lines/East\\West:Draft?");
        assert!(filename.starts_with("Lines_East_West_Draft_."));
        assert!(!filename.contains('/'));
        assert!(!filename.contains('\\'));
        assert!(!filename.contains(':'));
        assert!(!filename.contains('?'));
    }
}
