//! Point hit-testing and box selection in canvas coordinates.

use indexmap::IndexSet;
use petgraph::visit::{EdgeRef, IntoEdgeReferences};
use crate::constants::{LINE_HIT_THRESHOLD, NODE_HIT_RADIUS};
use crate::geometry::{distance, point_to_line_segment_distance, Rect};
use crate::models::{MetroGraph, Nodes};

fn closest_node(graph: &MetroGraph, x: f64, y: f64, skip: Option<&str>) -> Option<String> {
    let mut best: Option<(f64, i32, &str)> = None;

    for entry in graph.graph.node_indices().filter_map(|index| graph.graph.node_weight(index)) {
        let attrs = &entry.attributes;
        if !attrs.visible || skip == Some(entry.id.as_str()) {
            continue;
        }
        let dist = distance((x, y), attrs.position());
        if dist > NODE_HIT_RADIUS {
            continue;
        }
        // nearer wins; on a tie the node drawn on top wins
        let better = best.map_or(true, |(best_dist, best_z, _)| {
            dist < best_dist || (dist == best_dist && attrs.z_index > best_z)
        });
        if better {
            best = Some((dist, attrs.z_index, entry.id.as_str()));
        }
    }

    best.map(|(_, _, id)| id.to_string())
}

/// Node whose hit circle contains the canvas point, closest first
#[must_use]
pub fn find_node_at_position(graph: &MetroGraph, x: f64, y: f64) -> Option<String> {
    closest_node(graph, x, y, None)
}

/// Like [`find_node_at_position`], ignoring the node `skip`
#[must_use]
pub fn find_node_at_position_except(graph: &MetroGraph, x: f64, y: f64, skip: &str) -> Option<String> {
    closest_node(graph, x, y, Some(skip))
}

/// Line whose straight route between its extremities passes within the
/// click threshold of the canvas point
#[must_use]
pub fn find_line_at_position(graph: &MetroGraph, x: f64, y: f64) -> Option<String> {
    let mut best: Option<(f64, &str)> = None;

    for edge in graph.graph.edge_references() {
        let line = edge.weight();
        if !line.attributes.visible {
            continue;
        }
        let (Some(source), Some(target)) = (graph.graph.node_weight(edge.source()), graph.graph.node_weight(edge.target()))
        else {
            continue;
        };

        let dist = point_to_line_segment_distance(
            (x, y),
            source.attributes.position(),
            target.attributes.position(),
        );
        if dist <= LINE_HIT_THRESHOLD && best.map_or(true, |(best_dist, _)| dist < best_dist) {
            best = Some((dist, line.id.as_str()));
        }
    }

    best.map(|(_, id)| id.to_string())
}

/// Rubber-band selection
///
/// Visible nodes inside the rectangle spanned by the two corners are selected,
/// together with every line whose extremities were both selected this way.
/// With `additive` the previous selection is kept in front of the new ids.
#[must_use]
pub fn select_in_rect(
    graph: &MetroGraph,
    corner_a: (f64, f64),
    corner_b: (f64, f64),
    previous: &IndexSet<String>,
    additive: bool,
) -> IndexSet<String> {
    let rect = Rect::from_corners(corner_a, corner_b);

    let boxed: IndexSet<String> = graph.filter_nodes(|_, attrs| attrs.visible && rect.contains(attrs.x, attrs.y))
        .into_iter()
        .collect();

    let lines = graph.graph.edge_references().filter_map(|edge| {
        let source = graph.graph.node_weight(edge.source())?;
        let target = graph.graph.node_weight(edge.target())?;
        (boxed.contains(&source.id) && boxed.contains(&target.id)).then(|| edge.weight().id.clone())
    });

    let mut selection = if additive { previous.clone() } else { IndexSet::new() };
    selection.extend(boxed.iter().cloned());
    selection.extend(lines);
    selection
}
