use serde_json::Value;
use crate::constants::FALLBACK_STROKE_COLOR;
use crate::models::{LineStyleType, Lines, MetroGraph, NodeType, Nodes};
use crate::registry;
use super::parallel::make_short_path_parallel;
use super::paths::generate_straight_path;
use super::reconcile::{reconcile, stitch_paths};

/// Per-category change counters, bumped after every committed mutation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshState {
    pub nodes: u64,
    pub edges: u64,
}

impl RefreshState {
    pub fn bump_nodes(&mut self) {
        self.nodes = self.nodes.wrapping_add(1);
    }

    pub fn bump_edges(&mut self) {
        self.edges = self.edges.wrapping_add(1);
    }

    pub fn bump_all(&mut self) {
        self.bump_nodes();
        self.bump_edges();
    }
}

/// A node as the view layer draws it
#[derive(Debug, Clone, PartialEq)]
pub struct RenderNode {
    pub id: String,
    pub node_type: NodeType,
    pub x: f64,
    pub y: f64,
    pub z_index: i32,
    pub payload: Value,
}

/// How a line is stroked
#[derive(Debug, Clone, PartialEq)]
pub enum RenderStroke {
    /// Drawn by the style's own renderer
    Styled { style: LineStyleType, payload: Value },
    /// Plain neutral stroke: unknown styles and dangling reconcile groups
    Fallback { color: &'static str },
}

/// One drawn path: a single line or a whole reconciled chain
#[derive(Debug, Clone, PartialEq)]
pub struct RenderLine {
    /// Member line ids; more than one for a reconciled chain
    pub ids: Vec<String>,
    pub path: String,
    pub stroke: RenderStroke,
    pub z_index: i32,
}

/// Everything the view layer needs for one frame, in paint order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderModel {
    pub nodes: Vec<RenderNode>,
    pub lines: Vec<RenderLine>,
}

/// Path of a single line from its extremities and path payload
///
/// Lines in a parallel bundle (`parallel_index >= 0`) of a parallel-aware type
/// with a non-zero offset go through the offset resolver; everything else uses
/// the registered generator.
#[must_use]
pub fn line_path(graph: &MetroGraph, id: &str) -> Option<String> {
    let attrs = graph.line_attributes(id)?;
    let (source, target) = graph.extremities(id)?;
    let (x1, y1) = graph.get_node_position(&source)?;
    let (x2, y2) = graph.get_node_position(&target)?;

    let path_attrs = attrs.path_attributes();
    let bundle = registry::path_bundle(&attrs.path_type);
    let banded = attrs.parallel_index >= 0
        && bundle.parallel_aware
        && (path_attrs.offset_from != 0.0 || path_attrs.offset_to != 0.0);
    let path = if banded {
        make_short_path_parallel(&attrs.path_type, x1, y1, x2, y2, &path_attrs)
    } else {
        (bundle.generator)(x1, y1, x2, y2, &path_attrs)
    };
    Some(path)
}

fn stroke_for(style: &LineStyleType, payload: Option<&Value>) -> RenderStroke {
    if registry::style_bundle(style).is_fallback {
        RenderStroke::Fallback { color: FALLBACK_STROKE_COLOR }
    } else {
        RenderStroke::Styled {
            style: style.clone(),
            payload: payload.cloned().unwrap_or(Value::Null),
        }
    }
}

fn straight_connector(graph: &MetroGraph, id: &str) -> Option<String> {
    let (source, target) = graph.extremities(id)?;
    let (x1, y1) = graph.get_node_position(&source)?;
    let (x2, y2) = graph.get_node_position(&target)?;
    Some(generate_straight_path(x1, y1, x2, y2, &Default::default()))
}

/// Project the graph into paint-ordered nodes and lines
#[must_use]
pub fn build_render_model(graph: &MetroGraph) -> RenderModel {
    let mut nodes: Vec<RenderNode> = graph
        .node_keys()
        .filter_map(|id| {
            let attrs = graph.node_attributes(id)?;
            attrs.visible.then(|| RenderNode {
                id: id.to_string(),
                node_type: attrs.node_type.clone(),
                x: attrs.x,
                y: attrs.y,
                z_index: attrs.z_index,
                payload: attrs.payload().cloned().unwrap_or(Value::Null),
            })
        })
        .collect();
    nodes.sort_by_key(|node| node.z_index);

    let reconciliation = reconcile(graph);
    let mut lines = Vec::new();

    for id in &reconciliation.standalone {
        let Some(attrs) = graph.line_attributes(id).filter(|attrs| attrs.visible) else { continue };
        let Some(path) = line_path(graph, id) else { continue };
        lines.push(RenderLine {
            ids: vec![id.clone()],
            path,
            stroke: stroke_for(&attrs.style, attrs.style_payload()),
            z_index: attrs.z_index,
        });
    }

    for chain in &reconciliation.chains {
        let Some(head) = chain.first().and_then(|id| graph.line_attributes(id)) else { continue };
        if !head.visible {
            continue;
        }
        let paths: Option<Vec<String>> = chain.iter().map(|id| line_path(graph, id)).collect();
        let Some(paths) = paths else { continue };
        lines.push(RenderLine {
            ids: chain.clone(),
            path: stitch_paths(&paths),
            stroke: stroke_for(&head.style, head.style_payload()),
            z_index: head.z_index,
        });
    }

    for id in &reconciliation.dangling {
        let Some(attrs) = graph.line_attributes(id).filter(|attrs| attrs.visible) else { continue };
        let Some(path) = straight_connector(graph, id) else { continue };
        lines.push(RenderLine {
            ids: vec![id.clone()],
            path,
            stroke: RenderStroke::Fallback { color: FALLBACK_STROKE_COLOR },
            z_index: attrs.z_index,
        });
    }

    lines.sort_by_key(|line| line.z_index);
    RenderModel { nodes, lines }
}

/// Render model that is rebuilt only when a refresh counter moved
#[derive(Debug, Default)]
pub struct RenderCache {
    key: Option<RefreshState>,
    model: RenderModel,
    rebuilds: u64,
}

impl RenderCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current model, rebuilt in one pass over the graph if `refresh` changed
    pub fn get(&mut self, graph: &MetroGraph, refresh: RefreshState) -> &RenderModel {
        if self.key != Some(refresh) {
            self.model = build_render_model(graph);
            self.key = Some(refresh);
            self.rebuilds += 1;
        }
        &self.model
    }

    /// How many times the model was rebuilt
    #[must_use]
    pub fn rebuilds(&self) -> u64 {
        self.rebuilds
    }
}
