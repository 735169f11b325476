//! Interaction state machine.
//!
//! [`Editor`] owns the graph store together with everything a pointer or
//! keyboard event can touch: selection, active tool, viewport, settings and
//! history. Every committed mutation records one history entry and bumps the
//! matching refresh counter.

mod attributes;
pub mod clipboard;
mod keyboard;
mod mode;
mod pointer;

use indexmap::{IndexMap, IndexSet};
use crate::canvas::renderer::{RefreshState, RenderCache, RenderModel};
use crate::logging::{log, log_warn};
use crate::models::{
    ImportMode, Lines, MetroGraph, Nodes, SerializedGraph, UndoManager, UndoSnapshot, UserSettings, ViewportState,
};

pub use clipboard::ClipboardPayload;
pub use keyboard::KeyOutcome;
pub use mode::Mode;
pub use pointer::{Modifiers, PointerEvent};

/// Transient state of the gesture in progress
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Interaction {
    #[default]
    Idle,
    /// Rubber band between two canvas points
    RubberBand { start: (f64, f64), current: (f64, f64) },
    /// Selected nodes being dragged; `delta` is the snapped canvas offset so far
    Drag {
        start: (f64, f64),
        origins: IndexMap<String, (f64, f64)>,
        delta: (f64, f64),
    },
    /// Viewport pan, `last` is the previous screen point
    Pan { last: (f64, f64) },
    /// Line being drawn from `anchor` to a canvas point
    LinePreview { anchor: String, end: (f64, f64) },
}

pub struct Editor {
    graph: MetroGraph,
    selection: IndexSet<String>,
    mode: Mode,
    viewport: ViewportState,
    settings: UserSettings,
    history: UndoManager,
    refresh: RefreshState,
    interaction: Interaction,
    has_focus: bool,
    render_cache: RenderCache,
}

impl Editor {
    #[must_use]
    pub fn new(settings: UserSettings) -> Self {
        Self::with_graph(MetroGraph::new(), settings)
    }

    /// Editor over an existing graph; the graph becomes the oldest history entry
    #[must_use]
    pub fn with_graph(graph: MetroGraph, settings: UserSettings) -> Self {
        let mut history = UndoManager::new(settings.undo_levels);
        history.reset(UndoSnapshot::new(graph.clone(), IndexSet::new()));
        Self {
            graph,
            selection: IndexSet::new(),
            mode: Mode::Free,
            viewport: ViewportState::default(),
            settings,
            history,
            refresh: RefreshState::default(),
            interaction: Interaction::Idle,
            has_focus: false,
            render_cache: RenderCache::new(),
        }
    }

    #[must_use]
    pub fn graph(&self) -> &MetroGraph {
        &self.graph
    }

    #[must_use]
    pub fn selection(&self) -> &IndexSet<String> {
        &self.selection
    }

    #[must_use]
    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    /// Switch tools, abandoning any gesture in progress
    pub fn set_mode(&mut self, mode: Mode) {
        self.interaction = Interaction::Idle;
        self.mode = mode;
    }

    #[must_use]
    pub fn viewport(&self) -> &ViewportState {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut ViewportState {
        &mut self.viewport
    }

    #[must_use]
    pub fn settings(&self) -> &UserSettings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: UserSettings) {
        self.history.set_max_levels(settings.undo_levels);
        self.settings = settings;
    }

    #[must_use]
    pub fn refresh(&self) -> RefreshState {
        self.refresh
    }

    #[must_use]
    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    #[must_use]
    pub fn has_focus(&self) -> bool {
        self.has_focus
    }

    pub fn set_focus(&mut self, has_focus: bool) {
        self.has_focus = has_focus;
    }

    /// Render model of the committed graph, rebuilt only after a mutation
    pub fn render_model(&mut self) -> &RenderModel {
        self.render_cache.get(&self.graph, self.refresh)
    }

    /// Where a node should be drawn right now, including an uncommitted drag
    #[must_use]
    pub fn display_position(&self, id: &str) -> Option<(f64, f64)> {
        if let Interaction::Drag { origins, delta, .. } = &self.interaction {
            if let Some((x, y)) = origins.get(id) {
                return Some((x + delta.0, y + delta.1));
            }
        }
        self.graph.get_node_position(id)
    }

    /// Replace the selection with the given ids
    pub fn select_ids<I, S>(&mut self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selection = ids.into_iter().map(Into::into).collect();
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Select every node, then every line
    pub fn select_all(&mut self) {
        self.selection = self
            .graph
            .node_keys()
            .chain(self.graph.line_keys())
            .map(str::to_string)
            .collect();
    }

    /// Delete the selected nodes (with their lines) and the selected lines
    ///
    /// Returns the ids that were removed.
    pub fn delete_selection(&mut self) -> Vec<String> {
        let mut removed = Vec::new();
        let mut nodes_changed = false;
        let mut edges_changed = false;

        for id in std::mem::take(&mut self.selection) {
            if self.graph.has_node(&id) {
                if let Ok(dropped_lines) = self.graph.drop_node(&id) {
                    edges_changed |= !dropped_lines.is_empty();
                    removed.extend(dropped_lines);
                    removed.push(id);
                    nodes_changed = true;
                }
            } else if self.graph.drop_line(&id).is_ok() {
                edges_changed = true;
                removed.push(id);
            }
        }

        if !removed.is_empty() {
            log!("Deleted {} entities", removed.len());
            self.commit(nodes_changed, edges_changed);
        }
        removed
    }

    /// Move every selected node by a canvas offset as one mutation
    pub fn nudge_selection(&mut self, dx: f64, dy: f64) -> bool {
        let targets: Vec<(String, (f64, f64))> = self
            .selection
            .iter()
            .filter_map(|id| Some((id.clone(), self.graph.get_node_position(id)?)))
            .collect();
        if targets.is_empty() {
            return false;
        }
        for (id, (x, y)) in targets {
            if let Err(e) = self.graph.set_node_position(&id, x + dx, y + dy) {
                log_warn!("Nudge skipped {}: {}", id, e);
            }
        }
        self.commit(true, false);
        true
    }

    /// Load exported data, replacing or merging into the current graph
    ///
    /// # Errors
    ///
    /// Returns the import error; the graph is unchanged in that case
    pub fn load(&mut self, data: SerializedGraph, mode: ImportMode) -> Result<(), String> {
        if let Err(e) = self.graph.import(data, mode) {
            log_warn!("Import failed: {}", e);
            return Err(e);
        }
        let graph = &self.graph;
        self.selection.retain(|id| graph.has_node(id) || graph.has_line(id));
        self.interaction = Interaction::Idle;
        self.commit(true, true);
        Ok(())
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn undo(&mut self) -> bool {
        let current = self.snapshot();
        match self.history.undo(current) {
            Some(previous) => {
                log!("Undo");
                self.restore(previous);
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        match self.history.redo() {
            Some(next) => {
                log!("Redo");
                self.restore(next);
                true
            }
            None => false,
        }
    }

    fn snapshot(&self) -> UndoSnapshot {
        UndoSnapshot::new(self.graph.clone(), self.selection.clone())
    }

    fn restore(&mut self, snapshot: UndoSnapshot) {
        self.graph = snapshot.graph;
        self.selection = snapshot.selection;
        self.interaction = Interaction::Idle;
        self.refresh.bump_all();
    }

    /// Record a committed mutation in history and raise the refresh signals
    fn commit(&mut self, nodes_changed: bool, edges_changed: bool) {
        self.history.push_snapshot(self.snapshot());
        if nodes_changed {
            self.refresh.bump_nodes();
        }
        if edges_changed {
            self.refresh.bump_edges();
        }
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(UserSettings::default())
    }
}
