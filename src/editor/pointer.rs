use indexmap::IndexMap;
use crate::canvas::hit_detection::{find_line_at_position, find_node_at_position, find_node_at_position_except, select_in_rect};
use crate::geometry::snap_to_grid;
use crate::logging::{log, log_warn};
use crate::models::id::{generate_line_id, generate_node_id};
use crate::models::{EdgeAttributes, LinePathType, LineStyleType, Lines, NodeAttributes, NodeCategory, NodeType, Nodes};
use super::{Editor, Interaction, Mode};

bitflags::bitflags! {
    /// Modifier keys held during a pointer or key event
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0001;
        const CTRL  = 0b0010;
        const ALT   = 0b0100;
        const META  = 0b1000;
    }
}

/// Pointer position in screen coordinates plus held modifiers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub x: f64,
    pub y: f64,
    pub modifiers: Modifiers,
}

impl PointerEvent {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y, modifiers: Modifiers::empty() }
    }

    #[must_use]
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

impl Editor {
    fn canvas_point(&self, event: &PointerEvent) -> (f64, f64) {
        self.viewport.screen_to_canvas(event.x, event.y)
    }

    fn snap(&self, value: f64, modifiers: Modifiers) -> f64 {
        snap_to_grid(value, self.settings.snap_grid(modifiers.contains(Modifiers::ALT)))
    }

    /// Leave a tool after one use unless the user asked to keep it
    fn finish_tool(&mut self) {
        self.interaction = Interaction::Idle;
        if !self.settings.keep_last_tool {
            self.mode = Mode::Free;
        }
    }

    pub fn pointer_down(&mut self, event: PointerEvent) {
        self.has_focus = true;
        let point = self.canvas_point(&event);

        match self.mode.clone() {
            Mode::Select => {
                let on_entity = find_node_at_position(&self.graph, point.0, point.1).is_some()
                    || find_line_at_position(&self.graph, point.0, point.1).is_some();
                if on_entity {
                    self.free_pointer_down(&event, point);
                } else {
                    self.interaction = Interaction::RubberBand { start: point, current: point };
                }
            }
            Mode::Free => self.free_pointer_down(&event, point),
            Mode::Station(node_type) => self.place_node(node_type, NodeCategory::Station, point, event.modifiers),
            Mode::MiscNode(node_type) => self.place_node(node_type, NodeCategory::MiscNode, point, event.modifiers),
            Mode::Line(_) => {
                if let Some(anchor) = find_node_at_position(&self.graph, point.0, point.1) {
                    self.interaction = Interaction::LinePreview { anchor, end: point };
                }
            }
        }
    }

    fn free_pointer_down(&mut self, event: &PointerEvent, point: (f64, f64)) {
        let additive = event.modifiers.contains(Modifiers::SHIFT);

        if let Some(node) = find_node_at_position(&self.graph, point.0, point.1) {
            if additive {
                if self.selection.shift_remove(&node) {
                    return;
                }
                self.selection.insert(node);
            } else if !self.selection.contains(&node) {
                self.selection.clear();
                self.selection.insert(node);
            }

            let origins: IndexMap<String, (f64, f64)> = self
                .selection
                .iter()
                .filter_map(|id| Some((id.clone(), self.graph.get_node_position(id)?)))
                .collect();
            self.interaction = Interaction::Drag { start: (event.x, event.y), origins, delta: (0.0, 0.0) };
            return;
        }

        if let Some(line) = find_line_at_position(&self.graph, point.0, point.1) {
            if !additive {
                self.selection.clear();
            }
            self.selection.insert(line);
            return;
        }

        if !additive {
            self.selection.clear();
        }
        self.interaction = Interaction::Pan { last: (event.x, event.y) };
    }

    fn place_node(&mut self, node_type: NodeType, category: NodeCategory, point: (f64, f64), modifiers: Modifiers) {
        let x = self.snap(point.0, modifiers);
        let y = self.snap(point.1, modifiers);
        let id = generate_node_id(category);

        match self.graph.add_node(id.clone(), NodeAttributes::new(node_type, x, y)) {
            Ok(_) => {
                self.selection.clear();
                self.selection.insert(id);
                self.commit(true, false);
            }
            Err(e) => {
                log_warn!("Placement failed: {}", e);
            }
        }
        self.finish_tool();
    }

    pub fn pointer_move(&mut self, event: PointerEvent) {
        let point = self.canvas_point(&event);

        let delta = match &self.interaction {
            Interaction::Drag { start, .. } => {
                let (dx, dy) = self.viewport.canvas_delta(event.x - start.0, event.y - start.1);
                Some((self.snap(dx, event.modifiers), self.snap(dy, event.modifiers)))
            }
            _ => None,
        };

        match &mut self.interaction {
            Interaction::Idle => {}
            Interaction::RubberBand { current, .. } => *current = point,
            Interaction::Drag { delta: preview, .. } => {
                if let Some(delta) = delta {
                    *preview = delta;
                }
            }
            Interaction::Pan { last } => {
                let (dx, dy) = (event.x - last.0, event.y - last.1);
                *last = (event.x, event.y);
                self.viewport.pan_by(dx, dy);
            }
            Interaction::LinePreview { end, .. } => *end = point,
        }
    }

    pub fn pointer_up(&mut self, event: PointerEvent) {
        let point = self.canvas_point(&event);

        match std::mem::take(&mut self.interaction) {
            Interaction::Idle | Interaction::Pan { .. } => {}
            Interaction::RubberBand { start, .. } => {
                let additive = event.modifiers.contains(Modifiers::SHIFT);
                self.selection = select_in_rect(&self.graph, start, point, &self.selection, additive);
                self.mode = Mode::Free;
            }
            Interaction::Drag { origins, delta, .. } => self.commit_drag(&origins, delta),
            Interaction::LinePreview { anchor, .. } => {
                if let Mode::Line(path_type) = self.mode.clone() {
                    self.commit_line(&anchor, path_type, point);
                }
                self.finish_tool();
            }
        }
    }

    fn commit_drag(&mut self, origins: &IndexMap<String, (f64, f64)>, delta: (f64, f64)) {
        if delta == (0.0, 0.0) {
            return;
        }
        for (id, (x, y)) in origins {
            if let Err(e) = self.graph.set_node_position(id, x + delta.0, y + delta.1) {
                log_warn!("Drag skipped {}: {}", id, e);
            }
        }
        self.commit(true, false);
    }

    fn commit_line(&mut self, anchor: &str, path_type: LinePathType, point: (f64, f64)) {
        let Some(target) = find_node_at_position_except(&self.graph, point.0, point.1, anchor) else {
            log!("Line gesture from {} ended without a target", anchor);
            return;
        };

        let id = generate_line_id();
        let attributes = EdgeAttributes::new(path_type, LineStyleType::SingleColor);
        if let Err(e) = self.graph.add_line(id.clone(), anchor, &target, attributes) {
            log_warn!("Line creation failed: {}", e);
            return;
        }
        if self.settings.auto_parallel {
            if let Err(e) = self.graph.make_parallel_index(&id, self.settings.parallel_line_gap) {
                log_warn!("Parallel index failed for {}: {}", id, e);
            }
        }

        self.selection.clear();
        self.selection.insert(id);
        self.commit(false, true);
    }

    /// Wheel zoom around the pointer
    pub fn wheel(&mut self, delta: f64, event: PointerEvent) {
        self.viewport.handle_wheel(delta, event.x, event.y);
    }

    /// Abandon previews and return to `free`
    pub fn cancel(&mut self) {
        self.interaction = Interaction::Idle;
        self.mode = Mode::Free;
    }
}
