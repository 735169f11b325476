//! Attribute-panel edits committed through the editor.
//!
//! Text fields are parsed with [`crate::models::validation`] before anything
//! is touched. An edit that leaves the attributes as they were records no
//! history entry.

use serde_json::Value;
use crate::logging::log_warn;
use crate::models::validation::{check_payload_colors, parse_coordinate, parse_z_index};
use crate::models::{LineChange, LinePathType, LineStyleType, Lines, MetroGraph, NodeType, Nodes};
use super::Editor;

impl Editor {
    /// Apply `edit` to a node and commit if its attributes changed
    fn edit_node<F>(&mut self, id: &str, edit: F) -> Result<bool, String>
    where
        F: FnOnce(&mut MetroGraph) -> Result<(), String>,
    {
        let before = self
            .graph
            .node_attributes(id)
            .cloned()
            .ok_or_else(|| format!("Unknown node: {id}"))?;
        edit(&mut self.graph).inspect_err(|e| {
            log_warn!("Edit of {} rejected: {}", id, e);
        })?;
        let changed = self.graph.node_attributes(id) != Some(&before);
        if changed {
            self.commit(true, false);
        }
        Ok(changed)
    }

    fn edit_line<F>(&mut self, id: &str, edit: F) -> Result<bool, String>
    where
        F: FnOnce(&mut MetroGraph) -> Result<(), String>,
    {
        let before = self
            .graph
            .line_attributes(id)
            .cloned()
            .ok_or_else(|| format!("Unknown line: {id}"))?;
        edit(&mut self.graph).inspect_err(|e| {
            log_warn!("Edit of {} rejected: {}", id, e);
        })?;
        let changed = self.graph.line_attributes(id) != Some(&before);
        if changed {
            self.commit(false, true);
        }
        Ok(changed)
    }

    /// Move a node to coordinates typed into the attribute panel
    ///
    /// # Errors
    ///
    /// Returns an error if the node is unknown or either field is not a number
    pub fn set_node_position_text(&mut self, id: &str, x: &str, y: &str) -> Result<bool, String> {
        let (x, y) = (parse_coordinate(x)?, parse_coordinate(y)?);
        self.edit_node(id, |graph| graph.set_node_position(id, x, y))
    }

    /// Set the z-index of a node or line from text, clamped to the allowed range
    ///
    /// # Errors
    ///
    /// Returns an error if the id is unknown or the text is not an integer
    pub fn set_z_index_text(&mut self, id: &str, text: &str) -> Result<bool, String> {
        let z_index = parse_z_index(text)?;
        if self.graph.has_node(id) {
            self.edit_node(id, |graph| graph.set_node_z_index(id, z_index))
        } else {
            self.edit_line(id, |graph| graph.set_line_z_index(id, z_index))
        }
    }

    /// # Errors
    ///
    /// Returns an error if the id is unknown
    pub fn set_visible(&mut self, id: &str, visible: bool) -> Result<bool, String> {
        if self.graph.has_node(id) {
            self.edit_node(id, |graph| graph.set_node_visible(id, visible))
        } else {
            self.edit_line(id, |graph| graph.set_line_visible(id, visible))
        }
    }

    /// Switch a node to another type of the same category; its payload is
    /// reset to the new type's default
    ///
    /// # Errors
    ///
    /// Returns an error if the node is unknown or the type belongs to the
    /// other category
    pub fn change_node_type(&mut self, id: &str, node_type: NodeType) -> Result<bool, String> {
        self.edit_node(id, |graph| graph.change_node_type(id, node_type))
    }

    /// # Errors
    ///
    /// Returns an error if the node is unknown or the payload holds a
    /// malformed colour
    pub fn set_node_payload(&mut self, id: &str, payload: Value) -> Result<bool, String> {
        check_payload_colors(&payload)?;
        self.edit_node(id, |graph| graph.set_node_payload(id, payload))
    }

    /// Put a line in a reconcile group; an empty id makes it standalone
    ///
    /// # Errors
    ///
    /// Returns an error if the line is unknown
    pub fn set_reconcile_id(&mut self, id: &str, reconcile_id: &str) -> Result<bool, String> {
        self.edit_line(id, |graph| graph.set_reconcile_id(id, reconcile_id))
    }

    /// Change a line's path type
    ///
    /// Without `force`, a type the current style does not support is left
    /// unapplied and [`LineChange::NeedsConfirmation`] is returned.
    ///
    /// # Errors
    ///
    /// Returns an error if the line is unknown
    pub fn set_line_path_type(&mut self, id: &str, path_type: LinePathType, force: bool) -> Result<LineChange, String> {
        let mut outcome = LineChange::NeedsConfirmation;
        self.edit_line(id, |graph| {
            outcome = graph.set_line_path_type(id, path_type, force)?;
            Ok(())
        })?;
        Ok(outcome)
    }

    /// Change a line's style, with the same confirmation rule as
    /// [`Editor::set_line_path_type`]
    ///
    /// # Errors
    ///
    /// Returns an error if the line is unknown
    pub fn set_line_style(&mut self, id: &str, style: LineStyleType, force: bool) -> Result<LineChange, String> {
        let mut outcome = LineChange::NeedsConfirmation;
        self.edit_line(id, |graph| {
            outcome = graph.set_line_style(id, style, force)?;
            Ok(())
        })?;
        Ok(outcome)
    }

    /// # Errors
    ///
    /// Returns an error if the line is unknown
    pub fn set_line_path_payload(&mut self, id: &str, payload: Value) -> Result<bool, String> {
        self.edit_line(id, |graph| graph.set_line_path_payload(id, payload))
    }

    /// # Errors
    ///
    /// Returns an error if the line is unknown or the payload holds a
    /// malformed colour
    pub fn set_line_style_payload(&mut self, id: &str, payload: Value) -> Result<bool, String> {
        check_payload_colors(&payload)?;
        self.edit_line(id, |graph| graph.set_line_style_payload(id, payload))
    }
}
