use crate::logging::log;
use super::{Editor, Modifiers};

/// What the caller has to do after a key press
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyOutcome {
    /// No shortcut matched, or the canvas does not have focus
    Ignored,
    Handled,
    /// Write this text to the system clipboard
    WriteClipboard(String),
    /// Read the system clipboard and hand the text to [`Editor::paste`]
    ReadClipboard,
}

impl Editor {
    /// Dispatch a key press through the configured shortcuts
    pub fn key_down(&mut self, code: &str, modifiers: Modifiers) -> KeyOutcome {
        if !self.has_focus {
            return KeyOutcome::Ignored;
        }
        let Some(action) = self
            .settings
            .keyboard_shortcuts
            .find_action(
                code,
                modifiers.contains(Modifiers::CTRL),
                modifiers.contains(Modifiers::SHIFT),
                modifiers.contains(Modifiers::ALT),
                modifiers.contains(Modifiers::META),
            )
            .map(str::to_string)
        else {
            return KeyOutcome::Ignored;
        };

        self.run_action(&action)
    }

    /// Run a shortcut action by id
    pub fn run_action(&mut self, action: &str) -> KeyOutcome {
        let pan = self.settings.pan_step;
        let nudge = self.settings.nudge_step;

        match action {
            "delete" | "delete_backspace" => {
                self.delete_selection();
            }
            "pan_up" => self.viewport.pan_by(0.0, pan),
            "pan_down" => self.viewport.pan_by(0.0, -pan),
            "pan_left" => self.viewport.pan_by(pan, 0.0),
            "pan_right" => self.viewport.pan_by(-pan, 0.0),
            "nudge_up" => {
                self.nudge_selection(0.0, -nudge);
            }
            "nudge_down" => {
                self.nudge_selection(0.0, nudge);
            }
            "nudge_left" => {
                self.nudge_selection(-nudge, 0.0);
            }
            "nudge_right" => {
                self.nudge_selection(nudge, 0.0);
            }
            "copy" => return self.copy_selection().map_or(KeyOutcome::Handled, KeyOutcome::WriteClipboard),
            "cut" => return self.cut_selection().map_or(KeyOutcome::Handled, KeyOutcome::WriteClipboard),
            "paste" => return KeyOutcome::ReadClipboard,
            "duplicate" => {
                self.duplicate_selection();
            }
            "select_all" => self.select_all(),
            "undo" => {
                self.undo();
            }
            "redo" => {
                self.redo();
            }
            "cancel" => self.cancel(),
            _ => {
                log!("No handler for shortcut action {}", action);
                return KeyOutcome::Ignored;
            }
        }
        KeyOutcome::Handled
    }
}
