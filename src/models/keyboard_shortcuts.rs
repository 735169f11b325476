use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A key chord as reported by `KeyboardEvent.code` plus its modifier state
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct KeyboardShortcut {
    /// Physical key, e.g. `"KeyI"` or `"ArrowUp"`
    pub code: String,
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
    /// Cmd on macOS
    pub meta: bool,
}

impl KeyboardShortcut {
    #[must_use]
    #[allow(clippy::fn_params_excessive_bools)]
    pub fn new(code: String, ctrl: bool, shift: bool, alt: bool, meta: bool) -> Self {
        Self { code, ctrl, shift, alt, meta }
    }

    /// Bare key without modifiers
    #[must_use]
    pub fn key_only(code: &str) -> Self {
        Self::new(code.to_owned(), false, false, false, false)
    }

    #[must_use]
    pub fn ctrl(code: &str) -> Self {
        Self { ctrl: true, ..Self::key_only(code) }
    }

    #[must_use]
    pub fn meta(code: &str) -> Self {
        Self { meta: true, ..Self::key_only(code) }
    }

    /// Human readable label, using the macOS glyphs when `is_mac` is set
    #[must_use]
    pub fn format(&self, is_mac: bool) -> String {
        // Modifier order follows the platform convention: Cmd first on macOS
        let held = [
            (self.meta, "⌘", "Meta"),
            (self.ctrl, "⌃", "Ctrl"),
            (self.alt, "⌥", "Alt"),
            (self.shift, "⇧", "Shift"),
        ];
        let mut label: Vec<&str> = held
            .iter()
            .filter(|(on, _, _)| *on)
            .map(|&(_, mac, other)| if is_mac { mac } else { other })
            .collect();

        let key = key_label(&self.code);
        label.push(key);
        label.join(if is_mac { "" } else { "+" })
    }
}

fn key_label(code: &str) -> &str {
    match code {
        "Delete" => "Del",
        "Backspace" => "⌫",
        "Escape" => "Esc",
        "ArrowUp" => "↑",
        "ArrowDown" => "↓",
        "ArrowLeft" => "←",
        "ArrowRight" => "→",
        _ => code
            .strip_prefix("Key")
            .or_else(|| code.strip_prefix("Digit"))
            .unwrap_or(code),
    }
}

/// Grouping used when listing shortcuts in a settings panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShortcutCategory {
    Navigation,
    Editing,
    History,
}

impl ShortcutCategory {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Navigation => "Navigation",
            Self::Editing => "Editing",
            Self::History => "History",
        }
    }
}

/// Whether macOS is the host, which swaps Ctrl for Cmd in the defaults
#[cfg(target_arch = "wasm32")]
#[must_use]
pub fn is_mac_platform() -> bool {
    web_sys::window()
        .and_then(|window| window.navigator().platform().ok())
        .is_some_and(|platform| ["Mac", "iPhone", "iPad"].iter().any(|p| platform.contains(p)))
}

#[cfg(not(target_arch = "wasm32"))]
#[must_use]
pub fn is_mac_platform() -> bool {
    false
}

/// How a default binding is built from its key code
#[derive(Clone, Copy)]
enum Binding {
    Bare,
    /// Ctrl, or Cmd on macOS
    Command,
}

use Binding::{Bare, Command};
use ShortcutCategory::{Editing, History, Navigation};

struct ActionDef {
    id: &'static str,
    description: &'static str,
    category: ShortcutCategory,
    code: &'static str,
    binding: Binding,
}

const fn action(
    id: &'static str,
    description: &'static str,
    category: ShortcutCategory,
    code: &'static str,
    binding: Binding,
) -> ActionDef {
    ActionDef { id, description, category, code, binding }
}

const ACTIONS: &[ActionDef] = &[
    action("pan_up", "Pan Up", Navigation, "ArrowUp", Bare),
    action("pan_down", "Pan Down", Navigation, "ArrowDown", Bare),
    action("pan_left", "Pan Left", Navigation, "ArrowLeft", Bare),
    action("pan_right", "Pan Right", Navigation, "ArrowRight", Bare),
    action("delete", "Delete Selection", Editing, "Delete", Bare),
    action("delete_backspace", "Delete Selection", Editing, "Backspace", Bare),
    action("nudge_up", "Nudge Up", Editing, "KeyI", Bare),
    action("nudge_left", "Nudge Left", Editing, "KeyJ", Bare),
    action("nudge_down", "Nudge Down", Editing, "KeyK", Bare),
    action("nudge_right", "Nudge Right", Editing, "KeyL", Bare),
    action("copy", "Copy", Editing, "KeyC", Command),
    action("cut", "Cut", Editing, "KeyX", Command),
    action("paste", "Paste", Editing, "KeyV", Command),
    action("duplicate", "Duplicate", Editing, "KeyD", Command),
    action("select_all", "Select All", Editing, "KeyA", Command),
    action("cancel", "Cancel", Editing, "Escape", Bare),
    action("undo", "Undo", History, "KeyZ", Command),
    action("redo", "Redo", History, "KeyY", Command),
];

impl ActionDef {
    fn default_binding(&self, mac: bool) -> KeyboardShortcut {
        match self.binding {
            Bare => KeyboardShortcut::key_only(self.code),
            Command if mac => KeyboardShortcut::meta(self.code),
            Command => KeyboardShortcut::ctrl(self.code),
        }
    }
}

/// Description and category of a shortcut action
#[derive(Debug, Clone)]
pub struct ShortcutMetadata {
    pub description: &'static str,
    pub category: ShortcutCategory,
}

/// Serialized form of [`KeyboardShortcuts`], without the lookup index
#[derive(Deserialize)]
pub struct StoredShortcuts {
    pub shortcuts: HashMap<String, Option<KeyboardShortcut>>,
}

/// Action id to key chord bindings. A `None` binding leaves the action
/// reachable only through [`crate::Editor::run_action`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "StoredShortcuts")]
pub struct KeyboardShortcuts {
    pub shortcuts: HashMap<String, Option<KeyboardShortcut>>,
    /// Reverse lookup from chord to action id
    #[serde(skip)]
    index: HashMap<KeyboardShortcut, String>,
}

impl From<StoredShortcuts> for KeyboardShortcuts {
    fn from(stored: StoredShortcuts) -> Self {
        Self::from_bindings(stored.shortcuts)
    }
}

impl KeyboardShortcuts {
    fn from_bindings(shortcuts: HashMap<String, Option<KeyboardShortcut>>) -> Self {
        let mut bindings = Self { shortcuts, index: HashMap::new() };
        bindings.reindex();
        bindings
    }

    /// Bindings for every known action on the current platform
    #[must_use]
    pub fn default_shortcuts() -> Self {
        let mac = is_mac_platform();
        Self::from_bindings(
            ACTIONS
                .iter()
                .map(|entry| (entry.id.to_owned(), Some(entry.default_binding(mac))))
                .collect(),
        )
    }

    fn reindex(&mut self) {
        self.index = self
            .shortcuts
            .iter()
            .filter_map(|(id, chord)| chord.clone().map(|chord| (chord, id.clone())))
            .collect();
    }

    #[must_use]
    pub fn get_all_metadata() -> HashMap<String, ShortcutMetadata> {
        ACTIONS
            .iter()
            .map(|entry| {
                let meta = ShortcutMetadata { description: entry.description, category: entry.category };
                (entry.id.to_owned(), meta)
            })
            .collect()
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&KeyboardShortcut> {
        self.shortcuts.get(id)?.as_ref()
    }

    /// Rebind (or with `None`, unbind) an action
    pub fn set(&mut self, id: &str, shortcut: Option<KeyboardShortcut>) {
        self.shortcuts.insert(id.to_owned(), shortcut);
        self.reindex();
    }

    /// Action bound to this exact chord, if any
    #[must_use]
    #[allow(clippy::fn_params_excessive_bools)]
    pub fn find_action(&self, code: &str, ctrl: bool, shift: bool, alt: bool, meta: bool) -> Option<&str> {
        let chord = KeyboardShortcut::new(code.to_owned(), ctrl, shift, alt, meta);
        self.index.get(&chord).map(String::as_str)
    }

    /// Actions other than `exclude_id` already bound to `shortcut`
    #[must_use]
    pub fn check_conflicts(&self, shortcut: &KeyboardShortcut, exclude_id: Option<&str>) -> Vec<String> {
        self.index
            .get(shortcut)
            .filter(|owner| Some(owner.as_str()) != exclude_id)
            .cloned()
            .into_iter()
            .collect()
    }

    /// Add default bindings for actions missing from stored settings.
    /// Explicit unbindings (`None`) are kept.
    pub fn merge_with_defaults(&mut self) {
        let before = self.shortcuts.len();
        for (id, chord) in Self::default_shortcuts().shortcuts {
            self.shortcuts.entry(id).or_insert(chord);
        }
        if self.shortcuts.len() != before {
            self.reindex();
        }
    }
}

impl Default for KeyboardShortcuts {
    fn default() -> Self {
        Self::default_shortcuts()
    }
}
