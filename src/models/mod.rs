mod type_tag;

pub mod id;
mod keyboard_shortcuts;
mod line;
mod metro_graph;
mod node;
mod undo;
mod user_settings;
pub mod validation;
mod view;

pub use keyboard_shortcuts::{is_mac_platform, KeyboardShortcut, KeyboardShortcuts, ShortcutCategory, ShortcutMetadata};
pub use line::{EdgeAttributes, LineChange, LinePathType, LineStyleType, PathAttributes, StartFrom};
pub use metro_graph::lines::Lines;
pub use metro_graph::nodes::Nodes;
pub use metro_graph::{
    EdgeEntry, ImportMode, MetroGraph, NodeEntry, SerializedEdge, SerializedGraph, SerializedNode,
};
pub use node::{NodeAttributes, NodeCategory, NodeType};
pub use undo::{UndoManager, UndoSnapshot};
pub use user_settings::UserSettings;
pub use view::ViewportState;
