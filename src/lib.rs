#![allow(clippy::implicit_hasher)]
#![allow(unknown_lints)]

pub mod logging;
pub mod constants;
pub mod geometry;
pub mod registry;
pub mod models;
pub mod canvas;
pub mod editor;
pub mod storage;

pub use editor::Editor;
pub use models::MetroGraph;
