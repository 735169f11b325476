pub mod file;

pub use file::{create_export_filename, deserialize_graph, serialize_graph};

#[cfg(target_arch = "wasm32")]
pub use file::trigger_download;
