/// Lowest z-index a node or line may carry
pub const Z_INDEX_MIN: i32 = -10;

/// Highest z-index a node or line may carry
pub const Z_INDEX_MAX: i32 = 10;

/// Id prefix for station nodes
pub const STATION_ID_PREFIX: &str = "stn_";

/// Id prefix for misc (non-station) nodes
pub const MISC_NODE_ID_PREFIX: &str = "misc_node_";

/// Id prefix for lines (edges)
pub const LINE_ID_PREFIX: &str = "line_";

/// Grid used when snapping dragged or placed nodes
pub const DEFAULT_GRID_SIZE: f64 = 5.0;

/// Grid used while the fine-snap modifier is held
pub const FINE_GRID_SIZE: f64 = 1.0;

/// Canvas offset applied to duplicated nodes, on both axes
pub const DUPLICATE_OFFSET: f64 = 50.0;

/// Canvas units a nudge shortcut moves the selection
pub const DEFAULT_NUDGE_STEP: f64 = 10.0;

/// Screen units an arrow key pans the viewport
pub const DEFAULT_PAN_STEP: f64 = 50.0;

/// Distance between neighbouring lanes of a parallel bundle
pub const DEFAULT_PARALLEL_LINE_GAP: f64 = 5.0;

/// Radius of the reserved hit circle around every node
pub const NODE_HIT_RADIUS: f64 = 8.0;

/// Maximum distance from a line for it to count as clicked
pub const LINE_HIT_THRESHOLD: f64 = 4.0;

/// Stroke used for unknown styles and dangling reconcile groups
pub const FALLBACK_STROKE_COLOR: &str = "#999999";

/// Zoom bounds in percent
pub const MIN_ZOOM: f64 = 10.0;
pub const MAX_ZOOM: f64 = 2500.0;

/// Snapshots kept by the undo history
pub const DEFAULT_UNDO_LEVELS: usize = 50;

/// Browser storage key for persisted user settings
pub const USER_SETTINGS_STORAGE_KEY: &str = "metro_canvas_user_settings";
