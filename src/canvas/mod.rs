pub mod hit_detection;
pub mod parallel;
pub mod paths;
pub mod reconcile;
pub mod renderer;
