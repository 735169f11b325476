use serde::{Deserialize, Serialize};
use crate::constants::{MAX_ZOOM, MIN_ZOOM};

/// Visible window onto the canvas
///
/// `min_x`/`min_y` is the canvas point at the top-left screen corner, `zoom` is
/// a percentage (100 = one canvas unit per screen pixel), `width`/`height` are
/// the screen size of the drawing surface.
#[derive(Clone, Serialize, Deserialize, PartialEq, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ViewportState {
    #[serde(default)]
    pub min_x: f64,
    #[serde(default)]
    pub min_y: f64,
    #[serde(default = "default_zoom")]
    pub zoom: f64,
    #[serde(default = "default_width")]
    pub width: f64,
    #[serde(default = "default_height")]
    pub height: f64,
}

fn default_zoom() -> f64 {
    100.0
}

fn default_width() -> f64 {
    1280.0
}

fn default_height() -> f64 {
    720.0
}

impl Default for ViewportState {
    fn default() -> Self {
        Self {
            min_x: 0.0,
            min_y: 0.0,
            zoom: default_zoom(),
            width: default_width(),
            height: default_height(),
        }
    }
}

impl ViewportState {
    fn scale(&self) -> f64 {
        self.zoom / 100.0
    }

    /// Canvas point under a screen point
    #[must_use]
    pub fn screen_to_canvas(&self, screen_x: f64, screen_y: f64) -> (f64, f64) {
        let scale = self.scale();
        (self.min_x + screen_x / scale, self.min_y + screen_y / scale)
    }

    /// Screen point of a canvas point
    #[must_use]
    pub fn canvas_to_screen(&self, x: f64, y: f64) -> (f64, f64) {
        let scale = self.scale();
        ((x - self.min_x) * scale, (y - self.min_y) * scale)
    }

    /// Canvas-space length of a screen-space movement
    #[must_use]
    pub fn canvas_delta(&self, screen_dx: f64, screen_dy: f64) -> (f64, f64) {
        let scale = self.scale();
        (screen_dx / scale, screen_dy / scale)
    }

    /// Canvas point at the middle of the screen
    #[must_use]
    pub fn center(&self) -> (f64, f64) {
        self.screen_to_canvas(self.width / 2.0, self.height / 2.0)
    }

    /// Move the view by a screen-space distance; content follows the pointer
    pub fn pan_by(&mut self, screen_dx: f64, screen_dy: f64) {
        let (dx, dy) = self.canvas_delta(screen_dx, screen_dy);
        self.min_x -= dx;
        self.min_y -= dy;
    }

    /// Zoom by `factor` keeping the canvas point under the cursor fixed
    pub fn zoom_at(&mut self, factor: f64, screen_x: f64, screen_y: f64) {
        let (anchor_x, anchor_y) = self.screen_to_canvas(screen_x, screen_y);
        self.zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        let scale = self.scale();
        self.min_x = anchor_x - screen_x / scale;
        self.min_y = anchor_y - screen_y / scale;
    }

    /// Mouse-wheel zoom: 10% per notch, in for negative deltas
    pub fn handle_wheel(&mut self, delta: f64, screen_x: f64, screen_y: f64) {
        let factor = if delta < 0.0 { 1.1 } else { 0.9 };
        self.zoom_at(factor, screen_x, screen_y);
    }

    /// Put `(x, y)` at the middle of the screen
    pub fn center_on(&mut self, x: f64, y: f64) {
        let (dx, dy) = self.canvas_delta(self.width / 2.0, self.height / 2.0);
        self.min_x = x - dx;
        self.min_y = y - dy;
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width.max(0.0);
        self.height = height.max(0.0);
    }
}
