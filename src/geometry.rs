/// Tolerance used when comparing canvas coordinates
pub const EPSILON: f64 = 1e-6;

/// Calculates the minimum distance from a point to a line segment.
///
/// # Arguments
/// * `point` - The point to measure from
/// * `seg_start` - Starting point of the line segment
/// * `seg_end` - Ending point of the line segment
#[must_use]
pub fn point_to_line_segment_distance(point: (f64, f64), seg_start: (f64, f64), seg_end: (f64, f64)) -> f64 {
    let dx = seg_end.0 - seg_start.0;
    let dy = seg_end.1 - seg_start.1;
    let len_sq = dx * dx + dy * dy;

    if len_sq == 0.0 {
        let px = point.0 - seg_start.0;
        let py = point.1 - seg_start.1;
        return (px * px + py * py).sqrt();
    }

    let t = ((point.0 - seg_start.0) * dx + (point.1 - seg_start.1) * dy) / len_sq;
    let t = t.clamp(0.0, 1.0);

    let closest_x = seg_start.0 + t * dx;
    let closest_y = seg_start.1 + t * dy;

    let px = point.0 - closest_x;
    let py = point.1 - closest_y;
    (px * px + py * py).sqrt()
}

/// Euclidean distance between two points
#[must_use]
pub fn distance(a: (f64, f64), b: (f64, f64)) -> f64 {
    let dx = b.0 - a.0;
    let dy = b.1 - a.1;
    (dx * dx + dy * dy).sqrt()
}

/// Unit left normal `(-dy, dx) / len` of the direction from `a` to `b`.
///
/// Returns `(0.0, 0.0)` for coincident points so offsets collapse instead of
/// producing NaN coordinates.
#[must_use]
pub fn unit_normal(a: (f64, f64), b: (f64, f64)) -> (f64, f64) {
    let dx = b.0 - a.0;
    let dy = b.1 - a.1;
    let len = (dx * dx + dy * dy).sqrt();
    if len < EPSILON {
        return (0.0, 0.0);
    }
    (-dy / len, dx / len)
}

/// Intersection of the two infinite lines through `a1 -> a2` and `b1 -> b2`.
///
/// Returns `None` when the lines are parallel (or either is degenerate).
#[must_use]
pub fn line_intersection(
    a1: (f64, f64),
    a2: (f64, f64),
    b1: (f64, f64),
    b2: (f64, f64),
) -> Option<(f64, f64)> {
    let d = (a2.0 - a1.0) * (b2.1 - b1.1) - (a2.1 - a1.1) * (b2.0 - b1.0);

    // Lines are parallel or coincident
    if d.abs() < 1e-10 {
        return None;
    }

    let t = ((b1.0 - a1.0) * (b2.1 - b1.1) - (b1.1 - a1.1) * (b2.0 - b1.0)) / d;
    Some((a1.0 + t * (a2.0 - a1.0), a1.1 + t * (a2.1 - a1.1)))
}

/// Rounds `value` to the nearest multiple of `grid`.
///
/// A non-positive grid disables snapping.
#[must_use]
pub fn snap_to_grid(value: f64, grid: f64) -> f64 {
    if grid <= 0.0 {
        return value;
    }
    (value / grid).round() * grid + 0.0
}

/// Axis-aligned rectangle in canvas coordinates, always normalised (`min <= max`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Rect {
    /// Builds the rectangle spanned by two opposite corners, whichever corner came first
    #[must_use]
    pub fn from_corners(a: (f64, f64), b: (f64, f64)) -> Self {
        Self {
            min_x: a.0.min(b.0),
            min_y: a.1.min(b.1),
            max_x: a.0.max(b.0),
            max_y: a.1.max(b.1),
        }
    }

    /// Inclusive containment test
    #[must_use]
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    /// Smallest rectangle containing every point, `None` for an empty iterator
    pub fn bounding<I: IntoIterator<Item = (f64, f64)>>(points: I) -> Option<Self> {
        points.into_iter().fold(None, |acc, (x, y)| {
            Some(match acc {
                None => Self { min_x: x, min_y: y, max_x: x, max_y: y },
                Some(r) => Self {
                    min_x: r.min_x.min(x),
                    min_y: r.min_y.min(y),
                    max_x: r.max_x.max(x),
                    max_y: r.max_y.max(y),
                },
            })
        })
    }

    #[must_use]
    pub fn center(&self) -> (f64, f64) {
        ((self.min_x + self.max_x) / 2.0, (self.min_y + self.max_y) / 2.0)
    }
}

/// Formats a coordinate for an SVG path: three decimals at most, no trailing zeros, no `-0`.
#[must_use]
pub fn format_number(value: f64) -> String {
    let rounded = (value * 1000.0).round() / 1000.0;
    if rounded == 0.0 {
        return "0".to_string();
    }
    format!("{rounded}")
}
