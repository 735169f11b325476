//! Parallel-offset resolution for lines that share a bundle.
//!
//! A displaced pair of endpoints is first tried as a straight segment; only
//! axis-aligned and unit-slope segments are acceptable, depending on the path
//! type. The search order is fixed so identical inputs always give the same path.

use std::f64::consts::PI;
use crate::canvas::paths::generate_straight_path;
use crate::geometry::{unit_normal, EPSILON};
use crate::models::{LinePathType, PathAttributes};
use crate::registry;

/// Angle steps of the search: `k * π/8` for `k` in `0..=16`
const ANGLE_STEPS: u32 = 16;

/// Can a straight segment between the two points stand in for a path of `path_type`?
///
/// Axis-aligned segments are legal for diagonal and perpendicular paths,
/// unit-slope segments for diagonal and rotate-perpendicular paths.
#[must_use]
pub fn is_simple_path_legal(path_type: &LinePathType, x1: f64, y1: f64, x2: f64, y2: f64) -> bool {
    let dx = (x2 - x1).abs();
    let dy = (y2 - y1).abs();

    let axis_aligned = dx < EPSILON || dy < EPSILON;
    if axis_aligned && matches!(path_type, LinePathType::Diagonal | LinePathType::Perpendicular) {
        return true;
    }

    let unit_slope = (dx - dy).abs() < EPSILON;
    unit_slope && matches!(path_type, LinePathType::Diagonal | LinePathType::RotatePerpendicular)
}

fn zero_offset_path(x1: f64, y1: f64, x2: f64, y2: f64) -> String {
    generate_straight_path(x1, y1, x2, y2, &PathAttributes::default())
}

/// Path for a line whose payload carries `offsetFrom`/`offsetTo`.
///
/// 1. Equal offsets: displace both endpoints along the left normal and use the
///    straight segment if it is legal.
/// 2. Otherwise scan `x = k·π/8` (`k = 0..=16`) with the to-endpoint phase `b`
///    in `[x, x + π]`; the first legal displaced pair wins.
/// 3. Otherwise the path type's own generator runs on the raw endpoints.
#[must_use]
pub fn make_short_path_parallel(
    path_type: &LinePathType,
    x1: f64,
    y1: f64,
    x2: f64,
    y2: f64,
    attrs: &PathAttributes,
) -> String {
    let offset_from = attrs.offset_from;
    let offset_to = attrs.offset_to;

    if offset_from == offset_to {
        let (nx, ny) = unit_normal((x1, y1), (x2, y2));
        let (ax, ay) = (x1 + nx * offset_from, y1 + ny * offset_from);
        let (bx, by) = (x2 + nx * offset_to, y2 + ny * offset_to);
        if is_simple_path_legal(path_type, ax, ay, bx, by) {
            return zero_offset_path(ax, ay, bx, by);
        }
    }

    for k in 0..=ANGLE_STEPS {
        let x = f64::from(k) * PI / 8.0;
        for b in [x, x + PI] {
            let (ax, ay) = (x1 + x.sin() * offset_from, y1 + x.cos() * offset_from);
            let (bx, by) = (x2 + b.sin() * offset_to, y2 + b.cos() * offset_to);
            if is_simple_path_legal(path_type, ax, ay, bx, by) {
                return zero_offset_path(ax, ay, bx, by);
            }
        }
    }

    let generator = registry::path_bundle(path_type).generator;
    generator(x1, y1, x2, y2, attrs)
}
