//! Per-path-type SVG path generators.
//!
//! Every generator is a pure function of the two endpoints and the path payload.

use crate::geometry::{distance, format_number, line_intersection, unit_normal, EPSILON};
use crate::models::{PathAttributes, StartFrom};

/// `generatePath(x1, y1, x2, y2, payload) -> path`
pub type PathGenerator = fn(f64, f64, f64, f64, &PathAttributes) -> String;

type Point = (f64, f64);

fn fmt_point(p: Point) -> String {
    format!("{} {}", format_number(p.0), format_number(p.1))
}

fn straight(from: Point, to: Point) -> String {
    format!("M {} L {}", fmt_point(from), fmt_point(to))
}

fn offset_point(p: Point, normal: Point, offset: f64) -> Point {
    (p.0 + normal.0 * offset, p.1 + normal.1 * offset)
}

/// Plain `M x1 y1 L x2 y2`, also the fallback for unregistered path types
#[must_use]
pub fn generate_straight_path(x1: f64, y1: f64, x2: f64, y2: f64, _attrs: &PathAttributes) -> String {
    straight((x1, y1), (x2, y2))
}

/// Straight line displaced by `offset` along its left normal
#[must_use]
pub fn generate_simple_path(x1: f64, y1: f64, x2: f64, y2: f64, attrs: &PathAttributes) -> String {
    let normal = unit_normal((x1, y1), (x2, y2));
    straight(
        offset_point((x1, y1), normal, attrs.offset),
        offset_point((x2, y2), normal, attrs.offset),
    )
}

/// Axis-aligned L shape: horizontal first when starting from `from`, vertical first otherwise
#[must_use]
pub fn generate_perpendicular_path(x1: f64, y1: f64, x2: f64, y2: f64, attrs: &PathAttributes) -> String {
    let corner = match attrs.start_from {
        StartFrom::From => (x2, y1),
        StartFrom::To => (x1, y2),
    };
    two_leg_path((x1, y1), corner, (x2, y2), attrs)
}

/// One axis-aligned leg and one 45° leg; `from` puts the axis-aligned leg first
#[must_use]
pub fn generate_diagonal_path(x1: f64, y1: f64, x2: f64, y2: f64, attrs: &PathAttributes) -> String {
    let dx = x2 - x1;
    let dy = y2 - y1;
    let corner = if dx.abs() >= dy.abs() {
        let diag = dy.abs() * dx.signum();
        match attrs.start_from {
            StartFrom::From => (x2 - diag, y1),
            StartFrom::To => (x1 + diag, y2),
        }
    } else {
        let diag = dx.abs() * dy.signum();
        match attrs.start_from {
            StartFrom::From => (x1, y2 - diag),
            StartFrom::To => (x2, y1 + diag),
        }
    };
    two_leg_path((x1, y1), corner, (x2, y2), attrs)
}

/// Perpendicular path rotated by 45°: both legs run diagonally
#[must_use]
pub fn generate_rotate_perpendicular_path(x1: f64, y1: f64, x2: f64, y2: f64, attrs: &PathAttributes) -> String {
    let dx = x2 - x1;
    let dy = y2 - y1;
    let corner = match attrs.start_from {
        StartFrom::From => {
            let a = (dx + dy) / 2.0;
            (x1 + a, y1 + a)
        }
        StartFrom::To => {
            let b = (dx - dy) / 2.0;
            (x1 + b, y1 - b)
        }
    };
    two_leg_path((x1, y1), corner, (x2, y2), attrs)
}

/// Shared body of the two-leg generators.
///
/// Leg one is displaced by `offsetFrom`, leg two by `offsetTo`, the corner moves
/// to where the displaced legs meet, and is rounded by `roundCornerFactor`.
fn two_leg_path(p1: Point, corner: Point, p2: Point, attrs: &PathAttributes) -> String {
    let leg1_degenerate = distance(p1, corner) < EPSILON;
    let leg2_degenerate = distance(corner, p2) < EPSILON;
    if leg1_degenerate || leg2_degenerate {
        let offset = if leg1_degenerate { attrs.offset_to } else { attrs.offset_from };
        let normal = unit_normal(p1, p2);
        return straight(offset_point(p1, normal, offset), offset_point(p2, normal, offset));
    }

    let n1 = unit_normal(p1, corner);
    let n2 = unit_normal(corner, p2);
    let start = offset_point(p1, n1, attrs.offset_from);
    let leg1_end = offset_point(corner, n1, attrs.offset_from);
    let leg2_start = offset_point(corner, n2, attrs.offset_to);
    let end = offset_point(p2, n2, attrs.offset_to);
    let corner = line_intersection(start, leg1_end, leg2_start, end).unwrap_or(leg1_end);

    let radius = attrs
        .round_corner_factor
        .max(0.0)
        .min(distance(start, corner) / 2.0)
        .min(distance(corner, end) / 2.0);

    if radius < EPSILON {
        return format!("M {} L {} L {}", fmt_point(start), fmt_point(corner), fmt_point(end));
    }

    let len1 = distance(start, corner);
    let len2 = distance(corner, end);
    let before = (
        corner.0 - (corner.0 - start.0) / len1 * radius,
        corner.1 - (corner.1 - start.1) / len1 * radius,
    );
    let after = (
        corner.0 + (end.0 - corner.0) / len2 * radius,
        corner.1 + (end.1 - corner.1) / len2 * radius,
    );
    format!(
        "M {} L {} Q {} {} L {}",
        fmt_point(start),
        fmt_point(before),
        fmt_point(corner),
        fmt_point(after),
        fmt_point(end)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(start_from: StartFrom) -> PathAttributes {
        PathAttributes { start_from, ..PathAttributes::default() }
    }

    #[test]
    fn test_straight_path() {
        let path = generate_straight_path(0.0, 0.0, 100.0, 50.5, &PathAttributes::default());
        assert_eq!(path, "M 0 0 L 100 50.5");
    }

    #[test]
    fn test_simple_path_offset() {
        let a = PathAttributes { offset: 5.0, ..PathAttributes::default() };
        assert_eq!(generate_simple_path(0.0, 0.0, 100.0, 0.0, &a), "M 0 5 L 100 5");
        assert_eq!(generate_simple_path(0.0, 0.0, 100.0, 0.0, &PathAttributes::default()), "M 0 0 L 100 0");
    }

    #[test]
    fn test_perpendicular_corners() {
        let from = generate_perpendicular_path(0.0, 0.0, 100.0, 50.0, &attrs(StartFrom::From));
        assert_eq!(from, "M 0 0 L 100 0 L 100 50");
        let to = generate_perpendicular_path(0.0, 0.0, 100.0, 50.0, &attrs(StartFrom::To));
        assert_eq!(to, "M 0 0 L 0 50 L 100 50");
    }

    #[test]
    fn test_perpendicular_rounded_corner() {
        let a = PathAttributes { round_corner_factor: 10.0, ..PathAttributes::default() };
        let path = generate_perpendicular_path(0.0, 0.0, 100.0, 50.0, &a);
        assert_eq!(path, "M 0 0 L 90 0 Q 100 0 100 10 L 100 50");
    }

    #[test]
    fn test_perpendicular_offsets_move_the_corner() {
        let a = PathAttributes { offset_from: 5.0, offset_to: 5.0, ..PathAttributes::default() };
        let path = generate_perpendicular_path(0.0, 0.0, 100.0, 50.0, &a);
        assert_eq!(path, "M 0 5 L 95 5 L 95 50");
    }

    #[test]
    fn test_diagonal_legs() {
        let from = generate_diagonal_path(0.0, 0.0, 100.0, 50.0, &attrs(StartFrom::From));
        assert_eq!(from, "M 0 0 L 50 0 L 100 50");
        let to = generate_diagonal_path(0.0, 0.0, 100.0, 50.0, &attrs(StartFrom::To));
        assert_eq!(to, "M 0 0 L 50 50 L 100 50");

        let steep = generate_diagonal_path(0.0, 0.0, 20.0, 100.0, &attrs(StartFrom::From));
        assert_eq!(steep, "M 0 0 L 0 80 L 20 100");
    }

    #[test]
    fn test_diagonal_collapses_when_aligned() {
        let path = generate_diagonal_path(0.0, 0.0, 100.0, 0.0, &attrs(StartFrom::From));
        assert_eq!(path, "M 0 0 L 100 0");
    }

    #[test]
    fn test_rotate_perpendicular() {
        let from = generate_rotate_perpendicular_path(0.0, 0.0, 100.0, 0.0, &attrs(StartFrom::From));
        assert_eq!(from, "M 0 0 L 50 50 L 100 0");
        let to = generate_rotate_perpendicular_path(0.0, 0.0, 100.0, 0.0, &attrs(StartFrom::To));
        assert_eq!(to, "M 0 0 L 50 -50 L 100 0");
    }
}
