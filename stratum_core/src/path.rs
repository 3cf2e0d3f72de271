// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Helpers for clip paths expressed as [`kurbo::BezPath`].

use kurbo::{BezPath, PathEl, Point, Rect};

/// Builds a closed rectangular path through the four corners, starting at
/// `(x_1, y_1)` and proceeding clockwise in a y-down space.
#[must_use]
pub fn rect_path(x_1: f64, y_1: f64, x_2: f64, y_2: f64) -> BezPath {
    let mut path = BezPath::new();
    path.move_to((x_1, y_1));
    path.line_to((x_2, y_1));
    path.line_to((x_2, y_2));
    path.line_to((x_1, y_2));
    path.close_path();
    path
}

/// Returns the rectangle a path describes, if it is a single subpath of four
/// axis-aligned line segments.
///
/// The subpath may repeat its first point before closing and may omit the
/// final close; fills close it implicitly.
#[must_use]
pub fn as_rectangle(path: &BezPath) -> Option<Rect> {
    let mut corners = [Point::ZERO; 5];
    let mut n = 0;
    let mut closed = false;

    for el in path.elements() {
        if closed {
            return None;
        }
        match *el {
            PathEl::MoveTo(p) if n == 0 => {
                corners[0] = p;
                n = 1;
            }
            PathEl::LineTo(p) if (1..5).contains(&n) => {
                corners[n] = p;
                n += 1;
            }
            PathEl::ClosePath if n > 0 => closed = true,
            _ => return None,
        }
    }

    match n {
        4 => {}
        5 if corners[4] == corners[0] => {}
        _ => return None,
    }

    let [p0, p1, p2, p3, _] = corners;
    let horizontal_first =
        p0.y == p1.y && p1.x == p2.x && p2.y == p3.y && p3.x == p0.x;
    let vertical_first = p0.x == p1.x && p1.y == p2.y && p2.x == p3.x && p3.y == p0.y;
    if horizontal_first || vertical_first {
        Some(Rect::from_points(p0, p2))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_path_is_detected() {
        let path = rect_path(10.0, 20.0, 110.0, 70.0);
        assert_eq!(as_rectangle(&path), Some(Rect::new(10.0, 20.0, 110.0, 70.0)));
    }

    #[test]
    fn counter_clockwise_and_unclosed() {
        let mut path = BezPath::new();
        path.move_to((0.0, 0.0));
        path.line_to((0.0, 5.0));
        path.line_to((8.0, 5.0));
        path.line_to((8.0, 0.0));
        path.line_to((0.0, 0.0));
        assert_eq!(as_rectangle(&path), Some(Rect::new(0.0, 0.0, 8.0, 5.0)));
    }

    #[test]
    fn triangle_is_not_rectangle() {
        let mut path = BezPath::new();
        path.move_to((0.0, 0.0));
        path.line_to((10.0, 0.0));
        path.line_to((5.0, 8.0));
        path.close_path();
        assert!(as_rectangle(&path).is_none());
    }

    #[test]
    fn rotated_quad_is_not_rectangle() {
        let mut path = BezPath::new();
        path.move_to((5.0, 0.0));
        path.line_to((10.0, 5.0));
        path.line_to((5.0, 10.0));
        path.line_to((0.0, 5.0));
        path.close_path();
        assert!(as_rectangle(&path).is_none());
    }

    #[test]
    fn curves_and_multiple_subpaths_rejected() {
        let mut curved = BezPath::new();
        curved.move_to((0.0, 0.0));
        curved.quad_to((5.0, 5.0), (10.0, 0.0));
        curved.close_path();
        assert!(as_rectangle(&curved).is_none());

        let mut two = rect_path(0.0, 0.0, 1.0, 1.0);
        two.extend(rect_path(2.0, 2.0, 3.0, 3.0));
        assert!(as_rectangle(&two).is_none());
    }
}
