//! Minimum-area bounding rectangles.

use crate::error::Result;
use crate::geometry::polygon::{lowest_then_rightmost, Polygon};
use crate::vector::Vector3;

/// Computes the smallest-area rectangle enclosing `points`, ignoring their z components.
///
/// The minimal rectangle always has one side flush with an edge of the convex hull, so each
/// hull edge is tried in turn as the rectangle's base (rotating calipers), and the first
/// smallest one wins. The three other extreme vertices are carried forward from edge to edge,
/// which keeps the search linear in the hull size.
///
/// The corners are returned counter-clockwise starting from the one with the lowest y (ties
/// going to the highest x), with z set to zero. Colinear input yields a zero-width rectangle
/// whose corners coincide pairwise; a single distinct point yields that point four times.
///
/// Returns [`Error::EmptyPointSet`](crate::Error::EmptyPointSet) if `points` is empty.
pub fn calculate_for_polygon(points: &[Vector3]) -> Result<[Vector3; 4]> {
    Ok(for_hull(Polygon::convex_hull(points)?.points()))
}

/// [`calculate_for_polygon`] for a set of points that is already a counter-clockwise hull.
pub(crate) fn for_hull(hull: &[Vector3]) -> [Vector3; 4] {
    let hull: Vec<_> = hull.iter().map(|p| Vector3::new(p.x(), p.y(), 0.)).collect();
    let [first, ..] = hull[..] else {
        return [Vector3::ZERO; 4];
    };
    if hull.len() == 1 {
        return [first; 4];
    }

    let n = hull.len();
    // the vertices the other three calipers rest on
    let (mut ahead, mut opposite, mut behind) = (1, 1, 1);
    let mut best: Option<Calipers> = None;
    for (i, from) in hull.iter().enumerate() {
        let to = hull[(i + 1) % n];
        let u = (to - *from).normalized();
        let v = Vector3::new(-u.y(), u.x(), 0.);

        ahead = advance(&hull, ahead, |p| p.dot(&u));
        if i == 0 {
            opposite = ahead;
        }
        opposite = advance(&hull, opposite, |p| p.dot(&v));
        if i == 0 {
            behind = opposite;
        }
        behind = advance(&hull, behind, |p| -p.dot(&u));

        let calipers = Calipers {
            u,
            v,
            min_u: hull[behind].dot(&u),
            max_u: hull[ahead].dot(&u),
            min_v: from.dot(&v),
            max_v: hull[opposite].dot(&v),
        };
        log::trace!("edge {from} -> {to} bounds an area of {}", calipers.area());
        if best.map_or(true, |best| calipers.area() < best.area()) {
            best = Some(calipers);
        }
    }

    let Some(best) = best else {
        return [first; 4];
    };
    let mut corners = best.corners();
    let first = lowest_then_rightmost(&corners);
    corners.rotate_left(first);
    corners
}

/// Walks counter-clockwise around `hull` from `index` for as long as `extent` keeps growing.
///
/// Projections of a convex polygon onto a direction rise and fall once per turn, so as the
/// edge direction rotates each extreme vertex only ever moves forward.
fn advance(hull: &[Vector3], mut index: usize, extent: impl Fn(&Vector3) -> f64) -> usize {
    for _ in 0..hull.len() {
        let next = (index + 1) % hull.len();
        if extent(&hull[next]) <= extent(&hull[index]) {
            break;
        }
        index = next;
    }
    index
}

/// The extent of a point set along an edge direction `u` and its left-hand normal `v`.
#[derive(Debug, Clone, Copy)]
struct Calipers {
    u: Vector3,
    v: Vector3,
    min_u: f64,
    max_u: f64,
    min_v: f64,
    max_v: f64,
}

impl Calipers {
    fn area(&self) -> f64 {
        (self.max_u - self.min_u) * (self.max_v - self.min_v)
    }

    fn corners(&self) -> [Vector3; 4] {
        let corner = |along: f64, across: f64| self.u * along + self.v * across;
        [
            corner(self.min_u, self.min_v),
            corner(self.max_u, self.min_v),
            corner(self.max_u, self.max_v),
            corner(self.min_u, self.max_v),
        ]
    }
}
