use crate::error::{Error, Result};
use crate::geometry::{mbr, segment};
use crate::vector::Vector3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How far outside an edge a point may lie and still count as inside.
pub(crate) const EDGE_TOLERANCE: f64 = 1e-9;

/// A convex polygon in the xy-plane.
///
/// The only way to construct one is [`Polygon::convex_hull`], so the vertices are always
/// distinct, convex, and counter-clockwise, starting from the vertex with the lowest y (ties
/// going to the highest x). The z component of every vertex is carried along untouched but
/// plays no part in any of the computations.
///
/// A polygon built from colinear or coincident points degenerates to two vertices (a segment)
/// or one (a point).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Polygon {
    points: Vec<Vector3>,
}

/// Axis-aligned box spanned by the vertices of a [`Polygon`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BoundingBox {
    pub min: Vector3,
    pub max: Vector3,
}

impl Polygon {
    /// Computes the convex hull of `points`, ignoring their z components.
    ///
    /// Uses Andrew's monotone chain. Points that share x and y are collapsed to the first of
    /// them, and vertices lying on a hull edge are dropped.
    ///
    /// Returns [`Error::EmptyPointSet`] if `points` is empty.
    pub fn convex_hull(points: &[Vector3]) -> Result<Self> {
        if points.is_empty() {
            return Err(Error::EmptyPointSet);
        }

        let mut sorted = points.to_vec();
        sorted.sort_by(|a, b| a.x().total_cmp(&b.x()).then(a.y().total_cmp(&b.y())));
        sorted.dedup_by(|b, a| a.x() == b.x() && a.y() == b.y());

        let mut hull = if sorted.len() <= 2 {
            sorted
        } else {
            let mut lower = half_hull(sorted.iter());
            let upper = half_hull(sorted.iter().rev());
            // each half ends where the other begins
            lower.pop();
            lower.extend_from_slice(&upper[..upper.len() - 1]);
            lower
        };

        let first = lowest_then_rightmost(&hull);
        hull.rotate_left(first);
        log::trace!(
            "convex hull of {} points has {} vertices",
            points.len(),
            hull.len()
        );
        Ok(Self { points: hull })
    }

    /// The vertices, counter-clockwise.
    #[must_use]
    pub fn points(&self) -> &[Vector3] {
        &self.points
    }

    /// Returns true if `point` lies inside the polygon or on its boundary.
    ///
    /// Only x and y are considered. For a degenerate polygon this is a test of whether `point`
    /// is on the segment or at the point.
    #[must_use]
    pub fn contains(&self, point: &Vector3) -> bool {
        match self.points.as_slice() {
            [] => false,
            [only] => planar(point).distance(&planar(only)) <= EDGE_TOLERANCE,
            [start, end] => {
                let (start, end) = (planar(start), planar(end));
                segment::to_point(&start, &end, &(end - start), &planar(point)) <= EDGE_TOLERANCE
            }
            vertices => vertices
                .iter()
                .zip(vertices.iter().cycle().skip(1))
                .all(|(from, to)| {
                    // signed distance of point to the left of the edge
                    let edge_length = planar(&(*to - *from)).length();
                    cross(from, to, point) >= -EDGE_TOLERANCE * edge_length
                }),
        }
    }

    /// Arithmetic mean of the vertices.
    ///
    /// This is the vertex centroid, not the centroid of the enclosed area; the two agree for
    /// triangles and for centrally symmetric polygons.
    #[must_use]
    pub fn centroid(&self) -> Vector3 {
        self.points.iter().sum::<Vector3>() / self.points.len() as f64
    }

    #[must_use]
    pub fn bounding_box(&self) -> BoundingBox {
        let first = self.points[0];
        let (min, max) = self
            .points
            .iter()
            .skip(1)
            .fold((first, first), |(min, max), p| {
                (
                    Vector3::new(min.x().min(p.x()), min.y().min(p.y()), min.z().min(p.z())),
                    Vector3::new(max.x().max(p.x()), max.y().max(p.y()), max.z().max(p.z())),
                )
            });
        BoundingBox { min, max }
    }

    /// Enclosed area, by the shoelace formula.
    #[must_use]
    pub fn area(&self) -> f64 {
        let vertices = &self.points;
        let twice_area: f64 = vertices
            .iter()
            .zip(vertices.iter().cycle().skip(1))
            .map(|(a, b)| a.x() * b.y() - b.x() * a.y())
            .sum();
        twice_area.abs() / 2.
    }

    /// The smallest-area rectangle enclosing the polygon.
    ///
    /// See [`mbr::calculate_for_polygon`].
    #[must_use]
    pub fn minimum_bounding_rectangle(&self) -> [Vector3; 4] {
        mbr::for_hull(&self.points)
    }
}

impl BoundingBox {
    #[must_use]
    pub fn width(&self) -> f64 {
        self.max.x() - self.min.x()
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.max.y() - self.min.y()
    }
}

/// One half of a monotone chain: keeps only left turns.
fn half_hull<'a>(points: impl Iterator<Item = &'a Vector3>) -> Vec<Vector3> {
    let mut chain: Vec<Vector3> = Vec::new();
    for point in points {
        while let [.., a, b] = *chain.as_slice() {
            if cross(&a, &b, point) > 0. {
                break;
            }
            chain.pop();
        }
        chain.push(*point);
    }
    chain
}

/// z component of `(a - o) × (b - o)`; positive when `o → a → b` turns left.
pub(crate) fn cross(o: &Vector3, a: &Vector3, b: &Vector3) -> f64 {
    (a.x() - o.x()) * (b.y() - o.y()) - (a.y() - o.y()) * (b.x() - o.x())
}

/// Index of the vertex with the lowest y, ties (within [`EDGE_TOLERANCE`]) going to the
/// highest x.
pub(crate) fn lowest_then_rightmost(points: &[Vector3]) -> usize {
    let lowest = points.iter().map(Vector3::y).fold(f64::INFINITY, f64::min);
    let mut first = 0;
    let mut rightmost = f64::NEG_INFINITY;
    for (i, p) in points.iter().enumerate() {
        // strict, so exact ties keep the earlier vertex
        if p.y() - lowest <= EDGE_TOLERANCE && p.x() > rightmost {
            first = i;
            rightmost = p.x();
        }
    }
    first
}

fn planar(v: &Vector3) -> Vector3 {
    Vector3::new(v.x(), v.y(), 0.)
}

#[cfg(test)]
mod tests {
    use super::{BoundingBox, Polygon};
    use crate::error::Error;
    use crate::vector::Vector3;
    use approx::assert_abs_diff_eq;
    use quickcheck::quickcheck;
    use rstest::rstest;

    fn v(x: f64, y: f64) -> Vector3 {
        Vector3::new(x, y, 0.)
    }

    fn square() -> Polygon {
        Polygon::convex_hull(&[v(1., 1.), v(-1., -1.), v(1., -1.), v(-1., 1.), v(0., 0.)])
            .unwrap()
    }

    #[test]
    fn hull_of_square_and_center() {
        assert_eq!(
            square().points(),
            &[v(1., -1.), v(1., 1.), v(-1., 1.), v(-1., -1.)]
        );
    }

    #[test]
    fn hull_drops_points_on_edges() {
        let hull = Polygon::convex_hull(&[
            v(0., 0.),
            v(2., 0.),
            v(2., 2.),
            v(0., 2.),
            v(1., 0.),
            v(2., 1.),
        ])
        .unwrap();
        assert_eq!(hull.points(), &[v(2., 0.), v(2., 2.), v(0., 2.), v(0., 0.)]);
    }

    #[test]
    fn hull_of_identical_points_is_one_point() {
        let hull = Polygon::convex_hull(&[v(2., 3.); 5]).unwrap();
        assert_eq!(hull.points(), &[v(2., 3.)]);
    }

    #[test]
    fn hull_of_alternating_duplicates_is_two_points() {
        let hull =
            Polygon::convex_hull(&[v(0., 0.), v(3., 1.), v(0., 0.), v(3., 1.), v(0., 0.)])
                .unwrap();
        assert_eq!(hull.points(), &[v(0., 0.), v(3., 1.)]);
    }

    #[rstest]
    #[case(&[v(0., 0.), v(1., 1.), v(2., 2.), v(3., 3.)], &[v(0., 0.), v(3., 3.)])]
    #[case(&[v(3., 0.), v(0., 0.), v(1., 0.)], &[v(3., 0.), v(0., 0.)])]
    fn hull_of_colinear_points_is_its_ends(
        #[case] points: &[Vector3],
        #[case] expected: &[Vector3],
    ) {
        assert_eq!(Polygon::convex_hull(points).unwrap().points(), expected);
    }

    #[test]
    fn hull_ignores_z() {
        let hull = Polygon::convex_hull(&[
            Vector3::new(0., 0., 5.),
            Vector3::new(1., 0., -5.),
            Vector3::new(0., 1., 0.),
            // same x and y as the first; dropped
            Vector3::new(0., 0., 100.),
        ])
        .unwrap();
        assert_eq!(
            hull.points(),
            &[
                Vector3::new(1., 0., -5.),
                Vector3::new(0., 1., 0.),
                Vector3::new(0., 0., 5.),
            ]
        );
    }

    #[test]
    fn hull_of_nothing() {
        assert!(matches!(
            Polygon::convex_hull(&[]),
            Err(Error::EmptyPointSet)
        ));
    }

    #[rstest]
    #[case(v(0., 0.), true)]
    #[case(v(0.5, -0.25), true)]
    #[case(v(1., 1.), true)]
    #[case(v(1., 0.), true)]
    #[case(v(-1., 0.3), true)]
    #[case(v(1. + 1e-12, 0.), true)]
    #[case(v(1.01, 0.), false)]
    #[case(v(0., -2.), false)]
    #[case(v(5., 5.), false)]
    fn square_contains(#[case] point: Vector3, #[case] inside: bool) {
        assert_eq!(square().contains(&point), inside);
    }

    #[test]
    fn contains_ignores_z() {
        assert!(square().contains(&Vector3::new(0.5, 0.5, 1000.)));
    }

    #[test]
    fn degenerate_polygons_contain_their_points() {
        let point = Polygon::convex_hull(&[v(2., 3.)]).unwrap();
        assert!(point.contains(&v(2., 3.)));
        assert!(!point.contains(&v(2., 3.1)));

        let segment = Polygon::convex_hull(&[v(0., 0.), v(4., 2.)]).unwrap();
        assert!(segment.contains(&v(2., 1.)));
        assert!(segment.contains(&v(4., 2.)));
        assert!(!segment.contains(&v(2., 1.5)));
        assert!(!segment.contains(&v(6., 3.)));
    }

    #[test]
    fn centroid_bbox_and_area() {
        let triangle = Polygon::convex_hull(&[
            Vector3::new(0., 0., 1.),
            Vector3::new(6., 0., 2.),
            Vector3::new(0., 3., 3.),
        ])
        .unwrap();
        assert_abs_diff_eq!(triangle.centroid(), Vector3::new(2., 1., 2.), epsilon = 1e-12);
        assert_eq!(
            triangle.bounding_box(),
            BoundingBox {
                min: Vector3::new(0., 0., 1.),
                max: Vector3::new(6., 3., 3.),
            }
        );
        assert_eq!(triangle.bounding_box().width(), 6.);
        assert_eq!(triangle.bounding_box().height(), 3.);
        assert_abs_diff_eq!(triangle.area(), 9., epsilon = 1e-12);

        assert_abs_diff_eq!(square().centroid(), Vector3::ZERO, epsilon = 1e-12);
        assert_abs_diff_eq!(square().area(), 4., epsilon = 1e-12);
    }

    #[test]
    fn degenerate_polygons_have_no_area() {
        assert_eq!(Polygon::convex_hull(&[v(2., 3.)]).unwrap().area(), 0.);
        assert_eq!(
            Polygon::convex_hull(&[v(0., 0.), v(4., 2.)]).unwrap().area(),
            0.
        );
    }

    quickcheck! {
        fn hull_contains_its_inputs(points: Vec<Vector3>) -> bool {
            // snap to a coarse integer grid so the containment test is exact
            let points: Vec<_> = points
                .iter()
                .map(|p| v((p.x() / 1e4).round(), (p.y() / 1e4).round()))
                .collect();
            let Ok(hull) = Polygon::convex_hull(&points) else {
                return points.is_empty();
            };
            points.iter().all(|p| hull.contains(p))
                && hull.points().iter().all(|h| points.contains(h))
        }

        fn hull_is_counter_clockwise(points: Vec<Vector3>) -> bool {
            let Ok(hull) = Polygon::convex_hull(&points) else {
                return points.is_empty();
            };
            let vertices = hull.points();
            vertices.len() < 3
                || vertices
                    .iter()
                    .zip(vertices.iter().cycle().skip(1))
                    .zip(vertices.iter().cycle().skip(2))
                    .all(|((a, b), c)| super::cross(a, b, c) > 0.)
        }
    }
}
