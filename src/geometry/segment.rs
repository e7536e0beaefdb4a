//! Minimum distances involving 3-D line segments.

use crate::vector::Vector3;

/// Below this fraction of `|a|²|b|²` two segment directions are treated as parallel.
const PARALLEL_TOLERANCE: f64 = 1e-12;

/// Distance from `point` to the segment that starts at `start` and runs along `dir`.
///
/// `dir` is the (unnormalized) segment direction, `end - start`; it is passed in because callers
/// usually have it already. The projection of `point` onto the segment is clamped to
/// `[0, |dir|]`, so points beyond either end measure to that end. A zero-length `dir` degenerates
/// to the distance to `start`.
#[must_use]
pub fn to_point(start: &Vector3, end: &Vector3, dir: &Vector3, point: &Vector3) -> f64 {
    let length = dir.length();
    if !(length > f64::EPSILON) {
        return point.distance(start);
    }

    let along = (*point - *start).dot(&(*dir / length));
    if along <= 0. {
        point.distance(start)
    } else if along >= length {
        point.distance(end)
    } else {
        point.distance(&(*start + *dir * (along / length)))
    }
}

/// Closest distance between the segments `a_start..a_end` and `b_start..b_end`.
///
/// Handles parallel, colinear, skew, and intersecting segments; segments that touch report (very
/// nearly) zero. Either segment may have zero length, in which case it is treated as a point.
///
/// See <https://geomalgorithms.com/a07-_distance.html>.
#[must_use]
pub fn calculate(a_start: &Vector3, a_end: &Vector3, b_start: &Vector3, b_end: &Vector3) -> f64 {
    let u = *a_end - *a_start;
    let v = *b_end - *b_start;
    let w = *a_start - *b_start;

    let a = u.dot(&u);
    let b = u.dot(&v);
    let c = v.dot(&v);
    let d = u.dot(&w);
    let e = v.dot(&w);

    match (a > f64::EPSILON, c > f64::EPSILON) {
        (false, false) => return a_start.distance(b_start),
        (false, true) => return to_point(b_start, b_end, &v, a_start),
        (true, false) => return to_point(a_start, a_end, &u, b_start),
        (true, true) => {}
    }

    // the closest points sit at s = s_n / s_d along a and t = t_n / t_d along b
    let denominator = a * c - b * b;
    let (mut s_n, mut s_d, mut t_n, t_d) = if denominator <= PARALLEL_TOLERANCE * a * c {
        // any point on a will do; pick its start
        (0., 1., e, c)
    } else {
        let s_n = b * e - c * d;
        if s_n < 0. {
            (0., denominator, e, c)
        } else if s_n > denominator {
            (denominator, denominator, e + b, c)
        } else {
            (s_n, denominator, a * e - b * d, denominator)
        }
    };

    if t_n < 0. {
        t_n = 0.;
        // recompute s for the edge t = 0
        if -d < 0. {
            s_n = 0.;
        } else if -d > a {
            s_n = s_d;
        } else {
            s_n = -d;
            s_d = a;
        }
    } else if t_n > t_d {
        t_n = t_d;
        // recompute s for the edge t = 1
        if b - d < 0. {
            s_n = 0.;
        } else if b - d > a {
            s_n = s_d;
        } else {
            s_n = b - d;
            s_d = a;
        }
    }

    let s = if s_n.abs() <= f64::EPSILON { 0. } else { s_n / s_d };
    let t = if t_n.abs() <= f64::EPSILON { 0. } else { t_n / t_d };

    let between = w + u * s - v * t;
    log::trace!("closest segment parameters s = {s}, t = {t}");
    between.length()
}
