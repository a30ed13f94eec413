//! Intersection of the slice plane with the unit hypercube, point
//! validity, and distance-from-plane.
//!
//! The slice polygon is computed by clipping a bounding square in
//! (u, v) space against the 2D half-planes `0 <= x_k(u, v) <= 1`, one
//! pair per raw dimension, Sutherland-Hodgman style. Each raw
//! coordinate is an affine function of (u, v):
//!
//!   x_k(u, v) = origin[k] + u * row_u[k] + v * row_v[k]

use nalgebra::DVector;

use crate::basis::{PlaneBasis, PlanePoint};

/// Distance threshold for on-plane classification and for validity
/// checks against the cube faces.
pub const PLANE_EPSILON: f64 = 1e-5;

/// Inside tolerance for half-plane clipping; also guards the
/// edge-intersection denominator.
const CLIP_EPSILON: f64 = 1e-9;

/// The convex polygon, in plane coordinates, where the slice plane
/// cuts through [0, 1]^D. Empty when the plane misses the cube.
pub fn slice_polygon(basis: &PlaneBasis) -> Vec<PlanePoint> {
    let dim = basis.dim();
    if dim == 0 {
        return Vec::new();
    }

    // A square of side 2*(sqrt(D) + 1) is guaranteed to contain the
    // intersection: no two points of the unit cube are farther apart
    // than sqrt(D), and the origin sits in unit space.
    let half = (dim as f64).sqrt() + 1.0;
    let mut polygon = vec![
        PlanePoint::new(-half, -half),
        PlanePoint::new(half, -half),
        PlanePoint::new(half, half),
        PlanePoint::new(-half, half),
    ];

    for k in 0..dim {
        let (du, dv) = basis.slope_of_dimension(k);
        let offset = basis.origin()[k];
        // x_k >= 0
        polygon = clip_half_plane(&polygon, -du, -dv, -offset);
        if polygon.is_empty() {
            return polygon;
        }
        // x_k <= 1
        polygon = clip_half_plane(&polygon, du, dv, offset - 1.0);
        if polygon.is_empty() {
            return polygon;
        }
    }
    polygon
}

/// Clips a convex polygon against the half-plane `a*u + b*v + c <= 0`,
/// keeping the inside part.
fn clip_half_plane(polygon: &[PlanePoint], a: f64, b: f64, c: f64) -> Vec<PlanePoint> {
    let side = |p: &PlanePoint| a * p.u + b * p.v + c;
    let mut clipped = Vec::with_capacity(polygon.len() + 1);

    for (i, curr) in polygon.iter().enumerate() {
        let prev = &polygon[(i + polygon.len() - 1) % polygon.len()];
        let f_prev = side(prev);
        let f_curr = side(curr);
        let prev_inside = f_prev <= CLIP_EPSILON;
        let curr_inside = f_curr <= CLIP_EPSILON;

        if prev_inside != curr_inside {
            let denom = f_prev - f_curr;
            // Degenerate edge (both endpoints nearly on the line): skip
            // the intersection rather than dividing by ~0.
            if denom.abs() > CLIP_EPSILON {
                let t = f_prev / denom;
                clipped.push(PlanePoint::new(
                    prev.u + t * (curr.u - prev.u),
                    prev.v + t * (curr.v - prev.v),
                ));
            }
        }
        if curr_inside {
            clipped.push(*curr);
        }
    }

    if clipped.len() < 3 {
        return Vec::new();
    }
    clipped
}

/// Whether the plane point (u, v), lifted to unit space, lies inside
/// the unit cube (within tolerance on every coordinate).
pub fn is_point_valid(basis: &PlaneBasis, u: f64, v: f64) -> bool {
    basis
        .lift(u, v)
        .iter()
        .all(|&x| (-PLANE_EPSILON..=1.0 + PLANE_EPSILON).contains(&x))
}

fn raw_distance(basis: &PlaneBasis, unit: &DVector<f64>) -> f64 {
    let point = basis.project(unit);
    (unit - basis.lift(point.u, point.v)).norm()
}

/// Euclidean distance between a unit vector and its projection onto
/// the plane, normalized by sqrt(D) and clipped to [0, 1]. A display
/// heuristic for fading off-slice markers, not a geometric bound.
pub fn distance_from_plane(basis: &PlaneBasis, unit: &DVector<f64>) -> f64 {
    let dim = basis.dim();
    if dim == 0 {
        return 0.0;
    }
    (raw_distance(basis, unit) / (dim as f64).sqrt()).clamp(0.0, 1.0)
}

/// Normalized distances for a whole batch of unit vectors in one pass.
pub fn distances_from_plane<'a, I>(basis: &PlaneBasis, vectors: I) -> Vec<f64>
where
    I: IntoIterator<Item = &'a DVector<f64>>,
{
    vectors
        .into_iter()
        .map(|unit| distance_from_plane(basis, unit))
        .collect()
}

/// On-plane classification against the fixed raw-distance threshold.
pub fn on_plane(basis: &PlaneBasis, unit: &DVector<f64>) -> bool {
    raw_distance(basis, unit) <= PLANE_EPSILON
}
