//! An affine 2-plane embedded in the D-dimensional unit cube.
//!
//! The basis is a pair of unit-length D-vectors plus an origin, all in
//! unit (normalized) space. Orthonormality is in unit space, not raw
//! parameter space.

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SliceError};

/// Near-zero guard for rank checks during orthonormalization.
const RANK_EPSILON: f64 = 1e-9;

/// A point in the plane's local (u, v) coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlanePoint {
    pub u: f64,
    pub v: f64,
}

impl PlanePoint {
    pub fn new(u: f64, v: f64) -> Self {
        Self { u, v }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaneBasis {
    origin: DVector<f64>,
    row_u: DVector<f64>,
    row_v: DVector<f64>,
}

impl PlaneBasis {
    /// All-zero placeholder for spaces that cannot hold a plane yet
    /// (D < 2). Every projection through it collapses to the origin.
    pub fn zeroed(dim: usize) -> Self {
        Self {
            origin: DVector::zeros(dim),
            row_u: DVector::zeros(dim),
            row_v: DVector::zeros(dim),
        }
    }

    /// Slice along two raw dimensions: row u = e_i, row v = e_j,
    /// origin at the corner of the cube.
    pub fn axis_aligned(dim: usize, x_axis: usize, y_axis: usize) -> Result<Self> {
        for index in [x_axis, y_axis] {
            if index >= dim {
                return Err(SliceError::AxisOutOfRange { index, dim });
            }
        }
        if x_axis == y_axis {
            return Err(SliceError::DegenerateAxes(x_axis));
        }
        let mut row_u = DVector::zeros(dim);
        let mut row_v = DVector::zeros(dim);
        row_u[x_axis] = 1.0;
        row_v[y_axis] = 1.0;
        Ok(Self {
            origin: DVector::zeros(dim),
            row_u,
            row_v,
        })
    }

    /// Plane through three points in unit space: origin at their
    /// centroid, basis from the QR factorization of (p2-p1, p3-p1).
    /// Collinear points fail without producing a basis.
    pub fn from_three_points(
        p1: &DVector<f64>,
        p2: &DVector<f64>,
        p3: &DVector<f64>,
    ) -> Result<Self> {
        let dim = p1.len();
        if p2.len() != dim || p3.len() != dim {
            return Err(SliceError::DimensionMismatch {
                expected: dim,
                actual: p2.len().max(p3.len()),
            });
        }
        if dim < 2 {
            return Err(SliceError::CollinearPoints);
        }

        let origin = (p1 + p2 + p3) / 3.0;
        let mut spanning = DMatrix::zeros(dim, 2);
        spanning.column_mut(0).copy_from(&(p2 - p1));
        spanning.column_mut(1).copy_from(&(p3 - p1));

        let qr = spanning.qr();
        let r = qr.r();
        // Rank < 2 shows up as a vanishing diagonal entry of R.
        if r[(0, 0)].abs() < RANK_EPSILON || r[(1, 1)].abs() < RANK_EPSILON {
            return Err(SliceError::CollinearPoints);
        }
        let q = qr.q();
        Ok(Self {
            origin,
            row_u: q.column(0).into_owned(),
            row_v: q.column(1).into_owned(),
        })
    }

    pub fn dim(&self) -> usize {
        self.origin.len()
    }

    pub fn origin(&self) -> &DVector<f64> {
        &self.origin
    }

    pub fn row_u(&self) -> &DVector<f64> {
        &self.row_u
    }

    pub fn row_v(&self) -> &DVector<f64> {
        &self.row_v
    }

    /// Unit-space point -> plane coordinates.
    pub fn project(&self, unit: &DVector<f64>) -> PlanePoint {
        debug_assert_eq!(unit.len(), self.dim());
        let delta = unit - &self.origin;
        PlanePoint::new(delta.dot(&self.row_u), delta.dot(&self.row_v))
    }

    /// Plane coordinates -> the unit-space point exactly on the plane.
    /// Off-plane components are not reconstructed.
    pub fn lift(&self, u: f64, v: f64) -> DVector<f64> {
        &self.origin + &self.row_u * u + &self.row_v * v
    }

    /// The (du, dv) direction in which increasing one raw dimension
    /// moves the 2-D projection; used for iso-parameter lines.
    pub fn slope_of_dimension(&self, index: usize) -> (f64, f64) {
        (self.row_u[index], self.row_v[index])
    }

    /// Appends a zero column for a newly added dimension: the new
    /// parameter lies flat within the existing plane.
    pub fn grow(&mut self) {
        let extend = |v: &DVector<f64>| {
            let mut out = DVector::zeros(v.len() + 1);
            out.rows_mut(0, v.len()).copy_from(v);
            out
        };
        self.origin = extend(&self.origin);
        self.row_u = extend(&self.row_u);
        self.row_v = extend(&self.row_v);
    }
}
