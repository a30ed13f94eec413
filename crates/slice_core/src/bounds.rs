//! Per-dimension [min, max] ranges and unit-cube normalization.
//!
//! All geometry downstream of this module works in unit space: each
//! raw parameter value is mapped through `(x - min) / (max - min)` so
//! the whole space becomes the unit hypercube [0, 1]^D.

use nalgebra::DVector;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SliceError};

/// Spans below this are treated as a degenerate (constant) dimension.
pub const SPAN_EPSILON: f64 = 1e-12;

/// Tolerance applied when validating raw values against bounds.
pub const BOUNDS_EPSILON: f64 = 1e-5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dimension {
    pub name: String,
    pub min: f64,
    pub max: f64,
}

impl Dimension {
    pub fn new(name: impl Into<String>, min: f64, max: f64) -> Result<Self> {
        let name = name.into();
        if min > max {
            return Err(SliceError::InvalidRange { name, min, max });
        }
        Ok(Self { name, min, max })
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    /// A constant dimension: every valid value collapses to `min`.
    pub fn is_degenerate(&self) -> bool {
        self.span().abs() < SPAN_EPSILON
    }

    pub fn midpoint(&self) -> f64 {
        (self.min + self.max) / 2.0
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min - BOUNDS_EPSILON && value <= self.max + BOUNDS_EPSILON
    }
}

/// Ordered set of dimensions defining the raw parameter space. Order
/// is stable and defines the layout of every preset vector.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    dims: Vec<Dimension>,
}

impl Bounds {
    pub fn new() -> Self {
        Self { dims: Vec::new() }
    }

    pub fn from_dimensions(dims: Vec<Dimension>) -> Result<Self> {
        let mut bounds = Self::new();
        for dim in dims {
            bounds.add_dimension(&dim.name, dim.min, dim.max)?;
        }
        Ok(bounds)
    }

    pub fn len(&self) -> usize {
        self.dims.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dims.is_empty()
    }

    pub fn dimensions(&self) -> &[Dimension] {
        &self.dims
    }

    pub fn dimension(&self, index: usize) -> Option<&Dimension> {
        self.dims.get(index)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.dims.iter().position(|d| d.name == name)
    }

    /// Appends a dimension and returns its index. Duplicate names are
    /// rejected explicitly rather than silently overwritten.
    pub fn add_dimension(&mut self, name: &str, min: f64, max: f64) -> Result<usize> {
        if self.index_of(name).is_some() {
            return Err(SliceError::DuplicateDimension(name.to_string()));
        }
        self.dims.push(Dimension::new(name, min, max)?);
        Ok(self.dims.len() - 1)
    }

    /// Default raw vector: the midpoint of every dimension.
    pub fn midpoint(&self) -> DVector<f64> {
        DVector::from_iterator(self.dims.len(), self.dims.iter().map(Dimension::midpoint))
    }

    /// Raw space -> unit space. Degenerate dimensions pin to 0.5.
    pub fn to_unit(&self, values: &DVector<f64>) -> DVector<f64> {
        debug_assert_eq!(values.len(), self.dims.len());
        DVector::from_iterator(
            self.dims.len(),
            self.dims.iter().zip(values.iter()).map(|(dim, &x)| {
                if dim.is_degenerate() {
                    0.5
                } else {
                    (x - dim.min) / dim.span()
                }
            }),
        )
    }

    /// Unit space -> raw space. The inverse affine map of `to_unit`;
    /// degenerate dimensions collapse back to `min`.
    pub fn from_unit(&self, unit: &DVector<f64>) -> DVector<f64> {
        debug_assert_eq!(unit.len(), self.dims.len());
        DVector::from_iterator(
            self.dims.len(),
            self.dims
                .iter()
                .zip(unit.iter())
                .map(|(dim, &t)| dim.min + t * dim.span()),
        )
    }

    /// Hard validation of a raw vector against the declared bounds,
    /// identifying the preset, dimension, value and violated range.
    /// Values are never silently clamped.
    pub fn validate(&self, preset: &str, values: &DVector<f64>) -> Result<()> {
        if values.len() != self.dims.len() {
            return Err(SliceError::DimensionMismatch {
                expected: self.dims.len(),
                actual: values.len(),
            });
        }
        for (dim, &value) in self.dims.iter().zip(values.iter()) {
            if !dim.contains(value) {
                return Err(SliceError::OutOfBounds {
                    preset: preset.to_string(),
                    dimension: dim.name.clone(),
                    value,
                    min: dim.min,
                    max: dim.max,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_dims() -> Bounds {
        let mut bounds = Bounds::new();
        bounds.add_dimension("freq1", 0.0, 1.0).unwrap();
        bounds.add_dimension("detune", -20.0, 20.0).unwrap();
        bounds.add_dimension("fixed", 3.0, 3.0).unwrap();
        bounds
    }

    #[test]
    fn round_trip_holds_for_all_dimensions() {
        let bounds = three_dims();
        let raw = DVector::from_vec(vec![0.25, 10.0, 3.0]);
        let back = bounds.from_unit(&bounds.to_unit(&raw));
        for i in 0..3 {
            assert!((back[i] - raw[i]).abs() < 1e-12, "dimension {i} drifted");
        }
    }

    #[test]
    fn degenerate_dimension_pins_to_half() {
        let bounds = three_dims();
        let unit = bounds.to_unit(&DVector::from_vec(vec![0.0, 0.0, 3.0]));
        assert_eq!(unit[2], 0.5);
        let back = bounds.from_unit(&unit);
        assert_eq!(back[2], 3.0);
    }

    #[test]
    fn duplicate_dimension_is_rejected() {
        let mut bounds = three_dims();
        let err = bounds.add_dimension("freq1", 0.0, 2.0).unwrap_err();
        assert_eq!(err, SliceError::DuplicateDimension("freq1".into()));
        assert_eq!(bounds.len(), 3);
    }

    #[test]
    fn inverted_range_is_rejected() {
        let mut bounds = Bounds::new();
        let err = bounds.add_dimension("bad", 1.0, 0.0).unwrap_err();
        assert!(matches!(err, SliceError::InvalidRange { .. }));
    }

    #[test]
    fn validate_reports_full_detail() {
        let bounds = three_dims();
        let err = bounds
            .validate("Piano", &DVector::from_vec(vec![0.5, 100.0, 3.0]))
            .unwrap_err();
        let message = format!("{err}");
        assert!(message.contains("Piano"));
        assert!(message.contains("detune"));
        assert!(message.contains("100"));
        assert!(message.contains("20"));
    }

    #[test]
    fn validate_tolerates_epsilon_overshoot() {
        let bounds = three_dims();
        let values = DVector::from_vec(vec![1.0 + 0.5e-5, -20.0, 3.0]);
        assert!(bounds.validate("edge", &values).is_ok());
    }

    #[test]
    fn validate_rejects_length_mismatch() {
        let bounds = three_dims();
        let err = bounds
            .validate("short", &DVector::from_vec(vec![0.0, 0.0]))
            .unwrap_err();
        assert_eq!(
            err,
            SliceError::DimensionMismatch {
                expected: 3,
                actual: 2
            }
        );
    }

    #[test]
    fn midpoint_uses_each_range() {
        let bounds = three_dims();
        let mid = bounds.midpoint();
        assert_eq!(mid.as_slice(), &[0.5, 0.0, 3.0]);
    }
}
