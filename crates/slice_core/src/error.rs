use thiserror::Error;

/// Errors surfaced by the slice engine. All of these are deterministic
/// outcomes of pure computations; there is no transient failure class.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SliceError {
    #[error("preset '{preset}' parameter '{dimension}' value {value} is out of bounds [{min}, {max}]")]
    OutOfBounds {
        preset: String,
        dimension: String,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("dimension '{name}' has min {min} greater than max {max}")]
    InvalidRange { name: String, min: f64, max: f64 },

    #[error("dimension '{0}' already exists")]
    DuplicateDimension(String),

    #[error("preset '{0}' already exists")]
    DuplicatePreset(String),

    #[error("no preset named '{0}'")]
    UnknownPreset(String),

    #[error("preset index {0} out of range")]
    PresetIndex(usize),

    #[error("axis-aligned basis needs two distinct dimensions, got index {0} for both axes")]
    DegenerateAxes(usize),

    #[error("dimension index {index} out of range for a {dim}-dimensional space")]
    AxisOutOfRange { index: usize, dim: usize },

    #[error("three-point basis is degenerate: the points do not span a plane")]
    CollinearPoints,

    #[error("basis assignment needs exactly three selected presets, got {0}")]
    SelectionArity(usize),

    #[error("vector length {actual} does not match the {expected}-dimensional space")]
    DimensionMismatch { expected: usize, actual: usize },
}

pub type Result<T> = std::result::Result<T, SliceError>;
