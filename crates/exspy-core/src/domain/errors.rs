use crate::domain::EnergyUnits;

pub type AxisResult<T> = Result<T, AxisError>;
pub type MetadataResult<T> = Result<T, MetadataError>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AxisError {
    #[error("energy axis must have at least one channel")]
    Empty,
    #[error("energy axis scale must be finite and > 0, got {scale}")]
    InvalidScale { scale: f64 },
    #[error("energy axis offset must be finite, got {offset}")]
    InvalidOffset { offset: f64 },
    #[error("energy axis value must be finite at index {index}, got {value}")]
    NonFiniteValue { index: usize, value: f64 },
    #[error(
        "energy axis must be strictly increasing, index {index} has {current} after {previous}"
    )]
    NonMonotonic {
        index: usize,
        previous: f64,
        current: f64,
    },
    #[error("intensity array length {data} does not match axis length {axis}")]
    LengthMismatch { axis: usize, data: usize },
    #[error("{operation} requires a uniform energy axis")]
    NonUniform { operation: &'static str },
    #[error("energy window [{low}, {high}] does not overlap the axis range [{axis_low}, {axis_high}]")]
    WindowOutOfRange {
        low: f64,
        high: f64,
        axis_low: f64,
        axis_high: f64,
    },
    #[error("expected axis units {expected} but the axis is calibrated in {actual}")]
    UnitMismatch {
        expected: EnergyUnits,
        actual: EnergyUnits,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MetadataError {
    #[error(
        "the acquisition parameter '{parameter}' is not set; \
         fill it in on the spectrum metadata before calling this operation"
    )]
    Missing { parameter: &'static str },
}
