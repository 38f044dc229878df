use thiserror::Error;

/// Errors raised by box conversions.
///
/// Each error is local to the conversion call that produced it. Callers never
/// receive a default box in place of a malformed one.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConvertError {
    #[error("a bounding box must have exactly 4 components, but got {len}")]
    InvalidShape { len: usize },
    #[error("invalid bounding box: {0}")]
    InvalidBox(String),
    #[error("image width and height must be positive, but got {width}x{height}")]
    InvalidDimension { width: f64, height: f64 },
    #[error("unsupported {kind} '{name}'")]
    UnsupportedFormat { kind: &'static str, name: String },
}
