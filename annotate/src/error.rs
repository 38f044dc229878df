use crate::common::*;
use thiserror::Error;

/// Failures that stop an annotation run before or outside the per-image loop.
#[derive(Debug, Error)]
pub enum AnnotateError {
    #[error("image source '{}' does not exist or is not a readable directory", .0.display())]
    SourceNotFound(PathBuf),
    #[error("failed to initialize detector: {0}")]
    DetectorInit(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("failed to prepare output directory '{}'", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// A failure confined to one image. The run records it and moves on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}: {reason}", .image_path.display())]
pub struct ImageError {
    pub image_path: PathBuf,
    pub reason: String,
}

impl ImageError {
    pub fn new(image_path: impl Into<PathBuf>, reason: impl fmt::Display) -> Self {
        Self {
            image_path: image_path.into(),
            reason: reason.to_string(),
        }
    }

    /// Keeps the whole error chain of `err` in the reason.
    pub fn from_error(image_path: impl Into<PathBuf>, err: &Error) -> Self {
        Self::new(image_path, format!("{:#}", err))
    }
}
