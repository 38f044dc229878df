mod common;
pub mod annotator;
pub mod config;
pub mod detector;
mod draw;
pub mod error;
mod font;
pub mod precomputed;
pub mod render;
pub mod source;

pub use annotator::*;
pub use detector::*;
pub use error::*;
pub use precomputed::*;

use crate::{common::*, config::AnnotationJob};

/// Runs `job` with the detector its model selects.
///
/// Nothing is read or written before the job is validated and the detector is
/// opened.
pub fn start(
    job: &AnnotationJob,
    cancel: Option<Arc<AtomicBool>>,
) -> Result<AnnotationSummary, AnnotateError> {
    job.detector.validate()?;
    if !job.image_source.is_dir() {
        return Err(AnnotateError::SourceNotFound(job.image_source.clone()));
    }

    let detector = open_detector(&job.detector)?;
    let mut annotator = AutoAnnotator::new(detector);
    if let Some(flag) = cancel {
        annotator = annotator.with_cancel_flag(flag);
    }
    annotator.run(job)
}
