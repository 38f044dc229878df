use crate::{common::*, config::AnnotationJob, AnnotateError, Detector, ImageError};

/// What a run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnotationSummary {
    pub images_seen: usize,
    pub images_with_detections: usize,
    pub total_detections: usize,
    pub failures: Vec<ImageError>,
    /// Set when the run stopped on a cancellation request.
    pub cancelled: bool,
}

impl fmt::Display for AnnotationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} images seen, {} labeled with {} detections, {} failed",
            self.images_seen,
            self.images_with_detections,
            self.total_detections,
            self.failures.len()
        )?;
        if self.cancelled {
            write!(f, " (cancelled)")?;
        }
        Ok(())
    }
}

/// Runs a detector over an image directory and writes one label file per
/// image with detections.
pub struct AutoAnnotator<D> {
    detector: D,
    cancel: Option<Arc<AtomicBool>>,
}

impl<D> AutoAnnotator<D>
where
    D: Detector,
{
    pub fn new(detector: D) -> Self {
        Self {
            detector,
            cancel: None,
        }
    }

    /// Stops the run before the next image once `flag` is set.
    pub fn with_cancel_flag(self, flag: Arc<AtomicBool>) -> Self {
        Self {
            cancel: Some(flag),
            ..self
        }
    }

    /// Annotates every image of `job.image_source`.
    ///
    /// A label file is left in the output directory exactly for the images
    /// with detections. The label file of an image without detections is
    /// removed if an earlier run left one. Failures on single images are
    /// collected in the summary and the run goes on.
    pub fn run(&mut self, job: &AnnotationJob) -> Result<AnnotationSummary, AnnotateError> {
        job.detector.validate()?;
        check_source(&job.image_source)?;

        let output_dir = job.resolved_output_dir();
        fs::create_dir_all(&output_dir).map_err(|source| AnnotateError::Io {
            path: output_dir.clone(),
            source,
        })?;
        info!(
            "annotate images in '{}', write labels to '{}'",
            job.image_source.display(),
            output_dir.display()
        );

        let cancel = self.cancel.clone();
        let is_cancelled = || {
            cancel
                .as_ref()
                .map_or(false, |flag| flag.load(Ordering::SeqCst))
        };

        let mut frames = self
            .detector
            .detect(&job.image_source, &job.detector)
            .map_err(|err| AnnotateError::DetectorInit(format!("{:#}", err)))?;

        let mut summary = AnnotationSummary::default();
        let mut written = HashSet::new();

        loop {
            if is_cancelled() {
                warn!("annotation cancelled after {} images", summary.images_seen);
                summary.cancelled = true;
                break;
            }

            let frame = match frames.next() {
                Some(frame) => frame,
                None => break,
            };
            summary.images_seen += 1;

            let result = frame.and_then(|frame| save_frame(&frame, &output_dir, &mut written));
            match result {
                Ok(0) => {}
                Ok(count) => {
                    summary.images_with_detections += 1;
                    summary.total_detections += count;
                }
                Err(err) => {
                    warn!("skip image {}", err);
                    summary.failures.push(err);
                }
            }
        }

        info!("{}", summary);
        Ok(summary)
    }
}

fn check_source(source: &Path) -> Result<(), AnnotateError> {
    let readable_dir = source.is_dir() && fs::read_dir(source).is_ok();
    if !readable_dir {
        return Err(AnnotateError::SourceNotFound(source.to_owned()));
    }
    Ok(())
}

/// Writes the label file of one frame and returns the number of records.
///
/// Frames without detections produce no file.
fn save_frame(
    frame: &Frame,
    output_dir: &Path,
    written: &mut HashSet<PathBuf>,
) -> Result<usize, ImageError> {
    let image_error = |reason: String| ImageError::new(&frame.image_path, reason);
    let label_path = label::label_file_path(output_dir, &frame.image_path)
        .ok_or_else(|| image_error("image path has no file name".into()))?;

    if frame.is_empty() {
        debug!("no detections in '{}'", frame.image_path.display());
        if !written.contains(&label_path) {
            remove_stale_label(&label_path).map_err(|err| {
                image_error(format!(
                    "failed to remove stale '{}': {}",
                    label_path.display(),
                    err
                ))
            })?;
        }
        return Ok(0);
    }

    let records = frame
        .label_records()
        .map_err(|err| image_error(err.to_string()))?;

    // Images that share a stem would share a label file.
    if written.contains(&label_path) {
        return Err(image_error(format!(
            "label file '{}' was already written by another image in this run",
            label_path.display()
        )));
    }

    label::write_label_file(&label_path, &records).map_err(|err| {
        image_error(format!(
            "failed to write '{}': {}",
            label_path.display(),
            err
        ))
    })?;
    debug!(
        "wrote {} labels to '{}'",
        records.len(),
        label_path.display()
    );
    written.insert(label_path);

    Ok(records.len())
}

fn remove_stale_label(label_path: &Path) -> io::Result<()> {
    match fs::remove_file(label_path) {
        Ok(()) => {
            info!("removed stale label file '{}'", label_path.display());
            Ok(())
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err),
    }
}
