use crate::{
    common::*,
    config::{DetectorConfig, Device},
    AnnotateError, ImageError, PrecomputedDetector,
};

/// Per-image detection results in a deterministic order.
///
/// The stream is lazy and single pass. An image is processed when its item
/// is pulled.
pub type FrameStream<'a> = Box<dyn Iterator<Item = Result<Frame, ImageError>> + 'a>;

/// An object detector working on a directory of images.
pub trait Detector {
    /// Starts detection on the images directly under `source`.
    ///
    /// Thresholds, class filter and detection cap come from `config`. An error
    /// returned here is fatal to the run. Failures on single images are
    /// reported through the stream.
    fn detect<'a>(&'a mut self, source: &Path, config: &DetectorConfig)
        -> Result<FrameStream<'a>>;
}

impl<D> Detector for Box<D>
where
    D: Detector + ?Sized,
{
    fn detect<'a>(
        &'a mut self,
        source: &Path,
        config: &DetectorConfig,
    ) -> Result<FrameStream<'a>> {
        (**self).detect(source, config)
    }
}

/// Opens the detector backend for `config.model`.
///
/// `.json` and `.json5` models are precomputed detection files. Other model
/// kinds have no backend in this build and fail to initialize.
pub fn open_detector(config: &DetectorConfig) -> Result<Box<dyn Detector>, AnnotateError> {
    let init_error = |err: Error| AnnotateError::DetectorInit(format!("{:#}", err));

    let device: Device = config.device.parse().map_err(init_error)?;
    let model = &config.model;
    let ext = model
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    match ext.as_deref() {
        Some("json" | "json5") => {
            if let Device::Cuda(_) = device {
                warn!(
                    "precomputed detections need no accelerator, ignore device '{}'",
                    device
                );
            }
            let detector = PrecomputedDetector::open(model).map_err(init_error)?;
            info!("loaded precomputed detections from '{}'", model.display());
            Ok(Box::new(detector))
        }
        _ => Err(AnnotateError::DetectorInit(format!(
            "no detector backend for model '{}', expect a .json or .json5 detection file",
            model.display()
        ))),
    }
}
