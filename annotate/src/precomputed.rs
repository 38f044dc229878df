//! A detector backend that replays detections computed ahead of time.
//!
//! The detection file is JSON or JSON5:
//!
//! ```text
//! {
//!     box_format: "xywh",     // default "xyxy"
//!     anchor: "center",       // default "center"
//!     normalized: true,       // default false
//!     detections: {
//!         "a.jpg": [{ class_id: 0, bbox: [0.5, 0.5, 0.2, 0.1], confidence: 0.9 }],
//!     },
//! }
//! ```
//!
//! Entries are looked up by image file name. Images without an entry yield
//! empty frames.

use crate::{common::*, config::DetectorConfig, source, Detector, FrameStream, ImageError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionFile {
    #[serde(default)]
    pub box_format: BoxFormat,
    #[serde(default)]
    pub anchor: Anchor,
    #[serde(default)]
    pub normalized: bool,
    pub detections: HashMap<String, Vec<DetectionEntry>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionEntry {
    pub class_id: u32,
    pub bbox: Vec<f64>,
    #[serde(default)]
    pub confidence: Option<f64>,
}

#[derive(Debug, Clone)]
struct Candidate {
    class_id: u32,
    bbox: Xyxy<f64>,
    confidence: Option<f64>,
}

impl Candidate {
    /// Detections without a score are treated as certain.
    fn score(&self) -> f64 {
        self.confidence.unwrap_or(1.0)
    }
}

#[derive(Debug, Clone)]
pub struct PrecomputedDetector {
    file: DetectionFile,
}

impl PrecomputedDetector {
    pub fn new(file: DetectionFile) -> Self {
        Self { file }
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read detection file '{}'", path.display()))?;
        let file = json5::from_str(&text)
            .with_context(|| format!("failed to parse detection file '{}'", path.display()))?;
        Ok(Self::new(file))
    }

    fn detect_image(&self, image_path: &Path, config: &DetectorConfig) -> Result<Frame> {
        let imagesize::ImageSize { width, height } = imagesize::size(image_path)
            .map_err(|err| format_err!("unable to read image size: {:?}", err))?;
        let image_size = Size::from_pixels(u32::try_from(width)?, u32::try_from(height)?)?;

        let file_name = image_path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| format_err!("non UTF-8 file name"))?;
        let entries = self
            .file
            .detections
            .get(file_name)
            .map(|entries| entries.as_slice())
            .unwrap_or(&[]);

        let DetectionFile {
            box_format,
            anchor,
            normalized,
            ..
        } = self.file;
        let normalized_to = normalized.then(|| &image_size);

        let candidates: Vec<_> = entries
            .iter()
            .map(|entry| -> Result<_> {
                let raw = BBox::try_new(&entry.bbox, box_format)
                    .with_context(|| format!("invalid box for class {}", entry.class_id))?;
                Ok(Candidate {
                    class_id: entry.class_id,
                    bbox: bbox::canonicalize(&raw, anchor, normalized_to),
                    confidence: entry.confidence,
                })
            })
            .collect::<Result<_>>()?;

        let conf_thresh = config.confidence_threshold.raw();
        let candidates: Vec<_> = candidates
            .into_iter()
            .filter(|candidate| candidate.score() >= conf_thresh)
            .filter(|candidate| config.accepts_class(candidate.class_id))
            .collect();

        let detections: Vec<_> = non_max_suppression(candidates, config.iou_threshold.raw())
            .into_iter()
            .take(config.max_detections.get())
            .map(|candidate| Detection::new(candidate.class_id, candidate.bbox, candidate.confidence))
            .collect();

        Ok(Frame::new(image_path, detections).with_image_size(image_size))
    }
}

impl Detector for PrecomputedDetector {
    fn detect<'a>(
        &'a mut self,
        source: &Path,
        config: &DetectorConfig,
    ) -> Result<FrameStream<'a>> {
        let config = config.clone();
        let this = &*self;

        let frames = source::image_files(source)?.map(move |path| {
            let path = path?;
            this.detect_image(&path, &config)
                .map_err(|err| ImageError::from_error(&path, &err))
        });
        Ok(Box::new(frames))
    }
}

/// Class-wise greedy non-maximum suppression.
///
/// Candidates are visited from the highest score down. Ties keep their input
/// order. A candidate is dropped when it overlaps a kept box of the same class
/// by more than `iou_threshold`.
fn non_max_suppression(mut candidates: Vec<Candidate>, iou_threshold: f64) -> Vec<Candidate> {
    candidates.sort_by(|lhs, rhs| rhs.score().total_cmp(&lhs.score()));

    let mut kept: Vec<Candidate> = vec![];
    for candidate in candidates {
        let suppressed = kept.iter().any(|other| {
            other.class_id == candidate.class_id
                && other.bbox.iou_with(&candidate.bbox) > iou_threshold
        });
        if !suppressed {
            kept.push(candidate);
        }
    }
    kept
}
