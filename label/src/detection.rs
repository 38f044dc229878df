use crate::{common::*, LabelRecord};

/// An object reported by a detector.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub class_id: u32,
    pub bbox: BBox<f64>,
    /// Score in `[0, 1]`, when the detector reports one.
    pub confidence: Option<f64>,
}

impl Detection {
    pub fn new(class_id: u32, bbox: impl Into<BBox<f64>>, confidence: Option<f64>) -> Self {
        Self {
            class_id,
            bbox: bbox.into(),
            confidence,
        }
    }
}

/// The detections produced for one image.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub image_path: PathBuf,
    /// Pixel size of the image, when known.
    pub image_size: Option<Size<f64>>,
    /// Whether box components are fractions of the image size.
    pub normalized: bool,
    /// Anchor of the `xywh` boxes in this frame.
    pub anchor: Anchor,
    pub detections: Vec<Detection>,
}

impl Frame {
    /// A frame of pixel-space boxes.
    pub fn new(image_path: impl Into<PathBuf>, detections: Vec<Detection>) -> Self {
        Self {
            image_path: image_path.into(),
            image_size: None,
            normalized: false,
            anchor: Anchor::Center,
            detections,
        }
    }

    pub fn with_image_size(self, image_size: Size<f64>) -> Self {
        Self {
            image_size: Some(image_size),
            ..self
        }
    }

    pub fn is_empty(&self) -> bool {
        self.detections.is_empty()
    }

    pub fn len(&self) -> usize {
        self.detections.len()
    }

    /// Converts every detection into its persisted form.
    pub fn label_records(&self) -> Result<Vec<LabelRecord>, ConvertError> {
        let normalized_to = match (self.normalized, &self.image_size) {
            (false, _) => None,
            (true, Some(size)) => Some(size),
            (true, None) => {
                return Err(ConvertError::InvalidBox(
                    "normalized boxes cannot be mapped to pixels without the image size"
                        .to_string(),
                ))
            }
        };

        self.detections
            .iter()
            .map(|detection| LabelRecord::from_detection(detection, self.anchor, normalized_to))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_frame_records() {
        let bbox = BBox::try_new(&[20.0, 15.0, 20.0, 10.0], BoxFormat::Xywh).unwrap();
        let frame = Frame::new("a.jpg", vec![Detection::new(3, bbox, Some(0.5))]);
        let records = frame.label_records().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].class_id, 3);
        assert_eq!(records[0].bbox.xyxy(), [10.0, 10.0, 30.0, 20.0]);
    }

    #[test]
    fn normalized_frame_needs_size() {
        let bbox = Xyxy::try_from_xyxy([0.25, 0.5, 0.75, 1.0]).unwrap();
        let mut frame = Frame::new("a.jpg", vec![Detection::new(0, bbox, None)]);
        frame.normalized = true;
        assert!(frame.label_records().is_err());

        let frame = frame.with_image_size(Size::try_new(100.0, 50.0).unwrap());
        let records = frame.label_records().unwrap();
        assert_eq!(records[0].bbox.xyxy(), [25.0, 25.0, 75.0, 50.0]);
    }
}
