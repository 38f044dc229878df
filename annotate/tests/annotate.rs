use annotate::{
    config::{AnnotationJob, DetectorConfig},
    AnnotateError, AutoAnnotator, Detector, FrameStream, ImageError,
};
use anyhow::Result;
use bbox::{Size, Xyxy};
use image::RgbImage;
use label::{Detection, Frame};
use noisy_float::prelude::*;
use std::{
    fs,
    num::NonZeroUsize,
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

/// Replays a fixed list of per-image results.
struct ScriptedDetector {
    frames: Vec<Result<Frame, ImageError>>,
    on_frame: Option<Arc<AtomicBool>>,
}

impl ScriptedDetector {
    fn new(frames: Vec<Result<Frame, ImageError>>) -> Self {
        Self {
            frames,
            on_frame: None,
        }
    }

    /// Raises `flag` whenever a frame is handed out.
    fn raising(self, flag: Arc<AtomicBool>) -> Self {
        Self {
            on_frame: Some(flag),
            ..self
        }
    }
}

impl Detector for ScriptedDetector {
    fn detect<'a>(
        &'a mut self,
        _source: &Path,
        _config: &DetectorConfig,
    ) -> Result<FrameStream<'a>> {
        let flag = self.on_frame.clone();
        let frames = self.frames.clone().into_iter().inspect(move |_| {
            if let Some(flag) = &flag {
                flag.store(true, Ordering::SeqCst);
            }
        });
        Ok(Box::new(frames))
    }
}

struct Workspace {
    _dir: tempfile::TempDir,
    source: PathBuf,
    output: PathBuf,
}

impl Workspace {
    fn new() -> Result<Self> {
        let dir = tempfile::tempdir()?;
        let source = dir.path().join("samples");
        fs::create_dir(&source)?;
        let output = dir.path().join("labels");
        Ok(Self {
            _dir: dir,
            source,
            output,
        })
    }

    fn job(&self) -> AnnotationJob {
        AnnotationJob::new(&self.source, DetectorConfig::new("scripted.json5"))
            .with_output_dir(&self.output)
    }

    fn image(&self, name: &str) -> PathBuf {
        self.source.join(name)
    }
}

fn frame(path: impl Into<PathBuf>, boxes: &[(u32, [f64; 4], f64)]) -> Frame {
    let detections = boxes
        .iter()
        .map(|&(class_id, xyxy, confidence)| {
            Detection::new(
                class_id,
                Xyxy::try_from_xyxy(xyxy).unwrap(),
                Some(confidence),
            )
        })
        .collect();
    Frame::new(path, detections).with_image_size(Size::try_new(100.0, 50.0).unwrap())
}

#[test]
fn write_label_file_per_image() -> Result<()> {
    let ws = Workspace::new()?;
    let detector = ScriptedDetector::new(vec![
        Ok(frame(ws.image("a.jpg"), &[(0, [10.0, 10.0, 30.0, 20.0], 0.9)])),
        Ok(frame(ws.image("b.jpg"), &[])),
    ]);

    let summary = AutoAnnotator::new(detector).run(&ws.job())?;

    assert_eq!(
        fs::read_to_string(ws.output.join("a.txt"))?,
        "0 10.0 10.0 30.0 20.0\n"
    );
    assert!(!ws.output.join("b.txt").exists());
    assert_eq!(summary.images_seen, 2);
    assert_eq!(summary.images_with_detections, 1);
    assert_eq!(summary.total_detections, 1);
    assert!(summary.failures.is_empty());
    assert!(!summary.cancelled);
    Ok(())
}

#[test]
fn runs_are_deterministic() -> Result<()> {
    let ws = Workspace::new()?;
    let frames = vec![Ok(frame(
        ws.image("street.png"),
        &[
            (2, [0.5, 1.25, 99.75, 49.5], 0.8),
            (0, [3.0, 4.0, 5.0, 6.0], 0.4),
        ],
    ))];
    let label_path = ws.output.join("street.txt");

    AutoAnnotator::new(ScriptedDetector::new(frames.clone())).run(&ws.job())?;
    let first = fs::read(&label_path)?;
    AutoAnnotator::new(ScriptedDetector::new(frames)).run(&ws.job())?;
    let second = fs::read(&label_path)?;

    assert_eq!(first, second);
    assert_eq!(first, b"2 0.5 1.25 99.75 49.5\n0 3.0 4.0 5.0 6.0\n");
    Ok(())
}

#[test]
fn image_failures_do_not_abort_the_run() -> Result<()> {
    let ws = Workspace::new()?;
    let detector = ScriptedDetector::new(vec![
        Err(ImageError::new(ws.image("broken.jpg"), "corrupted image")),
        Ok(frame(ws.image("c.jpg"), &[(1, [0.0, 0.0, 10.0, 10.0], 0.7)])),
        Ok(frame(ws.image("c.png"), &[(1, [5.0, 5.0, 10.0, 10.0], 0.7)])),
    ]);

    let summary = AutoAnnotator::new(detector).run(&ws.job())?;

    assert_eq!(summary.images_seen, 3);
    assert_eq!(summary.images_with_detections, 1);
    assert_eq!(summary.failures.len(), 2);
    assert_eq!(summary.failures[0].image_path, ws.image("broken.jpg"));
    assert_eq!(summary.failures[1].image_path, ws.image("c.png"));
    assert_eq!(
        fs::read_to_string(ws.output.join("c.txt"))?,
        "1 0.0 0.0 10.0 10.0\n"
    );
    Ok(())
}

#[test]
fn write_failures_do_not_abort_the_run() -> Result<()> {
    let ws = Workspace::new()?;
    fs::create_dir_all(ws.output.join("b.txt"))?;
    let detector = ScriptedDetector::new(vec![
        Ok(frame(ws.image("a.jpg"), &[(0, [1.0, 1.0, 2.0, 2.0], 0.9)])),
        Ok(frame(ws.image("b.jpg"), &[(0, [1.0, 1.0, 2.0, 2.0], 0.9)])),
        Ok(frame(ws.image("c.jpg"), &[(3, [4.0, 4.0, 8.0, 8.0], 0.9)])),
    ]);

    let summary = AutoAnnotator::new(detector).run(&ws.job())?;

    assert_eq!(summary.images_seen, 3);
    assert_eq!(summary.images_with_detections, 2);
    assert_eq!(summary.failures.len(), 1);
    assert_eq!(summary.failures[0].image_path, ws.image("b.jpg"));
    assert!(ws.output.join("a.txt").is_file());
    assert!(ws.output.join("b.txt").is_dir());
    assert_eq!(
        fs::read_to_string(ws.output.join("c.txt"))?,
        "3 4.0 4.0 8.0 8.0\n"
    );

    let leftovers: Vec<_> = fs::read_dir(&ws.output)?
        .map(|entry| -> Result<String> { Ok(entry?.file_name().to_string_lossy().into_owned()) })
        .collect::<Result<_>>()?;
    assert!(leftovers.iter().all(|name| !name.starts_with(".label-")));
    assert_eq!(leftovers.len(), 3);
    Ok(())
}

#[test]
fn rerun_removes_labels_of_images_without_detections() -> Result<()> {
    let ws = Workspace::new()?;
    let first = ScriptedDetector::new(vec![
        Ok(frame(ws.image("a.jpg"), &[(0, [1.0, 1.0, 2.0, 2.0], 0.9)])),
        Ok(frame(ws.image("b.jpg"), &[(0, [1.0, 1.0, 2.0, 2.0], 0.9)])),
        Ok(frame(ws.image("c.jpg"), &[(0, [1.0, 1.0, 2.0, 2.0], 0.9)])),
    ]);
    AutoAnnotator::new(first).run(&ws.job())?;
    assert!(ws.output.join("b.txt").is_file());

    let second = ScriptedDetector::new(vec![
        Ok(frame(ws.image("a.jpg"), &[(0, [1.0, 1.0, 2.0, 2.0], 0.9)])),
        Ok(frame(ws.image("b.jpg"), &[])),
        Ok(frame(ws.image("c.jpg"), &[(1, [3.0, 3.0, 4.0, 4.0], 0.9)])),
        Ok(frame(ws.image("c.png"), &[])),
    ]);
    let summary = AutoAnnotator::new(second).run(&ws.job())?;

    assert!(summary.failures.is_empty());
    assert!(ws.output.join("a.txt").is_file());
    assert!(!ws.output.join("b.txt").exists());
    // c.png has nothing to say about the file c.jpg just wrote
    assert_eq!(
        fs::read_to_string(ws.output.join("c.txt"))?,
        "1 3.0 3.0 4.0 4.0\n"
    );
    Ok(())
}

#[test]
fn cancellation_stops_between_images() -> Result<()> {
    let ws = Workspace::new()?;
    let cancel = Arc::new(AtomicBool::new(false));
    let detector = ScriptedDetector::new(vec![
        Ok(frame(ws.image("a.jpg"), &[(0, [1.0, 1.0, 2.0, 2.0], 0.9)])),
        Ok(frame(ws.image("b.jpg"), &[(0, [1.0, 1.0, 2.0, 2.0], 0.9)])),
    ])
    .raising(cancel.clone());

    let summary = AutoAnnotator::new(detector)
        .with_cancel_flag(cancel)
        .run(&ws.job())?;

    assert!(summary.cancelled);
    assert_eq!(summary.images_seen, 1);
    assert!(ws.output.join("a.txt").exists());
    assert!(!ws.output.join("b.txt").exists());
    Ok(())
}

#[test]
fn missing_source_is_fatal() -> Result<()> {
    let ws = Workspace::new()?;
    let job = AnnotationJob::new(ws.source.join("missing"), DetectorConfig::new("m.json5"))
        .with_output_dir(&ws.output);

    let result = AutoAnnotator::new(ScriptedDetector::new(vec![])).run(&job);
    assert!(matches!(result, Err(AnnotateError::SourceNotFound(_))));
    assert!(!ws.output.exists());

    let result = annotate::start(&job, None);
    assert!(matches!(result, Err(AnnotateError::SourceNotFound(_))));
    Ok(())
}

#[test]
fn invalid_thresholds_are_rejected() -> Result<()> {
    let ws = Workspace::new()?;
    let mut job = ws.job();
    job.detector.iou_threshold = r64(-0.1);

    let result = AutoAnnotator::new(ScriptedDetector::new(vec![])).run(&job);
    assert!(matches!(result, Err(AnnotateError::InvalidConfig(_))));
    Ok(())
}

#[test]
fn invalid_device_fails_detector_init() -> Result<()> {
    let ws = Workspace::new()?;
    let model = ws.source.parent().unwrap().join("detections.json5");
    fs::write(&model, "{ detections: {} }")?;

    let detector = DetectorConfig {
        device: "gpu".into(),
        ..DetectorConfig::new(&model)
    };
    let job = AnnotationJob::new(&ws.source, detector).with_output_dir(&ws.output);

    let result = annotate::start(&job, None);
    assert!(matches!(result, Err(AnnotateError::DetectorInit(_))));
    assert!(!ws.output.exists());
    Ok(())
}

#[test]
fn output_dir_defaults_next_to_source() -> Result<()> {
    let ws = Workspace::new()?;
    let job = AnnotationJob::new(&ws.source, DetectorConfig::new("m.json5"));
    let detector = ScriptedDetector::new(vec![Ok(frame(
        ws.image("a.jpg"),
        &[(0, [10.0, 10.0, 30.0, 20.0], 0.9)],
    ))]);

    AutoAnnotator::new(detector).run(&job)?;

    let expected = ws
        .source
        .parent()
        .unwrap()
        .join("samples_auto_annotate_labels")
        .join("a.txt");
    assert!(expected.is_file());
    Ok(())
}

#[test]
fn precomputed_detections_end_to_end() -> Result<()> {
    let ws = Workspace::new()?;
    RgbImage::new(100, 50).save(ws.image("a.png"))?;
    RgbImage::new(100, 50).save(ws.image("b.png"))?;
    fs::write(ws.image("notes.txt"), "not an image")?;

    let model = ws.source.parent().unwrap().join("detections.json5");
    fs::write(
        &model,
        r#"{
            box_format: "xywh",
            anchor: "center",
            normalized: true,
            detections: {
                "a.png": [
                    { class_id: 0, bbox: [0.25, 0.25, 0.1, 0.2], confidence: 0.3 },
                    { class_id: 0, bbox: [0.5, 0.5, 0.18, 0.2], confidence: 0.5 },
                    { class_id: 0, bbox: [0.5, 0.5, 0.2, 0.2], confidence: 0.9 },
                    { class_id: 0, bbox: [0.8, 0.8, 0.1, 0.1], confidence: 0.1 },
                    { class_id: 5, bbox: [0.8, 0.2, 0.1, 0.1], confidence: 0.9 },
                ],
            },
        }"#,
    )?;

    let detector = DetectorConfig {
        class_filter: Some([0].into_iter().collect()),
        ..DetectorConfig::new(&model)
    };
    let job = AnnotationJob::new(&ws.source, detector).with_output_dir(&ws.output);
    let summary = annotate::start(&job, None)?;

    assert_eq!(summary.images_seen, 2);
    assert_eq!(summary.images_with_detections, 1);
    assert_eq!(summary.total_detections, 2);
    assert_eq!(
        fs::read_to_string(ws.output.join("a.txt"))?,
        "0 40.0 20.0 60.0 30.0\n0 20.0 7.5 30.0 17.5\n"
    );
    assert!(!ws.output.join("b.txt").exists());

    let capped = AnnotationJob {
        detector: DetectorConfig {
            max_detections: NonZeroUsize::new(1).unwrap(),
            ..job.detector.clone()
        },
        ..job.clone()
    };
    annotate::start(&capped, None)?;
    assert_eq!(
        fs::read_to_string(ws.output.join("a.txt"))?,
        "0 40.0 20.0 60.0 30.0\n"
    );
    Ok(())
}

#[test]
fn unsupported_model_is_fatal() -> Result<()> {
    let ws = Workspace::new()?;
    let job = AnnotationJob::new(&ws.source, DetectorConfig::new("yolov8n.pt"))
        .with_output_dir(&ws.output);

    let result = annotate::start(&job, None);
    assert!(matches!(result, Err(AnnotateError::DetectorInit(_))));
    assert!(!ws.output.exists());
    Ok(())
}
