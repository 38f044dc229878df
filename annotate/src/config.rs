use crate::{common::*, AnnotateError};

pub use detector::*;
pub use input::*;

/// Configuration files must be compatible with `^0.1.0`.
pub static CONFIG_VERSION: Lazy<VersionReq> = Lazy::new(|| VersionReq {
    comparators: vec![semver::Comparator {
        op: semver::Op::Caret,
        major: 0,
        minor: Some(1),
        patch: Some(0),
        pre: semver::Prerelease::EMPTY,
    }],
});

/// The content of an annotation job file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(deserialize_with = "deserialize_version")]
    pub version: Version,
    pub input: InputConfig,
    pub detector: DetectorConfig,
}

impl Config {
    pub fn open<P>(path: P) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let text = fs::read_to_string(path)?;
        let config = json5::from_str(&text)?;
        Ok(config)
    }

    pub fn job(&self) -> AnnotationJob {
        let Self {
            input:
                InputConfig {
                    image_source,
                    output_dir,
                },
            detector,
            ..
        } = self.clone();

        AnnotationJob {
            image_source,
            output_dir,
            detector,
        }
    }
}

/// One auto-annotation request.
#[derive(Debug, Clone)]
pub struct AnnotationJob {
    pub image_source: PathBuf,
    pub output_dir: Option<PathBuf>,
    pub detector: DetectorConfig,
}

impl AnnotationJob {
    pub fn new(image_source: impl Into<PathBuf>, detector: DetectorConfig) -> Self {
        Self {
            image_source: image_source.into(),
            output_dir: None,
            detector,
        }
    }

    pub fn with_output_dir(self, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: Some(output_dir.into()),
            ..self
        }
    }

    /// The directory label files go to.
    ///
    /// Defaults to a sibling of the image source named
    /// `{source_name}_auto_annotate_labels`.
    pub fn resolved_output_dir(&self) -> PathBuf {
        if let Some(dir) = &self.output_dir {
            return dir.clone();
        }

        let source = &self.image_source;
        let stem = source
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "images".to_string());
        let dir_name = format!("{}_auto_annotate_labels", stem);

        match source.parent() {
            Some(parent) => parent.join(dir_name),
            None => PathBuf::from(dir_name),
        }
    }
}

mod input {
    use super::*;

    /// Where images come from and where labels go.
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct InputConfig {
        /// Directory containing the images to annotate.
        pub image_source: PathBuf,
        /// Label directory. Derived from `image_source` when omitted.
        #[serde(default)]
        pub output_dir: Option<PathBuf>,
    }
}

mod detector {
    use super::*;

    /// Detector options, passed through to the detector untouched.
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct DetectorConfig {
        /// Model file or identifier.
        pub model: PathBuf,
        /// Compute device: empty for automatic, `cpu`, `cuda`, `cuda:N` or `N`.
        #[serde(default)]
        pub device: String,
        #[serde(default = "default_confidence_threshold")]
        pub confidence_threshold: R64,
        /// IoU threshold of non-maximum suppression.
        #[serde(default = "default_iou_threshold")]
        pub iou_threshold: R64,
        /// Inference input size in pixels.
        #[serde(default = "default_input_size")]
        pub input_size: NonZeroUsize,
        /// Maximum number of detections per image.
        #[serde(default = "default_max_detections")]
        pub max_detections: NonZeroUsize,
        /// Keep only these class ids when set.
        #[serde(default)]
        pub class_filter: Option<HashSet<u32>>,
    }

    impl DetectorConfig {
        pub fn new(model: impl Into<PathBuf>) -> Self {
            Self {
                model: model.into(),
                device: String::new(),
                confidence_threshold: default_confidence_threshold(),
                iou_threshold: default_iou_threshold(),
                input_size: default_input_size(),
                max_detections: default_max_detections(),
                class_filter: None,
            }
        }

        /// Checks the model path and thresholds.
        ///
        /// The device is left to the backend, which reports an unusable one as
        /// a detector initialization failure.
        pub fn validate(&self) -> Result<(), AnnotateError> {
            let invalid = |reason: String| Err(AnnotateError::InvalidConfig(reason));

            if self.model.as_os_str().is_empty() {
                return invalid("model must not be empty".into());
            }
            for (name, value) in [
                ("confidence_threshold", self.confidence_threshold),
                ("iou_threshold", self.iou_threshold),
            ] {
                if !(0.0..=1.0).contains(&value.raw()) {
                    return invalid(format!("{} must be in [0, 1], but get {}", name, value));
                }
            }
            Ok(())
        }

        pub fn accepts_class(&self, class_id: u32) -> bool {
            self.class_filter
                .as_ref()
                .map_or(true, |classes| classes.contains(&class_id))
        }
    }

    /// The device a detector runs on.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Device {
        Auto,
        Cpu,
        Cuda(usize),
    }

    impl FromStr for Device {
        type Err = Error;

        fn from_str(text: &str) -> Result<Self> {
            let text = text.trim();
            let device = match text.to_ascii_lowercase().as_str() {
                "" | "auto" => Self::Auto,
                "cpu" => Self::Cpu,
                "cuda" => Self::Cuda(0),
                name => {
                    let index = name.strip_prefix("cuda:").unwrap_or(name);
                    let index: usize = index
                        .parse()
                        .map_err(|_| format_err!("invalid device '{}'", text))?;
                    Self::Cuda(index)
                }
            };
            Ok(device)
        }
    }

    impl fmt::Display for Device {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                Self::Auto => write!(f, "auto"),
                Self::Cpu => write!(f, "cpu"),
                Self::Cuda(index) => write!(f, "cuda:{}", index),
            }
        }
    }

    fn default_confidence_threshold() -> R64 {
        r64(0.25)
    }

    fn default_iou_threshold() -> R64 {
        r64(0.45)
    }

    fn default_input_size() -> NonZeroUsize {
        NonZeroUsize::new(640).unwrap_or(NonZeroUsize::MIN)
    }

    fn default_max_detections() -> NonZeroUsize {
        NonZeroUsize::new(300).unwrap_or(NonZeroUsize::MIN)
    }
}

pub fn deserialize_version<'de, D>(deserializer: D) -> Result<Version, D::Error>
where
    D: Deserializer<'de>,
{
    let text = String::deserialize(deserializer)?;
    let version = Version::parse(&text).map_err(|err| {
        D::Error::custom(format!(
            "failed to parse version number '{}': {:?}",
            text, err
        ))
    })?;

    if !CONFIG_VERSION.matches(&version) {
        return Err(D::Error::custom(format!(
            "incompatible version: get '{}', but it is incompatible with requirement '{}'",
            version, &*CONFIG_VERSION,
        )));
    }

    Ok(version)
}
