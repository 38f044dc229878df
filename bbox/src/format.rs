use crate::common::*;

/// Encoding of the four box components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoxFormat {
    /// `(x_min, y_min, x_max, y_max)`
    Xyxy,
    /// `(x, y, width, height)` where `(x, y)` is the anchor point.
    Xywh,
}

impl Default for BoxFormat {
    fn default() -> Self {
        Self::Xyxy
    }
}

impl FromStr for BoxFormat {
    type Err = ConvertError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "xyxy" => Ok(Self::Xyxy),
            "xywh" => Ok(Self::Xywh),
            _ => Err(ConvertError::UnsupportedFormat {
                kind: "box format",
                name: name.to_string(),
            }),
        }
    }
}

impl fmt::Display for BoxFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Xyxy => write!(f, "xyxy"),
            Self::Xywh => write!(f, "xywh"),
        }
    }
}

/// The point of an `xywh` box that `(x, y)` refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Anchor {
    Center,
    TopLeft,
}

impl Default for Anchor {
    fn default() -> Self {
        Self::Center
    }
}

impl FromStr for Anchor {
    type Err = ConvertError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "center" => Ok(Self::Center),
            "topleft" => Ok(Self::TopLeft),
            _ => Err(ConvertError::UnsupportedFormat {
                kind: "anchor",
                name: name.to_string(),
            }),
        }
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Center => write!(f, "center"),
            Self::TopLeft => write!(f, "topleft"),
        }
    }
}
