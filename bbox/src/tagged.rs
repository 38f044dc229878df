use crate::{common::*, Anchor, BoxFormat, Element, Xywh, Xyxy};

/// A bounding box tagged with its format.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BBox<T> {
    Xyxy(Xyxy<T>),
    Xywh(Xywh<T>),
}

impl<T> BBox<T>
where
    T: Element,
{
    /// Builds a box from raw components interpreted in `format`.
    pub fn try_new(components: &[T], format: BoxFormat) -> Result<Self> {
        let array: [T; 4] = components
            .try_into()
            .map_err(|_| ConvertError::InvalidShape {
                len: components.len(),
            })?;

        let bbox = match format {
            BoxFormat::Xyxy => Self::Xyxy(Xyxy::try_from_xyxy(array)?),
            BoxFormat::Xywh => Self::Xywh(Xywh::try_from_xywh(array)?),
        };
        Ok(bbox)
    }

    pub fn format(&self) -> BoxFormat {
        match self {
            Self::Xyxy(_) => BoxFormat::Xyxy,
            Self::Xywh(_) => BoxFormat::Xywh,
        }
    }

    /// Converts to corners. An `Xyxy` box is returned as is.
    pub fn to_xyxy(&self, anchor: Anchor) -> Xyxy<T> {
        match self {
            Self::Xyxy(xyxy) => *xyxy,
            Self::Xywh(xywh) => xywh.to_xyxy(anchor),
        }
    }
}

impl<T> From<Xyxy<T>> for BBox<T> {
    fn from(from: Xyxy<T>) -> Self {
        Self::Xyxy(from)
    }
}

impl<T> From<Xywh<T>> for BBox<T> {
    fn from(from: Xywh<T>) -> Self {
        Self::Xywh(from)
    }
}
