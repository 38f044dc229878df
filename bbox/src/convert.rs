//! Conversions between box representations.
//!
//! Both the label writer and the renderer go through [canonicalize], so the
//! boxes that get persisted and the boxes that get drawn agree on anchor and
//! normalization semantics.

use crate::{common::*, Anchor, BBox, BoxFormat, Element, PixelXyxy, Size, Xyxy};

/// Converts raw box components in `format` into corners.
///
/// `xyxy` input is only validated, never re-derived, so repeated calls do not
/// drift. The anchor is consulted for `xywh` input only.
pub fn to_xyxy<T>(components: &[T], format: BoxFormat, anchor: Anchor) -> Result<Xyxy<T>>
where
    T: Element,
{
    Ok(BBox::try_new(components, format)?.to_xyxy(anchor))
}

/// Batch form of [to_xyxy]. Every element goes through the scalar path.
pub fn to_xyxy_batch<T, B>(boxes: &[B], format: BoxFormat, anchor: Anchor) -> Result<Vec<Xyxy<T>>>
where
    T: Element,
    B: AsRef<[T]>,
{
    boxes
        .iter()
        .map(|components| to_xyxy(components.as_ref(), format, anchor))
        .collect()
}

/// Maps a normalized box onto a `width` x `height` image and truncates the
/// result to integer pixel indices.
///
/// `(0, 0, 1, 1)` maps to `(0, 0, width, height)` exactly.
pub fn denormalize<T>(bbox: &Xyxy<T>, width: T, height: T) -> Result<PixelXyxy>
where
    T: Element,
{
    let size = Size::try_new(width, height)?;
    bbox.scale(&size).truncate()
}

/// Anchor handling for a box that is already in corner form.
///
/// The center correction is applied once, when an `xywh` box becomes `xyxy`.
/// Corners are final, so this returns the box untouched for either anchor.
pub fn apply_anchor<T>(bbox: Xyxy<T>, anchor: Anchor) -> Xyxy<T> {
    match anchor {
        Anchor::Center | Anchor::TopLeft => bbox,
    }
}

/// Brings a tagged box into pixel-space corners.
///
/// `normalized_to` carries the image size when the components are fractions
/// of the image; pass `None` for boxes already in pixels.
pub fn canonicalize<T>(bbox: &BBox<T>, anchor: Anchor, normalized_to: Option<&Size<T>>) -> Xyxy<T>
where
    T: Element,
{
    let xyxy = apply_anchor(bbox.to_xyxy(anchor), anchor);
    match normalized_to {
        Some(size) => xyxy.scale(size),
        None => xyxy,
    }
}
