use crate::{common::*, Anchor, Element, Xyxy};

/// Bounding box in XYWH format.
///
/// `(x, y)` is the anchor point of the box. Whether it is the center or the
/// top-left corner is decided by the [Anchor] given at conversion time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Xywh<T> {
    pub(crate) x: T,
    pub(crate) y: T,
    pub(crate) w: T,
    pub(crate) h: T,
}

impl<T> Xywh<T>
where
    T: Element,
{
    pub fn try_from_xywh(xywh: [T; 4]) -> Result<Self> {
        let [x, y, w, h] = xywh;
        let zero = T::zero();

        if !(w >= zero && h >= zero) {
            return Err(ConvertError::InvalidBox(format!(
                "box width and height must be non-negative, but got w={} h={}",
                w.to_f64().unwrap_or(f64::NAN),
                h.to_f64().unwrap_or(f64::NAN),
            )));
        }

        Ok(Self { x, y, w, h })
    }

    pub fn x(&self) -> T {
        self.x
    }

    pub fn y(&self) -> T {
        self.y
    }

    pub fn w(&self) -> T {
        self.w
    }

    pub fn h(&self) -> T {
        self.h
    }

    pub fn xywh(&self) -> [T; 4] {
        [self.x, self.y, self.w, self.h]
    }

    /// Converts to corners. The anchor correction happens here and nowhere else.
    pub fn to_xyxy(&self, anchor: Anchor) -> Xyxy<T> {
        let Self { x, y, w, h } = *self;

        match anchor {
            Anchor::Center => {
                let two = T::one() + T::one();
                let half_w = w / two;
                let half_h = h / two;
                Xyxy {
                    x_min: x - half_w,
                    y_min: y - half_h,
                    x_max: x + half_w,
                    y_max: y + half_h,
                }
            }
            Anchor::TopLeft => Xyxy {
                x_min: x,
                y_min: y,
                x_max: x + w,
                y_max: y + h,
            },
        }
    }
}

impl<T> From<&Xyxy<T>> for Xywh<T>
where
    T: Element,
{
    /// Center-anchored XYWH of the corners.
    fn from(from: &Xyxy<T>) -> Self {
        let two = T::one() + T::one();
        let w = from.w();
        let h = from.h();
        Self {
            x: from.x_min + w / two,
            y: from.y_min + h / two,
            w,
            h,
        }
    }
}
