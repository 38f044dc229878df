use crate::{common::*, Element, PixelXyxy, Size};

/// Bounding box in XYXY format.
///
/// The ordering `x_min <= x_max` and `y_min <= y_max` is checked when the box
/// is built and preserved by every method returning a new box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Xyxy<T> {
    pub(crate) x_min: T,
    pub(crate) y_min: T,
    pub(crate) x_max: T,
    pub(crate) y_max: T,
}

impl<T> Xyxy<T>
where
    T: Element,
{
    pub fn try_from_xyxy(xyxy: [T; 4]) -> Result<Self> {
        let [x_min, y_min, x_max, y_max] = xyxy;

        // written negated so that NaN components are rejected too
        if !(x_min <= x_max && y_min <= y_max) {
            return Err(ConvertError::InvalidBox(format!(
                "x_min <= x_max and y_min <= y_max must hold, but got ({}, {}, {}, {})",
                x_min.to_f64().unwrap_or(f64::NAN),
                y_min.to_f64().unwrap_or(f64::NAN),
                x_max.to_f64().unwrap_or(f64::NAN),
                y_max.to_f64().unwrap_or(f64::NAN),
            )));
        }

        Ok(Self {
            x_min,
            y_min,
            x_max,
            y_max,
        })
    }

    pub fn x_min(&self) -> T {
        self.x_min
    }

    pub fn y_min(&self) -> T {
        self.y_min
    }

    pub fn x_max(&self) -> T {
        self.x_max
    }

    pub fn y_max(&self) -> T {
        self.y_max
    }

    pub fn w(&self) -> T {
        self.x_max - self.x_min
    }

    pub fn h(&self) -> T {
        self.y_max - self.y_min
    }

    pub fn xyxy(&self) -> [T; 4] {
        [self.x_min, self.y_min, self.x_max, self.y_max]
    }

    pub fn area(&self) -> T {
        self.w() * self.h()
    }

    /// Scales x by the image width and y by the image height.
    pub fn scale(&self, size: &Size<T>) -> Self {
        let (w, h) = (size.w(), size.h());
        Self {
            x_min: self.x_min * w,
            y_min: self.y_min * h,
            x_max: self.x_max * w,
            y_max: self.y_max * h,
        }
    }

    /// Truncates each coordinate toward zero to an integer pixel index.
    pub fn truncate(&self) -> Result<PixelXyxy> {
        let cast = |value: T| -> Result<i32> {
            value.to_i32().ok_or_else(|| {
                ConvertError::InvalidBox(format!(
                    "coordinate {} is out of the pixel index range",
                    value.to_f64().unwrap_or(f64::NAN)
                ))
            })
        };

        Ok(PixelXyxy {
            x_min: cast(self.x_min)?,
            y_min: cast(self.y_min)?,
            x_max: cast(self.x_max)?,
            y_max: cast(self.y_max)?,
        })
    }

    pub fn intersect_with(&self, other: &Self) -> Option<Self> {
        let x_min = self.x_min.max(other.x_min);
        let y_min = self.y_min.max(other.y_min);
        let x_max = self.x_max.min(other.x_max);
        let y_max = self.y_max.min(other.y_max);
        (x_max > x_min && y_max > y_min).then(|| Self {
            x_min,
            y_min,
            x_max,
            y_max,
        })
    }

    pub fn intersection_area_with(&self, other: &Self) -> T {
        self.intersect_with(other)
            .map(|rect| rect.area())
            .unwrap_or_else(T::zero)
    }

    /// Intersection over union. Two empty boxes have zero IoU.
    pub fn iou_with(&self, other: &Self) -> T {
        let inter_area = self.intersection_area_with(other);
        let union_area = self.area() + other.area() - inter_area;
        if union_area <= T::zero() {
            return T::zero();
        }
        inter_area / union_area
    }
}
