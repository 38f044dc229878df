use crate::{common::*, Element};

/// Image size in pixels. Both sides are strictly positive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Size<T> {
    w: T,
    h: T,
}

impl<T> Size<T>
where
    T: Element,
{
    pub fn try_new(w: T, h: T) -> Result<Self> {
        let zero = T::zero();
        if !(w > zero && h > zero) {
            return Err(ConvertError::InvalidDimension {
                width: w.to_f64().unwrap_or(f64::NAN),
                height: h.to_f64().unwrap_or(f64::NAN),
            });
        }
        Ok(Self { w, h })
    }

    /// Build from integer pixel dimensions, e.g. the ones reported by an image decoder.
    pub fn from_pixels(width: u32, height: u32) -> Result<Self> {
        let invalid = || ConvertError::InvalidDimension {
            width: width as f64,
            height: height as f64,
        };
        let w = <T as NumCast>::from(width).ok_or_else(invalid)?;
        let h = <T as NumCast>::from(height).ok_or_else(invalid)?;
        Self::try_new(w, h)
    }

    pub fn w(&self) -> T {
        self.w
    }

    pub fn h(&self) -> T {
        self.h
    }

    pub fn area(&self) -> T {
        self.w * self.h
    }
}
