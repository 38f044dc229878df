/// Bounding box in integer pixel XYXY coordinates.
///
/// Produced by [Xyxy::truncate](crate::Xyxy::truncate) and
/// [denormalize](crate::denormalize); ordering of the corners carries over
/// from the float box since truncation is monotone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PixelXyxy {
    pub x_min: i32,
    pub y_min: i32,
    pub x_max: i32,
    pub y_max: i32,
}

impl PixelXyxy {
    pub fn xyxy(&self) -> [i32; 4] {
        [self.x_min, self.y_min, self.x_max, self.y_max]
    }

    pub fn w(&self) -> i64 {
        i64::from(self.x_max) - i64::from(self.x_min)
    }

    pub fn h(&self) -> i64 {
        i64::from(self.y_max) - i64::from(self.y_min)
    }
}
