use crate::common::*;

/// Fills the inclusive pixel range `[x0, x1] x [y0, y1]`, clipped to the canvas.
///
/// Coordinates are `i64` so that offsets from any `i32` pixel box stay exact.
pub fn fill_rect(canvas: &mut RgbImage, x0: i64, y0: i64, x1: i64, y1: i64, color: Rgb<u8>) {
    let (width, height) = canvas.dimensions();
    let (width, height) = (i64::from(width), i64::from(height));
    let clip = |value: i64, len: i64| value.clamp(0, len - 1) as u32;

    if width == 0 || height == 0 {
        return;
    }
    if x1 < 0 || y1 < 0 || x0 >= width || y0 >= height || x0 > x1 || y0 > y1 {
        return;
    }

    for y in clip(y0, height)..=clip(y1, height) {
        for x in clip(x0, width)..=clip(x1, width) {
            canvas.put_pixel(x, y, color);
        }
    }
}

/// Outlines a box with lines `thickness` pixels wide centered on its edges.
pub fn draw_rect(canvas: &mut RgbImage, bbox: &PixelXyxy, color: Rgb<u8>, thickness: u32) {
    if thickness == 0 {
        return;
    }
    let outer = (i64::from(thickness) - 1) / 2;
    let inner = i64::from(thickness) - 1 - outer;
    let [x_min, y_min, x_max, y_max] = bbox.xyxy().map(i64::from);

    let left = x_min - outer;
    let right = x_max + outer;
    let top = y_min - outer;
    let bottom = y_max + outer;

    fill_rect(canvas, left, top, right, y_min + inner, color);
    fill_rect(canvas, left, y_max - inner, right, bottom, color);
    fill_rect(canvas, left, top, x_min + inner, bottom, color);
    fill_rect(canvas, x_max - inner, top, right, bottom, color);
}
