//! Pixel rasterization primitives
//!
//! Pure buffer algorithms with no knowledge of tiles or atlases. Erasing is
//! drawing with [`TRANSPARENT`].

use crate::buffer::{Pixel, PixelBuffer, TRANSPARENT};
use glam::IVec2;

/// Stamp a `size x size` square with its top-left corner at `pos`.
pub fn draw_point(buf: &mut PixelBuffer, pos: IVec2, size: u32, color: Pixel) {
    for dy in 0..size as i32 {
        for dx in 0..size as i32 {
            buf.set_pixel(pos + IVec2::new(dx, dy), color);
        }
    }
}

/// Clear a `size x size` square to the transparent sentinel.
pub fn erase_point(buf: &mut PixelBuffer, pos: IVec2, size: u32) {
    draw_point(buf, pos, size, TRANSPARENT);
}

/// Rasterize a line of `size x size` squares from `from` to `to`.
///
/// Dominant-axis parametric stepping: unit steps along the longer delta, the
/// other coordinate following the angle's tangent with truncation. The
/// endpoint square is always painted explicitly, so truncation can never
/// drop it.
pub fn draw_line(buf: &mut PixelBuffer, from: IVec2, to: IVec2, size: u32, color: Pixel) {
    let delta = to - from;
    if delta.x.abs() >= delta.y.abs() {
        let step = delta.x.signum();
        let slope = (delta.y as f32).atan2(delta.x as f32).tan();
        for i in 0..delta.x.abs() {
            let dx = i * step;
            let dy = (slope * dx as f32) as i32;
            draw_point(buf, from + IVec2::new(dx, dy), size, color);
        }
    } else {
        let step = delta.y.signum();
        let slope = (delta.x as f32).atan2(delta.y as f32).tan();
        for i in 0..delta.y.abs() {
            let dy = i * step;
            let dx = (slope * dy as f32) as i32;
            draw_point(buf, from + IVec2::new(dx, dy), size, color);
        }
    }
    draw_point(buf, to, size, color);
}

/// 4-connected scanline flood fill from `seed`.
///
/// Returns immediately when the fill color already equals the seed pixel.
/// Each popped seed walks to the top of its column's matching run, then
/// paints downward, pushing the left/right neighbor once per contiguous
/// matching run. Matching compares against the seed's original color on the
/// buffer being painted, so painted pixels (no longer the start color) are
/// never revisited.
pub fn flood_fill(buf: &mut PixelBuffer, seed: IVec2, color: Pixel) {
    let Some(start) = buf.pixel(seed) else {
        return;
    };
    if start == color {
        return;
    }
    let width = buf.width() as i32;
    let height = buf.height() as i32;
    let matches = |buf: &PixelBuffer, x: i32, y: i32| buf.pixel(IVec2::new(x, y)) == Some(start);

    let mut seeds = vec![seed];
    while let Some(pos) = seeds.pop() {
        let x = pos.x;
        let mut y = pos.y;
        while y > 0 && matches(buf, x, y - 1) {
            y -= 1;
        }
        let mut reach_left = false;
        let mut reach_right = false;
        while y < height && matches(buf, x, y) {
            buf.set_pixel(IVec2::new(x, y), color);
            if x > 0 {
                if matches(buf, x - 1, y) {
                    if !reach_left {
                        seeds.push(IVec2::new(x - 1, y));
                        reach_left = true;
                    }
                } else {
                    reach_left = false;
                }
            }
            if x < width - 1 {
                if matches(buf, x + 1, y) {
                    if !reach_right {
                        seeds.push(IVec2::new(x + 1, y));
                        reach_right = true;
                    }
                } else {
                    reach_right = false;
                }
            }
            y += 1;
        }
    }
}

/// Add `delta` to every pixel's R, G and B, clamped to `[0, 255]`.
/// Alpha is untouched.
pub fn adjust_brightness(buf: &mut PixelBuffer, delta: i16) {
    for pixel in buf.as_raw_mut().chunks_exact_mut(4) {
        for channel in &mut pixel[..3] {
            *channel = (i16::from(*channel) + delta).clamp(0, 255) as u8;
        }
    }
}
