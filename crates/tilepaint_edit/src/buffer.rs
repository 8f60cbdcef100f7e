//! Gesture-scoped scratch pixel buffer

use glam::IVec2;
use image::RgbaImage;

/// One RGBA pixel.
pub type Pixel = [u8; 4];

/// The "nothing here" pixel: fully transparent black. The one sentinel used
/// everywhere - erasing paints it, cleared tiles hold it, and an import
/// partition made of it means "no tile". Flood fill gives it no special
/// treatment beyond exact RGBA matching.
pub const TRANSPARENT: Pixel = [0, 0, 0, 0];

/// A flat RGBA byte buffer addressed `(y * width + x) * 4`.
///
/// Sized to one tile (tile-backed targets) or one layer bitmap (image-backed
/// targets) and discarded when the gesture ends. Writes outside the bounds
/// clip silently; drawing tools lean on that at the edges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// A transparent buffer.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; (width * height * 4) as usize],
        }
    }

    /// Seed a buffer from existing pixel content.
    pub fn from_image(image: &RgbaImage) -> Self {
        Self {
            width: image.width(),
            height: image.height(),
            data: image.as_raw().clone(),
        }
    }

    pub fn to_image(&self) -> RgbaImage {
        RgbaImage::from_raw(self.width, self.height, self.data.clone())
            .expect("buffer length matches dimensions")
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn in_bounds(&self, pos: IVec2) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as u32) < self.width && (pos.y as u32) < self.height
    }

    pub fn pixel(&self, pos: IVec2) -> Option<Pixel> {
        if !self.in_bounds(pos) {
            return None;
        }
        let i = ((pos.y as u32 * self.width + pos.x as u32) * 4) as usize;
        Some([self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]])
    }

    /// Set one pixel; out-of-bounds writes clip.
    pub fn set_pixel(&mut self, pos: IVec2, color: Pixel) {
        if !self.in_bounds(pos) {
            return;
        }
        let i = ((pos.y as u32 * self.width + pos.x as u32) * 4) as usize;
        self.data[i..i + 4].copy_from_slice(&color);
    }

    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    pub fn as_raw_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Copy this buffer into `target` with its top-left corner at `at`,
    /// clipping to the target bounds.
    pub fn blit_into(&self, target: &mut RgbaImage, at: IVec2) {
        for y in 0..self.height as i32 {
            let ty = at.y + y;
            if ty < 0 || ty as u32 >= target.height() {
                continue;
            }
            for x in 0..self.width as i32 {
                let tx = at.x + x;
                if tx < 0 || tx as u32 >= target.width() {
                    continue;
                }
                let i = ((y as u32 * self.width + x as u32) * 4) as usize;
                let px = [self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]];
                target.put_pixel(tx as u32, ty as u32, image::Rgba(px));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_addressing() {
        let mut buf = PixelBuffer::new(4, 3);
        buf.set_pixel(IVec2::new(2, 1), [1, 2, 3, 4]);
        assert_eq!(buf.pixel(IVec2::new(2, 1)), Some([1, 2, 3, 4]));
        // (y * width + x) * 4 with y = 1, x = 2
        let i = (4 + 2) * 4;
        assert_eq!(&buf.as_raw()[i..i + 4], &[1, 2, 3, 4]);
    }

    #[test]
    fn test_out_of_bounds_clips() {
        let mut buf = PixelBuffer::new(2, 2);
        let before = buf.clone();
        buf.set_pixel(IVec2::new(-1, 0), [255; 4]);
        buf.set_pixel(IVec2::new(2, 0), [255; 4]);
        buf.set_pixel(IVec2::new(0, 2), [255; 4]);
        assert_eq!(buf, before);
        assert_eq!(buf.pixel(IVec2::new(5, 5)), None);
    }

    #[test]
    fn test_image_round_trip() {
        let mut image = RgbaImage::new(3, 3);
        image.put_pixel(1, 2, Rgba([9, 8, 7, 6]));
        let buf = PixelBuffer::from_image(&image);
        assert_eq!(buf.to_image(), image);
    }

    #[test]
    fn test_blit_into_clips() {
        let mut buf = PixelBuffer::new(2, 2);
        buf.set_pixel(IVec2::new(0, 0), [1, 1, 1, 255]);
        buf.set_pixel(IVec2::new(1, 1), [2, 2, 2, 255]);

        let mut target = RgbaImage::new(3, 3);
        buf.blit_into(&mut target, IVec2::new(2, 2));
        assert_eq!(target.get_pixel(2, 2), &Rgba([1, 1, 1, 255]));
        // The (1, 1) pixel fell outside and was clipped.
        assert!(target
            .enumerate_pixels()
            .filter(|(x, y, _)| !(*x == 2 && *y == 2))
            .all(|(_, _, px)| px.0 == [0, 0, 0, 0]));
    }
}
