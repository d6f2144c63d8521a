use std::path::Path;

use image::{imageops, ImageResult, Rgb, RgbImage};

use crate::math::Vec3;

/// Struct, representing raw rgb8 pixel data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0 };
    pub const WHITE: Color = Color { r: 255, g: 255, b: 255 };

    pub fn new(r: u8, g: u8, b: u8) -> Color {
        return Color { r, g, b };
    }

    pub fn grey(level: u8) -> Color {
        return Color { r: level, g: level, b: level };
    }

    /// Quantizes a color with channels in [0, 1], out of range values are clamped.
    pub fn from_unit(c: Vec3) -> Color {
        let quantize = |v: f32| (v.clamp(0.0, 1.0) * 255.0) as u8;
        return Color { r: quantize(c.x), g: quantize(c.y), b: quantize(c.z) };
    }

    /// Channels as floats in [0, 1].
    pub fn to_unit(self) -> Vec3 {
        return Vec3::new(self.r as f32, self.g as f32, self.b as f32) / 255.0;
    }
}

impl From<Color> for Rgb<u8> {
    fn from(c: Color) -> Rgb<u8> {
        return Rgb([c.r, c.g, c.b]);
    }
}

impl From<Rgb<u8>> for Color {
    fn from(p: Rgb<u8>) -> Color {
        return Color { r: p.0[0], g: p.0[1], b: p.0[2] };
    }
}

/// Color target of the rasterizer.
/// (0, 0) is the bottom left pixel, the backing image is stored top row first, so it can be
/// written out without flipping.
pub struct Framebuffer {
    image: RgbImage,
}

impl Framebuffer {
    pub fn new(width: u32, height: u32) -> Framebuffer {
        return Framebuffer { image: RgbImage::new(width, height) };
    }

    pub fn width(&self) -> u32 {
        return self.image.width();
    }

    pub fn height(&self) -> u32 {
        return self.image.height();
    }

    /// Checking if coordinate is in bounds.
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        return x >= 0 && y >= 0 && (x as u32) < self.width() && (y as u32) < self.height();
    }

    pub fn get(&self, x: u32, y: u32) -> Color {
        return (*self.image.get_pixel(x, self.height() - 1 - y)).into();
    }

    /// Sets pixel to a color at specified coordinate, forcing (0, 0) to be in the bottom left
    /// by inverting y. Out of bounds writes are ignored.
    pub fn set(&mut self, x: i32, y: i32, color: Color) {
        if !self.in_bounds(x, y) {
            return;
        }
        let row = self.height() - 1 - y as u32;
        self.image.put_pixel(x as u32, row, color.into());
    }

    pub fn flip_vertically(&mut self) {
        imageops::flip_vertical_in_place(&mut self.image);
    }

    pub fn as_image(&self) -> &RgbImage {
        return &self.image;
    }

    /// Copy of the color data, top row first.
    pub fn to_image(&self) -> RgbImage {
        return self.image.clone();
    }

    /// Format is derived from the extension.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> ImageResult<()> {
        return self.image.save(path);
    }

    /// Draws a line between two pixels with specified color
    /// via Bresenham's algorithm as presented in https://en.wikipedia.org/wiki/Bresenham%27s_line_algorithm
    /// Draws over anything, the depth buffer is not consulted.
    pub fn draw_line(&mut self, x_0: i32, y_0: i32, x_1: i32, y_1: i32, color: Color) {
        let dx = (x_1 - x_0).abs();
        let sx = if x_0 < x_1 { 1 } else { -1 };
        let dy = -(y_1 - y_0).abs();
        let sy = if y_0 < y_1 { 1 } else { -1 };
        let mut error = dx + dy;

        let (mut x, mut y) = (x_0, y_0);
        loop {
            self.set(x, y, color);
            if x == x_1 && y == y_1 {
                break;
            }
            let e2 = 2 * error;
            if e2 >= dy {
                error += dy;
                x += sx;
            }
            if e2 <= dx {
                error += dx;
                y += sy;
            }
        }
    }
}

/// Per pixel nearest depth. Larger values are nearer, the buffer starts at negative infinity.
#[derive(Debug, Clone)]
pub struct DepthBuffer {
    width: u32,
    height: u32,
    data: Vec<f32>,
}

impl DepthBuffer {
    pub fn new(width: u32, height: u32) -> DepthBuffer {
        let n_pixels = (width * height) as usize;
        return DepthBuffer { width, height, data: vec![f32::NEG_INFINITY; n_pixels] };
    }

    pub fn width(&self) -> u32 {
        return self.width;
    }

    pub fn height(&self) -> u32 {
        return self.height;
    }

    fn index(&self, x: u32, y: u32) -> usize {
        return (x + y * self.width) as usize;
    }

    pub fn get(&self, x: u32, y: u32) -> f32 {
        return self.data[self.index(x, y)];
    }

    /// Depth at a possibly out of bounds position, `None` outside of the buffer.
    pub fn sample(&self, x: i32, y: i32) -> Option<f32> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return None;
        }
        return Some(self.get(x as u32, y as u32));
    }

    /// Whether a fragment at `depth` would be visible at (x, y).
    pub fn passes(&self, x: u32, y: u32, depth: f32) -> bool {
        return depth > self.get(x, y);
    }

    /// Records `depth` at (x, y). Callers check [`DepthBuffer::passes`] first, the stored value
    /// must never move farther away.
    pub fn set(&mut self, x: u32, y: u32, depth: f32) {
        let index = self.index(x, y);
        debug_assert!(depth >= self.data[index]);
        self.data[index] = depth;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_uses_bottom_left_origin() {
        let mut frame = Framebuffer::new(4, 3);
        frame.set(1, 0, Color::WHITE);
        assert_eq!(frame.get(1, 0), Color::WHITE);
        // Bottom row of the frame is the last row of the stored image.
        assert_eq!(Color::from(*frame.as_image().get_pixel(1, 2)), Color::WHITE);
        let copy = frame.to_image();
        frame.flip_vertically();
        assert_eq!(frame.get(1, 2), Color::WHITE);
        // The copy doesn't follow later writes.
        assert_eq!(Color::from(*copy.get_pixel(1, 2)), Color::WHITE);
        assert_eq!(Color::from(*copy.get_pixel(1, 0)), Color::BLACK);
    }

    #[test]
    fn out_of_bounds_writes_are_ignored() {
        let mut frame = Framebuffer::new(2, 2);
        frame.set(-1, 0, Color::WHITE);
        frame.set(0, 2, Color::WHITE);
        assert!(frame.as_image().pixels().all(|p| p.0 == [0, 0, 0]));
    }

    #[test]
    fn line_covers_both_endpoints() {
        let mut frame = Framebuffer::new(10, 10);
        frame.draw_line(1, 1, 8, 4, Color::WHITE);
        assert_eq!(frame.get(1, 1), Color::WHITE);
        assert_eq!(frame.get(8, 4), Color::WHITE);
        // One pixel per column on a shallow line.
        let lit = frame.as_image().pixels().filter(|p| p.0 == [255, 255, 255]).count();
        assert_eq!(lit, 8);
    }

    #[test]
    fn depth_starts_far_and_only_moves_nearer() {
        let mut depth = DepthBuffer::new(2, 2);
        assert!(depth.passes(0, 0, -1e30));
        depth.set(0, 0, 0.2);
        assert!(!depth.passes(0, 0, 0.1));
        assert!(!depth.passes(0, 0, 0.2));
        assert!(depth.passes(0, 0, 0.3));
        assert_eq!(depth.sample(5, 0), None);
        assert_eq!(depth.sample(0, 0), Some(0.2));
    }

    #[test]
    fn from_unit_clamps() {
        assert_eq!(Color::from_unit(Vec3::new(2.0, -1.0, 0.5)), Color::new(255, 0, 127));
    }
}
