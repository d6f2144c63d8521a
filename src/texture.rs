//! Textures, cubemaps and image based lighting maps.

pub mod cubemap;
pub mod ibl;

pub use cubemap::Cubemap;
pub use ibl::IblMap;

use std::path::Path;

use image::{imageops, RgbImage};
use log::info;

use crate::error::RenderError;
use crate::framebuffer::Color;
use crate::math::{Vec2, Vec3};

/// Nearest-neighbour sampled rgb8 texture.
/// Row 0 of the backing image is v = 0, so images read from disk are flipped on load.
#[derive(Debug, Clone)]
pub struct Texture {
    image: RgbImage,
}

impl Texture {
    pub fn from_image(image: RgbImage) -> Texture {
        return Texture { image };
    }

    /// Single texel texture, handy as a constant map.
    pub fn solid(color: Color) -> Texture {
        return Texture { image: RgbImage::from_pixel(1, 1, color.into()) };
    }

    /// Reads any format `image` can decode and flips it vertically.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Texture, RenderError> {
        let path = path.as_ref();
        let mut image = image::open(path)?.to_rgb8();
        imageops::flip_vertical_in_place(&mut image);
        info!("loaded texture {} ({}x{})", path.display(), image.width(), image.height());
        return Ok(Texture { image });
    }

    pub fn width(&self) -> u32 {
        return self.image.width();
    }

    pub fn height(&self) -> u32 {
        return self.image.height();
    }

    /// Color at `uv` with channels in [0, 1]. Coordinates wrap, so `uv` is taken modulo 1.
    pub fn sample(&self, uv: Vec2) -> Vec3 {
        let u = uv.x.rem_euclid(1.0);
        let v = uv.y.rem_euclid(1.0);
        // rem_euclid can round up to exactly 1.0 for tiny negative inputs.
        let x = ((u * self.width() as f32) as u32).min(self.width() - 1);
        let y = ((v * self.height() as f32) as u32).min(self.height() - 1);
        return Color::from(*self.image.get_pixel(x, y)).to_unit();
    }

    /// Like [`Texture::sample`], but `uv` is clamped to the texture instead of wrapping.
    /// Lookup tables and cubemap faces are sampled this way, so 1.0 reads the last texel.
    pub fn sample_clamped(&self, uv: Vec2) -> Vec3 {
        let x = ((uv.x.clamp(0.0, 1.0) * self.width() as f32) as u32).min(self.width() - 1);
        let y = ((uv.y.clamp(0.0, 1.0) * self.height() as f32) as u32).min(self.height() - 1);
        return Color::from(*self.image.get_pixel(x, y)).to_unit();
    }
}
