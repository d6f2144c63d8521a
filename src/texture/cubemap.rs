use std::path::Path;

use super::Texture;
use crate::error::RenderError;
use crate::math::{Vec2, Vec3};

/// Face file suffixes in storage order: +x, -x, +y, -y, +z, -z.
pub const FACE_NAMES: [&str; 6] = ["px", "nx", "py", "ny", "pz", "nz"];

/// Six textures around the origin, indexed by direction.
#[derive(Debug, Clone)]
pub struct Cubemap {
    faces: [Texture; 6],
}

impl Cubemap {
    /// Faces in the order +x, -x, +y, -y, +z, -z.
    pub fn new(faces: [Texture; 6]) -> Cubemap {
        return Cubemap { faces };
    }

    /// Loads `{dir}/{prefix}{face}.tga` for every face.
    pub fn from_dir<P: AsRef<Path>>(dir: P, prefix: &str) -> Result<Cubemap, RenderError> {
        let dir = dir.as_ref();
        let [px, nx, py, ny, pz, nz] = FACE_NAMES.map(|face| dir.join(format!("{}{}.tga", prefix, face)));
        return Ok(Cubemap::new([
            Texture::from_file(px)?,
            Texture::from_file(nx)?,
            Texture::from_file(py)?,
            Texture::from_file(ny)?,
            Texture::from_file(pz)?,
            Texture::from_file(nz)?,
        ]));
    }

    pub fn face(&self, index: usize) -> &Texture {
        return &self.faces[index];
    }

    /// Color seen along `direction`, which doesn't need to be normalized.
    pub fn sample(&self, direction: Vec3) -> Vec3 {
        let (face, uv) = select_face(direction);
        return self.faces[face].sample_clamped(uv);
    }
}

/// Face index of the dominant axis of `direction` and the texture coordinates on that face.
pub fn select_face(direction: Vec3) -> (usize, Vec2) {
    let (abs_x, abs_y, abs_z) = (direction.x.abs(), direction.y.abs(), direction.z.abs());

    let (face, major, s, t) = if abs_x > abs_y && abs_x > abs_z {
        if direction.x > 0.0 {
            (0, abs_x, direction.z, direction.y)
        } else {
            (1, abs_x, -direction.z, direction.y)
        }
    } else if abs_y > abs_z {
        if direction.y > 0.0 {
            (2, abs_y, direction.x, direction.z)
        } else {
            (3, abs_y, direction.x, -direction.z)
        }
    } else {
        if direction.z > 0.0 {
            (4, abs_z, -direction.x, direction.y)
        } else {
            (5, abs_z, direction.x, direction.y)
        }
    };

    if major == 0.0 {
        // Zero direction, any face will do.
        return (face, Vec2::new(0.5, 0.5));
    }
    let uv = Vec2::new((s / major + 1.0) / 2.0, (t / major + 1.0) / 2.0);
    return (face, uv);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framebuffer::Color;
    use approx::assert_relative_eq;

    #[test]
    fn dominant_axis_picks_the_face() {
        assert_eq!(select_face(Vec3::new(2.0, 0.5, -0.3)).0, 0);
        assert_eq!(select_face(Vec3::new(-2.0, 0.5, -0.3)).0, 1);
        assert_eq!(select_face(Vec3::new(0.1, 3.0, 1.0)).0, 2);
        assert_eq!(select_face(Vec3::new(0.1, -3.0, 1.0)).0, 3);
        assert_eq!(select_face(Vec3::new(0.1, 0.2, 0.9)).0, 4);
        assert_eq!(select_face(Vec3::new(0.1, 0.2, -0.9)).0, 5);
    }

    #[test]
    fn face_center_maps_to_uv_center() {
        for direction in [Vec3::x(), -Vec3::x(), Vec3::y(), -Vec3::y(), Vec3::z(), -Vec3::z()] {
            assert_relative_eq!(select_face(direction).1, Vec2::new(0.5, 0.5));
        }
        // +x face, s runs along +z and t along +y.
        let (_, uv) = select_face(Vec3::new(1.0, 0.5, -0.5));
        assert_relative_eq!(uv, Vec2::new(0.25, 0.75));
    }

    #[test]
    fn sample_reads_the_selected_face() {
        let faces = [0u8, 40, 80, 120, 160, 200].map(|level| Texture::solid(Color::grey(level)));
        let cubemap = Cubemap::new(faces);
        assert_relative_eq!(cubemap.sample(Vec3::new(0.0, -5.0, 1.0)), Vec3::repeat(120.0 / 255.0));
        assert_relative_eq!(cubemap.sample(Vec3::new(0.0, 0.0, -1.0)), Vec3::repeat(200.0 / 255.0));
    }
}
