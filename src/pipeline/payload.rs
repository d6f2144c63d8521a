use crate::math::{lerp, Vec2, Vec3, Vec4};

/// Upper bound of polygon vertices produced by clipping one triangle against the view volume.
pub const MAX_VERTEX: usize = 9;

/// Attributes carried by a vertex through clipping and rasterization.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vertex {
    pub clip: Vec4,   // Clip space position, before the perspective divide.
    pub world: Vec3,  // World space position.
    pub normal: Vec3, // World space normal, not necessarily unit length.
    pub uv: Vec2,
}

impl Vertex {
    /// Every attribute interpolated at `t` along the segment to `other`.
    pub fn lerp(&self, other: &Vertex, t: f32) -> Vertex {
        return Vertex {
            clip: lerp(self.clip, other.clip, t),
            world: lerp(self.world, other.world, t),
            normal: lerp(self.normal, other.normal, t),
            uv: lerp(self.uv, other.uv, t),
        };
    }
}

/// Attributes of a fragment, interpolated over the active triangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interpolated {
    pub world: Vec3,
    pub normal: Vec3,
    pub uv: Vec2,
}

/// Per primitive storage shared by the vertex stage, the clipper and the fragment stage.
///
/// The vertex stage fills the first three slots of `front`. Every clip pass reads `front`,
/// writes `back` and swaps the two, so the current polygon is always in `front`.
#[derive(Debug, Clone, Default)]
pub struct Payload {
    front: [Vertex; MAX_VERTEX],
    back: [Vertex; MAX_VERTEX],
    len: usize,
    // Triangle currently handed to the rasterizer.
    triangle: [Vertex; 3],
}

impl Payload {
    pub fn new() -> Self {
        return Self::default();
    }

    /// Forgets the previous primitive, the next one starts as a fresh triangle.
    pub fn reset(&mut self) {
        self.len = 3;
    }

    /// Vertex stage output for one corner, everything except the clip position.
    pub fn stage_attributes(&mut self, corner: usize, world: Vec3, normal: Vec3, uv: Vec2) {
        let slot = &mut self.front[corner];
        slot.world = world;
        slot.normal = normal;
        slot.uv = uv;
    }

    pub fn stage_clip(&mut self, corner: usize, clip: Vec4) {
        self.front[corner].clip = clip;
    }

    /// Current polygon.
    pub fn polygon(&self) -> &[Vertex] {
        return &self.front[..self.len];
    }

    pub fn len(&self) -> usize {
        return self.len;
    }

    pub fn is_empty(&self) -> bool {
        return self.len == 0;
    }

    /// Runs `pass` from the current polygon into the scratch buffer and makes the result current.
    pub(crate) fn apply<F>(&mut self, pass: F)
    where
        F: FnOnce(&[Vertex], &mut [Vertex; MAX_VERTEX]) -> usize,
    {
        let len = pass(&self.front[..self.len], &mut self.back);
        std::mem::swap(&mut self.front, &mut self.back);
        self.len = len;
    }

    /// Copies three polygon vertices into the active triangle.
    pub fn assemble(&mut self, i0: usize, i1: usize, i2: usize) {
        debug_assert!(i0 < self.len && i1 < self.len && i2 < self.len);
        self.triangle = [self.front[i0], self.front[i1], self.front[i2]];
    }

    pub fn triangle(&self) -> &[Vertex; 3] {
        return &self.triangle;
    }

    /// Attributes of the active triangle weighted by `bar`. The rasterizer hands out
    /// perspective-corrected weights, so this is a plain weighted sum.
    pub fn interpolate(&self, bar: Vec3) -> Interpolated {
        let [a, b, c] = &self.triangle;
        return Interpolated {
            world: a.world * bar.x + b.world * bar.y + c.world * bar.z,
            normal: a.normal * bar.x + b.normal * bar.y + c.normal * bar.z,
            uv: a.uv * bar.x + b.uv * bar.y + c.uv * bar.z,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn vertex_lerp_moves_every_attribute() {
        let a = Vertex {
            clip: Vec4::new(0.0, 0.0, 0.0, -1.0),
            world: Vec3::zeros(),
            normal: Vec3::z(),
            uv: Vec2::zeros(),
        };
        let b = Vertex {
            clip: Vec4::new(2.0, 2.0, 2.0, -3.0),
            world: Vec3::new(4.0, 0.0, 0.0),
            normal: Vec3::x(),
            uv: Vec2::new(1.0, 1.0),
        };
        let mid = a.lerp(&b, 0.5);
        assert_relative_eq!(mid.clip, Vec4::new(1.0, 1.0, 1.0, -2.0));
        assert_relative_eq!(mid.world, Vec3::new(2.0, 0.0, 0.0));
        assert_relative_eq!(mid.normal, Vec3::new(0.5, 0.0, 0.5));
        assert_relative_eq!(mid.uv, Vec2::new(0.5, 0.5));
    }

    #[test]
    fn interpolate_weights_the_active_triangle() {
        let mut payload = Payload::new();
        payload.reset();
        payload.stage_attributes(0, Vec3::zeros(), Vec3::z(), Vec2::new(0.0, 0.0));
        payload.stage_attributes(1, Vec3::x(), Vec3::z(), Vec2::new(1.0, 0.0));
        payload.stage_attributes(2, Vec3::y(), Vec3::z(), Vec2::new(0.0, 1.0));
        payload.assemble(0, 1, 2);
        let fragment = payload.interpolate(Vec3::new(0.5, 0.25, 0.25));
        assert_relative_eq!(fragment.world, Vec3::new(0.25, 0.25, 0.0));
        assert_relative_eq!(fragment.uv, Vec2::new(0.25, 0.25));
        assert_relative_eq!(fragment.normal, Vec3::z());
    }
}
