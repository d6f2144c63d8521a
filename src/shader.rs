//! Programmable stages of the pipeline.
//!
//! Every lighting model is a flat struct implementing [`Shader`]. The vertex stage stages the
//! attributes of one corner in the payload and returns its clip space position, the fragment
//! stage colors one pixel of the active triangle or discards it.

pub mod brdf;
pub mod depth;
pub mod pbr;
pub mod phong;
pub mod shadow;

pub use depth::DepthShader;
pub use pbr::PbrShader;
pub use phong::PhongShader;
pub use shadow::ShadowShader;

use crate::framebuffer::{Color, DepthBuffer};
use crate::math::{Matrix, Vec2, Vec3, Vec4};
use crate::model::Mesh;
use crate::pipeline::{Payload, RenderContext, Vertex};

pub trait Shader {
    /// Stages world position, normal and uv of `corner` of `face`, returns the clip position.
    fn vertex(&mut self, face: usize, corner: usize) -> Vec4;
    /// Color of the fragment at perspective-corrected weights `bar`, `None` discards it.
    fn fragment(&self, bar: Vec3, uv: Vec2) -> Option<Color>;
    fn state(&self) -> &ShaderState;
    fn state_mut(&mut self) -> &mut ShaderState;
}

/// Part of every shader the pipeline reads and writes.
#[derive(Debug, Clone)]
pub struct ShaderState {
    pub context: RenderContext,
    pub payload: Payload,
}

impl ShaderState {
    pub fn new(context: RenderContext) -> Self {
        return Self { context, payload: Payload::new() };
    }

    /// Vertex stage shared by the mesh driven shaders: stages world space attributes and
    /// returns the clip position.
    pub fn stage_mesh_corner(&mut self, mesh: &dyn Mesh, face: usize, corner: usize) -> Vec4 {
        let position = mesh.vertex(face, corner);
        let world = self.context.to_world(position);
        let normal = self.context.to_world_normal(mesh.normal(face, corner));
        self.payload.stage_attributes(corner, world, normal, mesh.uv(face, corner));
        return self.context.mvp.transform_vec4(Vec4::new(position.x, position.y, position.z, 1.0));
    }
}

/// Directional light.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    pub direction: Vec3, // Towards the light.
    pub intensity: Vec3,
}

impl Light {
    pub fn new(direction: Vec3, intensity: Vec3) -> Self {
        return Self { direction: direction.normalize(), intensity };
    }
}

/// Depth buffer rendered from the light, with the transform taking world positions into its
/// screen space (light viewport * projection * view).
#[derive(Debug, Clone)]
pub struct ShadowMap<'a> {
    pub depth: &'a DepthBuffer,
    pub transform: Matrix,
}

impl<'a> ShadowMap<'a> {
    pub fn new(depth: &'a DepthBuffer, transform: Matrix) -> Self {
        return Self { depth, transform };
    }

    /// 1.0 if `world` is the nearest thing the light sees (within `bias`), 0.0 if something
    /// occludes it. Positions outside of the map are lit.
    pub fn visibility(&self, world: Vec3, bias: f32) -> f32 {
        let p = self.transform.transform_point(world);
        if !(p.x.is_finite() && p.y.is_finite() && p.z.is_finite()) {
            return 1.0;
        }
        return match self.depth.sample(p.x.floor() as i32, p.y.floor() as i32) {
            Some(recorded) if recorded >= p.z + bias => 0.0,
            _ => 1.0,
        };
    }

    /// The usual 0.3 + 0.7 * lit darkening.
    pub fn factor(&self, world: Vec3, bias: f32) -> f32 {
        return 0.3 + 0.7 * self.visibility(world, bias);
    }
}

/// Bends `normal` by a tangent space sample of a normal map. The tangent frame comes from the
/// uv and world position differences of `triangle`, orthogonalized against the normal.
/// Degenerate uv mappings leave the normal as is.
pub fn perturb_normal(normal: Vec3, triangle: &[Vertex; 3], sample: Vec3) -> Vec3 {
    let n = match normal.try_normalize(f32::EPSILON) {
        Some(n) => n,
        None => return normal,
    };
    let du_1 = triangle[1].uv - triangle[0].uv;
    let du_2 = triangle[2].uv - triangle[0].uv;
    let det = du_1.x * du_2.y - du_2.x * du_1.y;
    if det.abs() < 1e-12 {
        return n;
    }
    let e_1 = triangle[1].world - triangle[0].world;
    let e_2 = triangle[2].world - triangle[0].world;
    let t = (e_1 * du_2.y - e_2 * du_1.y) / det;
    let b = (e_2 * du_1.x - e_1 * du_2.x) / det;

    // Gram-Schmidt.
    let t = match (t - n * n.dot(&t)).try_normalize(1e-12) {
        Some(t) => t,
        None => return n,
    };
    let b = (b - n * n.dot(&b) - t * t.dot(&b)).try_normalize(1e-12).unwrap_or_else(|| n.cross(&t));

    let mapped = sample * 2.0 - Vec3::repeat(1.0);
    let perturbed = t * mapped.x + b * mapped.y + n * mapped.z;
    return perturbed.try_normalize(f32::EPSILON).unwrap_or(n);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::{viewport, WSign};
    use approx::assert_relative_eq;

    fn flat_triangle() -> [Vertex; 3] {
        let corner = |world: Vec3, uv: Vec2| Vertex { clip: Vec4::zeros(), world, normal: Vec3::z(), uv };
        return [
            corner(Vec3::new(0.0, 0.0, 0.0), Vec2::new(0.0, 0.0)),
            corner(Vec3::new(2.0, 0.0, 0.0), Vec2::new(1.0, 0.0)),
            corner(Vec3::new(0.0, 2.0, 0.0), Vec2::new(0.0, 1.0)),
        ];
    }

    #[test]
    fn flat_normal_map_sample_keeps_the_normal() {
        let n = perturb_normal(Vec3::z(), &flat_triangle(), Vec3::new(0.5, 0.5, 1.0));
        assert_relative_eq!(n, Vec3::z(), epsilon = 1e-6);
    }

    #[test]
    fn tangent_follows_u() {
        // A sample pointing along +tangent bends the normal towards world +x, where u grows.
        let n = perturb_normal(Vec3::z(), &flat_triangle(), Vec3::new(1.0, 0.5, 0.5));
        assert_relative_eq!(n, Vec3::x(), epsilon = 1e-6);
        let n = perturb_normal(Vec3::z(), &flat_triangle(), Vec3::new(0.5, 1.0, 0.5));
        assert_relative_eq!(n, Vec3::y(), epsilon = 1e-6);
    }

    #[test]
    fn degenerate_uvs_leave_normal_alone() {
        let mut triangle = flat_triangle();
        for vertex in triangle.iter_mut() {
            vertex.uv = Vec2::new(0.3, 0.3);
        }
        let n = perturb_normal(Vec3::new(0.0, 0.0, 2.0), &triangle, Vec3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(n, Vec3::z());
    }

    #[test]
    fn shadow_map_compares_against_recorded_depth() {
        let mut depth = DepthBuffer::new(4, 4);
        depth.set(1, 1, 0.5);
        // Identity transform, world xy is the shadow map pixel.
        let map = ShadowMap::new(&depth, Matrix::identity(4));
        assert_relative_eq!(map.visibility(Vec3::new(1.5, 1.5, 0.5), 0.01), 1.0);
        assert_relative_eq!(map.visibility(Vec3::new(1.5, 1.5, 0.2), 0.01), 0.0);
        assert_relative_eq!(map.factor(Vec3::new(1.5, 1.5, 0.2), 0.01), 0.3);
        // Nothing recorded, or outside of the map.
        assert_relative_eq!(map.visibility(Vec3::new(2.5, 2.5, -5.0), 0.01), 1.0);
        assert_relative_eq!(map.visibility(Vec3::new(-3.0, 9.0, -5.0), 0.01), 1.0);
    }

    #[test]
    fn stage_mesh_corner_writes_world_attributes() {
        use crate::model::TriangleMesh;

        let mesh = TriangleMesh::new(
            vec![Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.0, 0.0, 1.0)],
            vec![Vec3::x(); 3],
            vec![Vec2::new(0.25, 0.5); 3],
            vec![0, 1, 2],
        )
        .unwrap();
        let mut model = Matrix::identity(4);
        model[(0, 3)] = 3.0;
        let identity = Matrix::identity(4);
        let context = RenderContext::new(model, &identity, &identity, viewport(4, 4), WSign::Negative).unwrap();
        let mut state = ShaderState::new(context);
        state.payload.reset();
        let clip = state.stage_mesh_corner(&mesh, 0, 0);
        assert_relative_eq!(clip, Vec4::new(4.0, 0.0, 0.0, 1.0));
        let vertex = state.payload.polygon()[0];
        assert_relative_eq!(vertex.world, Vec3::new(4.0, 0.0, 0.0));
        assert_relative_eq!(vertex.normal, Vec3::x());
        assert_relative_eq!(vertex.uv, Vec2::new(0.25, 0.5));
    }
}
