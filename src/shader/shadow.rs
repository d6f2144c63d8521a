use super::{Shader, ShaderState, ShadowMap};
use crate::error::RenderError;
use crate::framebuffer::Color;
use crate::math::{Vec2, Vec3, Vec4};
use crate::model::{Material, Mesh};
use crate::pipeline::RenderContext;
use crate::texture::Texture;

/// Bias against shadow acne, in light space depth units.
pub const SHADOW_BIAS: f32 = 0.01;

/// Unlit diffuse texture darkened where the shadow map says the light is blocked.
pub struct ShadowShader<'a> {
    state: ShaderState,
    mesh: &'a dyn Mesh,
    diffuse: &'a Texture,
    shadow: ShadowMap<'a>,
}

impl<'a> ShadowShader<'a> {
    pub fn new(context: RenderContext, mesh: &'a dyn Mesh, material: &'a Material, shadow: ShadowMap<'a>) -> Result<Self, RenderError> {
        let diffuse = material.require_diffuse()?;
        return Ok(Self { state: ShaderState::new(context), mesh, diffuse, shadow });
    }
}

impl<'a> Shader for ShadowShader<'a> {
    fn vertex(&mut self, face: usize, corner: usize) -> Vec4 {
        return self.state.stage_mesh_corner(self.mesh, face, corner);
    }

    fn fragment(&self, bar: Vec3, uv: Vec2) -> Option<Color> {
        let world = self.state.payload.interpolate(bar).world;
        let factor = self.shadow.factor(world, SHADOW_BIAS);
        return Some(Color::from_unit(self.diffuse.sample(uv) * factor));
    }

    fn state(&self) -> &ShaderState {
        return &self.state;
    }

    fn state_mut(&mut self) -> &mut ShaderState {
        return &mut self.state;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framebuffer::{DepthBuffer, Framebuffer};
    use crate::math::Matrix;
    use crate::model::TriangleMesh;
    use crate::pipeline::draw_triangles;
    use crate::transform::{orthographic, viewport, WSign};

    const SIZE: u32 = 16;

    fn floor() -> TriangleMesh {
        let positions = vec![
            Vec3::new(-1.0, -1.0, 0.0),
            Vec3::new(1.0, -1.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(-1.0, 1.0, 0.0),
        ];
        return TriangleMesh::new(positions, vec![Vec3::z(); 4], vec![Vec2::zeros(); 4], vec![0, 1, 2, 0, 2, 3]).unwrap();
    }

    fn context() -> RenderContext {
        let identity = Matrix::identity(4);
        let projection = orthographic(-1.0, 1.0, -1.0, 1.0, -2.0, 2.0, WSign::Negative);
        return RenderContext::new(identity.clone(), &identity, &projection, viewport(SIZE, SIZE), WSign::Negative).unwrap();
    }

    #[test]
    fn occluded_fragments_are_darkened() {
        let ctx = context();
        // Light looks straight down -z like the camera, so the shadow map is the camera's depth
        // of a blocker covering the left half of the floor, above it.
        let mut shadow_depth = DepthBuffer::new(SIZE, SIZE);
        for y in 0..SIZE {
            for x in 0..SIZE / 2 {
                shadow_depth.set(x, y, 0.25);
            }
        }
        let transform = ctx.screen_transform();
        let material = Material::with_diffuse(Texture::solid(Color::WHITE));
        let mesh = floor();
        let mut shader = ShadowShader::new(ctx, &mesh, &material, ShadowMap::new(&shadow_depth, transform)).unwrap();

        let mut frame = Framebuffer::new(SIZE, SIZE);
        let mut depth = DepthBuffer::new(SIZE, SIZE);
        for face in 0..mesh.face_count() {
            draw_triangles(&mut frame, &mut depth, &mut shader, face);
        }
        assert_eq!(frame.get(3, 8), Color::grey(76));
        assert_eq!(frame.get(12, 8), Color::WHITE);
    }

    #[test]
    fn missing_diffuse_map_fails_construction() {
        let depth = DepthBuffer::new(1, 1);
        let mesh = floor();
        let material = Material::default();
        let result = ShadowShader::new(context(), &mesh, &material, ShadowMap::new(&depth, Matrix::identity(4)));
        assert!(matches!(result, Err(RenderError::MissingMap(_))));
    }
}
