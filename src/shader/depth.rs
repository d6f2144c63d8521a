use super::{Shader, ShaderState};
use crate::framebuffer::Color;
use crate::math::{Vec2, Vec3, Vec4};
use crate::model::Mesh;
use crate::pipeline::RenderContext;

/// Grey level from world space z, [-1, 1] maps onto [0, 255].
/// Used for the pass from the light, whose depth buffer becomes the shadow map.
pub struct DepthShader<'a> {
    state: ShaderState,
    mesh: &'a dyn Mesh,
}

impl<'a> DepthShader<'a> {
    pub fn new(context: RenderContext, mesh: &'a dyn Mesh) -> Self {
        return Self { state: ShaderState::new(context), mesh };
    }
}

impl<'a> Shader for DepthShader<'a> {
    fn vertex(&mut self, face: usize, corner: usize) -> Vec4 {
        return self.state.stage_mesh_corner(self.mesh, face, corner);
    }

    fn fragment(&self, bar: Vec3, _uv: Vec2) -> Option<Color> {
        let world = self.state.payload.interpolate(bar).world;
        let level = ((1.0 + world.z) / 2.0 * 255.0).clamp(0.0, 255.0);
        return Some(Color::grey(level as u8));
    }

    fn state(&self) -> &ShaderState {
        return &self.state;
    }

    fn state_mut(&mut self) -> &mut ShaderState {
        return &mut self.state;
    }
}
