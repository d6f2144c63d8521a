use super::{perturb_normal, Light, Shader, ShaderState, ShadowMap};
use crate::error::RenderError;
use crate::framebuffer::Color;
use crate::math::{cwise, Vec2, Vec3, Vec4};
use crate::model::{Material, Mesh};
use crate::pipeline::RenderContext;
use crate::texture::Texture;

pub const SPECULAR_EXPONENT: f32 = 5.0;

/// Blinn-Phong with optional normal map and shadow map.
pub struct PhongShader<'a> {
    state: ShaderState,
    mesh: &'a dyn Mesh,
    material: &'a Material,
    diffuse: &'a Texture,
    light: Light,
    eye: Vec3,
    pub ambient: Vec3,           // ka
    pub ambient_intensity: Vec3, // Intensity of the ambient light.
    pub specular: Vec3,          // ks
    shadow: Option<ShadowMap<'a>>,
}

impl<'a> PhongShader<'a> {
    pub fn new(context: RenderContext, mesh: &'a dyn Mesh, material: &'a Material, light: Light, eye: Vec3) -> Result<Self, RenderError> {
        let diffuse = material.require_diffuse()?;
        return Ok(Self {
            state: ShaderState::new(context),
            mesh,
            material,
            diffuse,
            light,
            eye,
            ambient: Vec3::repeat(1.0),
            ambient_intensity: Vec3::repeat(0.5),
            specular: Vec3::repeat(1.0),
            shadow: None,
        });
    }

    pub fn with_shadow(mut self, shadow: ShadowMap<'a>) -> Self {
        self.shadow = Some(shadow);
        return self;
    }

    pub fn with_specular(mut self, specular: Vec3) -> Self {
        self.specular = specular;
        return self;
    }
}

impl<'a> Shader for PhongShader<'a> {
    fn vertex(&mut self, face: usize, corner: usize) -> Vec4 {
        return self.state.stage_mesh_corner(self.mesh, face, corner);
    }

    fn fragment(&self, bar: Vec3, uv: Vec2) -> Option<Color> {
        let fragment = self.state.payload.interpolate(bar);
        let mut normal = fragment.normal;
        if let Some(sample) = self.material.normal(uv) {
            normal = perturb_normal(normal, self.state.payload.triangle(), sample);
        }
        // A zero normal can't be lit, drop the fragment.
        let n = normal.try_normalize(f32::EPSILON)?;
        let l = self.light.direction;
        let v = (self.eye - fragment.world).try_normalize(f32::EPSILON).unwrap_or(l);
        let h = (l + v).try_normalize(f32::EPSILON).unwrap_or(n);

        let kd = self.diffuse.sample(uv);
        let n_dot_l = n.dot(&l);
        let ambient = cwise(self.ambient, cwise(self.ambient_intensity, kd));
        let diffuse = cwise(kd, self.light.intensity) * n_dot_l.max(0.0);
        let specular = cwise(self.specular, self.light.intensity) * n.dot(&h).max(0.0).powf(SPECULAR_EXPONENT);
        let color = (ambient + diffuse + specular).map(|c| c.clamp(0.0, 1.0));

        let factor = match &self.shadow {
            Some(shadow) => shadow.factor(fragment.world, 0.015 * (1.0 - n_dot_l)),
            None => 1.0,
        };
        return Some(Color::from_unit(color * factor));
    }

    fn state(&self) -> &ShaderState {
        return &self.state;
    }

    fn state_mut(&mut self) -> &mut ShaderState {
        return &mut self.state;
    }
}
