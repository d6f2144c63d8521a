use std::f32::consts::PI;

use super::brdf::{base_reflectance, fresnel_schlick, fresnel_schlick_roughness, ggx_distribution, smith_geometry, tone_map};
use super::{perturb_normal, Light, Shader, ShaderState};
use crate::error::RenderError;
use crate::framebuffer::Color;
use crate::math::{cwise, Vec2, Vec3, Vec4};
use crate::model::{Material, Mesh};
use crate::pipeline::RenderContext;
use crate::texture::{IblMap, Texture};

/// Lower bound of n.v for the ambient terms, keeps grazing fragments from going black.
const MIN_N_DOT_V: f32 = 0.1;

/// Cook-Torrance metallic-roughness shading lit by an environment and an optional directional
/// light, tone mapped with ACES and gamma corrected.
pub struct PbrShader<'a> {
    state: ShaderState,
    mesh: &'a dyn Mesh,
    material: &'a Material,
    albedo: &'a Texture,
    ibl: IblMap,
    light: Option<Light>,
    eye: Vec3,
}

impl<'a> PbrShader<'a> {
    pub fn new(context: RenderContext, mesh: &'a dyn Mesh, material: &'a Material, ibl: IblMap, eye: Vec3) -> Result<Self, RenderError> {
        let albedo = material.require_diffuse()?;
        return Ok(Self {
            state: ShaderState::new(context),
            mesh,
            material,
            albedo,
            ibl,
            light: None,
            eye,
        });
    }

    pub fn with_light(mut self, light: Light) -> Self {
        self.light = Some(light);
        return self;
    }

    /// Radiance reflected towards `v` from the directional light.
    fn direct(&self, light: &Light, n: Vec3, v: Vec3, albedo: Vec3, f0: Vec3, roughness: f32, metalness: f32) -> Vec3 {
        let l = light.direction;
        let n_dot_l = n.dot(&l).max(0.0);
        if n_dot_l <= 0.0 {
            return Vec3::zeros();
        }
        let h = (l + v).try_normalize(f32::EPSILON).unwrap_or(n);
        let n_dot_v = n.dot(&v).max(0.0);
        let n_dot_h = n.dot(&h).max(0.0);
        let h_dot_v = h.dot(&v).max(0.0);

        let d = ggx_distribution(n_dot_h, roughness);
        let g = smith_geometry(n_dot_v, n_dot_l, roughness);
        let f = fresnel_schlick(h_dot_v, f0);
        let k_d = (Vec3::repeat(1.0) - f) * (1.0 - metalness);

        let specular = f * (d * g / (4.0 * n_dot_l * n_dot_v + 1e-4));
        return cwise(cwise(k_d, albedo) / PI + specular, light.intensity) * n_dot_l;
    }

    /// Split-sum image based lighting, before occlusion.
    fn ambient(&self, n: Vec3, v: Vec3, albedo: Vec3, f0: Vec3, roughness: f32, metalness: f32) -> Vec3 {
        let n_dot_v = n.dot(&v).max(MIN_N_DOT_V);
        let f = fresnel_schlick_roughness(n_dot_v, f0, roughness);
        let k_d = (Vec3::repeat(1.0) - f) * (1.0 - metalness);

        // Maps are stored gamma encoded, squaring is the cheap approximation of decoding.
        let irradiance = self.ibl.irradiance().sample(n).map(|c| c * c);
        let diffuse = cwise(cwise(irradiance, k_d), albedo);

        let r = (n * (2.0 * v.dot(&n)) - v).try_normalize(f32::EPSILON).unwrap_or(n);
        let lut = self.ibl.brdf_lut().sample_clamped(Vec2::new(n_dot_v, roughness));
        let prefiltered = self.ibl.prefilter(roughness).sample(r).map(|c| c * c);
        let specular = cwise(prefiltered, f0 * lut.x + Vec3::repeat(lut.y));
        return diffuse + specular;
    }
}

impl<'a> Shader for PbrShader<'a> {
    fn vertex(&mut self, face: usize, corner: usize) -> Vec4 {
        return self.state.stage_mesh_corner(self.mesh, face, corner);
    }

    fn fragment(&self, bar: Vec3, uv: Vec2) -> Option<Color> {
        let fragment = self.state.payload.interpolate(bar);
        let mut normal = fragment.normal;
        if let Some(sample) = self.material.normal(uv) {
            normal = perturb_normal(normal, self.state.payload.triangle(), sample);
        }
        let n = normal.try_normalize(f32::EPSILON)?;
        let v = (self.eye - fragment.world).try_normalize(f32::EPSILON).unwrap_or(n);

        let roughness = self.material.roughness(uv);
        let metalness = self.material.metalness(uv);
        let albedo = self.albedo.sample(uv);
        let f0 = base_reflectance(albedo, metalness);

        let mut color = self.ambient(n, v, albedo, f0, roughness, metalness) * self.material.occlusion(uv);
        if let Some(light) = &self.light {
            color += self.direct(light, n, v, albedo, f0, roughness, metalness);
        }
        color += self.material.emission(uv);
        return Some(Color::from_unit(tone_map(color)));
    }

    fn state(&self) -> &ShaderState {
        return &self.state;
    }

    fn state_mut(&mut self) -> &mut ShaderState {
        return &mut self.state;
    }
}
