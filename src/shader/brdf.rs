//! Cook-Torrance building blocks and tone mapping.

use std::f32::consts::PI;

use crate::math::Vec3;

/// Reflectance of dielectrics at normal incidence.
pub const DIELECTRIC_F0: f32 = 0.04;

/// GGX / Trowbridge-Reitz normal distribution.
pub fn ggx_distribution(n_dot_h: f32, roughness: f32) -> f32 {
    let alpha = roughness * roughness;
    let alpha_2 = alpha * alpha;
    let factor = n_dot_h * n_dot_h * (alpha_2 - 1.0) + 1.0;
    return alpha_2 / (PI * factor * factor);
}

/// Schlick-GGX geometry term for direct lighting, k = (r + 1)^2 / 8.
pub fn schlick_ggx_geometry(n_dot_v: f32, roughness: f32) -> f32 {
    let r = roughness + 1.0;
    let k = r * r / 8.0;
    return n_dot_v / (n_dot_v * (1.0 - k) + k);
}

/// Smith's method, shadowing and masking combined.
pub fn smith_geometry(n_dot_v: f32, n_dot_l: f32, roughness: f32) -> f32 {
    return schlick_ggx_geometry(n_dot_v, roughness) * schlick_ggx_geometry(n_dot_l, roughness);
}

pub fn fresnel_schlick(h_dot_v: f32, f0: Vec3) -> Vec3 {
    return f0 + (Vec3::repeat(1.0) - f0) * (1.0 - h_dot_v).max(0.0).powi(5);
}

/// Schlick's Fresnel with the grazing reflectance damped by roughness, for ambient lighting.
pub fn fresnel_schlick_roughness(n_dot_v: f32, f0: Vec3, roughness: f32) -> Vec3 {
    let grazing = (1.0 - roughness).max(f0.x);
    return f0 + (Vec3::repeat(grazing) - f0) * (1.0 - n_dot_v).max(0.0).powi(5);
}

/// Base reflectance of a surface, metals tint it with their albedo.
pub fn base_reflectance(albedo: Vec3, metalness: f32) -> Vec3 {
    return Vec3::repeat(DIELECTRIC_F0).lerp(&albedo, metalness);
}

/// ACES filmic curve fit, clamped to [0, 1].
pub fn aces(x: f32) -> f32 {
    let value = (x * (2.51 * x + 0.03)) / (x * (2.43 * x + 0.59) + 0.14);
    return value.clamp(0.0, 1.0);
}

/// ACES per channel followed by gamma 1/2.2.
pub fn tone_map(color: Vec3) -> Vec3 {
    return color.map(|c| aces(c).powf(1.0 / 2.2));
}
