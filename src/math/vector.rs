use std::ops::{Add, Mul, Sub};

use nalgebra as na;
use na::vector;

pub type Vec2 = na::Vector2<f32>;
pub type Vec3 = na::Vector3<f32>;
pub type Vec4 = na::Vector4<f32>;

/// Transformation of a point to homogenous coordinates.
pub fn to_hom_point(v: Vec3) -> Vec4 {
    return vector![v.x, v.y, v.z, 1.0];
}

/// Transformation of a direction to homogenous coordinates.
pub fn to_hom_vector(v: Vec3) -> Vec4 {
    return vector![v.x, v.y, v.z, 0.0];
}

/// Transformation of a point from homogenous coordinates.
/// Undefined for `w == 0`, callers are expected to have clipped such points away.
pub fn from_hom_point(v: Vec4) -> Vec3 {
    return vector![v.x / v.w, v.y / v.w, v.z / v.w];
}

/// Componentwise product of two Vec3's.
pub fn cwise(a: Vec3, b: Vec3) -> Vec3 {
    return a.component_mul(&b);
}

/// Linear interpolation `start + (end - start) * t`, shared by every attribute type of a vertex.
pub fn lerp<T>(start: T, end: T, t: f32) -> T
where
    T: Copy + Add<Output = T> + Sub<Output = T> + Mul<f32, Output = T>,
{
    return start + (end - start) * t;
}
