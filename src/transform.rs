//! Builders for the view, projection and viewport matrices.
//!
//! Clip space follows the negative-w convention: the perspective matrix puts `w = z_view`, which
//! is negative for everything in front of the camera, and the near plane lands on NDC z = +1
//! while the far plane lands on NDC z = -1. Vertices are taken through
//! `Viewport * Projection * View * Model`, in that order.

use serde::{Deserialize, Serialize};

use crate::math::{Matrix, Vec3};

/// Sign of the homogeneous w produced by a projection for visible points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WSign {
    /// Visible points have `w < 0`, clip tests compare against `-w`.
    #[default]
    Negative,
    /// Visible points have `w > 0`, clip tests compare against `w`.
    Positive,
}

impl WSign {
    /// Turns a clip-space w into the positive extent of the view volume at that point.
    pub fn extent(self, w: f32) -> f32 {
        return match self {
            WSign::Negative => -w,
            WSign::Positive => w,
        };
    }
}

/// View volume bounds. `near` and `far` are positive distances along the viewing direction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Frustum {
    pub left: f32,
    pub right: f32,
    pub bottom: f32,
    pub top: f32,
    pub near: f32,
    pub far: f32,
}

impl Frustum {
    /// Symmetric frustum around the viewing axis.
    pub fn symmetric(half_width: f32, half_height: f32, near: f32, far: f32) -> Self {
        return Self {
            left: -half_width,
            right: half_width,
            bottom: -half_height,
            top: half_height,
            near,
            far,
        };
    }

    pub fn perspective(&self) -> Matrix {
        return perspective(self.left, self.right, self.bottom, self.top, self.near, self.far);
    }

    pub fn orthographic(&self, w_sign: WSign) -> Matrix {
        return orthographic(self.left, self.right, self.bottom, self.top, self.near, self.far, w_sign);
    }
}

/// Camera matrix from an orthonormal basis built with Gram-Schmidt.
///
/// `direction` points from the scene towards the eye, so in view space the camera looks down -z.
pub fn view(direction: Vec3, eye: Vec3, up: Vec3) -> Matrix {
    let forward = direction.normalize();
    let right = up.cross(&forward).normalize();
    let true_up = forward.cross(&right).normalize();

    let mut rotation = Matrix::identity(4);
    let mut translation = Matrix::identity(4);
    for i in 0..3 {
        rotation[(0, i)] = right[i];
        rotation[(1, i)] = true_up[i];
        rotation[(2, i)] = forward[i];
        translation[(i, 3)] = -eye[i];
    }
    return &rotation * &translation;
}

/// Perspective projection of the frustum `[l, r] x [b, t]` at distance `n`, clipped at `f`.
pub fn perspective(l: f32, r: f32, b: f32, t: f32, n: f32, f: f32) -> Matrix {
    let mut m = Matrix::new(4, 4);
    m[(0, 0)] = -2.0 * n / (r - l);
    m[(0, 2)] = (r + l) / (l - r);
    m[(1, 1)] = -2.0 * n / (t - b);
    m[(1, 2)] = (t + b) / (b - t);
    m[(2, 2)] = -(f + n) / (f - n);
    m[(2, 3)] = -2.0 * f * n / (f - n);
    // w = z_view.
    m[(3, 2)] = 1.0;
    return m;
}

/// Orthographic projection of the box `[l, r] x [b, t] x [-f, -n]` onto the canonical cube.
///
/// The homogeneous w is fixed to -1 or +1 depending on `w_sign`, the NDC result is the same in
/// both cases.
pub fn orthographic(l: f32, r: f32, b: f32, t: f32, n: f32, f: f32, w_sign: WSign) -> Matrix {
    let sign = match w_sign {
        WSign::Negative => -1.0,
        WSign::Positive => 1.0,
    };
    let mut m = Matrix::new(4, 4);
    m[(0, 0)] = sign * 2.0 / (r - l);
    m[(0, 3)] = sign * (r + l) / (l - r);
    m[(1, 1)] = sign * 2.0 / (t - b);
    m[(1, 3)] = sign * (t + b) / (b - t);
    m[(2, 2)] = sign * 2.0 / (f - n);
    m[(2, 3)] = sign * (f + n) / (f - n);
    m[(3, 3)] = sign;
    return m;
}

/// Maps NDC `[-1, 1]^2` onto `[0, width] x [0, height]`, origin in the bottom left corner.
/// Depth passes through untouched.
pub fn viewport(width: u32, height: u32) -> Matrix {
    let w = width as f32;
    let h = height as f32;
    let mut m = Matrix::identity(4);
    m[(0, 0)] = w / 2.0;
    m[(0, 3)] = w / 2.0;
    m[(1, 1)] = h / 2.0;
    m[(1, 3)] = h / 2.0;
    return m;
}
