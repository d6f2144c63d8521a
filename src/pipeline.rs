//! Per-face pipeline: vertex stage, homogeneous clipping, fan triangulation and rasterization.

pub mod clip;
pub mod payload;
pub mod raster;

pub use payload::{Interpolated, Payload, Vertex, MAX_VERTEX};

use log::trace;
use serde::{Deserialize, Serialize};

use crate::framebuffer::{Color, DepthBuffer, Framebuffer};
use crate::math::{from_hom_point, to_hom_point, to_hom_vector, AlgebraError, Matrix, Vec3};
use crate::model::Mesh;
use crate::shader::Shader;
use crate::transform::WSign;

/// Which screen space windings get rasterized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Culling {
    /// Only counter-clockwise triangles (in y-up screen space) are drawn.
    #[default]
    Back,
    None,
}

/// Transforms and pipeline switches of one render pass.
#[derive(Debug, Clone)]
pub struct RenderContext {
    pub model: Matrix,         // Model to world.
    pub normal_matrix: Matrix, // Inverse transpose of the model matrix, applied to normals.
    pub mvp: Matrix,           // Projection * View * Model.
    pub viewport: Matrix,      // Applied after the perspective divide.
    pub w_sign: WSign,
    pub culling: Culling,
}

impl RenderContext {
    /// Fails if the model matrix can't be inverted, normals would be meaningless then.
    pub fn new(model: Matrix, view: &Matrix, projection: &Matrix, viewport: Matrix, w_sign: WSign) -> Result<Self, AlgebraError> {
        let normal_matrix = model.inverse()?.transpose();
        let mvp = &(projection * view) * &model;
        return Ok(Self {
            model,
            normal_matrix,
            mvp,
            viewport,
            w_sign,
            culling: Culling::default(),
        });
    }

    pub fn with_culling(mut self, culling: Culling) -> Self {
        self.culling = culling;
        return self;
    }

    /// Model space position to world space.
    pub fn to_world(&self, position: Vec3) -> Vec3 {
        return self.model.transform_point(position);
    }

    /// Model space normal to world space, not normalized.
    pub fn to_world_normal(&self, normal: Vec3) -> Vec3 {
        return self.normal_matrix.transform_vec4(to_hom_vector(normal)).xyz();
    }

    /// Viewport * MVP, maps model space straight to screen space after the divide.
    pub fn screen_transform(&self) -> Matrix {
        return &self.viewport * &self.mvp;
    }
}

/// Draws one face of the shader's mesh: runs the vertex stage for its three corners, clips the
/// result and rasterizes every triangle of the clipped fan.
/// Returns the number of fragments written.
pub fn draw_triangles<S: Shader + ?Sized>(frame: &mut Framebuffer, depth: &mut DepthBuffer, shader: &mut S, face: usize) -> usize {
    shader.state_mut().payload.reset();
    for corner in 0..3 {
        let clip = shader.vertex(face, corner);
        shader.state_mut().payload.stage_clip(corner, clip);
    }

    let w_sign = shader.state().context.w_sign;
    let count = clip::clip_polygon(&mut shader.state_mut().payload, w_sign);
    if count < 3 {
        return 0;
    }

    let mut written = 0;
    for i in 0..count - 2 {
        shader.state_mut().payload.assemble(0, i + 1, i + 2);
        written += raster::rasterize(&*shader, frame, depth);
    }
    return written;
}

/// Draws the edges of every face of `mesh` as lines, without depth test or clipping.
/// Faces with a corner behind the eye, or absurdly far off screen, are skipped.
/// Returns the number of faces drawn.
pub fn draw_wireframe(frame: &mut Framebuffer, mesh: &dyn Mesh, context: &RenderContext, color: Color) -> usize {
    let limit = 8 * frame.width().max(frame.height()) as i32;
    let mut drawn = 0;
    'faces: for face in 0..mesh.face_count() {
        let mut corners = [(0, 0); 3];
        for corner in 0..3 {
            let clip = context.mvp.transform_vec4(to_hom_point(mesh.vertex(face, corner)));
            if context.w_sign.extent(clip.w) <= clip::W_EPSILON {
                trace!("wireframe face {} crosses the eye plane", face);
                continue 'faces;
            }
            let screen = from_hom_point(context.viewport.transform_vec4(clip));
            if !(screen.x.abs() < limit as f32 && screen.y.abs() < limit as f32) {
                continue 'faces;
            }
            corners[corner] = (screen.x as i32, screen.y as i32);
        }
        for k in 0..3 {
            let (a, b) = (corners[k], corners[(k + 1) % 3]);
            frame.draw_line(a.0, a.1, b.0, b.1, color);
        }
        drawn += 1;
    }
    return drawn;
}
