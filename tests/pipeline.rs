use std::collections::HashMap;

use tiny_raster::framebuffer::{Color, DepthBuffer, Framebuffer};
use tiny_raster::math::{Matrix, Vec2, Vec3, Vec4};
use tiny_raster::model::{Mesh, TriangleMesh};
use tiny_raster::pipeline::{draw_triangles, RenderContext};
use tiny_raster::shader::{Shader, ShaderState};
use tiny_raster::transform::{orthographic, view, viewport, Frustum, WSign};

/// Colors every fragment by the dominant axis of its interpolated normal.
struct AxisShader<'a> {
    state: ShaderState,
    mesh: &'a dyn Mesh,
}

impl<'a> Shader for AxisShader<'a> {
    fn vertex(&mut self, face: usize, corner: usize) -> Vec4 {
        return self.state.stage_mesh_corner(self.mesh, face, corner);
    }

    fn fragment(&self, bar: Vec3, _uv: Vec2) -> Option<Color> {
        let n = self.state.payload.interpolate(bar).normal;
        return Some(axis_color(n));
    }

    fn state(&self) -> &ShaderState {
        return &self.state;
    }

    fn state_mut(&mut self) -> &mut ShaderState {
        return &mut self.state;
    }
}

fn axis_color(n: Vec3) -> Color {
    let axis = n.iamax();
    let positive = n[axis] > 0.0;
    return match (axis, positive) {
        (0, true) => Color::new(255, 0, 0),
        (0, false) => Color::new(80, 0, 0),
        (1, true) => Color::new(0, 255, 0),
        (1, false) => Color::new(0, 80, 0),
        (_, true) => Color::new(0, 0, 255),
        (_, false) => Color::new(0, 0, 80),
    };
}

fn render(mesh: &TriangleMesh, context: RenderContext, size: u32) -> (Framebuffer, usize) {
    let mut frame = Framebuffer::new(size, size);
    let mut depth = DepthBuffer::new(size, size);
    let mut shader = AxisShader { state: ShaderState::new(context), mesh };
    let mut written = 0;
    for face in 0..mesh.face_count() {
        written += draw_triangles(&mut frame, &mut depth, &mut shader, face);
    }
    return (frame, written);
}

/// Unit cube around the origin, outward counter-clockwise faces.
fn cube() -> TriangleMesh {
    let sides = [
        (Vec3::x(), Vec3::y(), Vec3::z()),
        (-Vec3::x(), Vec3::z(), Vec3::y()),
        (Vec3::y(), Vec3::z(), Vec3::x()),
        (-Vec3::y(), Vec3::x(), Vec3::z()),
        (Vec3::z(), Vec3::x(), Vec3::y()),
        (-Vec3::z(), Vec3::y(), Vec3::x()),
    ];
    let (mut positions, mut normals, mut uvs, mut indices) = (Vec::new(), Vec::new(), Vec::new(), Vec::new());
    for (n, u, v) in sides {
        let base = positions.len() as u32;
        for (s, t) in [(-0.5, -0.5), (0.5, -0.5), (0.5, 0.5), (-0.5, 0.5)] {
            positions.push(n * 0.5 + u * s + v * t);
            normals.push(n);
            uvs.push(Vec2::new(s + 0.5, t + 0.5));
        }
        indices.extend([base, base + 1, base + 2, base, base + 2, base + 3]);
    }
    return TriangleMesh::new(positions, normals, uvs, indices).unwrap();
}

#[test]
fn orthographic_unit_square_fills_the_frame() {
    let square = TriangleMesh::new(
        vec![
            Vec3::new(-0.5, -0.5, 0.0),
            Vec3::new(0.5, -0.5, 0.0),
            Vec3::new(0.5, 0.5, 0.0),
            Vec3::new(-0.5, 0.5, 0.0),
        ],
        vec![Vec3::z(); 4],
        vec![Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), Vec2::new(1.0, 1.0), Vec2::new(0.0, 1.0)],
        vec![0, 1, 2, 0, 2, 3],
    )
    .unwrap();
    let identity = Matrix::identity(4);
    let projection = orthographic(-0.5, 0.5, -0.5, 0.5, -1.0, 1.0, WSign::Negative);
    let context = RenderContext::new(identity.clone(), &identity, &projection, viewport(100, 100), WSign::Negative).unwrap();

    let (frame, written) = render(&square, context, 100);
    // The shared diagonal belongs to one triangle only.
    assert_eq!(written, 100 * 100);
    for y in 0..100 {
        for x in 0..100 {
            assert_eq!(frame.get(x, y), Color::new(0, 0, 255), "pixel ({}, {})", x, y);
        }
    }
}

#[test]
fn cube_from_the_main_diagonal_shows_three_faces() {
    let mesh = cube();
    let eye = Vec3::new(3.0, 3.0, 3.0);
    let camera = view(Vec3::new(1.0, 1.0, 1.0), eye, Vec3::y());
    let projection = Frustum::symmetric(0.25, 0.25, 1.0, 10.0).perspective();
    let context = RenderContext::new(Matrix::identity(4), &camera, &projection, viewport(64, 64), WSign::Negative).unwrap();

    let (frame, _) = render(&mesh, context, 64);
    let mut histogram: HashMap<[u8; 3], usize> = HashMap::new();
    for pixel in frame.as_image().pixels() {
        if pixel.0 != [0, 0, 0] {
            *histogram.entry(pixel.0).or_insert(0) += 1;
        }
    }
    assert_eq!(histogram.len(), 3, "colors {:?}", histogram);
    for color in [[255, 0, 0], [0, 255, 0], [0, 0, 255]] {
        let count = histogram.get(&color).copied().unwrap_or(0);
        assert!(count > 50, "{:?} covers {} pixels", color, count);
    }
}

#[test]
fn cube_behind_the_camera_draws_nothing() {
    let mesh = cube();
    // Looking away from the cube.
    let camera = view(Vec3::new(0.0, 0.0, -1.0), Vec3::new(0.0, 0.0, 4.0), Vec3::y());
    let projection = Frustum::symmetric(0.5, 0.5, 1.0, 10.0).perspective();
    let context = RenderContext::new(Matrix::identity(4), &camera, &projection, viewport(32, 32), WSign::Negative).unwrap();

    let (frame, written) = render(&mesh, context, 32);
    assert_eq!(written, 0);
    assert!(frame.as_image().pixels().all(|p| p.0 == [0, 0, 0]));
}
