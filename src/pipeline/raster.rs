//! Scanline-free triangle rasterization over the payload's active triangle.

use log::trace;

use super::Culling;
use crate::framebuffer::{DepthBuffer, Framebuffer};
use crate::math::{from_hom_point, Vec2, Vec3};
use crate::shader::Shader;

/// Screen space areas below this are treated as degenerate.
const AREA_EPSILON: f32 = 1e-8;

/// Twice the signed area of (a, b, p), positive when p lies left of a -> b in y-up screen space.
pub fn edge_function(a: Vec2, b: Vec2, p: Vec2) -> f32 {
    return (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x);
}

/// Top or left edge of a counter-clockwise triangle in y-up screen space.
/// Samples lying exactly on such an edge belong to the triangle, samples on the other edges don't.
fn is_top_left(a: Vec2, b: Vec2) -> bool {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    return dy < 0.0 || (dy == 0.0 && dx < 0.0);
}

/// Barycentric weights of `p` in the counter-clockwise triangle `v`, `None` when outside.
pub fn barycentric(v: &[Vec2; 3], area: f32, p: Vec2) -> Option<Vec3> {
    let edges = [(v[1], v[2]), (v[2], v[0]), (v[0], v[1])];
    let mut weights = Vec3::zeros();
    for (i, (a, b)) in edges.iter().enumerate() {
        let w = edge_function(*a, *b, p);
        if w < 0.0 || (w == 0.0 && !is_top_left(*a, *b)) {
            return None;
        }
        weights[i] = w / area;
    }
    return Some(weights);
}

/// Rasterizes the active triangle of the shader's payload into `frame` and `depth`.
/// Returns the number of fragments written.
pub fn rasterize<S: Shader + ?Sized>(shader: &S, frame: &mut Framebuffer, depth: &mut DepthBuffer) -> usize {
    // Simple local bounding box struct for convenience.
    struct BoundingBox {
        x_min: u32,
        y_min: u32,
        x_max: u32,
        y_max: u32,
    }

    debug_assert!(frame.width() == depth.width() && frame.height() == depth.height());
    let state = shader.state();
    let context = &state.context;
    let triangle = state.payload.triangle();

    // Screen space positions, the perspective divide happens here.
    let screen: [Vec3; 3] = [
        from_hom_point(context.viewport.transform_vec4(triangle[0].clip)),
        from_hom_point(context.viewport.transform_vec4(triangle[1].clip)),
        from_hom_point(context.viewport.transform_vec4(triangle[2].clip)),
    ];
    let mut area = edge_function(screen[0].xy(), screen[1].xy(), screen[2].xy());
    if !area.is_finite() || area.abs() < AREA_EPSILON {
        return 0;
    }

    // Corner order used for the edge tests, kept counter-clockwise.
    let mut order = [0, 1, 2];
    if area < 0.0 {
        match context.culling {
            Culling::Back => {
                trace!("back facing triangle culled");
                return 0;
            }
            Culling::None => {
                order = [0, 2, 1];
                area = -area;
            }
        }
    }
    let corners = [screen[order[0]].xy(), screen[order[1]].xy(), screen[order[2]].xy()];

    let (width, height) = (frame.width(), frame.height());
    if width == 0 || height == 0 {
        return 0;
    }
    let x_lo = corners.iter().fold(f32::MAX, |m, c| m.min(c.x));
    let x_hi = corners.iter().fold(f32::MIN, |m, c| m.max(c.x));
    let y_lo = corners.iter().fold(f32::MAX, |m, c| m.min(c.y));
    let y_hi = corners.iter().fold(f32::MIN, |m, c| m.max(c.y));
    if x_hi < 0.0 || y_hi < 0.0 || x_lo >= width as f32 || y_lo >= height as f32 {
        return 0;
    }
    let bbox = BoundingBox {
        x_min: x_lo.floor().max(0.0) as u32,
        y_min: y_lo.floor().max(0.0) as u32,
        x_max: (x_hi.ceil() as u32).min(width - 1),
        y_max: (y_hi.ceil() as u32).min(height - 1),
    };

    let clip_w = Vec3::new(triangle[0].clip.w, triangle[1].clip.w, triangle[2].clip.w);
    let ndc_z = Vec3::new(screen[0].z, screen[1].z, screen[2].z);
    let mut written = 0;
    for y in bbox.y_min..=bbox.y_max {
        for x in bbox.x_min..=bbox.x_max {
            let sample = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
            let ordered = match barycentric(&corners, area, sample) {
                Some(weights) => weights,
                None => continue,
            };
            // Back to the payload's corner order.
            let mut screen_bar = Vec3::zeros();
            for k in 0..3 {
                screen_bar[order[k]] = ordered[k];
            }

            let z = screen_bar.dot(&ndc_z);
            let bar = screen_bar.component_div(&clip_w);
            let bar = bar / bar.sum();
            if !z.is_finite() || !bar.iter().all(|b| b.is_finite()) {
                continue;
            }
            if !depth.passes(x, y, z) {
                continue;
            }

            let uv = triangle[0].uv * bar.x + triangle[1].uv * bar.y + triangle[2].uv * bar.z;
            if let Some(color) = shader.fragment(bar, uv) {
                depth.set(x, y, z);
                frame.set(x as i32, y as i32, color);
                written += 1;
            }
        }
    }
    return written;
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn edge_function_sign_follows_winding() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(4.0, 0.0);
        assert!(edge_function(a, b, Vec2::new(1.0, 1.0)) > 0.0);
        assert!(edge_function(a, b, Vec2::new(1.0, -1.0)) < 0.0);
        assert_eq!(edge_function(a, b, Vec2::new(7.0, 0.0)), 0.0);
    }

    #[test]
    fn barycentric_weights_sum_to_one() {
        let v = [Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0), Vec2::new(0.0, 10.0)];
        let area = edge_function(v[0], v[1], v[2]);
        for (x, y) in [(1.5, 1.5), (3.25, 5.5), (0.5, 8.5), (7.0, 2.0)] {
            let bar = barycentric(&v, area, Vec2::new(x, y)).unwrap();
            assert!(bar.iter().all(|b| *b >= 0.0));
            assert_relative_eq!(bar.sum(), 1.0, epsilon = 1e-6);
        }
        assert!(barycentric(&v, area, Vec2::new(8.0, 8.0)).is_none());
    }

    #[test]
    fn shared_edge_belongs_to_exactly_one_triangle() {
        // Two triangles of a square split along its diagonal, sample right on the diagonal.
        let lower = [Vec2::new(0.0, 0.0), Vec2::new(4.0, 0.0), Vec2::new(4.0, 4.0)];
        let upper = [Vec2::new(0.0, 0.0), Vec2::new(4.0, 4.0), Vec2::new(0.0, 4.0)];
        let p = Vec2::new(2.0, 2.0);
        let in_lower = barycentric(&lower, edge_function(lower[0], lower[1], lower[2]), p).is_some();
        let in_upper = barycentric(&upper, edge_function(upper[0], upper[1], upper[2]), p).is_some();
        assert!(in_lower != in_upper);

        // Same for a horizontal shared edge.
        let below = [Vec2::new(0.0, 0.0), Vec2::new(4.0, 2.0), Vec2::new(0.0, 2.0)];
        let above = [Vec2::new(0.0, 2.0), Vec2::new(4.0, 2.0), Vec2::new(2.0, 4.0)];
        let q = Vec2::new(1.0, 2.0);
        let in_below = barycentric(&below, edge_function(below[0], below[1], below[2]), q).is_some();
        let in_above = barycentric(&above, edge_function(above[0], above[1], above[2]), q).is_some();
        assert!(in_below != in_above);
    }
}
