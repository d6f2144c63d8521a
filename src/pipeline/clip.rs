//! Homogeneous Sutherland-Hodgman clipping against the canonical view volume.

use log::trace;

use super::payload::{Payload, Vertex, MAX_VERTEX};
use crate::math::Vec4;
use crate::transform::WSign;

/// Vertices closer than this to the w = 0 plane are dropped before the perspective divide.
pub const W_EPSILON: f32 = 1e-5;

/// Clip planes in the order they are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipPlane {
    W,
    Right,
    Left,
    Top,
    Bottom,
    Near,
    Far,
}

impl ClipPlane {
    pub const ALL: [ClipPlane; 7] = [
        ClipPlane::W,
        ClipPlane::Right,
        ClipPlane::Left,
        ClipPlane::Top,
        ClipPlane::Bottom,
        ClipPlane::Near,
        ClipPlane::Far,
    ];

    /// Signed distance of `v` to the plane, positive on the visible side.
    /// Linear in the homogeneous coordinates, which is what makes the intersection ratio exact.
    pub fn distance(self, v: Vec4, w_sign: WSign) -> f32 {
        let extent = w_sign.extent(v.w);
        return match self {
            ClipPlane::W => extent - W_EPSILON,
            ClipPlane::Right => extent - v.x,
            ClipPlane::Left => extent + v.x,
            ClipPlane::Top => extent - v.y,
            ClipPlane::Bottom => extent + v.y,
            ClipPlane::Near => extent - v.z,
            ClipPlane::Far => extent + v.z,
        };
    }

    /// Points on the boundary count as inside, except for the w plane, which has to keep them
    /// strictly away from zero.
    pub fn is_inside(self, v: Vec4, w_sign: WSign) -> bool {
        let distance = self.distance(v, w_sign);
        return match self {
            ClipPlane::W => distance > 0.0,
            _ => distance >= 0.0,
        };
    }

    /// Parameter of the crossing point along the segment from `previous` to `current`.
    pub fn intersect_ratio(self, previous: Vec4, current: Vec4, w_sign: WSign) -> f32 {
        let d_previous = self.distance(previous, w_sign);
        let d_current = self.distance(current, w_sign);
        return d_previous / (d_previous - d_current);
    }
}

/// One Sutherland-Hodgman pass of `polygon` against `plane`, written into `out`.
/// Returns the vertex count of the clipped polygon.
pub fn clip_with_plane(plane: ClipPlane, polygon: &[Vertex], out: &mut [Vertex; MAX_VERTEX], w_sign: WSign) -> usize {
    let n = polygon.len();
    let mut count = 0;
    let mut emit = |vertex: Vertex, count: &mut usize| {
        // A triangle can't gain more than one vertex per plane of a convex volume.
        debug_assert!(*count < MAX_VERTEX, "clipped polygon exceeds {} vertices", MAX_VERTEX);
        out[*count] = vertex;
        *count += 1;
    };

    for current_index in 0..n {
        let previous_index = (current_index + n - 1) % n;
        let current = &polygon[current_index];
        let previous = &polygon[previous_index];
        let current_inside = plane.is_inside(current.clip, w_sign);
        let previous_inside = plane.is_inside(previous.clip, w_sign);

        if current_inside != previous_inside {
            let ratio = plane.intersect_ratio(previous.clip, current.clip, w_sign);
            emit(previous.lerp(current, ratio), &mut count);
        }
        if current_inside {
            emit(*current, &mut count);
        }
    }
    return count;
}

/// Clips the payload polygon against all planes. Returns the final vertex count, anything
/// below 3 means the primitive is gone.
pub fn clip_polygon(payload: &mut Payload, w_sign: WSign) -> usize {
    for plane in ClipPlane::ALL {
        payload.apply(|polygon, out| clip_with_plane(plane, polygon, out, w_sign));
        if payload.len() < 3 {
            trace!("primitive clipped away by the {:?} plane", plane);
            return payload.len();
        }
    }
    return payload.len();
}
