//! Algebra kernel of the pipeline.
//!
//! Fixed-size vectors are plain `nalgebra` vectors, the transform matrices are the dynamically
//! sized [`Matrix`], which carries its own Gauss-Jordan inverse.

pub mod matrix;
pub mod vector;

pub use matrix::{AlgebraError, Matrix};
pub use vector::{cwise, from_hom_point, lerp, to_hom_point, to_hom_vector, Vec2, Vec3, Vec4};
