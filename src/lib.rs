//! Software rasterizer: homogeneous clipping, perspective-correct barycentric rasterization with a
//! depth buffer, and pluggable shaders from a plain depth visualization up to image based PBR.

pub mod config;
pub mod error;
pub mod framebuffer;
pub mod math;
pub mod model;
pub mod pipeline;
pub mod scene;
pub mod shader;
pub mod texture;
pub mod transform;

pub use error::RenderError;
pub use framebuffer::{Color, DepthBuffer, Framebuffer};
pub use model::{Material, Mesh, TriangleMesh};
pub use pipeline::{draw_triangles, Culling, RenderContext};
pub use shader::Shader;
