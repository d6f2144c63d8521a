use std::path::PathBuf;

use thiserror::Error;

use crate::math::AlgebraError;

/// Failures of asset loading, scene setup and shader construction.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to decode or encode image: {0}")]
    Image(#[from] image::ImageError),
    #[error("failed to load obj: {0}")]
    Obj(#[from] obj::ObjError),
    #[error("invalid scene config: {0}")]
    Config(#[from] toml::de::Error),
    #[error(transparent)]
    Algebra(#[from] AlgebraError),
    #[error("material has no {0} map")]
    MissingMap(&'static str),
    #[error("invalid environment map at {path}: {reason}")]
    InvalidEnvironment { path: PathBuf, reason: String },
    #[error("invalid mesh: {0}")]
    InvalidMesh(String),
}
