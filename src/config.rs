//! Scene description read from a TOML file. Every field is optional, missing ones take the
//! defaults of the helmet scene.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use log::info;
use serde::{Deserialize, Serialize};

use crate::error::RenderError;
use crate::math::{Matrix, Vec3};
use crate::pipeline::Culling;
use crate::transform::{view, Frustum, WSign};

/// Lighting model of the color pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShaderKind {
    Depth,
    Shadow,
    Phong,
    #[default]
    Pbr,
    /// Triangle edges only, drawn with Bresenham lines.
    Wireframe,
}

impl FromStr for ShaderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        return match s {
            "depth" => Ok(ShaderKind::Depth),
            "shadow" => Ok(ShaderKind::Shadow),
            "phong" => Ok(ShaderKind::Phong),
            "pbr" => Ok(ShaderKind::Pbr),
            "wireframe" => Ok(ShaderKind::Wireframe),
            _ => Err(format!("unknown shader '{}', expected depth, shadow, phong, pbr or wireframe", s)),
        };
    }
}

impl fmt::Display for ShaderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ShaderKind::Depth => "depth",
            ShaderKind::Shadow => "shadow",
            ShaderKind::Phong => "phong",
            ShaderKind::Pbr => "pbr",
            ShaderKind::Wireframe => "wireframe",
        };
        return write!(f, "{}", name);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub eye: [f32; 3],
    pub direction: [f32; 3], // From the scene towards the eye.
    pub up: [f32; 3],
    pub frustum: Frustum,
}

impl Default for CameraConfig {
    fn default() -> Self {
        return Self {
            eye: [1.1, -0.1, 4.0],
            direction: [0.25, 0.0, 1.0],
            up: [0.0, 1.0, 0.0],
            frustum: Frustum::symmetric(0.3, 0.3, 1.0, 30.0),
        };
    }
}

impl CameraConfig {
    pub fn eye(&self) -> Vec3 {
        return Vec3::from(self.eye);
    }

    pub fn view(&self) -> Matrix {
        return view(Vec3::from(self.direction), self.eye(), Vec3::from(self.up));
    }
}

/// Directional light, also the camera of the shadow pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightConfig {
    pub direction: [f32; 3], // Towards the light.
    pub position: [f32; 3],  // Eye of the shadow pass.
    pub intensity: [f32; 3],
    pub frustum: Frustum,
    pub w_sign: WSign, // Convention of the orthographic shadow projection.
}

impl Default for LightConfig {
    fn default() -> Self {
        return Self {
            direction: [0.0, 0.0, 1.0],
            position: [-4.0, 4.0, 4.0],
            intensity: [2.0, 2.0, 2.0],
            frustum: Frustum::symmetric(8.0, 8.0, 1.0, 30.0),
            w_sign: WSign::Negative,
        };
    }
}

impl LightConfig {
    pub fn direction(&self) -> Vec3 {
        return Vec3::from(self.direction);
    }

    pub fn intensity(&self) -> Vec3 {
        return Vec3::from(self.intensity);
    }

    pub fn view(&self, up: Vec3) -> Matrix {
        return view(self.direction(), Vec3::from(self.position), up);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentConfig {
    pub dir: PathBuf,
    pub mip_levels: usize,
    pub brdf_lut: PathBuf,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        return Self {
            dir: PathBuf::from("obj/common2"),
            mip_levels: 10,
            brdf_lut: PathBuf::from("obj/common/BRDF_LUT.tga"),
        };
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub image: PathBuf,
    /// Visualization of the shadow pass, skipped if absent.
    pub depth: Option<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        return Self {
            image: PathBuf::from("output.tga"),
            depth: Some(PathBuf::from("depth.tga")),
        };
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub width: u32,
    pub height: u32,
    pub model: PathBuf, // Obj file, maps are looked up next to it.
    pub shader: ShaderKind,
    pub culling: Culling,
    pub specular: f32, // Blinn-Phong ks.
    pub camera: CameraConfig,
    pub light: LightConfig,
    pub environment: EnvironmentConfig,
    pub output: OutputConfig,
}

impl Default for SceneConfig {
    fn default() -> Self {
        return Self {
            width: 800,
            height: 800,
            model: PathBuf::from("obj/helmet/helmet.obj"),
            shader: ShaderKind::default(),
            culling: Culling::default(),
            specular: 1.0,
            camera: CameraConfig::default(),
            light: LightConfig::default(),
            environment: EnvironmentConfig::default(),
            output: OutputConfig::default(),
        };
    }
}

impl SceneConfig {
    pub fn from_toml(contents: &str) -> Result<Self, RenderError> {
        return Ok(toml::from_str(contents)?);
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, RenderError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        info!("loaded scene config {}", path.display());
        return Self::from_toml(&contents);
    }

    /// Path prefix of the material maps, the model path without its extension.
    pub fn material_stem(&self) -> PathBuf {
        return self.model.with_extension("");
    }
}
