//! Geometry and surface maps consumed by the shaders.

use std::ffi::OsString;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use log::{info, warn};
use obj::{load_obj, Obj, TexturedVertex};

use crate::error::RenderError;
use crate::math::{Vec2, Vec3};
use crate::texture::Texture;

/// Source of per-corner vertex attributes, faces are triangles.
pub trait Mesh {
    fn face_count(&self) -> usize;
    fn vertex(&self, face: usize, corner: usize) -> Vec3;
    fn uv(&self, face: usize, corner: usize) -> Vec2;
    fn normal(&self, face: usize, corner: usize) -> Vec3;
}

/// Indexed triangle list with one position, normal and uv per vertex.
#[derive(Debug, Clone)]
pub struct TriangleMesh {
    positions: Vec<Vec3>,
    normals: Vec<Vec3>,
    uvs: Vec<Vec2>,
    indices: Vec<u32>, // Three per face.
}

impl TriangleMesh {
    pub fn new(positions: Vec<Vec3>, normals: Vec<Vec3>, uvs: Vec<Vec2>, indices: Vec<u32>) -> Result<Self, RenderError> {
        if normals.len() != positions.len() || uvs.len() != positions.len() {
            return Err(RenderError::InvalidMesh(format!(
                "{} positions, {} normals and {} uvs",
                positions.len(),
                normals.len(),
                uvs.len()
            )));
        }
        if indices.len() % 3 != 0 {
            return Err(RenderError::InvalidMesh(format!("{} indices don't make whole triangles", indices.len())));
        }
        if let Some(index) = indices.iter().find(|i| **i as usize >= positions.len()) {
            return Err(RenderError::InvalidMesh(format!("index {} out of {} vertices", index, positions.len())));
        }
        return Ok(Self { positions, normals, uvs, indices });
    }

    /// Loads a triangulated obj file with normals and texture coordinates.
    pub fn load_obj<P: AsRef<Path>>(path: P) -> Result<Self, RenderError> {
        let path = path.as_ref();
        let model: Obj<TexturedVertex, u32> = load_obj(BufReader::new(File::open(path)?))?;
        info!("loaded {}: {} vertices, {} faces", path.display(), model.vertices.len(), model.indices.len() / 3);

        let positions = model.vertices.iter().map(|v| Vec3::from(v.position)).collect();
        let normals = model.vertices.iter().map(|v| Vec3::from(v.normal)).collect();
        let uvs = model.vertices.iter().map(|v| Vec2::new(v.texture[0], v.texture[1])).collect();
        return Self::new(positions, normals, uvs, model.indices);
    }

    fn index(&self, face: usize, corner: usize) -> usize {
        return self.indices[3 * face + corner] as usize;
    }
}

impl Mesh for TriangleMesh {
    fn face_count(&self) -> usize {
        return self.indices.len() / 3;
    }

    fn vertex(&self, face: usize, corner: usize) -> Vec3 {
        return self.positions[self.index(face, corner)];
    }

    fn uv(&self, face: usize, corner: usize) -> Vec2 {
        return self.uvs[self.index(face, corner)];
    }

    fn normal(&self, face: usize, corner: usize) -> Vec3 {
        return self.normals[self.index(face, corner)];
    }
}

/// Surface maps of a model. Everything but the diffuse map is optional and has a neutral default.
#[derive(Debug, Clone, Default)]
pub struct Material {
    pub diffuse: Option<Texture>,
    pub normal: Option<Texture>, // Tangent space normals.
    pub roughness: Option<Texture>,
    pub metalness: Option<Texture>,
    pub occlusion: Option<Texture>,
    pub emission: Option<Texture>,
}

impl Material {
    pub fn with_diffuse(diffuse: Texture) -> Self {
        return Self { diffuse: Some(diffuse), ..Default::default() };
    }

    /// Looks for `{stem}_diffuse.tga`, `{stem}_normal_tangent.tga`, `{stem}_roughness.tga`,
    /// `{stem}_metalness.tga`, `{stem}_occlusion.tga` and `{stem}_emission.tga`.
    /// Absent files leave the map empty, files that fail to decode are errors.
    pub fn load<P: AsRef<Path>>(stem: P) -> Result<Self, RenderError> {
        let stem = stem.as_ref();
        let load_map = |suffix: &str| -> Result<Option<Texture>, RenderError> {
            let path = map_path(stem, suffix);
            if !path.exists() {
                warn!("{} not found, using the default {} map", path.display(), suffix.trim_start_matches('_'));
                return Ok(None);
            }
            return Ok(Some(Texture::from_file(&path)?));
        };
        return Ok(Self {
            diffuse: load_map("_diffuse")?,
            normal: load_map("_normal_tangent")?,
            roughness: load_map("_roughness")?,
            metalness: load_map("_metalness")?,
            occlusion: load_map("_occlusion")?,
            emission: load_map("_emission")?,
        });
    }

    /// The diffuse map, shaders that can't work without it call this from their constructor.
    pub fn require_diffuse(&self) -> Result<&Texture, RenderError> {
        return self.diffuse.as_ref().ok_or(RenderError::MissingMap("diffuse"));
    }

    /// Albedo at `uv`, black without a diffuse map.
    pub fn diffuse(&self, uv: Vec2) -> Vec3 {
        return self.diffuse.as_ref().map_or(Vec3::zeros(), |map| map.sample(uv));
    }

    /// Tangent space normal sample in [0, 1], `None` without a normal map.
    pub fn normal(&self, uv: Vec2) -> Option<Vec3> {
        return self.normal.as_ref().map(|map| map.sample(uv));
    }

    pub fn roughness(&self, uv: Vec2) -> f32 {
        return self.roughness.as_ref().map_or(1.0, |map| map.sample(uv).x);
    }

    pub fn metalness(&self, uv: Vec2) -> f32 {
        return self.metalness.as_ref().map_or(0.0, |map| map.sample(uv).x);
    }

    pub fn occlusion(&self, uv: Vec2) -> f32 {
        return self.occlusion.as_ref().map_or(1.0, |map| map.sample(uv).x);
    }

    pub fn emission(&self, uv: Vec2) -> Vec3 {
        return self.emission.as_ref().map_or(Vec3::zeros(), |map| map.sample(uv));
    }
}

fn map_path(stem: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(stem.as_os_str());
    name.push(suffix);
    name.push(".tga");
    return PathBuf::from(name);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framebuffer::Color;
    use approx::assert_relative_eq;

    fn quad() -> TriangleMesh {
        let positions = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ];
        let normals = vec![Vec3::z(); 4];
        let uvs = vec![Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), Vec2::new(1.0, 1.0), Vec2::new(0.0, 1.0)];
        return TriangleMesh::new(positions, normals, uvs, vec![0, 1, 2, 0, 2, 3]).unwrap();
    }

    #[test]
    fn mesh_looks_up_attributes_by_face_and_corner() {
        let mesh = quad();
        assert_eq!(mesh.face_count(), 2);
        assert_eq!(mesh.vertex(1, 2), Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(mesh.uv(0, 1), Vec2::new(1.0, 0.0));
        assert_eq!(mesh.normal(1, 0), Vec3::z());
    }

    #[test]
    fn malformed_meshes_are_rejected() {
        let p = vec![Vec3::zeros(); 3];
        let n = vec![Vec3::z(); 3];
        let uv = vec![Vec2::zeros(); 3];
        assert!(TriangleMesh::new(p.clone(), n.clone(), uv.clone(), vec![0, 1]).is_err());
        assert!(TriangleMesh::new(p.clone(), n.clone(), uv.clone(), vec![0, 1, 3]).is_err());
        assert!(TriangleMesh::new(p, vec![Vec3::z(); 2], uv, vec![0, 1, 2]).is_err());
    }

    #[test]
    fn material_defaults_are_neutral() {
        let material = Material::default();
        let uv = Vec2::new(0.2, 0.4);
        assert!(matches!(material.require_diffuse(), Err(RenderError::MissingMap("diffuse"))));
        assert_relative_eq!(material.roughness(uv), 1.0);
        assert_relative_eq!(material.metalness(uv), 0.0);
        assert_relative_eq!(material.occlusion(uv), 1.0);
        assert_relative_eq!(material.emission(uv), Vec3::zeros());
        assert!(material.normal(uv).is_none());

        let material = Material::with_diffuse(Texture::solid(Color::WHITE));
        assert!(material.require_diffuse().is_ok());
        assert_relative_eq!(material.diffuse(uv), Vec3::repeat(1.0));
    }

    #[test]
    fn map_paths_append_suffix_to_stem() {
        assert_eq!(map_path(Path::new("obj/helmet/helmet"), "_diffuse"), PathBuf::from("obj/helmet/helmet_diffuse.tga"));
    }

    #[test]
    fn missing_material_files_leave_maps_empty() {
        let material = Material::load("definitely/not/here/model").unwrap();
        assert!(material.diffuse.is_none() && material.emission.is_none());
    }
}
