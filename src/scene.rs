//! The whole frame: a depth pass from the light fills the shadow map, then the color pass draws
//! the model from the camera with the configured shader.

use log::debug;

use crate::config::{SceneConfig, ShaderKind};
use crate::error::RenderError;
use crate::framebuffer::{Color, DepthBuffer, Framebuffer};
use crate::math::{Matrix, Vec3};
use crate::model::{Material, Mesh};
use crate::pipeline::{draw_triangles, draw_wireframe, Culling, RenderContext};
use crate::shader::{DepthShader, Light, PbrShader, PhongShader, Shader, ShadowMap, ShadowShader};
use crate::texture::IblMap;
use crate::transform::{viewport, WSign};

/// Both images of a rendered scene.
pub struct Rendered {
    pub image: Framebuffer,
    pub shadow: Framebuffer, // Depth pass seen from the light, world z as grey levels.
}

/// Runs every face of the shader's mesh through the pipeline, returns the fragments written.
pub fn draw_mesh(frame: &mut Framebuffer, depth: &mut DepthBuffer, shader: &mut dyn Shader, face_count: usize) -> usize {
    let mut written = 0;
    for face in 0..face_count {
        written += draw_triangles(frame, depth, shader, face);
    }
    return written;
}

fn missing_environment(config: &SceneConfig) -> RenderError {
    return RenderError::InvalidEnvironment {
        path: config.environment.dir.clone(),
        reason: String::from("environment maps were not loaded"),
    };
}

/// Renders `mesh` as described by `config`.
/// `environment` is only read by the pbr shader, which fails without it. Missing inputs of the
/// selected shader are reported before any face is drawn.
pub fn render(config: &SceneConfig, mesh: &dyn Mesh, material: &Material, environment: Option<IblMap>) -> Result<Rendered, RenderError> {
    match config.shader {
        ShaderKind::Shadow | ShaderKind::Phong => {
            material.require_diffuse()?;
        }
        ShaderKind::Pbr => {
            material.require_diffuse()?;
            if environment.is_none() {
                return Err(missing_environment(config));
            }
        }
        ShaderKind::Depth | ShaderKind::Wireframe => (),
    }

    let (width, height) = (config.width, config.height);
    let model = Matrix::identity(4);
    let up = Vec3::from(config.camera.up);

    // Light pass. Nothing is culled, back faces still cast shadows.
    let light_view = config.light.view(up);
    let light_projection = config.light.frustum.orthographic(config.light.w_sign);
    let light_context = RenderContext::new(model.clone(), &light_view, &light_projection, viewport(width, height), config.light.w_sign)?
        .with_culling(Culling::None);
    let world_to_light = &(&light_context.viewport * &light_projection) * &light_view;

    let mut shadow_frame = Framebuffer::new(width, height);
    let mut shadow_depth = DepthBuffer::new(width, height);
    let written = draw_mesh(&mut shadow_frame, &mut shadow_depth, &mut DepthShader::new(light_context, mesh), mesh.face_count());
    debug!("light pass: {} faces, {} fragments", mesh.face_count(), written);

    // Camera pass.
    let projection = config.camera.frustum.perspective();
    let context = RenderContext::new(model, &config.camera.view(), &projection, viewport(width, height), WSign::Negative)?
        .with_culling(config.culling);
    let light = Light::new(config.light.direction(), config.light.intensity());
    let eye = config.camera.eye();

    let mut frame = Framebuffer::new(width, height);
    let mut depth = DepthBuffer::new(width, height);
    let faces = mesh.face_count();
    let written = match config.shader {
        ShaderKind::Depth => draw_mesh(&mut frame, &mut depth, &mut DepthShader::new(context, mesh), faces),
        ShaderKind::Shadow => {
            let shadow = ShadowMap::new(&shadow_depth, world_to_light);
            let mut shader = ShadowShader::new(context, mesh, material, shadow)?;
            draw_mesh(&mut frame, &mut depth, &mut shader, faces)
        }
        ShaderKind::Phong => {
            let shadow = ShadowMap::new(&shadow_depth, world_to_light);
            let mut shader = PhongShader::new(context, mesh, material, light, eye)?
                .with_specular(Vec3::repeat(config.specular))
                .with_shadow(shadow);
            draw_mesh(&mut frame, &mut depth, &mut shader, faces)
        }
        ShaderKind::Pbr => {
            let ibl = environment.ok_or_else(|| missing_environment(config))?;
            let mut shader = PbrShader::new(context, mesh, material, ibl, eye)?.with_light(light);
            draw_mesh(&mut frame, &mut depth, &mut shader, faces)
        }
        ShaderKind::Wireframe => draw_wireframe(&mut frame, mesh, &context, Color::WHITE),
    };
    debug!("{} pass: {} faces, {} written", config.shader, faces, written);

    return Ok(Rendered { image: frame, shadow: shadow_frame });
}
