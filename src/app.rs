use std::error::Error;

use log::info;
use show_image::{create_window, event, ImageInfo, ImageView, WindowOptions};

use tiny_raster::config::{SceneConfig, ShaderKind};
use tiny_raster::framebuffer::Framebuffer;
use tiny_raster::model::{Material, TriangleMesh};
use tiny_raster::scene;
use tiny_raster::texture::IblMap;

pub struct Params {
    pub config: SceneConfig,
    pub show: bool, // Keep the result in a window until Escape is pressed.
}

/// Helper, defining exit event to be an Escape key press.
fn is_exit_event(window_event: event::WindowEvent) -> bool {
    if let event::WindowEvent::KeyboardInput(event) = window_event {
        if event.input.key_code == Some(event::VirtualKeyCode::Escape) && event.input.state.is_released() {
            return true;
        }
    }

    return false;
}

/// Shows `frame` and blocks until the window is closed or Escape is released.
fn show(frame: &Framebuffer) -> Result<(), Box<dyn Error>> {
    let window_options = WindowOptions {
        size: Some([frame.width(), frame.height()]),
        ..Default::default()
    };
    let window = create_window("output", window_options)?;
    let event_channel = window.event_channel()?;

    let image_data = ImageView::new(ImageInfo::rgb8(frame.width(), frame.height()), frame.as_image().as_raw());
    window.set_image("image", image_data)?;

    for window_event in event_channel.iter() {
        if is_exit_event(window_event) {
            break;
        }
    }
    return Ok(());
}

/// Loads the assets named by the config, renders both passes and writes the images out.
pub fn run(params: Params) -> Result<(), Box<dyn Error>> {
    let config = &params.config;
    let mesh = TriangleMesh::load_obj(&config.model)?;
    let material = Material::load(config.material_stem())?;
    // Only the pbr shader reads the environment, it's the slowest thing to load.
    let environment = match config.shader {
        ShaderKind::Pbr => Some(IblMap::load(&config.environment.dir, config.environment.mip_levels, &config.environment.brdf_lut)?),
        _ => None,
    };

    let rendered = scene::render(config, &mesh, &material, environment)?;

    if let Some(path) = &config.output.depth {
        rendered.shadow.save(path)?;
        info!("wrote light depth pass to {}", path.display());
    }
    rendered.image.save(&config.output.image)?;
    info!("wrote {} render to {}", config.shader, config.output.image.display());

    if params.show {
        show(&rendered.image)?;
    }
    return Ok(());
}
