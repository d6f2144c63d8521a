mod app;

use std::env;
use std::path::PathBuf;

use tiny_raster::config::{SceneConfig, ShaderKind};

/// Value following the flag at `i`.
fn flag_value(args: &[String], i: usize) -> Result<&str, String> {
    return args.get(i + 1).map(|value| value.as_str()).ok_or_else(|| format!("{} expects a value", args[i]));
}

#[show_image::main]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Default values, flags given on the command line override the config file.
    let mut config_path: Option<PathBuf> = None;
    let mut model: Option<PathBuf> = None;
    let mut shader: Option<ShaderKind> = None;
    let mut output: Option<PathBuf> = None;
    let mut show = false;

    let args: Vec<String> = env::args().collect();
    for i in 1..args.len() {
        match args[i].as_str() {
            "-c" => { config_path = Some(PathBuf::from(flag_value(&args, i)?)); }
            "-m" => { model = Some(PathBuf::from(flag_value(&args, i)?)); }
            "-s" => { shader = Some(flag_value(&args, i)?.parse::<ShaderKind>()?); }
            "-o" => { output = Some(PathBuf::from(flag_value(&args, i)?)); }
            "--show" => { show = true; }
            _ => ()
        }
    }

    let mut config = match config_path {
        Some(path) => SceneConfig::load(path)?,
        None => SceneConfig::default(),
    };
    if let Some(model) = model {
        config.model = model;
    }
    if let Some(shader) = shader {
        config.shader = shader;
    }
    if let Some(output) = output {
        config.output.image = output;
    }

    app::run(app::Params { config, show })?;

    return Ok(());
}
