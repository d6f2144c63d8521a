use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;

use log::{debug, info};
use threadpool::ThreadPool;

use super::{Cubemap, Texture};
use crate::error::RenderError;

/// Precomputed environment lighting: diffuse irradiance, specular maps prefiltered for
/// increasing roughness and the split-sum BRDF lookup table.
#[derive(Debug, Clone)]
pub struct IblMap {
    irradiance: Cubemap,
    prefilter: Vec<Cubemap>, // Never empty, index 0 is the sharpest.
    brdf_lut: Texture,
}

impl IblMap {
    pub fn new(irradiance: Cubemap, prefilter: Vec<Cubemap>, brdf_lut: Texture) -> Result<IblMap, RenderError> {
        if prefilter.is_empty() {
            return Err(RenderError::InvalidEnvironment {
                path: PathBuf::new(),
                reason: String::from("no prefiltered specular maps"),
            });
        }
        return Ok(IblMap { irradiance, prefilter, brdf_lut });
    }

    /// Loads `{dir}/i_{face}.tga` and `{dir}/m{level}_{face}.tga` for levels `0..mip_levels`,
    /// plus the lookup table at `brdf_lut`.
    ///
    /// Cubemaps are decoded in parallel on a thread pool, one job per cubemap.
    pub fn load<P: AsRef<Path>, Q: AsRef<Path>>(dir: P, mip_levels: usize, brdf_lut: Q) -> Result<IblMap, RenderError> {
        let dir = dir.as_ref().to_path_buf();
        if mip_levels == 0 {
            return Err(RenderError::InvalidEnvironment { path: dir, reason: String::from("mip_levels must be positive") });
        }

        // Slot 0 is the irradiance map, slot i + 1 is prefilter level i.
        let prefixes: Vec<String> = std::iter::once(String::from("i_"))
            .chain((0..mip_levels).map(|level| format!("m{}_", level)))
            .collect();
        let n_jobs = prefixes.len();
        let n_workers = thread::available_parallelism().map(|n| n.get()).unwrap_or(4).min(n_jobs);
        debug!("loading {} cubemaps from {} on {} threads", n_jobs, dir.display(), n_workers);

        let pool = ThreadPool::new(n_workers);
        let (sender, receiver) = mpsc::channel();
        for (slot, prefix) in prefixes.into_iter().enumerate() {
            let sender = sender.clone();
            let dir = dir.clone();
            pool.execute(move || {
                let cubemap = Cubemap::from_dir(&dir, &prefix);
                // The receiver only goes away once loading has already failed.
                let _ = sender.send((slot, cubemap));
            });
        }
        drop(sender);

        let mut slots: Vec<Option<Cubemap>> = vec![None; n_jobs];
        for (slot, cubemap) in receiver.iter() {
            slots[slot] = Some(cubemap?);
        }
        let mut cubemaps = Vec::with_capacity(n_jobs);
        for (slot, cubemap) in slots.into_iter().enumerate() {
            match cubemap {
                Some(cubemap) => cubemaps.push(cubemap),
                None => {
                    return Err(RenderError::InvalidEnvironment {
                        path: dir,
                        reason: format!("loader of cubemap {} did not finish", slot),
                    })
                }
            }
        }

        let prefilter = cubemaps.split_off(1);
        let irradiance = cubemaps.remove(0);
        let brdf_lut = Texture::from_file(brdf_lut)?;
        info!("loaded environment {} with {} specular levels", dir.display(), prefilter.len());
        return IblMap::new(irradiance, prefilter, brdf_lut);
    }

    pub fn irradiance(&self) -> &Cubemap {
        return &self.irradiance;
    }

    pub fn brdf_lut(&self) -> &Texture {
        return &self.brdf_lut;
    }

    pub fn mip_levels(&self) -> usize {
        return self.prefilter.len();
    }

    /// Prefiltered map closest to `roughness`, which is clamped to [0, 1].
    pub fn prefilter(&self, roughness: f32) -> &Cubemap {
        let max_level = (self.prefilter.len() - 1) as f32;
        let level = (roughness.clamp(0.0, 1.0) * max_level).round() as usize;
        return &self.prefilter[level];
    }
}
