//! The 3D noise volume sampled by the planet shader.
//!
//! A volume is a cube of single-channel bytes, x fastest then y then z,
//! which is also the layout of the raw files [`NoiseFile`] reads.

use std::fs;
use std::io;
use std::path::PathBuf;

use noise::{NoiseFn, Simplex};
use thiserror::Error;

pub const MIN_NOISE_SIZE: u32 = 2;
pub const MAX_NOISE_SIZE: u32 = 256;
pub const DEFAULT_NOISE_SIZE: u32 = 64;

#[derive(Debug, Error)]
pub enum TextureLoadError {
    #[error("failed to read noise volume {}", .path.display())]
    Io {
        path:   PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("noise volume is empty")]
    Empty,
    #[error("noise volume of {len} bytes is not a cube")]
    NotCubic { len: usize },
    #[error("noise volume edge {size} is outside {min}..={max}", min = MIN_NOISE_SIZE, max = MAX_NOISE_SIZE)]
    SizeOutOfRange { size: u32 },
    #[error("noise volume edge {size} exceeds the device's 3D texture limit of {max}")]
    ExceedsDevice { size: u32, max: u32 },
}

/// Cubic R8 volume.
#[derive(Debug, Clone, PartialEq)]
pub struct NoiseVolume {
    size: u32,
    data: Vec<u8>,
}

impl NoiseVolume {
    /// Wraps `data`, inferring the edge length from its size.
    pub fn from_raw(data: Vec<u8>) -> Result<Self, TextureLoadError> {
        if data.is_empty() {
            return Err(TextureLoadError::Empty);
        }
        let len = data.len();
        let size = cube_root(len).ok_or(TextureLoadError::NotCubic { len })?;
        check_size(size)?;
        Ok(Self { size, data })
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Checks the edge against a device's `max_texture_dimension_3d`.
    pub fn fits(&self, max_edge: u32) -> Result<(), TextureLoadError> {
        if self.size > max_edge {
            return Err(TextureLoadError::ExceedsDevice { size: self.size, max: max_edge });
        }
        Ok(())
    }

    /// Texel at integer coordinates, wrapping like a repeat sampler.
    pub fn texel(&self, x: u32, y: u32, z: u32) -> u8 {
        let n = self.size;
        let i = (z % n) * n * n + (y % n) * n + (x % n);
        self.data[i as usize]
    }
}

fn cube_root(len: usize) -> Option<u32> {
    let guess = (len as f64).cbrt().round() as usize;
    (guess.checked_pow(3) == Some(len)).then_some(guess as u32)
}

fn check_size(size: u32) -> Result<(), TextureLoadError> {
    if (MIN_NOISE_SIZE..=MAX_NOISE_SIZE).contains(&size) {
        Ok(())
    } else {
        Err(TextureLoadError::SizeOutOfRange { size })
    }
}

/// Where a noise volume comes from.
pub trait NoiseSource {
    /// Short description for logs.
    fn describe(&self) -> String;

    fn load(&self) -> Result<NoiseVolume, TextureLoadError>;
}

/// Raw volume on disk.
#[derive(Debug, Clone)]
pub struct NoiseFile {
    path: PathBuf,
}

impl NoiseFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl NoiseSource for NoiseFile {
    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }

    fn load(&self) -> Result<NoiseVolume, TextureLoadError> {
        let data = fs::read(&self.path).map_err(|source| TextureLoadError::Io { path: self.path.clone(), source })?;
        NoiseVolume::from_raw(data)
    }
}

/// Simplex fBm baked into a volume, deterministic per seed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeneratedNoise {
    pub size:    u32,
    pub seed:    u32,
    pub octaves: u32,
}

impl Default for GeneratedNoise {
    fn default() -> Self {
        Self { size: DEFAULT_NOISE_SIZE, seed: 0, octaves: 4 }
    }
}

impl GeneratedNoise {
    pub fn new(size: u32, seed: u32) -> Self {
        Self { size, seed, ..Self::default() }
    }

    fn fbm(&self, simplex: &Simplex, p: [f64; 3]) -> f64 {
        let mut total = 0.0;
        let mut amplitude = 0.5;
        let mut frequency = 4.0 / self.size as f64;
        for _ in 0..self.octaves {
            total += simplex.get([p[0] * frequency, p[1] * frequency, p[2] * frequency]) * amplitude;
            frequency *= 2.0;
            amplitude *= 0.5;
        }
        total
    }
}

impl NoiseSource for GeneratedNoise {
    fn describe(&self) -> String {
        format!("generated {}^3 seed {}", self.size, self.seed)
    }

    fn load(&self) -> Result<NoiseVolume, TextureLoadError> {
        check_size(self.size)?;
        let simplex = Simplex::new(self.seed);
        let n = self.size as usize;
        let mut data = Vec::with_capacity(n * n * n);
        for z in 0..n {
            for y in 0..n {
                for x in 0..n {
                    let v = self.fbm(&simplex, [x as f64, y as f64, z as f64]);
                    data.push(((v * 0.5 + 0.5).clamp(0.0, 1.0) * 255.0).round() as u8);
                }
            }
        }
        Ok(NoiseVolume { size: self.size, data })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── raw volumes ───────────────────────────────────────────────────────

    #[test]
    fn raw_cube_infers_size() {
        let v = NoiseVolume::from_raw((0..27).collect()).unwrap();
        assert_eq!(v.size(), 3);
        assert_eq!(v.texel(1, 0, 0), 1);
        assert_eq!(v.texel(0, 1, 0), 3);
        assert_eq!(v.texel(0, 0, 1), 9);
        assert_eq!(v.texel(3, 0, 0), 0);
    }

    #[test]
    fn raw_rejects_bad_lengths() {
        assert!(matches!(NoiseVolume::from_raw(Vec::new()), Err(TextureLoadError::Empty)));
        assert!(matches!(NoiseVolume::from_raw(vec![0; 10]), Err(TextureLoadError::NotCubic { len: 10 })));
        assert!(matches!(NoiseVolume::from_raw(vec![0; 1]), Err(TextureLoadError::SizeOutOfRange { size: 1 })));
    }

    #[test]
    fn volume_larger_than_the_device_is_a_texture_failure() {
        let v = NoiseVolume::from_raw(vec![0; 64]).unwrap();
        assert!(v.fits(4).is_ok());
        let err = v.fits(2).unwrap_err();
        assert!(matches!(err, TextureLoadError::ExceedsDevice { size: 4, max: 2 }));

        let err = crate::StartupError::from(err);
        assert_eq!(err.stage(), "texture");
        assert!(err.to_string().contains("limit of 2"));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = NoiseFile::new("/definitely/not/here.raw").load().unwrap_err();
        assert!(matches!(err, TextureLoadError::Io { .. }));
        assert!(err.to_string().contains("/definitely/not/here.raw"));
    }

    #[test]
    fn file_round_trips_through_disk() {
        let path = std::env::temp_dir().join(format!("terra-noise-{}.raw", std::process::id()));
        fs::write(&path, vec![7u8; 8]).unwrap();
        let v = NoiseFile::new(&path).load();
        let _ = fs::remove_file(&path);
        let v = v.unwrap();
        assert_eq!(v.size(), 2);
        assert!(v.data().iter().all(|b| *b == 7));
    }

    // ── generated volumes ─────────────────────────────────────────────────

    #[test]
    fn generation_is_deterministic_per_seed() {
        let a = GeneratedNoise::new(8, 1).load().unwrap();
        let b = GeneratedNoise::new(8, 1).load().unwrap();
        let c = GeneratedNoise::new(8, 2).load().unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.data().len(), 512);
    }

    #[test]
    fn generated_values_vary() {
        let v = GeneratedNoise::new(16, 3).load().unwrap();
        let min = v.data().iter().min().copied().unwrap();
        let max = v.data().iter().max().copied().unwrap();
        assert!(max - min > 32);
    }

    #[test]
    fn generation_checks_size() {
        assert!(matches!(GeneratedNoise::new(1, 0).load(), Err(TextureLoadError::SizeOutOfRange { size: 1 })));
        assert!(matches!(GeneratedNoise::new(512, 0).load(), Err(TextureLoadError::SizeOutOfRange { size: 512 })));
    }
}
