//! Studio settings read from the environment.

use std::path::PathBuf;

use terra_planet::noise::{DEFAULT_NOISE_SIZE, MAX_NOISE_SIZE, MIN_NOISE_SIZE};
use terra_planet::{GeneratedNoise, NoiseFile, NoiseSource};

pub const NOISE_TEXTURE_VAR: &str = "TERRA_NOISE_TEXTURE";
pub const NOISE_SIZE_VAR: &str = "TERRA_NOISE_SIZE";
pub const NOISE_SEED_VAR: &str = "TERRA_NOISE_SEED";
pub const LOG_VAR: &str = "TERRA_LOG";

#[derive(Debug, Clone, PartialEq)]
pub enum NoiseChoice {
    File(PathBuf),
    Generated(GeneratedNoise),
}

#[derive(Debug, Clone)]
pub struct StudioConfig {
    pub title:      String,
    pub width:      f64,
    pub height:     f64,
    pub noise:      NoiseChoice,
    /// `env_logger` filter; `None` leaves the engine default.
    pub log_filter: Option<String>,
    /// Problems found while reading the environment. Logged once the logger
    /// exists, which is after the config is read.
    pub warnings:   Vec<String>,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            title:      "terra".to_string(),
            width:      1280.0,
            height:     720.0,
            noise:      NoiseChoice::Generated(GeneratedNoise::default()),
            log_filter: None,
            warnings:   Vec::new(),
        }
    }
}

impl StudioConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through `lookup`. Invalid values keep the default and
    /// leave a warning behind.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        let var = |key: &str| lookup(key).map(|v| v.trim().to_owned()).filter(|v| !v.is_empty());

        config.log_filter = var(LOG_VAR);

        if let Some(path) = var(NOISE_TEXTURE_VAR) {
            config.noise = NoiseChoice::File(PathBuf::from(path));
            return config;
        }

        let mut generated = GeneratedNoise::default();
        if let Some(raw) = var(NOISE_SIZE_VAR) {
            match raw.parse::<u32>() {
                Ok(size) if (MIN_NOISE_SIZE..=MAX_NOISE_SIZE).contains(&size) => generated.size = size,
                _ => config.warnings.push(format!(
                    "{NOISE_SIZE_VAR}={raw:?} is not a size in {MIN_NOISE_SIZE}..={MAX_NOISE_SIZE}; using {DEFAULT_NOISE_SIZE}"
                )),
            }
        }
        if let Some(raw) = var(NOISE_SEED_VAR) {
            match raw.parse::<u32>() {
                Ok(seed) => generated.seed = seed,
                Err(_) => config.warnings.push(format!("{NOISE_SEED_VAR}={raw:?} is not a seed; using 0")),
            }
        }
        config.noise = NoiseChoice::Generated(generated);
        config
    }

    pub fn noise_source(&self) -> Box<dyn NoiseSource> {
        match &self.noise {
            NoiseChoice::File(path) => Box::new(NoiseFile::new(path.clone())),
            NoiseChoice::Generated(g) => Box::new(*g),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> StudioConfig {
        let map: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        StudioConfig::from_lookup(|k| map.get(k).cloned())
    }

    #[test]
    fn empty_environment_generates_default_noise() {
        let c = config(&[]);
        assert_eq!(c.noise, NoiseChoice::Generated(GeneratedNoise::default()));
        assert_eq!(c.log_filter, None);
        assert!(c.warnings.is_empty());
    }

    #[test]
    fn texture_path_wins_over_generation_settings() {
        let c = config(&[(NOISE_TEXTURE_VAR, "/tmp/noise.raw"), (NOISE_SIZE_VAR, "nonsense")]);
        assert_eq!(c.noise, NoiseChoice::File(PathBuf::from("/tmp/noise.raw")));
        assert!(c.warnings.is_empty());
        assert!(c.noise_source().describe().contains("/tmp/noise.raw"));
    }

    #[test]
    fn size_and_seed_are_parsed() {
        let c = config(&[(NOISE_SIZE_VAR, "32"), (NOISE_SEED_VAR, " 7 "), (LOG_VAR, "debug")]);
        assert_eq!(c.noise, NoiseChoice::Generated(GeneratedNoise { size: 32, seed: 7, ..GeneratedNoise::default() }));
        assert_eq!(c.log_filter.as_deref(), Some("debug"));
    }

    #[test]
    fn invalid_values_fall_back_with_warnings() {
        let c = config(&[(NOISE_SIZE_VAR, "1"), (NOISE_SEED_VAR, "-3")]);
        assert_eq!(c.noise, NoiseChoice::Generated(GeneratedNoise::default()));
        assert_eq!(c.warnings.len(), 2);
        assert!(c.warnings[0].contains(NOISE_SIZE_VAR));
    }

    #[test]
    fn blank_values_are_unset() {
        let c = config(&[(NOISE_TEXTURE_VAR, "  "), (LOG_VAR, "")]);
        assert_eq!(c.noise, NoiseChoice::Generated(GeneratedNoise::default()));
        assert_eq!(c.log_filter, None);
    }
}
