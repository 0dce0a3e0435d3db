use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("cannot parse {var}={value:?}")]
    Invalid { var: &'static str, value: String },
}

/// get environment variable CI, which is true for GitHub Action
pub fn is_ci() -> bool {
    option_env!("CI").unwrap_or_default() == "true"
}

#[derive(Clone, Debug, PartialEq)]
pub struct RenderConfig {
    pub width: usize,
    pub height: usize,
    pub samples_per_pixel: usize,
    pub max_depth: usize,
    pub tile_size: usize,
    /// Worker threads in the pool.
    pub workers: usize,
    /// Makes renders reproducible when set, except inside `ConstantMedium`
    /// fog, which samples free-flight distances from the thread-local
    /// generator.
    pub seed: Option<u64>,
    pub scene: usize,
    pub output: PathBuf,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            samples_per_pixel: 64,
            max_depth: 50,
            tile_size: 32,
            workers: num_cpus::get().max(1),
            seed: None,
            scene: 0,
            output: PathBuf::from("output.ppm"),
        }
    }
}

lazy_static! {
    /// Base settings before environment overrides. CI runners get a small
    /// image and two workers.
    pub static ref CONFIGS: RenderConfig = if is_ci() {
        RenderConfig {
            width: 320,
            height: 180,
            samples_per_pixel: 8,
            workers: 2,
            ..RenderConfig::default()
        }
    } else {
        RenderConfig::default()
    };
}

fn parse<T: FromStr>(var: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid { var, value })
}

impl RenderConfig {
    /// `CONFIGS` with the `PT_*` environment variables applied.
    pub fn from_env() -> Result<Self, ConfigError> {
        CONFIGS
            .clone()
            .with_overrides(|var| std::env::var(var).ok())
    }

    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("PT_WIDTH") {
            self.width = parse("PT_WIDTH", v)?;
        }
        if let Some(v) = lookup("PT_HEIGHT") {
            self.height = parse("PT_HEIGHT", v)?;
        }
        if let Some(v) = lookup("PT_SPP") {
            self.samples_per_pixel = parse("PT_SPP", v)?;
        }
        if let Some(v) = lookup("PT_DEPTH") {
            self.max_depth = parse("PT_DEPTH", v)?;
        }
        if let Some(v) = lookup("PT_TILE") {
            self.tile_size = parse("PT_TILE", v)?;
        }
        if let Some(v) = lookup("PT_WORKERS") {
            self.workers = parse("PT_WORKERS", v)?;
        }
        if let Some(v) = lookup("PT_SEED") {
            self.seed = Some(parse("PT_SEED", v)?);
        }
        if let Some(v) = lookup("PT_SCENE") {
            self.scene = parse("PT_SCENE", v)?;
        }
        if let Some(v) = lookup("PT_OUTPUT") {
            self.output = PathBuf::from(v);
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let checks = [
            ("width", self.width),
            ("height", self.height),
            ("samples_per_pixel", self.samples_per_pixel),
            ("max_depth", self.max_depth),
            ("tile_size", self.tile_size),
            ("workers", self.workers),
        ];
        match checks.iter().find(|(_, value)| *value == 0) {
            Some((name, _)) => Err(ConfigError::Zero(*name)),
            None => Ok(()),
        }
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.width as f64 / self.height as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| map.get(var).cloned()
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = RenderConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!((config.width, config.height), (1280, 720));
        assert_eq!(config.max_depth, 50);
        assert_eq!(config.tile_size, 32);
        assert!(config.workers >= 1);
        assert_eq!(CONFIGS.validate(), Ok(()));
    }

    #[test]
    fn test_overrides() {
        let config = RenderConfig::default()
            .with_overrides(lookup(&[
                ("PT_WIDTH", "64"),
                ("PT_HEIGHT", " 48 "),
                ("PT_SEED", "7"),
                ("PT_OUTPUT", "out/cornell.png"),
            ]))
            .unwrap();
        assert_eq!((config.width, config.height), (64, 48));
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.output, PathBuf::from("out/cornell.png"));
        assert_eq!(config.samples_per_pixel, 64);
    }

    #[test]
    fn test_bad_values() {
        assert_eq!(
            RenderConfig::default().with_overrides(lookup(&[("PT_SPP", "many")])),
            Err(ConfigError::Invalid {
                var: "PT_SPP",
                value: "many".to_string()
            })
        );
        assert_eq!(
            RenderConfig::default().with_overrides(lookup(&[("PT_TILE", "0")])),
            Err(ConfigError::Zero("tile_size"))
        );
    }
}
