//! Configuration system
//!
//! Engine settings are plain serde structs that can be loaded from and saved
//! to TOML or RON files. The format is picked from the file extension.

pub use serde::{Serialize, Deserialize};
use std::path::Path;

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;

        match ConfigFormat::from_path(path)? {
            ConfigFormat::Toml => toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string())),
            ConfigFormat::Ron => ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string())),
        }
    }

    /// Save configuration to file
    fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let contents = match ConfigFormat::from_path(path)? {
            ConfigFormat::Toml => {
                toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
            }
            ConfigFormat::Ron => ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?,
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfigFormat {
    Toml,
    Ron,
}

impl ConfigFormat {
    fn from_path(path: &Path) -> Result<Self, ConfigError> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(Self::Toml),
            Some("ron") => Ok(Self::Ron),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// A value is outside its accepted range
    #[error("Invalid value for '{key}': {reason}")]
    InvalidValue {
        /// Offending key
        key: &'static str,
        /// What is wrong with it
        reason: String,
    },
}

/// Runtime settings shared by the scene and the engine loop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum number of lights packed into a rendering context per frame
    pub max_dynamic_lights: usize,
    /// Maximum entity depth a lifecycle message may descend before the
    /// dispatcher gives up on that branch
    pub max_dispatch_depth: usize,
    /// Render target size in pixels (width, height)
    pub render_target: (u32, u32),
    /// Simulation step handed to `update` by the engine loop, in seconds
    pub fixed_timestep: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_dynamic_lights: 8,
            max_dispatch_depth: 256,
            render_target: (800, 600),
            fixed_timestep: 1.0 / 60.0,
        }
    }
}

impl Config for EngineConfig {}

impl EngineConfig {
    /// Set the maximum number of dynamic lights
    pub fn with_max_dynamic_lights(mut self, count: usize) -> Self {
        self.max_dynamic_lights = count;
        self
    }

    /// Set the maximum dispatch depth
    pub fn with_max_dispatch_depth(mut self, depth: usize) -> Self {
        self.max_dispatch_depth = depth;
        self
    }

    /// Set the render target size
    pub fn with_render_target(mut self, width: u32, height: u32) -> Self {
        self.render_target = (width, height);
        self
    }

    /// Set the fixed timestep
    pub fn with_fixed_timestep(mut self, seconds: f32) -> Self {
        self.fixed_timestep = seconds;
        self
    }

    /// Aspect ratio of the render target
    pub fn aspect_ratio(&self) -> f32 {
        let (width, height) = self.render_target;
        if height == 0 {
            1.0
        } else {
            width as f32 / height as f32
        }
    }

    /// Check that every value is usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_dispatch_depth == 0 {
            return Err(ConfigError::InvalidValue {
                key: "max_dispatch_depth",
                reason: "must be at least 1".to_string(),
            });
        }
        if !(self.fixed_timestep.is_finite() && self.fixed_timestep > 0.0) {
            return Err(ConfigError::InvalidValue {
                key: "fixed_timestep",
                reason: format!("must be a positive number of seconds, got {}", self.fixed_timestep),
            });
        }
        let (width, height) = self.render_target;
        if width == 0 || height == 0 {
            return Err(ConfigError::InvalidValue {
                key: "render_target",
                reason: format!("must be non-empty, got {width}x{height}"),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.max_dynamic_lights, 8);
        assert_eq!(config.max_dispatch_depth, 256);
        assert_eq!(config.render_target, (800, 600));
        assert_relative_eq!(config.fixed_timestep, 1.0 / 60.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_falls_back_to_defaults() {
        let config: EngineConfig = toml::from_str("max_dynamic_lights = 2\n").unwrap();
        assert_eq!(config.max_dynamic_lights, 2);
        assert_eq!(config.max_dispatch_depth, 256);
    }

    #[test]
    fn test_validate_rejects_zero_depth_and_bad_timestep() {
        assert!(matches!(
            EngineConfig::default().with_max_dispatch_depth(0).validate(),
            Err(ConfigError::InvalidValue { key: "max_dispatch_depth", .. })
        ));
        assert!(matches!(
            EngineConfig::default().with_fixed_timestep(-1.0).validate(),
            Err(ConfigError::InvalidValue { key: "fixed_timestep", .. })
        ));
    }

    #[test]
    fn test_save_and_load_ron() {
        let path = std::env::temp_dir().join(format!("scene_engine_config_{}.ron", std::process::id()));
        let config = EngineConfig::default().with_render_target(1024, 768);

        config.save_to_file(&path).unwrap();
        let loaded = EngineConfig::load_from_file(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(loaded.render_target, (1024, 768));
    }

    #[test]
    fn test_unsupported_extension() {
        let result = EngineConfig::default().save_to_file("engine.yaml");
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
    }
}
