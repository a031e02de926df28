//! Engine configuration
//!
//! TOML-backed configuration for the window, shader paths, and camera.
//! Every field has a sensible default so applications can run without a
//! config file at all.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Configuration loading errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not valid TOML
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Window creation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Window title
    pub title: String,
    /// Initial window width in pixels
    pub width: u32,
    /// Initial window height in pixels
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Viewer".to_string(),
            width: 1920,
            height: 1080,
        }
    }
}

/// Paths to the precompiled SPIR-V modules for the default pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShaderConfig {
    /// Path to the vertex shader SPIR-V file
    pub vertex_shader_path: String,
    /// Path to the fragment shader SPIR-V file
    pub fragment_shader_path: String,
}

impl Default for ShaderConfig {
    fn default() -> Self {
        Self {
            vertex_shader_path: "shaders/default.vert.spv".to_string(),
            fragment_shader_path: "shaders/default.frag.spv".to_string(),
        }
    }
}

/// Initial camera settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees
    pub fov: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self { fov: 70.0 }
    }
}

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Window creation settings
    pub window: WindowConfig,
    /// Shader module paths
    pub shaders: ShaderConfig,
    /// Initial camera settings
    pub camera: CameraConfig,
}

impl EngineConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Load configuration from a TOML file, falling back to defaults.
    ///
    /// A missing or malformed file is not an error: the condition is
    /// logged and the default configuration is returned.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path.as_ref()) {
            Ok(config) => config,
            Err(err) => {
                log::warn!(
                    "Could not load config from {}: {} (using defaults)",
                    path.as_ref().display(),
                    err
                );
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.window.width, 1920);
        assert_eq!(config.window.height, 1080);
        assert_eq!(config.shaders.vertex_shader_path, "shaders/default.vert.spv");
        assert!((config.camera.fov - 70.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: EngineConfig = toml::from_str(
            r#"
            [window]
            title = "Test"
            width = 800
            "#,
        )
        .unwrap();

        assert_eq!(config.window.title, "Test");
        assert_eq!(config.window.width, 800);
        // Unspecified fields fall back to defaults
        assert_eq!(config.window.height, 1080);
        assert_eq!(config.shaders.fragment_shader_path, "shaders/default.frag.spv");
    }

    #[test]
    fn test_load_or_default_on_missing_file() {
        let config = EngineConfig::load_or_default("does/not/exist.toml");
        assert_eq!(config.window.width, 1920);
    }
}
