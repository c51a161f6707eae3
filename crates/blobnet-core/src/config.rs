//! Graph configuration for blobnet.
//!
//! A graph configuration is a TOML document listing the layers a host should
//! construct through its layer registry:
//!
//! ```toml
//! [[layer]]
//! name = "gathering"
//! kind = "Gather"
//! paddings = true
//! learning_rate_multiplier = 0.5
//! ```
//!
//! The configuration can be loaded from:
//! 1. An explicit path
//! 2. The `BLOBNET_CONFIG` environment variable
//! 3. An inline TOML string
//!
//! # Example
//!
//! ```ignore
//! use blobnet_core::config::GraphConfig;
//!
//! let config = GraphConfig::builder()
//!     .layer(LayerConfig::new("gathering", "Gather").with_paddings(true))
//!     .build()?;
//! config.save_to_file(Path::new("graph.toml"))?;
//! ```

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable naming the default graph configuration file.
pub const CONFIG_ENV_VAR: &str = "BLOBNET_CONFIG";

fn default_learning_rate_multiplier() -> f32 {
    1.0
}

/// Configuration of a single layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerConfig {
    /// Unique layer name within the graph
    pub name: String,
    /// Registered layer class (e.g. "Gather")
    pub kind: String,
    /// Per-layer scale applied to this layer's gradient contributions
    #[serde(default = "default_learning_rate_multiplier")]
    pub learning_rate_multiplier: f32,
    /// Treat index value -1 as "no selection" (Gather only)
    #[serde(default)]
    pub paddings: bool,
}

impl LayerConfig {
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            learning_rate_multiplier: default_learning_rate_multiplier(),
            paddings: false,
        }
    }

    pub fn with_paddings(mut self, enable: bool) -> Self {
        self.paddings = enable;
        self
    }

    pub fn with_learning_rate_multiplier(mut self, multiplier: f32) -> Self {
        self.learning_rate_multiplier = multiplier;
        self
    }
}

/// Complete graph configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphConfig {
    #[serde(default, rename = "layer")]
    pub layers: Vec<LayerConfig>,
}

impl GraphConfig {
    /// Create a new builder for custom configuration
    pub fn builder() -> GraphConfigBuilder {
        GraphConfigBuilder::new()
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: GraphConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        log::debug!("loading graph configuration from {:?}", path);
        Self::from_toml_str(&contents)
    }

    /// Load configuration from the file named by `BLOBNET_CONFIG`.
    ///
    /// Returns `Ok(None)` if the variable is not set.
    pub fn from_env() -> Result<Option<Self>, ConfigError> {
        match Self::env_path() {
            Some(path) => Self::from_file(&path).map(Some),
            None => Ok(None),
        }
    }

    /// Path named by `BLOBNET_CONFIG`, if set.
    pub fn env_path() -> Option<PathBuf> {
        env::var_os(CONFIG_ENV_VAR).map(PathBuf::from)
    }

    /// Look up a layer configuration by name.
    pub fn layer(&self, name: &str) -> Option<&LayerConfig> {
        self.layers.iter().find(|layer| layer.name == name)
    }

    /// Save configuration to a file, creating parent directories.
    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let toml_str = toml::to_string_pretty(self)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(path, toml_str)?;
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (i, layer) in self.layers.iter().enumerate() {
            if self.layers[..i].iter().any(|other| other.name == layer.name) {
                return Err(ConfigError::DuplicateLayerName(layer.name.clone()));
            }
        }
        Ok(())
    }
}

/// Builder for GraphConfig
#[derive(Debug, Clone, Default)]
pub struct GraphConfigBuilder {
    layers: Vec<LayerConfig>,
}

impl GraphConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a layer
    pub fn layer(mut self, layer: LayerConfig) -> Self {
        self.layers.push(layer);
        self
    }

    /// Build the GraphConfig, rejecting duplicate layer names
    pub fn build(self) -> Result<GraphConfig, ConfigError> {
        let config = GraphConfig {
            layers: self.layers,
        };
        config.validate()?;
        Ok(config)
    }
}
