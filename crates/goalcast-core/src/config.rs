//! Layered configuration for Goalcast
//!
//! ## Configuration Resolution
//!
//! 1. Explicit override file (`--config`), which must exist
//! 2. Otherwise the data-dir override (~/.local/share/goalcast/config.toml) if present
//! 3. Otherwise embedded defaults (compiled into binary)
//!
//! Environment variables are applied last:
//! `GOALCAST_MODEL_PATH`, `GOALCAST_HOST`, `GOALCAST_PORT`, `CORS_ORIGINS`.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::forest::ForestConfig;
use crate::insights::NarrativeStyle;
use crate::store::default_model_path;
use crate::synthetic::{GeneratorConfig, DEFAULT_RECORDS, DEFAULT_SEED};
use crate::trainer::TrainerConfig;

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/goalcast.toml");

/// Model artifact settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSection {
    /// Artifact path; None uses the platform data directory
    pub path: Option<PathBuf>,
}

/// Dataset and trainer settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingSection {
    /// Synthetic records generated per training run
    pub records: usize,
    /// Seed for dataset generation and the train/evaluation split
    pub seed: u64,
    pub test_split: f64,
    pub forest: ForestConfig,
}

impl Default for TrainingSection {
    fn default() -> Self {
        Self {
            records: DEFAULT_RECORDS,
            seed: DEFAULT_SEED,
            test_split: 0.2,
            forest: ForestConfig::default(),
        }
    }
}

impl TrainingSection {
    pub fn trainer_config(&self) -> TrainerConfig {
        TrainerConfig {
            test_split: self.test_split,
            seed: self.seed,
            forest: self.forest.clone(),
        }
    }
}

/// HTTP server settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            cors_origins: vec![
                "http://localhost:5173".to_string(),
                "http://127.0.0.1:5173".to_string(),
            ],
        }
    }
}

/// Complete Goalcast configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GoalcastConfig {
    pub model: ModelSection,
    pub training: TrainingSection,
    pub generator: GeneratorConfig,
    pub server: ServerSection,
    pub narrative: NarrativeStyle,
}

impl GoalcastConfig {
    /// Resolve configuration from files and the process environment
    pub fn load(override_path: Option<&Path>) -> Result<Self> {
        let mut config = Self::from_toml(&read_config_source(override_path)?)?;
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML document; missing keys take built-in defaults
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// The compiled-in defaults
    pub fn embedded() -> Result<Self> {
        Self::from_toml(DEFAULT_CONFIG)
    }

    /// Apply environment overrides through `lookup`
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let set = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(path) = set("GOALCAST_MODEL_PATH") {
            self.model.path = Some(PathBuf::from(path));
        }
        if let Some(host) = set("GOALCAST_HOST") {
            self.server.host = host.trim().to_string();
        }
        if let Some(port) = set("GOALCAST_PORT") {
            self.server.port = port.trim().parse().map_err(|_| {
                Error::Config(format!("GOALCAST_PORT must be a port number, got '{}'", port))
            })?;
        }
        if let Some(origins) = set("CORS_ORIGINS") {
            self.server.cors_origins = parse_origins(&origins);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.generator.validate()?;
        self.training.forest.validate()?;
        if !(self.training.test_split > 0.0 && self.training.test_split < 1.0) {
            return Err(Error::Config(format!(
                "training.test_split must be between 0 and 1, got {}",
                self.training.test_split
            )));
        }
        if self.training.records < 2 {
            return Err(Error::Config(
                "training.records must be at least 2".to_string(),
            ));
        }
        Ok(())
    }

    /// Where the model artifact lives
    pub fn model_path(&self) -> PathBuf {
        self.model.path.clone().unwrap_or_else(default_model_path)
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("goalcast").join("config.toml"))
}

/// Split a comma-separated origin list, dropping blanks
pub fn parse_origins(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Pick the config text (override first, then default)
fn read_config_source(override_path: Option<&Path>) -> Result<String> {
    if let Some(path) = override_path {
        return fs::read_to_string(path).map_err(|e| {
            Error::Config(format!(
                "Failed to read config {}: {}",
                path.display(),
                e
            ))
        });
    }

    if let Some(default_path) = default_config_path() {
        if default_path.exists() {
            tracing::debug!(path = %default_path.display(), "Using config override");
            return fs::read_to_string(&default_path)
                .map_err(|e| Error::Config(format!("Failed to read config: {}", e)));
        }
    }

    Ok(DEFAULT_CONFIG.to_string())
}
