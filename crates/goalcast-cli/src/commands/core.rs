//! Shared command utilities
//!
//! This module contains:
//! - `load_config` - Resolve configuration with CLI overrides
//! - `open_store` - Model store at the configured path
//! - `open_planner` - Planner over the saved model

use std::path::Path;

use anyhow::{Context, Result};
use goalcast_core::{FileModelStore, GoalcastConfig, ModelHandle, Planner};

/// Load layered configuration; `--model` wins over config and environment
pub fn load_config(config_path: Option<&Path>, model_path: Option<&Path>) -> Result<GoalcastConfig> {
    let mut config = GoalcastConfig::load(config_path).context("Failed to load configuration")?;
    if let Some(path) = model_path {
        config.model.path = Some(path.to_path_buf());
    }
    tracing::debug!(model = %config.model_path().display(), "Resolved configuration");
    Ok(config)
}

pub fn open_store(config: &GoalcastConfig) -> FileModelStore {
    FileModelStore::new(config.model_path())
}

/// Planner over the saved model; errors when no model has been trained
pub fn open_planner(config: &GoalcastConfig) -> Result<Planner> {
    let store = open_store(config);
    let handle = ModelHandle::load_from(&store)
        .with_context(|| format!("Failed to load model from {}", store.path().display()))?;
    handle.require()?;
    Ok(Planner::new(handle, config.narrative.clone()))
}
