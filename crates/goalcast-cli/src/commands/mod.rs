//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Shared utilities (load_config, open_store, open_planner)
//! - `data` - Synthetic dataset generation
//! - `estimate` - Predict and recommend commands
//! - `model` - Saved model metadata
//! - `serve` - Web server command
//! - `training` - Model training command

pub mod core;
pub mod data;
pub mod estimate;
pub mod model;
pub mod serve;
pub mod training;

// Re-export command functions for main.rs
pub use core::*;
pub use data::*;
pub use estimate::*;
pub use model::*;
pub use serve::*;
pub use training::*;
