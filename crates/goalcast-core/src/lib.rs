//! Goalcast Core Library
//!
//! Shared functionality for the Goalcast savings goal planner:
//! - Feature derivation from a financial profile
//! - Seeded synthetic training data generation
//! - Random forest regression for time-to-goal estimates
//! - Closed-form savings rate solver
//! - Insight narratives reconciling model and solver
//! - Model persistence with atomic hot-swap for serving

pub mod config;
pub mod error;
pub mod features;
pub mod forest;
pub mod handle;
pub mod insights;
pub mod models;
pub mod planner;
pub mod predictor;
pub mod solver;
pub mod store;
pub mod synthetic;
pub mod trainer;

pub use config::GoalcastConfig;
pub use error::{Error, Result};
pub use features::{derive_features, DerivedFeatures, FeatureVector};
pub use forest::{ForestConfig, RandomForest, Regressor};
pub use handle::ModelHandle;
pub use insights::{Narrative, NarrativeStyle};
pub use models::{
    EstimationResult, Feasibility, FinancialProfile, NarrativeKind, Recommendation,
    TrainingRecord,
};
pub use planner::Planner;
pub use predictor::predict_time_to_goal;
pub use solver::calculate_recommendation;
pub use store::{default_model_path, FileModelStore, MemoryModelStore, ModelStore};
pub use synthetic::{
    dataset_fingerprint, generate_synthetic_dataset, GeneratorConfig, SyntheticDataGenerator,
};
pub use trainer::{
    train_model, EvaluationMetrics, ModelMetadata, TrainedModel, Trainer, TrainerConfig,
    TrainingOutcome,
};
