//! Regression trainer for the time-to-goal model
//!
//! Turns a labelled dataset into a [`TrainedModel`]:
//! 1. Derive the feature frame through [`FeatureVector`]
//! 2. Refuse frames with missing or non-finite values
//! 3. Shuffle and hold out a deterministic evaluation partition
//! 4. Fit a [`RandomForest`] and score it on the held-out rows
//!
//! Persistence is a separate step (see [`crate::store`]) so a failed run never
//! leaves a partial artifact behind.

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::features::FeatureVector;
use crate::forest::{ForestConfig, RandomForest, Regressor};
use crate::models::TrainingRecord;
use crate::synthetic::dataset_fingerprint;

/// Artifact format written into model metadata
pub const MODEL_FORMAT_VERSION: u32 = 2;

/// Trainer settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    /// Fraction of records held out for evaluation (0.0-1.0, exclusive)
    pub test_split: f64,
    /// Seed for the train/evaluation shuffle
    pub seed: u64,
    pub forest: ForestConfig,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            test_split: 0.2,
            seed: 42,
            forest: ForestConfig::default(),
        }
    }
}

/// Held-out evaluation scores
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvaluationMetrics {
    /// Mean absolute error, in months
    pub mae: f64,
    /// Root mean squared error, in months
    pub rmse: f64,
    /// Coefficient of determination
    pub r2: f64,
    pub train_records: usize,
    pub test_records: usize,
}

/// Provenance recorded alongside a fitted forest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub format_version: u32,
    pub trained_at: DateTime<Utc>,
    pub training_records: usize,
    /// Column order the forest was fitted with
    pub feature_names: Vec<String>,
    pub metrics: EvaluationMetrics,
    /// SHA-256 of the training dataset's CSV encoding
    pub dataset_fingerprint: String,
}

/// A fitted model plus its metadata; read-only once built
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainedModel {
    pub metadata: ModelMetadata,
    forest: RandomForest,
}

impl TrainedModel {
    pub fn forest(&self) -> &RandomForest {
        &self.forest
    }

    /// Ensure the artifact was fitted with the columns this build feeds it
    /// and that its trees are structurally sound
    pub fn check_compatibility(&self) -> Result<()> {
        if self.metadata.format_version != MODEL_FORMAT_VERSION {
            return Err(Error::Model(format!(
                "unsupported model format version {} (expected {})",
                self.metadata.format_version, MODEL_FORMAT_VERSION
            )));
        }

        let expected: Vec<&str> = FeatureVector::NAMES.to_vec();
        if self.metadata.feature_names != expected {
            return Err(Error::Model(format!(
                "feature order mismatch: model has {:?}, expected {:?}",
                self.metadata.feature_names, expected
            )));
        }

        self.forest.validate()
    }
}

impl Regressor for TrainedModel {
    fn predict(&self, features: &FeatureVector) -> f64 {
        self.forest.predict(features)
    }
}

/// Result of a successful training run
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub model: TrainedModel,
    pub metrics: EvaluationMetrics,
}

/// Fits and evaluates time-to-goal models
#[derive(Debug, Clone, Default)]
pub struct Trainer {
    config: TrainerConfig,
}

impl Trainer {
    pub fn new(config: TrainerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    /// Fit a model on `dataset` and evaluate it on a held-out partition
    pub fn train(&self, dataset: &[TrainingRecord]) -> Result<TrainingOutcome> {
        if !(self.config.test_split > 0.0 && self.config.test_split < 1.0) {
            return Err(Error::Config(format!(
                "test_split must be between 0 and 1, got {}",
                self.config.test_split
            )));
        }

        let (features, targets) = feature_frame(dataset)?;

        let mut order: Vec<usize> = (0..features.len()).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed);
        order.shuffle(&mut rng);

        let n = order.len();
        let test_len = ((n as f64 * self.config.test_split).ceil() as usize).clamp(1, n - 1);
        let (test_idx, train_idx) = order.split_at(test_len);

        let train_x: Vec<FeatureVector> = train_idx.iter().map(|&i| features[i]).collect();
        let train_y: Vec<f64> = train_idx.iter().map(|&i| targets[i]).collect();

        tracing::info!(
            train = train_idx.len(),
            test = test_idx.len(),
            trees = self.config.forest.n_trees,
            "Fitting random forest"
        );

        let forest = RandomForest::fit(self.config.forest.clone(), &train_x, &train_y)?;

        let test_x: Vec<FeatureVector> = test_idx.iter().map(|&i| features[i]).collect();
        let predictions = forest.predict_batch(&test_x)?;
        let actual: Vec<f64> = test_idx.iter().map(|&i| targets[i]).collect();
        let metrics = evaluate(&predictions, &actual, train_idx.len());

        tracing::info!(
            mae = %format!("{:.2}", metrics.mae),
            rmse = %format!("{:.2}", metrics.rmse),
            r2 = %format!("{:.3}", metrics.r2),
            "Model trained"
        );

        let model = TrainedModel {
            metadata: ModelMetadata {
                format_version: MODEL_FORMAT_VERSION,
                trained_at: Utc::now(),
                training_records: n,
                feature_names: FeatureVector::NAMES.iter().map(|s| s.to_string()).collect(),
                metrics,
                dataset_fingerprint: dataset_fingerprint(dataset)?,
            },
            forest,
        };

        Ok(TrainingOutcome { model, metrics })
    }
}

/// Train with default settings, returning the model and its held-out MAE
pub fn train_model(dataset: &[TrainingRecord]) -> Result<(TrainedModel, f64)> {
    let outcome = Trainer::default().train(dataset)?;
    Ok((outcome.model, outcome.metrics.mae))
}

/// Build the (features, label) frame, rejecting unusable rows
fn feature_frame(dataset: &[TrainingRecord]) -> Result<(Vec<FeatureVector>, Vec<f64>)> {
    if dataset.len() < 2 {
        return Err(Error::TrainingDataInvalid(format!(
            "need at least 2 records to train and evaluate, got {}",
            dataset.len()
        )));
    }

    let mut features = Vec::with_capacity(dataset.len());
    let mut targets = Vec::with_capacity(dataset.len());

    for (row, record) in dataset.iter().enumerate() {
        let vector = FeatureVector::from_record(record);
        if let Some(column) = vector.first_non_finite() {
            return Err(Error::TrainingDataInvalid(format!(
                "row {}: column '{}' is missing or not a finite number",
                row, column
            )));
        }
        features.push(vector);
        targets.push(f64::from(record.time_months));
    }

    Ok((features, targets))
}

fn evaluate(predictions: &[f64], actual: &[f64], train_records: usize) -> EvaluationMetrics {
    let n = actual.len() as f64;
    let mae = predictions
        .iter()
        .zip(actual)
        .map(|(p, a)| (p - a).abs())
        .sum::<f64>()
        / n;
    let ss_res: f64 = predictions
        .iter()
        .zip(actual)
        .map(|(p, a)| (p - a).powi(2))
        .sum();
    let mean = actual.iter().sum::<f64>() / n;
    let ss_tot: f64 = actual.iter().map(|a| (a - mean).powi(2)).sum();

    let r2 = if ss_tot > 0.0 {
        1.0 - ss_res / ss_tot
    } else if ss_res == 0.0 {
        1.0
    } else {
        0.0
    };

    EvaluationMetrics {
        mae,
        rmse: (ss_res / n).sqrt(),
        r2,
        train_records,
        test_records: actual.len(),
    }
}
