//! Model persistence with pluggable storage
//!
//! - `ModelStore` trait defines how a trained model is saved and loaded
//! - `FileModelStore` keeps a gzip-compressed JSON artifact on disk
//! - `MemoryModelStore` keeps the model in process (tests, ephemeral servers)
//!
//! Saves replace any prior artifact. The file store writes to a temporary
//! file in the target directory and renames it into place, so readers see
//! either the old artifact or the new one, never a partial write.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use tempfile::NamedTempFile;
use tracing::info;

use crate::error::{Error, Result};
use crate::trainer::TrainedModel;

/// Default artifact file name
pub const MODEL_FILE_NAME: &str = "model.json.gz";

/// Default artifact location (~/.local/share/goalcast/model.json.gz on Linux)
pub fn default_model_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("goalcast")
        .join(MODEL_FILE_NAME)
}

/// Trait for model storage backends
pub trait ModelStore: Send + Sync {
    /// Human-readable location for logs
    fn location(&self) -> String;

    /// Load the stored model; `Ok(None)` when nothing has been saved yet
    fn load(&self) -> Result<Option<TrainedModel>>;

    /// Persist a model, replacing any previous one
    fn save(&self, model: &TrainedModel) -> Result<()>;
}

/// Gzip-compressed JSON artifact on the local filesystem
pub struct FileModelStore {
    path: PathBuf,
}

impl FileModelStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ModelStore for FileModelStore {
    fn location(&self) -> String {
        self.path.display().to_string()
    }

    fn load(&self) -> Result<Option<TrainedModel>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let file = File::open(&self.path)?;
        let decoder = GzDecoder::new(BufReader::new(file));
        let model: TrainedModel = serde_json::from_reader(decoder).map_err(|e| {
            Error::Model(format!(
                "could not read model artifact {}: {}",
                self.path.display(),
                e
            ))
        })?;
        model.check_compatibility()?;

        info!(
            path = %self.path.display(),
            trained_at = %model.metadata.trained_at,
            "Loaded model"
        );
        Ok(Some(model))
    }

    fn save(&self, model: &TrainedModel) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        if !dir.exists() {
            fs::create_dir_all(&dir).map_err(|e| {
                Error::Model(format!(
                    "failed to create model directory {}: {}",
                    dir.display(),
                    e
                ))
            })?;
            info!("Created model directory: {}", dir.display());
        }

        let temp = NamedTempFile::new_in(&dir)?;
        {
            let mut encoder = GzEncoder::new(BufWriter::new(temp.as_file()), Compression::default());
            serde_json::to_writer(&mut encoder, model)?;
            encoder.finish()?.flush()?;
        }
        temp.as_file().sync_all()?;
        temp.persist(&self.path).map_err(|e| Error::Io(e.error))?;

        info!(path = %self.path.display(), "Saved model");
        Ok(())
    }
}

/// In-process model storage
#[derive(Default)]
pub struct MemoryModelStore {
    model: Mutex<Option<TrainedModel>>,
}

impl MemoryModelStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_model(model: TrainedModel) -> Self {
        Self {
            model: Mutex::new(Some(model)),
        }
    }
}

impl ModelStore for MemoryModelStore {
    fn location(&self) -> String {
        "memory".to_string()
    }

    fn load(&self) -> Result<Option<TrainedModel>> {
        let guard = self
            .model
            .lock()
            .map_err(|_| Error::Model("memory store lock poisoned".to_string()))?;
        Ok(guard.clone())
    }

    fn save(&self, model: &TrainedModel) -> Result<()> {
        let mut guard = self
            .model
            .lock()
            .map_err(|_| Error::Model("memory store lock poisoned".to_string()))?;
        *guard = Some(model.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::FeatureVector;
    use crate::forest::{ForestConfig, Regressor};
    use crate::synthetic::generate_synthetic_dataset;
    use crate::trainer::{Trainer, TrainerConfig};
    use tempfile::TempDir;

    fn trained() -> TrainedModel {
        let trainer = Trainer::new(TrainerConfig {
            forest: ForestConfig {
                n_trees: 5,
                ..Default::default()
            },
            ..Default::default()
        });
        trainer
            .train(&generate_synthetic_dataset(80, 4))
            .unwrap()
            .model
    }

    fn sample_vector() -> FeatureVector {
        FeatureVector {
            net_income: 40_000.0,
            required_savings_rate: 10_000.0,
            salary: 100_000.0,
            expenses: 60_000.0,
        }
    }

    #[test]
    fn test_missing_file_loads_none() {
        let dir = TempDir::new().unwrap();
        let store = FileModelStore::new(dir.path().join("absent.json.gz"));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_save_then_load_predicts_identically() {
        let dir = TempDir::new().unwrap();
        let store = FileModelStore::new(dir.path().join("nested").join(MODEL_FILE_NAME));
        let model = trained();

        store.save(&model).unwrap();
        let loaded = store.load().unwrap().unwrap();

        assert_eq!(loaded.metadata.dataset_fingerprint, model.metadata.dataset_fingerprint);
        assert!((loaded.predict(&sample_vector()) - model.predict(&sample_vector())).abs() < 1e-9);
    }

    #[test]
    fn test_save_overwrites_previous_artifact() {
        let dir = TempDir::new().unwrap();
        let store = FileModelStore::new(dir.path().join(MODEL_FILE_NAME));

        let first = trained();
        store.save(&first).unwrap();

        let second = Trainer::new(TrainerConfig {
            forest: ForestConfig {
                n_trees: 3,
                ..Default::default()
            },
            ..Default::default()
        })
        .train(&generate_synthetic_dataset(60, 99))
        .unwrap()
        .model;
        store.save(&second).unwrap();

        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.metadata.training_records, 60);
        assert_eq!(loaded.forest().tree_count(), 3);
    }

    #[test]
    fn test_corrupt_artifact_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(MODEL_FILE_NAME);
        fs::write(&path, b"not a model").unwrap();

        let store = FileModelStore::new(&path);
        assert!(matches!(store.load(), Err(Error::Model(_))));
    }

    /// Save `model`, then rewrite the artifact's fitted trees in place
    fn save_with_trees(
        path: &Path,
        model: &TrainedModel,
        edit: impl FnOnce(&mut serde_json::Value),
    ) {
        FileModelStore::new(path).save(model).unwrap();
        let mut value: serde_json::Value =
            serde_json::from_reader(GzDecoder::new(File::open(path).unwrap())).unwrap();
        edit(&mut value["forest"]["model"]["forest_regressor"]["trees"]);

        let mut encoder = GzEncoder::new(File::create(path).unwrap(), Compression::default());
        serde_json::to_writer(&mut encoder, &value).unwrap();
        encoder.finish().unwrap();
    }

    #[test]
    fn test_structurally_broken_artifact_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(MODEL_FILE_NAME);
        let model = trained();

        save_with_trees(&path, &model, |trees| {
            trees[0]["nodes"] = serde_json::json!([]);
        });
        assert!(matches!(FileModelStore::new(&path).load(), Err(Error::Model(_))));

        save_with_trees(&path, &model, |trees| {
            trees[0]["nodes"][0]["true_child"] = serde_json::json!(0);
        });
        assert!(matches!(FileModelStore::new(&path).load(), Err(Error::Model(_))));

        save_with_trees(&path, &model, |trees| {
            *trees = serde_json::json!([]);
        });
        assert!(matches!(FileModelStore::new(&path).load(), Err(Error::Model(_))));
    }

    #[test]
    fn test_untouched_rewrite_still_loads() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(MODEL_FILE_NAME);
        save_with_trees(&path, &trained(), |_| {});
        assert!(FileModelStore::new(&path).load().unwrap().is_some());
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryModelStore::new();
        assert!(store.load().unwrap().is_none());

        let model = trained();
        store.save(&model).unwrap();
        assert_eq!(store.load().unwrap(), Some(model));
        assert_eq!(store.location(), "memory");
    }
}
