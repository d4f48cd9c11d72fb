//! Shared, atomically swappable handle to the serving model
//!
//! Inference clones the inner `Arc<TrainedModel>` and runs without holding
//! any lock, so a concurrent swap never disturbs an in-flight prediction.
//! Re-training is single-flight: a second run started while one is active
//! fails immediately with [`Error::TrainingInProgress`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use crate::error::{Error, Result};
use crate::models::TrainingRecord;
use crate::store::ModelStore;
use crate::trainer::{Trainer, TrainingOutcome, TrainedModel};

#[derive(Default)]
struct Inner {
    model: RwLock<Option<Arc<TrainedModel>>>,
    training: AtomicBool,
}

/// Cloneable handle to the current model; clones share state
#[derive(Clone, Default)]
pub struct ModelHandle {
    inner: Arc<Inner>,
}

impl ModelHandle {
    /// Handle with no model loaded
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_model(model: TrainedModel) -> Self {
        let handle = Self::default();
        handle.replace(model);
        handle
    }

    /// Load from a store; the handle stays empty when nothing is stored
    pub fn load_from(store: &dyn ModelStore) -> Result<Self> {
        let handle = Self::default();
        match store.load()? {
            Some(model) => handle.replace(model),
            None => tracing::warn!(location = %store.location(), "No trained model found"),
        }
        Ok(handle)
    }

    /// Snapshot of the current model
    pub fn current(&self) -> Option<Arc<TrainedModel>> {
        match self.inner.model.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Current model, or [`Error::ModelUnavailable`]
    pub fn require(&self) -> Result<Arc<TrainedModel>> {
        self.current().ok_or(Error::ModelUnavailable)
    }

    pub fn is_loaded(&self) -> bool {
        self.current().is_some()
    }

    /// Swap in a new model
    pub fn replace(&self, model: TrainedModel) {
        let next = Arc::new(model);
        let mut guard = match self.inner.model.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = Some(next);
        tracing::info!("Serving model swapped");
    }

    pub fn is_training(&self) -> bool {
        self.inner.training.load(Ordering::SeqCst)
    }

    /// Train on `dataset`, persist the result, then swap it in
    ///
    /// Nothing is saved or swapped when training fails.
    pub fn retrain(
        &self,
        trainer: &Trainer,
        store: &dyn ModelStore,
        dataset: &[TrainingRecord],
    ) -> Result<TrainingOutcome> {
        let _guard = TrainingGuard::acquire(&self.inner.training)?;

        let outcome = trainer.train(dataset)?;
        store.save(&outcome.model)?;
        self.replace(outcome.model.clone());

        Ok(outcome)
    }
}

/// Clears the training flag when dropped, including on early return
struct TrainingGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> TrainingGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| Error::TrainingInProgress)?;
        Ok(Self { flag })
    }
}

impl Drop for TrainingGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}
