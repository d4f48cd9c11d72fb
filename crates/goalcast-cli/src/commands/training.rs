//! Model training command

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result};
use goalcast_core::synthetic::read_csv;
use goalcast_core::{
    GoalcastConfig, ModelHandle, SyntheticDataGenerator, Trainer, TrainingOutcome,
    TrainingRecord,
};

use super::open_store;

/// Train on a CSV dataset or freshly generated data, then save the model
pub fn cmd_train(
    config: &GoalcastConfig,
    data: Option<&Path>,
    records: Option<usize>,
    seed: Option<u64>,
) -> Result<TrainingOutcome> {
    let mut trainer_config = config.training.trainer_config();
    if let Some(seed) = seed {
        trainer_config.seed = seed;
    }

    let dataset = match data {
        Some(path) => load_dataset(path)?,
        None => {
            let records = records.unwrap_or(config.training.records);
            println!(
                "🎲 Generating {} synthetic records (seed {})...",
                records, trainer_config.seed
            );
            SyntheticDataGenerator::new(config.generator.clone())?
                .generate(records, trainer_config.seed)
        }
    };

    println!(
        "🌲 Training random forest ({} trees) on {} records...",
        trainer_config.forest.n_trees,
        dataset.len()
    );

    let store = open_store(config);
    let outcome = ModelHandle::empty()
        .retrain(&Trainer::new(trainer_config), &store, &dataset)
        .context("Training failed")?;

    let metrics = &outcome.metrics;
    println!("✅ Model saved to {}", store.path().display());
    println!(
        "   Evaluated on {} held-out records ({} used for fitting)",
        metrics.test_records, metrics.train_records
    );
    println!("   MAE:  {:.2} months", metrics.mae);
    println!("   RMSE: {:.2} months", metrics.rmse);
    println!("   R²:   {:.3}", metrics.r2);

    Ok(outcome)
}

fn load_dataset(path: &Path) -> Result<Vec<TrainingRecord>> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let dataset = read_csv(BufReader::new(file))
        .with_context(|| format!("Failed to parse dataset {}", path.display()))?;
    println!("📄 Loaded {} records from {}", dataset.len(), path.display());
    Ok(dataset)
}
